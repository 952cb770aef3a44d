//! Tombstone garbage collection.
//!
//! A tombstoned slot is purged only once every registered appliance that
//! consumes the object's feed has acknowledged a config version at or past
//! the tombstone slot. With no such appliance registered the slot is purged
//! on the next pass: nobody is left to observe the deletion.

mod garbage_collector;
pub use garbage_collector::*;
