//! Log-resident object model.
//!
//! Every object carries an [`ObjectHeader`] (identity, tombstone flag and
//! version stamps) and a capability fixed by its concrete type. The change
//! log stores [`Record`]s, which are shared references: reading an old slot
//! yields the object's current state. The log is a change index, not an
//! audit trail.

mod header;
mod objects;
mod record;

pub use header::*;
pub use objects::*;
pub use record::*;
