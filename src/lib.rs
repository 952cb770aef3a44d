//! Versioned change log for an SDN controller's southbound replication.
//!
//! Every create, update or tombstone of a tracked object appends a slot to a
//! single dense [`ChangeLog`]. Typed views index the log per object type,
//! [`ChangeFeed`]s let DCS and DGW appliances poll for what changed after a
//! version, and the [`GarbageCollector`] reclaims tombstoned slots once
//! every consumer has acknowledged them.

mod appliance;
mod config;
mod core;
mod errors;
mod metrics;
pub mod model;
mod storage;

pub use self::core::*;

pub use appliance::*;
pub use self::config::*;
pub use errors::*;
pub use metrics::*;
pub use model::*;
pub use storage::*;

//-----------------------------------------------------------
// Test utils

#[cfg(test)]
pub(crate) mod test_utils;
