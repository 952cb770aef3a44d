//! Southbound appliance registry.
//!
//! Heartbeat and role-assignment handling live outside this crate; they feed
//! role flags and acknowledged config versions in here. The garbage
//! collector only reads them, as safety watermarks.

mod registry;
pub use registry::*;

#[cfg(test)]
mod registry_test;
