//! Change log error hierarchy
//!
//! Errors are grouped by the subsystem that raises them: object storage
//! (change log and typed views), the southbound appliance registry and
//! configuration loading.

use config::ConfigError;

use crate::model::ObjectKind;
use crate::ConsumerClass;

#[doc(hidden)]
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration source or deserialization failures
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Configuration values that parsed but violate a rule
    #[error("Invalid config: {0}")]
    InvalidConfig(String),

    /// Change log and typed view failures
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Southbound appliance registry failures
    #[error(transparent)]
    Appliance(#[from] ApplianceError),

    /// Unrecoverable failures requiring process termination
    #[error("Fatal error: {0}")]
    Fatal(String),
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// Update or tombstone against a UUID the view has never indexed
    #[error("{kind} {uuid} is not present in its view")]
    UnknownObject { kind: ObjectKind, uuid: String },

    /// The backing log has been torn down (store dropped)
    #[error("Change log unavailable: {0}")]
    LogUnavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum ApplianceError {
    /// No appliance registered under the UUID
    #[error("Service appliance {0} is not registered")]
    NotFound(String),

    /// Appliance exists but does not hold the role it acknowledged for
    #[error("Service appliance {uuid} does not hold the {class} role")]
    RoleNotHeld { uuid: String, class: ConsumerClass },

    /// Registry backend could not be read
    #[error("Appliance registry unavailable: {0}")]
    Unavailable(String),
}
