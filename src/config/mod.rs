//! Configuration management for the change log node.
//!
//! Provides hierarchical configuration loading and validation with:
//! - Default values as code base
//! - Configuration file support (`CONFIG_PATH`)
//! - Environment variable overrides (`DOVE__` prefix)
//! - Component-wise validation
mod feed;
mod gc;
pub use feed::*;
pub use gc::*;

#[cfg(test)]
mod config_test;

use std::env;
use std::fmt::Debug;

use config::Config;
use config::Environment;
use config::File;
use serde::Deserialize;
use serde::Serialize;

use crate::Result;

/// Top-level configuration container.
///
/// Sources, lowest priority first:
/// 1. Default values from code
/// 2. Configuration file named by `CONFIG_PATH`
/// 3. Environment variables such as `DOVE__GC__INTERVAL_MS`
#[derive(Serialize, Deserialize, Clone, Default)]
pub struct ChangeLogNodeConfig {
    /// Tombstone collector scheduling
    #[serde(default)]
    pub gc: GcConfig,
    /// Southbound change feed rendering
    #[serde(default)]
    pub feed: FeedConfig,
}

impl Debug for ChangeLogNodeConfig {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ChangeLogNodeConfig")
            .field("gc", &self.gc)
            .field("feed", &self.feed)
            .finish()
    }
}

impl ChangeLogNodeConfig {
    /// Loads configuration from hierarchical sources without validation.
    ///
    /// Callers MUST call `validate()` once all overrides are applied.
    ///
    /// # Examples
    /// ```ignore
    /// std::env::set_var("DOVE__GC__INTERVAL_MS", "1000");
    /// let cfg = ChangeLogNodeConfig::new()?.validate()?;
    /// ```
    pub fn new() -> Result<Self> {
        let mut builder = Config::builder().add_source(Config::try_from(&Self::default())?);

        if let Ok(config_path) = env::var("CONFIG_PATH") {
            builder = builder.add_source(File::with_name(&config_path).required(true));
        }

        builder = builder.add_source(environment());

        let config: Self = builder.build()?.try_deserialize()?;
        Ok(config)
    }

    /// Applies an additional configuration file on top of `self`, then the
    /// environment again. No validation.
    pub fn with_override_config(
        &self,
        path: &str,
    ) -> Result<Self> {
        let config: Self = Config::builder()
            .add_source(Config::try_from(self)?)
            .add_source(File::with_name(path))
            .add_source(environment())
            .build()?
            .try_deserialize()?;
        Ok(config)
    }

    /// Validates every section and returns the validated instance.
    pub fn validate(self) -> Result<Self> {
        self.gc.validate()?;
        self.feed.validate()?;
        Ok(self)
    }
}

fn environment() -> Environment {
    Environment::with_prefix("DOVE")
        .separator("__")
        .ignore_empty(true)
        .try_parsing(true)
}
