use std::time::Duration;

use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

/// Tombstone collector scheduling.
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GcConfig {
    /// Spawn the periodic collector at all
    ///
    /// Default: true
    #[serde(default = "default_enabled")]
    pub enabled: bool,

    /// Pause between the end of one pass and the start of the next, in
    /// milliseconds.
    ///
    /// Range: 100-3600000 (100ms to 1 hour)
    /// Default: 5000
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
}

impl Default for GcConfig {
    fn default() -> Self {
        Self {
            enabled: default_enabled(),
            interval_ms: default_interval_ms(),
        }
    }
}

impl GcConfig {
    pub fn validate(&self) -> Result<()> {
        if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&self.interval_ms) {
            return Err(Error::InvalidConfig(format!(
                "gc.interval_ms must be within {MIN_INTERVAL_MS}..={MAX_INTERVAL_MS}, got {}",
                self.interval_ms
            )));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

const MIN_INTERVAL_MS: u64 = 100;
const MAX_INTERVAL_MS: u64 = 3_600_000;

fn default_enabled() -> bool {
    true
}

fn default_interval_ms() -> u64 {
    5000
}
