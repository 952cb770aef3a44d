use serde::Deserialize;
use serde::Serialize;

use crate::Error;
use crate::Result;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FeedConfig {
    /// Prepended to every replay path handed to appliances
    #[serde(default = "default_uri_prefix")]
    pub uri_prefix: String,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            uri_prefix: default_uri_prefix(),
        }
    }
}

impl FeedConfig {
    pub fn validate(&self) -> Result<()> {
        if !self.uri_prefix.starts_with('/') {
            return Err(Error::InvalidConfig(format!(
                "feed.uri_prefix must be absolute, got {:?}",
                self.uri_prefix
            )));
        }
        if self.uri_prefix.ends_with('/') {
            return Err(Error::InvalidConfig(format!(
                "feed.uri_prefix must not end with '/', got {:?}",
                self.uri_prefix
            )));
        }
        Ok(())
    }
}

fn default_uri_prefix() -> String {
    "/controller/sb/v2/opendove/odmc".to_string()
}
