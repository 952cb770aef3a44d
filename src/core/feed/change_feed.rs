use std::fmt;
use std::sync::Arc;

use serde::Deserialize;
use serde::Serialize;
use tracing::trace;

use crate::model::Record;
use crate::ChangeLog;
use crate::ConsumerClass;
use crate::FeedConfig;

/// Answer to "is there anything at or after this version?".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionStatus {
    HasMore,
    NoContent,
}

/// HTTP verb the appliance replays against the object URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplayMethod {
    #[serde(rename = "GET")]
    Get,
    #[serde(rename = "DELETE")]
    Delete,
    /// Nothing to replay for this slot
    #[serde(rename = "")]
    Skip,
}

impl ReplayMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            ReplayMethod::Get => "GET",
            ReplayMethod::Delete => "DELETE",
            ReplayMethod::Skip => "",
        }
    }
}

impl fmt::Display for ReplayMethod {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Body of a `changeversion/{v}` response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangeRecord {
    pub method: ReplayMethod,
    pub uri: String,
    pub next_change: u64,
}

impl ChangeRecord {
    fn skip(next_change: u64) -> Self {
        Self {
            method: ReplayMethod::Skip,
            uri: String::new(),
            next_change,
        }
    }
}

/// Incremental "everything after version V" queries over the change log.
#[derive(Debug, Clone)]
pub struct ChangeFeed {
    log: Arc<ChangeLog>,
    uri_prefix: String,
}

impl ChangeFeed {
    pub fn new(
        log: Arc<ChangeLog>,
        config: &FeedConfig,
    ) -> Self {
        Self {
            log,
            uri_prefix: config.uri_prefix.clone(),
        }
    }

    /// `HasMore` iff some occupied slot `k >= version` exists. Non-positive
    /// versions are never valid and report `NoContent`.
    pub fn version_exists(
        &self,
        version: i64,
    ) -> VersionStatus {
        match valid_version(version).and_then(|v| self.log.first_at_or_after(v)) {
            Some(_) => VersionStatus::HasMore,
            None => VersionStatus::NoContent,
        }
    }

    /// What `class` should replay for slot `version`, and where to poll next.
    ///
    /// Slots that are empty, purged, invalid, owned by the other consumer
    /// class or left behind by a replaced allocation carry [`ReplayMethod::Skip`] with an empty URI. `next_change`
    /// is always strictly greater than `version`: the next slot tracked by
    /// `class`, or one past the last published slot when there is none yet.
    pub fn next_change(
        &self,
        class: ConsumerClass,
        version: i64,
    ) -> ChangeRecord {
        let Some(version) = valid_version(version) else {
            return ChangeRecord::skip(self.next_version_after(class, 0));
        };

        let next_change = self.next_version_after(class, version);
        let record = match self.log.get(version) {
            Some(record) if replays_for(class, &record) => record,
            _ => return ChangeRecord::skip(next_change),
        };

        let method = if record.is_tombstoned() {
            ReplayMethod::Delete
        } else {
            ReplayMethod::Get
        };
        let uri = self.replay_uri(&record);
        trace!(%class, version, %method, %uri, next_change, "change served");

        ChangeRecord {
            method,
            uri,
            next_change,
        }
    }

    /// Endpoint contract for `GET .../changeversion/{raw}`: `None` maps to
    /// 204 No Content, `Some` to a 200 body.
    pub fn poll(
        &self,
        class: ConsumerClass,
        raw: &str,
    ) -> Option<ChangeRecord> {
        let version: i64 = raw.trim().parse().ok()?;
        match self.version_exists(version) {
            VersionStatus::HasMore => Some(self.next_change(class, version)),
            VersionStatus::NoContent => None,
        }
    }

    fn replay_uri(
        &self,
        record: &Record,
    ) -> String {
        record
            .replay_path()
            .map(|path| format!("{}{}", self.uri_prefix, path))
            .unwrap_or_default()
    }

    fn next_version_after(
        &self,
        class: ConsumerClass,
        after: u64,
    ) -> u64 {
        match self
            .log
            .next_matching(after, |r| replays_for(class, r))
        {
            Some((version, _)) => version,
            // Nothing for this class yet: resume just past what was scanned.
            None => self.log.last_version().max(after) + 1,
        }
    }
}

fn replays_for(
    class: ConsumerClass,
    record: &Record,
) -> bool {
    class.tracks(record.capability()) && !record.is_superseded()
}

fn valid_version(version: i64) -> Option<u64> {
    u64::try_from(version).ok().filter(|v| *v > 0)
}
