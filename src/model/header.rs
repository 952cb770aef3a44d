use std::fmt;
use std::sync::atomic::AtomicBool;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use serde::Deserialize;
use serde::Serialize;

/// Southbound appliance class that consumes a change feed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConsumerClass {
    /// DOVE Connectivity Service
    Dcs,
    /// DOVE Gateway
    Dgw,
}

impl ConsumerClass {
    /// Whether objects carrying `capability` belong to this consumer's feed.
    pub fn tracks(
        self,
        capability: Capability,
    ) -> bool {
        capability.consumer() == Some(self)
    }
}

impl fmt::Display for ConsumerClass {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        match self {
            ConsumerClass::Dcs => f.write_str("DCS"),
            ConsumerClass::Dgw => f.write_str("DGW"),
        }
    }
}

/// Which southbound class must observe changes of an object type.
///
/// Fixed per concrete type; DCS and DGW tracking are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    Dcs,
    Dgw,
    /// Lives in the log but no appliance replays it (e.g. switches).
    Untracked,
}

impl Capability {
    pub fn consumer(self) -> Option<ConsumerClass> {
        match self {
            Capability::Dcs => Some(ConsumerClass::Dcs),
            Capability::Dgw => Some(ConsumerClass::Dgw),
            Capability::Untracked => None,
        }
    }
}

/// Identity and versioning state shared by every log-resident object.
///
/// All fields are atomics: the same header is reachable from every change
/// log slot that references the object and from its typed view.
#[derive(Debug)]
pub struct ObjectHeader {
    uuid: String,
    tombstone: AtomicBool,
    create_version: AtomicU64,
    last_change_version: AtomicU64,
    tombstone_version: AtomicU64,
    superseded_version: AtomicU64,
}

impl ObjectHeader {
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            tombstone: AtomicBool::new(false),
            create_version: AtomicU64::new(0),
            last_change_version: AtomicU64::new(0),
            tombstone_version: AtomicU64::new(0),
            superseded_version: AtomicU64::new(0),
        }
    }

    pub fn uuid(&self) -> &str {
        &self.uuid
    }

    pub fn is_tombstoned(&self) -> bool {
        self.tombstone.load(Ordering::Acquire)
    }

    /// Marks the object logically deleted. Only takes effect for feeds and
    /// the collector once the owning view records a change for it.
    pub fn set_tombstone(&self) {
        self.tombstone.store(true, Ordering::Release);
    }

    /// Slot of the first insertion, 0 while the object has never been logged.
    pub fn create_version(&self) -> u64 {
        self.create_version.load(Ordering::Acquire)
    }

    /// Slot of the most recent insert, update or tombstone.
    pub fn last_change_version(&self) -> u64 {
        self.last_change_version.load(Ordering::Acquire)
    }

    /// First slot recorded after the tombstone flag was set, 0 while the
    /// deletion has not reached the log yet.
    pub fn tombstone_version(&self) -> u64 {
        self.tombstone_version.load(Ordering::Acquire)
    }

    /// Stamps a freshly reserved slot. The create version is claimed only
    /// once; the last change version never moves backwards even when two
    /// appends of the same object finish out of order.
    pub(crate) fn record_change(
        &self,
        version: u64,
    ) {
        let _ = self
            .create_version
            .compare_exchange(0, version, Ordering::AcqRel, Ordering::Acquire);
        self.last_change_version.fetch_max(version, Ordering::AcqRel);
        if self.is_tombstoned() {
            let _ = self.tombstone_version.compare_exchange(
                0,
                version,
                Ordering::AcqRel,
                Ordering::Acquire,
            );
        }
    }

    /// Slot at which a replacement allocation of the same UUID took over,
    /// 0 while this allocation is current. Slots still referencing a
    /// superseded allocation carry no state of their own.
    pub fn superseded_version(&self) -> u64 {
        self.superseded_version.load(Ordering::Acquire)
    }

    pub(crate) fn mark_superseded(
        &self,
        version: u64,
    ) {
        let _ = self.superseded_version.compare_exchange(
            0,
            version,
            Ordering::AcqRel,
            Ordering::Acquire,
        );
    }

    /// Carries the create version of a previously indexed incarnation over
    /// to a replacement allocation of the same UUID.
    pub(crate) fn inherit_create_version(
        &self,
        version: u64,
    ) {
        if version == 0 {
            return;
        }
        let _ = self
            .create_version
            .compare_exchange(0, version, Ordering::AcqRel, Ordering::Acquire);
    }
}
