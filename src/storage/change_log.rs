//! Shared, densely versioned change log.
//!
//! Every typed view appends into one `ChangeLog`. Versions are handed out by
//! a single atomic counter, so two writers can never claim the same slot and
//! no slot is ever skipped. A slot only becomes visible to readers once all
//! lower slots are visible: the `published` watermark advances strictly in
//! order, which keeps `1..=last_version()` gapless for readers even while
//! later writers finish before earlier ones.
//!
//! Slots are removed only by the garbage collector, so after a purge the
//! occupied set is `1..=last_version()` minus purged slots.
//!
//! - Lock-free ordered index (`SkipMap`)
//! - Atomic reservation, in-order publication
//! - Readers never observe a reserved-but-unpublished slot

use std::ops::RangeInclusive;
use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;

use crossbeam_skiplist::SkipMap;
use tracing::trace;

use crate::model::Record;

pub struct ChangeLog {
    entries: SkipMap<u64, Record>,
    // The next version to be reserved
    next_version: AtomicU64,
    // Highest version visible to readers
    published: AtomicU64,
}

impl Default for ChangeLog {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ChangeLog {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("ChangeLog")
            .field("len", &self.entries.len())
            .field("last_version", &self.last_version())
            .finish()
    }
}

impl ChangeLog {
    pub fn new() -> Self {
        Self {
            entries: SkipMap::new(),
            next_version: AtomicU64::new(1),
            published: AtomicU64::new(0),
        }
    }

    /// Reserves the next version, stamps it on the object and records it.
    ///
    /// Returns once the slot (and every lower slot) is visible to readers.
    pub fn append(
        &self,
        record: Record,
    ) -> u64 {
        let version = self.next_version.fetch_add(1, Ordering::AcqRel);

        record.header().record_change(version);
        self.entries.insert(version, record);

        // Publish in reservation order: wait for the writer of `version - 1`.
        while self
            .published
            .compare_exchange_weak(version - 1, version, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            std::hint::spin_loop();
            std::thread::yield_now();
        }

        trace!(version, "change log slot published");
        version
    }

    /// Highest published version, 0 for an empty log.
    pub fn last_version(&self) -> u64 {
        self.published.load(Ordering::Acquire)
    }

    pub fn get(
        &self,
        version: u64,
    ) -> Option<Record> {
        if version == 0 || version > self.last_version() {
            return None;
        }
        self.entries.get(&version).map(|e| e.value().clone())
    }

    pub fn contains(
        &self,
        version: u64,
    ) -> bool {
        self.get(version).is_some()
    }

    /// Occupied versions in ascending order.
    pub fn versions(&self) -> Vec<u64> {
        self.entries
            .range(..=self.last_version())
            .map(|e| *e.key())
            .collect()
    }

    /// Occupied slots within `range`, ascending, clipped to published slots.
    pub fn range(
        &self,
        range: RangeInclusive<u64>,
    ) -> Vec<(u64, Record)> {
        let upper = (*range.end()).min(self.last_version());
        if *range.start() > upper {
            return Vec::new();
        }
        self.entries
            .range(*range.start()..=upper)
            .map(|e| (*e.key(), e.value().clone()))
            .collect()
    }

    /// First occupied slot strictly after `after` whose record satisfies `pred`.
    pub fn next_matching<P>(
        &self,
        after: u64,
        pred: P,
    ) -> Option<(u64, Record)>
    where
        P: Fn(&Record) -> bool,
    {
        let upper = self.last_version();
        if after >= upper {
            return None;
        }
        self.entries
            .range(after + 1..=upper)
            .find(|e| pred(e.value()))
            .map(|e| (*e.key(), e.value().clone()))
    }

    /// Lowest occupied slot `>= version`.
    pub fn first_at_or_after(
        &self,
        version: u64,
    ) -> Option<u64> {
        let upper = self.last_version();
        if version > upper {
            return None;
        }
        self.entries.range(version..=upper).next().map(|e| *e.key())
    }

    /// Physically drops a slot. Reserved for the garbage collector.
    pub(crate) fn remove(
        &self,
        version: u64,
    ) -> Option<Record> {
        self.entries.remove(&version).map(|e| e.value().clone())
    }

    /// Number of occupied slots.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
