//! Per-type secondary index over the shared change log.
//!
//! A view never owns objects. It lazily replays the change log from its
//! private cursor before every operation and indexes the entries of its
//! type by UUID, so independently constructed views over the same log
//! converge without coordinating with each other.

use std::sync::atomic::AtomicU64;
use std::sync::atomic::Ordering;
use std::sync::Arc;

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use tracing::debug;
use tracing::trace;

use super::ChangeLog;
use crate::model::TrackedObject;
use crate::Result;
use crate::StoreError;

pub struct TypedView<T: TrackedObject> {
    log: Arc<ChangeLog>,
    index: DashMap<String, Arc<T>>,
    // Highest log version already replayed into `index`
    cursor: AtomicU64,
}

impl<T: TrackedObject> std::fmt::Debug for TypedView<T> {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("TypedView")
            .field("kind", &T::KIND)
            .field("len", &self.index.len())
            .field("cursor", &self.cursor.load(Ordering::Relaxed))
            .finish()
    }
}

impl<T: TrackedObject> TypedView<T> {
    pub fn new(log: Arc<ChangeLog>) -> Self {
        Self {
            log,
            index: DashMap::new(),
            cursor: AtomicU64::new(0),
        }
    }

    /// Replays log slots appended since the last call.
    fn sync(&self) {
        let upto = self.log.last_version();
        let from = self.cursor.load(Ordering::Acquire);
        if from >= upto {
            return;
        }

        let mut discovered = 0usize;
        for (version, record) in self.log.range(from + 1..=upto) {
            let Some(obj) = T::from_record(&record) else {
                continue;
            };
            if self.replay_slot(version, obj) {
                discovered += 1;
            }
        }

        self.cursor.fetch_max(upto, Ordering::AcqRel);
        if discovered > 0 {
            trace!(kind = %T::KIND, from, upto, discovered, "view resynchronized");
        }
    }

    /// Indexes the object found at `version` during a replay. Returns
    /// whether the index changed.
    ///
    /// The slot is re-checked under the entry lock: the collector removes a
    /// slot before evicting its object, so a slot purged after the replay
    /// snapshot was taken is never resurrected into the index.
    pub(crate) fn replay_slot(
        &self,
        version: u64,
        obj: Arc<T>,
    ) -> bool {
        if obj.header().superseded_version() > 0 {
            return false;
        }
        match self.index.entry(obj.header().uuid().to_string()) {
            Entry::Occupied(mut indexed) => {
                // Another view swapped in a replacement allocation.
                if indexed.get().header().superseded_version() > 0
                    && !Arc::ptr_eq(indexed.get(), &obj)
                    && self.log.contains(version)
                {
                    indexed.insert(obj);
                    return true;
                }
                false
            }
            Entry::Vacant(slot) => {
                if !self.log.contains(version) {
                    return false;
                }
                slot.insert(obj);
                true
            }
        }
    }

    pub fn exists(
        &self,
        uuid: &str,
    ) -> bool {
        self.sync();
        self.index.contains_key(uuid)
    }

    pub fn get(
        &self,
        uuid: &str,
    ) -> Option<Arc<T>> {
        self.sync();
        self.index.get(uuid).map(|e| e.value().clone())
    }

    /// All indexed objects of this type, tombstoned ones included.
    pub fn values(&self) -> Vec<Arc<T>> {
        self.sync();
        self.index.iter().map(|e| e.value().clone()).collect()
    }

    /// Records a new object.
    ///
    /// Returns the already indexed object when the UUID is taken; in that
    /// case nothing is appended. Otherwise the object is stamped with
    /// `create_version == last_change_version == slot`.
    pub fn put_if_absent(
        &self,
        obj: Arc<T>,
    ) -> Option<Arc<T>> {
        self.sync();
        match self.index.entry(obj.header().uuid().to_string()) {
            Entry::Occupied(existing) => Some(existing.get().clone()),
            Entry::Vacant(slot) => {
                let version = self.log.append(obj.clone().into_record());
                debug!(kind = %T::KIND, uuid = obj.header().uuid(), version, "object created");
                slot.insert(obj);
                None
            }
        }
    }

    /// Appends a new slot for an indexed object and returns it.
    ///
    /// When `obj` is a fresh allocation replacing the indexed one, the
    /// create version is carried over and the previous allocation is marked
    /// superseded so its older slots stop replaying and become collectable.
    pub fn update(
        &self,
        obj: Arc<T>,
    ) -> Result<u64> {
        self.sync();
        let uuid = obj.header().uuid().to_string();
        let mut indexed = match self.index.get_mut(&uuid) {
            Some(entry) => entry,
            None => {
                return Err(StoreError::UnknownObject { kind: T::KIND, uuid }.into());
            }
        };

        let replaced = if Arc::ptr_eq(indexed.value(), &obj) {
            None
        } else {
            obj.header()
                .inherit_create_version(indexed.value().header().create_version());
            Some(std::mem::replace(indexed.value_mut(), obj.clone()))
        };

        let version = self.log.append(obj.clone().into_record());
        if let Some(previous) = replaced {
            previous.header().mark_superseded(version);
        }
        debug!(
            kind = %T::KIND,
            uuid = %uuid,
            version,
            tombstone = obj.header().is_tombstoned(),
            "object changed"
        );
        Ok(version)
    }

    /// Logically deletes an object: sets the tombstone flag and records the
    /// change. Returns the tombstone slot.
    pub fn tombstone(
        &self,
        uuid: &str,
    ) -> Result<u64> {
        let obj = self.get(uuid).ok_or_else(|| StoreError::UnknownObject {
            kind: T::KIND,
            uuid: uuid.to_string(),
        })?;
        obj.header().set_tombstone();
        self.update(obj)
    }

    /// Drops the UUID from this view only. The change log keeps its slots
    /// until the garbage collector purges them.
    pub fn remove(
        &self,
        uuid: &str,
    ) -> Option<Arc<T>> {
        self.sync();
        self.index.remove(uuid).map(|(_, v)| v)
    }

    /// Drops `obj` from the index only if it is still the indexed
    /// allocation for its UUID.
    pub(crate) fn evict(
        &self,
        obj: &Arc<T>,
    ) -> bool {
        self.sync();
        self.index
            .remove_if(obj.header().uuid(), |_, indexed| Arc::ptr_eq(indexed, obj))
            .is_some()
    }

    /// Whether a different allocation than `obj` is indexed under its UUID.
    pub(crate) fn indexes_other(
        &self,
        obj: &Arc<T>,
    ) -> bool {
        self.sync();
        self.index
            .get(obj.header().uuid())
            .is_some_and(|indexed| !Arc::ptr_eq(indexed.value(), obj))
    }

    pub fn len(&self) -> usize {
        self.sync();
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
