use std::collections::HashSet;
use std::sync::Arc;
use std::sync::Weak;

use tokio::task::JoinHandle;
use tokio::time::interval_at;
use tokio::time::Instant;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;
use tracing::info;
use tracing::warn;

use crate::metrics::CHANGE_LOG_LAST_VERSION;
use crate::metrics::GC_DEFERRED_OBJECTS;
use crate::metrics::GC_PURGED_OBJECTS;
use crate::metrics::GC_SKIPPED_PASSES;
use crate::model::Capability;
use crate::model::ObjectKind;
use crate::ApplianceRegistry;
use crate::GcConfig;
use crate::ObjectStore;
use crate::Result;
use crate::ServiceAppliance;
use crate::StoreError;

/// Outcome of one collector pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PassReport {
    /// Occupied slots inspected
    pub scanned: usize,
    /// Tombstoned slots physically removed
    pub purged: usize,
    /// Slots left behind by a replaced allocation and removed
    pub discarded: usize,
    /// Tombstoned slots kept because some appliance still lags behind
    pub deferred: usize,
    /// Distinct objects behind the deferred slots
    pub deferred_objects: usize,
}

/// Reclaims tombstoned change log slots once every consumer has seen them.
pub struct GarbageCollector {
    store: Weak<ObjectStore>,
    registry: Arc<dyn ApplianceRegistry>,
    config: GcConfig,
}

impl std::fmt::Debug for GarbageCollector {
    fn fmt(
        &self,
        f: &mut std::fmt::Formatter<'_>,
    ) -> std::fmt::Result {
        f.debug_struct("GarbageCollector")
            .field("store_alive", &(self.store.strong_count() > 0))
            .field("config", &self.config)
            .finish()
    }
}

impl GarbageCollector {
    /// The collector never keeps the store alive on its own.
    pub fn new(
        store: &Arc<ObjectStore>,
        registry: Arc<dyn ApplianceRegistry>,
        config: GcConfig,
    ) -> Self {
        Self {
            store: Arc::downgrade(store),
            registry,
            config,
        }
    }

    /// Scans the whole log once and purges every eligible tombstoned slot.
    ///
    /// Fails without touching the log when the store is gone or the
    /// appliance registry cannot be read.
    pub fn run_pass(&self) -> Result<PassReport> {
        let store = self
            .store
            .upgrade()
            .ok_or_else(|| StoreError::LogUnavailable("object store dropped".to_string()))?;
        let appliances = self.registry.list_appliances()?;
        let log = store.change_log();

        let mut report = PassReport::default();
        let mut deferred: HashSet<(ObjectKind, String)> = HashSet::new();
        for version in log.versions() {
            let Some(record) = log.get(version) else {
                continue;
            };
            report.scanned += 1;

            if record.is_superseded() {
                if store.discard_superseded(version) {
                    report.discarded += 1;
                }
                continue;
            }
            if !record.is_tombstoned() {
                continue;
            }

            // Flag set but the deleting change is not in the log yet.
            let tombstone_slot = record.header().tombstone_version();
            if tombstone_slot == 0
                || !is_purge_eligible(record.capability(), tombstone_slot, &appliances)
            {
                report.deferred += 1;
                deferred.insert((record.kind(), record.uuid().to_string()));
                continue;
            }

            if store.purge(version, &record) {
                GC_PURGED_OBJECTS
                    .with_label_values(&[record.kind().as_str()])
                    .inc();
                report.purged += 1;
            }
        }

        report.deferred_objects = deferred.len();
        GC_DEFERRED_OBJECTS.set(report.deferred_objects as i64);
        CHANGE_LOG_LAST_VERSION.set(log.last_version() as i64);
        Ok(report)
    }

    /// Runs one pass and reports its outcome. Errors skip the pass.
    fn collect_once(&self) -> Option<PassReport> {
        match self.run_pass() {
            Ok(report) => {
                if report.purged > 0 || report.discarded > 0 {
                    info!(
                        purged = report.purged,
                        discarded = report.discarded,
                        deferred = report.deferred,
                        "garbage collection pass finished"
                    );
                } else {
                    debug!(
                        scanned = report.scanned,
                        deferred = report.deferred,
                        "garbage collection pass finished"
                    );
                }
                Some(report)
            }
            Err(e) => {
                GC_SKIPPED_PASSES.inc();
                warn!("garbage collection pass skipped: {:?}", e);
                None
            }
        }
    }

    /// Spawns the periodic collector unless it is disabled by configuration.
    pub fn start(
        self,
        shutdown: CancellationToken,
    ) -> Option<JoinHandle<()>> {
        if !self.config.enabled {
            debug!("garbage collector disabled: no background pass");
            return None;
        }
        Some(self.spawn(shutdown))
    }

    /// Starts the periodic collector on the current runtime.
    ///
    /// The first pass runs one interval after spawning. Passes run on a
    /// single task and never overlap; a pass that overruns delays the next
    /// tick instead of bursting. Cancelling `shutdown` stops the loop
    /// between passes.
    pub fn spawn(
        self,
        shutdown: CancellationToken,
    ) -> JoinHandle<()> {
        let period = self.config.interval();
        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    biased;
                    _ = shutdown.cancelled() => {
                        info!("garbage collector shutting down");
                        break;
                    }
                    _ = ticker.tick() => {
                        self.collect_once();
                    }
                }
            }
        })
    }
}

/// Whether a slot tombstoned at `tombstone_slot` may be purged.
///
/// Holds when every appliance consuming `capability`'s feed has a watermark
/// at or past the tombstone slot, and trivially when no such appliance is
/// registered. Untracked objects are always eligible.
pub fn is_purge_eligible(
    capability: Capability,
    tombstone_slot: u64,
    appliances: &[ServiceAppliance],
) -> bool {
    match capability.consumer() {
        None => true,
        Some(class) => appliances
            .iter()
            .filter_map(|appliance| appliance.watermark(class))
            .all(|watermark| watermark >= tombstone_slot),
    }
}
