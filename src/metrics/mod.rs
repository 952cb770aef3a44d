use lazy_static::lazy_static;
use prometheus::Encoder;
use prometheus::IntCounter;
use prometheus::IntCounterVec;
use prometheus::IntGauge;
use prometheus::Opts;
use prometheus::Registry;


lazy_static! {
    pub static ref GC_PURGED_OBJECTS: IntCounterVec = IntCounterVec::new(
        Opts::new("gc_purged_objects", "Change log slots physically purged by the collector"),
        &["kind"]
    )
    .expect("metric can not be created");

    pub static ref GC_DEFERRED_OBJECTS: IntGauge = IntGauge::new(
        "gc_deferred_objects",
        "Tombstoned objects left in place by the latest pass (watermark not reached)"
    )
    .expect("metric can not be created");

    pub static ref GC_SKIPPED_PASSES: IntCounter = IntCounter::new(
        "gc_skipped_passes",
        "Collector passes skipped because a collaborator was unavailable"
    )
    .expect("metric can not be created");

    pub static ref CHANGE_LOG_LAST_VERSION: IntGauge = IntGauge::new(
        "change_log_last_version",
        "Highest published change log version"
    )
    .expect("metric can not be created");
}

/// Registers every collector of this crate with `registry`.
pub fn register_custom_metrics(registry: &Registry) -> prometheus::Result<()> {
    registry.register(Box::new(GC_PURGED_OBJECTS.clone()))?;
    registry.register(Box::new(GC_DEFERRED_OBJECTS.clone()))?;
    registry.register(Box::new(GC_SKIPPED_PASSES.clone()))?;
    registry.register(Box::new(CHANGE_LOG_LAST_VERSION.clone()))?;
    Ok(())
}

/// Text exposition of `registry` for a scrape endpoint.
pub fn encode_metrics(registry: &Registry) -> String {
    let encoder = prometheus::TextEncoder::new();
    let mut buffer = Vec::new();
    if let Err(e) = encoder.encode(&registry.gather(), &mut buffer) {
        tracing::error!("could not encode metrics: {}", e);
        return String::new();
    }
    String::from_utf8(buffer).unwrap_or_default()
}
