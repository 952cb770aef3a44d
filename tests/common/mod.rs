use std::collections::HashMap;
use std::sync::Arc;

use dove_changelog::ChangeFeed;
use dove_changelog::ConsumerClass;
use dove_changelog::InMemoryApplianceRegistry;
use dove_changelog::ReplayMethod;
use dove_changelog::ServiceAppliance;
use dove_changelog::VersionStatus;

/// A southbound appliance that replays one feed into a URI -> method map
/// and acknowledges what it consumed, the way a DCS/DGW heartbeat would.
pub struct Replica {
    pub uuid: String,
    pub class: ConsumerClass,
    pub version: u64,
    pub state: HashMap<String, ReplayMethod>,
}

impl Replica {
    pub fn register(
        registry: &InMemoryApplianceRegistry,
        uuid: &str,
        class: ConsumerClass,
    ) -> Self {
        let (is_dcs, is_dgw) = match class {
            ConsumerClass::Dcs => (true, false),
            ConsumerClass::Dgw => (false, true),
        };
        registry.register(ServiceAppliance::new(uuid, "10.10.0.1", is_dcs, is_dgw));
        Self {
            uuid: uuid.to_string(),
            class,
            version: 1,
            state: HashMap::new(),
        }
    }

    /// Consumes one slot. Returns `false` when the feed has nothing at or
    /// after the current version.
    pub fn step(
        &mut self,
        feed: &ChangeFeed,
        registry: &InMemoryApplianceRegistry,
    ) -> bool {
        let version = self.version as i64;
        if feed.version_exists(version) == VersionStatus::NoContent {
            return false;
        }

        let change = feed.next_change(self.class, version);
        assert!(change.next_change > self.version, "feed went backwards: {change:?}");
        if change.method != ReplayMethod::Skip {
            self.state.insert(change.uri.clone(), change.method);
        }
        registry
            .acknowledge(&self.uuid, self.class, self.version)
            .unwrap();
        self.version = change.next_change;
        true
    }

    /// Polls until the feed reports no more content.
    pub fn catch_up(
        &mut self,
        feed: &ChangeFeed,
        registry: &InMemoryApplianceRegistry,
    ) -> usize {
        let mut steps = 0;
        while self.step(feed, registry) {
            steps += 1;
        }
        steps
    }

    /// URIs whose latest replayed method is GET.
    pub fn live_uris(&self) -> Vec<String> {
        let mut uris: Vec<String> = self
            .state
            .iter()
            .filter(|(_, method)| **method == ReplayMethod::Get)
            .map(|(uri, _)| uri.clone())
            .collect();
        uris.sort();
        uris
    }
}

pub fn shared_registry() -> Arc<InMemoryApplianceRegistry> {
    Arc::new(InMemoryApplianceRegistry::new())
}
