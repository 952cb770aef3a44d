//! One change log plus a typed view per tracked type.
//!
//! Writers go through the views; feeds read the log; the garbage collector
//! purges through [`ObjectStore::purge`] and
//! [`ObjectStore::discard_superseded`], the only places a slot leaves the
//! log.

use std::sync::Arc;

use tracing::debug;
use tracing::trace;

use super::ChangeLog;
use super::TypedView;
use crate::model::*;

#[derive(Debug)]
pub struct ObjectStore {
    log: Arc<ChangeLog>,

    pub domains: TypedView<Domain>,
    pub networks: TypedView<Network>,
    pub subnets: TypedView<Subnet>,
    pub policies: TypedView<Policy>,
    pub associations: TypedView<NetworkSubnetAssociation>,
    pub fwd_rules: TypedView<EgwFwdRule>,
    pub snat_pools: TypedView<EgwSnatPool>,
    pub gw_ipv4s: TypedView<GwIpv4>,
    pub vnid_mappings: TypedView<VgwVnidMapping>,
    pub switches: TypedView<Switch>,
}

impl Default for ObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ObjectStore {
    pub fn new() -> Self {
        Self::with_log(Arc::new(ChangeLog::new()))
    }

    /// Builds views over an existing, possibly shared, change log.
    pub fn with_log(log: Arc<ChangeLog>) -> Self {
        Self {
            domains: TypedView::new(log.clone()),
            networks: TypedView::new(log.clone()),
            subnets: TypedView::new(log.clone()),
            policies: TypedView::new(log.clone()),
            associations: TypedView::new(log.clone()),
            fwd_rules: TypedView::new(log.clone()),
            snat_pools: TypedView::new(log.clone()),
            gw_ipv4s: TypedView::new(log.clone()),
            vnid_mappings: TypedView::new(log.clone()),
            switches: TypedView::new(log.clone()),
            log,
        }
    }

    pub fn change_log(&self) -> &Arc<ChangeLog> {
        &self.log
    }

    pub fn domain_by_number(
        &self,
        domain_id: u32,
    ) -> Option<Arc<Domain>> {
        self.domains.values().into_iter().find(|d| d.domain_id == domain_id)
    }

    pub fn network_by_vnid(
        &self,
        vnid: u32,
    ) -> Option<Arc<Network>> {
        self.networks.values().into_iter().find(|n| n.vnid == vnid)
    }

    /// Physically removes one slot of a tombstoned object.
    ///
    /// Dependent reference lists are cleaned first (skipped when a newer
    /// allocation of the same UUID is indexed), then the slot leaves the
    /// log, then the object leaves its view unless a newer allocation of the
    /// same UUID is indexed there. Interrupting this sequence can
    /// only leave an orphaned slot, never a live reference to a purged
    /// object. Returns `false` when the slot was already gone.
    pub(crate) fn purge(
        &self,
        version: u64,
        record: &Record,
    ) -> bool {
        // A re-created UUID owns the parent references now.
        if !self.indexes_other_allocation(record) {
            self.detach_references(record);
        }

        if self.log.remove(version).is_none() {
            return false;
        }

        let evicted = match record {
            Record::Domain(obj) => self.domains.evict(obj),
            Record::Network(obj) => self.networks.evict(obj),
            Record::Subnet(obj) => self.subnets.evict(obj),
            Record::Policy(obj) => self.policies.evict(obj),
            Record::NetworkSubnetAssociation(obj) => self.associations.evict(obj),
            Record::EgwFwdRule(obj) => self.fwd_rules.evict(obj),
            Record::EgwSnatPool(obj) => self.snat_pools.evict(obj),
            Record::GwIpv4(obj) => self.gw_ipv4s.evict(obj),
            Record::VgwVnidMapping(obj) => self.vnid_mappings.evict(obj),
            Record::Switch(obj) => self.switches.evict(obj),
        };

        debug!(kind = %record.kind(), uuid = record.uuid(), version, evicted, "slot purged");
        true
    }

    /// Drops a slot that still references a superseded allocation. The
    /// object itself stays live under its replacement, so neither views nor
    /// reference lists are touched.
    pub(crate) fn discard_superseded(
        &self,
        version: u64,
    ) -> bool {
        match self.log.remove(version) {
            Some(record) => {
                trace!(kind = %record.kind(), uuid = record.uuid(), version, "superseded slot discarded");
                true
            }
            None => false,
        }
    }

    /// Whether the owning view indexes a different allocation under
    /// `record`'s UUID.
    fn indexes_other_allocation(
        &self,
        record: &Record,
    ) -> bool {
        match record {
            Record::Domain(obj) => self.domains.indexes_other(obj),
            Record::Network(obj) => self.networks.indexes_other(obj),
            Record::Subnet(obj) => self.subnets.indexes_other(obj),
            Record::Policy(obj) => self.policies.indexes_other(obj),
            Record::NetworkSubnetAssociation(obj) => self.associations.indexes_other(obj),
            Record::EgwFwdRule(obj) => self.fwd_rules.indexes_other(obj),
            Record::EgwSnatPool(obj) => self.snat_pools.indexes_other(obj),
            Record::GwIpv4(obj) => self.gw_ipv4s.indexes_other(obj),
            Record::VgwVnidMapping(obj) => self.vnid_mappings.indexes_other(obj),
            Record::Switch(obj) => self.switches.indexes_other(obj),
        }
    }

    /// Strips `record`'s UUID from every composite list that may hold it.
    fn detach_references(
        &self,
        record: &Record,
    ) {
        let uuid = record.uuid();
        match record {
            Record::Network(_) => {
                for domain in self.domains.values() {
                    if domain.remove_network(uuid) {
                        debug!(domain = domain.header().uuid(), network = uuid, "detached network");
                    }
                }
            }
            Record::Subnet(_) => {
                for domain in self.domains.values() {
                    if domain.remove_subnet(uuid) {
                        debug!(domain = domain.header().uuid(), subnet = uuid, "detached subnet");
                    }
                }
            }
            Record::Switch(_) => {
                for network in self.networks.values() {
                    if network.remove_hosting_switch(uuid) {
                        debug!(network = network.header().uuid(), switch = uuid, "detached switch");
                    }
                }
            }
            _ => {}
        }
    }
}
