//! Concrete log-resident objects.
//!
//! Immutable attributes are plain fields. Attributes that writers change in
//! place (names, composite reference lists) sit behind a `RwLock`, because
//! the same allocation is shared by the change log and the typed views.

use std::sync::Arc;

use parking_lot::RwLock;

use super::*;

macro_rules! tracked {
    ($ty:ident, Untracked) => {
        impl TrackedObject for $ty {
            const KIND: ObjectKind = ObjectKind::$ty;
            const CAPABILITY: Capability = Capability::Untracked;

            fn header(&self) -> &ObjectHeader {
                &self.header
            }

            fn replay_path(&self) -> Option<String> {
                None
            }

            fn into_record(self: Arc<Self>) -> Record {
                Record::$ty(self)
            }

            fn from_record(record: &Record) -> Option<Arc<Self>> {
                match record {
                    Record::$ty(o) => Some(o.clone()),
                    _ => None,
                }
            }
        }
    };
    ($ty:ident, $cap:ident, |$this:ident| $path:expr) => {
        impl TrackedObject for $ty {
            const KIND: ObjectKind = ObjectKind::$ty;
            const CAPABILITY: Capability = Capability::$cap;

            fn header(&self) -> &ObjectHeader {
                &self.header
            }

            fn replay_path(&self) -> Option<String> {
                let $this = self;
                Some($path)
            }

            fn into_record(self: Arc<Self>) -> Record {
                Record::$ty(self)
            }

            fn from_record(record: &Record) -> Option<Arc<Self>> {
                match record {
                    Record::$ty(o) => Some(o.clone()),
                    _ => None,
                }
            }
        }
    };
}

/// Removes `uuid` from a reference list, reporting whether it was present.
fn detach(
    list: &RwLock<Vec<String>>,
    uuid: &str,
) -> bool {
    let mut guard = list.write();
    let before = guard.len();
    guard.retain(|u| u != uuid);
    guard.len() != before
}

fn attach(
    list: &RwLock<Vec<String>>,
    uuid: &str,
) {
    let mut guard = list.write();
    if !guard.iter().any(|u| u == uuid) {
        guard.push(uuid.to_string());
    }
}

// --- DCS-tracked ---

/// Tenant domain. Owns the networks and subnets created inside it.
#[derive(Debug)]
pub struct Domain {
    header: ObjectHeader,
    /// Southbound domain number
    pub domain_id: u32,
    name: RwLock<String>,
    networks: RwLock<Vec<String>>,
    subnets: RwLock<Vec<String>>,
}

impl Domain {
    pub fn new(
        uuid: impl Into<String>,
        name: impl Into<String>,
        domain_id: u32,
    ) -> Self {
        Self {
            header: ObjectHeader::new(uuid),
            domain_id,
            name: RwLock::new(name.into()),
            networks: RwLock::new(Vec::new()),
            subnets: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn rename(
        &self,
        name: impl Into<String>,
    ) {
        *self.name.write() = name.into();
    }

    pub fn networks(&self) -> Vec<String> {
        self.networks.read().clone()
    }

    pub fn add_network(
        &self,
        network_uuid: &str,
    ) {
        attach(&self.networks, network_uuid);
    }

    pub fn remove_network(
        &self,
        network_uuid: &str,
    ) -> bool {
        detach(&self.networks, network_uuid)
    }

    pub fn subnets(&self) -> Vec<String> {
        self.subnets.read().clone()
    }

    pub fn add_subnet(
        &self,
        subnet_uuid: &str,
    ) {
        attach(&self.subnets, subnet_uuid);
    }

    pub fn remove_subnet(
        &self,
        subnet_uuid: &str,
    ) -> bool {
        detach(&self.subnets, subnet_uuid)
    }
}

tracked!(Domain, Dcs, |d| format!("/domains/bynumber/{}", d.domain_id));

/// Virtual network (VNID) inside a domain.
#[derive(Debug)]
pub struct Network {
    header: ObjectHeader,
    /// Southbound virtual network id
    pub vnid: u32,
    pub domain_uuid: String,
    /// 0 = tenant network, 1 = external network
    pub network_type: u32,
    name: RwLock<String>,
    hosting_switches: RwLock<Vec<String>>,
}

impl Network {
    pub fn new(
        uuid: impl Into<String>,
        name: impl Into<String>,
        vnid: u32,
        domain_uuid: impl Into<String>,
        network_type: u32,
    ) -> Self {
        Self {
            header: ObjectHeader::new(uuid),
            vnid,
            domain_uuid: domain_uuid.into(),
            network_type,
            name: RwLock::new(name.into()),
            hosting_switches: RwLock::new(Vec::new()),
        }
    }

    pub fn name(&self) -> String {
        self.name.read().clone()
    }

    pub fn rename(
        &self,
        name: impl Into<String>,
    ) {
        *self.name.write() = name.into();
    }

    pub fn hosting_switches(&self) -> Vec<String> {
        self.hosting_switches.read().clone()
    }

    pub fn add_hosting_switch(
        &self,
        switch_uuid: &str,
    ) {
        attach(&self.hosting_switches, switch_uuid);
    }

    pub fn remove_hosting_switch(
        &self,
        switch_uuid: &str,
    ) -> bool {
        detach(&self.hosting_switches, switch_uuid)
    }
}

tracked!(Network, Dcs, |n| format!("/networks/{}", n.header.uuid()));

#[derive(Debug)]
pub struct Subnet {
    header: ObjectHeader,
    pub subnet: String,
    pub mask: String,
    pub nexthop: String,
    /// "dedicated" or "shared"
    pub subnet_type: String,
    pub domain_uuid: String,
}

impl Subnet {
    pub fn new(
        uuid: impl Into<String>,
        subnet: impl Into<String>,
        mask: impl Into<String>,
        nexthop: impl Into<String>,
        subnet_type: impl Into<String>,
        domain_uuid: impl Into<String>,
    ) -> Self {
        Self {
            header: ObjectHeader::new(uuid),
            subnet: subnet.into(),
            mask: mask.into(),
            nexthop: nexthop.into(),
            subnet_type: subnet_type.into(),
            domain_uuid: domain_uuid.into(),
        }
    }
}

tracked!(Subnet, Dcs, |s| format!("/odcs/subnets/{}", s.header.uuid()));

/// Inter-network traffic policy between two VNIDs of a domain.
#[derive(Debug)]
pub struct Policy {
    header: ObjectHeader,
    pub domain_uuid: String,
    pub src_vnid: u32,
    pub dst_vnid: u32,
    /// 1 = unicast, 2 = multicast
    pub traffic_type: u8,
    /// 0 = drop, 1 = forward
    pub action: u32,
}

impl Policy {
    pub fn new(
        uuid: impl Into<String>,
        domain_uuid: impl Into<String>,
        src_vnid: u32,
        dst_vnid: u32,
        traffic_type: u8,
        action: u32,
    ) -> Self {
        Self {
            header: ObjectHeader::new(uuid),
            domain_uuid: domain_uuid.into(),
            src_vnid,
            dst_vnid,
            traffic_type,
            action,
        }
    }
}

tracked!(Policy, Dcs, |p| format!("/odcs/policy/{}", p.header.uuid()));

#[derive(Debug)]
pub struct NetworkSubnetAssociation {
    header: ObjectHeader,
    pub vnid: u32,
    pub subnet_uuid: String,
}

impl NetworkSubnetAssociation {
    pub fn new(
        uuid: impl Into<String>,
        vnid: u32,
        subnet_uuid: impl Into<String>,
    ) -> Self {
        Self {
            header: ObjectHeader::new(uuid),
            vnid,
            subnet_uuid: subnet_uuid.into(),
        }
    }
}

tracked!(NetworkSubnetAssociation, Dcs, |a| format!(
    "/networks/{}/subnets/{}",
    a.vnid, a.subnet_uuid
));

// --- DGW-tracked ---

/// External gateway port-forwarding rule.
#[derive(Debug)]
pub struct EgwFwdRule {
    header: ObjectHeader,
    pub gateway_uuid: String,
    pub vnid: u32,
    pub protocol: u16,
    pub external_ip: String,
    pub external_port: u16,
    pub internal_ip: String,
    pub internal_port: u16,
}

impl EgwFwdRule {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        uuid: impl Into<String>,
        gateway_uuid: impl Into<String>,
        vnid: u32,
        protocol: u16,
        external_ip: impl Into<String>,
        external_port: u16,
        internal_ip: impl Into<String>,
        internal_port: u16,
    ) -> Self {
        Self {
            header: ObjectHeader::new(uuid),
            gateway_uuid: gateway_uuid.into(),
            vnid,
            protocol,
            external_ip: external_ip.into(),
            external_port,
            internal_ip: internal_ip.into(),
            internal_port,
        }
    }
}

tracked!(EgwFwdRule, Dgw, |r| format!("/odgw/fwdrules/{}", r.header.uuid()));

/// External gateway source-NAT address and port pool.
#[derive(Debug)]
pub struct EgwSnatPool {
    header: ObjectHeader,
    pub gateway_uuid: String,
    pub vnid: u32,
    pub min_ip: String,
    pub max_ip: String,
    pub min_port: u16,
    pub max_port: u16,
}

impl EgwSnatPool {
    pub fn new(
        uuid: impl Into<String>,
        gateway_uuid: impl Into<String>,
        vnid: u32,
        ip_range: (impl Into<String>, impl Into<String>),
        port_range: (u16, u16),
    ) -> Self {
        Self {
            header: ObjectHeader::new(uuid),
            gateway_uuid: gateway_uuid.into(),
            vnid,
            min_ip: ip_range.0.into(),
            max_ip: ip_range.1.into(),
            min_port: port_range.0,
            max_port: port_range.1,
        }
    }
}

tracked!(EgwSnatPool, Dgw, |p| format!("/odgw/snatpools/{}", p.header.uuid()));

/// IPv4 interface address configured on a gateway.
#[derive(Debug)]
pub struct GwIpv4 {
    header: ObjectHeader,
    pub gateway_uuid: String,
    pub ip: String,
    pub mask: String,
    pub nexthop: String,
    /// "external" or "dovenet"
    pub ip_type: String,
    pub vlan: u16,
}

impl GwIpv4 {
    pub fn new(
        uuid: impl Into<String>,
        gateway_uuid: impl Into<String>,
        ip: impl Into<String>,
        mask: impl Into<String>,
        nexthop: impl Into<String>,
        ip_type: impl Into<String>,
        vlan: u16,
    ) -> Self {
        Self {
            header: ObjectHeader::new(uuid),
            gateway_uuid: gateway_uuid.into(),
            ip: ip.into(),
            mask: mask.into(),
            nexthop: nexthop.into(),
            ip_type: ip_type.into(),
            vlan,
        }
    }
}

tracked!(GwIpv4, Dgw, |g| format!("/odgw/ipv4/{}", g.header.uuid()));

/// VLAN gateway mapping between a VLAN and a VNID.
#[derive(Debug)]
pub struct VgwVnidMapping {
    header: ObjectHeader,
    pub gateway_uuid: String,
    pub vlan: u16,
    pub vnid: u32,
}

impl VgwVnidMapping {
    pub fn new(
        uuid: impl Into<String>,
        gateway_uuid: impl Into<String>,
        vlan: u16,
        vnid: u32,
    ) -> Self {
        Self {
            header: ObjectHeader::new(uuid),
            gateway_uuid: gateway_uuid.into(),
            vlan,
            vnid,
        }
    }
}

tracked!(VgwVnidMapping, Dgw, |m| format!("/odgw/vnidmappings/{}", m.header.uuid()));

// --- untracked ---

/// Hypervisor switch hosting network endpoints.
#[derive(Debug)]
pub struct Switch {
    header: ObjectHeader,
    pub name: String,
    pub tep_ip: String,
    pub management_ip: String,
}

impl Switch {
    pub fn new(
        uuid: impl Into<String>,
        name: impl Into<String>,
        tep_ip: impl Into<String>,
        management_ip: impl Into<String>,
    ) -> Self {
        Self {
            header: ObjectHeader::new(uuid),
            name: name.into(),
            tep_ip: tep_ip.into(),
            management_ip: management_ip.into(),
        }
    }
}

tracked!(Switch, Untracked);
