use std::sync::Arc;

use crate::model::*;
use crate::ObjectStore;
use crate::ServiceAppliance;

pub(crate) fn random_uuid() -> String {
    nanoid::nanoid!()
}

pub(crate) fn mock_domain(domain_id: u32) -> Arc<Domain> {
    Arc::new(Domain::new(random_uuid(), format!("domain-{domain_id}"), domain_id))
}

pub(crate) fn mock_network(
    domain: &Domain,
    vnid: u32,
) -> Arc<Network> {
    Arc::new(Network::new(
        random_uuid(),
        format!("net-{vnid}"),
        vnid,
        domain.header().uuid(),
        0,
    ))
}

pub(crate) fn mock_subnet(domain: &Domain) -> Arc<Subnet> {
    Arc::new(Subnet::new(
        random_uuid(),
        "10.0.0.0",
        "255.255.255.0",
        "10.0.0.1",
        "dedicated",
        domain.header().uuid(),
    ))
}

pub(crate) fn mock_fwd_rule(vnid: u32) -> Arc<EgwFwdRule> {
    Arc::new(EgwFwdRule::new(
        random_uuid(),
        "gw-1",
        vnid,
        6,
        "9.0.0.1",
        80,
        "10.0.0.5",
        8080,
    ))
}

pub(crate) fn mock_gw_ipv4() -> Arc<GwIpv4> {
    Arc::new(GwIpv4::new(
        random_uuid(),
        "gw-1",
        "9.0.0.1",
        "255.255.255.0",
        "9.0.0.254",
        "external",
        0,
    ))
}

pub(crate) fn mock_switch() -> Arc<Switch> {
    Arc::new(Switch::new(random_uuid(), "tor", "10.1.1.1", "192.168.0.1"))
}

/// Creates a domain with one network that references it and returns both.
pub(crate) fn seed_domain_with_network(
    store: &ObjectStore,
    domain_id: u32,
    vnid: u32,
) -> (Arc<Domain>, Arc<Network>) {
    let domain = mock_domain(domain_id);
    assert!(store.domains.put_if_absent(domain.clone()).is_none());

    let network = mock_network(&domain, vnid);
    assert!(store.networks.put_if_absent(network.clone()).is_none());

    domain.add_network(network.header().uuid());
    store.domains.update(domain.clone()).expect("domain indexed");
    (domain, network)
}

pub(crate) fn dcs_appliance(dcs_config_version: u64) -> ServiceAppliance {
    ServiceAppliance {
        dcs_config_version,
        ..ServiceAppliance::new(random_uuid(), "192.168.10.1", true, false)
    }
}

pub(crate) fn dgw_appliance(dgw_config_version: u64) -> ServiceAppliance {
    ServiceAppliance {
        dgw_config_version,
        ..ServiceAppliance::new(random_uuid(), "192.168.10.2", false, true)
    }
}
