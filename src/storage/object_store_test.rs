use std::sync::Arc;

use crate::model::*;
use crate::test_utils::*;
use crate::ObjectStore;

#[test]
fn test_lookup_by_southbound_numbers() {
    let store = ObjectStore::new();
    let (domain, network) = seed_domain_with_network(&store, 12, 7012);

    let by_number = store.domain_by_number(12).expect("domain 12");
    assert_eq!(by_number.header().uuid(), domain.header().uuid());
    let by_vnid = store.network_by_vnid(7012).expect("vnid 7012");
    assert_eq!(by_vnid.header().uuid(), network.header().uuid());

    assert!(store.domain_by_number(13).is_none());
    assert!(store.network_by_vnid(1).is_none());
}

#[test]
fn test_all_views_share_one_log() {
    let store = ObjectStore::new();
    seed_domain_with_network(&store, 1, 7001);
    store.fwd_rules.put_if_absent(mock_fwd_rule(7001));
    store.switches.put_if_absent(mock_switch());

    // domain create, network create, domain update, rule, switch
    assert_eq!(store.change_log().versions(), vec![1, 2, 3, 4, 5]);
}

#[test]
fn test_purge_network_detaches_it_from_domain_first() {
    let store = ObjectStore::new();
    let (domain, network) = seed_domain_with_network(&store, 1, 7001);
    let uuid = network.header().uuid().to_string();
    let slot = store.networks.tombstone(&uuid).unwrap();
    let record = store.change_log().get(slot).unwrap();

    assert!(store.purge(slot, &record));

    assert!(domain.networks().is_empty());
    assert!(store.change_log().get(slot).is_none());
    assert!(!store.networks.exists(&uuid));
}

#[test]
fn test_purge_subnet_detaches_it_from_domain() {
    let store = ObjectStore::new();
    let domain = mock_domain(1);
    store.domains.put_if_absent(domain.clone());
    let subnet = mock_subnet(&domain);
    store.subnets.put_if_absent(subnet.clone());
    domain.add_subnet(subnet.header().uuid());

    let slot = store.subnets.tombstone(subnet.header().uuid()).unwrap();
    let record = store.change_log().get(slot).unwrap();
    store.purge(slot, &record);

    assert!(domain.subnets().is_empty());
}

#[test]
fn test_purge_switch_detaches_it_from_every_hosting_list() {
    let store = ObjectStore::new();
    let (_, first) = seed_domain_with_network(&store, 1, 7001);
    let (_, second) = seed_domain_with_network(&store, 2, 7002);
    let switch = mock_switch();
    store.switches.put_if_absent(switch.clone());
    first.add_hosting_switch(switch.header().uuid());
    second.add_hosting_switch(switch.header().uuid());

    let slot = store.switches.tombstone(switch.header().uuid()).unwrap();
    let record = store.change_log().get(slot).unwrap();
    store.purge(slot, &record);

    assert!(first.hosting_switches().is_empty());
    assert!(second.hosting_switches().is_empty());
    assert!(!store.switches.exists(switch.header().uuid()));
}

#[test]
fn test_purge_of_missing_slot_reports_false() {
    let store = ObjectStore::new();
    let domain = mock_domain(1);
    store.domains.put_if_absent(domain.clone());
    let record = store.change_log().get(1).unwrap();

    assert!(store.purge(1, &record));
    assert!(!store.purge(1, &record));
}

#[test]
fn test_purge_of_old_switch_keeps_recreated_switch_hosted() {
    let store = ObjectStore::new();
    let (_, network) = seed_domain_with_network(&store, 1, 7001);
    let old = mock_switch();
    let uuid = old.header().uuid().to_string();
    store.switches.put_if_absent(old.clone());
    network.add_hosting_switch(&uuid);
    let slot = store.switches.tombstone(&uuid).unwrap();

    store.switches.remove(&uuid);
    let recreated = Arc::new(Switch::new(uuid.clone(), "tor", "10.1.1.2", "192.168.0.2"));
    store.switches.put_if_absent(recreated.clone());
    let record = store.change_log().get(slot).unwrap();

    assert!(store.purge(slot, &record));
    assert_eq!(network.hosting_switches(), vec![uuid.clone()]);
    assert!(Arc::ptr_eq(&store.switches.get(&uuid).unwrap(), &recreated));
}
