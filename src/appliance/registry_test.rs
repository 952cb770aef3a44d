use crate::test_utils::*;
use crate::ApplianceError;
use crate::ApplianceRegistry;
use crate::ConsumerClass;
use crate::Error;
use crate::InMemoryApplianceRegistry;
use crate::ServiceAppliance;

#[test]
fn test_watermark_requires_role() {
    let appliance = ServiceAppliance {
        dcs_config_version: 5,
        dgw_config_version: 9,
        ..ServiceAppliance::new("a-1", "10.0.0.1", true, false)
    };

    assert_eq!(appliance.watermark(ConsumerClass::Dcs), Some(5));
    assert_eq!(appliance.watermark(ConsumerClass::Dgw), None);
}

#[test]
fn test_register_and_list() {
    let registry = InMemoryApplianceRegistry::new();
    assert!(registry.is_empty());

    registry.register(dcs_appliance(3));
    registry.register(dgw_appliance(4));

    let listed = registry.list_appliances().unwrap();
    assert_eq!(listed.len(), 2);
    assert_eq!(registry.len(), 2);
}

#[test]
fn test_register_replaces_same_uuid() {
    let registry = InMemoryApplianceRegistry::new();
    let mut appliance = dcs_appliance(1);
    registry.register(appliance.clone());
    appliance.ip = "10.9.9.9".into();
    registry.register(appliance.clone());

    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get(&appliance.uuid).unwrap().ip, "10.9.9.9");
}

#[test]
fn test_acknowledge_only_moves_forward() {
    let registry = InMemoryApplianceRegistry::new();
    let appliance = dcs_appliance(0);
    registry.register(appliance.clone());

    assert_eq!(registry.acknowledge(&appliance.uuid, ConsumerClass::Dcs, 7).unwrap(), 7);
    assert_eq!(registry.acknowledge(&appliance.uuid, ConsumerClass::Dcs, 4).unwrap(), 7);
    assert_eq!(registry.get(&appliance.uuid).unwrap().dcs_config_version, 7);
}

#[test]
fn test_acknowledge_for_role_not_held_fails() {
    let registry = InMemoryApplianceRegistry::new();
    let appliance = dcs_appliance(0);
    registry.register(appliance.clone());

    let result = registry.acknowledge(&appliance.uuid, ConsumerClass::Dgw, 3);

    assert!(matches!(
        result,
        Err(Error::Appliance(ApplianceError::RoleNotHeld {
            class: ConsumerClass::Dgw,
            ..
        }))
    ));
}

#[test]
fn test_unknown_appliance_is_reported() {
    let registry = InMemoryApplianceRegistry::new();

    assert!(matches!(
        registry.acknowledge("missing", ConsumerClass::Dcs, 1),
        Err(Error::Appliance(ApplianceError::NotFound(_)))
    ));
    assert!(matches!(
        registry.assign_roles("missing", true, true),
        Err(Error::Appliance(ApplianceError::NotFound(_)))
    ));
}

#[test]
fn test_assign_roles_then_deregister() {
    let registry = InMemoryApplianceRegistry::new();
    let appliance = dcs_appliance(0);
    registry.register(appliance.clone());

    registry.assign_roles(&appliance.uuid, true, true).unwrap();
    registry.acknowledge(&appliance.uuid, ConsumerClass::Dgw, 2).unwrap();
    let updated = registry.get(&appliance.uuid).unwrap();
    assert!(updated.is_dgw);
    assert_eq!(updated.watermark(ConsumerClass::Dgw), Some(2));

    assert!(registry.deregister(&appliance.uuid).is_some());
    assert!(registry.deregister(&appliance.uuid).is_none());
    assert!(registry.list_appliances().unwrap().is_empty());
}
