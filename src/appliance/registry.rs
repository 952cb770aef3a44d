use dashmap::DashMap;
#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::info;

use crate::ApplianceError;
use crate::ConsumerClass;
use crate::Result;

/// A registered DCS and/or DGW appliance with its consumption watermarks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceAppliance {
    pub uuid: String,
    pub ip: String,
    pub is_dcs: bool,
    pub is_dgw: bool,
    /// Highest change log slot consumed through the DCS feed
    pub dcs_config_version: u64,
    /// Highest change log slot consumed through the DGW feed
    pub dgw_config_version: u64,
}

impl ServiceAppliance {
    pub fn new(
        uuid: impl Into<String>,
        ip: impl Into<String>,
        is_dcs: bool,
        is_dgw: bool,
    ) -> Self {
        Self {
            uuid: uuid.into(),
            ip: ip.into(),
            is_dcs,
            is_dgw,
            dcs_config_version: 0,
            dgw_config_version: 0,
        }
    }

    pub fn holds(
        &self,
        class: ConsumerClass,
    ) -> bool {
        match class {
            ConsumerClass::Dcs => self.is_dcs,
            ConsumerClass::Dgw => self.is_dgw,
        }
    }

    /// The watermark for `class`, or `None` when the role is not held.
    pub fn watermark(
        &self,
        class: ConsumerClass,
    ) -> Option<u64> {
        if !self.holds(class) {
            return None;
        }
        Some(match class {
            ConsumerClass::Dcs => self.dcs_config_version,
            ConsumerClass::Dgw => self.dgw_config_version,
        })
    }
}

/// Read surface of the appliance registry consumed by the collector.
#[cfg_attr(test, automock)]
pub trait ApplianceRegistry: Send + Sync + 'static {
    /// Snapshot of every currently registered appliance.
    ///
    /// An error means the registry is unreachable; callers must not treat it
    /// as "no appliances".
    fn list_appliances(&self) -> Result<Vec<ServiceAppliance>>;
}

/// Process-local registry backed by a concurrent map.
#[derive(Debug, Default)]
pub struct InMemoryApplianceRegistry {
    appliances: DashMap<String, ServiceAppliance>,
}

impl InMemoryApplianceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an appliance.
    pub fn register(
        &self,
        appliance: ServiceAppliance,
    ) {
        info!(
            uuid = %appliance.uuid,
            ip = %appliance.ip,
            is_dcs = appliance.is_dcs,
            is_dgw = appliance.is_dgw,
            "service appliance registered"
        );
        self.appliances.insert(appliance.uuid.clone(), appliance);
    }

    pub fn deregister(
        &self,
        uuid: &str,
    ) -> Option<ServiceAppliance> {
        let removed = self.appliances.remove(uuid).map(|(_, a)| a);
        if removed.is_some() {
            info!(uuid, "service appliance deregistered");
        }
        removed
    }

    pub fn get(
        &self,
        uuid: &str,
    ) -> Option<ServiceAppliance> {
        self.appliances.get(uuid).map(|a| a.value().clone())
    }

    /// Role assignment from the management plane.
    pub fn assign_roles(
        &self,
        uuid: &str,
        is_dcs: bool,
        is_dgw: bool,
    ) -> Result<()> {
        let mut appliance = self
            .appliances
            .get_mut(uuid)
            .ok_or_else(|| ApplianceError::NotFound(uuid.to_string()))?;
        appliance.is_dcs = is_dcs;
        appliance.is_dgw = is_dgw;
        info!(uuid, is_dcs, is_dgw, "service appliance roles assigned");
        Ok(())
    }

    /// Heartbeat acknowledgement of the highest slot consumed through the
    /// `class` feed. Watermarks only move forward; a stale heartbeat is
    /// ignored. Returns the stored watermark.
    pub fn acknowledge(
        &self,
        uuid: &str,
        class: ConsumerClass,
        version: u64,
    ) -> Result<u64> {
        let mut appliance = self
            .appliances
            .get_mut(uuid)
            .ok_or_else(|| ApplianceError::NotFound(uuid.to_string()))?;
        if !appliance.holds(class) {
            return Err(ApplianceError::RoleNotHeld {
                uuid: uuid.to_string(),
                class,
            }
            .into());
        }

        let watermark = match class {
            ConsumerClass::Dcs => &mut appliance.dcs_config_version,
            ConsumerClass::Dgw => &mut appliance.dgw_config_version,
        };
        *watermark = (*watermark).max(version);
        let stored = *watermark;
        debug!(uuid, %class, version, stored, "config version acknowledged");
        Ok(stored)
    }

    pub fn len(&self) -> usize {
        self.appliances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.appliances.is_empty()
    }
}

impl ApplianceRegistry for InMemoryApplianceRegistry {
    fn list_appliances(&self) -> Result<Vec<ServiceAppliance>> {
        Ok(self.appliances.iter().map(|a| a.value().clone()).collect())
    }
}
