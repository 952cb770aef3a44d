use std::fmt;
use std::sync::Arc;

use super::*;

/// Concrete type of a log-resident object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ObjectKind {
    Domain,
    Network,
    Subnet,
    Policy,
    NetworkSubnetAssociation,
    EgwFwdRule,
    EgwSnatPool,
    GwIpv4,
    VgwVnidMapping,
    Switch,
}

impl ObjectKind {
    /// Stable label used in logs and metrics.
    pub fn as_str(self) -> &'static str {
        match self {
            ObjectKind::Domain => "domain",
            ObjectKind::Network => "network",
            ObjectKind::Subnet => "subnet",
            ObjectKind::Policy => "policy",
            ObjectKind::NetworkSubnetAssociation => "network_subnet_association",
            ObjectKind::EgwFwdRule => "egw_fwd_rule",
            ObjectKind::EgwSnatPool => "egw_snat_pool",
            ObjectKind::GwIpv4 => "gw_ipv4",
            ObjectKind::VgwVnidMapping => "vgw_vnid_mapping",
            ObjectKind::Switch => "switch",
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A concrete type that can be recorded in the change log.
///
/// The capability is an associated constant, so "which feed sees this
/// object" is decided by the type itself rather than by inspecting values.
pub trait TrackedObject: fmt::Debug + Send + Sync + Sized + 'static {
    const KIND: ObjectKind;
    const CAPABILITY: Capability;

    fn header(&self) -> &ObjectHeader;

    /// Southbound replay path relative to the feed URI prefix.
    /// `None` for types no appliance replays.
    fn replay_path(&self) -> Option<String>;

    fn into_record(self: Arc<Self>) -> Record;

    fn from_record(record: &Record) -> Option<Arc<Self>>;
}

macro_rules! records {
    ($($variant:ident),+ $(,)?) => {
        /// Change log entry: a shared reference to the live object.
        ///
        /// Cloning a record clones the `Arc`, never the object, so every slot
        /// that references an object observes its current state.
        #[derive(Debug, Clone)]
        pub enum Record {
            $($variant(Arc<$variant>)),+
        }

        impl Record {
            pub fn header(&self) -> &ObjectHeader {
                match self {
                    $(Record::$variant(o) => o.header()),+
                }
            }

            pub fn kind(&self) -> ObjectKind {
                match self {
                    $(Record::$variant(_) => <$variant as TrackedObject>::KIND),+
                }
            }

            pub fn capability(&self) -> Capability {
                match self {
                    $(Record::$variant(_) => <$variant as TrackedObject>::CAPABILITY),+
                }
            }

            pub fn replay_path(&self) -> Option<String> {
                match self {
                    $(Record::$variant(o) => o.replay_path()),+
                }
            }
        }

        $(
            impl From<Arc<$variant>> for Record {
                fn from(o: Arc<$variant>) -> Self {
                    Record::$variant(o)
                }
            }
        )+
    };
}

records!(
    Domain,
    Network,
    Subnet,
    Policy,
    NetworkSubnetAssociation,
    EgwFwdRule,
    EgwSnatPool,
    GwIpv4,
    VgwVnidMapping,
    Switch,
);

impl Record {
    pub fn uuid(&self) -> &str {
        self.header().uuid()
    }

    pub fn is_tombstoned(&self) -> bool {
        self.header().is_tombstoned()
    }

    /// Whether a newer allocation of the same UUID replaced this one.
    pub fn is_superseded(&self) -> bool {
        self.header().superseded_version() > 0
    }

    /// Whether both records reference the same allocation.
    pub fn same_object(
        &self,
        other: &Record,
    ) -> bool {
        std::ptr::eq(self.header(), other.header())
    }
}
