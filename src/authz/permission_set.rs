use std::collections::BTreeMap;

use serde::de::{Deserializer, Error as _};
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};

use super::capability::{Capability, Domain};

/// A flat, total mapping from capability to granted/denied.
///
/// Totality is the structural invariant: every constructor yields a value for
/// every capability in `Capability::ALL`, and serialization always emits the
/// full key set. Reading a persisted set is tolerant instead: keys missing
/// from the blob default to `false` (new capabilities are opt-in), and keys
/// that no longer exist in the catalog are dropped with a warning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSet(BTreeMap<Capability, bool>);

impl PermissionSet {
    /// All capabilities denied.
    pub fn none() -> Self {
        Self(Capability::ALL.iter().map(|c| (*c, false)).collect())
    }

    /// All capabilities granted. This is the admin default.
    pub fn all() -> Self {
        Self(Capability::ALL.iter().map(|c| (*c, true)).collect())
    }

    /// A set granting exactly the listed capabilities.
    pub fn from_granted(granted: &[Capability]) -> Self {
        let mut set = Self::none();
        for cap in granted {
            set.set(*cap, true);
        }
        set
    }

    pub fn is_granted(&self, cap: Capability) -> bool {
        self.0.get(&cap).copied().unwrap_or(false)
    }

    pub fn set(&mut self, cap: Capability, granted: bool) {
        self.0.insert(cap, granted);
    }

    pub fn toggle(&mut self, cap: Capability) {
        let current = self.is_granted(cap);
        self.set(cap, !current);
    }

    pub fn granted_count(&self) -> usize {
        self.0.values().filter(|granted| **granted).count()
    }

    pub fn iter(&self) -> impl Iterator<Item = (Capability, bool)> + '_ {
        self.0.iter().map(|(cap, granted)| (*cap, *granted))
    }

    /// Per-domain presentation view for the permissions editor.
    pub fn grouped(&self) -> Vec<DomainGroup> {
        Domain::ALL
            .iter()
            .map(|domain| DomainGroup {
                domain: *domain,
                label: domain.label(),
                capabilities: Capability::ALL
                    .iter()
                    .filter(|cap| cap.domain() == *domain)
                    .map(|cap| CapabilityFlag {
                        capability: *cap,
                        granted: self.is_granted(*cap),
                    })
                    .collect(),
            })
            .collect()
    }

    /// Parse a persisted JSON blob. Any failure to parse the blob at all
    /// yields the all-denied set rather than an error: a mangled permission
    /// record must lock the employee out, never let everything in.
    pub fn from_stored_json(raw: &str) -> Self {
        match serde_json::from_str::<PermissionSet>(raw) {
            Ok(set) => set,
            Err(err) => {
                tracing::warn!(error = %err, "unparseable stored permission set, treating as all-denied");
                Self::none()
            }
        }
    }
}

impl Default for PermissionSet {
    fn default() -> Self {
        Self::none()
    }
}

impl Serialize for PermissionSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (cap, granted) in &self.0 {
            map.serialize_entry(cap.as_str(), granted)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for PermissionSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = BTreeMap::<String, serde_json::Value>::deserialize(deserializer)?;
        let mut set = PermissionSet::none();
        for (name, value) in raw {
            let granted = value
                .as_bool()
                .ok_or_else(|| D::Error::custom(format!("capability `{name}` must be a boolean")))?;
            match Capability::from_name(&name) {
                Some(cap) => set.set(cap, granted),
                None => {
                    tracing::warn!(capability = %name, "ignoring unknown capability in permission set");
                }
            }
        }
        Ok(set)
    }
}

/// One editor group: a domain heading plus its capability toggles.
#[derive(Debug, Clone, Serialize)]
pub struct DomainGroup {
    pub domain: Domain,
    pub label: &'static str,
    pub capabilities: Vec<CapabilityFlag>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CapabilityFlag {
    pub capability: Capability,
    pub granted: bool,
}
