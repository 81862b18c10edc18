use serde::{Deserialize, Serialize};

use super::capability::Capability;
use super::permission_set::PermissionSet;

/// Policy for reducing a required-capability list to a single allow/deny.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Combinator {
    /// At least one required capability must be granted.
    Any,
    /// Every required capability must be granted.
    All,
}

/// The single authorization decision function.
///
/// The route guard, subtree guard and action guard all call this and nothing
/// else, so the three enforcement points cannot drift apart. Pure, no side
/// effects, never panics. An empty requirement always authorizes.
pub fn authorize(effective: &PermissionSet, required: &[Capability], combinator: Combinator) -> bool {
    if required.is_empty() {
        return true;
    }
    match combinator {
        Combinator::Any => required.iter().any(|cap| effective.is_granted(*cap)),
        Combinator::All => required.iter().all(|cap| effective.is_granted(*cap)),
    }
}

/// The authorization clause shared by route rules and UI guards.
///
/// Server and client enforcement reuse this one shape, so a route rule and
/// the guard protecting the matching screen cannot silently diverge in
/// structure (their data may still differ, e.g. a stale client cache).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardRequirement {
    pub required: Vec<Capability>,
    pub combinator: Combinator,
}

impl GuardRequirement {
    pub fn any(required: impl Into<Vec<Capability>>) -> Self {
        Self {
            required: required.into(),
            combinator: Combinator::Any,
        }
    }

    pub fn all(required: impl Into<Vec<Capability>>) -> Self {
        Self {
            required: required.into(),
            combinator: Combinator::All,
        }
    }

    /// No restriction: authorizes any caller.
    pub fn unrestricted() -> Self {
        Self::any(Vec::new())
    }

    pub fn satisfied_by(&self, effective: &PermissionSet) -> bool {
        authorize(effective, &self.required, self.combinator)
    }
}
