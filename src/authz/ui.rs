//! Advisory UI-side guards.
//!
//! Both guards evaluate the caller's locally cached permission set, which may
//! be stale relative to the server. They gate rendering and affordances only;
//! the route guard remains the trust boundary and re-checks every request
//! against fresh data.

use super::decision::GuardRequirement;
use super::permission_set::PermissionSet;

/// Outcome for a wrapped renderable region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubtreeOutcome {
    /// Render the children.
    Render,
    /// Render the caller-supplied fallback (by default, nothing).
    Fallback,
}

/// Gates a renderable region on the caller's cached permissions.
#[derive(Debug, Clone)]
pub struct SubtreeGuard {
    requirement: GuardRequirement,
}

impl SubtreeGuard {
    pub fn new(requirement: GuardRequirement) -> Self {
        Self { requirement }
    }

    /// `caller` is `None` while the session is still resolving during initial
    /// load; that renders the fallback, never an error.
    pub fn evaluate(&self, caller: Option<&PermissionSet>) -> SubtreeOutcome {
        match caller {
            Some(effective) if self.requirement.satisfied_by(effective) => SubtreeOutcome::Render,
            _ => SubtreeOutcome::Fallback,
        }
    }
}

/// How a denied action presents itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenialMode {
    /// The control is not rendered at all.
    Hide,
    /// The control is rendered but inert, keeping toolbar layout stable.
    Disable,
}

/// Outcome for a single gated control.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    Enabled,
    Disabled,
    Hidden,
}

/// Gates one interactive control (a "create" button, a row action).
///
/// Deliberately a separate type from `SubtreeGuard`: its denial composes
/// inline with sibling controls, so it distinguishes hiding from disabling
/// where the subtree guard only knows render-or-fallback.
#[derive(Debug, Clone)]
pub struct ActionGuard {
    requirement: GuardRequirement,
    denial: DenialMode,
}

impl ActionGuard {
    pub fn new(requirement: GuardRequirement, denial: DenialMode) -> Self {
        Self { requirement, denial }
    }

    pub fn evaluate(&self, caller: Option<&PermissionSet>) -> ActionOutcome {
        match caller {
            Some(effective) if self.requirement.satisfied_by(effective) => ActionOutcome::Enabled,
            _ => match self.denial {
                DenialMode::Hide => ActionOutcome::Hidden,
                DenialMode::Disable => ActionOutcome::Disabled,
            },
        }
    }
}
