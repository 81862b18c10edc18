use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Severity levels for audit entries. Controls retention and filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Long-term retention, never auto-deleted. All permission and employee
    /// mutations land here.
    Critical,
    /// Medium-term retention.
    #[default]
    Important,
    /// Aggressively trimmed.
    Noise,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Critical => "critical",
            Severity::Important => "important",
            Severity::Noise => "noise",
        }
    }
}

/// Trait for entities whose mutations are recorded in the audit log.
pub trait Loggable: Serialize + Send + Sync {
    /// The entity type name; becomes the event-name prefix, e.g.
    /// "employee.permissions_updated".
    fn entity_type() -> &'static str;

    /// The subject id (usually the entity's primary key).
    fn subject_id(&self) -> Uuid;

    fn severity(&self) -> Severity {
        Severity::Important
    }

    fn severity_for_action(&self, action: &str) -> Severity {
        match action {
            "deleted" => Severity::Critical,
            "created" | "updated" => self.severity(),
            _ => self.severity(),
        }
    }
}
