use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::authz::{PermissionSet, Role};
use crate::errors::AppError;
use crate::events::{Loggable, Severity};

/// A console employee: an identity with an assigned role and a stored,
/// possibly-diverged effective permission set.
///
/// `role` determines the initial `effective_permissions` (seeded from the
/// role registry at creation) but does not constrain them afterwards; the
/// permissions editor is the only code path that mutates them.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct Employee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[schema(value_type = String, example = "supervisor")]
    pub role: Role,
    #[schema(value_type = Object)]
    pub effective_permissions: PermissionSet,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Loggable for Employee {
    fn entity_type() -> &'static str {
        "employee"
    }
    fn subject_id(&self) -> Uuid {
        self.id
    }
    fn severity(&self) -> Severity {
        Severity::Critical
    }
}

#[derive(Debug, Clone, FromRow)]
pub struct DbEmployee {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub permissions: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl TryFrom<DbEmployee> for Employee {
    type Error = AppError;

    fn try_from(value: DbEmployee) -> Result<Self, Self::Error> {
        let role = Role::from_name(&value.role)
            .ok_or_else(|| AppError::internal(format!("unknown stored role: {}", value.role)))?;

        Ok(Employee {
            id: value.id,
            name: value.name,
            email: value.email,
            role,
            // Partial or mangled blobs degrade to denied bits, never to an error.
            effective_permissions: PermissionSet::from_stored_json(&value.permissions),
            is_active: value.is_active,
            created_at: value.created_at,
            updated_at: value.updated_at,
            deleted_at: value.deleted_at,
        })
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmployeeCreateRequest {
    #[schema(example = "Lina Haddad")]
    pub name: String,
    #[schema(example = "lina@example.com")]
    pub email: String,
    #[schema(example = "S3cureP@ssw0rd")]
    pub password: String,
    #[schema(value_type = String, example = "sales")]
    pub role: Role,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct EmployeeUpdateRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub is_active: Option<bool>,
}

/// Body of the editor's persist step: the full replacement set. Missing keys
/// deserialize as denied, so a sparse body can only narrow, never widen.
#[derive(Debug, Deserialize, ToSchema)]
pub struct PermissionsUpdateRequest {
    #[schema(value_type = Object)]
    pub permissions: PermissionSet,
}

/// What the editor screen renders: the grouped capability toggles plus
/// whether this employee may be edited at all.
#[derive(Debug, Serialize, ToSchema)]
pub struct PermissionsView {
    pub employee_id: Uuid,
    #[schema(value_type = String)]
    pub role: Role,
    pub editable: bool,
    #[schema(value_type = Object)]
    pub domains: serde_json::Value,
}

impl PermissionsView {
    pub fn for_employee(employee: &Employee) -> Self {
        Self {
            employee_id: employee.id,
            role: employee.role,
            editable: employee.role != Role::Admin,
            domains: serde_json::to_value(employee.effective_permissions.grouped())
                .unwrap_or_default(),
        }
    }
}
