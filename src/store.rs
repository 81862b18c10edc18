//! Employee persistence boundary.
//!
//! The authorization core consumes this contract and never reaches into SQL
//! itself: the route guard loads the caller's current record through it on
//! every request, and the permissions editor persists through it. Tests swap
//! in stubs.

use async_trait::async_trait;
use sqlx::SqlitePool;
use uuid::Uuid;

use crate::authz::PermissionSet;
use crate::db::row_parsers;
use crate::errors::AppError;
use crate::models::employee::{DbEmployee, Employee};
use crate::utils::utc_now;

#[async_trait]
pub trait EmployeeStore: Send + Sync {
    /// Load an employee's current record, effective permissions included.
    /// Soft-deleted employees are not found.
    async fn load(&self, id: Uuid) -> Result<Employee, AppError>;

    /// Replace the employee's whole effective permission set in one
    /// statement. Atomic: a concurrent reader sees the old set or the new
    /// one, never a mix.
    async fn save_permissions(&self, id: Uuid, permissions: &PermissionSet)
        -> Result<(), AppError>;
}

pub struct SqliteEmployeeStore {
    pool: SqlitePool,
}

impl SqliteEmployeeStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EmployeeStore for SqliteEmployeeStore {
    async fn load(&self, id: Uuid) -> Result<Employee, AppError> {
        let simple = sqlx::query_as::<_, DbEmployee>(
            "SELECT id, name, email, password_hash, role, permissions, is_active, created_at, updated_at, deleted_at \
             FROM employees WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await;

        if let Ok(Some(db_employee)) = simple {
            return db_employee.try_into();
        }

        // Fallback for databases with mixed blob/text uuid columns: select a
        // textified id and parse the row manually.
        let id_case = row_parsers::uuid_as_text("id");
        let match_id = row_parsers::uuid_matches("id");
        let sql = format!(
            "SELECT {}, name, email, password_hash, role, permissions, is_active, created_at, updated_at, deleted_at \
             FROM employees WHERE {} AND deleted_at IS NULL",
            id_case, match_id
        );

        let row = sqlx::query(&sql)
            .bind(id.to_string())
            .bind(id.to_string())
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::not_found("employee not found"))?;

        row_parsers::db_employee_from_row(&row)?.try_into()
    }

    async fn save_permissions(
        &self,
        id: Uuid,
        permissions: &PermissionSet,
    ) -> Result<(), AppError> {
        let blob = serde_json::to_string(permissions)
            .map_err(|err| AppError::internal(format!("failed to serialize permissions: {err}")))?;

        let result = sqlx::query(
            "UPDATE employees SET permissions = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL",
        )
        .bind(blob)
        .bind(utc_now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::not_found("employee not found"));
        }

        Ok(())
    }
}
