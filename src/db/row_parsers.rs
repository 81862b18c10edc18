use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::Row;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::employee::DbEmployee;

/// SELECT expression yielding `col` as a hyphenated text uuid whether the row
/// stores it as a 16-byte blob or as text. Aliased to the bare column name so
/// `try_get("id")` works on the result.
pub fn uuid_as_text(col: &str) -> String {
    let alias = col.rsplit('.').next().unwrap_or(col);
    format!(
        "CASE WHEN typeof({col})='blob' \
         THEN lower(substr(hex({col}),1,8) || '-' || substr(hex({col}),9,4) || '-' || substr(hex({col}),13,4) || '-' || substr(hex({col}),17,4) || '-' || substr(hex({col}),21)) \
         ELSE {col} END AS {alias}"
    )
}

/// WHERE predicate comparing `col` against a text uuid. Binds the uuid string
/// twice: once for the blob comparison, once for the text comparison.
pub fn uuid_matches(col: &str) -> String {
    format!(
        "((typeof({col})='blob' AND hex({col})=upper(replace(?,'-',''))) \
         OR (typeof({col})='text' AND {col} = ?))"
    )
}

fn parse_datetime(s: &str) -> Result<DateTime<Utc>, AppError> {
    let s = s.trim();

    // Try RFC3339 first (e.g. 2025-11-19T12:34:56Z)
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }

    // SQLite default timestamp format: "YYYY-MM-DD HH:MM:SS" (optional fractional seconds)
    if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.f") {
        return Ok(Utc.from_utc_datetime(&naive));
    }

    // Date-only: "YYYY-MM-DD"
    if let Ok(naive_date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        let ndt = naive_date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| AppError::internal("invalid datetime: date out of range".to_string()))?;
        return Ok(Utc.from_utc_datetime(&ndt));
    }

    Err(AppError::internal(format!("invalid datetime: {}", s)))
}

fn parse_opt_datetime(s: Option<String>) -> Result<Option<DateTime<Utc>>, AppError> {
    match s {
        Some(s) => {
            let trimmed = s.trim();
            if trimmed.is_empty() {
                Ok(None)
            } else {
                Ok(Some(parse_datetime(trimmed)?))
            }
        }
        None => Ok(None),
    }
}

/// Manual fallback parser for employee rows selected with a textified id
/// (see `uuid_as_text`). Used when the typed `query_as` mapping fails against
/// databases that mix blob and text uuid storage.
pub fn db_employee_from_row(row: &SqliteRow) -> Result<DbEmployee, AppError> {
    let id_s: String = row
        .try_get("id")
        .map_err(|e| AppError::internal(format!("missing id: {}", e)))?;
    let name: String = row
        .try_get("name")
        .map_err(|e| AppError::internal(format!("missing name: {}", e)))?;
    let email: String = row
        .try_get("email")
        .map_err(|e| AppError::internal(format!("missing email: {}", e)))?;
    let password_hash: String = row
        .try_get("password_hash")
        .map_err(|e| AppError::internal(format!("missing password_hash: {}", e)))?;
    let role: String = row
        .try_get("role")
        .map_err(|e| AppError::internal(format!("missing role: {}", e)))?;
    let permissions: String = row
        .try_get("permissions")
        .map_err(|e| AppError::internal(format!("missing permissions: {}", e)))?;
    let is_active: bool = row
        .try_get("is_active")
        .map_err(|e| AppError::internal(format!("missing is_active: {}", e)))?;
    let created_at_s: String = row
        .try_get("created_at")
        .map_err(|e| AppError::internal(format!("missing created_at: {}", e)))?;
    let updated_at_s: String = row
        .try_get("updated_at")
        .map_err(|e| AppError::internal(format!("missing updated_at: {}", e)))?;
    let deleted_at_s: Option<String> = row
        .try_get("deleted_at")
        .map_err(|e| AppError::internal(format!("missing deleted_at: {}", e)))?;

    let id = Uuid::parse_str(&id_s).map_err(|e| AppError::internal(format!("invalid uuid: {}", e)))?;
    let created_at = parse_datetime(&created_at_s)?;
    let updated_at = parse_datetime(&updated_at_s)?;
    let deleted_at = parse_opt_datetime(deleted_at_s)?;

    Ok(DbEmployee {
        id,
        name,
        email,
        password_hash,
        role,
        permissions,
        is_active,
        created_at,
        updated_at,
        deleted_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_common_sqlite_timestamp_formats() {
        assert!(parse_datetime("2026-01-15T08:30:00Z").is_ok());
        assert!(parse_datetime("2026-01-15 08:30:00").is_ok());
        assert!(parse_datetime("2026-01-15").is_ok());
        assert!(parse_datetime("not a date").is_err());
    }

    #[test]
    fn uuid_select_expression_aliases_to_the_bare_column() {
        let expr = uuid_as_text("e.id");
        assert!(expr.ends_with("AS id"));
        assert!(expr.contains("typeof(e.id)='blob'"));

        let predicate = uuid_matches("id");
        assert_eq!(predicate.matches('?').count(), 2);
    }
}
