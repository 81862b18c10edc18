use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;
use utoipa::ToSchema;

use crate::app::AppState;
use crate::db::row_parsers;
use crate::errors::{AppError, AppResult};
use crate::events::log_activity;
use crate::jwt::AuthEmployee;
use crate::models::employee::{DbEmployee, Employee};
use crate::utils::verify_password;

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    #[schema(example = "lina@example.com")]
    pub email: String,
    #[schema(example = "S3cureP@ssw0rd")]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct AuthResponse {
    pub token: String,
    pub employee: Employee,
}

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    message: String,
}

#[utoipa::path(
    post,
    path = "/auth/login",
    tag = "Auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = AuthResponse),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let db_employee = fetch_employee_by_email(&state.pool, &payload.email)
        .await?
        .ok_or_else(|| AppError::unauthorized("invalid credentials"))?;

    let password_ok = verify_password(&payload.password, &db_employee.password_hash)?;
    if !password_ok {
        return Err(AppError::unauthorized("invalid credentials"));
    }
    if !db_employee.is_active {
        return Err(AppError::unauthorized("account is deactivated"));
    }

    let employee: Employee = db_employee.try_into()?;
    let token = state.jwt.encode(employee.id, employee.role)?;

    log_activity(&state.event_bus, "login", Some(employee.id), &employee);

    Ok(Json(AuthResponse { token, employee }))
}

#[utoipa::path(
    get,
    path = "/auth/me",
    tag = "Auth",
    responses((status = 200, description = "Current employee", body = Employee)),
    security(("bearerAuth" = []))
)]
pub async fn me(State(state): State<AppState>, auth: AuthEmployee) -> AppResult<Json<Employee>> {
    let employee = state.employees.load(auth.employee_id).await?;
    Ok(Json(employee))
}

#[utoipa::path(
    post,
    path = "/auth/logout",
    tag = "Auth",
    responses((status = 200, description = "Logout acknowledged")),
    security(("bearerAuth" = []))
)]
pub async fn logout(_auth: AuthEmployee) -> AppResult<Json<MessageResponse>> {
    // Tokens are stateless; the console drops its copy.
    Ok(Json(MessageResponse {
        message: "Logged out".to_string(),
    }))
}

async fn fetch_employee_by_email(
    pool: &SqlitePool,
    email: &str,
) -> AppResult<Option<DbEmployee>> {
    let simple = sqlx::query_as::<_, DbEmployee>(
        "SELECT id, name, email, password_hash, role, permissions, is_active, created_at, updated_at, deleted_at \
         FROM employees WHERE email = ? AND deleted_at IS NULL",
    )
    .bind(email)
    .fetch_optional(pool)
    .await;

    match simple {
        Ok(found) => Ok(found),
        Err(_) => {
            // Fallback for blob/text mixed uuid storage: textify the id column.
            let id_case = row_parsers::uuid_as_text("id");
            let sql = format!(
                "SELECT {}, name, email, password_hash, role, permissions, is_active, created_at, updated_at, deleted_at \
                 FROM employees WHERE email = ? AND deleted_at IS NULL",
                id_case
            );

            let row = sqlx::query(&sql).bind(email).fetch_optional(pool).await?;
            row.map(|r| row_parsers::db_employee_from_row(&r)).transpose()
        }
    }
}
