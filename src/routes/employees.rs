//! Employee management API.
//!
//! The whole `/api/employees` area sits behind the route guard (admin or
//! supervisor holding `viewEmployees`). Mutating handlers additionally
//! re-validate the specific capability server-side: the console's action
//! guards hide the buttons, but a hidden button is advisory and this is the
//! check that counts. All mutations are audit-logged at Critical severity.

use axum::extract::{Path, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::get;
use axum::{Json, Router};
use uuid::Uuid;

use crate::app::AppState;
use crate::authz::{authorize, Capability, Combinator, PermissionsEditor, Role, RoleRegistry};
use crate::errors::{AppError, AppResult};
use crate::events::{log_activity_with_context, RequestContext};
use crate::jwt::AuthEmployee;
use crate::models::employee::{
    DbEmployee, Employee, EmployeeCreateRequest, EmployeeUpdateRequest, PermissionsUpdateRequest,
    PermissionsView,
};
use crate::utils::{hash_password, utc_now};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(list_employees).post(create_employee))
        .route(
            "/:id",
            get(get_employee)
                .put(update_employee)
                .delete(delete_employee),
        )
        .route("/:id/permissions", get(get_permissions).put(put_permissions))
        .route("/:id/permissions/defaults", axum::routing::post(reset_permissions))
}

/// Server-side action gate: the same decision function the UI guards use,
/// applied to the acting employee's CURRENT stored set.
async fn require_capability(
    state: &AppState,
    auth: &AuthEmployee,
    cap: Capability,
) -> AppResult<Employee> {
    let actor = state.employees.load(auth.employee_id).await?;
    if !authorize(&actor.effective_permissions, &[cap], Combinator::Any) {
        return Err(AppError::forbidden(format!(
            "requires the {} capability",
            cap.as_str()
        )));
    }
    Ok(actor)
}

/// Map the partial unique index on active emails to a conflict. Uniqueness is
/// enforced by the index alone, so two racing writes cannot both succeed; the
/// loser gets a 409 rather than a bare database error.
fn email_conflict(err: sqlx::Error) -> AppError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            AppError::conflict("email already in use")
        }
        _ => err.into(),
    }
}

/// List active employees
#[utoipa::path(
    get,
    path = "/api/employees",
    tag = "Employees",
    responses((status = 200, description = "List of employees", body = Vec<Employee>)),
    security(("bearerAuth" = []))
)]
pub async fn list_employees(
    State(state): State<AppState>,
    _auth: AuthEmployee,
) -> AppResult<Json<Vec<Employee>>> {
    let rows = sqlx::query_as::<_, DbEmployee>(
        "SELECT id, name, email, password_hash, role, permissions, is_active, created_at, updated_at, deleted_at \
         FROM employees WHERE deleted_at IS NULL ORDER BY name",
    )
    .fetch_all(&state.pool)
    .await?;

    let employees = rows
        .into_iter()
        .map(Employee::try_from)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Json(employees))
}

/// Create an employee, seeding effective permissions from the role default
#[utoipa::path(
    post,
    path = "/api/employees",
    tag = "Employees",
    request_body = EmployeeCreateRequest,
    responses(
        (status = 201, description = "Employee created", body = Employee),
        (status = 409, description = "Email already in use"),
    ),
    security(("bearerAuth" = []))
)]
pub async fn create_employee(
    State(state): State<AppState>,
    auth: AuthEmployee,
    headers: HeaderMap,
    Json(req): Json<EmployeeCreateRequest>,
) -> AppResult<(StatusCode, Json<Employee>)> {
    require_capability(&state, &auth, Capability::CreateEmployees).await?;

    let password_hash = hash_password(&req.password)?;
    let id = Uuid::new_v4();
    let now = utc_now();
    // Role defaults seed the effective set here, once. They are a template,
    // not a live constraint: the editor may diverge this set later.
    let permissions = RoleRegistry::defaults_for(req.role);
    let permissions_blob = serde_json::to_string(&permissions)
        .map_err(|err| AppError::internal(format!("failed to serialize permissions: {err}")))?;

    sqlx::query(
        "INSERT INTO employees (id, name, email, password_hash, role, permissions, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(&req.name)
    .bind(&req.email)
    .bind(&password_hash)
    .bind(req.role.as_str())
    .bind(&permissions_blob)
    .bind(now)
    .bind(now)
    .execute(&state.pool)
    .await
    .map_err(email_conflict)?;

    let employee = Employee {
        id,
        name: req.name,
        email: req.email,
        role: req.role,
        effective_permissions: permissions,
        is_active: true,
        created_at: now,
        updated_at: now,
        deleted_at: None,
    };

    log_activity_with_context(
        &state.event_bus,
        "created",
        Some(auth.employee_id),
        &employee,
        None,
        Some(RequestContext::from_headers(&headers)),
    );

    Ok((StatusCode::CREATED, Json(employee)))
}

/// Get an employee
#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee details", body = Employee),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_employee(
    State(state): State<AppState>,
    _auth: AuthEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Employee>> {
    let employee = state.employees.load(id).await?;
    Ok(Json(employee))
}

/// Update identity fields (never permissions; that path is the editor's)
#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "Employee ID")),
    request_body = EmployeeUpdateRequest,
    responses(
        (status = 200, description = "Employee updated", body = Employee),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearerAuth" = []))
)]
pub async fn update_employee(
    State(state): State<AppState>,
    auth: AuthEmployee,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<EmployeeUpdateRequest>,
) -> AppResult<Json<Employee>> {
    require_capability(&state, &auth, Capability::EditEmployees).await?;

    let old = state.employees.load(id).await?;
    let now = utc_now();

    sqlx::query(
        "UPDATE employees SET name = ?, email = ?, is_active = ?, updated_at = ? \
         WHERE id = ? AND deleted_at IS NULL",
    )
    .bind(req.name.as_deref().unwrap_or(&old.name))
    .bind(req.email.as_deref().unwrap_or(&old.email))
    .bind(req.is_active.unwrap_or(old.is_active))
    .bind(now)
    .bind(id)
    .execute(&state.pool)
    .await
    .map_err(email_conflict)?;

    let updated = state.employees.load(id).await?;

    log_activity_with_context(
        &state.event_bus,
        "updated",
        Some(auth.employee_id),
        &updated,
        Some(&old),
        Some(RequestContext::from_headers(&headers)),
    );

    Ok(Json(updated))
}

/// Soft-delete an employee (and with it, their effective permission set)
#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    tag = "Employees",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 204, description = "Employee deleted"),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearerAuth" = []))
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    auth: AuthEmployee,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<StatusCode> {
    require_capability(&state, &auth, Capability::DeleteEmployees).await?;

    let old = state.employees.load(id).await?;

    sqlx::query("UPDATE employees SET deleted_at = ?, updated_at = ? WHERE id = ? AND deleted_at IS NULL")
        .bind(utc_now())
        .bind(utc_now())
        .bind(id)
        .execute(&state.pool)
        .await?;

    log_activity_with_context(
        &state.event_bus,
        "deleted",
        Some(auth.employee_id),
        &old,
        None,
        Some(RequestContext::from_headers(&headers)),
    );

    Ok(StatusCode::NO_CONTENT)
}

/// The editor's read side: effective permissions grouped by domain
#[utoipa::path(
    get,
    path = "/api/employees/{id}/permissions",
    tag = "Permissions",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Grouped effective permissions", body = PermissionsView),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearerAuth" = []))
)]
pub async fn get_permissions(
    State(state): State<AppState>,
    _auth: AuthEmployee,
    Path(id): Path<Uuid>,
) -> AppResult<Json<PermissionsView>> {
    let employee = state.employees.load(id).await?;
    Ok(Json(PermissionsView::for_employee(&employee)))
}

/// The editor's persist step: atomic whole-set replace
#[utoipa::path(
    put,
    path = "/api/employees/{id}/permissions",
    tag = "Permissions",
    params(("id" = Uuid, Path, description = "Employee ID")),
    request_body = PermissionsUpdateRequest,
    responses(
        (status = 200, description = "Permissions replaced", body = Employee),
        (status = 403, description = "Admin permissions are not editable"),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearerAuth" = []))
)]
pub async fn put_permissions(
    State(state): State<AppState>,
    auth: AuthEmployee,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(req): Json<PermissionsUpdateRequest>,
) -> AppResult<Json<Employee>> {
    require_capability(&state, &auth, Capability::EditEmployeePermissions).await?;

    let old = state.employees.load(id).await?;
    if old.role == Role::Admin {
        return Err(AppError::forbidden("admin permissions are not editable"));
    }

    // Drive the change through the editor state machine: the submitted set
    // becomes the draft (as toggles against the current effective set), then
    // a single atomic save.
    let mut editor = PermissionsEditor::open(&old);
    for (cap, granted) in req.permissions.iter() {
        if editor.draft().is_granted(cap) != granted {
            editor.toggle(cap);
        }
    }
    editor.save(state.employees.as_ref()).await?;

    let updated = state.employees.load(id).await?;

    log_activity_with_context(
        &state.event_bus,
        "permissions_updated",
        Some(auth.employee_id),
        &updated,
        Some(&old),
        Some(RequestContext::from_headers(&headers)),
    );

    Ok(Json(updated))
}

/// Overwrite the effective set with the role's canonical defaults
#[utoipa::path(
    post,
    path = "/api/employees/{id}/permissions/defaults",
    tag = "Permissions",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Permissions reset to role defaults", body = Employee),
        (status = 403, description = "Admin permissions are not editable"),
        (status = 404, description = "Employee not found"),
    ),
    security(("bearerAuth" = []))
)]
pub async fn reset_permissions(
    State(state): State<AppState>,
    auth: AuthEmployee,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> AppResult<Json<Employee>> {
    require_capability(&state, &auth, Capability::EditEmployeePermissions).await?;

    let old = state.employees.load(id).await?;
    let mut editor = PermissionsEditor::open(&old);
    if !editor.apply_defaults() {
        return Err(AppError::forbidden("admin permissions are not editable"));
    }
    editor.save(state.employees.as_ref()).await?;

    let updated = state.employees.load(id).await?;

    log_activity_with_context(
        &state.event_bus,
        "permissions_reset",
        Some(auth.employee_id),
        &updated,
        Some(&old),
        Some(RequestContext::from_headers(&headers)),
    );

    Ok(Json(updated))
}
