//! End-to-end checks of the route-guard enforcement matrix: login redirects,
//! role denial as not-found, capability denial as unauthorized, and the
//! fresh-load guarantee that makes client-side caches advisory only.

use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use chrono::Utc;
use sqlx::SqlitePool;
use tempfile::{tempdir, TempDir};
use tower::util::ServiceExt;
use uuid::Uuid;

use bazaar_admin::authz::{
    Capability, GuardRequirement, PermissionSet, Role, RoleRegistry, SubtreeGuard, SubtreeOutcome,
};
use bazaar_admin::create_app;
use bazaar_admin::events::init_event_bus;
use bazaar_admin::jwt::JwtConfig;

async fn setup() -> Result<(axum::Router, SqlitePool, TempDir)> {
    let dir = tempdir()?;
    let db_path = dir.path().join("test.db");

    use sqlx::sqlite::SqliteConnectOptions;
    let opts = SqliteConnectOptions::new()
        .filename(db_path.as_path())
        .create_if_missing(true);
    let pool = SqlitePool::connect_with(opts).await?;

    let migrator = sqlx::migrate::Migrator::new(
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations"),
    )
    .await?;
    migrator.run(&pool).await?;

    std::env::set_var("JWT_SECRET", "test-secret");
    let (event_bus, _rx) = init_event_bus();
    let app = create_app(pool.clone(), event_bus).await?;

    Ok((app, pool, dir))
}

fn test_jwt() -> JwtConfig {
    JwtConfig {
        secret: Arc::new(b"test-secret".to_vec()),
        exp_hours: 24,
    }
}

async fn seed_employee(
    pool: &SqlitePool,
    email: &str,
    role: Role,
    permissions: &PermissionSet,
) -> Result<Uuid> {
    let id = Uuid::new_v4();
    let now = Utc::now();
    sqlx::query(
        "INSERT INTO employees (id, name, email, password_hash, role, permissions, is_active, created_at, updated_at) \
         VALUES (?, 'Test', ?, 'x', ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(email)
    .bind(role.as_str())
    .bind(serde_json::to_string(permissions)?)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(id)
}

async fn get_with_token(app: &axum::Router, path: &str, token: Option<&str>) -> Result<(StatusCode, Option<String>)> {
    let mut builder = Request::builder().method("GET").uri(path);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let resp = app.clone().oneshot(builder.body(Body::empty())?).await?;
    let location = resp
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .map(String::from);
    Ok((resp.status(), location))
}

#[tokio::test]
async fn unauthenticated_request_redirects_to_login_preserving_path() -> Result<()> {
    let (app, _pool, _dir) = setup().await?;

    let (status, location) = get_with_token(&app, "/dashboard/orders", None).await?;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/login?next=%2Fdashboard%2Forders"));

    // Garbage token behaves like no token.
    let (status, location) = get_with_token(&app, "/dashboard", Some("not-a-jwt")).await?;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/login?next=%2Fdashboard"));

    Ok(())
}

#[tokio::test]
async fn login_page_does_not_reflect_the_next_parameter() -> Result<()> {
    let (app, _pool, _dir) = setup().await?;

    let req = Request::builder()
        .method("GET")
        .uri("/login?next=%3Cscript%3Ealert(1)%3C%2Fscript%3E")
        .body(Body::empty())?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    let body = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let html = String::from_utf8(body.to_vec())?;
    assert!(!html.contains("<script>alert"));
    assert!(!html.contains("alert(1)"));

    Ok(())
}

#[tokio::test]
async fn unprotected_routes_pass_without_credentials() -> Result<()> {
    let (app, _pool, _dir) = setup().await?;

    let (status, _) = get_with_token(&app, "/api/health", None).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = get_with_token(&app, "/login", None).await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn role_gate_fails_before_capability_gate() -> Result<()> {
    let (app, pool, _dir) = setup().await?;
    let jwt = test_jwt();

    // A sales employee holding viewEmployees is still out of role for the
    // employees area; the denial is indistinguishable from a missing page.
    let mut perms = RoleRegistry::defaults_for(Role::Sales);
    perms.set(Capability::ViewEmployees, true);
    let sales_id = seed_employee(&pool, "sales@example.com", Role::Sales, &perms).await?;
    let token = jwt.encode(sales_id, Role::Sales)?;

    let (status, location) = get_with_token(&app, "/dashboard/employees", Some(&token)).await?;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/not-found"));

    Ok(())
}

#[tokio::test]
async fn capability_gate_denies_in_role_caller_without_capability() -> Result<()> {
    let (app, pool, _dir) = setup().await?;
    let jwt = test_jwt();

    let mut perms = RoleRegistry::defaults_for(Role::Supervisor);
    perms.set(Capability::ViewEmployees, false);
    let supervisor_id =
        seed_employee(&pool, "supervisor@example.com", Role::Supervisor, &perms).await?;
    let token = jwt.encode(supervisor_id, Role::Supervisor)?;

    let (status, location) = get_with_token(&app, "/dashboard/employees", Some(&token)).await?;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/unauthorized"));

    Ok(())
}

#[tokio::test]
async fn in_role_caller_with_capability_is_allowed() -> Result<()> {
    let (app, pool, _dir) = setup().await?;
    let jwt = test_jwt();

    let perms = RoleRegistry::defaults_for(Role::Supervisor);
    assert!(perms.is_granted(Capability::ViewEmployees));
    let supervisor_id =
        seed_employee(&pool, "supervisor@example.com", Role::Supervisor, &perms).await?;
    let token = jwt.encode(supervisor_id, Role::Supervisor)?;

    let (status, _) = get_with_token(&app, "/dashboard/employees", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn deactivated_employee_is_sent_back_to_login() -> Result<()> {
    let (app, pool, _dir) = setup().await?;
    let jwt = test_jwt();

    let perms = RoleRegistry::defaults_for(Role::Supervisor);
    let id = seed_employee(&pool, "gone@example.com", Role::Supervisor, &perms).await?;
    sqlx::query("UPDATE employees SET is_active = 0 WHERE id = ?")
        .bind(id)
        .execute(&pool)
        .await?;
    let token = jwt.encode(id, Role::Supervisor)?;

    let (status, location) = get_with_token(&app, "/dashboard", Some(&token)).await?;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/login?next=%2Fdashboard"));

    Ok(())
}

#[tokio::test]
async fn session_cookie_works_like_bearer() -> Result<()> {
    let (app, pool, _dir) = setup().await?;
    let jwt = test_jwt();

    let perms = RoleRegistry::defaults_for(Role::Sales);
    let id = seed_employee(&pool, "cookie@example.com", Role::Sales, &perms).await?;
    let token = jwt.encode(id, Role::Sales)?;

    let req = Request::builder()
        .method("GET")
        .uri("/dashboard/orders")
        .header(header::COOKIE, format!("theme=dark; session={}", token))
        .body(Body::empty())?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);

    Ok(())
}

#[tokio::test]
async fn permission_flip_takes_effect_next_request_while_cached_ui_lags() -> Result<()> {
    let (app, pool, _dir) = setup().await?;
    let jwt = test_jwt();

    let perms = RoleRegistry::defaults_for(Role::CustomerService);
    let id = seed_employee(&pool, "support@example.com", Role::CustomerService, &perms).await?;
    let token = jwt.encode(id, Role::CustomerService)?;

    // Allowed while viewOrders is granted.
    let (status, _) = get_with_token(&app, "/dashboard/orders", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);

    // The console rendered against this snapshot of the permissions.
    let cached = perms.clone();

    // An administrator revokes viewOrders (same whole-set replace the editor
    // performs on save).
    let mut revoked = perms.clone();
    revoked.set(Capability::ViewOrders, false);
    sqlx::query("UPDATE employees SET permissions = ? WHERE id = ?")
        .bind(serde_json::to_string(&revoked)?)
        .bind(id)
        .execute(&pool)
        .await?;

    // The stale client cache still renders the orders region...
    let guard = SubtreeGuard::new(GuardRequirement::any(vec![Capability::ViewOrders]));
    assert_eq!(guard.evaluate(Some(&cached)), SubtreeOutcome::Render);

    // ...but the route guard reloads fresh state and denies the request.
    let (status, location) = get_with_token(&app, "/dashboard/orders", Some(&token)).await?;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/unauthorized"));

    Ok(())
}

#[tokio::test]
async fn longest_prefix_rule_wins_over_generic_dashboard() -> Result<()> {
    let (app, pool, _dir) = setup().await?;
    let jwt = test_jwt();

    // Sales defaults enter /dashboard fine but have no business in the
    // employees area; the more specific rule must apply to its subpaths.
    let perms = RoleRegistry::defaults_for(Role::Sales);
    let id = seed_employee(&pool, "sales2@example.com", Role::Sales, &perms).await?;
    let token = jwt.encode(id, Role::Sales)?;

    let (status, _) = get_with_token(&app, "/dashboard", Some(&token)).await?;
    assert_eq!(status, StatusCode::OK);

    let (status, location) =
        get_with_token(&app, "/dashboard/employees/some-id/permissions", Some(&token)).await?;
    assert_eq!(status, StatusCode::SEE_OTHER);
    assert_eq!(location.as_deref(), Some("/not-found"));

    Ok(())
}
