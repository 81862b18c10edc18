use std::sync::Arc;

use axum::{routing::get, Json, Router};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use crate::models;
use crate::routes;

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::auth::login,
        routes::auth::me,
        routes::auth::logout,
        routes::employees::list_employees,
        routes::employees::create_employee,
        routes::employees::get_employee,
        routes::employees::update_employee,
        routes::employees::delete_employee,
        routes::employees::get_permissions,
        routes::employees::put_permissions,
        routes::employees::reset_permissions,
        routes::health::health
    ),
    components(
        schemas(
            models::employee::Employee,
            models::employee::EmployeeCreateRequest,
            models::employee::EmployeeUpdateRequest,
            models::employee::PermissionsUpdateRequest,
            models::employee::PermissionsView,
            routes::auth::LoginRequest,
            routes::auth::AuthResponse,
            routes::health::HealthResponse
        )
    ),
    tags(
        (name = "Auth", description = "Authentication endpoints"),
        (name = "Employees", description = "Employee management"),
        (name = "Permissions", description = "Permissions editor"),
        (name = "Health", description = "Service health")
    )
)]
pub struct ApiDoc;

/// Build the OpenAPI document: per-handler `#[utoipa::path]` annotations plus
/// a bearer security scheme and a servers entry for the running port.
pub fn build_openapi(port: u16) -> anyhow::Result<utoipa::openapi::OpenApi> {
    let mut doc = serde_json::to_value(ApiDoc::openapi())?;

    if let Some(components) = doc.pointer_mut("/components").and_then(|c| c.as_object_mut()) {
        components
            .entry("securitySchemes")
            .or_insert_with(|| serde_json::json!({}));
    }
    if let Some(schemes) = doc
        .pointer_mut("/components/securitySchemes")
        .and_then(|s| s.as_object_mut())
    {
        schemes.insert(
            "bearerAuth".to_string(),
            serde_json::json!({
                "type": "http",
                "scheme": "bearer",
                "bearerFormat": "JWT"
            }),
        );
    }

    if doc.get("security").is_none() {
        doc["security"] = serde_json::json!([{"bearerAuth": []}]);
    }
    if doc.get("servers").is_none() {
        doc["servers"] = serde_json::json!([
            { "url": format!("http://localhost:{}", port) }
        ]);
    }

    Ok(serde_json::from_value(doc)?)
}

/// Serve the document at /api-docs/openapi.json and the Swagger UI at /docs.
pub fn swagger_routes(doc: utoipa::openapi::OpenApi) -> Router {
    let swagger_config = utoipa_swagger_ui::Config::new(["/api-docs/openapi.json"])
        .try_it_out_enabled(true)
        .with_credentials(true)
        .persist_authorization(true);

    let doc_json = Arc::new(serde_json::to_value(&doc).unwrap_or_default());

    let json_route = {
        let doc_json = Arc::clone(&doc_json);
        get(move || {
            let doc_json = Arc::clone(&doc_json);
            async move { Json(doc_json.as_ref().clone()) }
        })
    };

    Router::new()
        .route("/api-docs/openapi.json", json_route)
        .merge(SwaggerUi::new("/docs").config(swagger_config))
}
