use std::sync::Arc;

use axum::http::Method;
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use sqlx::SqlitePool;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::authz::guard::route_guard;
use crate::errors::AppError;
use crate::events::EventBus;
use crate::jwt::JwtConfig;
use crate::routes::{auth, employees, health, pages};
use crate::store::{EmployeeStore, SqliteEmployeeStore};

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt: Arc<JwtConfig>,
    pub event_bus: EventBus,
    pub employees: Arc<dyn EmployeeStore>,
}

impl AppState {
    pub fn new(pool: SqlitePool, jwt: JwtConfig, event_bus: EventBus) -> Self {
        let employees: Arc<dyn EmployeeStore> = Arc::new(SqliteEmployeeStore::new(pool.clone()));
        Self {
            pool,
            jwt: Arc::new(jwt),
            event_bus,
            employees,
        }
    }
}

pub async fn create_app(pool: SqlitePool, event_bus: EventBus) -> Result<Router, AppError> {
    let jwt_config = JwtConfig::from_env()?;
    let state = AppState::new(pool, jwt_config, event_bus);

    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_origin(Any)
        .allow_headers(Any);

    let auth_routes = Router::new()
        .route("/login", post(auth::login))
        .route("/me", get(auth::me))
        .route("/logout", post(auth::logout));

    let router = Router::new()
        .nest("/auth", auth_routes)
        .nest("/api/employees", employees::routes())
        .route("/api/health", get(health::health))
        // Renderable targets for the guard's redirect outcomes.
        .route("/login", get(pages::login_page))
        .route("/not-found", get(pages::not_found_page))
        .route("/unauthorized", get(pages::unauthorized_page))
        // Console shell; the route guard decides who gets this far.
        .route("/dashboard", get(pages::console_page))
        .route("/dashboard/*area", get(pages::console_page))
        // The guard wraps everything; paths without a route rule pass through.
        .layer(middleware::from_fn_with_state(state.clone(), route_guard))
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    Ok(router)
}
