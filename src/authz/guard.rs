//! The route guard: the authoritative, server-side enforcement point.
//!
//! Runs once per request, before any handler. Rejections are always
//! redirects to renderable pages (login, not-found, unauthorized), never raw
//! protocol errors. The caller's effective permissions are loaded from the
//! store on every request; nothing here is cached across requests, so a save
//! in the permissions editor takes effect on the very next request.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::{IntoResponse, Redirect, Response};

use crate::app::AppState;
use crate::jwt::token_from_headers;

use super::route_table::match_rule;

pub const LOGIN_PATH: &str = "/login";
pub const NOT_FOUND_PATH: &str = "/not-found";
pub const UNAUTHORIZED_PATH: &str = "/unauthorized";

pub async fn route_guard(State(state): State<AppState>, req: Request, next: Next) -> Response {
    let path = req.uri().path().to_owned();

    // No matching rule means an unprotected route.
    let Some(rule) = match_rule(&path) else {
        return next.run(req).await;
    };

    // Resolve the credential. Absence or staleness of any kind lands on the
    // login page with the original destination preserved.
    let Some(token) = token_from_headers(req.headers()) else {
        return login_redirect(&path);
    };
    let claims = match state.jwt.decode(&token) {
        Ok(claims) => claims,
        Err(err) => {
            tracing::debug!(path = %path, error = %err, "route guard: invalid credential");
            return login_redirect(&path);
        }
    };

    // Fresh load every time; the guard must never trust a cached set.
    let employee = match state.employees.load(claims.sub).await {
        Ok(employee) if employee.is_active => employee,
        Ok(_) => {
            tracing::debug!(employee_id = %claims.sub, "route guard: deactivated employee");
            return login_redirect(&path);
        }
        Err(err) => {
            tracing::debug!(employee_id = %claims.sub, error = %err, "route guard: unresolvable employee");
            return login_redirect(&path);
        }
    };

    // Role gate first. The outcome is indistinguishable from a missing page
    // so out-of-role callers learn nothing about the route's existence.
    if !rule.allowed_roles.contains(&employee.role) {
        tracing::debug!(
            employee_id = %employee.id,
            role = %employee.role.as_str(),
            path = %path,
            "route guard: role not allowed"
        );
        return Redirect::to(NOT_FOUND_PATH).into_response();
    }

    // Capability gate via the shared decision function (ANY combinator: the
    // area is reachable with any one of the listed capabilities).
    if !rule.requirement.satisfied_by(&employee.effective_permissions) {
        tracing::debug!(
            employee_id = %employee.id,
            path = %path,
            "route guard: missing capability"
        );
        return Redirect::to(UNAUTHORIZED_PATH).into_response();
    }

    next.run(req).await
}

fn login_redirect(intended: &str) -> Response {
    let target = format!("{}?next={}", LOGIN_PATH, urlencoding::encode(intended));
    Redirect::to(&target).into_response()
}
