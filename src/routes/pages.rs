//! Minimal renderable pages for the guard's redirect targets and the console
//! shell. The real screens are the front-end's; these exist so every guard
//! outcome lands on a page, never on a bare protocol error.

use axum::response::Html;

// The `next` query value is attacker-controlled and never echoed into the
// markup; the console bundle reads it from the URL after sign-in.
pub async fn login_page() -> Html<&'static str> {
    Html("<!doctype html><title>Sign in</title><h1>Sign in</h1><div id=\"app\"></div>")
}

pub async fn not_found_page() -> Html<&'static str> {
    Html("<!doctype html><title>Not found</title><h1>Page not found</h1>")
}

pub async fn unauthorized_page() -> Html<&'static str> {
    Html("<!doctype html><title>Unauthorized</title><h1>You do not have access to this area</h1>")
}

pub async fn console_page() -> Html<&'static str> {
    // Shell mount point; the console bundle takes over client-side.
    Html("<!doctype html><title>Console</title><div id=\"app\"></div>")
}
