//! Route registration — collects module routes + system endpoints.

use axum::Router;
use axum::response::IntoResponse;
use axum::routing::get;

/// Build the complete router with all routes.
///
/// Module routes are nested under `/{module_name}`; portal routes (the
/// guest-facing login form) mount at the root.
pub fn build_router(module_routes: Vec<(&str, Router)>, portal_routes: Router) -> Router {
    // System endpoints (public, no state needed).
    let mut app = Router::new()
        .route("/health", get(health))
        .route("/version", get(version))
        .merge(portal_routes);

    for (name, router) in module_routes {
        app = app.nest(&format!("/{}", name), router);
    }

    app
}

async fn health() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "status": "ok",
    }))
}

async fn version() -> impl IntoResponse {
    axum::Json(serde_json::json!({
        "name": "portald",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
