use axum::{
    Router, middleware,
    routing::{get, post},
};

use crate::{auth, infra::app_state::AppState, scan_handlers};

/// Create all v1 API routes
pub fn create_v1_router(state: AppState) -> Router<AppState> {
    Router::new()
        // Public authentication endpoints
        .route("/auth/register", post(auth::handlers::register))
        .route("/auth/login", post(auth::handlers::login))
        // Merge protected routes
        .merge(create_protected_routes(state))
}

/// Create protected routes that require authentication
fn create_protected_routes(state: AppState) -> Router<AppState> {
    Router::new()
        .route("/users/me", get(auth::handlers::get_current_user))
        .route(
            "/scans",
            post(scan_handlers::create_scan_handler).get(scan_handlers::list_scans_handler),
        )
        .route("/scans/{id}", get(scan_handlers::get_scan_handler))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::middleware::auth_middleware,
        ))
}
