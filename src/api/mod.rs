pub mod auth;
pub mod employees;
pub mod error;
pub mod query;
pub mod validation;

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use crate::AppState;

pub fn create_router(state: Arc<AppState>) -> Router {
    // Token issuing routes (public)
    let auth_routes = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login));

    // Employee records. Listing is public; the other operations resolve the
    // caller through the bearer-token extractor and reject anonymous requests.
    let employee_routes = Router::new()
        .route("/employees", get(employees::list_employees))
        .route("/employees", post(employees::create_employee))
        .route("/employees/:id", get(employees::get_employee))
        .route("/employees/:id", put(employees::update_employee))
        .route("/employees/:id", delete(employees::delete_employee));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/auth", auth_routes)
        .nest("/api", employee_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
