//! HTTP application wiring.
//!
//! - `services.rs`: store/token wiring and the employee use cases
//! - `routes/`: handlers, one file per area
//! - `dto.rs`: request/response shapes and the `{code, msg, data}` envelope
//! - `errors.rs`: error to status mapping

use std::sync::Arc;

use axum::{Extension, Router};

use staffdesk_core::{Clock, SystemClock};

use crate::config::AppConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub fn build_app(config: AppConfig) -> anyhow::Result<Router> {
    build_app_with_clock(config, Arc::new(SystemClock))
}

/// As [`build_app`], with token and audit timestamps taken from `clock`.
pub fn build_app_with_clock(config: AppConfig, clock: Arc<dyn Clock>) -> anyhow::Result<Router> {
    let services = services::build_services(&config, clock)?;
    let auth_state = middleware::AuthState {
        tokens: services.tokens.clone(),
        token_header: config.jwt.admin_token_name.clone(),
    };

    // Gate only matched protected routes; unknown paths fall through to 404.
    let protected = routes::router().route_layer(axum::middleware::from_fn_with_state(
        auth_state,
        middleware::auth_gate,
    ));

    Ok(Router::new()
        .merge(routes::public_router())
        .merge(protected)
        .layer(Extension(Arc::new(services))))
}
