use axum::{routing::get, Router};

pub mod employee;
pub mod system;

/// Routes that sit behind the auth gate.
pub fn router() -> Router {
    employee::router()
}

/// Routes reachable without a token.
pub fn public_router() -> Router {
    Router::new()
        .route("/health", get(system::health))
        .merge(employee::public_router())
}
