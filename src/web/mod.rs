pub mod admin;
pub mod apply;
pub mod auth;
pub mod public;
pub mod session;
pub mod user;

use crate::client::ApiError;
use crate::state::SharedState;
use axum::{http::StatusCode, routing::get, Router};

async fn health() -> &'static str {
    "OK"
}

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .merge(auth::router(state.clone()))
        .nest("/api", public::router(state.clone()))
        .nest("/api/apply", apply::router(state.clone()))
        .nest("/api/user", user::router(state.clone()))
        .nest("/api/admin", admin::router(state))
}

/// Map a backend failure onto the status this shell reports. Auth
/// refusals pass through; everything else is the upstream's problem.
pub(crate) fn upstream_status(err: ApiError) -> StatusCode {
    match err {
        ApiError::Status { status } => match status.as_u16() {
            401 => StatusCode::UNAUTHORIZED,
            403 => StatusCode::FORBIDDEN,
            404 => StatusCode::NOT_FOUND,
            _ => StatusCode::BAD_GATEWAY,
        },
        ApiError::Transport(_) | ApiError::Decode(_) => StatusCode::BAD_GATEWAY,
    }
}
