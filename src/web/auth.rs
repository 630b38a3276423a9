use crate::state::SharedState;
use axum::{
    extract::{Query, State},
    http::HeaderMap,
    response::{IntoResponse, Redirect},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct LoginParams {
    #[serde(rename = "returnTo")]
    pub return_to: Option<String>,
}

#[derive(Serialize)]
struct PendingAccess {
    title: &'static str,
    message: &'static str,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/auth/login", get(login))
        .route("/auth/logout", get(logout))
        .route("/pending-access", get(pending_access))
        .with_state(state)
}

async fn login(
    State(state): State<SharedState>,
    Query(params): Query<LoginParams>,
) -> Redirect {
    let return_to = sanitize_return_to(params.return_to);
    Redirect::to(&state.idp.authorize_url(&return_to))
}

async fn logout(State(state): State<SharedState>) -> impl IntoResponse {
    let mut headers = HeaderMap::new();
    let expired = format!(
        "{}=; HttpOnly; SameSite=Lax; Path=/; Max-Age=0",
        state.config.cookie_name
    );
    if let Ok(value) = expired.parse() {
        headers.insert(axum::http::header::SET_COOKIE, value);
    }
    (headers, Redirect::to(&state.idp.logout_url()))
}

/// Landing page for authenticated users who are not yet authorized for
/// the admin dashboard.
async fn pending_access() -> Json<PendingAccess> {
    Json(PendingAccess {
        title: "Access pending",
        message: "Your account is signed in but has not been granted admin access yet. \
                  An administrator will review your request.",
    })
}

/// Only same-site paths may round-trip through the provider.
fn sanitize_return_to(raw: Option<String>) -> String {
    raw.filter(|p| p.starts_with('/') && !p.starts_with("//"))
        .unwrap_or_else(|| "/".to_string())
}
