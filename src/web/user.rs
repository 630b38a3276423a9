use crate::domain::models::{Decision, Message, SubmissionDetail};
use crate::state::SharedState;
use crate::web::{self, session};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    routing::get,
    Json, Router,
};
use serde::Serialize;

/// What the user-facing dashboard shows about the caller's application.
#[derive(Serialize)]
pub struct ApplicationStatus {
    pub submitted: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Decision>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub submission: Option<SubmissionDetail>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/status", get(my_status))
        .route("/messages", get(my_messages))
        .with_state(state)
}

async fn my_status(
    headers: HeaderMap,
    State(state): State<SharedState>,
) -> Result<Json<ApplicationStatus>, StatusCode> {
    let token = token(&state, &headers)?;

    let submission = state.api.my_submission(&token).await.map_err(|e| {
        tracing::error!("failed to load own submission: {e}");
        web::upstream_status(e)
    })?;

    Ok(Json(ApplicationStatus {
        submitted: submission.is_some(),
        status: submission.as_ref().map(|s| s.status),
        submission,
    }))
}

async fn my_messages(
    headers: HeaderMap,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Message>>, StatusCode> {
    let token = token(&state, &headers)?;

    let messages = state.api.my_messages(&token).await.map_err(|e| {
        tracing::error!("failed to load own messages: {e}");
        web::upstream_status(e)
    })?;

    Ok(Json(messages))
}

fn token(state: &SharedState, headers: &HeaderMap) -> Result<String, StatusCode> {
    session::extract_token(headers, &state.config.cookie_name).ok_or(StatusCode::UNAUTHORIZED)
}
