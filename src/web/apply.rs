use crate::domain::models::{QuestionId, SubmissionRequest};
use crate::forms::schema::{FormValues, Rule, Violation};
use crate::forms::session::{FormEvent, FormState};
use crate::state::SharedState;
use crate::web::session;
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Field metadata the form shell renders from. One entry per question,
/// already in display order.
#[derive(Debug, Serialize)]
pub struct FieldDescriptor {
    pub id: QuestionId,
    pub label: String,
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_len: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct FormDescriptor {
    pub fields: Vec<FieldDescriptor>,
}

#[derive(Debug, Deserialize)]
pub struct ApplyPayload {
    pub team_name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub answers: HashMap<QuestionId, String>,
}

#[derive(Serialize)]
struct ValidationFailure {
    violations: Vec<Violation>,
}

#[derive(Serialize)]
struct SubmitResult {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    score: Option<f64>,
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/form", get(form_descriptor))
        .route("/", post(submit))
        .with_state(state)
}

/// Fetch-and-compile. A failed fetch is terminal for this page load:
/// the caller gets a visible error and no schema ever exists.
async fn form_descriptor(State(state): State<SharedState>) -> Response {
    let form = load_form(&state).await;

    match form {
        FormState::Ready { schema, .. } => {
            let fields = schema
                .fields()
                .iter()
                .map(|f| match &f.rule {
                    Rule::Text { max_len } => FieldDescriptor {
                        id: f.id,
                        label: f.label.clone(),
                        kind: "text",
                        options: None,
                        max_len: Some(*max_len),
                    },
                    Rule::YesNo => FieldDescriptor {
                        id: f.id,
                        label: f.label.clone(),
                        kind: "yes_no",
                        options: None,
                        max_len: None,
                    },
                    Rule::Dropdown { options } => FieldDescriptor {
                        id: f.id,
                        label: f.label.clone(),
                        kind: "dropdown",
                        options: Some(options.clone()),
                        max_len: None,
                    },
                })
                .collect();
            Json(FormDescriptor { fields }).into_response()
        }
        FormState::LoadFailed { message } => {
            tracing::error!("question fetch failed: {message}");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: "The application form could not be loaded. Please reload the page."
                        .to_string(),
                }),
            )
                .into_response()
        }
        _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    }
}

/// Validate against the freshly compiled schema, then forward to the
/// backend. Validation failures never reach the network; a backend
/// "rejected" decision is reported as an outcome, not an error.
async fn submit(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(payload): Json<ApplyPayload>,
) -> Response {
    let Some(token) = session::extract_token(&headers, &state.config.cookie_name) else {
        return StatusCode::UNAUTHORIZED.into_response();
    };

    let values = FormValues {
        team_name: payload.team_name,
        email: payload.email,
        phone: payload.phone,
        answers: payload.answers,
    };

    let form = load_form(&state)
        .await
        .apply(FormEvent::ValuesChanged(values))
        .apply(FormEvent::SubmitRequested);

    let (schema, values) = match form {
        FormState::Submitting { schema, values } => (schema, values),
        FormState::Ready { violations, .. } => {
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(ValidationFailure { violations }),
            )
                .into_response();
        }
        FormState::LoadFailed { message } => {
            tracing::error!("question fetch failed during submit: {message}");
            return (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: "The application form could not be loaded. Please reload the page."
                        .to_string(),
                }),
            )
                .into_response();
        }
        _ => return StatusCode::INTERNAL_SERVER_ERROR.into_response(),
    };

    let submission = SubmissionRequest {
        team_name: values.team_name.clone(),
        email: values.email.clone(),
        phone: values.phone.clone(),
        answers: schema.answers(&values),
    };

    let form = FormState::Submitting { schema, values };
    match state.api.submit_application(&token, &submission).await {
        Ok(outcome) => match form.apply(FormEvent::Outcome(outcome)) {
            FormState::Accepted { score } => Json(SubmitResult {
                status: "accepted",
                score,
            })
            .into_response(),
            FormState::Rejected => Json(SubmitResult {
                status: "rejected",
                score: None,
            })
            .into_response(),
            _ => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        },
        Err(e) => {
            tracing::error!("submission failed upstream: {e}");
            (
                StatusCode::BAD_GATEWAY,
                Json(ErrorBody {
                    error: "Your application could not be submitted right now. Please try again later."
                        .to_string(),
                }),
            )
                .into_response()
        }
    }
}

async fn load_form(state: &SharedState) -> FormState {
    let form = FormState::new();
    match state.api.questions().await {
        Ok(questions) => form.apply(FormEvent::QuestionsLoaded(questions)),
        Err(e) => form.apply(FormEvent::LoadFailed(e.to_string())),
    }
}
