use crate::domain::models::ContactRequest;
use crate::state::SharedState;
use crate::web;
use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;

#[derive(Serialize)]
pub struct PageLink {
    pub slug: &'static str,
    pub title: &'static str,
}

/// Navigation metadata for the marketing shell. The page bodies are
/// static assets; only the contact form talks to the backend.
const PAGES: &[PageLink] = &[
    PageLink { slug: "home", title: "Home" },
    PageLink { slug: "about", title: "About" },
    PageLink { slug: "contact", title: "Contact" },
    PageLink { slug: "terms", title: "Terms of Service" },
    PageLink { slug: "privacy", title: "Privacy Policy" },
];

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/pages", get(pages))
        .route("/contact", post(submit_contact))
        .with_state(state)
}

async fn pages() -> Json<&'static [PageLink]> {
    Json(PAGES)
}

async fn submit_contact(
    State(state): State<SharedState>,
    Json(contact): Json<ContactRequest>,
) -> Result<StatusCode, StatusCode> {
    if contact.name.trim().is_empty()
        || contact.message.trim().is_empty()
        || !contact.email.contains('@')
    {
        return Err(StatusCode::BAD_REQUEST);
    }

    state.api.submit_contact(&contact).await.map_err(|e| {
        tracing::error!("failed to forward contact message: {e}");
        web::upstream_status(e)
    })?;

    Ok(StatusCode::ACCEPTED)
}
