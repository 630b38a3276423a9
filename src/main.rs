mod client;
mod config;
mod domain;
mod forms;
mod middleware;
mod services;
mod state;
mod web;

use crate::client::ApiClient;
use crate::config::Config;
use crate::state::{AppState, SharedState};
use axum::routing::get_service;
use std::sync::Arc;
use tower_http::{services::ServeDir, services::ServeFile, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env()?;
    tracing::info!("Backend API at {}", config.api_base_url);

    let api = ApiClient::new(config.api_base_url.clone());
    let idp = Arc::new(services::idp::OidcProvider::new(&config));
    let service_token = config.service_token.clone();

    let shared: SharedState = Arc::new(AppState {
        config,
        api,
        idp,
        inbox: Arc::new(tokio::sync::RwLock::new(Vec::new())),
    });

    if let Some(token) = service_token {
        services::inbox::spawn_refresh(shared.clone(), token);
        tracing::info!(
            "Inbox refresh running every {}s",
            shared.config.inbox_refresh_secs
        );
    } else {
        tracing::warn!("SERVICE_TOKEN not set; admin inbox snapshot stays empty");
    }

    let static_handler = ServeDir::new("static").not_found_service(ServeFile::new("static/index.html"));

    let app = axum::Router::new()
        .merge(web::routes(shared.clone()))
        .fallback_service(get_service(static_handler))
        .layer(axum::middleware::from_fn_with_state(
            shared.clone(),
            middleware::access_guard,
        ))
        .layer(TraceLayer::new_for_http());

    let addr = shared.config.bind_addr.clone();
    tracing::info!("Listening on {addr}");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
