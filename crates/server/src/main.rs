use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use dispatch::{CallbackRegistry, DispatchCore};
use shared::protocol::DependencySummary;
use tower_http::{compression::CompressionLayer, limit::RequestBodyLimitLayer};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod app_state;
mod config;
mod demo;

use app_state::{AppState, HttpError};
use config::{load_settings, Settings};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let settings = load_settings()?;

    let mut registry = CallbackRegistry::new();
    demo::register_callbacks(&mut registry).context("callback registration failed")?;
    info!(callbacks = registry.len(), "callback registry ready");

    let state = AppState::new(DispatchCore::new(registry), &settings);
    let app = build_router(Arc::new(state), &settings);

    let addr: SocketAddr = settings.bind_addr.parse()?;
    info!(
        %addr,
        route = %settings.update_component_route(),
        execution = ?settings.handler_execution,
        "server listening"
    );
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(error) = tokio::signal::ctrl_c().await {
        error!(%error, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}

fn build_router(state: Arc<AppState>, settings: &Settings) -> Router {
    let router = Router::new()
        .route("/healthz", get(healthz))
        .route(&settings.update_component_route(), post(update_component))
        .route(&settings.dependencies_route(), get(dependencies))
        .with_state(state)
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(settings.max_body_bytes));

    if settings.compress {
        router.layer(CompressionLayer::new())
    } else {
        router
    }
}

async fn healthz() -> &'static str {
    "ok"
}

async fn update_component(
    State(state): State<Arc<AppState>>,
    body: Bytes,
) -> Result<Response, HttpError> {
    let encoded = state.execute(body).await?;
    let content_type = HeaderValue::from_static(state.core.codec().content_type());
    Ok((StatusCode::OK, [(header::CONTENT_TYPE, content_type)], encoded).into_response())
}

async fn dependencies(State(state): State<Arc<AppState>>) -> Json<Vec<DependencySummary>> {
    Json(state.core.registry().dependencies())
}

#[cfg(test)]
#[path = "tests/main_tests.rs"]
mod tests;
