use anyhow::{Context, Result};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::api::{self, AppState};
use crate::config::PressureConfig;
use crate::pressure::SurfacePressureService;

/// Full application router, API mounted under `/api`
pub fn app(config: PressureConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = AppState::new(SurfacePressureService::new(config));

    Router::new()
        .nest("/api", api::router(state))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

pub async fn run(config: PressureConfig) -> Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let app = app(config);

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Web server running at http://{}", addr);
    axum::serve(listener, app)
        .await
        .context("Web server terminated unexpectedly")
}
