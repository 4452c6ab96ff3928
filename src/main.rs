// Main entry point - Dependency injection and server setup
mod application;
mod domain;
mod infrastructure;
mod presentation;
#[cfg(test)]
mod test_support;

use std::{net::SocketAddr, sync::Arc};

use anyhow::Context;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use crate::application::dashboard_service::DashboardService;
use crate::application::dataset_service::DatasetService;
use crate::application::measurement_source::MeasurementSource;
use crate::application::streaming_service::StreamingDashboardService;
use crate::infrastructure::config::{load_app_config, AppConfig, SourceKind};
use crate::infrastructure::http_source::HttpSource;
use crate::infrastructure::local_source::LocalDirectorySource;
use crate::presentation::app_state::AppState;
use crate::presentation::handlers::{
    cycle_dashboard, health_check, list_series, list_thresholds, reload_all, reload_series,
    series_summary, stream_cycle_dashboard,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let app_config = load_app_config()?;

    // Create measurement source (infrastructure layer)
    let source = build_source(&app_config)?;
    tracing::info!("Reading measurement files from {}", source.describe());

    // Create services (application layer)
    let datasets = DatasetService::new(source, Arc::new(app_config.rig.clone()));
    let dashboard_service = DashboardService::new(datasets);
    let streaming_service = StreamingDashboardService::new(dashboard_service.clone());

    // Create application state
    let state = Arc::new(AppState {
        dashboard_service,
        streaming_service,
    });

    // Build router (presentation layer)
    // Responses are compressed by hand, so no CompressionLayer here
    let router = Router::new()
        .route("/healthz", get(health_check))
        .route("/series", get(list_series))
        .route("/series/:id", get(series_summary))
        .route("/series/:id/reload", post(reload_series))
        .route("/series/:id/cycles/:cycle", get(cycle_dashboard))
        .route("/series/:id/cycles/:cycle/stream", get(stream_cycle_dashboard))
        .route("/thresholds", get(list_thresholds))
        .route("/reload", post(reload_all))
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    // Start server
    let addr: SocketAddr = app_config
        .server
        .bind
        .parse()
        .with_context(|| format!("Invalid bind address '{}'", app_config.server.bind))?;
    tracing::info!("Starting press-bench-dashboard on {}", addr);

    axum::serve(tokio::net::TcpListener::bind(addr).await?, router).await?;

    Ok(())
}

fn build_source(app_config: &AppConfig) -> anyhow::Result<Arc<dyn MeasurementSource>> {
    let source = &app_config.source;
    Ok(match source.kind {
        SourceKind::Http => Arc::new(HttpSource::new(
            source.base_url.clone().context("source.base_url is not set")?,
            source.api_key.clone().context("source.api_key is not set")?,
        )),
        SourceKind::Local => Arc::new(LocalDirectorySource::new(
            source.directory.clone().context("source.directory is not set")?,
        )),
    })
}
