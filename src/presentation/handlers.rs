// HTTP request handlers
use crate::domain::error::DashboardError;
use crate::domain::series::{DatasetSummary, TestSeries};
use crate::domain::telemetry::MeasurementFamily;
use crate::infrastructure::chunked_json::stream_from_receiver;
use crate::infrastructure::config::ThresholdConfig;
use crate::infrastructure::http_response::{accepts_brotli, json_response};
use crate::presentation::app_state::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

#[derive(Debug, Deserialize, Default)]
pub struct CycleQuery {
    /// Comma separated measurement families, e.g. `pressure,position`
    pub families: Option<String>,
    /// Pull an out-of-range cycle into the selectable range instead of failing
    #[serde(default)]
    pub clamp: bool,
}

impl CycleQuery {
    fn families(&self) -> Result<Vec<MeasurementFamily>, DashboardError> {
        MeasurementFamily::parse_selection(self.families.as_deref().unwrap_or_default())
    }
}

/// Health check endpoint
pub async fn health_check() -> &'static str {
    "ok"
}

/// Configured test series
pub async fn list_series(State(state): State<Arc<AppState>>) -> Json<Vec<TestSeries>> {
    Json(state.dashboard_service.datasets().list_series())
}

/// Error thresholds in evaluation order
pub async fn list_thresholds(State(state): State<Arc<AppState>>) -> Json<Vec<ThresholdConfig>> {
    Json(state.dashboard_service.datasets().rig().thresholds.clone())
}

/// Row count, selectable cycle range and recording window of one series
pub async fn series_summary(
    Path(id): Path<u32>,
    State(state): State<Arc<AppState>>,
) -> Result<Json<DatasetSummary>, DashboardError> {
    state.dashboard_service.datasets().summary(id).await.map(Json)
}

/// Drop the cached dataset of a series
pub async fn reload_series(
    Path(id): Path<u32>,
    State(state): State<Arc<AppState>>,
) -> Result<StatusCode, DashboardError> {
    let datasets = state.dashboard_service.datasets();
    datasets.series(id)?;
    datasets.invalidate(id);
    Ok(StatusCode::NO_CONTENT)
}

/// Drop every cached dataset
pub async fn reload_all(State(state): State<Arc<AppState>>) -> Json<Vec<u32>> {
    Json(state.dashboard_service.datasets().invalidate_all())
}

/// Verdicts and charts for one cycle
pub async fn cycle_dashboard(
    Path((id, cycle)): Path<(u32, i64)>,
    Query(query): Query<CycleQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, DashboardError> {
    let families = query.families()?;
    let cycle = resolve_cycle(&state, id, cycle, query.clamp).await?;

    let dashboard = state
        .dashboard_service
        .get_dashboard(id, cycle, &families)
        .await?;

    Ok(match json_response(&dashboard, accepts_brotli(&headers)).await {
        Ok(response) => response,
        Err(status) => status.into_response(),
    })
}

/// Stream a cycle dashboard progressively
pub async fn stream_cycle_dashboard(
    Path((id, cycle)): Path<(u32, i64)>,
    Query(query): Query<CycleQuery>,
    headers: HeaderMap,
    State(state): State<Arc<AppState>>,
) -> Result<Response, DashboardError> {
    let families = query.families()?;
    let cycle = resolve_cycle(&state, id, cycle, query.clamp).await?;

    let rx = state.streaming_service.stream_dashboard(id, cycle, families);
    Ok(stream_from_receiver(rx, accepts_brotli(&headers))
        .await
        .into_response())
}

async fn resolve_cycle(
    state: &AppState,
    id: u32,
    cycle: i64,
    clamp: bool,
) -> Result<i64, DashboardError> {
    if !clamp {
        return Ok(cycle);
    }
    let summary = state.dashboard_service.datasets().summary(id).await?;
    let range = summary
        .cycles
        .ok_or_else(|| DashboardError::NotFound(format!("test series {} has no cycles", id)))?;
    Ok(range.clamp(cycle))
}
