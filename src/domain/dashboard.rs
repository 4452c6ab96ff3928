// Dashboard domain model
use super::telemetry::{ChartData, TileData};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
pub struct CycleDashboard {
    pub title: String,
    pub series: u32,
    pub cycle: i64,
    pub started_at: Option<String>,
    pub duration_ms: i64,
    pub tiles: Vec<TileData>,
    pub charts: Vec<ChartData>,
}

impl CycleDashboard {
    pub fn widget_count(&self) -> usize {
        self.tiles.len() + self.charts.len()
    }
}

/// Layout sent ahead of the data in a streamed dashboard.
#[derive(Debug, Clone, Serialize)]
pub struct DashboardSkeleton {
    pub title: String,
    pub series: u32,
    pub cycle: i64,
    pub tiles: Vec<TileSkeleton>,
    pub charts: Vec<ChartSkeleton>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TileSkeleton {
    pub id: String,
    pub title: String,
    pub precision: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChartSkeleton {
    pub id: String,
    pub title: String,
    pub unit: Option<String>,
    pub series: Vec<String>,
}

/// One chunk of a progressively delivered dashboard.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum StreamMessage {
    Skeleton(DashboardSkeleton),
    TileUpdate(TileData),
    ChartUpdate(ChartData),
    Complete { widgets: usize, duration_ms: i64 },
    Failed { error: String },
}
