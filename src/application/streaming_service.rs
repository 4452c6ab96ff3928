// Streaming dashboard service - Progressive loading with chunked JSON
use crate::application::dashboard_service::DashboardService;
use crate::domain::dashboard::StreamMessage;
use crate::domain::telemetry::MeasurementFamily;
use std::time::Instant;
use tokio::sync::mpsc;

#[derive(Clone)]
pub struct StreamingDashboardService {
    dashboards: DashboardService,
}

impl StreamingDashboardService {
    pub fn new(dashboards: DashboardService) -> Self {
        Self { dashboards }
    }

    /// Skeleton first, then one message per tile and chart, then completion.
    ///
    /// A failure after the skeleton is reported as a `Failed` message and ends
    /// the stream.
    pub fn stream_dashboard(
        &self,
        series: u32,
        cycle: i64,
        families: Vec<MeasurementFamily>,
    ) -> mpsc::Receiver<StreamMessage> {
        let (tx, rx) = mpsc::channel(100);
        let dashboards = self.dashboards.clone();

        tokio::spawn(async move {
            let start_time = Instant::now();

            // 1. Layout from configuration, sent before the dataset is loaded
            match dashboards.skeleton(series, cycle, &families) {
                Ok(skeleton) => {
                    if tx.send(StreamMessage::Skeleton(skeleton)).await.is_err() {
                        return;
                    }
                }
                Err(e) => {
                    let _ = tx.send(StreamMessage::Failed { error: e.to_string() }).await;
                    return;
                }
            }

            // 2. Load (possibly cached) and evaluate
            let dashboard = match dashboards.get_dashboard(series, cycle, &families).await {
                Ok(dashboard) => dashboard,
                Err(e) => {
                    tracing::warn!("Streaming series {} cycle {} failed: {}", series, cycle, e);
                    let _ = tx.send(StreamMessage::Failed { error: e.to_string() }).await;
                    return;
                }
            };

            let widgets = dashboard.widget_count();

            // 3. Tiles, then charts
            for tile in dashboard.tiles {
                if tx.send(StreamMessage::TileUpdate(tile)).await.is_err() {
                    tracing::debug!("Stream receiver dropped during tiles");
                    return;
                }
            }
            for chart in dashboard.charts {
                if tx.send(StreamMessage::ChartUpdate(chart)).await.is_err() {
                    tracing::debug!("Stream receiver dropped during charts");
                    return;
                }
            }

            let duration_ms = start_time.elapsed().as_millis() as i64;
            let _ = tx
                .send(StreamMessage::Complete {
                    widgets,
                    duration_ms,
                })
                .await;
        });

        rx
    }
}
