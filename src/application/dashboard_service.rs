// Dashboard service - Use case for building a cycle dashboard
use crate::application::dataset_service::DatasetService;
use crate::application::evaluator::{evaluate, select_cycle};
use crate::domain::cycle::{CycleSlice, Verdict};
use crate::domain::dashboard::{ChartSkeleton, CycleDashboard, DashboardSkeleton, TileSkeleton};
use crate::domain::error::{DashboardError, DashboardResult};
use crate::domain::measurement::MeasurementTable;
use crate::domain::telemetry::{
    ChartData, ChartKind, MeasurementFamily, SeriesData, TileData, TimeSeriesPoint,
};
use chrono::{DateTime, SecondsFormat};

#[derive(Clone)]
pub struct DashboardService {
    datasets: DatasetService,
}

impl DashboardService {
    pub fn new(datasets: DatasetService) -> Self {
        Self { datasets }
    }

    pub fn datasets(&self) -> &DatasetService {
        &self.datasets
    }

    pub async fn get_dashboard(
        &self,
        series: u32,
        cycle: i64,
        families: &[MeasurementFamily],
    ) -> DashboardResult<CycleDashboard> {
        let dataset = self.datasets.dataset(series).await?;
        self.build(&dataset.table, series, cycle, families)
    }

    /// Evaluate one cycle of an already loaded table and lay out its widgets.
    pub fn build(
        &self,
        table: &MeasurementTable,
        series: u32,
        cycle: i64,
        families: &[MeasurementFamily],
    ) -> DashboardResult<CycleDashboard> {
        let rig = self.datasets.rig();
        let slice = select_cycle(table, &rig.layout, cycle)?;
        let verdicts = evaluate(&slice, &rig.thresholds)?;

        let tiles: Vec<TileData> = verdicts.iter().map(TileData::from_verdict).collect();
        let charts = families
            .iter()
            .map(|family| self.build_chart(&slice, *family))
            .collect::<DashboardResult<Vec<_>>>()?;

        let errors = verdicts
            .iter()
            .filter(|v| v.verdict == Verdict::Error)
            .count();
        tracing::info!(
            "Series {} cycle {}: {} samples, {} of {} parameters in error",
            series,
            slice.cycle_id(),
            slice.len(),
            errors,
            verdicts.len()
        );

        Ok(CycleDashboard {
            title: title(series, cycle),
            series,
            cycle,
            started_at: DateTime::from_timestamp_millis(slice.start_timestamp_ms())
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true)),
            duration_ms: slice.duration_ms(),
            tiles,
            charts,
        })
    }

    /// Layout known from configuration alone, before any data is loaded.
    pub fn skeleton(
        &self,
        series: u32,
        cycle: i64,
        families: &[MeasurementFamily],
    ) -> DashboardResult<DashboardSkeleton> {
        let rig = self.datasets.rig();
        let tiles = rig
            .thresholds
            .iter()
            .map(|t| TileSkeleton {
                id: t.column.clone(),
                title: t.label.clone(),
                precision: t.precision,
            })
            .collect();

        let charts = families
            .iter()
            .map(|family| {
                let chart = rig.chart_for(*family).ok_or_else(|| no_chart(*family))?;
                Ok(ChartSkeleton {
                    id: family.as_str().to_string(),
                    title: chart.title.clone(),
                    unit: chart.unit.clone(),
                    series: chart.series.iter().map(|s| s.column.clone()).collect(),
                })
            })
            .collect::<DashboardResult<Vec<_>>>()?;

        Ok(DashboardSkeleton {
            title: title(series, cycle),
            series,
            cycle,
            tiles,
            charts,
        })
    }

    fn build_chart(&self, slice: &CycleSlice, family: MeasurementFamily) -> DashboardResult<ChartData> {
        let rig = self.datasets.rig();
        let chart = rig.chart_for(family).ok_or_else(|| no_chart(family))?;

        let mut series_list = Vec::with_capacity(chart.series.len());
        for series_config in &chart.series {
            let column = slice.rows().require(&series_config.column)?;
            let points: Vec<TimeSeriesPoint> = slice
                .elapsed_ms()
                .iter()
                .enumerate()
                .map(|(row, &t)| TimeSeriesPoint::new(t, column.data.float_at(row)))
                .collect();

            series_list.push(SeriesData::new(
                series_config.column.clone(),
                series_config.name.clone(),
                series_config.color.clone(),
                Self::downsample_points(points, rig.max_points_per_series),
            ));
        }

        Ok(ChartData {
            id: family.as_str().to_string(),
            family,
            title: chart.title.clone(),
            unit: chart.unit.clone(),
            kind: ChartKind::for_series_count(series_list.len()),
            x_max: slice.duration_ms(),
            y_min: chart.y_min,
            y_max: chart.y_max,
            series: series_list,
        })
    }

    /// Downsample time series points using bucket averaging
    fn downsample_points(points: Vec<TimeSeriesPoint>, max_points: usize) -> Vec<TimeSeriesPoint> {
        if max_points == 0 || points.len() <= max_points {
            return points;
        }

        let bucket_size = points.len().div_ceil(max_points);
        let mut downsampled = Vec::with_capacity(max_points);

        for chunk in points.chunks(bucket_size) {
            // Use middle point's timestamp and average value
            let mid_idx = chunk.len() / 2;
            let avg_value = chunk.iter().map(|p| p.value).sum::<f64>() / chunk.len() as f64;

            downsampled.push(TimeSeriesPoint::new(chunk[mid_idx].time_ms, avg_value));
        }

        downsampled
    }
}

fn title(series: u32, cycle: i64) -> String {
    format!("Test series {} - cycle {}", series, cycle)
}

fn no_chart(family: MeasurementFamily) -> DashboardError {
    DashboardError::InvalidSelection(format!(
        "no chart configured for family '{}'",
        family.as_str()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dataset_service::tests::{MemorySource, service_with};
    use crate::test_support::two_cycle_export;

    fn dashboards() -> DashboardService {
        let (datasets, _) = service_with(
            MemorySource::default().with_file("V1_data.csv", two_cycle_export()),
        );
        DashboardService::new(datasets)
    }

    #[tokio::test]
    async fn test_dashboard_tiles_and_charts() {
        let service = dashboards();
        let dashboard = service
            .get_dashboard(
                1,
                2,
                &[MeasurementFamily::Pressure, MeasurementFamily::Position],
            )
            .await
            .unwrap();

        assert_eq!(dashboard.title, "Test series 1 - cycle 2");
        assert_eq!(dashboard.duration_ms, 1);
        assert_eq!(dashboard.started_at.as_deref(), Some("1970-01-01T00:00:00.005Z"));
        assert_eq!(dashboard.tiles.len(), 5);
        assert_eq!(dashboard.tiles[0].verdict, Verdict::Error);
        assert_eq!(dashboard.widget_count(), 7);

        let pressure = &dashboard.charts[0];
        assert_eq!(pressure.family, MeasurementFamily::Pressure);
        assert_eq!(pressure.kind, ChartKind::MultiLine);
        assert_eq!(pressure.series.len(), 3);
        assert_eq!(pressure.x_max, 1);
        assert_eq!(pressure.y_max, Some(220.0));
        assert_eq!(
            pressure.series[0].points,
            vec![TimeSeriesPoint::new(0, 50.0), TimeSeriesPoint::new(1, 50.0)]
        );

        let position = &dashboard.charts[1];
        assert_eq!(position.kind, ChartKind::Line);
        assert_eq!(position.unit.as_deref(), Some("mm"));
    }

    #[tokio::test]
    async fn test_no_families_means_no_charts() {
        let dashboard = dashboards().get_dashboard(1, 1, &[]).await.unwrap();
        assert!(dashboard.charts.is_empty());
        assert_eq!(dashboard.tiles.len(), 5);
    }

    #[tokio::test]
    async fn test_out_of_range_cycle() {
        let err = dashboards().get_dashboard(1, 3, &[]).await.unwrap_err();
        assert!(matches!(err, DashboardError::NotFound(_)));
    }

    #[test]
    fn test_skeleton_without_data() {
        let skeleton = dashboards()
            .skeleton(4, 10, &[MeasurementFamily::Flow])
            .unwrap();
        assert_eq!(skeleton.tiles.len(), 5);
        assert_eq!(skeleton.charts.len(), 1);
        assert_eq!(skeleton.charts[0].series, vec!["flow FS4".to_string()]);
    }

    #[test]
    fn test_downsample_points() {
        let points: Vec<TimeSeriesPoint> = (0..10)
            .map(|i| TimeSeriesPoint::new(i, i as f64))
            .collect();

        let reduced = DashboardService::downsample_points(points.clone(), 5);
        assert_eq!(reduced.len(), 5);
        assert_eq!(reduced[0], TimeSeriesPoint::new(1, 0.5));
        assert_eq!(reduced[4], TimeSeriesPoint::new(9, 8.5));

        assert_eq!(DashboardService::downsample_points(points.clone(), 20), points);
        assert_eq!(DashboardService::downsample_points(points.clone(), 0), points);
    }
}
