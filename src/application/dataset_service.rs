// Dataset service - Use case for loading and summarizing test series
use crate::application::dataset_cache::{CachedDataset, DatasetCache};
use crate::application::evaluator::cycle_range;
use crate::application::measurement_source::MeasurementSource;
use crate::application::normalizer::normalize;
use crate::domain::error::{DashboardError, DashboardResult};
use crate::domain::series::{DatasetSummary, TestSeries};
use crate::infrastructure::config::RigConfig;
use crate::infrastructure::tsv::parse_tsv;
use chrono::{DateTime, SecondsFormat};
use std::sync::Arc;
use std::time::Instant;

#[derive(Clone)]
pub struct DatasetService {
    source: Arc<dyn MeasurementSource>,
    rig: Arc<RigConfig>,
    cache: Arc<DatasetCache>,
}

impl DatasetService {
    pub fn new(source: Arc<dyn MeasurementSource>, rig: Arc<RigConfig>) -> Self {
        Self {
            source,
            rig,
            cache: Arc::new(DatasetCache::new()),
        }
    }

    pub fn rig(&self) -> &RigConfig {
        &self.rig
    }

    pub fn list_series(&self) -> Vec<TestSeries> {
        self.rig.catalog()
    }

    pub fn series(&self, id: u32) -> DashboardResult<TestSeries> {
        self.rig
            .catalog()
            .into_iter()
            .find(|s| s.id == id)
            .ok_or_else(|| DashboardError::NotFound(format!("test series {} is not configured", id)))
    }

    /// Canonical table of a series, fetched and normalized on first use.
    pub async fn dataset(&self, id: u32) -> DashboardResult<Arc<CachedDataset>> {
        let series = self.series(id)?;
        self.cache
            .get_or_load(id, || self.load(series))
            .await
    }

    pub async fn summary(&self, id: u32) -> DashboardResult<DatasetSummary> {
        let series = self.series(id)?;
        let dataset = self.dataset(id).await?;
        let table = &dataset.table;

        let timestamps = &table.require(&self.rig.layout.timestamp_column)?.data;
        let as_utc = |row: usize| {
            timestamps
                .integer_at(row)
                .and_then(DateTime::from_timestamp_millis)
                .map(|t| t.to_rfc3339_opts(SecondsFormat::Millis, true))
        };
        let rows = table.row_count();
        let (recorded_from, recorded_to) = if rows == 0 {
            (None, None)
        } else {
            (as_utc(0), as_utc(rows - 1))
        };

        Ok(DatasetSummary {
            series,
            rows,
            cycles: cycle_range(table, &self.rig.layout)?,
            recorded_from,
            recorded_to,
            fingerprint: dataset.fingerprint.clone(),
        })
    }

    /// Drop the cached table so the next request fetches the file again.
    pub fn invalidate(&self, id: u32) -> bool {
        let dropped = self.cache.invalidate(id);
        if dropped {
            tracing::info!("Invalidated cached dataset for series {}", id);
        }
        dropped
    }

    /// Drop every cached table; returns the series that had been loaded.
    pub fn invalidate_all(&self) -> Vec<u32> {
        let loaded = self.cache.loaded_series();
        self.cache.clear();
        tracing::info!("Invalidated cached datasets for series {:?}", loaded);
        loaded
    }

    async fn load(&self, series: TestSeries) -> DashboardResult<CachedDataset> {
        let started = Instant::now();
        let rules = self.rig.rules_for(&series.schema).ok_or_else(|| {
            DashboardError::schema(format!("unknown schema variant '{}'", series.schema))
        })?;

        tracing::info!(
            "Fetching {} for series {} from {}",
            series.file,
            series.id,
            self.source.describe()
        );
        let text = self.source.fetch(&series.file).await.inspect_err(|e| {
            tracing::error!("Fetch failed for series {}: {}", series.id, e);
        })?;

        let canonical = parse_tsv(&text)
            .and_then(|raw| normalize(&raw, rules))
            .inspect_err(|e| {
                tracing::error!("Series {} does not match schema '{}': {}", series.id, series.schema, e);
            })?;

        tracing::debug!("Canonical columns: {:?}", canonical.column_names());
        tracing::info!(
            "Loaded series {}: {} rows in {:?}",
            series.id,
            canonical.row_count(),
            started.elapsed()
        );
        Ok(CachedDataset::new(canonical, &text))
    }
}
