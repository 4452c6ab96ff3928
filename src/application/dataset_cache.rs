// Read-through memo of canonical tables, keyed by series id
use crate::domain::error::DashboardResult;
use crate::domain::measurement::MeasurementTable;
use std::collections::HashMap;
use std::future::Future;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::sync::{Arc, Mutex};
use tokio::sync::OnceCell;

#[derive(Debug)]
pub struct CachedDataset {
    pub table: Arc<MeasurementTable>,
    pub fingerprint: String,
}

impl CachedDataset {
    pub fn new(table: MeasurementTable, raw_text: &str) -> Self {
        Self {
            table: Arc::new(table),
            fingerprint: fingerprint(raw_text),
        }
    }
}

/// At most one fetch and transform per series; concurrent first requests wait
/// on the same load. Failed loads leave the slot empty.
#[derive(Default)]
pub struct DatasetCache {
    entries: Mutex<HashMap<u32, Arc<OnceCell<Arc<CachedDataset>>>>>,
}

impl DatasetCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get_or_load<F, Fut>(&self, series: u32, load: F) -> DashboardResult<Arc<CachedDataset>>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = DashboardResult<CachedDataset>>,
    {
        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
            entries.entry(series).or_default().clone()
        };

        cell.get_or_try_init(|| async { load().await.map(Arc::new) })
            .await
            .cloned()
    }

    /// Forget one series; returns whether a loaded table was dropped.
    pub fn invalidate(&self, series: u32) -> bool {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries
            .remove(&series)
            .is_some_and(|cell| cell.initialized())
    }

    pub fn clear(&self) {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clear();
    }

    pub fn loaded_series(&self) -> Vec<u32> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        let mut ids: Vec<u32> = entries
            .iter()
            .filter(|(_, cell)| cell.initialized())
            .map(|(id, _)| *id)
            .collect();
        ids.sort_unstable();
        ids
    }
}

fn fingerprint(raw_text: &str) -> String {
    let mut hasher = DefaultHasher::new();
    raw_text.hash(&mut hasher);
    format!("{:016x}-{}", hasher.finish(), raw_text.len())
}
