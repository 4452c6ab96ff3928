// Test series catalog entries and dataset summaries
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TestSeries {
    pub id: u32,
    pub name: String,
    pub file: String,
    pub schema: String,
}

impl TestSeries {
    pub fn new(id: u32, file: String, schema: String) -> Self {
        Self {
            id,
            name: format!("Test series {}", id),
            file,
            schema,
        }
    }
}

/// Inclusive range of cycle ids the operator may select.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CycleRange {
    pub first: i64,
    pub last: i64,
}

impl CycleRange {
    pub fn contains(&self, cycle: i64) -> bool {
        cycle >= self.first && cycle <= self.last
    }

    /// Pull an arbitrary request into the selectable range.
    pub fn clamp(&self, cycle: i64) -> i64 {
        cycle.clamp(self.first, self.last.max(self.first))
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct DatasetSummary {
    pub series: TestSeries,
    pub rows: usize,
    pub cycles: Option<CycleRange>,
    pub recorded_from: Option<String>,
    pub recorded_to: Option<String>,
    pub fingerprint: String,
}
