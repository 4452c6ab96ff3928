// Cycle slice and per-parameter verdict models
use super::error::{DashboardError, DashboardResult};
use super::measurement::MeasurementTable;
use serde::Serialize;

/// Rows of one test cycle plus their elapsed time since the cycle's first sample.
///
/// A slice is never empty, so `elapsed_ms()[0] == 0` always holds.
#[derive(Debug, Clone)]
pub struct CycleSlice {
    cycle_id: i64,
    rows: MeasurementTable,
    start_timestamp_ms: i64,
    elapsed_ms: Vec<i64>,
}

impl CycleSlice {
    /// `timestamps_ms` must hold one canonical timestamp per row of `rows`.
    pub fn new(
        cycle_id: i64,
        rows: MeasurementTable,
        timestamps_ms: &[i64],
    ) -> DashboardResult<Self> {
        let Some(&start) = timestamps_ms.first() else {
            return Err(DashboardError::NotFound(format!(
                "cycle {} has no rows",
                cycle_id
            )));
        };
        if timestamps_ms.len() != rows.row_count() {
            return Err(DashboardError::schema(format!(
                "cycle {}: {} timestamps for {} rows",
                cycle_id,
                timestamps_ms.len(),
                rows.row_count()
            )));
        }
        let elapsed_ms = timestamps_ms
            .iter()
            .map(|&t| {
                t.checked_sub(start).ok_or_else(|| {
                    DashboardError::schema(format!(
                        "cycle {}: timestamp {} is too far from the cycle start {}",
                        cycle_id, t, start
                    ))
                })
            })
            .collect::<DashboardResult<Vec<i64>>>()?;
        Ok(Self {
            cycle_id,
            rows,
            start_timestamp_ms: start,
            elapsed_ms,
        })
    }

    pub fn cycle_id(&self) -> i64 {
        self.cycle_id
    }

    pub fn rows(&self) -> &MeasurementTable {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.elapsed_ms.len()
    }

    pub fn start_timestamp_ms(&self) -> i64 {
        self.start_timestamp_ms
    }

    pub fn elapsed_ms(&self) -> &[i64] {
        &self.elapsed_ms
    }

    /// Elapsed time of the last sample; the x-axis extent of the cycle's charts.
    pub fn duration_ms(&self) -> i64 {
        self.elapsed_ms.last().copied().unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Verdict {
    Good,
    Error,
}

impl Verdict {
    /// Strictly greater than the threshold is an error; equality passes.
    pub fn judge(value: f64, threshold: f64) -> Self {
        if value > threshold {
            Verdict::Error
        } else {
            Verdict::Good
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterVerdict {
    pub parameter: String,
    pub label: String,
    pub value: f64,
    pub threshold: f64,
    pub precision: u32,
    pub verdict: Verdict,
}
