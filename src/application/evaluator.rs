// Cycle evaluator - cycle selection and threshold verdicts
use crate::domain::cycle::{CycleSlice, ParameterVerdict, Verdict};
use crate::domain::error::{DashboardError, DashboardResult};
use crate::domain::measurement::{ColumnData, MeasurementTable};
use crate::domain::series::CycleRange;
use crate::infrastructure::config::{CycleLayout, ThresholdConfig};

/// Selectable cycle ids, `[1, cycle id of the last row]`; `None` for an empty table.
pub fn cycle_range(table: &MeasurementTable, layout: &CycleLayout) -> DashboardResult<Option<CycleRange>> {
    let counter = &table.require(&layout.cycle_column)?.data;
    if counter.is_empty() {
        return Ok(None);
    }
    let last = cycle_at(&layout.cycle_column, counter, counter.len() - 1)?;
    Ok(Some(CycleRange { first: 1, last }))
}

/// Rows of `cycle_id` in original order, with elapsed time from the cycle's first sample.
pub fn select_cycle(
    table: &MeasurementTable,
    layout: &CycleLayout,
    cycle_id: i64,
) -> DashboardResult<CycleSlice> {
    let range = cycle_range(table, layout)?;
    if !range.is_some_and(|r| r.contains(cycle_id)) {
        let bounds = range
            .map(|r| format!("[{}, {}]", r.first, r.last))
            .unwrap_or_else(|| "an empty dataset".to_string());
        return Err(DashboardError::NotFound(format!(
            "cycle {} is outside {}",
            cycle_id, bounds
        )));
    }

    let counter = &table.require(&layout.cycle_column)?.data;
    let mut rows = Vec::new();
    for row in 0..counter.len() {
        if cycle_at(&layout.cycle_column, counter, row)? == cycle_id {
            rows.push(row);
        }
    }
    if rows.is_empty() {
        return Err(DashboardError::NotFound(format!(
            "cycle {} has no samples",
            cycle_id
        )));
    }

    let slice = table.take_rows(&rows);
    let timestamps = match &slice.require(&layout.timestamp_column)?.data {
        ColumnData::Float(_) => {
            return Err(DashboardError::schema(format!(
                "timestamp column '{}' is not integer milliseconds",
                layout.timestamp_column
            )));
        }
        data => (0..data.len())
            .filter_map(|row| data.integer_at(row))
            .collect::<Vec<i64>>(),
    };

    tracing::debug!("Selected cycle {} with {} samples", cycle_id, rows.len());
    CycleSlice::new(cycle_id, slice, &timestamps)
}

/// Judge each threshold against the cycle's first sample, in threshold order.
pub fn evaluate(
    slice: &CycleSlice,
    thresholds: &[ThresholdConfig],
) -> DashboardResult<Vec<ParameterVerdict>> {
    thresholds
        .iter()
        .map(|threshold| {
            let column = slice
                .rows()
                .column(&threshold.column)
                .ok_or_else(|| DashboardError::MissingParameter(threshold.column.clone()))?;
            let value = column.data.float_at(0);
            Ok(ParameterVerdict {
                parameter: threshold.column.clone(),
                label: threshold.label.clone(),
                value,
                threshold: threshold.limit,
                precision: threshold.precision,
                verdict: Verdict::judge(value, threshold.limit),
            })
        })
        .collect()
}

fn cycle_at(name: &str, counter: &ColumnData, row: usize) -> DashboardResult<i64> {
    if let Some(id) = counter.integer_at(row) {
        return Ok(id);
    }
    let value = counter.float_at(row);
    if value.is_finite() && value.fract() == 0.0 {
        Ok(value as i64)
    } else {
        Err(DashboardError::schema(format!(
            "row {} of '{}': {} is not a cycle id",
            row, name, value
        )))
    }
}
