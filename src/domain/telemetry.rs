// Chart and tile models derived from a cycle slice
use super::cycle::{ParameterVerdict, Verdict};
use super::error::DashboardError;
use super::measurement::round_to;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesPoint {
    pub time_ms: i64,
    pub value: f64,
}

impl TimeSeriesPoint {
    pub fn new(time_ms: i64, value: f64) -> Self {
        Self { time_ms, value }
    }
}

/// Channel groups the operator can chart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MeasurementFamily {
    Pressure,
    Position,
    Flow,
    Temperature,
}

impl MeasurementFamily {
    pub const ALL: [MeasurementFamily; 4] = [
        MeasurementFamily::Pressure,
        MeasurementFamily::Position,
        MeasurementFamily::Flow,
        MeasurementFamily::Temperature,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MeasurementFamily::Pressure => "pressure",
            MeasurementFamily::Position => "position",
            MeasurementFamily::Flow => "flow",
            MeasurementFamily::Temperature => "temperature",
        }
    }

    /// Parse a comma separated selection such as `"pressure,Flow"`.
    ///
    /// The result is deduplicated and sorted in the fixed family order.
    pub fn parse_selection(raw: &str) -> Result<Vec<MeasurementFamily>, DashboardError> {
        let mut families = raw
            .split(',')
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .map(MeasurementFamily::from_str)
            .collect::<Result<Vec<_>, _>>()?;
        families.sort();
        families.dedup();
        Ok(families)
    }
}

impl FromStr for MeasurementFamily {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MeasurementFamily::ALL
            .into_iter()
            .find(|f| f.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| {
                DashboardError::InvalidSelection(format!("unknown measurement family '{}'", s))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TileData {
    pub id: String,
    pub title: String,
    pub value: f64,
    pub threshold: f64,
    pub precision: u32,
    pub verdict: Verdict,
}

impl TileData {
    /// Tile for one verdict; the displayed value is rounded to the parameter's precision.
    pub fn from_verdict(verdict: &ParameterVerdict) -> Self {
        Self {
            id: verdict.parameter.clone(),
            title: verdict.label.clone(),
            value: round_to(verdict.value, verdict.precision),
            threshold: verdict.threshold,
            precision: verdict.precision,
            verdict: verdict.verdict,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeriesData {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub points: Vec<TimeSeriesPoint>,
}

impl SeriesData {
    pub fn new(id: String, name: String, color: Option<String>, points: Vec<TimeSeriesPoint>) -> Self {
        Self {
            id,
            name,
            color,
            points,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartData {
    pub id: String,
    pub family: MeasurementFamily,
    pub title: String,
    pub unit: Option<String>,
    pub kind: ChartKind,
    pub x_max: i64,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    pub series: Vec<SeriesData>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ChartKind {
    Line,
    MultiLine,
}

impl ChartKind {
    pub fn for_series_count(count: usize) -> Self {
        if count > 1 {
            ChartKind::MultiLine
        } else {
            ChartKind::Line
        }
    }
}
