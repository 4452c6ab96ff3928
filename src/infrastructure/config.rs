use crate::domain::series::TestSeries;
use crate::domain::telemetry::MeasurementFamily;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

#[derive(Debug, Deserialize, Clone)]
pub struct AppConfig {
    pub server: ServerSettings,
    pub source: SourceSettings,
    pub rig: RigConfig,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    pub bind: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    Http,
    Local,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SourceSettings {
    pub kind: SourceKind,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub directory: Option<PathBuf>,
}

/// Everything that describes one test rig: schema variants, series, thresholds, charts.
#[derive(Debug, Deserialize, Clone)]
pub struct RigConfig {
    pub file_template: String,
    #[serde(default = "default_max_points")]
    pub max_points_per_series: usize,
    pub layout: CycleLayout,
    pub series: Vec<SeriesConfig>,
    pub schemas: HashMap<String, NormalizationRules>,
    pub thresholds: Vec<ThresholdConfig>,
    #[serde(default)]
    pub charts: Vec<ChartConfig>,
}

fn default_max_points() -> usize {
    2000
}

/// Canonical column names the evaluator keys on.
#[derive(Debug, Deserialize, Clone)]
pub struct CycleLayout {
    pub cycle_column: String,
    pub timestamp_column: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SeriesConfig {
    pub id: u32,
    pub schema: String,
    /// Fixed file name; falls back to the rig's `file_template`.
    pub file: Option<String>,
}

/// One schema variant: how a raw file of this shape becomes canonical.
#[derive(Debug, Deserialize, Clone, Default)]
pub struct NormalizationRules {
    #[serde(default)]
    pub drop: Vec<String>,
    #[serde(default)]
    pub rename: Vec<RenameRule>,
    #[serde(default)]
    pub types: Vec<TypeRule>,
    #[serde(default)]
    pub units: Vec<UnitRule>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RenameRule {
    pub from: String,
    pub to: String,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum NarrowType {
    Int16,
    Int8,
}

#[derive(Debug, Deserialize, Clone)]
pub struct TypeRule {
    pub column: String,
    pub dtype: NarrowType,
}

#[derive(Debug, Deserialize, Clone)]
pub struct UnitRule {
    pub column: String,
    pub conversion: UnitConversion,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum UnitConversion {
    /// Integer nanoseconds to integer milliseconds, half to even
    NanosToMillis,
    /// Multiply by `factor`, optionally rounding to `decimals`
    Scale {
        factor: f64,
        #[serde(default)]
        decimals: Option<u32>,
    },
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ThresholdConfig {
    pub column: String,
    pub label: String,
    pub limit: f64,
    #[serde(default = "default_precision")]
    pub precision: u32,
}

fn default_precision() -> u32 {
    2
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartConfig {
    pub family: MeasurementFamily,
    pub title: String,
    pub unit: Option<String>,
    pub y_min: Option<f64>,
    pub y_max: Option<f64>,
    #[serde(default)]
    pub series: Vec<ChartSeriesConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ChartSeriesConfig {
    pub column: String,
    pub name: String,
    pub color: Option<String>,
}

impl RigConfig {
    /// Resolve the configured series into catalog entries, in configuration order.
    pub fn catalog(&self) -> Vec<TestSeries> {
        self.series
            .iter()
            .map(|s| {
                let file = s.file.clone().unwrap_or_else(|| {
                    let mut vars = HashMap::new();
                    vars.insert("series".to_string(), s.id.to_string());
                    expand_template(&self.file_template, &vars)
                });
                TestSeries::new(s.id, file, s.schema.clone())
            })
            .collect()
    }

    pub fn rules_for(&self, schema: &str) -> Option<&NormalizationRules> {
        self.schemas.get(schema)
    }

    pub fn chart_for(&self, family: MeasurementFamily) -> Option<&ChartConfig> {
        self.charts.iter().find(|c| c.family == family)
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        for series in &self.series {
            if !self.schemas.contains_key(&series.schema) {
                anyhow::bail!(
                    "series {} references unknown schema variant '{}'",
                    series.id,
                    series.schema
                );
            }
        }
        for (i, series) in self.series.iter().enumerate() {
            if self.series[..i].iter().any(|s| s.id == series.id) {
                anyhow::bail!("series {} is configured twice", series.id);
            }
        }
        if self.thresholds.is_empty() {
            anyhow::bail!("no error thresholds configured");
        }
        Ok(())
    }
}

impl AppConfig {
    pub fn validate(&self) -> anyhow::Result<()> {
        self.rig.validate()?;
        match self.source.kind {
            SourceKind::Http => {
                if self.source.base_url.is_none() {
                    anyhow::bail!("source.base_url is required for the http source");
                }
                if self.source.api_key.as_deref().map_or(true, str::is_empty) {
                    anyhow::bail!(
                        "source.api_key is required for the http source (set DASHBOARD__SOURCE__API_KEY)"
                    );
                }
            }
            SourceKind::Local => {
                if self.source.directory.is_none() {
                    anyhow::bail!("source.directory is required for the local source");
                }
            }
        }
        Ok(())
    }
}

pub fn load_app_config() -> anyhow::Result<AppConfig> {
    load_app_config_from("config/dashboard")
}

pub fn load_app_config_from(path: &str) -> anyhow::Result<AppConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name(path))
        .add_source(
            config::Environment::with_prefix("DASHBOARD")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .with_context(|| format!("Failed to read configuration from {}", path))?;

    let app_config: AppConfig = settings
        .try_deserialize()
        .context("Invalid dashboard configuration")?;
    app_config.validate()?;
    Ok(app_config)
}

/// Replace `${name}` placeholders in a template string
pub fn expand_template(template: &str, vars: &HashMap<String, String>) -> String {
    let mut result = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("${{{}}}", key);
        result = result.replace(&placeholder, value);
    }
    result
}

#[cfg(test)]
pub(crate) fn shipped_config() -> AppConfig {
    toml::from_str(include_str!("../../config/dashboard.toml")).expect("shipped config parses")
}
