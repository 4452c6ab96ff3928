// Domain layer - Measurement tables, cycles, verdicts and dashboard models
pub mod cycle;
pub mod dashboard;
pub mod error;
pub mod measurement;
pub mod series;
pub mod telemetry;
