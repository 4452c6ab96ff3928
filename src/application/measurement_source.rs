// Source trait for raw measurement files
use crate::domain::error::DashboardResult;
use async_trait::async_trait;

#[async_trait]
pub trait MeasurementSource: Send + Sync {
    /// Fetch the raw export text for `file_name`.
    ///
    /// Transport, authentication and missing-file failures are all reported as
    /// `DashboardError::SourceUnavailable`.
    async fn fetch(&self, file_name: &str) -> DashboardResult<String>;

    /// Short description for logs, e.g. the base URL or directory
    fn describe(&self) -> String;
}
