// Domain error types shared by the pipeline and the HTTP surface
use thiserror::Error;

/// Failure of a single operator request. None of these are retried.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    /// Fetching the raw file failed (transport, auth, missing file)
    #[error("measurement source unavailable for '{source_name}': {message}")]
    SourceUnavailable { source_name: String, message: String },

    /// Raw table does not match the configured schema, or a cast failed
    #[error("schema error: {0}")]
    Schema(String),

    /// Requested series or cycle does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// A threshold references a column the canonical table does not have
    #[error("missing parameter '{0}' in canonical table")]
    MissingParameter(String),

    /// Operator selection could not be understood
    #[error("invalid selection: {0}")]
    InvalidSelection(String),
}

impl DashboardError {
    pub fn schema(message: impl Into<String>) -> Self {
        DashboardError::Schema(message.into())
    }

    pub fn source_unavailable(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        DashboardError::SourceUnavailable {
            source_name: source_name.into(),
            message: message.into(),
        }
    }
}

pub type DashboardResult<T> = std::result::Result<T, DashboardError>;
