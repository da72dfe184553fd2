//! Boundary to the external media extraction service.

pub mod models;
pub mod ytdlp;

use futures::future::BoxFuture;
use futures::stream::BoxStream;
use thiserror::Error;

use crate::domain::AppError;

pub use models::{ExtractorConfig, FormatDescriptor, HookStatus, ProgressHook};
pub use ytdlp::YtDlp;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractError {
    #[error("Failed to start {program}: {reason}")]
    Spawn { program: String, reason: String },

    /// The service's own error text, passed through untouched.
    #[error("{0}")]
    Service(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),

    #[error("I/O error: {0}")]
    Io(String),
}

pub type Result<T> = std::result::Result<T, ExtractError>;

impl From<ExtractError> for AppError {
    fn from(err: ExtractError) -> Self {
        AppError::Extractor(err.to_string())
    }
}

/// Something that can list the formats behind a URL and download one of them.
pub trait MediaExtractor: Send + Sync {
    /// Metadata only, nothing is downloaded.
    fn extract_formats(&self, url: &str) -> BoxFuture<'static, Result<Vec<FormatDescriptor>>>;

    /// Downloads a single format. The stream yields progress hooks and ends
    /// after the download succeeds, or after yielding exactly one error.
    fn download(&self, url: &str, format_id: &str) -> BoxStream<'static, Result<ProgressHook>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_error_keeps_service_text() {
        let err = ExtractError::Service("ERROR: Video unavailable".to_string());
        assert_eq!(
            AppError::from(err),
            AppError::Extractor("ERROR: Video unavailable".to_string())
        );
    }
}
