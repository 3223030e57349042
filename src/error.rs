// Error taxonomy for result collection and rendering

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while collecting results or rendering a report
#[derive(Debug, Error)]
pub enum ReportError {
    /// Invalid template directory or template fragment
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The engine called back out of the expected order
    #[error("protocol violation: {0}")]
    ProtocolViolation(#[from] ProtocolViolation),

    /// The engine reported a framework-level warning instead of an outcome
    #[error("unexpected warning: {0}")]
    UnexpectedWarning(String),

    /// A source file needed for highlighting could not be read
    #[error("failed to read source file {}: {source}", path.display())]
    SourceRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize report: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Callback ordering violations
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProtocolViolation {
    #[error("test callback received with no current suite")]
    NoCurrentSuite,

    #[error("test callback received with no current test")]
    NoCurrentTest,

    #[error("output capture is already open for test '{0}'")]
    CaptureAlreadyOpen(String),

    #[error("output capture was never opened for test '{0}'")]
    CaptureNotOpen(String),

    #[error("event stream ended before test '{0}' ended")]
    TestNotEnded(String),

    #[error("event stream ended before suite '{0}' ended")]
    SuiteNotEnded(String),
}

impl ReportError {
    /// Whether the error aborts the run rather than the tool invocation.
    ///
    /// Configuration errors leave nothing to render with; everything else
    /// is rendered through the aborted page.
    pub fn is_run_fatal(&self) -> bool {
        !matches!(self, ReportError::Configuration(_))
    }
}
