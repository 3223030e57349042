// Report module - renders a finished result store

pub mod html;
pub mod json;
pub mod template;

use crate::error::ReportError;
use crate::state::ResultStore;
pub use html::HtmlReporter;
pub use json::JsonReporter;
pub use template::{Context, Template, TemplateSet, Value};

/// Title used for the aborted-run document
pub const ABORTED_TITLE: &str = "Aborted";

/// Reporter trait
pub trait Reporter {
    /// Render the report of a completed run
    fn render_result(&mut self, store: &ResultStore, title: &str) -> Result<String, ReportError>;

    /// Render the report of a run that could not complete
    fn render_aborted(&mut self, error: &dyn std::error::Error) -> Result<String, ReportError>;
}

/// Split an error into its message and the messages of its sources
pub fn error_chain(error: &dyn std::error::Error) -> (String, Vec<String>) {
    let mut causes = Vec::new();
    let mut source = error.source();
    while let Some(cause) = source {
        causes.push(cause.to_string());
        source = cause.source();
    }
    (error.to_string(), causes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_error_chain_collects_sources() {
        let err = ReportError::SourceRead {
            path: PathBuf::from("src/lib.rs"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        let (message, causes) = error_chain(&err);
        assert!(message.contains("src/lib.rs"));
        assert_eq!(causes, vec!["denied".to_string()]);
    }
}
