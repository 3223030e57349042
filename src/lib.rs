pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod events;
pub mod highlight;
pub mod listener;
pub mod logging;
pub mod report;
pub mod state;
pub mod utils;

pub use error::{ProtocolViolation, ReportError};
pub use events::{TestEvent, parse_events, replay};
pub use highlight::SourceHighlighter;
pub use listener::{ResultCollector, TestListener};
pub use report::{HtmlReporter, JsonReporter, Reporter};
pub use state::ResultStore;
