// Event log - JSON-lines record of engine lifecycle callbacks

use crate::error::ReportError;
use crate::listener::TestListener;
use crate::state::{Failure, OutcomeKind, SourceLocation, TestEnd};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use thiserror::Error;

/// One lifecycle callback, as written by an engine to an event log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TestEvent {
    SuiteStart {
        name: String,
    },
    SuiteEnd {
        name: String,
    },
    TestStart {
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        location: Option<SourceLocation>,
    },
    Output {
        text: String,
    },
    Error {
        name: String,
        error: Failure,
        #[serde(default)]
        time: f64,
    },
    Failure {
        name: String,
        error: Failure,
        #[serde(default)]
        time: f64,
    },
    Incomplete {
        name: String,
        error: Failure,
        #[serde(default)]
        time: f64,
    },
    Skip {
        name: String,
        error: Failure,
        #[serde(default)]
        time: f64,
    },
    TestEnd {
        name: String,
        #[serde(default)]
        time: f64,
        #[serde(default)]
        assertions: u64,
        /// Cumulative deprecation notices seen by the engine
        #[serde(default)]
        deprecations: BTreeSet<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        warning: Option<String>,
    },
}

/// Event log decoding errors
#[derive(Debug, Error)]
pub enum EventLogError {
    #[error("malformed event on line {line}: {source}")]
    Malformed {
        line: usize,
        #[source]
        source: serde_json::Error,
    },
}

impl TestEvent {
    /// Deliver this event to a listener
    pub fn apply<L: TestListener + ?Sized>(self, listener: &mut L) -> Result<(), ReportError> {
        match self {
            TestEvent::SuiteStart { name } => listener.on_suite_start(&name),
            TestEvent::SuiteEnd { name } => listener.on_suite_end(&name),
            TestEvent::TestStart { name, location } => listener.on_test_start(&name, location),
            TestEvent::Output { text } => listener.on_test_output(&text),
            TestEvent::Error { name, error, time } => {
                listener.on_outcome(OutcomeKind::Error, &name, error, time)
            }
            TestEvent::Failure { name, error, time } => {
                listener.on_outcome(OutcomeKind::Failure, &name, error, time)
            }
            TestEvent::Incomplete { name, error, time } => {
                listener.on_outcome(OutcomeKind::Incomplete, &name, error, time)
            }
            TestEvent::Skip { name, error, time } => {
                listener.on_outcome(OutcomeKind::Skip, &name, error, time)
            }
            TestEvent::TestEnd {
                name,
                time,
                assertions,
                deprecations,
                warning,
            } => listener.on_test_end(
                &name,
                TestEnd {
                    time,
                    assertions,
                    deprecations,
                    warning,
                },
            ),
        }
    }
}

/// Parse an event log. Blank lines are skipped.
pub fn parse_events(content: &str) -> Result<Vec<TestEvent>, EventLogError> {
    content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(i, line)| {
            serde_json::from_str(line).map_err(|source| EventLogError::Malformed {
                line: i + 1,
                source,
            })
        })
        .collect()
}

/// Feed events to a listener in order, stopping at the first error
pub fn replay<L, I>(events: I, listener: &mut L) -> Result<(), ReportError>
where
    L: TestListener + ?Sized,
    I: IntoIterator<Item = TestEvent>,
{
    for event in events {
        event.apply(listener)?;
    }
    Ok(())
}
