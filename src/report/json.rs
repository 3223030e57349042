// JSON reporter - exports the collected results

use super::{Reporter, error_chain};
use crate::error::ReportError;
use crate::state::{ResultStore, RunMetrics, Suite, SuiteStats, Test};
use serde::Serialize;
use serde_json::json;

/// JSON reporter
#[derive(Debug, Default)]
pub struct JsonReporter;

#[derive(Serialize)]
struct SuiteReport<'a> {
    #[serde(flatten)]
    suite: &'a Suite,
    tests: Vec<&'a Test>,
}

#[derive(Serialize)]
struct RunReport<'a> {
    title: &'a str,
    metrics: &'a RunMetrics,
    totals: SuiteStats,
    suites: Vec<SuiteReport<'a>>,
}

impl JsonReporter {
    pub fn new() -> Self {
        Self
    }
}

fn to_json(value: &impl Serialize) -> Result<String, ReportError> {
    Ok(serde_json::to_string_pretty(value)?)
}

impl Reporter for JsonReporter {
    fn render_result(&mut self, store: &ResultStore, title: &str) -> Result<String, ReportError> {
        let report = RunReport {
            title,
            metrics: &store.metrics,
            totals: store.totals(),
            suites: store
                .suites()
                .map(|suite| SuiteReport {
                    suite,
                    tests: store.tests_of(suite).collect(),
                })
                .collect(),
        };
        to_json(&report)
    }

    fn render_aborted(&mut self, error: &dyn std::error::Error) -> Result<String, ReportError> {
        let (message, causes) = error_chain(error);
        to_json(&json!({
            "aborted": true,
            "error": message,
            "causes": causes,
        }))
    }
}
