// Listener - lifecycle callbacks from the test-execution engine

use crate::error::{ProtocolViolation, ReportError};
use crate::state::{Failure, OutcomeKind, ResultStore, SourceLocation, TestEnd};
use tracing::debug;

/// Callback surface invoked by a test-execution engine.
///
/// Callbacks arrive one at a time in program order. Any error is run-fatal:
/// the caller should stop feeding events and render the aborted report.
pub trait TestListener {
    fn on_suite_start(&mut self, name: &str) -> Result<(), ReportError>;

    fn on_suite_end(&mut self, name: &str) -> Result<(), ReportError>;

    fn on_test_start(
        &mut self,
        name: &str,
        location: Option<SourceLocation>,
    ) -> Result<(), ReportError>;

    /// Output written by the running test
    fn on_test_output(&mut self, text: &str) -> Result<(), ReportError>;

    fn on_test_end(&mut self, name: &str, end: TestEnd) -> Result<(), ReportError>;

    /// Unified entry point for error, failure, incomplete and skip outcomes
    fn on_outcome(
        &mut self,
        kind: OutcomeKind,
        name: &str,
        error: Failure,
        time: f64,
    ) -> Result<(), ReportError>;

    fn on_error(&mut self, name: &str, error: Failure, time: f64) -> Result<(), ReportError> {
        self.on_outcome(OutcomeKind::Error, name, error, time)
    }

    fn on_failure(&mut self, name: &str, error: Failure, time: f64) -> Result<(), ReportError> {
        self.on_outcome(OutcomeKind::Failure, name, error, time)
    }

    fn on_incomplete(&mut self, name: &str, error: Failure, time: f64) -> Result<(), ReportError> {
        self.on_outcome(OutcomeKind::Incomplete, name, error, time)
    }

    fn on_skip(&mut self, name: &str, error: Failure, time: f64) -> Result<(), ReportError> {
        self.on_outcome(OutcomeKind::Skip, name, error, time)
    }
}

/// Listener that records every callback into a `ResultStore`
#[derive(Debug, Default)]
pub struct ResultCollector {
    store: ResultStore,
}

impl ResultCollector {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(&self) -> &ResultStore {
        &self.store
    }

    /// Finish the run and hand over the collected results. Fails if the
    /// engine stopped before ending every test and suite.
    pub fn into_store(mut self) -> Result<ResultStore, ReportError> {
        self.store.finish()?;
        Ok(self.store)
    }
}

impl TestListener for ResultCollector {
    fn on_suite_start(&mut self, name: &str) -> Result<(), ReportError> {
        debug!("Suite started: {}", name);
        self.store.suite(name);
        Ok(())
    }

    fn on_suite_end(&mut self, name: &str) -> Result<(), ReportError> {
        debug!("Suite ended: {}", name);
        let id = self.store.ensure_suite(name);
        self.store.finalize_suite(id);
        Ok(())
    }

    fn on_test_start(
        &mut self,
        name: &str,
        location: Option<SourceLocation>,
    ) -> Result<(), ReportError> {
        let id = self.store.test(name)?;
        if let Some(location) = location {
            self.store.set_location(id, location);
        }
        self.store.begin_test(id)
    }

    fn on_test_output(&mut self, text: &str) -> Result<(), ReportError> {
        if self.store.current_test().is_none() {
            return Err(ProtocolViolation::NoCurrentTest.into());
        }
        self.store.append_output(text);
        Ok(())
    }

    fn on_test_end(&mut self, name: &str, mut end: TestEnd) -> Result<(), ReportError> {
        if let Some(warning) = end.warning.take() {
            return Err(self.store.abort_test(warning));
        }
        let id = self.store.test(name)?;
        self.store.end_test(id, end)
    }

    fn on_outcome(
        &mut self,
        kind: OutcomeKind,
        name: &str,
        error: Failure,
        time: f64,
    ) -> Result<(), ReportError> {
        let id = self.store.test(name)?;
        self.store.record_outcome(id, kind, error, time);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{SuiteStatus, TestStatus};

    #[test]
    fn test_outcome_outside_suite_is_rejected() {
        let mut collector = ResultCollector::new();
        let err = collector
            .on_failure("sub", Failure::new("AssertionError", "no"), 0.0)
            .unwrap_err();
        assert!(matches!(
            err,
            ReportError::ProtocolViolation(ProtocolViolation::NoCurrentSuite)
        ));
    }

    #[test]
    fn test_warning_is_reported_before_suite_check() {
        let mut collector = ResultCollector::new();
        let end = TestEnd {
            warning: Some("No tests found".into()),
            ..TestEnd::default()
        };
        let err = collector.on_test_end("ghost", end).unwrap_err();
        assert!(matches!(err, ReportError::UnexpectedWarning(ref w) if w == "No tests found"));
    }

    #[test]
    fn test_warning_for_unstarted_test_creates_no_record() {
        let mut collector = ResultCollector::new();
        collector.on_suite_start("Calc").unwrap();
        let end = TestEnd {
            warning: Some("Risky test".into()),
            ..TestEnd::default()
        };
        assert!(collector.on_test_end("ghost", end).is_err());

        let store = collector.store();
        let suite = store.find_suite("Calc").unwrap();
        assert!(store.find_test(suite, "ghost").is_none());
        assert_eq!(store.suite_record(suite).test_count(), 0);
    }

    #[test]
    fn test_truncated_run_is_rejected() {
        let mut collector = ResultCollector::new();
        collector.on_suite_start("Calc").unwrap();
        collector.on_test_start("sub", None).unwrap();
        collector
            .on_failure("sub", Failure::new("E", "boom"), 0.02)
            .unwrap();

        let err = collector.into_store().unwrap_err();
        assert!(matches!(
            err,
            ReportError::ProtocolViolation(ProtocolViolation::TestNotEnded(_))
        ));
    }

    #[test]
    fn test_output_outside_test_is_rejected() {
        let mut collector = ResultCollector::new();
        collector.on_suite_start("Calc").unwrap();
        let err = collector.on_test_output("stray").unwrap_err();
        assert!(matches!(
            err,
            ReportError::ProtocolViolation(ProtocolViolation::NoCurrentTest)
        ));
    }

    #[test]
    fn test_lifecycle_collects_results() {
        let mut collector = ResultCollector::new();
        collector.on_suite_start("Calc").unwrap();
        collector.on_test_start("add", None).unwrap();
        collector.on_test_output("1 + 1 = 2").unwrap();
        collector
            .on_test_end(
                "add",
                TestEnd {
                    time: 0.01,
                    assertions: 2,
                    ..TestEnd::default()
                },
            )
            .unwrap();
        collector.on_test_start("todo", None).unwrap();
        collector
            .on_incomplete("todo", Failure::new("Incomplete", "not yet"), 0.0)
            .unwrap();
        collector.on_test_end("todo", TestEnd::default()).unwrap();
        collector.on_suite_end("Calc").unwrap();
        assert!(collector.store().current_suite().is_none());

        let store = collector.into_store().unwrap();
        let suite = store.suite_record(store.find_suite("Calc").unwrap());
        let tests: Vec<_> = store.tests_of(suite).collect();
        assert_eq!(tests[0].status, Some(TestStatus::Passed));
        assert_eq!(tests[0].output.as_deref(), Some("1 + 1 = 2"));
        assert_eq!(tests[1].status, Some(TestStatus::Incomplete));
        assert_eq!(suite.status, Some(SuiteStatus::Warning));
        assert!(store.metrics.finished_at.is_some());
    }
}
