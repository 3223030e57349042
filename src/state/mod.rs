// State module - Result store
// Suites and tests live in arenas addressed by SuiteId/TestId; the current
// suite/test cursors hold handles, never references.

pub mod metrics;
pub mod result;

pub use metrics::RunMetrics;
pub use result::{
    Failure, OutcomeDetail, OutcomeKind, SourceLocation, Suite, SuiteId, SuiteStats, SuiteStatus,
    Test, TestId, TestStatus,
};

use crate::error::{ProtocolViolation, ReportError};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, warn};

/// Suite names keep only the part before the first `::`
pub fn normalize_suite_name(name: &str) -> &str {
    name.split_once("::").map_or(name, |(head, _)| head)
}

/// Test names keep only the part before the first space
pub fn normalize_test_name(name: &str) -> &str {
    name.split_once(' ').map_or(name, |(head, _)| head)
}

/// What the engine reports when a test ends
#[derive(Debug, Clone, Default)]
pub struct TestEnd {
    /// Duration in seconds
    pub time: f64,
    pub assertions: u64,
    /// Cumulative deprecation notices seen by the engine so far
    pub deprecations: BTreeSet<String>,
    /// Framework-level warning reported in place of an outcome
    pub warning: Option<String>,
}

#[derive(Debug)]
struct Capture {
    test: TestId,
    buffer: String,
}

/// Results of one run, built incrementally from lifecycle callbacks
#[derive(Debug, Default)]
pub struct ResultStore {
    suites: Vec<Suite>,
    suite_index: HashMap<String, SuiteId>,
    tests: Vec<Test>,
    suite_cursor: Vec<SuiteId>,
    current_test: Option<TestId>,
    capture: Option<Capture>,
    deprecated: BTreeSet<String>,
    pub metrics: RunMetrics,
}

impl ResultStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Get or create the suite named `name` and make it the current suite.
    ///
    /// Every call pushes onto the cursor; `finalize_suite` or `release_suite`
    /// pops it again, so nested engine suites that normalize to the same name
    /// keep the outer suite current.
    pub fn suite(&mut self, name: &str) -> SuiteId {
        let id = self.ensure_suite(name);
        self.suite_cursor.push(id);
        id
    }

    /// Get or create a suite without touching the cursor
    pub fn ensure_suite(&mut self, name: &str) -> SuiteId {
        let name = normalize_suite_name(name);
        if let Some(&id) = self.suite_index.get(name) {
            return id;
        }

        let id = SuiteId(self.suites.len());
        self.suites.push(Suite::new(name.to_string()));
        self.suite_index.insert(name.to_string(), id);
        debug!("Registered suite '{}'", name);
        id
    }

    /// Clear the current-suite cursor (innermost level)
    pub fn release_suite(&mut self) {
        self.suite_cursor.pop();
    }

    pub fn current_suite(&self) -> Option<SuiteId> {
        self.suite_cursor.last().copied()
    }

    /// Get or create the test named `name` in the current suite and make it
    /// the current test.
    pub fn test(&mut self, name: &str) -> Result<TestId, ReportError> {
        let suite_id = self
            .current_suite()
            .ok_or(ProtocolViolation::NoCurrentSuite)?;
        let name = normalize_test_name(name);

        let suite = &mut self.suites[suite_id.0];
        let id = match suite.index.get(name) {
            Some(&id) => id,
            None => {
                let id = TestId(self.tests.len());
                self.tests.push(Test::new(name.to_string()));
                suite.tests.push(id);
                suite.index.insert(name.to_string(), id);
                debug!("Registered test '{}' in suite '{}'", name, suite.name);
                id
            }
        };

        self.current_test = Some(id);
        Ok(id)
    }

    /// Clear the current-test cursor
    pub fn release_test(&mut self) {
        self.current_test = None;
    }

    pub fn current_test(&self) -> Option<TestId> {
        self.current_test
    }

    /// Attach the source location of a test body
    pub fn set_location(&mut self, test: TestId, location: SourceLocation) {
        self.tests[test.0].location = Some(location);
    }

    /// Record an error, failure, incomplete or skip outcome.
    ///
    /// The detail is overwritten by later outcomes; a failed status is never
    /// loosened.
    pub fn record_outcome(&mut self, test: TestId, kind: OutcomeKind, error: Failure, time: f64) {
        let record = &mut self.tests[test.0];
        if record.status != Some(TestStatus::Failed) {
            record.status = Some(kind.status());
        }
        if kind.is_problem() {
            record.errors += 1;
        }
        debug!(
            "Test '{}' reported {:?}: {}",
            record.name, kind, error.message
        );
        record.result = Some(OutcomeDetail { error, time });
    }

    /// Open output capture for `test`
    pub fn begin_test(&mut self, test: TestId) -> Result<(), ReportError> {
        if let Some(open) = &self.capture {
            let open_name = self.tests[open.test.0].name.clone();
            return Err(ProtocolViolation::CaptureAlreadyOpen(open_name).into());
        }

        self.capture = Some(Capture {
            test,
            buffer: String::new(),
        });
        self.metrics.tests_started += 1;
        Ok(())
    }

    /// Append text to the open capture. Returns false if nothing is capturing.
    pub fn append_output(&mut self, text: &str) -> bool {
        match &mut self.capture {
            Some(capture) => {
                capture.buffer.push_str(text);
                true
            }
            None => {
                debug!("Dropping {} bytes of output outside a test", text.len());
                false
            }
        }
    }

    /// Discard the open capture and current test after a framework warning.
    /// The test record is left as it was.
    pub fn abort_test(&mut self, warning: String) -> ReportError {
        self.capture = None;
        self.current_test = None;
        warn!("Test aborted by framework warning: {}", warning);
        ReportError::UnexpectedWarning(warning)
    }

    /// Close output capture and finalize the test record.
    pub fn end_test(&mut self, test: TestId, end: TestEnd) -> Result<(), ReportError> {
        if let Some(warning) = end.warning {
            return Err(self.abort_test(warning));
        }

        let capture = match self.capture.take() {
            Some(capture) if capture.test == test => capture,
            other => {
                self.capture = other;
                let name = self.tests[test.0].name.clone();
                return Err(ProtocolViolation::CaptureNotOpen(name).into());
            }
        };

        let record = &mut self.tests[test.0];
        if record.status.is_none() {
            record.status = Some(TestStatus::Passed);
        }
        record.deprecated = end
            .deprecations
            .difference(&self.deprecated)
            .cloned()
            .collect();
        record.assertions = end.assertions;
        record.output = (!capture.buffer.is_empty()).then_some(capture.buffer);
        record.time = end.time;
        debug!(
            "Test '{}' ended {} in {:.6}s",
            record.name,
            record.status.map_or("unknown", |s| s.as_str()),
            record.time
        );

        self.deprecated = end.deprecations;
        self.current_test = None;
        self.metrics.tests_finished += 1;
        Ok(())
    }

    /// Compute stats, status and counters of a suite from its tests, then
    /// pop it off the cursor.
    ///
    /// The rollup is a full recomputation, so a suite ended more than once
    /// reflects the final state of its tests.
    pub fn finalize_suite(&mut self, id: SuiteId) {
        let suite = &self.suites[id.0];
        let mut stats = SuiteStats {
            total: suite.tests.len(),
            ..SuiteStats::default()
        };
        let mut assertions = 0;
        let mut errors = 0;
        let mut deprecated = 0;
        let mut time = 0.0;

        for test in suite.tests.iter().map(|t| &self.tests[t.0]) {
            match test.status {
                Some(status) => stats.count(status),
                None => {
                    warn!(
                        "Test '{}' in suite '{}' never ended; counting it as incomplete",
                        test.name, suite.name
                    );
                    stats.count(TestStatus::Incomplete);
                }
            }
            assertions += test.assertions;
            errors += test.errors;
            deprecated += test.deprecated.len();
            time += test.time;
        }

        let suite = &mut self.suites[id.0];
        suite.status = Some(SuiteStatus::derive(&stats));
        suite.stats = Some(stats);
        suite.assertions = assertions;
        suite.errors = errors;
        suite.deprecated = deprecated;
        suite.time = time;
        debug!(
            "Suite '{}' finalized: {} ({}/{} passed)",
            suite.name,
            suite.status.map_or("unknown", |s| s.as_str()),
            stats.passed,
            stats.total
        );

        if let Some(pos) = self.suite_cursor.iter().rposition(|&s| s == id) {
            self.suite_cursor.remove(pos);
        }
    }

    /// Mark the run as finished.
    ///
    /// Fails if a test is still capturing or a suite was never ended, since
    /// its stats would be missing from the totals.
    pub fn finish(&mut self) -> Result<(), ReportError> {
        self.metrics.finish();

        if let Some(capture) = &self.capture {
            let name = self.tests[capture.test.0].name.clone();
            return Err(ProtocolViolation::TestNotEnded(name).into());
        }
        let open = self
            .suite_cursor
            .last()
            .map(|id| &self.suites[id.0])
            .or_else(|| self.suites.iter().find(|s| s.stats.is_none()));
        if let Some(suite) = open {
            return Err(ProtocolViolation::SuiteNotEnded(suite.name.clone()).into());
        }

        Ok(())
    }

    pub fn find_suite(&self, name: &str) -> Option<SuiteId> {
        self.suite_index.get(normalize_suite_name(name)).copied()
    }

    pub fn find_test(&self, suite: SuiteId, name: &str) -> Option<TestId> {
        self.suites[suite.0]
            .index
            .get(normalize_test_name(name))
            .copied()
    }

    pub fn suite_record(&self, id: SuiteId) -> &Suite {
        &self.suites[id.0]
    }

    pub fn test_record(&self, id: TestId) -> &Test {
        &self.tests[id.0]
    }

    /// Suites in registration order
    pub fn suites(&self) -> impl Iterator<Item = &Suite> {
        self.suites.iter()
    }

    /// Tests of a suite in execution order
    pub fn tests_of<'a>(&'a self, suite: &'a Suite) -> impl Iterator<Item = &'a Test> + 'a {
        suite.tests.iter().map(move |id| &self.tests[id.0])
    }

    pub fn suite_count(&self) -> usize {
        self.suites.len()
    }

    /// Cumulative deprecation notices seen so far
    pub fn deprecations_seen(&self) -> &BTreeSet<String> {
        &self.deprecated
    }

    /// Totals over every finalized suite
    pub fn totals(&self) -> SuiteStats {
        let mut totals = SuiteStats::default();
        for stats in self.suites.iter().filter_map(|s| s.stats) {
            totals.total += stats.total;
            totals.passed += stats.passed;
            totals.failed += stats.failed;
            totals.skipped += stats.skipped;
            totals.incomplete += stats.incomplete;
        }
        totals
    }
}
