// Suite and test records

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::path::PathBuf;

/// Stable handle of a suite record in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct SuiteId(pub(crate) usize);

/// Stable handle of a test record in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct TestId(pub(crate) usize);

/// Final disposition of a test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TestStatus {
    Passed,
    Failed,
    Incomplete,
    Skipped,
}

impl TestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            TestStatus::Passed => "passed",
            TestStatus::Failed => "failed",
            TestStatus::Incomplete => "incomplete",
            TestStatus::Skipped => "skipped",
        }
    }
}

impl fmt::Display for TestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregated disposition of a suite
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SuiteStatus {
    Passed,
    Failed,
    Warning,
}

impl SuiteStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SuiteStatus::Passed => "passed",
            SuiteStatus::Failed => "failed",
            SuiteStatus::Warning => "warning",
        }
    }

    /// Derive a suite status from its statistics.
    ///
    /// `passed` only if every test passed, otherwise `failed` if at least one
    /// failed, otherwise `warning`.
    pub fn derive(stats: &SuiteStats) -> Self {
        if stats.passed == stats.total {
            SuiteStatus::Passed
        } else if stats.failed > 0 {
            SuiteStatus::Failed
        } else {
            SuiteStatus::Warning
        }
    }
}

impl fmt::Display for SuiteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of outcome callback received from the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutcomeKind {
    Error,
    Failure,
    Incomplete,
    Skip,
}

impl OutcomeKind {
    /// Status a test takes when this outcome is recorded
    pub fn status(&self) -> TestStatus {
        match self {
            OutcomeKind::Error | OutcomeKind::Failure => TestStatus::Failed,
            OutcomeKind::Incomplete => TestStatus::Incomplete,
            OutcomeKind::Skip => TestStatus::Skipped,
        }
    }

    /// Error and failure outcomes count towards the problem counters
    pub fn is_problem(&self) -> bool {
        matches!(self, OutcomeKind::Error | OutcomeKind::Failure)
    }
}

/// Error or failure object reported by the engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Failure {
    /// Error class name (e.g. `AssertionError`, `panic`)
    #[serde(default)]
    pub kind: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<usize>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub trace: Vec<String>,
}

impl Failure {
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            file: None,
            line: None,
            trace: Vec::new(),
        }
    }

    /// Attach the failing source position
    pub fn at(mut self, file: impl Into<PathBuf>, line: usize) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }
}

/// Captured failure detail of a test
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OutcomeDetail {
    pub error: Failure,
    /// Elapsed seconds at the time the outcome was reported
    pub time: f64,
}

/// Source position of a test body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLocation {
    pub file: PathBuf,
    pub start_line: usize,
    pub end_line: usize,
}

impl SourceLocation {
    pub fn line_count(&self) -> usize {
        self.end_line.saturating_sub(self.start_line) + 1
    }
}

/// One test-case record
#[derive(Debug, Clone, Serialize)]
pub struct Test {
    pub name: String,
    pub status: Option<TestStatus>,
    pub result: Option<OutcomeDetail>,
    /// Error and failure callbacks received for this test
    pub errors: usize,
    pub output: Option<String>,
    pub assertions: u64,
    /// Deprecation notices first observed during this test
    pub deprecated: BTreeSet<String>,
    /// Duration in seconds
    pub time: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<SourceLocation>,
}

impl Test {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            status: None,
            result: None,
            errors: 0,
            output: None,
            assertions: 0,
            deprecated: BTreeSet::new(),
            time: 0.0,
            location: None,
        }
    }

    pub fn is_failed(&self) -> bool {
        self.status == Some(TestStatus::Failed)
    }
}

/// Per-suite outcome counts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct SuiteStats {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub skipped: usize,
    pub incomplete: usize,
}

impl SuiteStats {
    pub(crate) fn count(&mut self, status: TestStatus) {
        match status {
            TestStatus::Passed => self.passed += 1,
            TestStatus::Failed => self.failed += 1,
            TestStatus::Skipped => self.skipped += 1,
            TestStatus::Incomplete => self.incomplete += 1,
        }
    }

    /// Label/count pairs in display order
    pub fn entries(&self) -> [(&'static str, usize); 5] {
        [
            ("total", self.total),
            ("passed", self.passed),
            ("failed", self.failed),
            ("skipped", self.skipped),
            ("incomplete", self.incomplete),
        ]
    }
}

/// One test-group record
#[derive(Debug, Clone, Serialize)]
pub struct Suite {
    pub name: String,
    #[serde(skip)]
    pub(crate) tests: Vec<TestId>,
    #[serde(skip)]
    pub(crate) index: HashMap<String, TestId>,
    pub status: Option<SuiteStatus>,
    pub stats: Option<SuiteStats>,
    pub assertions: u64,
    pub errors: usize,
    pub deprecated: usize,
    /// Cumulative duration in seconds
    pub time: f64,
}

impl Suite {
    pub(crate) fn new(name: String) -> Self {
        Self {
            name,
            tests: Vec::new(),
            index: HashMap::new(),
            status: None,
            stats: None,
            assertions: 0,
            errors: 0,
            deprecated: 0,
            time: 0.0,
        }
    }

    pub fn test_count(&self) -> usize {
        self.tests.len()
    }

    /// Deprecations plus errors
    pub fn problems(&self) -> usize {
        self.deprecated + self.errors
    }
}
