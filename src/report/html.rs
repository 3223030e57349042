// HTML reporter - assembles the report from template fragments

use super::template::{Context, TemplateSet};
use super::{ABORTED_TITLE, Reporter, error_chain};
use crate::error::ReportError;
use crate::highlight::SourceHighlighter;
use crate::state::{ResultStore, Suite, SuiteStats, SuiteStatus, Test, TestStatus};
use chrono::{DateTime, Local};
use std::path::Path;
use tracing::debug;

/// Lines of source shown around a failing line
pub const DEFAULT_CONTEXT_LINES: usize = 10;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Renders results through the templates of a template directory
pub struct HtmlReporter {
    templates: TemplateSet,
    highlighter: SourceHighlighter,
    context_lines: usize,
    listings: bool,
}

impl HtmlReporter {
    /// Create a reporter over the templates in `template_dir`.
    ///
    /// Fails with a configuration error if the directory does not exist or
    /// any fragment is missing or malformed.
    pub fn new(template_dir: &Path) -> Result<Self, ReportError> {
        Ok(Self::with_templates(TemplateSet::load(template_dir)?))
    }

    /// Create a reporter over the templates compiled into the binary
    pub fn bundled() -> Result<Self, ReportError> {
        Ok(Self::with_templates(TemplateSet::bundled()?))
    }

    pub fn with_templates(templates: TemplateSet) -> Self {
        Self {
            templates,
            highlighter: SourceHighlighter::new(),
            context_lines: DEFAULT_CONTEXT_LINES,
            listings: true,
        }
    }

    /// Number of source lines shown around a failing line
    pub fn with_context_lines(mut self, lines: usize) -> Self {
        self.context_lines = lines;
        self
    }

    /// Whether to include the test body listing when a test has a location
    pub fn with_listings(mut self, enabled: bool) -> Self {
        self.listings = enabled;
        self
    }

    pub fn highlighter(&self) -> &SourceHighlighter {
        &self.highlighter
    }

    fn header_context(title: &str, generated_at: DateTime<Local>) -> Context {
        let mut ctx = Context::new();
        ctx.text("title", title)
            .text("generated_at", generated_at.format(TIMESTAMP_FORMAT))
            .text("version", env!("CARGO_PKG_VERSION"));
        ctx
    }

    fn stats_context(ctx: &mut Context, prefix: &str, stats: &SuiteStats) {
        for (label, count) in stats.entries() {
            let key = if prefix.is_empty() {
                label.to_string()
            } else {
                format!("{}_{}", prefix, label)
            };
            ctx.count(&key, count);
        }
    }

    fn render_suite(
        &mut self,
        store: &ResultStore,
        suite: &Suite,
        suite_no: usize,
        num_suites: usize,
    ) -> Result<String, ReportError> {
        let num_tests = suite.test_count();
        let mut tests = String::new();
        for (test_no, test) in store.tests_of(suite).enumerate() {
            let ctx = self.test_context(test, test_no, num_tests)?;
            tests.push_str(&self.templates.test.render(&ctx));
        }

        let status = suite.status.map_or("", |s| s.as_str());
        let mut ctx = Context::new();
        ctx.count("suite_no", suite_no)
            .text("suite_parity", if suite_no % 2 == 1 { "odd" } else { "even" })
            .flag("suite_last", suite_no + 1 == num_suites)
            .text("name", &suite.name)
            .text("status", status)
            .flag("open", suite.status != Some(SuiteStatus::Passed))
            .count("assertions", suite.assertions as usize)
            .count("errors", suite.errors)
            .count("deprecated", suite.deprecated)
            .count("problems", suite.problems())
            .text("time", format!("{:.6}", suite.time))
            .count("test_count", num_tests)
            .html("tests", tests);
        Self::stats_context(&mut ctx, "stats", &suite.stats.unwrap_or_default());

        Ok(self.templates.suite.render(&ctx))
    }

    fn test_context(
        &mut self,
        test: &Test,
        test_no: usize,
        num_tests: usize,
    ) -> Result<Context, ReportError> {
        let mut ctx = Context::new();
        ctx.count("test_no", test_no)
            .flag("test_first", test_no == 0)
            .flag("test_last", test_no + 1 == num_tests)
            .text("name", &test.name)
            .text("status", test.status.map_or("", |s| s.as_str()))
            .count("assertions", test.assertions as usize)
            .text("time", format!("{:.6}", test.time))
            .text("output", test.output.as_deref().unwrap_or(""))
            .count("deprecated_count", test.deprecated.len())
            .text(
                "deprecated",
                test.deprecated.iter().cloned().collect::<Vec<_>>().join("\n"),
            );

        if let Some(detail) = &test.result {
            let error = &detail.error;
            ctx.text("error_kind", &error.kind)
                .text("error_message", &error.message)
                .text("error_time", format!("{:.6}", detail.time))
                .text("trace", error.trace.join("\n"));
            if let (Some(file), Some(line)) = (&error.file, error.line) {
                ctx.text("error_file", file.display()).count("error_line", line);
                if test.status == Some(TestStatus::Failed) {
                    let source = self
                        .highlighter
                        .highlight_around(file, line, self.context_lines)?;
                    ctx.html("source", source);
                }
            }
        }

        if self.listings
            && let Some(location) = &test.location
        {
            debug!("Listing source of '{}'", test.name);
            ctx.html("listing", self.highlighter.listing(location)?);
        }

        Ok(ctx)
    }
}

impl Reporter for HtmlReporter {
    fn render_result(&mut self, store: &ResultStore, title: &str) -> Result<String, ReportError> {
        let totals = store.totals();
        let num_suites = store.suite_count();
        let generated_at = store.metrics.finished_at.unwrap_or_else(Local::now);

        let mut header = Self::header_context(title, generated_at);
        header
            .count("suite_count", num_suites)
            .text("run_status", SuiteStatus::derive(&totals).as_str())
            .flag("aborted", false);
        Self::stats_context(&mut header, "", &totals);

        let mut html = self.templates.header.render(&header);
        for (suite_no, suite) in store.suites().enumerate() {
            if suite.name.is_empty() || suite.test_count() == 0 {
                debug!("Skipping empty suite '{}'", suite.name);
                continue;
            }
            html.push_str(&self.render_suite(store, suite, suite_no, num_suites)?);
        }
        html.push_str(
            &self
                .templates
                .footer
                .render(&Self::header_context(title, generated_at)),
        );

        Ok(html)
    }

    fn render_aborted(&mut self, error: &dyn std::error::Error) -> Result<String, ReportError> {
        let now = Local::now();
        let mut header = Self::header_context(ABORTED_TITLE, now);
        header
            .count("suite_count", 0)
            .text("run_status", "aborted")
            .flag("aborted", true);

        let (message, causes) = error_chain(error);
        let mut aborted = Context::new();
        aborted
            .text("message", message)
            .text("causes", causes.join("\n"));

        let mut html = self.templates.header.render(&header);
        html.push_str(&self.templates.aborted.render(&aborted));
        html.push_str(
            &self
                .templates
                .footer
                .render(&Self::header_context(ABORTED_TITLE, now)),
        );

        Ok(html)
    }
}
