// End-to-end tests: event logs replayed into a store and rendered

use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{NamedTempFile, TempDir};
use testview::commands::render::{EventLog, collect_results, render_run};
use testview::report::{HtmlReporter, JsonReporter, TemplateSet};
use testview::state::{SuiteStatus, TestStatus};

fn bundled_templates() -> TempDir {
    let dir = TempDir::new().expect("Failed to create temp dir");
    TemplateSet::write_bundled(dir.path()).expect("Failed to write templates");
    dir
}

fn event_log(content: impl Into<String>) -> EventLog {
    EventLog {
        path: PathBuf::from("run.jsonl"),
        content: content.into(),
    }
}

fn calc_source() -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "fn add(a: i32, b: i32) -> i32 {{ a + b }}").unwrap();
    writeln!(file, "// subtraction").unwrap();
    writeln!(file, "assert_eq!(sub(3, 1), 1);").unwrap();
    writeln!(file, "let name = \"calc\";").unwrap();
    file
}

fn calc_log(source: &Path, sub_end: &str) -> String {
    let source = source.display().to_string().replace('\\', "\\\\");
    format!(
        r#"{{"event":"suite_start","name":"Calc"}}
{{"event":"test_start","name":"add"}}
{{"event":"test_end","name":"add","time":0.01,"assertions":2}}
{{"event":"test_start","name":"sub"}}
{{"event":"output","text":"computing 3 - 1"}}
{{"event":"error","name":"sub","error":{{"kind":"E","message":"expected 1, got 2","file":"{source}","line":3}},"time":0.02}}
{sub_end}
{{"event":"suite_end","name":"Calc"}}
"#
    )
}

const SUB_END: &str = r#"{"event":"test_end","name":"sub","time":0.02,"assertions":1}"#;

#[test]
fn test_calc_run_rolls_up_suite() {
    // Arrange
    let source = calc_source();
    let log = event_log(calc_log(source.path(), SUB_END));

    // Act
    let store = collect_results(&[log]).unwrap();

    // Assert
    let calc = store.suite_record(store.find_suite("Calc").unwrap());
    let stats = calc.stats.unwrap();
    assert_eq!(stats.total, 2);
    assert_eq!(stats.passed, 1);
    assert_eq!(stats.failed, 1);
    assert_eq!(stats.skipped, 0);
    assert_eq!(stats.incomplete, 0);
    assert_eq!(calc.status, Some(SuiteStatus::Failed));
    assert_eq!(calc.assertions, 3);
    assert!((calc.time - 0.03).abs() < 1e-9);

    let tests: Vec<_> = store.tests_of(calc).collect();
    assert_eq!(tests[0].status, Some(TestStatus::Passed));
    assert_eq!(tests[1].status, Some(TestStatus::Failed));
    assert_eq!(tests[1].output.as_deref(), Some("computing 3 - 1"));
}

#[test]
fn test_calc_run_renders_html() {
    // Arrange
    let templates = bundled_templates();
    let source = calc_source();
    let mut reporter = HtmlReporter::new(templates.path()).unwrap();
    let run = collect_results(&[event_log(calc_log(source.path(), SUB_END))]);

    // Act
    let html = render_run(&mut reporter, run, None).unwrap();

    // Assert
    assert!(html.starts_with("<!DOCTYPE html>"));
    assert!(html.contains("<title>Calc - Test Results</title>"));
    assert!(html.contains("1 suites: 1 passed, 1 failed, 0 skipped, 0 incomplete (2 total)"));
    assert!(html.contains("suite-0 even last failed\" open>"));
    assert!(html.contains("Total: <b>2</b>"));
    assert!(html.contains("Assertions: <b>3</b>"));
    assert!(html.contains("Executed in 0.030000 seconds."));
    assert!(html.contains("E: expected 1, got 2"));
    assert!(html.contains("<tr class=\"line hilite even\"><td class=\"linenum\">3</td>"));
    assert!(html.contains("<pre class=\"output\">computing 3 - 1</pre>"));
    assert!(html.trim_end().ends_with("</html>"));
    assert_eq!(reporter.highlighter().file_reads(), 1);
}

#[test]
fn test_unexpected_warning_renders_aborted_document() {
    // Arrange
    let templates = bundled_templates();
    let source = calc_source();
    let mut reporter = HtmlReporter::new(templates.path()).unwrap();
    let sub_end =
        r#"{"event":"test_end","name":"sub","time":0.02,"assertions":1,"warning":"Risky test"}"#;
    let run = collect_results(&[event_log(calc_log(source.path(), sub_end))]);

    // Act
    let html = render_run(&mut reporter, run, None).unwrap();

    // Assert
    assert!(html.contains("<title>Aborted - Test Results</title>"));
    assert!(html.contains("Test run aborted"));
    assert!(html.contains("unexpected warning: Risky test"));
    assert!(!html.contains("class=\"box suite"));
    assert!(!html.contains("class=\"test "));
}

#[test]
fn test_unreadable_source_renders_aborted_document() {
    // Arrange
    let templates = bundled_templates();
    let dir = TempDir::new().unwrap();
    let missing = dir.path().join("gone.rs");
    let mut reporter = HtmlReporter::new(templates.path()).unwrap();
    let run = collect_results(&[event_log(calc_log(&missing, SUB_END))]);

    // Act
    let html = render_run(&mut reporter, run, None).unwrap();

    // Assert
    assert!(html.contains("Test run aborted"));
    assert!(html.contains("failed to read source file"));
    assert!(html.contains("gone.rs"));
}

#[test]
fn test_truncated_log_renders_aborted_document() {
    // Arrange
    let templates = bundled_templates();
    let mut reporter = HtmlReporter::new(templates.path()).unwrap();
    let run = collect_results(&[event_log(
        r#"{"event":"suite_start","name":"Calc"}
{"event":"test_start","name":"sub"}
{"event":"failure","name":"sub","error":{"kind":"E","message":"boom"},"time":0.02}"#,
    )]);

    // Act
    let html = render_run(&mut reporter, run, None).unwrap();

    // Assert
    assert!(html.contains("<header class=\"run aborted\">"));
    assert!(html.contains("event stream ended before test &#39;sub&#39; ended"));
    assert!(!html.contains("run passed"));
    assert!(!html.contains("class=\"box suite"));
}

#[test]
fn test_log_without_suite_end_renders_aborted_json() {
    // Arrange
    let mut reporter = JsonReporter::new();
    let run = collect_results(&[event_log(
        r#"{"event":"suite_start","name":"Calc"}
{"event":"test_start","name":"add"}
{"event":"test_end","name":"add","time":0.01,"assertions":2}"#,
    )]);

    // Act
    let json = render_run(&mut reporter, run, None).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    // Assert
    assert_eq!(value["aborted"], true);
    assert!(value["error"].as_str().unwrap().contains("suite 'Calc'"));
}

#[test]
fn test_protocol_violation_renders_aborted_json() {
    // Arrange
    let mut reporter = JsonReporter::new();
    let run = collect_results(&[event_log(
        r#"{"event":"test_start","name":"orphan"}"#,
    )]);

    // Act
    let json = render_run(&mut reporter, run, Some("Run")).unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    // Assert
    assert_eq!(value["aborted"], true);
    assert!(value["error"].as_str().unwrap().contains("no current suite"));
}

#[test]
fn test_test_names_are_escaped() {
    // Arrange
    let templates = bundled_templates();
    let mut reporter = HtmlReporter::new(templates.path()).unwrap();
    let run = collect_results(&[event_log(
        r#"{"event":"suite_start","name":"Markup"}
{"event":"test_start","name":"<script>"}
{"event":"test_end","name":"<script>","time":0.0,"assertions":0}
{"event":"suite_end","name":"Markup"}"#,
    )]);

    // Act
    let html = render_run(&mut reporter, run, None).unwrap();

    // Assert
    assert!(html.contains("&lt;script&gt;"));
    assert!(!html.contains("<script>"));
}

#[test]
fn test_missing_template_directory_is_configuration_error() {
    // Arrange
    let dir = TempDir::new().unwrap();

    // Act
    let result = HtmlReporter::new(&dir.path().join("nope"));

    // Assert
    let err = result.err().expect("expected a configuration error");
    assert!(!err.is_run_fatal());
    assert!(err.to_string().contains("no such template directory"));
}
