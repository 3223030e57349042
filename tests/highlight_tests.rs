// Source highlighter tests - public API only

use std::io::Write;

use tempfile::NamedTempFile;
use testview::error::ReportError;
use testview::highlight::SourceHighlighter;
use testview::state::SourceLocation;

fn source_file(lines: usize) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    for n in 1..=lines {
        writeln!(file, "let x{} = {};", n, n).unwrap();
    }
    file
}

#[test]
fn test_file_is_read_once() {
    // Arrange
    let file = source_file(30);
    let mut highlighter = SourceHighlighter::new();

    // Act
    highlighter.highlight_around(file.path(), 15, 10).unwrap();
    highlighter.highlight_range(file.path(), 1, Some(3), None).unwrap();

    // Assert
    assert_eq!(highlighter.file_reads(), 1);
    assert!(highlighter.is_cached(file.path()));
}

#[test]
fn test_range_rows_and_numbers() {
    // Arrange
    let file = source_file(10);
    let mut highlighter = SourceHighlighter::new();

    // Act
    let html = highlighter.highlight_range(file.path(), 4, Some(2), None).unwrap();

    // Assert
    assert_eq!(html.matches("<tr ").count(), 2);
    assert!(html.contains("<td class=\"linenum\">4</td>"));
    assert!(html.contains("<td class=\"linenum\">5</td>"));
    assert!(!html.contains("hilite"));
    assert!(html.contains("<span class=\"keyword\">let</span>"));
}

#[test]
fn test_range_past_end_is_truncated() {
    // Arrange
    let file = source_file(3);
    let mut highlighter = SourceHighlighter::new();

    // Act
    let html = highlighter.highlight_range(file.path(), 2, Some(10), None).unwrap();

    // Assert
    assert_eq!(html.matches("<tr ").count(), 2);
}

#[test]
fn test_listing_names_file() {
    // Arrange
    let file = source_file(8);
    let mut highlighter = SourceHighlighter::new();
    let location = SourceLocation {
        file: file.path().to_path_buf(),
        start_line: 2,
        end_line: 4,
    };

    // Act
    let html = highlighter.listing(&location).unwrap();

    // Assert
    assert!(html.starts_with("<h1>"));
    assert_eq!(html.matches("<tr ").count(), 3);
}

#[test]
fn test_missing_file_is_source_read_error() {
    // Arrange
    let dir = tempfile::TempDir::new().unwrap();
    let mut highlighter = SourceHighlighter::new();

    // Act
    let err = highlighter
        .highlight_range(&dir.path().join("missing.rs"), 1, None, None)
        .unwrap_err();

    // Assert
    assert!(matches!(err, ReportError::SourceRead { .. }));
    assert_eq!(highlighter.file_reads(), 0);
}
