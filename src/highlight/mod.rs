// Source highlighter - line-numbered, cached source fragments for the report

pub mod syntax;

use crate::error::ReportError;
use crate::state::SourceLocation;
use crate::utils::escape_html;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Highlights slices of source files, caching each file's highlighted
/// lines after the first read.
#[derive(Debug, Default)]
pub struct SourceHighlighter {
    cache: HashMap<PathBuf, Vec<String>>,
    reads: usize,
}

impl SourceHighlighter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Highlighted lines of `path`, reading and highlighting it on first use.
    ///
    /// A failed read leaves the cache untouched.
    fn lines(&mut self, path: &Path) -> Result<&[String], ReportError> {
        if !self.cache.contains_key(path) {
            let text = std::fs::read_to_string(path).map_err(|source| ReportError::SourceRead {
                path: path.to_path_buf(),
                source,
            })?;
            self.reads += 1;
            let lines = syntax::highlight_lines(&text);
            debug!("Highlighted {} ({} lines)", path.display(), lines.len());
            self.cache.insert(path.to_path_buf(), lines);
        }

        Ok(&self.cache[path])
    }

    /// Render lines `[first_line, first_line + num_lines)` of `path` as a
    /// code table. Line numbers are 1-based; a first line of 0 starts at 1.
    /// `None` for `num_lines` runs to the end of the file.
    pub fn highlight_range(
        &mut self,
        path: &Path,
        first_line: usize,
        num_lines: Option<usize>,
        mark_line: Option<usize>,
    ) -> Result<String, ReportError> {
        let first_line = first_line.max(1);
        let lines = self.lines(path)?;
        let start = (first_line - 1).min(lines.len());
        let end = num_lines.map_or(lines.len(), |n| start.saturating_add(n).min(lines.len()));

        let mut html =
            String::from("<table class=\"code\" cellpadding=\"0\" cellspacing=\"0\" border=\"0\">");
        for (row, line) in lines[start..end].iter().enumerate() {
            let lineno = first_line + row;
            html.push_str(&format!(
                "<tr class=\"line{}{}\"><td class=\"linenum\">{}</td><td class=\"linetxt\"><span>{}</span></td></tr>",
                if mark_line == Some(lineno) { " hilite" } else { "" },
                if row % 2 == 1 { " odd" } else { " even" },
                lineno,
                line
            ));
        }
        html.push_str("</table>");

        Ok(html)
    }

    /// Render `num_lines` lines centred on `mid_line`, marking it
    pub fn highlight_around(
        &mut self,
        path: &Path,
        mid_line: usize,
        num_lines: usize,
    ) -> Result<String, ReportError> {
        let first_line = mid_line.saturating_sub(num_lines.div_ceil(2));
        self.highlight_range(path, first_line, Some(num_lines), Some(mid_line))
    }

    /// Render the body of a test under a heading naming its file
    pub fn listing(&mut self, location: &SourceLocation) -> Result<String, ReportError> {
        let table = self.highlight_range(
            &location.file,
            location.start_line,
            Some(location.line_count()),
            None,
        )?;
        Ok(format!(
            "<h1>{}</h1>{}",
            escape_html(&location.file.display().to_string()),
            table
        ))
    }

    /// Number of files actually read from disk
    pub fn file_reads(&self) -> usize {
        self.reads
    }

    pub fn is_cached(&self, path: &Path) -> bool {
        self.cache.contains_key(path)
    }
}
