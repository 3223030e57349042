// Highlight command - print a highlighted source excerpt

use anyhow::{Context, Result};

use crate::cli::args::HighlightArgs;
use crate::highlight::SourceHighlighter;
use crate::utils::FileUtils;

pub fn handle_highlight(args: &HighlightArgs) -> Result<()> {
    let mut highlighter = SourceHighlighter::new();

    let html = match args.line {
        Some(line) => highlighter.highlight_around(&args.file, line, args.context),
        None => highlighter.highlight_range(&args.file, args.first.unwrap_or(1), args.lines, None),
    }
    .with_context(|| format!("Failed to highlight {}", args.file.display()))?;

    FileUtils::write_output(args.output.as_deref(), &html)
}
