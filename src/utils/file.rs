// Event log and output file utilities

use anyhow::{Context, Result};
use std::io::Read;
use std::path::{Path, PathBuf};

/// Extension of event log files collected from directories
pub const EVENT_LOG_EXTENSION: &str = "jsonl";

/// File utilities for event logs and report output
pub struct FileUtils;

impl FileUtils {
    /// Collect event log files from a path.
    ///
    /// A file is returned as-is whatever its extension; a directory yields
    /// every `.jsonl` file below it (hidden entries skipped), sorted by path.
    pub fn collect_event_logs(path: &Path) -> Vec<PathBuf> {
        let mut files = Vec::new();

        if path.is_file() {
            files.push(path.to_path_buf());
        } else if path.is_dir() {
            let walker = walkdir::WalkDir::new(path).into_iter().filter_entry(|e| {
                // Always include the root directory itself, even if it starts with '.'
                if e.depth() == 0 {
                    return true;
                }
                !e.file_name().to_string_lossy().starts_with('.')
            });

            for entry in walker.flatten() {
                if entry.file_type().is_file() && Self::is_event_log(entry.path()) {
                    files.push(entry.path().to_path_buf());
                }
            }
            files.sort();
        }

        files
    }

    /// Check if file has the event log extension
    pub fn is_event_log(path: &Path) -> bool {
        path.extension().is_some_and(|e| e == EVENT_LOG_EXTENSION)
    }

    /// Read an event log; `-` reads standard input
    pub fn read_event_log(path: &Path) -> Result<String> {
        if path == Path::new("-") {
            let mut content = String::new();
            std::io::stdin()
                .read_to_string(&mut content)
                .context("Failed to read events from stdin")?;
            return Ok(content);
        }

        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read event log: {}", path.display()))
    }

    /// Write report content to a file, or stdout when no path is given
    pub fn write_output(path: Option<&Path>, content: &str) -> Result<()> {
        match path {
            Some(path) => std::fs::write(path, content)
                .with_context(|| format!("Failed to write report: {}", path.display())),
            None => {
                print!("{}", content);
                Ok(())
            }
        }
    }
}
