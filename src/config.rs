// Configuration file handling

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub report: ReportConfig,

    #[serde(default)]
    pub source: SourceConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Template directory (default: templates built into the binary)
    #[serde(default = "default_templates", skip_serializing_if = "Option::is_none")]
    pub templates: Option<PathBuf>,

    /// Report title (default: name of the first suite)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    /// Report format (html, json)
    #[serde(default = "default_format")]
    pub format: String,

    /// Output file for the report
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<PathBuf>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            templates: default_templates(),
            title: None,
            format: default_format(),
            output: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Lines of source shown around a failing line
    #[serde(default = "default_context_lines")]
    pub context_lines: usize,

    /// Include the source listing of each test that reports its location
    #[serde(default = "default_listings")]
    pub listings: bool,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            context_lines: default_context_lines(),
            listings: default_listings(),
        }
    }
}

// Default values
pub const ENV_TESTVIEW_TEMPLATES: &str = "TESTVIEW_TEMPLATES";

pub const CONFIG_FILENAMES: [&str; 2] = [".testviewrc", ".testviewrc.toml"];

pub fn default_templates() -> Option<PathBuf> {
    std::env::var_os(ENV_TESTVIEW_TEMPLATES).map(PathBuf::from)
}

pub fn default_format() -> String {
    String::from("html")
}

fn default_context_lines() -> usize {
    crate::report::html::DEFAULT_CONTEXT_LINES
}

fn default_listings() -> bool {
    true
}

impl Config {
    /// Load configuration from default locations
    pub fn load() -> Option<Self> {
        // Check locations in order:
        // 1. .testviewrc (current directory)
        // 2. ~/.testviewrc (home directory)
        // 3. .testviewrc.toml (current directory)
        // 4. ~/.testviewrc.toml (home directory)

        let cwd = std::env::current_dir().ok()?;
        let home = dirs::home_dir();

        let paths = CONFIG_FILENAMES.iter().flat_map(|name| {
            std::iter::once(cwd.join(name)).chain(home.as_ref().map(|h| h.join(name)))
        });

        for path in paths {
            if path.exists() {
                return Self::load_from_file(&path);
            }
        }

        None
    }

    /// Load configuration from a specific file
    pub fn load_from_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML string
    pub fn parse(content: &str) -> Option<Self> {
        toml::from_str(content).ok()
    }

    /// Generate default configuration as TOML
    pub fn to_toml(&self) -> String {
        toml::to_string_pretty(self).unwrap_or_else(|_| String::new())
    }
}
