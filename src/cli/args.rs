// CLI argument definitions using Clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Report formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Html,
    Json,
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "html" => Ok(Self::Html),
            "json" => Ok(Self::Json),
            other => Err(format!("unsupported report format: {}", other)),
        }
    }
}

/// HTML reports for unit test runs
#[derive(Parser, Debug)]
#[command(name = "testview")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Render unit test event logs as HTML reports", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Enable verbose debug output
    #[arg(short = 'v', long, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Show current configuration and exit
    #[arg(long, default_value_t = false)]
    pub config: bool,

    /// Create default configuration file
    #[arg(long, value_name = "CONFIG_FILE")]
    pub init_config: Option<PathBuf>,

    /// Install shell completion (bash, zsh, fish, elvish, powershell)
    #[arg(long, value_name = "SHELL_TYPE", value_parser = ["bash", "zsh", "fish", "elvish", "powershell"])]
    pub completion: Option<String>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Render a report from one or more event logs
    Render(RenderArgs),

    /// Print a highlighted excerpt of a source file
    Highlight(HighlightArgs),

    /// Write the bundled templates into a directory
    InitTemplates(InitTemplatesArgs),
}

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Event log files or directories (`-` reads stdin)
    #[arg(default_value = "-")]
    pub events: Vec<PathBuf>,

    /// Template directory (default: templates built into the binary)
    #[arg(short = 't', long)]
    pub templates: Option<PathBuf>,

    /// Report title (default: name of the first suite)
    #[arg(long)]
    pub title: Option<String>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,

    /// Report format (html, json)
    #[arg(short = 'f', long)]
    pub format: Option<String>,

    /// Lines of source shown around a failing line
    #[arg(long)]
    pub context_lines: Option<usize>,

    /// Omit test body listings
    #[arg(long, default_value_t = false)]
    pub no_listing: bool,
}

#[derive(Args, Debug, Clone)]
pub struct HighlightArgs {
    /// Source file
    #[arg(required = true)]
    pub file: PathBuf,

    /// Line to center on and mark
    #[arg(short = 'l', long, conflicts_with = "first")]
    pub line: Option<usize>,

    /// Lines shown around --line
    #[arg(short = 'c', long, default_value_t = crate::report::html::DEFAULT_CONTEXT_LINES)]
    pub context: usize,

    /// First line of the range (1-based)
    #[arg(long)]
    pub first: Option<usize>,

    /// Number of lines in the range (default: to end of file)
    #[arg(short = 'n', long)]
    pub lines: Option<usize>,

    /// Output file (default: stdout)
    #[arg(short = 'o', long)]
    pub output: Option<PathBuf>,
}

#[derive(Args, Debug, Clone)]
pub struct InitTemplatesArgs {
    /// Target directory
    #[arg(default_value = "templates/default")]
    pub dir: PathBuf,

    /// Overwrite existing template files
    #[arg(long, default_value_t = false)]
    pub force: bool,
}

impl RenderArgs {
    /// Parsed report format, if given on the command line
    pub fn report_format(&self) -> Result<Option<ReportFormat>, String> {
        self.format.as_deref().map(str::parse).transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_defaults_to_stdin() {
        let cli = Cli::parse_from(["testview", "render"]);
        match cli.command {
            Some(Commands::Render(args)) => {
                assert_eq!(args.events, vec![PathBuf::from("-")]);
                assert!(args.templates.is_none());
                assert!(!args.no_listing);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_render_options() {
        let cli = Cli::parse_from([
            "testview", "-v", "render", "a.jsonl", "logs", "-o", "out.html", "--format", "JSON",
            "--context-lines", "4", "--no-listing",
        ]);
        assert!(cli.verbose);
        let Some(Commands::Render(args)) = cli.command else {
            panic!("expected render");
        };
        assert_eq!(args.events.len(), 2);
        assert_eq!(args.output, Some(PathBuf::from("out.html")));
        assert_eq!(args.report_format(), Ok(Some(ReportFormat::Json)));
        assert_eq!(args.context_lines, Some(4));
        assert!(args.no_listing);
    }

    #[test]
    fn test_highlight_line_conflicts_with_first() {
        let result = Cli::try_parse_from(["testview", "highlight", "a.rs", "--line", "3", "--first", "1"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_unknown_format_is_rejected() {
        assert!("xml".parse::<ReportFormat>().is_err());
    }
}
