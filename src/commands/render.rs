// Render command - replay event logs and render the report

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::cli::args::{RenderArgs, ReportFormat};
use crate::config::Config;
use crate::error::ReportError;
use crate::events;
use crate::listener::ResultCollector;
use crate::report::{HtmlReporter, JsonReporter, Reporter};
use crate::state::ResultStore;
use crate::utils::FileUtils;

/// Title used when neither the user nor the results provide one
pub const DEFAULT_TITLE: &str = "Test Results";

/// An event log read into memory
#[derive(Debug, Clone)]
pub struct EventLog {
    pub path: PathBuf,
    pub content: String,
}

/// Settings for one render, after merging CLI arguments over configuration
#[derive(Debug, Clone)]
pub struct RenderSettings {
    /// Template directory; `None` uses the bundled templates
    pub templates: Option<PathBuf>,
    pub title: Option<String>,
    pub output: Option<PathBuf>,
    pub format: ReportFormat,
    pub context_lines: usize,
    pub listings: bool,
}

impl RenderSettings {
    pub fn resolve(args: &RenderArgs, config: &Config) -> Result<Self> {
        let format = match args.report_format().map_err(anyhow::Error::msg)? {
            Some(format) => format,
            None => config
                .report
                .format
                .parse::<ReportFormat>()
                .map_err(anyhow::Error::msg)
                .context("Invalid format in configuration file")?,
        };

        Ok(Self {
            templates: args
                .templates
                .clone()
                .or_else(|| config.report.templates.clone()),
            title: args.title.clone().or_else(|| config.report.title.clone()),
            output: args.output.clone().or_else(|| config.report.output.clone()),
            format,
            context_lines: args.context_lines.unwrap_or(config.source.context_lines),
            listings: !args.no_listing && config.source.listings,
        })
    }

    /// Build the reporter; fails if the templates cannot be loaded
    pub fn reporter(&self) -> Result<Box<dyn Reporter>, ReportError> {
        Ok(match self.format {
            ReportFormat::Html => {
                let reporter = match &self.templates {
                    Some(dir) => HtmlReporter::new(dir)?,
                    None => HtmlReporter::bundled()?,
                };
                Box::new(
                    reporter
                        .with_context_lines(self.context_lines)
                        .with_listings(self.listings),
                )
            }
            ReportFormat::Json => Box::new(JsonReporter::new()),
        })
    }
}

pub fn handle_render(args: &RenderArgs, config: &Config) -> Result<()> {
    let settings = RenderSettings::resolve(args, config)?;
    let mut reporter = settings
        .reporter()
        .context("Failed to set up the report renderer")?;

    let logs = load_event_logs(&args.events)?;
    info!("Replaying {} event log(s)", logs.len());

    let report = render_run(
        reporter.as_mut(),
        collect_results(&logs),
        settings.title.as_deref(),
    )?;

    FileUtils::write_output(settings.output.as_deref(), &report)?;
    if let Some(output) = &settings.output {
        info!("Report written to {}", output.display());
    }

    Ok(())
}

/// Read every event log named by `paths`, expanding directories
pub fn load_event_logs(paths: &[PathBuf]) -> Result<Vec<EventLog>> {
    let mut logs = Vec::new();
    for path in paths {
        let files = if path == Path::new("-") {
            vec![path.clone()]
        } else {
            if !path.exists() {
                anyhow::bail!("Path not found: {}", path.display());
            }
            FileUtils::collect_event_logs(path)
        };

        if files.is_empty() {
            warn!("No event logs found in {}", path.display());
        }

        for file in files {
            let content = FileUtils::read_event_log(&file)?;
            logs.push(EventLog {
                path: file,
                content,
            });
        }
    }

    if logs.is_empty() {
        anyhow::bail!("No event logs to render");
    }

    Ok(logs)
}

/// Replay all logs, in order, into a single result store
pub fn collect_results(logs: &[EventLog]) -> Result<ResultStore> {
    let mut collector = ResultCollector::new();
    for log in logs {
        debug!("Replaying {}", log.path.display());
        let parsed = events::parse_events(&log.content)
            .with_context(|| format!("Invalid event log {}", log.path.display()))?;
        events::replay(parsed, &mut collector)?;
    }

    let store = collector.into_store()?;
    info!(
        "Collected {} test(s) in {} suite(s) ({:.3}s)",
        store.metrics.tests_finished,
        store.suite_count(),
        store.metrics.wall_time().unwrap_or_default()
    );
    Ok(store)
}

/// Render a collected run, or the aborted document if the run broke.
///
/// Configuration errors are returned; every other failure, whether raised
/// while collecting or while rendering, becomes the aborted document.
pub fn render_run(
    reporter: &mut dyn Reporter,
    run: Result<ResultStore>,
    title: Option<&str>,
) -> Result<String> {
    let store = match run {
        Ok(store) => store,
        Err(err) => {
            if err
                .downcast_ref::<ReportError>()
                .is_some_and(|e| !e.is_run_fatal())
            {
                return Err(err);
            }
            warn!("Run aborted: {:#}", err);
            return Ok(reporter.render_aborted(&*err)?);
        }
    };

    let title = report_title(title, &store);
    match reporter.render_result(&store, &title) {
        Ok(report) => Ok(report),
        Err(err) if err.is_run_fatal() => {
            warn!("Report aborted: {}", err);
            Ok(reporter.render_aborted(&err)?)
        }
        Err(err) => Err(err.into()),
    }
}

/// Explicit title, else the first named suite, else the default
pub fn report_title(title: Option<&str>, store: &ResultStore) -> String {
    title
        .map(str::to_string)
        .or_else(|| {
            store
                .suites()
                .find(|suite| !suite.name.is_empty())
                .map(|suite| suite.name.clone())
        })
        .unwrap_or_else(|| DEFAULT_TITLE.to_string())
}
