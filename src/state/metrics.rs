// Run metrics

use chrono::{DateTime, Local};
use serde::Serialize;

/// Wall-clock bounds of a collected run
#[derive(Debug, Clone, Serialize)]
pub struct RunMetrics {
    pub started_at: DateTime<Local>,
    pub finished_at: Option<DateTime<Local>>,
    pub tests_started: usize,
    pub tests_finished: usize,
}

impl Default for RunMetrics {
    fn default() -> Self {
        Self {
            started_at: Local::now(),
            finished_at: None,
            tests_started: 0,
            tests_finished: 0,
        }
    }
}

impl RunMetrics {
    /// Mark the end of the run
    pub fn finish(&mut self) {
        self.finished_at = Some(Local::now());
    }

    /// Wall-clock duration in seconds, if the run finished
    pub fn wall_time(&self) -> Option<f64> {
        self.finished_at
            .map(|end| (end - self.started_at).num_milliseconds() as f64 / 1000.0)
    }
}
