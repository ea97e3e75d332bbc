//! Batch progress logging for multi-file runs.

use std::time::Instant;
use tracing::info;

/// Counts processed items and logs periodic progress with a completion
/// estimate. All output goes through `tracing`.
#[derive(Debug)]
pub struct ProgressReporter {
    pub total: usize,
    pub current: usize,
    description: String,
    log_interval: usize,
    start: Instant,
}

impl ProgressReporter {
    pub fn new(total: usize, description: impl Into<String>) -> Self {
        Self {
            total,
            current: 0,
            description: description.into(),
            log_interval: 10,
            start: Instant::now(),
        }
    }

    pub fn with_log_interval(mut self, log_interval: usize) -> Self {
        self.log_interval = log_interval.max(1);
        self
    }

    pub fn update(&mut self, item_name: Option<&str>) {
        self.current += 1;
        if self.current % self.log_interval == 0 || self.current == self.total {
            let remaining = self
                .estimate_remaining()
                .map(|r| format!(", ~{r} remaining"))
                .unwrap_or_default();
            match item_name {
                Some(name) => info!(
                    "{}: {}/{} ({name}){remaining}",
                    self.description, self.current, self.total
                ),
                None => info!(
                    "{}: {}/{}{remaining}",
                    self.description, self.current, self.total
                ),
            }
        }
    }

    pub fn complete(&self) {
        info!(
            "{} complete: {}/{} in {}",
            self.description,
            self.current,
            self.total,
            format_duration(self.start.elapsed().as_secs_f64())
        );
    }

    pub fn log_summary(&self, successes: usize, failures: usize) {
        if failures == 0 {
            info!("{successes} items processed successfully");
        } else {
            info!(
                "{successes}/{} items processed, {failures} failures",
                successes + failures
            );
        }
    }

    /// Rough time-remaining estimate from the average pace so far. `None`
    /// before the first update or after the last.
    pub fn estimate_remaining(&self) -> Option<String> {
        if self.current == 0 || self.current >= self.total {
            return None;
        }
        let elapsed = self.start.elapsed().as_secs_f64();
        let per_item = elapsed / self.current as f64;
        let remaining = per_item * (self.total - self.current) as f64;
        Some(format_duration(remaining))
    }
}

/// Banner separating pipeline phases in the log.
pub fn log_stage(name: &str) {
    info!("{}", "=".repeat(60));
    info!("{name}");
    info!("{}", "=".repeat(60));
}

fn format_duration(seconds: f64) -> String {
    if seconds < 60.0 {
        format!("{seconds:.1}s")
    } else {
        format!("{:.1}m", seconds / 60.0)
    }
}
