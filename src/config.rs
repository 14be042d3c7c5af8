//! Configuration for the dashboard loop

use std::time::Duration;

use crate::error::{DashboardError, Result};

/// Poll cadence of the status endpoint
pub const POLL_INTERVAL_MS: u64 = 2_000;

/// Rendered log lines kept per tick. The cap keeps the tail of `logs`, so
/// it assumes the backend sends them oldest first.
pub const DEFAULT_MAX_LOG_LINES: usize = 200;

/// Dashboard configuration
#[derive(Debug, Clone, PartialEq)]
pub struct DashboardConfig {
    /// Origin the API paths are resolved against (e.g. `http://127.0.0.1:5000`)
    pub api_base: String,

    /// Timer period between ticks
    pub poll_interval: Duration,

    /// Upper bound on lines in the log panel
    pub max_log_lines: usize,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            api_base: "http://127.0.0.1:5000".to_string(),
            poll_interval: Duration::from_millis(POLL_INTERVAL_MS),
            max_log_lines: DEFAULT_MAX_LOG_LINES,
        }
    }
}

impl DashboardConfig {
    /// Configuration for a page served from `origin`
    pub fn for_origin(origin: &str) -> Self {
        Self {
            api_base: origin.trim_end_matches('/').to_string(),
            ..Self::default()
        }
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.api_base.is_empty() {
            return Err(DashboardError::Config("api_base must not be empty".into()));
        }
        if self.max_log_lines == 0 {
            return Err(DashboardError::Config("max_log_lines must be positive".into()));
        }
        if self.poll_interval.is_zero() {
            return Err(DashboardError::Config("poll_interval must be positive".into()));
        }
        Ok(())
    }
}
