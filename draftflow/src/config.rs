//! Runner and logging configuration.

use serde::{Deserialize, Serialize};

/// Configuration for the executor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunnerConfig {
    /// Upper bound on steps in flight at once. `None` launches every ready
    /// step; zero is treated as one.
    #[serde(default)]
    pub max_concurrent_steps: Option<usize>,
    /// Whether lifecycle events are sent to the event sink.
    #[serde(default = "default_emit_events")]
    pub emit_events: bool,
}

const fn default_emit_events() -> bool {
    true
}

impl Default for RunnerConfig {
    fn default() -> Self {
        Self {
            max_concurrent_steps: None,
            emit_events: default_emit_events(),
        }
    }
}

impl RunnerConfig {
    /// Creates a configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits the number of steps in flight. Zero is treated as one.
    #[must_use]
    pub fn with_max_concurrent_steps(mut self, limit: usize) -> Self {
        self.max_concurrent_steps = Some(limit.max(1));
        self
    }

    /// Returns the effective number of steps allowed in flight.
    #[must_use]
    pub fn concurrency_limit(&self) -> usize {
        self.max_concurrent_steps.map_or(usize::MAX, |n| n.max(1))
    }

    /// Enables or disables event emission.
    #[must_use]
    pub const fn with_events(mut self, enabled: bool) -> Self {
        self.emit_events = enabled;
        self
    }
}

/// Configuration for the tracing subscriber.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogConfig {
    /// Filter directive used when `RUST_LOG` is unset.
    #[serde(default = "default_filter")]
    pub filter: String,
    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

fn default_filter() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: default_filter(),
            json: false,
        }
    }
}

impl LogConfig {
    /// Sets the fallback filter directive.
    #[must_use]
    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }

    /// Switches to JSON output.
    #[must_use]
    pub const fn json(mut self) -> Self {
        self.json = true;
        self
    }
}
