//! Wall-clock timing for steps and runs.

use chrono::{DateTime, Utc};
use std::time::Instant;

/// Measures a span of work with both a monotonic clock and a UTC start time.
#[derive(Debug, Clone, Copy)]
pub struct SpanTimer {
    start: Instant,
    started_at: DateTime<Utc>,
}

impl SpanTimer {
    /// Starts a new timer.
    #[must_use]
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            started_at: Utc::now(),
        }
    }

    /// Returns the UTC time the timer started.
    #[must_use]
    pub const fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns the elapsed time in milliseconds.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.start.elapsed().as_secs_f64() * 1000.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_span_timer() {
        let timer = SpanTimer::start();
        std::thread::sleep(std::time::Duration::from_millis(10));
        assert!(timer.elapsed_ms() >= 10.0);
        assert!(timer.started_at() <= Utc::now());
    }
}
