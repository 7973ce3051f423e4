//! Per-backend attempt statistics

use serde::Serialize;
use std::time::Duration;

/// Running counters for one backend
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BackendStats {
    pub attempts: u64,
    pub successes: u64,
    pub failures: u64,
    pub timeouts: u64,
    pub total_latency_ms: u64,
    pub last_error: Option<String>,
}

impl BackendStats {
    pub(super) fn record_success(&mut self, latency: Duration) {
        self.attempts += 1;
        self.successes += 1;
        self.total_latency_ms += latency.as_millis() as u64;
    }

    pub(super) fn record_failure(&mut self, latency: Duration, timed_out: bool, error: String) {
        self.attempts += 1;
        self.failures += 1;
        if timed_out {
            self.timeouts += 1;
        }
        self.total_latency_ms += latency.as_millis() as u64;
        self.last_error = Some(error);
    }

    pub fn avg_latency_ms(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.total_latency_ms as f64 / self.attempts as f64
        }
    }

    pub fn failure_rate(&self) -> f64 {
        if self.attempts == 0 {
            0.0
        } else {
            self.failures as f64 / self.attempts as f64
        }
    }
}
