//! Pipeline counters

use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free request counters
#[derive(Debug, Default)]
pub struct PipelineStats {
    requests: AtomicU64,
    rate_limited: AtomicU64,
    budget_blocked: AtomicU64,
    cache_hits: AtomicU64,
    completed: AtomicU64,
    fallbacks: AtomicU64,
    local_syntheses: AtomicU64,
    retries: AtomicU64,
    failures: AtomicU64,
    cancelled: AtomicU64,
    total_latency_ms: AtomicU64,
}

/// Point-in-time copy of [`PipelineStats`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct PipelineStatsSnapshot {
    pub requests: u64,
    pub rate_limited: u64,
    pub budget_blocked: u64,
    pub cache_hits: u64,
    pub completed: u64,
    pub fallbacks: u64,
    pub local_syntheses: u64,
    pub retries: u64,
    pub failures: u64,
    pub cancelled: u64,
    pub total_latency_ms: u64,
}

impl PipelineStatsSnapshot {
    /// Generation failures over requests that reached generation
    pub fn error_rate(&self) -> f64 {
        let generated = self.completed + self.failures;
        if generated == 0 {
            0.0
        } else {
            self.failures as f64 / generated as f64
        }
    }

    /// Mean latency of completed, uncached requests
    pub fn avg_latency_ms(&self) -> f64 {
        let generated = self.completed.saturating_sub(self.cache_hits);
        if generated == 0 {
            0.0
        } else {
            self.total_latency_ms as f64 / generated as f64
        }
    }
}

impl PipelineStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub(super) fn request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn rate_limited(&self) {
        self.rate_limited.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn budget_blocked(&self) {
        self.budget_blocked.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
        self.completed.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn fallback(&self) {
        self.fallbacks.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn local_synthesis(&self) {
        self.local_syntheses.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn retry(&self) {
        self.retries.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn cancelled(&self) {
        self.cancelled.fetch_add(1, Ordering::Relaxed);
    }

    pub(super) fn completed(&self, latency_ms: u64) {
        self.completed.fetch_add(1, Ordering::Relaxed);
        self.total_latency_ms.fetch_add(latency_ms, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> PipelineStatsSnapshot {
        PipelineStatsSnapshot {
            requests: self.requests.load(Ordering::Relaxed),
            rate_limited: self.rate_limited.load(Ordering::Relaxed),
            budget_blocked: self.budget_blocked.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            completed: self.completed.load(Ordering::Relaxed),
            fallbacks: self.fallbacks.load(Ordering::Relaxed),
            local_syntheses: self.local_syntheses.load(Ordering::Relaxed),
            retries: self.retries.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            cancelled: self.cancelled.load(Ordering::Relaxed),
            total_latency_ms: self.total_latency_ms.load(Ordering::Relaxed),
        }
    }
}
