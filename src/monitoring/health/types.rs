//! Health checking types and data structures

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

/// Status of a component or of the whole system
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthState {
    Healthy,
    Warning,
}

impl std::fmt::Display for HealthState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            HealthState::Healthy => write!(f, "healthy"),
            HealthState::Warning => write!(f, "warning"),
        }
    }
}

/// Individual component health
#[derive(Debug, Clone, Serialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthState,
    pub message: String,
    pub metrics: BTreeMap<String, f64>,
}

impl ComponentHealth {
    pub(super) fn new(name: &str) -> Self {
        Self {
            name: name.to_string(),
            status: HealthState::Healthy,
            message: String::new(),
            metrics: BTreeMap::new(),
        }
    }

    pub(super) fn metric(mut self, key: &str, value: f64) -> Self {
        self.metrics.insert(key.to_string(), value);
        self
    }

    /// Mark as warning with `message`, or healthy with `ok` when no warning applies
    pub(super) fn verdict(mut self, warning: Option<String>, ok: &str) -> Self {
        match warning {
            Some(message) => {
                self.status = HealthState::Warning;
                self.message = message;
            }
            None => self.message = ok.to_string(),
        }
        self
    }

    pub fn is_healthy(&self) -> bool {
        self.status == HealthState::Healthy
    }
}

/// Health check summary
#[derive(Debug, Clone, Serialize)]
pub struct HealthSummary {
    pub total_components: usize,
    pub healthy_components: usize,
    pub warning_components: usize,
}

/// Overall system health
#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    /// `warning` if any component warns
    pub status: HealthState,
    pub checked_at: DateTime<Utc>,
    pub uptime_seconds: u64,
    pub components: Vec<ComponentHealth>,
    pub summary: HealthSummary,
}

impl HealthReport {
    pub fn component(&self, name: &str) -> Option<&ComponentHealth> {
        self.components.iter().find(|c| c.name == name)
    }
}
