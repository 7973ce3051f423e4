//! Generation backend configuration

use super::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Name under which the offline synthesis path is reported
pub const LOCAL_BACKEND: &str = "local";

/// Backend selection and timeout configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendsConfig {
    /// Primary backend name
    #[serde(default = "default_primary")]
    pub primary: String,
    /// Ordered fallback backend names
    #[serde(default)]
    pub fallbacks: Vec<String>,
    /// Default per-attempt timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
    /// Per-backend timeout overrides in seconds
    #[serde(default)]
    pub timeouts: HashMap<String, u64>,
    /// Overall deadline shared by every attempt of one request, in seconds
    #[serde(default = "default_request_deadline")]
    pub request_deadline_secs: u64,
    /// Degrade to local synthesis when every remote backend fails
    #[serde(default = "default_true")]
    pub local_synthesis: bool,
}

impl Default for BackendsConfig {
    fn default() -> Self {
        Self {
            primary: default_primary(),
            fallbacks: Vec::new(),
            timeout_secs: default_timeout(),
            timeouts: HashMap::new(),
            request_deadline_secs: default_request_deadline(),
            local_synthesis: true,
        }
    }
}

impl BackendsConfig {
    /// Timeout applied to a single attempt against `backend`
    pub fn timeout_for(&self, backend: &str) -> Duration {
        let secs = self
            .timeouts
            .get(backend)
            .copied()
            .unwrap_or(self.timeout_secs);
        Duration::from_secs(secs)
    }

    /// Deadline shared by the whole fallback chain
    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.request_deadline_secs)
    }

    /// Primary followed by fallbacks, in attempt order
    pub fn chain(&self) -> Vec<String> {
        std::iter::once(self.primary.clone())
            .chain(self.fallbacks.iter().cloned())
            .collect()
    }
}

fn default_primary() -> String {
    "openai".to_string()
}

fn default_request_deadline() -> u64 {
    90
}
