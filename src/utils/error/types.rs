//! Error types for the governance pipeline

use crate::core::budget::BudgetPeriod;
use crate::core::rate_limiter::LimitTier;
use crate::core::router::{AttemptRecord, BackendError};
use std::time::Duration;
use thiserror::Error;

/// Result type alias for the governance pipeline
pub type Result<T> = std::result::Result<T, GovernanceError>;

/// Main error type for the governance pipeline
#[derive(Error, Debug)]
pub enum GovernanceError {
    /// A rate-limit tier denied the request
    #[error("Rate limit exceeded ({tier}): {reason}")]
    RateLimited {
        tier: LimitTier,
        reason: String,
        retry_after: Duration,
    },

    /// A spend ceiling denied the request
    #[error("Budget exceeded ({period}): spent {spent:.4} of {limit:.4}")]
    BudgetExceeded {
        period: BudgetPeriod,
        spent: f64,
        limit: f64,
    },

    /// A single backend failed
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    /// Every backend in the chain failed, including local synthesis
    #[error("All generation backends failed after {} attempts", .attempts.len())]
    AllBackendsFailed { attempts: Vec<AttemptRecord> },

    /// The caller cancelled the request before generation completed
    #[error("Request cancelled")]
    Cancelled,

    /// Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Alert engine errors
    #[error("Alert error: {0}")]
    Alert(String),

    /// Not found errors
    #[error("Not found: {0}")]
    NotFound(String),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP client errors
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// Internal errors
    #[error("Internal error: {0}")]
    Internal(String),
}
