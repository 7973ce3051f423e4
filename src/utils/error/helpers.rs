//! Helper functions for creating and inspecting errors

use super::types::GovernanceError;
use crate::core::budget::BudgetPeriod;
use crate::core::rate_limiter::LimitTier;
use std::time::Duration;

impl GovernanceError {
    pub fn rate_limited<S: Into<String>>(
        tier: LimitTier,
        reason: S,
        retry_after: Duration,
    ) -> Self {
        Self::RateLimited {
            tier,
            reason: reason.into(),
            retry_after,
        }
    }

    pub fn budget_exceeded(period: BudgetPeriod, spent: f64, limit: f64) -> Self {
        Self::BudgetExceeded {
            period,
            spent,
            limit,
        }
    }

    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn alert<S: Into<String>>(message: S) -> Self {
        Self::Alert(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }

    /// Whether the error is an expected denial (rate limit or budget)
    pub fn is_denied(&self) -> bool {
        matches!(self, Self::RateLimited { .. } | Self::BudgetExceeded { .. })
    }

    /// Retry-after hint for rate-limit denials
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimited { retry_after, .. } => Some(*retry_after),
            _ => None,
        }
    }

    /// Short machine-readable code for the error kind
    pub fn code(&self) -> &'static str {
        match self {
            Self::RateLimited { .. } => "rate_limited",
            Self::BudgetExceeded { .. } => "budget_exceeded",
            Self::Backend(_) => "backend_failure",
            Self::AllBackendsFailed { .. } => "all_backends_failed",
            Self::Cancelled => "cancelled",
            Self::Config(_) => "configuration",
            Self::Alert(_) => "alert",
            Self::NotFound(_) => "not_found",
            Self::Validation(_) => "validation",
            Self::Serialization(_) => "serialization",
            Self::Yaml(_) => "yaml",
            Self::Io(_) => "io",
            Self::Http(_) => "http",
            Self::Internal(_) => "internal",
        }
    }
}
