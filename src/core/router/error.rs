//! Backend error types
//!
//! A `BackendError` is always recovered inside the orchestrator by moving to
//! the next backend in the chain; callers only see them in attempt records.

use std::time::Duration;

/// Error returned by a single generation backend
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BackendError {
    /// The backend did not answer within its timeout or the request deadline
    #[error("{backend} timed out after {}ms", .elapsed.as_millis())]
    Timeout { backend: String, elapsed: Duration },

    /// The backend could not be reached or returned a server error
    #[error("{backend} unavailable: {message}")]
    Unavailable { backend: String, message: String },

    /// The backend throttled the request
    #[error("{backend} rate limited the request")]
    RateLimited {
        backend: String,
        retry_after: Option<Duration>,
    },

    /// The backend answered with something that is not a recipe
    #[error("{backend} returned an invalid response: {message}")]
    InvalidResponse { backend: String, message: String },

    /// The chain names a backend that was never registered
    #[error("Unknown backend: {0}")]
    UnknownBackend(String),
}

impl BackendError {
    pub fn timeout(backend: impl Into<String>, elapsed: Duration) -> Self {
        Self::Timeout {
            backend: backend.into(),
            elapsed,
        }
    }

    pub fn unavailable(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Unavailable {
            backend: backend.into(),
            message: message.into(),
        }
    }

    pub fn rate_limited(backend: impl Into<String>, retry_after: Option<Duration>) -> Self {
        Self::RateLimited {
            backend: backend.into(),
            retry_after,
        }
    }

    pub fn invalid_response(backend: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Name of the backend that failed
    pub fn backend(&self) -> &str {
        match self {
            Self::Timeout { backend, .. }
            | Self::Unavailable { backend, .. }
            | Self::RateLimited { backend, .. }
            | Self::InvalidResponse { backend, .. } => backend,
            Self::UnknownBackend(backend) => backend,
        }
    }

    /// Short machine-readable kind
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Timeout { .. } => "timeout",
            Self::Unavailable { .. } => "unavailable",
            Self::RateLimited { .. } => "rate_limited",
            Self::InvalidResponse { .. } => "invalid_response",
            Self::UnknownBackend(_) => "unknown_backend",
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// One step of the fallback chain
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub backend: String,
    /// Index in the chain; 0 is the primary
    pub position: usize,
    pub latency: Duration,
    /// `None` when the attempt produced the result
    pub error: Option<BackendError>,
}

impl AttemptRecord {
    pub fn succeeded(backend: impl Into<String>, position: usize, latency: Duration) -> Self {
        Self {
            backend: backend.into(),
            position,
            latency,
            error: None,
        }
    }

    pub fn failed(position: usize, latency: Duration, error: BackendError) -> Self {
        Self {
            backend: error.backend().to_string(),
            position,
            latency,
            error: Some(error),
        }
    }

    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}
