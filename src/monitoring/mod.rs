//! Monitoring and observability
//!
//! Alerting with suppression and notification dispatch, plus health checks.

pub mod alerts;
pub mod health;
pub mod types;

pub use alerts::{AlertManager, SuppressionRule};
pub use health::{HealthChecker, HealthReport, HealthState};
pub use types::{Alert, AlertSeverity, NotificationAttempt};
