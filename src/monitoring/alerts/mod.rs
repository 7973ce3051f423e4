//! Alert and suppression engine
//!
//! Alerts are raised synchronously into a single-lock store and handed to a
//! bounded notification queue drained by one background worker.

mod channels;
mod dispatch;
mod manager;
mod producers;
mod summary;
mod types;

pub use channels::{
    LogChannel, NotificationChannel, SIGNATURE_HEADER, SlackChannel, WebhookChannel, build_channels,
    sign_payload,
};
pub use dispatch::NotificationQueue;
pub use manager::AlertManager;
pub use producers::SystemSnapshot;
pub use types::{AlertStats, AlertSummary, SuppressionRule, TrendPoint, alert_types};
