//! Bounded notification queue and its worker

use super::manager::AlertManager;
use crate::monitoring::types::{Alert, NotificationAttempt};
use chrono::Utc;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Drop-oldest queue of alerts awaiting notification
#[derive(Debug)]
pub struct NotificationQueue {
    capacity: usize,
    pending: Mutex<VecDeque<Alert>>,
    notify: Notify,
    dropped: AtomicU64,
}

impl NotificationQueue {
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity: capacity.max(1),
            pending: Mutex::new(VecDeque::new()),
            notify: Notify::new(),
            dropped: AtomicU64::new(0),
        }
    }

    /// Enqueue an alert, evicting the oldest when full
    ///
    /// Returns the evicted alert, if any.
    pub fn push(&self, alert: Alert) -> Option<Alert> {
        let evicted = {
            let mut pending = self.pending.lock();
            let evicted = if pending.len() >= self.capacity {
                pending.pop_front()
            } else {
                None
            };
            pending.push_back(alert);
            evicted
        };
        if let Some(old) = &evicted {
            self.dropped.fetch_add(1, Ordering::Relaxed);
            warn!(alert_id = %old.id, "Notification queue full, dropped oldest alert");
        }
        self.notify.notify_one();
        evicted
    }

    /// Take everything currently queued
    pub fn drain(&self) -> Vec<Alert> {
        self.pending.lock().drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn dropped(&self) -> u64 {
        self.dropped.load(Ordering::Relaxed)
    }

    async fn wait(&self) {
        self.notify.notified().await;
    }
}

impl AlertManager {
    /// Spawn the notification worker; it drains the queue once more on shutdown
    pub fn start(&self, cancel: CancellationToken) -> JoinHandle<()> {
        let manager = self.clone();
        info!("Starting alert notification worker");

        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = cancel.cancelled() => break,
                    _ = manager.queue.wait() => {}
                }
                manager.process_pending().await;
            }
            manager.process_pending().await;
            info!("Alert notification worker stopped");
        })
    }

    /// Deliver every queued alert now; returns how many were processed
    ///
    /// Channel failures are recorded on the alert and never returned.
    pub async fn process_pending(&self) -> usize {
        let alerts = self.queue.drain();
        let processed = alerts.len();

        for alert in alerts {
            let mut attempts = Vec::new();
            for channel in self.channels.iter() {
                if !channel.supports_severity(alert.severity) {
                    continue;
                }
                let result = channel.send(&alert).await;
                if let Err(e) = &result {
                    warn!("Failed to send alert {} via {}: {}", alert.id, channel.name(), e);
                } else {
                    debug!("Alert {} sent via {}", alert.id, channel.name());
                }
                attempts.push(NotificationAttempt {
                    channel: channel.name().to_string(),
                    attempted_at: Utc::now(),
                    success: result.is_ok(),
                    error: result.err().map(|e| e.to_string()),
                });
            }
            self.record_notifications(&alert.id, attempts);
        }
        processed
    }
}
