//! Alert summaries and trends

use super::manager::AlertManager;
use super::types::{AlertSummary, TrendPoint};
use chrono::{DateTime, Duration, Utc};
use std::collections::BTreeMap;

/// Days covered by the trend, today included
pub const TREND_DAYS: i64 = 7;

impl AlertManager {
    /// Counts by type and severity plus a seven-day trend
    pub fn summary(&self) -> AlertSummary {
        self.summary_at(Utc::now())
    }

    /// Summary as of `now`; trend days are UTC calendar days
    pub fn summary_at(&self, now: DateTime<Utc>) -> AlertSummary {
        let storage = self.storage.read();

        let mut by_type: BTreeMap<String, u64> = BTreeMap::new();
        let mut by_severity: BTreeMap<String, u64> = BTreeMap::new();
        for alert in &storage.history {
            *by_type.entry(alert.alert_type.clone()).or_insert(0) += 1;
            *by_severity
                .entry(alert.severity.as_str().to_string())
                .or_insert(0) += 1;
        }

        let today = now.date_naive();
        let mut trend: Vec<TrendPoint> = (0..TREND_DAYS)
            .rev()
            .map(|back| TrendPoint {
                date: today - Duration::days(back),
                total: 0,
                by_severity: BTreeMap::new(),
            })
            .collect();
        let first_day = today - Duration::days(TREND_DAYS - 1);
        for alert in &storage.history {
            let day = alert.triggered_at.date_naive();
            if day < first_day || day > today {
                continue;
            }
            let index = (day - first_day).num_days() as usize;
            if let Some(point) = trend.get_mut(index) {
                point.total += 1;
                *point
                    .by_severity
                    .entry(alert.severity.as_str().to_string())
                    .or_insert(0) += 1;
            }
        }

        AlertSummary {
            total: storage.history.len() as u64,
            active: storage.active.len() as u64,
            by_type,
            by_severity,
            trend,
        }
    }
}
