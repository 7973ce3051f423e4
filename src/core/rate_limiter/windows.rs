//! Calendar window arithmetic

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Granularity of a self-resetting counting window
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WindowKind {
    Second,
    Minute,
    Hour,
    Day,
    Month,
}

impl WindowKind {
    /// Start of the window containing `now`
    pub fn truncate(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            WindowKind::Second => floor_to(now, 1),
            WindowKind::Minute => floor_to(now, 60),
            WindowKind::Hour => floor_to(now, 3600),
            WindowKind::Day => floor_to(now, 86_400),
            WindowKind::Month => month_start(now.year(), now.month()).unwrap_or(now),
        }
    }

    /// Start of the window following the one that starts at `start`
    pub fn next_boundary(&self, start: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            WindowKind::Second => start + chrono::Duration::seconds(1),
            WindowKind::Minute => start + chrono::Duration::seconds(60),
            WindowKind::Hour => start + chrono::Duration::seconds(3600),
            WindowKind::Day => start + chrono::Duration::seconds(86_400),
            WindowKind::Month => {
                let (year, month) = if start.month() == 12 {
                    (start.year() + 1, 1)
                } else {
                    (start.year(), start.month() + 1)
                };
                month_start(year, month).unwrap_or(start + chrono::Duration::days(31))
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKind::Second => "second",
            WindowKind::Minute => "minute",
            WindowKind::Hour => "hour",
            WindowKind::Day => "day",
            WindowKind::Month => "month",
        }
    }
}

impl std::fmt::Display for WindowKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

fn floor_to(now: DateTime<Utc>, step_secs: i64) -> DateTime<Utc> {
    let secs = now.timestamp();
    DateTime::from_timestamp(secs - secs.rem_euclid(step_secs), 0).unwrap_or(now)
}

fn month_start(year: i32, month: u32) -> Option<DateTime<Utc>> {
    NaiveDate::from_ymd_opt(year, month, 1)
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Request count within one window
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct WindowCounter {
    pub(crate) kind: WindowKind,
    pub(crate) count: u64,
    pub(crate) window_start: DateTime<Utc>,
}

impl WindowCounter {
    pub(crate) fn new(kind: WindowKind, now: DateTime<Utc>) -> Self {
        Self {
            kind,
            count: 0,
            window_start: kind.truncate(now),
        }
    }

    /// Zero the counter the first time `now` falls outside the current window
    ///
    /// A clock stepping backwards across a boundary also starts a fresh window.
    pub(crate) fn roll(&mut self, now: DateTime<Utc>) -> bool {
        let current = self.kind.truncate(now);
        if current != self.window_start {
            self.count = 0;
            self.window_start = current;
            true
        } else {
            false
        }
    }

    pub(crate) fn resets_at(&self) -> DateTime<Utc> {
        self.kind.next_boundary(self.window_start)
    }

    /// Time until the window resets, never less than one second
    pub(crate) fn retry_after(&self, now: DateTime<Utc>) -> Duration {
        until(self.resets_at(), now).max(Duration::from_secs(1))
    }

    /// Whether one more request would exceed `limit` (0 = unlimited)
    pub(crate) fn would_exceed(&self, limit: u64) -> bool {
        limit > 0 && self.count >= limit
    }

    pub(crate) fn utilization(&self, limit: u64) -> f64 {
        if limit == 0 {
            0.0
        } else {
            self.count as f64 / limit as f64
        }
    }
}

/// Non-negative time from `now` until `at`
pub(crate) fn until(at: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (at - now).to_std().unwrap_or(Duration::ZERO)
}
