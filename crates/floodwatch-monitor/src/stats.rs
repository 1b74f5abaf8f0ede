//! Statistics aggregator over the all-time report view

use chrono::{DateTime, Utc};
use floodwatch_core::{Criticality, Report};
use serde::Serialize;

/// Summary counters derived from the full report history
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Stats {
    /// Count of all reports ever seen
    pub total: usize,

    /// Count of reports not yet resolved
    pub active: usize,

    /// Count of resolved reports
    pub resolved: usize,

    /// Critical reports within the active subset
    pub critical: usize,

    /// High-criticality reports within the active subset
    pub high: usize,

    /// Rounded percentage of resolved reports, 0 when there are none
    pub completion_rate: u32,

    /// Active critical reports created within the last 24 hours
    pub critical_trend: usize,
}

impl Stats {
    /// Display label for the recent-critical trend: `"+N"` or `"0"`
    #[must_use]
    pub fn trend_label(&self) -> String {
        if self.critical_trend > 0 {
            format!("+{}", self.critical_trend)
        } else {
            "0".to_string()
        }
    }
}

/// Compute summary counters at the given instant
///
/// `active` is a direct filter rather than `total - resolved`, so status
/// values outside the two known states count as active instead of
/// skewing the math.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn compute(reports: &[Report], now: DateTime<Utc>) -> Stats {
    let total = reports.len();
    let resolved = reports.iter().filter(|r| r.status.is_resolved()).count();
    let active_reports: Vec<&Report> = reports.iter().filter(|r| r.is_active()).collect();

    let critical = active_reports
        .iter()
        .filter(|r| r.criticality == Criticality::Critical)
        .count();
    let high = active_reports
        .iter()
        .filter(|r| r.criticality == Criticality::High)
        .count();

    let completion_rate = if total > 0 {
        ((resolved as f64 / total as f64) * 100.0).round() as u32
    } else {
        0
    };

    let critical_trend = active_reports
        .iter()
        .filter(|r| r.criticality == Criticality::Critical && r.is_recent(now))
        .count();

    Stats {
        total,
        active: active_reports.len(),
        resolved,
        critical,
        high,
        completion_rate,
        critical_trend,
    }
}
