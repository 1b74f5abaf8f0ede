//! Filter engine deriving a subset of the active view
//!
//! Three independent predicate passes over the active view. The passes
//! commute and preserve input ordering; an empty input yields an empty
//! result.

use chrono::{DateTime, Utc};
use floodwatch_core::{FilterSelection, Report};

/// Hours per "day" unit in the time-range predicate.
///
/// Inherited behavior: one selected "day" spans 720 hours (30 calendar
/// days). Kept verbatim so filter results match the deployed dashboard.
const HOURS_PER_RANGE_UNIT: f64 = 720.0;

/// Apply the selection to the active view, returning the matching subset
#[must_use]
pub fn apply(reports: &[Report], selection: &FilterSelection, now: DateTime<Utc>) -> Vec<Report> {
    reports
        .iter()
        .filter(|report| matches_district(report, selection))
        .filter(|report| matches_criticality(report, selection))
        .filter(|report| matches_time_range(report, selection, now))
        .cloned()
        .collect()
}

fn matches_district(report: &Report, selection: &FilterSelection) -> bool {
    selection
        .district
        .as_ref()
        .is_none_or(|district| report.district == *district)
}

fn matches_criticality(report: &Report, selection: &FilterSelection) -> bool {
    selection
        .criticality
        .is_none_or(|criticality| report.criticality == criticality)
}

#[allow(clippy::cast_precision_loss)]
fn matches_time_range(report: &Report, selection: &FilterSelection, now: DateTime<Utc>) -> bool {
    selection.time_range_days.is_none_or(|days| {
        let elapsed_hours =
            now.signed_duration_since(report.timestamp).num_milliseconds() as f64 / 3_600_000.0;
        elapsed_hours / HOURS_PER_RANGE_UNIT <= f64::from(days)
    })
}
