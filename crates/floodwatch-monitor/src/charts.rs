//! Chart projections over the filtered report set
//!
//! Pure reshaping transforms; no state, no I/O. Each function takes the
//! already-filtered set and produces the series a chart would render.

use chrono::{DateTime, Days, NaiveDate, Utc};
use floodwatch_core::{Criticality, IncidentCategory, Report};
use serde::Serialize;

/// Severity score for one infrastructure category
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeverityPoint {
    /// Category axis label
    pub category: &'static str,

    /// Weighted severity score, capped at 100
    pub score: u32,
}

/// Per-district criticality breakdown
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DistrictSeries {
    /// District label
    pub district: String,

    /// Active critical reports in the district
    pub critical: usize,

    /// Active high reports in the district
    pub high: usize,

    /// Active medium reports in the district
    pub medium: usize,
}

/// One incident-type slice of the distribution chart
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TypeSlice {
    /// Free-form type label as reported
    pub label: String,

    /// Number of reports carrying that label
    pub count: usize,
}

/// Daily report count for the trailing week
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TimelinePoint {
    /// Calendar day
    pub day: NaiveDate,

    /// Reports created on that day
    pub count: usize,
}

/// Weighted severity score per category, capped at 100
///
/// Weights: critical 4, high 3, medium 2; the raw sum is scaled by 10.
/// Every category appears in display order, scoring 0 when empty.
#[must_use]
pub fn severity_index(reports: &[Report]) -> Vec<SeverityPoint> {
    IncidentCategory::ALL
        .iter()
        .map(|&category| {
            let sum: u32 = reports
                .iter()
                .filter(|r| r.category() == category)
                .map(|r| r.criticality.severity_weight())
                .sum();
            SeverityPoint {
                category: category.label(),
                score: (sum * 10).min(100),
            }
        })
        .collect()
}

/// Criticality breakdown per district, in first-appearance order
#[must_use]
pub fn district_series(reports: &[Report]) -> Vec<DistrictSeries> {
    let mut series: Vec<DistrictSeries> = Vec::new();

    for report in reports {
        let index = match series.iter().position(|s| s.district == report.district) {
            Some(index) => index,
            None => {
                series.push(DistrictSeries {
                    district: report.district.clone(),
                    critical: 0,
                    high: 0,
                    medium: 0,
                });
                series.len() - 1
            }
        };

        let entry = &mut series[index];
        match report.criticality {
            Criticality::Critical => entry.critical += 1,
            Criticality::High => entry.high += 1,
            Criticality::Medium => entry.medium += 1,
        }
    }

    series
}

/// Report count per raw type label, in first-appearance order
#[must_use]
pub fn type_distribution(reports: &[Report]) -> Vec<TypeSlice> {
    let mut slices: Vec<TypeSlice> = Vec::new();

    for report in reports {
        if let Some(slice) = slices.iter_mut().find(|s| s.label == report.report_type) {
            slice.count += 1;
        } else {
            slices.push(TypeSlice {
                label: report.report_type.clone(),
                count: 1,
            });
        }
    }

    slices
}

/// Daily counts for the 7 calendar days ending at `today`
///
/// Days without reports appear with a zero count so the axis is dense.
#[must_use]
pub fn weekly_timeline(reports: &[Report], today: DateTime<Utc>) -> Vec<TimelinePoint> {
    let end = today.date_naive();

    (0..7u64)
        .rev()
        .filter_map(|offset| end.checked_sub_days(Days::new(offset)))
        .map(|day| TimelinePoint {
            day,
            count: reports
                .iter()
                .filter(|r| r.timestamp.date_naive() == day)
                .count(),
        })
        .collect()
}
