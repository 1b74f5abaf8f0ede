//! Core data types for the floodwatch monitoring client

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Report identifier type (backend uses a numeric auto-increment key)
pub type ReportId = i64;

/// How long a report counts as "recent" for trend and alert purposes
pub const RECENT_WINDOW_HOURS: i64 = 24;

/// Severity level of an incident report
///
/// Ordinal: `Critical` > `High` > `Medium`. The backend does not emit a
/// "low" level for active reports.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum Criticality {
    /// Routine damage, schedule repair
    Medium,
    /// Urgent damage, prioritize
    High,
    /// Immediate danger to life or infrastructure
    Critical,
}

impl Criticality {
    /// Weight used by the severity-index projection
    #[must_use]
    pub const fn severity_weight(self) -> u32 {
        match self {
            Self::Critical => 4,
            Self::High => 3,
            Self::Medium => 2,
        }
    }
}

impl std::fmt::Display for Criticality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
        }
    }
}

/// Lifecycle status of a report
///
/// The backend stores status as a free-form string defaulting to "active".
/// Anything other than "resolved" counts as active, so unknown values are
/// preserved rather than rejected. Resolution is one-way; there is no
/// un-resolve transition.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(from = "String", into = "String")]
pub enum ReportStatus {
    /// Report is open and shown on the live map
    Active,
    /// Report has been resolved by an administrator
    Resolved,
    /// Any other status string the backend may emit; treated as active
    Other(String),
}

impl ReportStatus {
    /// Whether this status counts as resolved
    #[must_use]
    pub const fn is_resolved(&self) -> bool {
        matches!(self, Self::Resolved)
    }
}

impl From<String> for ReportStatus {
    fn from(value: String) -> Self {
        match value.as_str() {
            "active" => Self::Active,
            "resolved" => Self::Resolved,
            _ => Self::Other(value),
        }
    }
}

impl From<ReportStatus> for String {
    fn from(status: ReportStatus) -> Self {
        match status {
            ReportStatus::Active => "active".to_string(),
            ReportStatus::Resolved => "resolved".to_string(),
            ReportStatus::Other(value) => value,
        }
    }
}

/// Closed category derived once from the free-form incident type string
///
/// Replaces scattered substring dispatch: the mapping from type label to
/// category lives here and nowhere else.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum IncidentCategory {
    /// Road surface or access damage
    Roads,
    /// Bridge structural damage
    Bridges,
    /// Electricity or water supply damage
    Utilities,
    /// Railway line or station damage
    Railways,
    /// Anything that matches no known keyword
    Other,
}

impl IncidentCategory {
    /// All categories in display order
    pub const ALL: [Self; 5] = [
        Self::Roads,
        Self::Bridges,
        Self::Utilities,
        Self::Railways,
        Self::Other,
    ];

    /// Derive the category from a free-form incident type label
    #[must_use]
    pub fn from_type(label: &str) -> Self {
        let lower = label.to_lowercase();
        if lower.contains("road") {
            Self::Roads
        } else if lower.contains("bridge") {
            Self::Bridges
        } else if lower.contains("electricity")
            || lower.contains("electric")
            || lower.contains("power")
            || lower.contains("water")
            || lower.contains("flood")
        {
            Self::Utilities
        } else if lower.contains("railway") || lower.contains("train") {
            Self::Railways
        } else {
            Self::Other
        }
    }

    /// Human-readable axis label
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Roads => "Roads",
            Self::Bridges => "Bridges",
            Self::Utilities => "Utilities",
            Self::Railways => "Railways",
            Self::Other => "Other",
        }
    }
}

/// One submitted infrastructure-damage incident record
///
/// Immutable once stored except for `status`, which transitions at most
/// once to resolved.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    /// Unique identifier, stable for the report's lifetime
    pub id: ReportId,

    /// Administrative region label
    pub district: String,

    /// Free-text location description
    pub location: String,

    /// Category label, free-form (e.g. "Bridge Damage", "Road Blockage")
    #[serde(rename = "type")]
    pub report_type: String,

    /// Severity ordinal
    pub criticality: Criticality,

    /// Lifecycle status
    #[serde(default = "default_status")]
    pub status: ReportStatus,

    /// Longer description of the damage
    #[serde(default)]
    pub description: Option<String>,

    /// Coordinate latitude
    pub latitude: f64,

    /// Coordinate longitude
    pub longitude: f64,

    /// Name of the person who filed the report
    #[serde(default)]
    pub reporter_name: Option<String>,

    /// Contact number of the reporter
    #[serde(default)]
    pub contact_number: Option<String>,

    /// When the report was created; immutable
    #[serde(with = "backend_timestamp")]
    pub timestamp: DateTime<Utc>,
}

fn default_status() -> ReportStatus {
    ReportStatus::Active
}

impl Report {
    /// Whether this report counts as active (not resolved)
    #[must_use]
    pub const fn is_active(&self) -> bool {
        !self.status.is_resolved()
    }

    /// Whether this report was created within the recent window
    ///
    /// Evaluated against an injected `now`, so repeated calls across time
    /// may change the result for the same report.
    #[must_use]
    pub fn is_recent(&self, now: DateTime<Utc>) -> bool {
        now.signed_duration_since(self.timestamp) < Duration::hours(RECENT_WINDOW_HOURS)
    }

    /// Category derived from the free-form type label
    #[must_use]
    pub fn category(&self) -> IncidentCategory {
        IncidentCategory::from_type(&self.report_type)
    }
}

/// Payload for creating a new report via `POST /api/reports`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct NewReport {
    /// Administrative region label
    pub district: String,

    /// Free-text location description
    pub location: String,

    /// Category label
    #[serde(rename = "type")]
    pub report_type: String,

    /// Severity ordinal
    pub criticality: Criticality,

    /// Longer description of the damage
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Coordinate latitude
    pub latitude: f64,

    /// Coordinate longitude
    pub longitude: f64,

    /// Name of the person filing the report
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reporter_name: Option<String>,

    /// Contact number of the reporter
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_number: Option<String>,
}

/// User-selected predicates for the active-report view
///
/// `None` means "all" for each axis. Pure query parameters; not persisted
/// across sessions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct FilterSelection {
    /// Keep only reports from this district
    pub district: Option<String>,

    /// Keep only reports at this severity level
    pub criticality: Option<Criticality>,

    /// Keep only reports within this many "days" (see the filter engine
    /// for the scaling behavior)
    pub time_range_days: Option<u32>,
}

impl FilterSelection {
    /// Selection that passes every report
    #[must_use]
    pub const fn all() -> Self {
        Self {
            district: None,
            criticality: None,
            time_range_days: None,
        }
    }
}

/// Timestamp codec matching the backend's Jackson format
///
/// The backend serializes `LocalDateTime` as `yyyy-MM-dd'T'HH:mm:ss` with
/// no offset. Deserialization also accepts RFC 3339 for tooling that
/// round-trips through richer formats.
pub mod backend_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer, de::Error as _};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    /// Serialize to the backend's naive format
    ///
    /// # Errors
    ///
    /// Returns an error if the serializer rejects the string.
    pub fn serialize<S: Serializer>(
        value: &DateTime<Utc>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    /// Deserialize from the backend format, falling back to RFC 3339
    ///
    /// # Errors
    ///
    /// Returns an error if the string matches neither format.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        if let Ok(naive) = NaiveDateTime::parse_from_str(&raw, FORMAT) {
            return Ok(naive.and_utc());
        }
        DateTime::parse_from_rfc3339(&raw)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|e| D::Error::custom(format!("invalid timestamp {raw:?}: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn sample_report() -> Report {
        Report {
            id: 1,
            district: "Colombo".to_string(),
            location: "Kelani bridge approach".to_string(),
            report_type: "Bridge Damage".to_string(),
            criticality: Criticality::Critical,
            status: ReportStatus::Active,
            description: Some("Scour under the north pier".to_string()),
            latitude: 6.9271,
            longitude: 79.8612,
            reporter_name: Some("W. Perera".to_string()),
            contact_number: Some("0771234567".to_string()),
            timestamp: Utc.with_ymd_and_hms(2025, 11, 30, 8, 15, 0).unwrap(),
        }
    }

    #[test]
    fn test_criticality_ordering() {
        assert!(Criticality::Critical > Criticality::High);
        assert!(Criticality::High > Criticality::Medium);
        assert_eq!(Criticality::Critical.to_string(), "critical");
    }

    #[test]
    fn test_criticality_serde_lowercase() {
        let json = serde_json::to_string(&Criticality::High).unwrap();
        assert_eq!(json, "\"high\"");

        let parsed: Criticality = serde_json::from_str("\"critical\"").unwrap();
        assert_eq!(parsed, Criticality::Critical);
    }

    #[test]
    fn test_severity_weights() {
        assert_eq!(Criticality::Critical.severity_weight(), 4);
        assert_eq!(Criticality::High.severity_weight(), 3);
        assert_eq!(Criticality::Medium.severity_weight(), 2);
    }

    #[test]
    fn test_status_round_trip_preserves_unknown_values() {
        let status: ReportStatus = serde_json::from_str("\"under_review\"").unwrap();
        assert_eq!(status, ReportStatus::Other("under_review".to_string()));
        assert!(!status.is_resolved());

        let json = serde_json::to_string(&status).unwrap();
        assert_eq!(json, "\"under_review\"");
    }

    #[test]
    fn test_status_known_values() {
        let active: ReportStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(active, ReportStatus::Active);
        assert!(!active.is_resolved());

        let resolved: ReportStatus = serde_json::from_str("\"resolved\"").unwrap();
        assert!(resolved.is_resolved());
    }

    #[test]
    fn test_category_from_type() {
        assert_eq!(
            IncidentCategory::from_type("Road Blockage"),
            IncidentCategory::Roads
        );
        assert_eq!(
            IncidentCategory::from_type("bridge collapse"),
            IncidentCategory::Bridges
        );
        assert_eq!(
            IncidentCategory::from_type("Electricity Pole Down"),
            IncidentCategory::Utilities
        );
        assert_eq!(
            IncidentCategory::from_type("Water main burst"),
            IncidentCategory::Utilities
        );
        assert_eq!(
            IncidentCategory::from_type("Railway washout"),
            IncidentCategory::Railways
        );
        assert_eq!(
            IncidentCategory::from_type("Landslide"),
            IncidentCategory::Other
        );
        assert_eq!(IncidentCategory::from_type(""), IncidentCategory::Other);
    }

    #[test]
    fn test_report_parses_backend_json() {
        let json = r#"{
            "id": 7,
            "district": "Gampaha",
            "location": "Main street culvert",
            "type": "Road Damage",
            "criticality": "high",
            "status": "active",
            "description": null,
            "latitude": 7.0917,
            "longitude": 79.9999,
            "reporterName": "K. Silva",
            "contactNumber": "0719876543",
            "timestamp": "2025-11-30T06:45:00"
        }"#;

        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.id, 7);
        assert_eq!(report.report_type, "Road Damage");
        assert_eq!(report.criticality, Criticality::High);
        assert!(report.is_active());
        assert_eq!(
            report.timestamp,
            Utc.with_ymd_and_hms(2025, 11, 30, 6, 45, 0).unwrap()
        );
    }

    #[test]
    fn test_report_missing_status_defaults_to_active() {
        let json = r#"{
            "id": 3,
            "district": "Kalutara",
            "location": "Beach road",
            "type": "Flooding",
            "criticality": "medium",
            "latitude": 6.58,
            "longitude": 79.96,
            "timestamp": "2025-11-29T22:00:00"
        }"#;

        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(report.status, ReportStatus::Active);
        assert!(report.description.is_none());
        assert!(report.reporter_name.is_none());
    }

    #[test]
    fn test_timestamp_accepts_rfc3339() {
        let json = r#"{
            "id": 4,
            "district": "Colombo",
            "location": "x",
            "type": "Flooding",
            "criticality": "medium",
            "latitude": 1.0,
            "longitude": 2.0,
            "timestamp": "2025-11-30T06:45:00+05:30"
        }"#;

        let report: Report = serde_json::from_str(json).unwrap();
        assert_eq!(
            report.timestamp,
            Utc.with_ymd_and_hms(2025, 11, 30, 1, 15, 0).unwrap()
        );
    }

    #[test]
    fn test_timestamp_serializes_backend_format() {
        let report = sample_report();
        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["timestamp"], "2025-11-30T08:15:00");
        assert_eq!(json["type"], "Bridge Damage");
        assert_eq!(json["reporterName"], "W. Perera");
    }

    #[test]
    fn test_is_recent_window() {
        let report = sample_report();

        let just_after = report.timestamp + Duration::hours(1);
        assert!(report.is_recent(just_after));

        let at_boundary = report.timestamp + Duration::hours(RECENT_WINDOW_HOURS);
        assert!(!report.is_recent(at_boundary));

        let well_after = report.timestamp + Duration::days(3);
        assert!(!report.is_recent(well_after));
    }

    #[test]
    fn test_filter_selection_default_is_all() {
        let selection = FilterSelection::default();
        assert_eq!(selection, FilterSelection::all());
        assert!(selection.district.is_none());
        assert!(selection.criticality.is_none());
        assert!(selection.time_range_days.is_none());
    }

    #[test]
    fn test_new_report_serializes_camel_case() {
        let payload = NewReport {
            district: "Galle".to_string(),
            location: "Harbor road".to_string(),
            report_type: "Road Damage".to_string(),
            criticality: Criticality::Medium,
            description: None,
            latitude: 6.03,
            longitude: 80.22,
            reporter_name: Some("A. Fernando".to_string()),
            contact_number: None,
        };

        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["type"], "Road Damage");
        assert_eq!(json["reporterName"], "A. Fernando");
        assert!(json.get("description").is_none());
        assert!(json.get("contactNumber").is_none());
    }
}
