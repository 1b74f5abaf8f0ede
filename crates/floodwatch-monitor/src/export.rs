//! Local JSON export of the filtered report set

use chrono::{DateTime, SecondsFormat, Utc};
use floodwatch_core::{Report, Result};
use std::path::{Path, PathBuf};

/// Write the given reports as pretty JSON into `dir`
///
/// The file is named `report-<timestamp>.json` after the current instant.
/// Purely local; no network step.
///
/// # Errors
///
/// Returns [`floodwatch_core::Error::Io`] if the directory or file cannot
/// be written, or [`floodwatch_core::Error::Serialization`] if encoding
/// fails.
pub fn export_filtered(reports: &[Report], dir: &Path) -> Result<PathBuf> {
    export_filtered_at(reports, dir, Utc::now())
}

/// Write the given reports as pretty JSON, naming the file after `now`
///
/// # Errors
///
/// Same as [`export_filtered`].
pub fn export_filtered_at(reports: &[Report], dir: &Path, now: DateTime<Utc>) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;

    // Colons are not valid in filenames on every platform
    let stamp = now
        .to_rfc3339_opts(SecondsFormat::Secs, true)
        .replace(':', "-");
    let path = dir.join(format!("report-{stamp}.json"));

    let data = serde_json::to_string_pretty(reports)?;
    std::fs::write(&path, data)?;

    tracing::info!(path = %path.display(), count = reports.len(), "filtered reports exported");
    Ok(path)
}
