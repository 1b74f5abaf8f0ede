//! HTTP client for the flood report backend

use floodwatch_core::{Error, NewReport, Report, ReportId, Result};
use reqwest::Client;
use std::time::Duration;

/// Client for the report backend REST API
#[derive(Debug, Clone)]
pub struct ReportsClient {
    client: Client,
    base_url: String,
}

impl ReportsClient {
    /// Create a new client against `base_url`
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the underlying HTTP client cannot be
    /// constructed.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::http(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// Fetch every report known to the backend
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the request fails, [`Error::Api`] on a
    /// non-success status, or [`Error::Decode`] if the body cannot be
    /// parsed.
    pub async fn fetch_reports(&self) -> Result<Vec<Report>> {
        let url = format!("{}/api/reports", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Error::http(format!("failed to fetch reports: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::api(status.as_u16(), "failed to fetch reports"));
        }

        let reports: Vec<Report> = response
            .json()
            .await
            .map_err(|e| Error::decode(format!("failed to parse reports: {e}")))?;

        tracing::debug!(count = reports.len(), "fetched reports");
        Ok(reports)
    }

    /// Mark a report as resolved on the backend
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotFound`] if the backend does not know the
    /// report, [`Error::Http`] if the request fails, or [`Error::Api`]
    /// on any other non-success status.
    pub async fn resolve(&self, id: ReportId) -> Result<()> {
        let url = format!("{}/api/reports/{}/resolve", self.base_url, id);

        let response = self
            .client
            .put(&url)
            .send()
            .await
            .map_err(|e| Error::http(format!("failed to resolve report {id}: {e}")))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(Error::not_found(format!("report {id}")));
        }
        if !status.is_success() {
            return Err(Error::api(
                status.as_u16(),
                format!("failed to resolve report {id}"),
            ));
        }

        tracing::info!(report_id = id, "report resolved on backend");
        Ok(())
    }

    /// Submit a new incident report
    ///
    /// # Errors
    ///
    /// Returns [`Error::Http`] if the request fails, [`Error::Api`] on a
    /// non-success status, or [`Error::Decode`] if the created report
    /// cannot be parsed.
    pub async fn submit(&self, report: &NewReport) -> Result<Report> {
        let url = format!("{}/api/reports", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(report)
            .send()
            .await
            .map_err(|e| Error::http(format!("failed to submit report: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::api(status.as_u16(), "failed to submit report"));
        }

        let created: Report = response
            .json()
            .await
            .map_err(|e| Error::decode(format!("failed to parse created report: {e}")))?;

        tracing::info!(report_id = created.id, "report submitted");
        Ok(created)
    }
}
