//! Client for the external status API that tracks report requests.
//!
//! The API is deliberately simple: one PUT endpoint records status changes
//! and one GET endpoint returns the stored request records. Responses are
//! passed through without local validation; the API owns its own contract.

use reqwest::Client;
use serde::Serialize;

use crate::config::Config;
use crate::error::{Error, Result};
use crate::types::{JobDescriptor, JobId, JobStatus};

/// Wire payload for a status update
#[derive(Debug, Serialize)]
struct StatusUpdate<'a> {
    id: i64,
    status: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    url: Option<&'a str>,
}

/// Client for the request-tracking status API
#[derive(Clone, Debug)]
pub struct StatusClient {
    http: Client,
    base: String,
}

impl StatusClient {
    /// Create a client against the configured status API.
    pub fn new(http: Client, config: &Config) -> Self {
        Self {
            http,
            base: config.status_api_base(),
        }
    }

    /// Record a status change for a report request.
    ///
    /// Sends `PUT {base}/api/request` with the request id, the new status
    /// and, for completed requests, the public report URL. The API's parsed
    /// JSON response is returned as-is; a non-success HTTP status with a
    /// JSON body is not treated as an error.
    ///
    /// # Errors
    ///
    /// Returns an error when the request cannot be sent or the response body
    /// is not JSON.
    pub async fn update_status(
        &self,
        id: JobId,
        status: JobStatus,
        url: Option<&str>,
    ) -> Result<serde_json::Value> {
        let endpoint = format!("{}/api/request", self.base);
        let payload = StatusUpdate {
            id: id.get(),
            status: status.as_str(),
            url,
        };

        tracing::info!(job_id = id.get(), status = %status, "updating request status");

        let response = self.http.put(&endpoint).json(&payload).send().await?;
        let body = response.json::<serde_json::Value>().await?;
        Ok(body)
    }

    /// Fetch the job descriptor for a report request.
    ///
    /// Sends `GET {base}/api/request/{id}`. The API answers with a list of
    /// request records; the first one carries the entity type the report
    /// covers.
    ///
    /// # Errors
    ///
    /// Returns [`Error::JobDescriptor`] when the list is empty, or a network
    /// error when the request fails or the body does not decode as a list of
    /// records.
    pub async fn fetch_job(&self, id: JobId) -> Result<JobDescriptor> {
        let endpoint = format!("{}/api/request/{}", self.base, id);

        let response = self.http.get(&endpoint).send().await?;
        let records = response.json::<Vec<JobDescriptor>>().await?;

        records.into_iter().next().ok_or_else(|| {
            Error::JobDescriptor(format!("status API returned no records for request {id}"))
        })
    }
}
