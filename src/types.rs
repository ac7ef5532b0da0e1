//! Core types for poke-report

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Unique identifier for a report request
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JobId(pub i64);

impl JobId {
    /// Create a new JobId
    pub fn new(id: i64) -> Self {
        Self(id)
    }

    /// Get the inner i64 value
    pub fn get(&self) -> i64 {
        self.0
    }
}

impl From<i64> for JobId {
    fn from(id: i64) -> Self {
        Self(id)
    }
}

impl From<JobId> for i64 {
    fn from(id: JobId) -> Self {
        id.0
    }
}

impl PartialEq<i64> for JobId {
    fn eq(&self, other: &i64) -> bool {
        self.0 == *other
    }
}

impl PartialEq<JobId> for i64 {
    fn eq(&self, other: &JobId) -> bool {
        *self == other.0
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for JobId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(Self(s.parse()?))
    }
}

/// Report request status as tracked by the external status API
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    /// Report generation has started
    InProgress,
    /// Report was uploaded and the result URL recorded
    Completed,
    /// Report generation failed
    Failed,
}

impl JobStatus {
    /// The wire string the status API expects for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::InProgress => "inprogress",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A queue message naming the report request to process
///
/// Producers send either a bare JSON object or a single-element array
/// wrapping that object; [`QueueMessage::from_slice`] accepts both.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueueMessage {
    /// Identifier of the report request
    pub id: JobId,
    /// Optional cap on how many catalog entries the report covers
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_size: Option<u64>,
}

impl QueueMessage {
    /// Parse a raw queue message body.
    ///
    /// Accepts `{"id": 42}` as well as `[{"id": 42}]`; unknown fields are
    /// ignored. Returns [`Error::InvalidMessage`] when the body is not JSON,
    /// the array is empty, or `id` is missing or not an integer.
    pub fn from_slice(body: &[u8]) -> Result<Self> {
        let value: serde_json::Value = serde_json::from_slice(body)
            .map_err(|e| Error::InvalidMessage(format!("body is not valid JSON: {e}")))?;

        let object = match value {
            serde_json::Value::Array(items) => items
                .into_iter()
                .next()
                .ok_or_else(|| Error::InvalidMessage("message array is empty".to_string()))?,
            other => other,
        };

        serde_json::from_value(object)
            .map_err(|e| Error::InvalidMessage(format!("message is malformed: {e}")))
    }
}

/// Job descriptor returned by the status API
///
/// The status API responds with a list of request records; only the entity
/// type is needed to drive the report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    /// Which catalog entity type the report covers (e.g., "fire")
    #[serde(rename = "type", alias = "entity_type")]
    pub entity_type: String,
}

/// A single entry from a catalog listing
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    /// Display name of the entry
    pub name: String,
    /// URL of the entry's detail record
    pub detail_url: String,
}

/// A flattened report row: ordered mapping of column name to scalar value
///
/// Column order is insertion order (`serde_json` is built with
/// `preserve_order`), which is what fixes the CSV column layout.
pub type FlatRecord = serde_json::Map<String, serde_json::Value>;

/// Summary of a successfully generated report
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportOutcome {
    /// The report request that was processed
    pub job_id: JobId,
    /// Name of the uploaded blob (e.g., "poke_report_42.csv")
    pub blob_name: String,
    /// Public URL of the uploaded report
    pub url: String,
    /// Number of data rows written to the CSV
    pub rows_written: u64,
    /// Number of catalog entries skipped because enrichment failed
    pub entries_skipped: u64,
}
