//! Core report generation implementation.
//!
//! The `ReportGenerator` struct and its construction live here; the job
//! pipeline itself (status updates, enrichment, sampling, upload) is in
//! [`run`].

mod run;

// unwrap/expect are acceptable in tests for concise failure-on-error assertions
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
pub(crate) mod test_helpers;
#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests;

use crate::config::Config;
use crate::error::Result;
use crate::storage::{ArtifactStore, AzureBlobStore};
use crate::types::{JobId, QueueMessage, ReportOutcome};

/// Content type report artifacts are uploaded with
const BLOB_CONTENT_TYPE: &str = "text/csv";

/// Blob name the report for a job is stored under
fn blob_name(id: JobId) -> String {
    format!("poke_report_{id}.csv")
}

/// Main report generator instance (cloneable - holds only shared configuration)
#[derive(Clone)]
pub struct ReportGenerator {
    /// Configuration (wrapped in Arc for sharing across invocations)
    pub(crate) config: std::sync::Arc<Config>,
    /// Replacement artifact store; `None` means upload to Azure Blob Storage
    pub(crate) store_override: Option<std::sync::Arc<dyn ArtifactStore>>,
}

impl ReportGenerator {
    /// Create a new ReportGenerator instance
    ///
    /// Validates the configuration eagerly, so bad URLs or an unparseable
    /// storage connection string surface here rather than mid-job.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::Config`] when the configuration is invalid.
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: std::sync::Arc::new(config),
            store_override: None,
        })
    }

    /// Create a generator that uploads through `store` instead of Azure
    /// Blob Storage.
    ///
    /// Status reporting and catalog access are unchanged; only the artifact
    /// upload is redirected. Tests use this to capture uploads in memory.
    pub fn with_store(config: Config, store: std::sync::Arc<dyn ArtifactStore>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config: std::sync::Arc::new(config),
            store_override: Some(store),
        })
    }

    /// Handle one raw queue message end to end.
    ///
    /// Parses the message body and runs the job it names. Parse failures are
    /// returned directly without touching the status API; once the job id is
    /// known, any later failure marks the request `failed` before the error
    /// is returned (see [`ReportGenerator::run_job`]).
    ///
    /// # Arguments
    ///
    /// * `body` - Raw queue message bytes, either `{"id": N, ...}` or a
    ///   single-element array wrapping the same object
    ///
    /// # Returns
    ///
    /// The outcome of the completed job: blob name, public URL and counts.
    ///
    /// # Errors
    ///
    /// Returns an error when the message is malformed or any pipeline stage
    /// fails (descriptor lookup, empty catalog, rendering, upload).
    ///
    /// # Example
    ///
    /// ```no_run
    /// use poke_report::{Config, ReportGenerator};
    ///
    /// #[tokio::main]
    /// async fn main() -> Result<(), Box<dyn std::error::Error>> {
    ///     let generator = ReportGenerator::new(Config::from_env()?)?;
    ///     let outcome = generator.handle_message(br#"{"id": 42}"#).await?;
    ///     println!("uploaded {}", outcome.blob_name);
    ///     Ok(())
    /// }
    /// ```
    pub async fn handle_message(&self, body: &[u8]) -> Result<ReportOutcome> {
        let message = QueueMessage::from_slice(body)?;
        self.run_job(message.id, message.sample_size).await
    }

    /// Artifact store for one invocation.
    ///
    /// Built fresh per job unless an override was supplied, so credentials
    /// are re-derived from configuration every time and nothing is cached
    /// between invocations.
    fn artifact_store(&self) -> Result<std::sync::Arc<dyn ArtifactStore>> {
        match &self.store_override {
            Some(store) => Ok(store.clone()),
            None => Ok(std::sync::Arc::new(AzureBlobStore::from_config(
                &self.config,
            )?)),
        }
    }
}
