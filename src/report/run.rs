//! Job orchestration: one report request in, one uploaded CSV out.

use crate::catalog::{self, CatalogClient};
use crate::csv_export;
use crate::error::{Error, Result};
use crate::status_api::StatusClient;
use crate::types::{CatalogEntry, FlatRecord, JobId, JobStatus, ReportOutcome};
use rand::seq::SliceRandom;

use super::ReportGenerator;

impl ReportGenerator {
    /// Run one report job from start to finish.
    ///
    /// Marks the request `inprogress`, generates and uploads the report,
    /// then marks it `completed` with the public blob URL. On any error
    /// after the first status update the request is marked `failed`
    /// (best-effort) and the original error is returned.
    ///
    /// # Arguments
    ///
    /// * `id` - The report request to process
    /// * `sample_size` - When set to a positive value smaller than the
    ///   catalog listing, only that many randomly chosen entries are
    ///   included in the report
    ///
    /// # Errors
    ///
    /// Returns an error when any pipeline stage fails; the empty-catalog
    /// case surfaces as [`Error::NoEntries`].
    pub async fn run_job(&self, id: JobId, sample_size: Option<u64>) -> Result<ReportOutcome> {
        let http = reqwest::Client::new();
        let status = StatusClient::new(http.clone(), &self.config);

        match self.execute(&http, &status, id, sample_size).await {
            Ok(outcome) => {
                tracing::info!(
                    job_id = id.0,
                    url = %outcome.url,
                    rows = outcome.rows_written,
                    "report completed"
                );
                Ok(outcome)
            }
            Err(e) => self.handle_job_failure(&status, id, e).await,
        }
    }

    /// One pass through the report pipeline. Any error propagates to
    /// [`ReportGenerator::run_job`], which owns failure handling.
    async fn execute(
        &self,
        http: &reqwest::Client,
        status: &StatusClient,
        id: JobId,
        sample_size: Option<u64>,
    ) -> Result<ReportOutcome> {
        tracing::info!(job_id = id.0, "starting report generation");
        status
            .update_status(id, JobStatus::InProgress, None)
            .await?;

        let descriptor = status.fetch_job(id).await?;
        let entity_type = descriptor.entity_type;

        let catalog = CatalogClient::new(http.clone(), &self.config);
        let entries = catalog.list_entries(&entity_type).await;
        if entries.is_empty() {
            return Err(Error::NoEntries { entity_type });
        }

        let entries = sample_if_needed(entries, sample_size);
        let (records, skipped) = enrich_entries(&catalog, &entries).await;

        let csv_bytes = csv_export::render_csv(&records)?;
        let blob = super::blob_name(id);
        self.artifact_store()?
            .put(&blob, super::BLOB_CONTENT_TYPE, csv_bytes)
            .await?;
        tracing::info!(job_id = id.0, blob_name = %blob, "report uploaded");

        let url = self.config.public_blob_url(&blob);
        status
            .update_status(id, JobStatus::Completed, Some(&url))
            .await?;

        Ok(ReportOutcome {
            job_id: id,
            blob_name: blob,
            url,
            rows_written: records.len() as u64,
            entries_skipped: skipped,
        })
    }

    /// Record a failed request and hand the original error back.
    ///
    /// The `failed` update is best-effort: when the status API is also
    /// unreachable the secondary error is logged and swallowed so the
    /// pipeline error is the one the caller sees.
    async fn handle_job_failure(
        &self,
        status: &StatusClient,
        id: JobId,
        e: Error,
    ) -> Result<ReportOutcome> {
        tracing::error!(job_id = id.0, error = %e, "report generation failed");

        if let Err(status_err) = status.update_status(id, JobStatus::Failed, None).await {
            tracing::error!(
                job_id = id.0,
                error = %status_err,
                "could not record failed status"
            );
        }

        Err(e)
    }
}

/// Fetch, enrich and flatten every catalog entry in order.
///
/// Entries whose detail fetch fails are skipped with a warning and the batch
/// continues. Returns the flattened records plus the number skipped.
async fn enrich_entries(
    catalog: &CatalogClient,
    entries: &[CatalogEntry],
) -> (Vec<FlatRecord>, u64) {
    let total = entries.len();
    tracing::info!(total, "enriching catalog entries");

    let mut records = Vec::with_capacity(total);
    let mut skipped = 0u64;

    for entry in entries {
        let detail = match catalog.fetch_detail(&entry.detail_url).await {
            Ok(detail) => detail,
            Err(e) => {
                tracing::warn!(
                    name = %entry.name,
                    error = %e,
                    "skipping entry after failed detail fetch"
                );
                skipped += 1;
                continue;
            }
        };

        let generation = catalog.fetch_generation(detail.species_url()).await;
        records.push(catalog::flatten(entry, &detail, &generation));
    }

    tracing::info!(fetched = records.len(), total, "catalog enrichment finished");
    (records, skipped)
}

/// Reduce a listing to `sample_size` randomly chosen entries.
///
/// Only applies when the requested size is positive and strictly smaller
/// than the listing; otherwise the listing is returned unchanged. Sampling
/// is without replacement and unseeded, so repeated runs of the same job
/// may produce different reports.
pub(crate) fn sample_if_needed(
    entries: Vec<CatalogEntry>,
    sample_size: Option<u64>,
) -> Vec<CatalogEntry> {
    match sample_size {
        Some(k) if k > 0 && k < entries.len() as u64 => {
            let sampled: Vec<CatalogEntry> = entries
                .choose_multiple(&mut rand::thread_rng(), k as usize)
                .cloned()
                .collect();
            tracing::info!(
                requested = k,
                total = entries.len(),
                "sampled catalog entries"
            );
            sampled
        }
        _ => entries,
    }
}
