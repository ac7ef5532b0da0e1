//! # poke-report
//!
//! Backend library for queue-triggered PokeAPI report generation.
//!
//! Each queue message names a report request that was registered with an
//! external status API. The library marks the request in progress, looks up
//! which Pokemon type the report covers, pulls the matching Pokemon from
//! PokeAPI, enriches every entry with its detail record and generation,
//! renders the result as CSV and uploads it to Azure Blob Storage. The
//! request is then marked completed with the public blob URL, or failed if
//! anything went wrong along the way.
//!
//! ## Design Philosophy
//!
//! poke-report is designed to be:
//! - **Library-first** - No queue binding or host process, purely a Rust
//!   crate for embedding in whatever worker runtime delivers the messages
//! - **Fail-safe** - A request that was marked in progress is always moved
//!   to a terminal status, even when report generation blows up
//! - **Lenient** - Individual entries that cannot be enriched are skipped
//!   rather than failing the whole report
//!
//! ## Quick Start
//!
//! ```no_run
//! use poke_report::{Config, ReportGenerator};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = Config::from_env()?;
//!     let generator = ReportGenerator::new(config)?;
//!
//!     // Body of a queue message naming request 42
//!     let outcome = generator.handle_message(br#"{"id": 42}"#).await?;
//!     println!("report at {} ({} rows)", outcome.url, outcome.rows_written);
//!
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::unwrap_used)]
#![warn(clippy::expect_used)]

/// PokeAPI catalog client and record flattening
pub mod catalog;
/// Configuration types
pub mod config;
/// CSV artifact rendering
pub mod csv_export;
/// Error types
pub mod error;
/// Core report generation (decomposed into focused submodules)
pub mod report;
/// Status API client
pub mod status_api;
/// Blob storage upload
pub mod storage;
/// Core types
pub mod types;

// Re-export commonly used types
pub use catalog::CatalogClient;
pub use config::Config;
pub use error::{Error, Result, StorageError};
pub use report::ReportGenerator;
pub use status_api::StatusClient;
pub use storage::{ArtifactStore, AzureBlobStore, StorageConnectionString};
pub use types::{
    CatalogEntry, FlatRecord, JobDescriptor, JobId, JobStatus, QueueMessage, ReportOutcome,
};
