//! Error types for poke-report
//!
//! This module provides error handling for the library, including:
//! - Domain-specific error types (Config, InvalidMessage, Storage, etc.)
//! - A dedicated [`StorageError`] for the blob upload path
//! - Context information (entity type, HTTP status, offending key, etc.)

use thiserror::Error;

/// Result type alias for poke-report operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for poke-report
///
/// This is the primary error type used throughout the library. Each variant includes
/// contextual information to help diagnose issues.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration error with context about which setting is invalid
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable error message describing the configuration issue
        message: String,
        /// The configuration key that caused the error (e.g., "DOMAIN")
        key: Option<String>,
    },

    /// Queue message could not be parsed into a report request
    #[error("invalid queue message: {0}")]
    InvalidMessage(String),

    /// Status API returned a response that does not describe a job
    #[error("job descriptor error: {0}")]
    JobDescriptor(String),

    /// Catalog listing produced no entries, so there is nothing to report on
    #[error("no catalog entries found for entity type '{entity_type}'")]
    NoEntries {
        /// The entity type whose listing came back empty
        entity_type: String,
    },

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Serialization error
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// CSV rendering error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Blob storage error
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Blob storage errors (connection string parsing, signing, upload)
#[derive(Debug, Error)]
pub enum StorageError {
    /// Connection string is missing a field or otherwise malformed
    #[error("invalid connection string: {0}")]
    ConnectionString(String),

    /// Account key is not valid base64
    #[error("invalid account key: {0}")]
    InvalidAccountKey(String),

    /// A blob URL could not be built from the configured endpoint
    #[error("invalid blob URL '{url}': {reason}")]
    InvalidUrl {
        /// The URL that failed to parse
        url: String,
        /// Why the URL was rejected
        reason: String,
    },

    /// The upload request failed at the transport level
    #[error("upload request failed: {0}")]
    Request(#[from] reqwest::Error),

    /// The storage service rejected the upload
    #[error("upload rejected: HTTP {status}: {body}")]
    UploadRejected {
        /// HTTP status code returned by the storage service
        status: u16,
        /// Response body returned by the storage service
        body: String,
    },
}
