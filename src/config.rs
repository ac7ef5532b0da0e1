//! Configuration types for poke-report

use crate::error::{Error, Result};
use crate::storage::StorageConnectionString;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use url::Url;

/// Environment variable naming the status API base URL
pub const ENV_DOMAIN: &str = "DOMAIN";
/// Environment variable holding the Azure storage connection string
pub const ENV_STORAGE_CONNECTION_STRING: &str = "AZURE_STORAGE_CONNECTION_STRING";
/// Environment variable naming the blob container reports are uploaded to
pub const ENV_BLOB_CONTAINER_NAME: &str = "BLOB_CONTAINER_NAME";
/// Environment variable naming the storage account used in public report URLs
pub const ENV_STORAGE_ACCOUNT_NAME: &str = "STORAGE_ACCOUNT_NAME";
/// Environment variable overriding the catalog API base URL (optional)
pub const ENV_POKEAPI_BASE_URL: &str = "POKEAPI_BASE_URL";

/// Default base URL for the PokeAPI catalog
pub const DEFAULT_CATALOG_BASE_URL: &str = "https://pokeapi.co/api/v2";

/// Configuration for the report generator
///
/// All settings are required except `catalog_base_url`, which defaults to
/// the public PokeAPI. Construct with [`Config::from_env`] in a deployed
/// worker, or build the struct directly (e.g., deserialized from JSON).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the status API that tracks report requests
    pub domain: Url,

    /// Azure storage connection string used to authenticate blob uploads
    pub storage_connection_string: String,

    /// Name of the blob container reports are uploaded to
    pub container_name: String,

    /// Storage account name used when building public report URLs
    pub storage_account_name: String,

    /// Base URL of the catalog API (default: public PokeAPI)
    #[serde(default = "default_catalog_base_url")]
    pub catalog_base_url: Url,
}

impl Config {
    /// Load configuration from the process environment.
    ///
    /// Reads `DOMAIN`, `AZURE_STORAGE_CONNECTION_STRING`,
    /// `BLOB_CONTAINER_NAME` and `STORAGE_ACCOUNT_NAME` (all required) plus
    /// the optional `POKEAPI_BASE_URL` override, then validates the result.
    pub fn from_env() -> Result<Self> {
        Self::from_vars(std::env::vars())
    }

    /// Build configuration from an explicit set of environment-style
    /// key/value pairs.
    ///
    /// This is what [`Config::from_env`] delegates to; tests use it to avoid
    /// mutating the process environment.
    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut vars: HashMap<String, String> = vars.into_iter().collect();

        let domain_raw = require_var(&mut vars, ENV_DOMAIN)?;
        let domain = parse_url_var(ENV_DOMAIN, &domain_raw)?;

        let storage_connection_string = require_var(&mut vars, ENV_STORAGE_CONNECTION_STRING)?;
        let container_name = require_var(&mut vars, ENV_BLOB_CONTAINER_NAME)?;
        let storage_account_name = require_var(&mut vars, ENV_STORAGE_ACCOUNT_NAME)?;

        let catalog_base_url = match vars.remove(ENV_POKEAPI_BASE_URL) {
            Some(raw) if !raw.trim().is_empty() => parse_url_var(ENV_POKEAPI_BASE_URL, &raw)?,
            _ => default_catalog_base_url(),
        };

        let config = Self {
            domain,
            storage_connection_string,
            container_name,
            storage_account_name,
            catalog_base_url,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// Checks URL schemes, required names and that the storage connection
    /// string parses, so misconfiguration surfaces at startup instead of on
    /// the first upload.
    pub fn validate(&self) -> Result<()> {
        if !matches!(self.domain.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!("{ENV_DOMAIN} must be an http(s) URL, got '{}'", self.domain),
                key: Some(ENV_DOMAIN.to_string()),
            });
        }
        if !matches!(self.catalog_base_url.scheme(), "http" | "https") {
            return Err(Error::Config {
                message: format!(
                    "{ENV_POKEAPI_BASE_URL} must be an http(s) URL, got '{}'",
                    self.catalog_base_url
                ),
                key: Some(ENV_POKEAPI_BASE_URL.to_string()),
            });
        }
        if self.container_name.trim().is_empty() {
            return Err(Error::Config {
                message: format!("{ENV_BLOB_CONTAINER_NAME} must not be empty"),
                key: Some(ENV_BLOB_CONTAINER_NAME.to_string()),
            });
        }
        if self.storage_account_name.trim().is_empty() {
            return Err(Error::Config {
                message: format!("{ENV_STORAGE_ACCOUNT_NAME} must not be empty"),
                key: Some(ENV_STORAGE_ACCOUNT_NAME.to_string()),
            });
        }
        StorageConnectionString::parse(&self.storage_connection_string).map_err(|e| {
            Error::Config {
                message: format!("{ENV_STORAGE_CONNECTION_STRING} is invalid: {e}"),
                key: Some(ENV_STORAGE_CONNECTION_STRING.to_string()),
            }
        })?;
        Ok(())
    }

    /// Public URL a completed report is reachable at.
    ///
    /// Built from the storage account name, so it stays correct even when
    /// uploads go through a non-public endpoint (e.g., a private link).
    pub fn public_blob_url(&self, blob_name: &str) -> String {
        format!(
            "https://{}.blob.core.windows.net/{}/{}",
            self.storage_account_name, self.container_name, blob_name
        )
    }

    /// Status API base with any trailing slash removed, ready for joining
    pub(crate) fn status_api_base(&self) -> String {
        self.domain.as_str().trim_end_matches('/').to_string()
    }

    /// Catalog API base with any trailing slash removed, ready for joining
    pub(crate) fn catalog_api_base(&self) -> String {
        self.catalog_base_url
            .as_str()
            .trim_end_matches('/')
            .to_string()
    }
}

fn require_var(vars: &mut HashMap<String, String>, key: &str) -> Result<String> {
    match vars.remove(key) {
        Some(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(Error::Config {
            message: format!("{key} is not set"),
            key: Some(key.to_string()),
        }),
    }
}

fn parse_url_var(key: &str, raw: &str) -> Result<Url> {
    Url::parse(raw).map_err(|e| Error::Config {
        message: format!("{key} is not a valid URL ('{raw}'): {e}"),
        key: Some(key.to_string()),
    })
}

// Default value functions
fn default_catalog_base_url() -> Url {
    match Url::parse(DEFAULT_CATALOG_BASE_URL) {
        Ok(url) => url,
        Err(_) => unreachable!("DEFAULT_CATALOG_BASE_URL must parse"),
    }
}
