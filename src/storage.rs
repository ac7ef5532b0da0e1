//! Blob storage upload for generated reports.
//!
//! Reports are uploaded with a single Put Blob request signed with the
//! storage account's Shared Key. The connection string decides where the
//! request goes; a `BlobEndpoint` override routes uploads to Azurite or a
//! mock server while leaving the public report URL untouched.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use chrono::Utc;
use hmac::{Hmac, Mac};
use sha2::Sha256;
use url::Url;

use crate::config::Config;
use crate::error::StorageError;

type HmacSha256 = Hmac<Sha256>;

/// Storage service API version sent with every upload
const STORAGE_API_VERSION: &str = "2021-08-06";

/// RFC 1123 date layout required by the x-ms-date header
const RFC1123_FORMAT: &str = "%a, %d %b %Y %H:%M:%S GMT";

// Well-known Azurite development account (UseDevelopmentStorage=true)
const DEV_ACCOUNT_NAME: &str = "devstoreaccount1";
const DEV_ACCOUNT_KEY: &str =
    "Eby8vdM02xNOcqFlqUwJPLlmEtlCDXJ1OUzFT50uSRZ6IFsuFq2UVErCz4I6tq/K1SZFPTOtr/KBHBeksoGMGw==";
const DEV_BLOB_ENDPOINT: &str = "http://127.0.0.1:10000/devstoreaccount1";

/// Destination for generated report artifacts.
///
/// Implementations must overwrite an existing artifact of the same name;
/// regenerating a report reuses its blob name.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    /// Upload `bytes` under `name` with the given content type.
    async fn put(&self, name: &str, content_type: &str, bytes: Vec<u8>)
    -> Result<(), StorageError>;
}

/// Parsed Azure storage connection string
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageConnectionString {
    /// Storage account name
    pub account_name: String,
    /// Base64-encoded account key
    pub account_key: String,
    /// DNS suffix for service endpoints (default: "core.windows.net")
    pub endpoint_suffix: String,
    /// Explicit blob endpoint override (Azurite, private endpoints)
    pub blob_endpoint: Option<Url>,
}

impl StorageConnectionString {
    /// Parse a `Key=Value;Key=Value` connection string.
    ///
    /// `AccountName` and `AccountKey` are required unless
    /// `UseDevelopmentStorage=true` is present, which selects the well-known
    /// Azurite account. Unrecognized keys are ignored.
    pub fn parse(raw: &str) -> Result<Self, StorageError> {
        let mut account_name: Option<String> = None;
        let mut account_key: Option<String> = None;
        let mut endpoint_suffix: Option<String> = None;
        let mut blob_endpoint: Option<Url> = None;
        let mut use_development = false;

        for segment in raw.split(';') {
            let segment = segment.trim();
            if segment.is_empty() {
                continue;
            }
            let Some((key, value)) = segment.split_once('=') else {
                return Err(StorageError::ConnectionString(format!(
                    "segment '{segment}' has no '='"
                )));
            };
            match key {
                "AccountName" => account_name = Some(value.to_string()),
                "AccountKey" => account_key = Some(value.to_string()),
                "EndpointSuffix" => endpoint_suffix = Some(value.to_string()),
                "BlobEndpoint" => {
                    let url = Url::parse(value).map_err(|e| StorageError::InvalidUrl {
                        url: value.to_string(),
                        reason: e.to_string(),
                    })?;
                    blob_endpoint = Some(url);
                }
                "UseDevelopmentStorage" if value.eq_ignore_ascii_case("true") => {
                    use_development = true;
                }
                _ => {}
            }
        }

        if use_development {
            let endpoint =
                Url::parse(DEV_BLOB_ENDPOINT).map_err(|e| StorageError::InvalidUrl {
                    url: DEV_BLOB_ENDPOINT.to_string(),
                    reason: e.to_string(),
                })?;
            return Ok(Self {
                account_name: DEV_ACCOUNT_NAME.to_string(),
                account_key: DEV_ACCOUNT_KEY.to_string(),
                endpoint_suffix: "core.windows.net".to_string(),
                blob_endpoint: Some(endpoint),
            });
        }

        let account_name = account_name
            .filter(|name| !name.is_empty())
            .ok_or_else(|| StorageError::ConnectionString("AccountName is missing".to_string()))?;
        let account_key = account_key
            .filter(|key| !key.is_empty())
            .ok_or_else(|| StorageError::ConnectionString("AccountKey is missing".to_string()))?;

        Ok(Self {
            account_name,
            account_key,
            endpoint_suffix: endpoint_suffix.unwrap_or_else(|| "core.windows.net".to_string()),
            blob_endpoint,
        })
    }

    /// The blob service endpoint uploads are sent to.
    pub fn blob_endpoint(&self) -> Result<Url, StorageError> {
        if let Some(endpoint) = &self.blob_endpoint {
            return Ok(endpoint.clone());
        }
        let raw = format!("https://{}.blob.{}", self.account_name, self.endpoint_suffix);
        Url::parse(&raw).map_err(|e| StorageError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })
    }
}

/// Shared Key signer for storage requests
#[derive(Clone, Debug)]
struct SharedKeyCredential {
    account: String,
    key: Vec<u8>,
}

impl SharedKeyCredential {
    fn from_connection(connection: &StorageConnectionString) -> Result<Self, StorageError> {
        let key = BASE64
            .decode(connection.account_key.as_bytes())
            .map_err(|e| StorageError::InvalidAccountKey(e.to_string()))?;
        Ok(Self {
            account: connection.account_name.clone(),
            key,
        })
    }

    fn authorization(&self, string_to_sign: &str) -> Result<String, StorageError> {
        let mut mac = HmacSha256::new_from_slice(&self.key)
            .map_err(|e| StorageError::InvalidAccountKey(e.to_string()))?;
        mac.update(string_to_sign.as_bytes());
        let signature = BASE64.encode(mac.finalize().into_bytes());
        Ok(format!("SharedKey {}:{}", self.account, signature))
    }
}

/// Canonical string-to-sign for a Put Blob request.
///
/// Twelve standard header fields, the canonicalized x-ms headers in sorted
/// order, then the canonicalized resource (`/account` + URL path). A zero
/// Content-Length is signed as an empty string, per the 2015-02-21 and later
/// service versions.
pub(crate) fn put_blob_string_to_sign(
    account: &str,
    url: &Url,
    content_length: usize,
    content_type: &str,
    date: &str,
    version: &str,
) -> String {
    let length = if content_length == 0 {
        String::new()
    } else {
        content_length.to_string()
    };
    format!(
        "PUT\n\n\n{length}\n\n{content_type}\n\n\n\n\n\n\n\
         x-ms-blob-type:BlockBlob\nx-ms-date:{date}\nx-ms-version:{version}\n\
         /{account}{path}",
        path = url.path()
    )
}

/// Uploads report artifacts to Azure Blob Storage
#[derive(Clone, Debug)]
pub struct AzureBlobStore {
    http: reqwest::Client,
    endpoint: Url,
    container: String,
    credential: SharedKeyCredential,
}

impl AzureBlobStore {
    /// Build a store from the library configuration.
    pub fn from_config(config: &Config) -> Result<Self, StorageError> {
        let connection = StorageConnectionString::parse(&config.storage_connection_string)?;
        Self::new(&connection, &config.container_name)
    }

    /// Build a store for a parsed connection string and target container.
    pub fn new(connection: &StorageConnectionString, container: &str) -> Result<Self, StorageError> {
        Ok(Self {
            http: reqwest::Client::new(),
            endpoint: connection.blob_endpoint()?,
            container: container.to_string(),
            credential: SharedKeyCredential::from_connection(connection)?,
        })
    }

    fn blob_url(&self, name: &str) -> Result<Url, StorageError> {
        let raw = format!(
            "{}/{}/{}",
            self.endpoint.as_str().trim_end_matches('/'),
            self.container,
            name
        );
        Url::parse(&raw).map_err(|e| StorageError::InvalidUrl {
            url: raw,
            reason: e.to_string(),
        })
    }

    async fn put_blob(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), StorageError> {
        let url = self.blob_url(name)?;
        let date = Utc::now().format(RFC1123_FORMAT).to_string();
        let string_to_sign = put_blob_string_to_sign(
            &self.credential.account,
            &url,
            bytes.len(),
            content_type,
            &date,
            STORAGE_API_VERSION,
        );
        let authorization = self.credential.authorization(&string_to_sign)?;

        let response = self
            .http
            .put(url.clone())
            .header("Authorization", authorization)
            .header("x-ms-date", date)
            .header("x-ms-version", STORAGE_API_VERSION)
            .header("x-ms-blob-type", "BlockBlob")
            .header(reqwest::header::CONTENT_TYPE, content_type)
            .body(bytes)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let body = response.text().await.unwrap_or_default();
            tracing::warn!(url = %url, status, "blob upload rejected");
            return Err(StorageError::UploadRejected { status, body });
        }

        tracing::debug!(url = %url, "blob uploaded");
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for AzureBlobStore {
    async fn put(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), StorageError> {
        self.put_blob(name, content_type, bytes).await
    }
}
