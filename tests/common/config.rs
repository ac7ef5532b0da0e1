//! Test configuration helpers for pointing poke-report at mock services

use poke_report::Config;
use poke_report::config::{
    ENV_BLOB_CONTAINER_NAME, ENV_DOMAIN, ENV_POKEAPI_BASE_URL, ENV_STORAGE_ACCOUNT_NAME,
    ENV_STORAGE_CONNECTION_STRING,
};
use wiremock::MockServer;

/// Account name used throughout the E2E scenarios
pub const TEST_ACCOUNT: &str = "testaccount";

/// Container reports are uploaded to
pub const TEST_CONTAINER: &str = "reports";

/// Base64 of "test-account-key"
pub const TEST_ACCOUNT_KEY: &str = "dGVzdC1hY2NvdW50LWtleQ==";

/// Connection string whose blob endpoint points at `server`.
pub fn connection_string_for(server: &MockServer) -> String {
    format!(
        "DefaultEndpointsProtocol=http;AccountName={TEST_ACCOUNT};AccountKey={TEST_ACCOUNT_KEY};BlobEndpoint={}",
        server.uri()
    )
}

/// Config with every external surface (status API, catalog, blob endpoint)
/// pointed at `server`.
pub fn test_config(server: &MockServer) -> Config {
    Config::from_vars(vec![
        (ENV_DOMAIN.to_string(), server.uri()),
        (
            ENV_STORAGE_CONNECTION_STRING.to_string(),
            connection_string_for(server),
        ),
        (ENV_BLOB_CONTAINER_NAME.to_string(), TEST_CONTAINER.to_string()),
        (ENV_STORAGE_ACCOUNT_NAME.to_string(), TEST_ACCOUNT.to_string()),
        (ENV_POKEAPI_BASE_URL.to_string(), server.uri()),
    ])
    .expect("test config must be valid")
}

/// Public URL the status API is told about for `blob_name`.
///
/// Always built from the configured account name, independent of where the
/// upload actually went.
pub fn public_url(blob_name: &str) -> String {
    format!("https://{TEST_ACCOUNT}.blob.core.windows.net/{TEST_CONTAINER}/{blob_name}")
}
