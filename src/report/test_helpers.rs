//! Shared test helpers for exercising the report pipeline against wiremock.

use crate::config::{
    Config, ENV_BLOB_CONTAINER_NAME, ENV_DOMAIN, ENV_POKEAPI_BASE_URL,
    ENV_STORAGE_ACCOUNT_NAME, ENV_STORAGE_CONNECTION_STRING,
};
use crate::error::StorageError;
use crate::storage::ArtifactStore;
use crate::types::CatalogEntry;
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Connection string with a decodable account key; never actually contacted
/// because report tests run with a store override.
pub(crate) const TEST_CONNECTION_STRING: &str = "DefaultEndpointsProtocol=https;AccountName=testaccount;AccountKey=dGVzdC1hY2NvdW50LWtleQ==;EndpointSuffix=core.windows.net";

/// Config pointing both the status API and the catalog at `server`.
pub(crate) fn test_config(server: &MockServer) -> Config {
    Config::from_vars(vec![
        (ENV_DOMAIN.to_string(), server.uri()),
        (
            ENV_STORAGE_CONNECTION_STRING.to_string(),
            TEST_CONNECTION_STRING.to_string(),
        ),
        (ENV_BLOB_CONTAINER_NAME.to_string(), "reports".to_string()),
        (ENV_STORAGE_ACCOUNT_NAME.to_string(), "reportsacct".to_string()),
        (ENV_POKEAPI_BASE_URL.to_string(), server.uri()),
    ])
    .unwrap()
}

/// One captured upload from a [`MemoryStore`].
pub(crate) struct StoredArtifact {
    pub(crate) name: String,
    pub(crate) content_type: String,
    pub(crate) bytes: Vec<u8>,
}

/// Artifact store that captures uploads in memory instead of hitting Azure.
#[derive(Clone, Default)]
pub(crate) struct MemoryStore {
    pub(crate) uploads: Arc<Mutex<Vec<StoredArtifact>>>,
}

impl MemoryStore {
    /// The single upload a happy-path test is expected to have produced.
    pub(crate) fn only_upload(&self) -> StoredArtifact {
        let mut uploads = self.uploads.lock().unwrap();
        assert_eq!(uploads.len(), 1, "expected exactly one upload");
        uploads.remove(0)
    }

    pub(crate) fn upload_count(&self) -> usize {
        self.uploads.lock().unwrap().len()
    }
}

#[async_trait]
impl ArtifactStore for MemoryStore {
    async fn put(
        &self,
        name: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<(), StorageError> {
        self.uploads.lock().unwrap().push(StoredArtifact {
            name: name.to_string(),
            content_type: content_type.to_string(),
            bytes,
        });
        Ok(())
    }
}

/// Artifact store that rejects every upload, for failure-path tests.
pub(crate) struct RejectingStore;

#[async_trait]
impl ArtifactStore for RejectingStore {
    async fn put(
        &self,
        _name: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<(), StorageError> {
        Err(StorageError::UploadRejected {
            status: 403,
            body: "forbidden".to_string(),
        })
    }
}

/// Mount the job descriptor lookup for `id`, answering with `entity_type`.
pub(crate) async fn mount_job_descriptor(server: &MockServer, id: i64, entity_type: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/request/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": id, "type": entity_type}
        ])))
        .mount(server)
        .await;
}

/// Mount a PUT `/api/request` mock that accepts every status update.
pub(crate) async fn mount_any_status_update(server: &MockServer) {
    Mock::given(method("PUT"))
        .and(path("/api/request"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
        .mount(server)
        .await;
}

/// Detail record for `name` with fixed stats, two abilities and a species
/// link back to `base`.
pub(crate) fn detail_body(name: &str, base: &str) -> serde_json::Value {
    serde_json::json!({
        "height": 7,
        "weight": 69,
        "sprites": {"front_default": format!("{base}/sprites/{name}.png")},
        "species": {"name": name, "url": format!("{base}/pokemon-species/{name}")},
        "types": [{"type": {"name": "fire"}}],
        "stats": [
            {"base_stat": 45, "stat": {"name": "hp"}},
            {"base_stat": 65, "stat": {"name": "speed"}}
        ],
        "abilities": [
            {"ability": {"name": "blaze"}},
            {"ability": {"name": "solar-power"}}
        ]
    })
}

/// Mount the whole catalog side for `entity_type`: the type listing plus a
/// detail and species endpoint for every name.
pub(crate) async fn mount_catalog(server: &MockServer, entity_type: &str, names: &[&str]) {
    mount_listing(server, entity_type, names).await;
    for name in names {
        mount_detail(server, name).await;
        mount_species(server, name, "generation-i").await;
    }
}

/// Mount only the type listing, with detail URLs pointing back at `server`.
pub(crate) async fn mount_listing(server: &MockServer, entity_type: &str, names: &[&str]) {
    let base = server.uri();
    let slots: Vec<serde_json::Value> = names
        .iter()
        .map(|name| {
            serde_json::json!({
                "pokemon": {"name": name, "url": format!("{base}/pokemon/{name}")}
            })
        })
        .collect();
    Mock::given(method("GET"))
        .and(path(format!("/type/{entity_type}")))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"pokemon": slots})),
        )
        .mount(server)
        .await;
}

/// Mount the detail endpoint for one entry.
pub(crate) async fn mount_detail(server: &MockServer, name: &str) {
    let base = server.uri();
    Mock::given(method("GET"))
        .and(path(format!("/pokemon/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(detail_body(name, &base)))
        .mount(server)
        .await;
}

/// Mount the species endpoint for one entry.
pub(crate) async fn mount_species(server: &MockServer, name: &str, generation: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/pokemon-species/{name}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "generation": {"name": generation}
        })))
        .mount(server)
        .await;
}

/// Catalog entries with predictable names, for sampling tests.
pub(crate) fn entries(n: usize) -> Vec<CatalogEntry> {
    (0..n)
        .map(|i| CatalogEntry {
            name: format!("poke-{i}"),
            detail_url: format!("https://catalog.example/pokemon/{i}"),
        })
        .collect()
}
