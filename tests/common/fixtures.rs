//! Status API, catalog and blob endpoint fixtures served from wiremock

use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mount `GET /api/request/{id}` answering with one record of `entity_type`.
pub async fn mount_job_descriptor(server: &MockServer, id: i64, entity_type: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/api/request/{id}")))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            {"id": id, "type": entity_type, "status": "pending"}
        ])))
        .mount(server)
        .await;
}

/// Mount `PUT /api/request` accepting every status update.
pub async fn mount_status_updates(server: &MockServer) {
    Mock::given(method("PUT"))
        .and(path("/api/request"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"updated": true})),
        )
        .mount(server)
        .await;
}

/// Detail record for `name`. Height and weight derive from the name so rows
/// for different entries are distinguishable in the rendered CSV.
pub fn detail_body(name: &str, base: &str) -> serde_json::Value {
    let height = name.len() as i64;
    let weight = height * 10;
    serde_json::json!({
        "height": height,
        "weight": weight,
        "sprites": {"front_default": format!("{base}/sprites/{name}.png")},
        "species": {"name": name, "url": format!("{base}/pokemon-species/{name}")},
        "types": [{"type": {"name": "fire"}}],
        "stats": [
            {"base_stat": 52, "stat": {"name": "attack"}},
            {"base_stat": 43, "stat": {"name": "defense"}}
        ],
        "abilities": [{"ability": {"name": "blaze"}}]
    })
}

/// Mount the full catalog for `entity_type`: the type listing plus detail
/// and species endpoints for every name.
pub async fn mount_catalog(server: &MockServer, entity_type: &str, names: &[&str]) {
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

    for name in names {
        Mock::given(method("GET"))
            .and(path(format!("/pokemon/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(detail_body(name, &base)))
            .mount(server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/pokemon-species/{name}")))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "generation": {"name": "generation-i"}
            })))
            .mount(server)
            .await;
    }
}

/// Mount a failing type listing so the catalog soft-fails to empty.
pub async fn mount_catalog_outage(server: &MockServer, entity_type: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/type/{entity_type}")))
        .respond_with(ResponseTemplate::new(500).set_body_string("internal error"))
        .mount(server)
        .await;
}

/// Mount a Put Blob endpoint for `blob_name` in the reports container,
/// answering 201 Created.
pub async fn mount_blob_put(server: &MockServer, container: &str, blob_name: &str) {
    Mock::given(method("PUT"))
        .and(path(format!("/{container}/{blob_name}")))
        .respond_with(ResponseTemplate::new(201))
        .mount(server)
        .await;
}

/// The `status` fields of every status update the server received, in order.
pub async fn recorded_statuses(server: &MockServer) -> Vec<String> {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "PUT" && r.url.path() == "/api/request")
        .map(|r| {
            serde_json::from_slice::<serde_json::Value>(&r.body)
                .ok()
                .and_then(|body| body["status"].as_str().map(str::to_string))
                .unwrap_or_default()
        })
        .collect()
}

/// The bodies of every blob upload the server received, in order.
pub async fn recorded_blob_uploads(server: &MockServer, container: &str) -> Vec<Vec<u8>> {
    let prefix = format!("/{container}/");
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.method.as_str() == "PUT" && r.url.path().starts_with(&prefix))
        .map(|r| r.body.clone())
        .collect()
}
