//! Integration tests for the state read/write endpoints.

mod common;

use axum::http::{Method, StatusCode};
use serde_json::json;

use comanda_server::seed::SeedData;
use comanda_server::store::{Collection, MemoryRemoteStore};

use common::{get, json_request, send, test_app};

#[tokio::test]
async fn get_data_seeds_an_empty_remote_store() {
    let store = MemoryRemoteStore::new();
    let app = test_app(&store);

    let (status, body) = send(app, get("/data")).await;

    assert_eq!(status, StatusCode::OK);
    let seeds = SeedData::default();
    assert_eq!(
        body.get("products").unwrap(),
        &serde_json::to_value(&seeds.products).unwrap()
    );
    assert_eq!(
        body.get("users").unwrap(),
        &serde_json::to_value(&seeds.users).unwrap()
    );
    assert_eq!(body.get("orders").unwrap(), &json!([]));

    // The seed payloads were persisted, not just served.
    assert_eq!(store.rows(Collection::Products).len(), seeds.products.len());
    assert_eq!(store.rows(Collection::Users).len(), seeds.users.len());
    assert_eq!(store.rows(Collection::Settings).len(), 1);
}

#[tokio::test]
async fn get_data_keeps_existing_remote_state() {
    let store = MemoryRemoteStore::new();
    store.put(
        Collection::Products,
        vec![json!({"id": 7, "name": "Pandebono", "price": 1.2})],
    );
    store.put(Collection::Settings, vec![json!({"id": 1, "currency": "USD"})]);
    let app = test_app(&store);

    let (status, body) = send(app, get("/data")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body.get("products").unwrap(),
        &json!([{"id": 7, "name": "Pandebono", "price": 1.2}])
    );
    assert_eq!(
        body.get("settings").unwrap().get("currency"),
        Some(&json!("USD"))
    );
    // Existing products were not re-seeded.
    assert_eq!(store.rows(Collection::Products).len(), 1);
}

#[tokio::test]
async fn get_data_degrades_to_defaults_on_read_failure() {
    let store = MemoryRemoteStore::new();
    store.fail_reads(Collection::Users);
    let app = test_app(&store);

    let (status, body) = send(app, get("/data")).await;

    // Degraded but never empty-handed: full default body under a 500.
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let seeds = SeedData::default();
    assert_eq!(
        body.get("products").unwrap(),
        &serde_json::to_value(&seeds.products).unwrap()
    );
    assert_eq!(body.get("orders").unwrap(), &json!([]));
}

#[tokio::test]
async fn post_data_touches_only_the_collections_present() {
    let store = MemoryRemoteStore::new();
    store.put(Collection::Products, vec![json!({"id": 1, "name": "Pan"})]);
    let app = test_app(&store);

    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/data",
            &json!({"settings": {"id": 1, "currency": "EUR"}}),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "success"}));
    // Products were left alone; settings were upserted.
    assert_eq!(
        store.rows(Collection::Products),
        vec![json!({"id": 1, "name": "Pan"})]
    );
    assert_eq!(
        store.rows(Collection::Settings),
        vec![json!({"id": 1, "currency": "EUR"})]
    );
}

#[tokio::test]
async fn post_data_reports_uniform_failure_and_aborts_remaining_upserts() {
    let store = MemoryRemoteStore::new();
    store.fail_writes(Collection::Users);
    let app = test_app(&store);

    let (status, body) = send(
        app,
        json_request(
            Method::POST,
            "/data",
            &json!({
                "products": [{"id": 1, "name": "Pan"}],
                "users": [{"id": 1, "name": "Ana", "email": "ana@x.co", "role": "client"}],
                "orders": [{"id": 1, "total": 10}],
            }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body.get("status"), Some(&json!("error")));
    // No hint of which collection failed.
    assert_eq!(body.get("message"), Some(&json!("Failed to write data")));

    // Fail-fast: products (written first) landed, orders were never
    // attempted.
    assert_eq!(store.rows(Collection::Products).len(), 1);
    assert!(store.rows(Collection::Orders).is_empty());
}

#[tokio::test]
async fn post_then_get_roundtrip() {
    let store = MemoryRemoteStore::new();
    store.put(Collection::Settings, vec![json!({"id": 1})]);
    store.put(Collection::Products, vec![json!({"id": 1, "name": "Pan"})]);
    let app = test_app(&store);

    let (status, _) = send(
        app.clone(),
        json_request(
            Method::POST,
            "/data",
            &json!({"products": [{"id": 1, "name": "Pan integral"}, {"id": 2, "name": "Queso"}]}),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = send(app, get("/data")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body.get("products").unwrap(),
        &json!([{"id": 1, "name": "Pan integral"}, {"id": 2, "name": "Queso"}])
    );
}
