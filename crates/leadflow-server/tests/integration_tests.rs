//! Integration tests for the HTTP API

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use leadflow_server::{
    config::ServerConfig,
    handlers::{create_router, AppState, HealthCheckResponse, RootResponse, ServiceInfo},
    schemas::{
        ContactResponse, ContactStatsResponse, LeadResponse, OperatorResponse, SourceResponse,
        WeightResponse,
    },
};
use leadflow_store::SqliteStore;
use serde::de::DeserializeOwned;
use serde_json::{json, Value};
use std::collections::BTreeMap;
use tower::ServiceExt; // for oneshot

/// Helper to create a router over a fresh in-memory database
fn create_test_app() -> Router {
    let store = SqliteStore::new(":memory:").unwrap();
    let state = AppState::new(store, ServiceInfo::from(&ServerConfig::default_dev_config()));
    create_router(state, "")
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Vec<u8>) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

async fn send_ok<T: DeserializeOwned>(app: &Router, method: &str, uri: &str, body: Option<Value>) -> T {
    let (status, bytes) = send(app, method, uri, body).await;
    assert_eq!(
        status,
        StatusCode::OK,
        "{} {} failed: {}",
        method,
        uri,
        String::from_utf8_lossy(&bytes)
    );
    serde_json::from_slice(&bytes).unwrap()
}

async fn create_operator(app: &Router, name: &str, max_load: u32) -> OperatorResponse {
    send_ok(
        app,
        "POST",
        "/operators",
        Some(json!({"name": name, "max_load": max_load})),
    )
    .await
}

async fn create_source(app: &Router, name: &str) -> SourceResponse {
    send_ok(app, "POST", "/sources", Some(json!({"name": name}))).await
}

async fn set_weights(app: &Router, source_id: i64, weights: &[(i64, u32)]) -> Vec<WeightResponse> {
    let operator_weights: Vec<Value> = weights
        .iter()
        .map(|(id, w)| json!({"operator_id": id, "weight": w}))
        .collect();
    send_ok(
        app,
        "POST",
        &format!("/sources/{}/distribution", source_id),
        Some(json!({ "operator_weights": operator_weights })),
    )
    .await
}

async fn register(app: &Router, external_id: &str, source_id: i64) -> ContactResponse {
    send_ok(
        app,
        "POST",
        "/contacts",
        Some(json!({"external_id": external_id, "source_id": source_id})),
    )
    .await
}

#[tokio::test]
async fn test_root_and_health() {
    let app = create_test_app();

    let root: RootResponse = send_ok(&app, "GET", "/", None).await;
    assert_eq!(root.message, "Leadflow API");
    assert_eq!(root.api, "/");

    let health: HealthCheckResponse = send_ok(&app, "GET", "/health", None).await;
    assert_eq!(health.status, "healthy");
}

#[tokio::test]
async fn test_operator_crud() {
    let app = create_test_app();

    let created = create_operator(&app, "Alice", 3).await;
    assert_eq!(created.name, "Alice");
    assert!(created.is_active);
    assert_eq!(created.current_load, Some(0));

    let patched: OperatorResponse = send_ok(
        &app,
        "PATCH",
        &format!("/operators/{}", created.id),
        Some(json!({"is_active": false})),
    )
    .await;
    assert!(!patched.is_active);
    assert_eq!(patched.max_load, 3);
    assert_eq!(patched.name, "Alice");

    let listed: Vec<OperatorResponse> = send_ok(&app, "GET", "/operators", None).await;
    assert_eq!(listed.len(), 1);

    let (status, _) = send(&app, "DELETE", &format!("/operators/{}", created.id), None).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _) = send(&app, "GET", &format!("/operators/{}", created.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, "DELETE", &format!("/operators/{}", created.id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_operator_validation() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/operators",
        Some(json!({"name": "Alice", "max_load": 0})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert!(error["error"].is_string());

    let (status, _) = send(&app, "POST", "/operators", Some(json!({"name": ""}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_duplicate_source_name_conflicts() {
    let app = create_test_app();
    create_source(&app, "telegram-bot").await;

    let (status, _) = send(&app, "POST", "/sources", Some(json!({"name": "telegram-bot"}))).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_distribution_policy_endpoints() {
    let app = create_test_app();
    let source = create_source(&app, "bot").await;
    let a = create_operator(&app, "A", 5).await;
    let b = create_operator(&app, "B", 5).await;

    let rows = set_weights(&app, source.id, &[(a.id, 3), (b.id, 1)]).await;
    assert_eq!(rows.len(), 2);
    assert!(rows.iter().all(|r| r.source_id == source.id));

    // Replacing drops rows not in the new policy
    set_weights(&app, source.id, &[(b.id, 7)]).await;
    let current: Vec<WeightResponse> =
        send_ok(&app, "GET", &format!("/sources/{}/distribution", source.id), None).await;
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].operator_id, b.id);
    assert_eq!(current[0].weight, 7);

    // Unknown operator leaves the policy unchanged
    let (status, _) = send(
        &app,
        "POST",
        &format!("/sources/{}/distribution", source.id),
        Some(json!({"operator_weights": [{"operator_id": a.id, "weight": 1}, {"operator_id": 999, "weight": 1}]})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let current: Vec<WeightResponse> =
        send_ok(&app, "GET", &format!("/sources/{}/distribution", source.id), None).await;
    assert_eq!(current.len(), 1);

    // Duplicate operator in one request
    let (status, _) = send(
        &app,
        "POST",
        &format!("/sources/{}/distribution", source.id),
        Some(json!({"operator_weights": [{"operator_id": a.id, "weight": 1}, {"operator_id": a.id, "weight": 2}]})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(&app, "GET", "/sources/999/distribution", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contact_assignment_and_capacity() {
    let app = create_test_app();
    let source = create_source(&app, "bot").await;
    let op = create_operator(&app, "Alice", 1).await;
    set_weights(&app, source.id, &[(op.id, 1)]).await;

    let first = register(&app, "ext-1", source.id).await;
    assert_eq!(first.operator_id, Some(op.id));
    assert_eq!(first.status, "active");
    assert_eq!(first.lead.external_id, "ext-1");
    assert_eq!(first.source.name, "bot");
    assert_eq!(first.operator.as_ref().map(|o| o.name.as_str()), Some("Alice"));

    let loaded: OperatorResponse = send_ok(&app, "GET", &format!("/operators/{}", op.id), None).await;
    assert_eq!(loaded.current_load, Some(1));

    // Saturated: stored, but unassigned
    let second = register(&app, "ext-2", source.id).await;
    assert_eq!(second.operator_id, None);
    assert!(second.operator.is_none());

    // Closing frees the slot
    let closed: ContactResponse =
        send_ok(&app, "POST", &format!("/contacts/{}/close", first.id), None).await;
    assert_eq!(closed.status, "closed");

    let third = register(&app, "ext-3", source.id).await;
    assert_eq!(third.operator_id, Some(op.id));
}

#[tokio::test]
async fn test_contact_for_unknown_source() {
    let app = create_test_app();

    let (status, body) = send(
        &app,
        "POST",
        "/contacts",
        Some(json!({"external_id": "ext-1", "source_id": 42})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let error: Value = serde_json::from_slice(&body).unwrap();
    assert!(error["error"].as_str().unwrap().contains("Source"));

    let leads: Vec<LeadResponse> = send_ok(&app, "GET", "/leads", None).await;
    assert!(leads.is_empty());
}

#[tokio::test]
async fn test_contact_validation() {
    let app = create_test_app();
    let source = create_source(&app, "bot").await;

    let (status, _) = send(
        &app,
        "POST",
        "/contacts",
        Some(json!({"external_id": "", "source_id": source.id})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, _) = send(
        &app,
        "POST",
        "/contacts",
        Some(json!({"external_id": "ext-1", "source_id": source.id, "email": "not-an-email"})),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_lead_is_reused_across_contacts() {
    let app = create_test_app();
    let source = create_source(&app, "bot").await;

    let first: ContactResponse = send_ok(
        &app,
        "POST",
        "/contacts",
        Some(json!({"external_id": "ext-42", "source_id": source.id, "phone": "+15550001"})),
    )
    .await;
    let second: ContactResponse = send_ok(
        &app,
        "POST",
        "/contacts",
        Some(json!({"external_id": "ext-42", "source_id": source.id, "phone": "+15550002"})),
    )
    .await;

    assert_eq!(first.lead_id, second.lead_id);
    assert_eq!(second.lead.phone.as_deref(), Some("+15550001"));

    let lead: LeadResponse = send_ok(&app, "GET", &format!("/leads/{}", first.lead_id), None).await;
    assert_eq!(lead.external_id, "ext-42");

    let history: Vec<ContactResponse> =
        send_ok(&app, "GET", &format!("/leads/{}/contacts", first.lead_id), None).await;
    assert_eq!(history.len(), 2);

    let (status, _) = send(&app, "GET", "/leads/999/contacts", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_contact_listing_filters() {
    let app = create_test_app();
    let bot = create_source(&app, "bot").await;
    let site = create_source(&app, "site").await;
    let op = create_operator(&app, "Alice", 10).await;
    set_weights(&app, bot.id, &[(op.id, 1)]).await;

    register(&app, "ext-1", bot.id).await;
    register(&app, "ext-2", bot.id).await;
    register(&app, "ext-3", site.id).await;

    let all: Vec<ContactResponse> = send_ok(&app, "GET", "/contacts", None).await;
    assert_eq!(all.len(), 3);

    let from_site: Vec<ContactResponse> =
        send_ok(&app, "GET", &format!("/contacts?source_id={}", site.id), None).await;
    assert_eq!(from_site.len(), 1);
    assert_eq!(from_site[0].operator_id, None);

    let assigned: Vec<ContactResponse> =
        send_ok(&app, "GET", &format!("/contacts?operator_id={}", op.id), None).await;
    assert_eq!(assigned.len(), 2);

    let page: Vec<ContactResponse> = send_ok(&app, "GET", "/contacts?skip=1&limit=1", None).await;
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].id, all[1].id);

    let (status, _) = send(&app, "GET", "/contacts/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stats() {
    let app = create_test_app();
    let bot = create_source(&app, "bot").await;
    let site = create_source(&app, "site").await;
    let alice = create_operator(&app, "Alice", 10).await;
    let bob = create_operator(&app, "Bob", 10).await;
    set_weights(&app, bot.id, &[(alice.id, 1)]).await;
    set_weights(&app, site.id, &[(bob.id, 1)]).await;

    register(&app, "ext-1", bot.id).await;
    register(&app, "ext-2", bot.id).await;
    register(&app, "ext-3", site.id).await;

    let stats: ContactStatsResponse = send_ok(&app, "GET", "/stats/contacts", None).await;
    assert_eq!(stats.total_contacts, 3);
    assert_eq!(stats.contacts_by_source["bot"], 2);
    assert_eq!(stats.contacts_by_source["site"], 1);
    assert_eq!(stats.contacts_by_operator["Alice"], 2);
    assert_eq!(stats.contacts_by_operator["Bob"], 1);

    let distribution: BTreeMap<String, BTreeMap<String, u64>> =
        send_ok(&app, "GET", "/stats/distribution", None).await;
    assert_eq!(distribution["bot"]["Alice"], 2);
    assert_eq!(distribution["site"]["Bob"], 1);
    assert!(!distribution["bot"].contains_key("Bob"));
}

#[tokio::test]
async fn test_stats_sum_operators_sharing_a_name() {
    let app = create_test_app();
    let bot = create_source(&app, "bot").await;
    let first = create_operator(&app, "Alice", 10).await;
    let second = create_operator(&app, "Alice", 10).await;

    set_weights(&app, bot.id, &[(first.id, 1)]).await;
    let contact = register(&app, "ext-1", bot.id).await;
    assert_eq!(contact.operator_id, Some(first.id));

    set_weights(&app, bot.id, &[(second.id, 1)]).await;
    let contact = register(&app, "ext-2", bot.id).await;
    assert_eq!(contact.operator_id, Some(second.id));

    let stats: ContactStatsResponse = send_ok(&app, "GET", "/stats/contacts", None).await;
    assert_eq!(stats.total_contacts, 2);
    assert_eq!(stats.contacts_by_operator.len(), 1);
    assert_eq!(stats.contacts_by_operator["Alice"], 2);

    let distribution: BTreeMap<String, BTreeMap<String, u64>> =
        send_ok(&app, "GET", "/stats/distribution", None).await;
    assert_eq!(distribution["bot"]["Alice"], stats.contacts_by_operator["Alice"]);
}

#[tokio::test]
async fn test_api_prefix() {
    let store = SqliteStore::new(":memory:").unwrap();
    let mut config = ServerConfig::default_dev_config();
    config.api_prefix = "/api/v1".to_string();
    let app = create_router(AppState::new(store, ServiceInfo::from(&config)), &config.api_prefix);

    let root: RootResponse = send_ok(&app, "GET", "/", None).await;
    assert_eq!(root.api, "/api/v1");

    let source: SourceResponse =
        send_ok(&app, "POST", "/api/v1/sources", Some(json!({"name": "bot"}))).await;
    let fetched: SourceResponse =
        send_ok(&app, "GET", &format!("/api/v1/sources/{}", source.id), None).await;
    assert_eq!(fetched.name, "bot");

    let (status, _) = send(&app, "GET", "/sources", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_file_backed_database_persists() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("leadflow.db");

    {
        let store = SqliteStore::new(&path).unwrap();
        let state = AppState::new(store, ServiceInfo::from(&ServerConfig::default_dev_config()));
        let app = create_router(state, "");
        create_source(&app, "bot").await;
    }

    let store = SqliteStore::new(&path).unwrap();
    let state = AppState::new(store, ServiceInfo::from(&ServerConfig::default_dev_config()));
    let app = create_router(state, "");
    let sources: Vec<SourceResponse> = send_ok(&app, "GET", "/sources", None).await;
    assert_eq!(sources.len(), 1);
}

#[test]
fn test_server_config_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("server.toml");
    std::fs::write(
        &path,
        r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            database_path = "leadflow.db"
            app_name = "Leadflow"
            api_prefix = "/api/v1"
        "#,
    )
    .unwrap();

    let config = ServerConfig::from_file(&path).unwrap();
    assert_eq!(config.bind_addr(), "0.0.0.0:9000");
    assert_eq!(config.api_prefix, "/api/v1");

    std::fs::write(
        &path,
        r#"
            bind_address = "0.0.0.0"
            bind_port = 9000
            database_path = "leadflow.db"
            app_name = "Leadflow"
            api_prefix = "/api/v1/"
        "#,
    )
    .unwrap();
    assert!(ServerConfig::from_file(&path).is_err());
}
