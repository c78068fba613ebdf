//! HTTP API tests.
//!
//! Requests are sent straight into the router; jobs run against the mock
//! object store, archiver and notifier from the core crate.

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use archivist_core::{
    testing::{fixtures, MockArchiver, MockObjectStore},
    AuthConfig, Config, JobProcessor, NotificationDispatcher, NotifierRegistry, ProcessorConfig,
    ScratchConfig, SharedSecretAuthenticator,
};
use archivist_server::{api::create_router, state::AppState};

struct TestApp {
    router: Router,
    store: MockObjectStore,
    archiver: MockArchiver,
    _scratch_root: TempDir,
}

fn create_test_app() -> TestApp {
    let scratch_root = TempDir::new().unwrap();
    let store = MockObjectStore::new();
    store.insert(fixtures::SOURCES[0], vec![b'a'; 600]);
    store.insert(fixtures::SOURCES[1], vec![b'b'; 400]);
    let archiver = MockArchiver::new().with_archive_bytes(400);

    let scratch = ScratchConfig::default().with_root(scratch_root.path().to_path_buf());
    let processor = JobProcessor::new(
        Arc::new(SharedSecretAuthenticator::new(fixtures::SECRET.to_string())),
        Arc::new(store.clone()),
        Arc::new(archiver.clone()),
        NotificationDispatcher::new(Arc::new(NotifierRegistry::new()), 10),
        scratch.clone(),
        ProcessorConfig::default(),
    );

    let config = Config {
        auth: AuthConfig {
            secret_token: Some(fixtures::SECRET.to_string()),
        },
        scratch,
        ..Config::default()
    };

    let state = Arc::new(AppState::new(config, Arc::new(processor)));
    TestApp {
        router: create_router(state),
        store,
        archiver,
        _scratch_root: scratch_root,
    }
}

async fn post_job(router: Router, body: String) -> (StatusCode, Value) {
    let response = router
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/jobs")
                .header("content-type", "application/json")
                .body(Body::from(body))
                .unwrap(),
        )
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, serde_json::from_slice(&bytes).unwrap())
}

async fn get_text(router: Router, uri: &str) -> (StatusCode, String) {
    let response = router
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();

    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

#[tokio::test]
async fn test_health() {
    let app = create_test_app();
    let (status, body) = get_text(app.router, "/api/v1/health").await;

    assert_eq!(status, StatusCode::OK);
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["status"], "ok");
}

#[tokio::test]
async fn test_config_redacts_secret() {
    let app = create_test_app();
    let (status, body) = get_text(app.router, "/api/v1/config").await;

    assert_eq!(status, StatusCode::OK);
    assert!(!body.contains(fixtures::SECRET));
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["auth"]["secret_configured"], true);
}

#[tokio::test]
async fn test_submit_job_success() {
    let app = create_test_app();
    let event = serde_json::to_string(&fixtures::job_event()).unwrap();

    let (status, body) = post_job(app.router, event).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["job_id"], "job-1");
    assert_eq!(body["source_bytes"], 1000);
    assert_eq!(body["archive_bytes"], 400);
    assert_eq!(body["compression_ratio"], "60.00");
    assert_eq!(app.store.uploads().len(), 1);
    assert_eq!(app.store.uploads()[0].address, fixtures::DESTINATION);
}

#[tokio::test]
async fn test_submit_job_wrong_secret() {
    let app = create_test_app();
    let mut event = fixtures::job_event();
    event.auth = "wrong".to_string();

    let (status, body) = post_job(app.router, serde_json::to_string(&event).unwrap()).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["stage"], "authenticate");
    assert_eq!(app.store.get_count(), 0);
}

#[tokio::test]
async fn test_submit_job_malformed_json() {
    let app = create_test_app();

    let (status, body) = post_job(app.router, "{not json".to_string()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["stage"].is_null());
    assert!(body["error"].as_str().unwrap().contains("Malformed"));
}

#[tokio::test]
async fn test_submit_job_bad_address() {
    let app = create_test_app();
    let mut event = fixtures::job_event();
    event.data.files = vec!["no-separator".to_string()];

    let (status, body) = post_job(app.router, serde_json::to_string(&event).unwrap()).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["stage"], "parse");
}

#[tokio::test]
async fn test_submit_job_download_failure() {
    let app = create_test_app();
    app.store.fail_get(fixtures::SOURCES[1], "access denied");
    let event = serde_json::to_string(&fixtures::job_event()).unwrap();

    let (status, body) = post_job(app.router, event).await;

    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["stage"], "download");
    assert_eq!(app.archiver.run_count(), 0);
    assert!(app.store.uploads().is_empty());
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let app = create_test_app();
    let event = json!({ "auth": "wrong", "data": fixtures::job_payload(&fixtures::SOURCES, fixtures::DESTINATION) });
    let (status, _) = post_job(app.router.clone(), event.to_string()).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = get_text(app.router, "/metrics").await;

    assert_eq!(status, StatusCode::OK);
    assert!(body.contains("archivist_jobs_total"));
    assert!(body.contains("archivist_http_requests_total"));
}
