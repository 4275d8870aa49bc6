//! API integration tests
//!
//! Requests go through the full router with an in-memory platform behind
//! the connector.

mod common;

use std::sync::{Arc, Mutex};

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use common::{settings, FakePlatform};
use platform_onboard::api::server::{ApiConfig, AppState, Connector};
use platform_onboard::api::router;
use platform_onboard::config::Settings;
use platform_onboard::excel::TemplateWriter;
use platform_onboard::remote::routes;
use platform_onboard::types::Entity;
use platform_onboard::{OnboardResult, PlatformClient};
use serde_json::Value;
use tower::ServiceExt;

const BOUNDARY: &str = "onboard-test-boundary";

/// A multipart form part: field name, optional file name, content.
struct Part<'a> {
    name: &'a str,
    file_name: Option<&'a str>,
    content: Vec<u8>,
}

fn text_part<'a>(name: &'a str, value: &str) -> Part<'a> {
    Part {
        name,
        file_name: None,
        content: value.as_bytes().to_vec(),
    }
}

fn file_part(content: Vec<u8>) -> Part<'static> {
    Part {
        name: "file",
        file_name: Some("onboarding.xlsx"),
        content,
    }
}

fn multipart_body(parts: Vec<Part<'_>>) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        match part.file_name {
            Some(file_name) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        part.name, file_name
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
            }
            None => {
                body.extend_from_slice(
                    format!("Content-Disposition: form-data; name=\"{}\"\r\n\r\n", part.name)
                        .as_bytes(),
                );
            }
        }
        body.extend_from_slice(&part.content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

fn upload(uri: &str, parts: Vec<Part<'_>>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(multipart_body(parts)))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// App wired to `platform`; every connected session token is recorded.
fn app(platform: &FakePlatform, tokens: Arc<Mutex<Vec<Option<String>>>>) -> axum::Router {
    let platform = platform.clone();
    let connector: Connector = Arc::new(move |s: &Settings| -> OnboardResult<PlatformClient> {
        tokens.lock().unwrap().push(s.session.login_token.clone());
        Ok(platform.client(s))
    });
    let mut server_settings = settings();
    server_settings.session.login_token = None;
    router(Arc::new(AppState::with_connector(server_settings, connector)))
}

fn workbook_bytes() -> Vec<u8> {
    TemplateWriter::new()
        .with_rows(Entity::UnitGroup, vec![vec!["Flow", "Volumetric flow"]])
        .with_rows(Entity::Industry, vec![vec!["Water", "Water treatment"]])
        .to_bytes()
        .unwrap()
}

// ═══════════════════════════════════════════════════════════════════════════
// CONFIG AND INFO ENDPOINTS
// ═══════════════════════════════════════════════════════════════════════════

#[test]
fn test_config_default() {
    let config = ApiConfig::default();
    assert_eq!(config.host, "127.0.0.1");
    assert_eq!(config.port, 8080);
}

#[tokio::test]
async fn test_health_endpoint() {
    let app = app(&FakePlatform::new(), Arc::default());
    let response = app
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"]["status"], "healthy");
}

#[tokio::test]
async fn test_root_lists_endpoints() {
    let app = app(&FakePlatform::new(), Arc::default());
    let response = app
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let body = json_body(response).await;
    let paths: Vec<&str> = body["data"]["endpoints"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(|e| e["path"].as_str())
        .collect();
    assert!(paths.contains(&"/api/v1/migrate"));
    assert!(paths.contains(&"/api/v1/inspect"));
}

#[tokio::test]
async fn test_version_endpoint() {
    let app = app(&FakePlatform::new(), Arc::default());
    let response = app
        .oneshot(Request::get("/version").body(Body::empty()).unwrap())
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
}

// ═══════════════════════════════════════════════════════════════════════════
// MIGRATE
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_migrate_runs_pipeline_and_returns_log() {
    let platform = FakePlatform::new();
    let tokens = Arc::new(Mutex::new(Vec::new()));
    let app = app(&platform, Arc::clone(&tokens));

    let response = app
        .oneshot(upload(
            "/api/v1/migrate",
            vec![file_part(workbook_bytes()), text_part("login_token", "form-token")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], true, "{}", body);
    assert_eq!(body["data"]["file_name"], "onboarding.xlsx");
    let logs: Vec<&str> = body["data"]["logs"]
        .as_array()
        .unwrap()
        .iter()
        .filter_map(Value::as_str)
        .collect();
    assert!(logs.contains(&"Created unit groups: Flow"), "{:?}", logs);
    assert!(logs.contains(&"Created industries: Water"), "{:?}", logs);
    assert_eq!(platform.calls_to(routes::SAVE_UNIT_GROUP).len(), 1);
    assert_eq!(*tokens.lock().unwrap(), vec![Some("form-token".to_string())]);
}

#[tokio::test]
async fn test_migrate_takes_token_from_cookie() {
    let platform = FakePlatform::new();
    let tokens = Arc::new(Mutex::new(Vec::new()));
    let app = app(&platform, Arc::clone(&tokens));
    let cookie_name = Settings::default().session.cookie_name;

    let mut request = upload("/api/v1/migrate", vec![file_part(workbook_bytes())]);
    request.headers_mut().insert(
        header::COOKIE,
        format!("theme=dark; {}=cookie-token", cookie_name).parse().unwrap(),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(*tokens.lock().unwrap(), vec![Some("cookie-token".to_string())]);
}

#[tokio::test]
async fn test_migrate_honours_entity_selection() {
    let platform = FakePlatform::new();
    let app = app(&platform, Arc::default());

    let response = app
        .oneshot(upload(
            "/api/v1/migrate",
            vec![file_part(workbook_bytes()), text_part("entities", "industry")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert!(platform.calls_to(routes::SAVE_UNIT_GROUP).is_empty());
    assert_eq!(platform.calls_to(routes::CREATE_INDUSTRY).len(), 1);
}

#[tokio::test]
async fn test_migrate_reports_failed_run() {
    let platform = FakePlatform::with_state(|s| s.fail_route = Some(routes::SAVE_UNIT_GROUP.to_string()));
    let app = app(&platform, Arc::default());

    let response = app
        .oneshot(upload("/api/v1/migrate", vec![file_part(workbook_bytes())]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["data"]["success"], false);
    let error = body["error"].as_str().unwrap();
    assert!(error.starts_with("Error while automating unit groups"), "{}", error);
}

#[tokio::test]
async fn test_migrate_without_file_is_bad_request() {
    let app = app(&FakePlatform::new(), Arc::default());

    let response = app
        .oneshot(upload("/api/v1/migrate", vec![text_part("entities", "unit")]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_body(response).await;
    assert!(body["error"].as_str().unwrap().contains("'file'"));
}

#[tokio::test]
async fn test_migrate_rejects_unknown_entity() {
    let app = app(&FakePlatform::new(), Arc::default());

    let response = app
        .oneshot(upload(
            "/api/v1/migrate",
            vec![file_part(workbook_bytes()), text_part("entities", "widgets")],
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_migrate_rejects_non_workbook_upload() {
    let platform = FakePlatform::new();
    let app = app(&platform, Arc::default());

    let response = app
        .oneshot(upload("/api/v1/migrate", vec![file_part(b"plain text".to_vec())]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(platform.calls().is_empty());
}

// ═══════════════════════════════════════════════════════════════════════════
// INSPECT
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_inspect_counts_records_without_remote_calls() {
    let platform = FakePlatform::new();
    let app = app(&platform, Arc::default());

    let response = app
        .oneshot(upload("/api/v1/inspect", vec![file_part(workbook_bytes())]))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["data"]["valid"], true);
    let sheets = body["data"]["sheets"].as_array().unwrap();
    assert_eq!(sheets.len(), Entity::DEFAULT_ORDER.len());
    assert_eq!(sheets[0]["entity"], "unit_group");
    assert_eq!(sheets[0]["records"], 1);
    assert!(platform.calls().is_empty());
}

#[tokio::test]
async fn test_inspect_reports_invalid_workbook() {
    let app = app(&FakePlatform::new(), Arc::default());
    let bytes = TemplateWriter::new()
        .with_rows(Entity::Industry, vec![vec!["Water", ""]])
        .to_bytes()
        .unwrap();

    let response = app
        .oneshot(upload("/api/v1/inspect", vec![file_part(bytes)]))
        .await
        .unwrap();

    let body = json_body(response).await;
    assert_eq!(body["data"]["valid"], false);
    let message = body["data"]["message"].as_str().unwrap();
    assert!(message.contains("Description is missing in row number 2"), "{}", message);
}
