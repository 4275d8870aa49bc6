//! API request handlers
//!
//! Uploads arrive as multipart forms. Workbook parsing and the migration run
//! on a blocking worker; the platform client is blocking.

use std::sync::Arc;

use axum::{
    extract::{Multipart, State},
    http::{header::COOKIE, HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info};
use uuid::Uuid;

use super::server::AppState;
use crate::error::OnboardError;
use crate::excel::Workbook;
use crate::pipeline::{Pipeline, SheetRows};
use crate::types::Entity;

/// Standard API response wrapper
#[derive(Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub request_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: None,
            error: Some(message.into()),
        }
    }

    /// A response that carries data but reports failure.
    pub fn failed(data: T, message: impl Into<String>) -> Self {
        Self {
            success: false,
            request_id: Uuid::new_v4().to_string(),
            data: Some(data),
            error: Some(message.into()),
        }
    }
}

/// Root endpoint response
#[derive(Serialize)]
pub struct RootResponse {
    pub name: String,
    pub version: String,
    pub description: String,
    pub endpoints: Vec<EndpointInfo>,
}

#[derive(Serialize)]
pub struct EndpointInfo {
    pub path: String,
    pub method: String,
    pub description: String,
}

fn endpoint(path: &str, method: &str, description: &str) -> EndpointInfo {
    EndpointInfo {
        path: path.to_string(),
        method: method.to_string(),
        description: description.to_string(),
    }
}

/// GET / - Root info
pub async fn root(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let response = RootResponse {
        name: "Onboard API Server".to_string(),
        version: state.version.clone(),
        description: "Workbook to platform configuration migration".to_string(),
        endpoints: vec![
            endpoint("/health", "GET", "Health check endpoint"),
            endpoint("/version", "GET", "Get server version"),
            endpoint(
                "/api/v1/migrate",
                "POST",
                "Migrate an uploaded workbook (multipart: file, entities, include_hierarchy, login_token)",
            ),
            endpoint(
                "/api/v1/inspect",
                "POST",
                "Parse and validate an uploaded workbook without remote calls",
            ),
        ],
    };
    Json(ApiResponse::ok(response))
}

/// Health check response
#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub uptime_message: String,
}

/// GET /health - Health check
pub async fn health() -> impl IntoResponse {
    Json(ApiResponse::ok(HealthResponse {
        status: "healthy".to_string(),
        uptime_message: "Server is running".to_string(),
    }))
}

/// Version response
#[derive(Serialize)]
pub struct VersionResponse {
    pub version: String,
    pub features: Vec<String>,
}

/// GET /version - Server version
pub async fn version(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(ApiResponse::ok(VersionResponse {
        version: state.version.clone(),
        features: vec!["migrate".to_string(), "inspect".to_string()],
    }))
}

/// Fields read from an upload form.
#[derive(Debug, Default)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
    pub entities: Vec<Entity>,
    pub include_hierarchy: bool,
    pub login_token: Option<String>,
}

impl Upload {
    fn pipeline(&self) -> Pipeline {
        let pipeline = if self.entities.is_empty() {
            Pipeline::new()
        } else {
            Pipeline::with_steps(&self.entities)
        };
        if self.include_hierarchy {
            pipeline.include_hierarchy(true)
        } else {
            pipeline
        }
    }
}

fn parse_flag(raw: &str) -> bool {
    matches!(raw.trim().to_lowercase().as_str(), "true" | "yes" | "1" | "on")
}

fn parse_entities(raw: &str) -> Result<Vec<Entity>, OnboardError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

/// Value of cookie `name` from the request headers.
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .flat_map(|v| v.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(key, _)| *key == name)
        .map(|(_, value)| value.to_string())
        .filter(|v| !v.is_empty())
}

async fn read_upload(mut multipart: Multipart) -> Result<Upload, String> {
    let mut upload = Upload::default();
    let mut has_file = false;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| format!("Invalid multipart body: {}", e))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                upload.file_name = field.file_name().unwrap_or("upload.xlsx").to_string();
                upload.bytes = field
                    .bytes()
                    .await
                    .map_err(|e| format!("Cannot read uploaded file: {}", e))?
                    .to_vec();
                has_file = true;
            }
            "entities" => {
                let raw = field.text().await.map_err(|e| e.to_string())?;
                upload.entities = parse_entities(&raw).map_err(|e| e.to_string())?;
            }
            "include_hierarchy" => {
                let raw = field.text().await.map_err(|e| e.to_string())?;
                upload.include_hierarchy = parse_flag(&raw);
            }
            "login_token" => {
                let raw = field.text().await.map_err(|e| e.to_string())?;
                let raw = raw.trim();
                if !raw.is_empty() {
                    upload.login_token = Some(raw.to_string());
                }
            }
            _ => {}
        }
    }
    if !has_file || upload.bytes.is_empty() {
        return Err("Missing workbook: send the .xlsx as multipart field 'file'".to_string());
    }
    Ok(upload)
}

/// Migrate response
#[derive(Serialize, Default, Debug)]
pub struct MigrateResponse {
    pub success: bool,
    pub file_name: String,
    pub logs: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub started_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
}

/// POST /api/v1/migrate - Migrate an uploaded workbook
pub async fn migrate(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    multipart: Multipart,
) -> impl IntoResponse {
    let mut upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<MigrateResponse>::err(message)),
            )
        }
    };
    if upload.login_token.is_none() {
        upload.login_token = cookie_value(&headers, &state.settings.session.cookie_name);
    }
    info!(file = %upload.file_name, bytes = upload.bytes.len(), "migration requested");
    let started_at = Utc::now();

    let worker_state = Arc::clone(&state);
    let joined = tokio::task::spawn_blocking(move || {
        let mut settings = worker_state.settings.clone();
        if let Some(token) = upload.login_token.take() {
            settings.session.login_token = Some(token);
        }
        let pipeline = upload.pipeline();
        let workbook = Workbook::from_bytes(upload.file_name.clone(), std::mem::take(&mut upload.bytes))?;
        let client = (worker_state.connector)(&settings)?;
        Ok::<_, OnboardError>((upload.file_name, pipeline.run(&workbook, &client)))
    })
    .await;

    match joined {
        Ok(Ok((file_name, outcome))) => {
            let response = MigrateResponse {
                success: outcome.success,
                file_name,
                logs: outcome.messages,
                started_at: Some(started_at),
                finished_at: Some(Utc::now()),
            };
            if response.success {
                (StatusCode::OK, Json(ApiResponse::ok(response)))
            } else {
                let last = response.logs.last().cloned().unwrap_or_default();
                (StatusCode::OK, Json(ApiResponse::failed(response, last)))
            }
        }
        Ok(Err(e)) => {
            let status = match e {
                OnboardError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                _ => StatusCode::BAD_REQUEST,
            };
            error!(kind = e.kind(), "migration rejected: {}", e);
            (status, Json(ApiResponse::err(e.to_string())))
        }
        Err(e) => {
            error!("migration worker failed: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ApiResponse::err(format!("Migration worker failed: {}", e))),
            )
        }
    }
}

#[derive(Serialize, Debug)]
pub struct SheetSummary {
    pub entity: Entity,
    pub sheet: String,
    pub records: usize,
}

/// Inspect response
#[derive(Serialize, Default, Debug)]
pub struct InspectResponse {
    pub valid: bool,
    pub file_name: String,
    pub sheets: Vec<SheetSummary>,
    pub message: String,
}

/// POST /api/v1/inspect - Validate an uploaded workbook
pub async fn inspect(multipart: Multipart) -> impl IntoResponse {
    let upload = match read_upload(multipart).await {
        Ok(upload) => upload,
        Err(message) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(ApiResponse::<InspectResponse>::err(message)),
            )
        }
    };

    let joined = tokio::task::spawn_blocking(move || {
        let pipeline = upload.pipeline();
        let mut response = InspectResponse {
            file_name: upload.file_name.clone(),
            ..Default::default()
        };
        let workbook = match Workbook::from_bytes(upload.file_name, upload.bytes) {
            Ok(workbook) => workbook,
            Err(e) => {
                response.message = e.to_string();
                return response;
            }
        };
        for entity in pipeline.steps() {
            match SheetRows::load(*entity, &workbook) {
                Ok(rows) => response.sheets.push(SheetSummary {
                    entity: *entity,
                    sheet: entity.sheet_name().to_string(),
                    records: rows.len(),
                }),
                Err(e) => {
                    response.message = e.to_string();
                    return response;
                }
            }
        }
        response.valid = true;
        response.message = "Workbook is valid".to_string();
        response
    })
    .await;

    match joined {
        Ok(response) => (StatusCode::OK, Json(ApiResponse::ok(response))),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(ApiResponse::err(format!("Inspection worker failed: {}", e))),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    // ==================== ApiResponse Tests ====================

    #[test]
    fn test_api_response_ok_creates_success_response() {
        let response: ApiResponse<String> = ApiResponse::ok("test data".to_string());

        assert!(response.success);
        assert_eq!(response.data, Some("test data".to_string()));
        assert!(response.error.is_none());
        // Verify UUID format (8-4-4-4-12)
        assert_eq!(response.request_id.len(), 36);
    }

    #[test]
    fn test_api_response_err_creates_error_response() {
        let response: ApiResponse<String> = ApiResponse::err("Something went wrong");

        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error, Some("Something went wrong".to_string()));
    }

    #[test]
    fn test_api_response_failed_keeps_data() {
        let response = ApiResponse::failed(
            MigrateResponse {
                success: false,
                file_name: "w.xlsx".to_string(),
                logs: vec!["Error while automating units: boom".to_string()],
                ..Default::default()
            },
            "boom",
        );
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "boom");
        assert_eq!(json["data"]["logs"][0], "Error while automating units: boom");
    }

    #[test]
    fn test_api_response_skips_none_fields() {
        let response: ApiResponse<String> = ApiResponse::ok("x".to_string());
        let json = serde_json::to_string(&response).unwrap();
        assert!(!json.contains("\"error\""));
    }

    // ==================== Upload Field Tests ====================

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("true"));
        assert!(parse_flag(" Yes "));
        assert!(parse_flag("1"));
        assert!(!parse_flag("false"));
        assert!(!parse_flag(""));
    }

    #[test]
    fn test_parse_entities() {
        let entities = parse_entities("unit, unit-group,").unwrap();
        assert_eq!(entities, vec![Entity::Unit, Entity::UnitGroup]);
        assert!(parse_entities("widgets").is_err());
    }

    #[test]
    fn test_upload_pipeline_with_hierarchy() {
        let upload = Upload {
            entities: vec![Entity::Industry],
            include_hierarchy: true,
            ..Default::default()
        };
        assert_eq!(upload.pipeline().steps(), &[Entity::Industry, Entity::Hierarchy]);
    }

    // ==================== Cookie Tests ====================

    #[test]
    fn test_cookie_value_found() {
        let mut headers = HeaderMap::new();
        headers.insert(
            COOKIE,
            HeaderValue::from_static("theme=dark; login-token=abc123; lang=en"),
        );
        assert_eq!(cookie_value(&headers, "login-token"), Some("abc123".to_string()));
    }

    #[test]
    fn test_cookie_value_missing() {
        let mut headers = HeaderMap::new();
        headers.insert(COOKIE, HeaderValue::from_static("theme=dark"));
        assert_eq!(cookie_value(&headers, "login-token"), None);
        assert_eq!(cookie_value(&HeaderMap::new(), "login-token"), None);
    }
}
