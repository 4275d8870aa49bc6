//! Shared fixtures: an in-memory platform and workbook builders.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use platform_onboard::config::Settings;
use platform_onboard::excel::{TemplateWriter, Workbook};
use platform_onboard::remote::jwt::decode_claims;
use platform_onboard::remote::{routes, PlatformClient, RequestBody, Transport, TransportResponse};
use platform_onboard::OnboardResult;
use serde_json::{json, Value};

pub const BASE_URL: &str = "http://fake.platform";
pub const PROJECT_ID: &str = "project_099";

/// Deterministic id for a named platform object.
pub fn id(prefix: &str, name: &str) -> String {
    format!("{}_{}", prefix, name.trim().to_lowercase().replace(' ', "_"))
}

/// One request as received by the fake platform.
#[derive(Debug, Clone)]
pub struct Call {
    pub route: String,
    pub payload: Value,
    pub signed: bool,
}

#[derive(Debug, Clone)]
pub struct Parameter {
    pub name: String,
    pub group: String,
    pub category: String,
}

#[derive(Debug, Clone)]
pub struct AssetModel {
    pub name: String,
    pub id: String,
    pub version: i64,
}

#[derive(Debug, Default)]
pub struct PlatformState {
    pub unit_groups: Vec<String>,
    pub units: Vec<String>,
    pub categories: Vec<String>,
    pub groups: Vec<String>,
    pub parameters: Vec<Parameter>,
    pub data_types: Vec<String>,
    pub tag_types: Vec<String>,
    pub industries: Vec<String>,
    pub asset_models: Vec<AssetModel>,
    pub hierarchy: Vec<Value>,
    pub calls: Vec<Call>,
    /// Route answered with HTTP 500.
    pub fail_route: Option<String>,
}

/// In-memory platform speaking the same routes and shapes as the real one.
#[derive(Debug, Clone, Default)]
pub struct FakePlatform {
    state: Arc<Mutex<PlatformState>>,
}

fn contains(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.trim().to_lowercase())
}

fn text(payload: &Value, pointer: &str) -> String {
    payload
        .pointer(pointer)
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn lookup(prefix: &str, names: &[String]) -> Value {
    json!({
        "data": names
            .iter()
            .map(|n| json!({"label": n, "value": id(prefix, n)}))
            .collect::<Vec<_>>()
    })
}

/// Applies the content-search filter and paging of a table query.
fn content_page(payload: &Value, field: &str, rows: Vec<Value>) -> Value {
    let filter = text(payload, &format!("/filters/filterModel/{}/filter", field));
    let start = payload["startRow"].as_u64().unwrap_or(0) as usize;
    let size = payload["records"].as_u64().unwrap_or(100) as usize;
    let hits: Vec<Value> = rows
        .into_iter()
        .filter(|row| contains(row[field].as_str().unwrap_or_default(), &filter))
        .skip(start)
        .take(size)
        .collect();
    json!({"status": "success", "data": {"bodyContent": hits}})
}

impl FakePlatform {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(configure: impl FnOnce(&mut PlatformState)) -> Self {
        let platform = Self::new();
        configure(&mut platform.state.lock().unwrap());
        platform
    }

    pub fn state(&self) -> std::sync::MutexGuard<'_, PlatformState> {
        self.state.lock().unwrap()
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state().calls.clone()
    }

    pub fn calls_to(&self, route: &str) -> Vec<Call> {
        self.calls().into_iter().filter(|c| c.route == route).collect()
    }

    pub fn client(&self, settings: &Settings) -> PlatformClient {
        PlatformClient::new(settings, Box::new(self.clone()))
    }

    fn handle(&self, route: &str, payload: &Value) -> (u16, Value) {
        let mut state = self.state();
        if state.fail_route.as_deref() == Some(route) {
            return (500, json!({"status": "failed", "message": "internal error"}));
        }

        let body = match route {
            routes::LIST_UNIT_GROUPS => {
                let rows = state.unit_groups.iter().map(|n| json!({"unit_group_name": n})).collect();
                content_page(payload, "unit_group_name", rows)
            }
            routes::SAVE_UNIT_GROUP => {
                state.unit_groups.push(text(payload, "/unit_group_name"));
                json!({"status": "success"})
            }
            routes::LIST_UNITS => {
                let rows = state.units.iter().map(|n| json!({"unit": n, "name": n})).collect();
                content_page(payload, "unit", rows)
            }
            routes::UNIT_GROUP_LOOKUP => lookup("ug", &state.unit_groups),
            routes::SAVE_UNITS => {
                state.units.push(text(payload, "/name"));
                json!({"status": "success"})
            }
            routes::UNIT_LOOKUP => lookup("unit", &state.units),
            routes::CATEGORY_CONTENT => {
                let rows = state.categories.iter().map(|n| json!({"tag_category_name": n})).collect();
                content_page(payload, "tag_category_name", rows)
            }
            routes::SAVE_CATEGORY => {
                state.categories.push(text(payload, "/tag_category_name"));
                json!({"status": "success"})
            }
            routes::CATEGORY_LOOKUP => lookup("cat", &state.categories),
            routes::GROUP_LOOKUP => lookup("grp", &state.groups),
            routes::SAVE_GROUP => {
                state.groups.push(text(payload, "/tag_group_name"));
                json!({"status": "success"})
            }
            routes::PARAMETER_CONTENT => {
                let rows = state
                    .parameters
                    .iter()
                    .map(|p| json!({"tag_name": p.name, "tag_id": id("tag", &p.name)}))
                    .collect();
                content_page(payload, "tag_name", rows)
            }
            routes::SAVE_PARAMETERS => {
                state.parameters.push(Parameter {
                    name: text(payload, "/tag_name"),
                    group: text(payload, "/tag_group_name"),
                    category: text(payload, "/parameter_category"),
                });
                json!({"status": "success"})
            }
            routes::DATA_TYPE_LOOKUP => lookup("dt", &state.data_types),
            routes::TAG_TYPE_LOOKUP => lookup("tt", &state.tag_types),
            routes::INDUSTRY_DROPDOWN => json!({
                "data": state
                    .industries
                    .iter()
                    .map(|n| json!({"industry_category_name": n, "industry_category_id": id("ind", n)}))
                    .collect::<Vec<_>>()
            }),
            routes::CREATE_INDUSTRY => {
                state.industries.push(text(payload, "/industry_category_name"));
                json!({"status": "success"})
            }
            routes::LIST_ASSET_MODELS => {
                let filter = text(payload, "/filters/filterModel/showFiltersSidebar");
                let size = payload["records"].as_u64().unwrap_or(50) as usize;
                let counter = payload["counter"].as_u64().unwrap_or(1).max(1) as usize;
                let hits: Vec<Value> = state
                    .asset_models
                    .iter()
                    .filter(|m| contains(&m.name, &filter))
                    .skip((counter - 1) * size)
                    .take(size)
                    .map(|m| {
                        json!({
                            "asset_model_name": m.name,
                            "asset_model_id": m.id,
                            "asset_version": m.version
                        })
                    })
                    .collect();
                json!({"data": {"tableData": {"bodyContent": hits}}})
            }
            routes::SAVE_ASSET_MODEL => {
                let name = text(payload, "/asset_model_name");
                let current = text(payload, "/asset_model_id");
                if payload["key_type"] == "basic_info" {
                    if current.is_empty() {
                        let model = AssetModel {
                            id: id("am", &name),
                            name,
                            version: 1,
                        };
                        let data = json!({"asset_model_id": model.id, "asset_version": model.version});
                        state.asset_models.push(model);
                        json!({"status": "success", "data": data})
                    } else {
                        let model = state.asset_models.iter_mut().find(|m| m.id == current);
                        match model {
                            Some(model) => {
                                model.version += 1;
                                json!({
                                    "status": "success",
                                    "data": {"asset_model_id": model.id, "asset_version": model.version}
                                })
                            }
                            None => return (404, json!({"message": "unknown asset model"})),
                        }
                    }
                } else {
                    json!({"status": "success"})
                }
            }
            routes::ASSET_TAG_GROUP => {
                let rows: Vec<Value> = if payload["type"] == "tag_groups" {
                    state
                        .groups
                        .iter()
                        .map(|g| json!({"tag_group_name": g, "tag_group_id": id("grp", g)}))
                        .collect()
                } else {
                    state
                        .categories
                        .iter()
                        .map(|c| json!({"tag_category_name": c, "tag_category_id": id("cat", c)}))
                        .collect()
                };
                json!({"data": rows})
            }
            routes::ASSET_TAG_GROUP_META => {
                let wanted: Vec<String> = payload
                    .get("tag_group_id")
                    .or_else(|| payload.get("tag_category_id"))
                    .and_then(Value::as_array)
                    .map(|ids| ids.iter().filter_map(|v| v.as_str().map(str::to_string)).collect())
                    .unwrap_or_default();
                let by_group = payload.get("tag_group_id").is_some();
                let members: Vec<Value> = state
                    .parameters
                    .iter()
                    .filter(|p| {
                        let set = if by_group { id("grp", &p.group) } else { id("cat", &p.category) };
                        wanted.contains(&set)
                    })
                    .map(|p| json!({"tag_id": id("tag", &p.name), "tag_group_name": p.group}))
                    .collect();
                json!({"data": members})
            }
            routes::ASSET_PARAMETERS => json!({"status": "success"}),
            routes::FETCH_HIERARCHY => json!({"data": state.hierarchy.clone()}),
            routes::SAVE_HIERARCHY => {
                let node_id = text(payload, "/node_id");
                let tags = payload.pointer("/data/0/tags").cloned().unwrap_or(json!([]));
                if let Some(node) = state.hierarchy.iter_mut().find(|n| n["node_id"] == node_id.as_str()) {
                    node["tags"] = tags;
                }
                json!({"status": "success"})
            }
            _ => return (404, json!({"message": format!("no route {}", route)})),
        };
        (200, body)
    }
}

impl Transport for FakePlatform {
    fn post(&self, url: &str, body: RequestBody) -> OnboardResult<TransportResponse> {
        let route = url.strip_prefix(BASE_URL).unwrap_or(url).to_string();
        let (payload, signed) = match body {
            RequestBody::Json(value) => (value, false),
            RequestBody::Signed(token) => (decode_claims(&token)?, true),
        };
        let (status, response) = self.handle(&route, &payload);
        self.state().calls.push(Call {
            route,
            payload,
            signed,
        });
        Ok(TransportResponse {
            status,
            body: response.to_string(),
        })
    }
}

/// Settings pointing at the fake platform, with a small page size so
/// pagination is exercised.
pub fn settings() -> Settings {
    let mut settings = Settings::default();
    settings.platform.base_url = BASE_URL.to_string();
    settings.platform.project_id = PROJECT_ID.to_string();
    settings.session.login_token = Some("test-token".to_string());
    settings.http.page_size = 2;
    settings
}

/// Builds an in-memory workbook from template rows.
pub fn workbook(writer: TemplateWriter) -> Workbook {
    let bytes = writer.to_bytes().unwrap();
    Workbook::from_bytes("fixture.xlsx", bytes).unwrap()
}

pub fn row(cells: &[&str]) -> Vec<String> {
    cells.iter().map(|c| c.to_string()).collect()
}
