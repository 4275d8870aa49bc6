//! Platform client: payload encoding, status checks, pagination, lookups.

use std::collections::HashMap;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error};

use super::jwt::JwtSigner;
use super::payloads::LookupOption;
use super::query::Paged;
use super::routes;
use super::transport::{HttpTransport, RequestBody, Transport};
use crate::config::Settings;
use crate::error::{OnboardError, OnboardResult};
use crate::types::{natural_key, ProjectContext};

/// Upper bound on pages fetched from one listing.
const MAX_PAGES: u32 = 10_000;

pub struct PlatformClient {
    base_url: String,
    project: ProjectContext,
    page_size: u32,
    signer: Option<JwtSigner>,
    transport: Box<dyn Transport>,
}

impl PlatformClient {
    pub fn new(settings: &Settings, transport: Box<dyn Transport>) -> Self {
        let signer = settings
            .platform
            .encrypt_payload
            .then(|| JwtSigner::new(&settings.signing.secret));
        Self {
            base_url: settings.platform.base_url.clone(),
            project: settings.project(),
            page_size: settings.http.page_size,
            signer,
            transport,
        }
    }

    /// Validates the settings and builds a client over HTTP.
    pub fn connect(settings: &Settings) -> OnboardResult<Self> {
        settings.validate()?;
        let transport = HttpTransport::new(settings)?;
        Ok(Self::new(settings, Box::new(transport)))
    }

    pub fn project(&self) -> ProjectContext {
        self.project.clone()
    }

    pub fn page_size(&self) -> u32 {
        self.page_size
    }

    /// POSTs `payload` to `route` and returns the parsed JSON body.
    ///
    /// Any status other than 200 is an error.
    pub fn post<P: Serialize>(&self, route: &str, payload: &P) -> OnboardResult<Value> {
        let json = serde_json::to_value(payload)?;
        debug!(route, payload = %json, "POST");
        let body = match &self.signer {
            Some(signer) => RequestBody::Signed(signer.sign(&json)?),
            None => RequestBody::Json(json),
        };

        let url = routes::join(&self.base_url, route);
        let response = self.transport.post(&url, body)?;
        if !response.is_success() {
            error!(route, status = response.status, "remote call failed");
            return Err(OnboardError::Remote {
                route: route.to_string(),
                status: response.status,
                body: response.body,
            });
        }

        if response.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&response.body).map_err(|e| OnboardError::Response {
            route: route.to_string(),
            message: format!("body is not JSON: {}", e),
        })
    }

    /// POSTs and deserializes the `data` member of the response.
    pub fn post_data<P: Serialize, T: DeserializeOwned>(
        &self,
        route: &str,
        payload: &P,
    ) -> OnboardResult<T> {
        let body = self.post(route, payload)?;
        let data = body.get("data").cloned().unwrap_or(Value::Null);
        decode(route, data)
    }

    /// POSTs and returns the `data` array, treating a missing or null member as empty.
    pub fn post_list<P: Serialize, T: DeserializeOwned>(
        &self,
        route: &str,
        payload: &P,
    ) -> OnboardResult<Vec<T>> {
        let body = self.post(route, payload)?;
        rows_at(route, &body, "/data")
    }

    /// Fetches every page of a listing until a page comes back empty or short.
    pub fn search_all<Q: Paged, T: DeserializeOwned>(
        &self,
        route: &str,
        mut query: Q,
    ) -> OnboardResult<Vec<T>> {
        let mut results = Vec::new();
        for page in 1..=MAX_PAGES {
            query.set_page(page);
            let body = self.post(route, &query)?;
            let rows: Vec<T> = rows_at(route, &body, Q::ROWS)?;
            let fetched = rows.len();
            results.extend(rows);
            if fetched == 0 || fetched < query.page_size() as usize {
                break;
            }
        }
        Ok(results)
    }

    /// Fetches a `{label, value}` dropdown into a case-insensitive lookup.
    pub fn lookup<P: Serialize>(&self, route: &str, payload: &P) -> OnboardResult<Lookup> {
        let options: Vec<LookupOption> = self.post_list(route, payload)?;
        Ok(Lookup::from_options(options))
    }
}

fn decode<T: DeserializeOwned>(route: &str, value: Value) -> OnboardResult<T> {
    serde_json::from_value(value).map_err(|e| OnboardError::Response {
        route: route.to_string(),
        message: e.to_string(),
    })
}

fn rows_at<T: DeserializeOwned>(route: &str, body: &Value, pointer: &str) -> OnboardResult<Vec<T>> {
    match body.pointer(pointer) {
        None | Some(Value::Null) => Ok(Vec::new()),
        Some(Value::Array(rows)) => rows.iter().cloned().map(|row| decode(route, row)).collect(),
        Some(other) => Err(OnboardError::Response {
            route: route.to_string(),
            message: format!("expected a list at {}, got {}", pointer, other),
        }),
    }
}

/// Case-insensitive name → remote identifier map.
#[derive(Debug, Clone, Default)]
pub struct Lookup {
    entries: HashMap<String, (String, Value)>,
}

impl Lookup {
    pub fn from_options(options: Vec<LookupOption>) -> Self {
        let mut lookup = Lookup::default();
        for option in options {
            lookup.insert(&option.label, option.value);
        }
        lookup
    }

    pub fn insert(&mut self, name: &str, id: Value) {
        self.entries
            .entry(natural_key(name))
            .or_insert_with(|| (name.trim().to_string(), id));
    }

    pub fn resolve(&self, name: &str) -> Option<&Value> {
        self.entries.get(&natural_key(name)).map(|(_, id)| id)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(&natural_key(name))
    }

    /// Display names, in no particular order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.values().map(|(name, _)| name.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
