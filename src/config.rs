//! Runtime settings
//!
//! Settings are read from a YAML file and may be overridden from the command
//! line or environment. They are passed explicitly to the client and the
//! pipeline; nothing here is global.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{OnboardError, OnboardResult};
use crate::types::ProjectContext;

pub const DEFAULT_CONFIG_FILE: &str = "onboard.yaml";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub platform: PlatformSettings,
    pub signing: SigningSettings,
    pub session: SessionSettings,
    pub http: HttpSettings,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlatformSettings {
    /// Base URL every route is appended to, e.g. `https://platform.example.com`.
    pub base_url: String,
    /// Login endpoint of the platform. Session tokens are obtained out of band.
    pub auth_endpoint: String,
    pub project_id: String,
    pub project_type: String,
    pub tz: String,
    pub language: String,
    /// Send request bodies as signed tokens instead of plain JSON.
    pub encrypt_payload: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningSettings {
    pub algorithm: String,
    pub secret: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionSettings {
    pub cookie_name: String,
    pub login_token: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpSettings {
    pub timeout_secs: u64,
    /// Rows requested per page on paginated listings.
    pub page_size: u32,
}

impl Default for PlatformSettings {
    fn default() -> Self {
        Self {
            base_url: String::new(),
            auth_endpoint: "/ilens_api/login".to_string(),
            project_id: String::new(),
            project_type: "n_level_hierarchy".to_string(),
            tz: "Asia/Kolkata".to_string(),
            language: "en".to_string(),
            encrypt_payload: false,
        }
    }
}

impl Default for SigningSettings {
    fn default() -> Self {
        Self {
            algorithm: "HS256".to_string(),
            secret: "kliLensKLiLensKL".to_string(),
        }
    }
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            cookie_name: "login-token".to_string(),
            login_token: None,
        }
    }
}

impl Default for HttpSettings {
    fn default() -> Self {
        Self {
            timeout_secs: 60,
            page_size: 100,
        }
    }
}

/// Values supplied on the command line or through environment variables.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub base_url: Option<String>,
    pub project_id: Option<String>,
    pub login_token: Option<String>,
    pub encrypt_payload: Option<bool>,
}

impl Settings {
    pub fn from_yaml_str(content: &str) -> OnboardResult<Self> {
        if content.trim().is_empty() {
            return Ok(Settings::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    pub fn load(path: &Path) -> OnboardResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            OnboardError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        Self::from_yaml_str(&content)
    }

    /// Loads `path` when given; otherwise the default file if present, else defaults.
    pub fn load_or_default(path: Option<&Path>) -> OnboardResult<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default = Path::new(DEFAULT_CONFIG_FILE);
                if default.exists() {
                    Self::load(default)
                } else {
                    Ok(Settings::default())
                }
            }
        }
    }

    pub fn apply(&mut self, overrides: Overrides) {
        if let Some(base_url) = overrides.base_url {
            self.platform.base_url = base_url;
        }
        if let Some(project_id) = overrides.project_id {
            self.platform.project_id = project_id;
        }
        if let Some(token) = overrides.login_token {
            self.session.login_token = Some(token);
        }
        if let Some(encrypt) = overrides.encrypt_payload {
            self.platform.encrypt_payload = encrypt;
        }
    }

    /// Checks the settings needed to talk to the platform.
    pub fn validate(&self) -> OnboardResult<()> {
        let base = self.platform.base_url.trim();
        if base.is_empty() {
            return Err(OnboardError::Config(
                "platform.base_url is not set (use --base-url or ONBOARD_BASE_URL)".to_string(),
            ));
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(OnboardError::Config(format!(
                "platform.base_url must start with http:// or https://, got '{}'",
                base
            )));
        }
        if self.platform.project_id.trim().is_empty() {
            return Err(OnboardError::Config(
                "platform.project_id is not set (use --project-id or ONBOARD_PROJECT_ID)"
                    .to_string(),
            ));
        }
        if self.platform.encrypt_payload {
            if !self.signing.algorithm.eq_ignore_ascii_case("HS256") {
                return Err(OnboardError::Config(format!(
                    "Unsupported signing algorithm '{}', only HS256 is available",
                    self.signing.algorithm
                )));
            }
            if self.signing.secret.is_empty() {
                return Err(OnboardError::Config(
                    "signing.secret is empty while encrypt_payload is on".to_string(),
                ));
            }
        }
        if self.http.page_size == 0 {
            return Err(OnboardError::Config(
                "http.page_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn project(&self) -> ProjectContext {
        ProjectContext {
            project_id: self.platform.project_id.clone(),
            project_type: self.platform.project_type.clone(),
            tz: self.platform.tz.clone(),
            language: self.platform.language.clone(),
        }
    }

    /// Copy with secrets replaced, for display.
    pub fn masked(&self) -> Settings {
        let mut shown = self.clone();
        shown.signing.secret = mask(&shown.signing.secret);
        shown.session.login_token = shown.session.login_token.as_deref().map(mask);
        shown
    }
}

fn mask(secret: &str) -> String {
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        let head: String = secret.chars().take(4).collect();
        format!("{}****", head)
    }
}
