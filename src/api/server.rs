//! Onboard API Server implementation
//!
//! HTTP API using Axum. Workbooks are uploaded as multipart forms and
//! migrated with the server's settings; the caller's session token comes
//! from the form or the login cookie.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;

use super::handlers;
use crate::config::Settings;
use crate::error::OnboardResult;
use crate::remote::PlatformClient;

/// Largest accepted upload.
const MAX_UPLOAD_BYTES: usize = 25 * 1024 * 1024;

/// API Server configuration
#[derive(Clone)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
        }
    }
}

/// Builds a platform client for one request's settings.
pub type Connector = Arc<dyn Fn(&Settings) -> OnboardResult<PlatformClient> + Send + Sync>;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub version: String,
    pub settings: Settings,
    pub connector: Connector,
}

impl AppState {
    pub fn new(settings: Settings) -> Self {
        Self::with_connector(settings, Arc::new(PlatformClient::connect))
    }

    pub fn with_connector(settings: Settings, connector: Connector) -> Self {
        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            settings,
            connector,
        }
    }
}

/// Builds the router with every endpoint and layer.
pub fn router(state: Arc<AppState>) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        // Health and info endpoints
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health))
        .route("/version", get(handlers::version))
        // Core API endpoints
        .route("/api/v1/migrate", post(handlers::migrate))
        .route("/api/v1/inspect", post(handlers::inspect))
        // State and middleware
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

/// Run the API server
pub async fn run_api_server(config: ApiConfig, settings: Settings) -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "platform_onboard=info,tower_http=info".into()),
        )
        .init();

    if let Err(e) = settings.validate() {
        tracing::warn!("settings incomplete, migrations will be rejected: {}", e);
    }

    let state = Arc::new(AppState::new(settings));
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("🚚 Onboard API Server starting on http://{}", addr);
    info!("   Endpoints: /api/v1/migrate, /api/v1/inspect");
    info!("   Health: /health, Version: /version");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Onboard API Server shutdown complete");
    Ok(())
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, stopping server...");
}

#[cfg(test)]
mod tests {
    use super::*;

    // ==================== ApiConfig Tests ====================

    #[test]
    fn test_default_config() {
        let config = ApiConfig::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8080);
    }

    #[test]
    fn test_config_address_format() {
        let config = ApiConfig {
            host: "192.168.1.100".to_string(),
            port: 9090,
        };
        let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse().unwrap();
        assert_eq!(addr.port(), 9090);
    }

    // ==================== AppState Tests ====================

    #[test]
    fn test_app_state_version() {
        let state = AppState::new(Settings::default());
        assert_eq!(state.version, env!("CARGO_PKG_VERSION"));
    }

    #[test]
    fn test_default_connector_rejects_incomplete_settings() {
        let state = AppState::new(Settings::default());
        assert!((state.connector)(&state.settings).is_err());
    }
}
