//! Onboard API Server binary
//!
//! HTTP upload endpoint for workbook migrations.

use std::path::PathBuf;

use clap::Parser;
use platform_onboard::api::{run_api_server, ApiConfig};
use platform_onboard::config::{Overrides, Settings};

#[derive(Parser, Debug)]
#[command(name = "onboard-server")]
#[command(version)]
#[command(about = "Onboard API Server - migrate uploaded workbooks to the configuration platform")]
#[command(long_about = r#"
Onboard API Server

Endpoints:
  - POST /api/v1/migrate   - Migrate an uploaded workbook
  - POST /api/v1/inspect   - Validate an uploaded workbook (no remote calls)

Additional endpoints:
  - GET  /health           - Health check
  - GET  /version          - Server version info
  - GET  /                 - API documentation

Uploads are multipart forms:
  file               the .xlsx workbook (required)
  entities           comma separated steps, e.g. unit-group,unit
  include_hierarchy  true to also run the hierarchy step
  login_token        session token; the login-token cookie is used otherwise

Features:
  - CORS enabled for cross-origin requests
  - Graceful shutdown on SIGINT/SIGTERM
  - JSON response format with request IDs
  - Tracing and structured logging

Example usage:
  onboard-server --config onboard.yaml
  onboard-server --host 0.0.0.0 --port 3000

  curl -X POST http://localhost:8080/api/v1/migrate \
    -b "login-token=$TOKEN" \
    -F file=@onboarding.xlsx
"#)]
struct Args {
    /// Host address to bind to (use 0.0.0.0 for all interfaces)
    #[arg(short = 'H', long, default_value = "127.0.0.1", env = "ONBOARD_HOST")]
    host: String,

    /// Port to listen on
    #[arg(short, long, default_value = "8080", env = "ONBOARD_PORT")]
    port: u16,

    /// Settings file (YAML). Defaults to ./onboard.yaml when present
    #[arg(short, long, env = "ONBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Platform base URL
    #[arg(long, env = "ONBOARD_BASE_URL")]
    base_url: Option<String>,

    /// Project id sent with every request
    #[arg(long, env = "ONBOARD_PROJECT_ID")]
    project_id: Option<String>,

    /// Send request bodies as HS256-signed tokens
    #[arg(long, env = "ONBOARD_ENCRYPT_PAYLOAD")]
    encrypt_payload: Option<bool>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let mut settings = Settings::load_or_default(args.config.as_deref())?;
    settings.apply(Overrides {
        base_url: args.base_url,
        project_id: args.project_id,
        login_token: None,
        encrypt_payload: args.encrypt_payload,
    });

    let config = ApiConfig {
        host: args.host,
        port: args.port,
    };

    run_api_server(config, settings).await
}
