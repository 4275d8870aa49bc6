use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use platform_onboard::cli;
use platform_onboard::config::{Overrides, Settings};
use platform_onboard::types::Entity;

#[derive(Parser)]
#[command(name = "onboard")]
#[command(about = "Replay an onboarding workbook against the configuration platform.")]
#[command(long_about = "Onboard - Excel to platform configuration migration

Reads the onboarding workbook (unit groups, units, parameter categories,
parameter groups, parameters, industries, asset models, hierarchy) and
creates whatever the platform does not have yet. Existing entries are never
modified or deleted, except asset models marked for a version increment and
hierarchy nodes that receive new parameters.

RUN ORDER:
  unit-group → unit → parameter-category → parameter-group → parameter
  → industry → asset-model   (hierarchy is opt-in: --include-hierarchy)

COMMANDS:
  run       - Migrate a workbook to the platform
  inspect   - Parse and validate a workbook without remote calls
  template  - Write a blank onboarding workbook
  config    - Show the effective settings (secrets masked)

EXAMPLES:
  onboard template onboarding.xlsx
  onboard inspect onboarding.xlsx --verbose
  onboard run onboarding.xlsx --base-url https://platform.example.com --project-id project_099
  onboard run onboarding.xlsx --entity unit-group,unit

Logging goes to stderr; set RUST_LOG=platform_onboard=debug to see payloads.")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Settings sources shared by commands that talk to the platform.
#[derive(Args, Debug, Clone)]
struct SettingsArgs {
    /// Settings file (YAML). Defaults to ./onboard.yaml when present
    #[arg(short, long, env = "ONBOARD_CONFIG")]
    config: Option<PathBuf>,

    /// Platform base URL
    #[arg(long, env = "ONBOARD_BASE_URL")]
    base_url: Option<String>,

    /// Project id sent with every request
    #[arg(long, env = "ONBOARD_PROJECT_ID")]
    project_id: Option<String>,

    /// Session token sent as the login cookie
    #[arg(long, env = "ONBOARD_LOGIN_TOKEN", hide_env_values = true)]
    login_token: Option<String>,

    /// Send request bodies as HS256-signed tokens
    #[arg(long, env = "ONBOARD_ENCRYPT_PAYLOAD")]
    encrypt_payload: Option<bool>,
}

impl SettingsArgs {
    fn resolve(self) -> anyhow::Result<Settings> {
        let mut settings = Settings::load_or_default(self.config.as_deref())?;
        settings.apply(Overrides {
            base_url: self.base_url,
            project_id: self.project_id,
            login_token: self.login_token,
            encrypt_payload: self.encrypt_payload,
        });
        Ok(settings)
    }
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Migrate a workbook to the platform.

Every selected sheet is parsed and validated first; a malformed workbook
fails before any remote call. Steps then run in dependency order and the
first failing step stops the run. The status log is printed to stdout.")]
    /// Migrate a workbook to the platform
    Run {
        /// Path to the onboarding workbook (.xlsx)
        workbook: PathBuf,

        /// Only run these steps (comma separated, e.g. unit-group,unit)
        #[arg(short, long = "entity", value_delimiter = ',')]
        entities: Vec<Entity>,

        /// Also run the hierarchy step
        #[arg(long)]
        include_hierarchy: bool,

        #[command(flatten)]
        settings: SettingsArgs,
    },

    /// Parse and validate a workbook without contacting the platform
    Inspect {
        /// Path to the onboarding workbook (.xlsx)
        workbook: PathBuf,

        /// Only inspect these sheets (comma separated)
        #[arg(short, long = "entity", value_delimiter = ',')]
        entities: Vec<Entity>,

        /// Also inspect the hierarchy sheet
        #[arg(long)]
        include_hierarchy: bool,

        /// List every record name
        #[arg(short, long)]
        verbose: bool,
    },

    /// Write a blank onboarding workbook with every sheet and header
    Template {
        /// Output path (.xlsx)
        output: PathBuf,
    },

    /// Show the effective settings with secrets masked
    Config {
        #[command(flatten)]
        settings: SettingsArgs,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "platform_onboard=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            workbook,
            entities,
            include_hierarchy,
            settings,
        } => cli::run(workbook, settings.resolve()?, entities, include_hierarchy)?,

        Commands::Inspect {
            workbook,
            entities,
            include_hierarchy,
            verbose,
        } => cli::inspect(workbook, entities, include_hierarchy, verbose)?,

        Commands::Template { output } => cli::template(output)?,

        Commands::Config { settings } => cli::config(settings.resolve()?)?,
    }
    Ok(())
}
