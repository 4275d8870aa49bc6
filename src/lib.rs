//! Onboard - Excel workbook to configuration platform migration
//!
//! Reads an onboarding workbook (unit groups, units, parameter categories,
//! parameter groups, parameters, industries, asset models, hierarchy) and
//! replays it against the platform's HTTP API, creating whatever is missing.
//!
//! # Features
//!
//! - Cell comments fused into values, merged regions filled down
//! - Case-insensitive header and name matching
//! - One create-if-missing routine shared by every entity
//! - Optional HS256-signed request bodies
//! - CLI (`onboard`) and HTTP upload server (`onboard-server`)
//!
//! # Example
//!
//! ```no_run
//! use platform_onboard::{Pipeline, PlatformClient, Settings, Workbook};
//!
//! let settings = Settings::load_or_default(None)?;
//! let client = PlatformClient::connect(&settings)?;
//! let workbook = Workbook::open("onboarding.xlsx")?;
//!
//! let outcome = Pipeline::new().run(&workbook, &client);
//! println!("{}", outcome.log_text());
//! # Ok::<(), platform_onboard::OnboardError>(())
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod excel;
pub mod mapping;
pub mod pipeline;
pub mod reconcile;
pub mod remote;
pub mod types;

// Re-export commonly used types
pub use config::Settings;
pub use error::{OnboardError, OnboardResult};
pub use excel::Workbook;
pub use pipeline::{Pipeline, RunOutcome};
pub use remote::PlatformClient;
pub use types::Entity;
