//! Onboard API Server module
//!
//! HTTP upload endpoint for workbook migrations.
//! Run with `onboard-server`.

pub mod handlers;
pub mod server;

pub use server::{router, run_api_server, ApiConfig, AppState};
