//! Portfolio API Server module
//!
//! HTTP surface for callers that hold uploaded workbook bytes.
//! Run with `portfolio-server`.

pub mod handlers;
pub mod server;

pub use server::{build_router, run_api_server, ApiConfig, AppState};
