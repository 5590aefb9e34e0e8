//! HTTP surface for the guide extraction service.
//!
//! Thin layer over the `extraction` library: submission routes resolve
//! the cache and enqueue jobs, polling routes read job snapshots, and
//! the worker pool does everything else.

pub mod app;
pub mod config;
pub mod error;
pub mod routes;

pub use app::{build_app, AppState};
pub use config::{Config, DEFAULT_MAX_UPLOAD_BYTES};
pub use error::ApiError;
