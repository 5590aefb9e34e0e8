//! HTTP route handlers.

pub mod health;
pub mod jobs;
pub mod submit;

pub use health::health_handler;
pub use jobs::{job_handler, jobs_handler};
pub use submit::{process_upload_handler, process_url_handler};
