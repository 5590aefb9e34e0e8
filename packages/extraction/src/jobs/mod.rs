//! Job records and the extraction state machine.

pub mod job;

pub use job::{Job, JobResult, JobSnapshot, JobStatus};
