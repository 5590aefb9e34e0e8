//! The Job record: one row per extraction request.
//!
//! Lifecycle: created `Pending` by the submission handler, driven by
//! exactly one worker through `Processing` to a terminal state. The
//! transition methods here enforce the state machine; stores enforce it
//! again at the persistence boundary (terminal rows are frozen).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{AcquisitionMethod, Guide, SourceInput};

/// Job status. Only `Pending -> Processing -> {Completed, Failed}` is a
/// legal walk; terminal states are never left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Completed,
    Failed,
}

impl JobStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Failed)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// Payload of a successful job: the guide plus the raw text and
/// processing metadata it came from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobResult {
    pub guide: Guide,

    /// Raw transcript or article text.
    pub source_text: String,

    pub language: Option<String>,

    pub method: AcquisitionMethod,

    pub processed_at: DateTime<Utc>,
}

/// One extraction request from submission to terminal outcome.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,

    pub owner_id: String,

    /// Immutable after creation.
    pub source: SourceInput,

    pub status: JobStatus,

    /// 0-100, monotonically non-decreasing while not terminal.
    pub progress: u8,

    /// Human-readable label for the current stage.
    pub current_step: String,

    /// Set on completion, mutually exclusive with `error_message`.
    pub result: Option<JobResult>,

    /// User-presentable failure message, mutually exclusive with `result`.
    pub error_message: Option<String>,

    pub created_at: DateTime<Utc>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl Job {
    /// Create a new pending job.
    pub fn new(owner_id: impl Into<String>, source: SourceInput) -> Self {
        Self {
            id: Uuid::new_v4(),
            owner_id: owner_id.into(),
            source,
            status: JobStatus::Pending,
            progress: 0,
            current_step: "Waiting to start...".to_string(),
            result: None,
            error_message: None,
            created_at: Utc::now(),
            started_at: None,
            completed_at: None,
        }
    }

    /// Enter `Processing`. Called exactly once, by the worker that
    /// dequeued the job. A no-op unless the job is `Pending`.
    pub fn begin(&mut self) {
        if self.status != JobStatus::Pending {
            return;
        }
        self.status = JobStatus::Processing;
        self.started_at = Some(Utc::now());
        self.set_progress(10, "Starting analysis...");
    }

    /// Record progress. The percentage never regresses: an update with a
    /// lower value keeps the stored progress but may still relabel the
    /// step (internal fallbacks reset the label, not the number).
    pub fn set_progress(&mut self, progress: u8, step: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.progress = self.progress.max(progress.min(100));
        self.current_step = step.into();
    }

    /// Terminal success. Stores the result; `error_message` stays unset.
    pub fn complete(&mut self, result: JobResult) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Completed;
        self.progress = 100;
        self.current_step = "Complete!".to_string();
        self.result = Some(result);
        self.error_message = None;
        self.completed_at = Some(Utc::now());
    }

    /// Terminal failure with a user-presentable message; `result` stays
    /// unset. Progress is left where it was (no regression at terminal).
    pub fn fail(&mut self, user_message: impl Into<String>) {
        if self.status.is_terminal() {
            return;
        }
        self.status = JobStatus::Failed;
        self.current_step = "Failed".to_string();
        self.result = None;
        self.error_message = Some(user_message.into());
        self.completed_at = Some(Utc::now());
    }

    /// The read-only view returned to polling clients.
    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id,
            status: self.status,
            progress: self.progress,
            current_step: self.current_step.clone(),
            guide: self.result.as_ref().map(|r| r.guide.clone()),
            error: self.error_message.clone(),
            created_at: self.created_at,
            completed_at: self.completed_at,
        }
    }
}

/// Point-in-time view of a job for polling clients.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobSnapshot {
    pub id: Uuid,
    pub status: JobStatus,
    pub progress: u8,
    pub current_step: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guide: Option<Guide>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub completed_at: Option<DateTime<Utc>>,
}
