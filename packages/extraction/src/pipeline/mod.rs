//! Pipeline orchestration: one job from `Pending` to a terminal state.

pub mod parse;
pub mod prompts;

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use crate::acquire::{Acquirer, JobWorkdir};
use crate::error::{ExtractionError, Result};
use crate::jobs::{Job, JobResult};
use crate::traits::{GuideCache, JobStore, AI};
use crate::types::{AcquiredText, CachedGuide, Guide};

pub use parse::{is_non_instructional, parse_guide_response};
pub use prompts::format_guide_prompt;

/// Drives one extraction job end-to-end.
///
/// Single-writer discipline: after the submission handler creates the
/// job, the pipeline running on the worker that dequeued it is the only
/// writer. Storage failures during the run are logged and retried once,
/// never allowed to change the computed outcome.
pub struct Pipeline {
    acquirer: Acquirer,
    ai: Arc<dyn AI>,
    jobs: Arc<dyn JobStore>,
    cache: Arc<dyn GuideCache>,
    work_base: PathBuf,
}

impl Pipeline {
    pub fn new(
        acquirer: Acquirer,
        ai: Arc<dyn AI>,
        jobs: Arc<dyn JobStore>,
        cache: Arc<dyn GuideCache>,
        work_base: PathBuf,
    ) -> Self {
        Self {
            acquirer,
            ai,
            jobs,
            cache,
            work_base,
        }
    }

    /// Process one job to a terminal state. Never returns an error: every
    /// failure ends up as a `Failed` job with a user-presentable message.
    pub async fn run(&self, mut job: Job) {
        info!(job_id = %job.id, source = %job.source.describe(), "processing job");

        job.begin();
        self.persist(&job).await;

        let outcome = self.execute(&mut job).await;

        match outcome {
            Ok(result) => {
                self.cache_result(&job, &result).await;
                job.complete(result);
                info!(job_id = %job.id, "job completed");
            }
            Err(e) => {
                warn!(job_id = %job.id, error = %e, "job failed");
                job.fail(e.user_message());
            }
        }

        self.persist(&job).await;
        self.remove_upload(&job).await;
    }

    /// Uploaded files have served their purpose once the job is
    /// terminal; the raw text lives on in the job result and the cache.
    async fn remove_upload(&self, job: &Job) {
        if let crate::types::SourceInput::Upload { path, .. } = &job.source {
            if let Err(e) = tokio::fs::remove_file(path).await {
                warn!(job_id = %job.id, path = %path.display(), error = %e, "failed to remove uploaded file");
            }
        }
    }

    async fn execute(&self, job: &mut Job) -> Result<JobResult> {
        let workdir = JobWorkdir::create(&self.work_base, job.id).await?;

        let outcome = self.execute_in(job, &workdir).await;

        // Scratch files go regardless of outcome.
        workdir.cleanup().await;
        outcome
    }

    async fn execute_in(&self, job: &mut Job, workdir: &JobWorkdir) -> Result<JobResult> {
        job.set_progress(25, "Fetching source...");
        self.persist(job).await;

        let acquired = self.acquirer.acquire(&job.source, workdir.path()).await?;

        job.set_progress(70, "Analyzing content...");
        self.persist(job).await;

        let guide = self.extract_guide(&acquired).await?;
        if is_non_instructional(&guide) {
            return Err(ExtractionError::NonInstructional);
        }

        job.set_progress(95, "Finalizing your guide...");
        self.persist(job).await;

        Ok(JobResult {
            guide,
            source_text: acquired.text,
            language: acquired.language,
            method: acquired.method,
            processed_at: Utc::now(),
        })
    }

    /// One model call, retried once on a malformed response with the
    /// identical input. Transport errors are not retried here.
    async fn extract_guide(&self, acquired: &AcquiredText) -> Result<Guide> {
        let language_hint = acquired.language.as_deref();
        let response = self.ai.extract_guide(&acquired.text, language_hint).await?;

        match parse_guide_response(&response) {
            Ok(guide) => Ok(guide),
            Err(ExtractionError::Malformed(first)) => {
                warn!(error = %first, "guide response malformed, retrying once");
                let response = self.ai.extract_guide(&acquired.text, language_hint).await?;
                parse_guide_response(&response)
            }
            Err(other) => Err(other),
        }
    }

    /// Best-effort cache insert; a failed write costs a future cache miss,
    /// nothing more.
    async fn cache_result(&self, job: &Job, result: &JobResult) {
        let entry = CachedGuide::new(
            job.source.canonical_identity(),
            result.guide.clone(),
            result.source_text.clone(),
            result.method,
        );
        if let Err(e) = self.cache.store(&entry).await {
            warn!(job_id = %job.id, error = %e, "failed to cache extracted guide");
        }
    }

    /// Persist job state, retrying once. The in-memory copy stays
    /// authoritative; a double failure only delays what pollers see.
    async fn persist(&self, job: &Job) {
        if let Err(first) = self.jobs.update(job).await {
            warn!(job_id = %job.id, error = %first, "job update failed, retrying");
            if let Err(second) = self.jobs.update(job).await {
                warn!(job_id = %job.id, error = %second, "job update failed twice, giving up");
            }
        }
    }
}
