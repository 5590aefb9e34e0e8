//! Per-job scratch directory for downloaded media and extracted audio.

use std::path::{Path, PathBuf};

use tracing::warn;
use uuid::Uuid;

use crate::error::Result;

/// Scratch directory for one job, removed when processing ends.
///
/// Cleanup runs on success and failure alike; a failed removal is
/// logged and otherwise ignored so it can never mask the job outcome.
pub struct JobWorkdir {
    path: PathBuf,
}

impl JobWorkdir {
    /// Create `<base>/<job id>/`.
    pub async fn create(base: &Path, job_id: Uuid) -> Result<Self> {
        let path = base.join(job_id.to_string());
        tokio::fs::create_dir_all(&path).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Remove the directory and everything in it.
    pub async fn cleanup(self) {
        if let Err(e) = tokio::fs::remove_dir_all(&self.path).await {
            warn!(path = %self.path.display(), error = %e, "failed to remove job workdir");
        }
    }
}
