//! Storage traits: job persistence and the guide dedup cache.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;
use crate::jobs::Job;
use crate::types::CachedGuide;

/// Persistence for extraction jobs.
///
/// Write discipline: the submission handler calls `create` exactly once;
/// after that, only the worker that owns the job calls `update`. The
/// poll handler only reads. Implementations must refuse to modify a job
/// whose stored status is terminal, so a late or duplicate update can
/// never resurrect a finished job.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert a freshly created job (status Pending).
    async fn create(&self, job: &Job) -> Result<()>;

    /// Fetch a job, scoped to its owner. Returns `None` both for
    /// unknown ids and for jobs owned by someone else; callers cannot
    /// distinguish the two.
    async fn get(&self, id: Uuid, owner_id: &str) -> Result<Option<Job>>;

    /// The owner's jobs, newest first.
    async fn list_for_owner(&self, owner_id: &str, limit: usize, offset: usize)
        -> Result<Vec<Job>>;

    /// Persist the current state of a job. A no-op when the stored job
    /// is already terminal.
    async fn update(&self, job: &Job) -> Result<()>;
}

/// Dedup cache of extracted guides keyed by canonical source identity.
///
/// Lookup-then-store is deliberately unlocked: two concurrent
/// submissions for the same new source may both miss and both process.
/// Duplicate work in that race is accepted; the second `store` simply
/// overwrites with an equivalent entry.
#[async_trait]
pub trait GuideCache: Send + Sync {
    async fn lookup(&self, canonical_url: &str) -> Result<Option<CachedGuide>>;

    async fn store(&self, entry: &CachedGuide) -> Result<()>;
}
