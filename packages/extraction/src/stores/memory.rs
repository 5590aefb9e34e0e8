//! In-memory storage for testing and single-process deployments.

use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use tracing::warn;
use uuid::Uuid;

use crate::error::{ExtractionError, Result};
use crate::jobs::Job;
use crate::traits::store::{GuideCache, JobStore};
use crate::types::CachedGuide;

/// In-memory job store and guide cache.
///
/// Data is lost on restart; use the SQLite store for anything that has
/// to survive a process.
pub struct MemoryStore {
    jobs: RwLock<HashMap<Uuid, Job>>,
    guides: RwLock<HashMap<String, CachedGuide>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
            guides: RwLock::new(HashMap::new()),
        }
    }

    pub fn job_count(&self) -> usize {
        self.jobs.read().unwrap().len()
    }

    pub fn cached_guide_count(&self) -> usize {
        self.guides.read().unwrap().len()
    }
}

#[async_trait]
impl JobStore for MemoryStore {
    async fn create(&self, job: &Job) -> Result<()> {
        let mut jobs = self.jobs.write().unwrap();
        if jobs.contains_key(&job.id) {
            return Err(ExtractionError::Storage(format!(
                "job {} already exists",
                job.id
            )));
        }
        jobs.insert(job.id, job.clone());
        Ok(())
    }

    async fn get(&self, id: Uuid, owner_id: &str) -> Result<Option<Job>> {
        Ok(self
            .jobs
            .read()
            .unwrap()
            .get(&id)
            .filter(|j| j.owner_id == owner_id)
            .cloned())
    }

    async fn list_for_owner(
        &self,
        owner_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Job>> {
        let jobs = self.jobs.read().unwrap();
        let mut owned: Vec<Job> = jobs
            .values()
            .filter(|j| j.owner_id == owner_id)
            .cloned()
            .collect();
        owned.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(owned.into_iter().skip(offset).take(limit).collect())
    }

    async fn update(&self, job: &Job) -> Result<()> {
        let mut jobs = self.jobs.write().unwrap();
        match jobs.get(&job.id) {
            Some(stored) if stored.status.is_terminal() => {
                // Lost-update guard: a finished job is frozen.
                warn!(job_id = %job.id, "ignoring update to terminal job");
                Ok(())
            }
            Some(_) => {
                jobs.insert(job.id, job.clone());
                Ok(())
            }
            None => Err(ExtractionError::Storage(format!(
                "job {} not found",
                job.id
            ))),
        }
    }
}

#[async_trait]
impl GuideCache for MemoryStore {
    async fn lookup(&self, canonical_url: &str) -> Result<Option<CachedGuide>> {
        Ok(self.guides.read().unwrap().get(canonical_url).cloned())
    }

    async fn store(&self, entry: &CachedGuide) -> Result<()> {
        self.guides
            .write()
            .unwrap()
            .insert(entry.canonical_url.clone(), entry.clone());
        Ok(())
    }
}
