//! SQLite-backed storage (feature `sqlite`).
//!
//! Jobs and cached guides survive a restart. Terminal-state freezing is
//! enforced in SQL: every update is conditional on the stored row still
//! being non-terminal, which also makes concurrent stale writes lose
//! cleanly instead of clobbering a finished job.

use std::str::FromStr;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use uuid::Uuid;

use crate::error::{ExtractionError, Result};
use crate::jobs::{Job, JobStatus};
use crate::traits::store::{GuideCache, JobStore};
use crate::types::CachedGuide;

/// SQLite job store and guide cache.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Connect and run schema setup.
    pub async fn connect(database_url: &str) -> Result<Self> {
        // An in-memory database exists per connection, so it must not be
        // spread across a pool.
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let options = SqliteConnectOptions::from_str(database_url)
            .map_err(storage_err)?
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_with(options)
            .await
            .map_err(storage_err)?;

        let store = Self { pool };
        store.migrate().await?;
        Ok(store)
    }

    async fn migrate(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS jobs (
                id TEXT PRIMARY KEY,
                owner_id TEXT NOT NULL,
                source TEXT NOT NULL,
                status TEXT NOT NULL,
                progress INTEGER NOT NULL,
                current_step TEXT NOT NULL,
                result TEXT,
                error_message TEXT,
                created_at TEXT NOT NULL,
                started_at TEXT,
                completed_at TEXT
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_jobs_owner ON jobs (owner_id, created_at)",
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS guide_cache (
                canonical_url TEXT PRIMARY KEY,
                entry TEXT NOT NULL,
                created_at TEXT NOT NULL
            )
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }
}

fn storage_err(e: impl std::fmt::Display) -> ExtractionError {
    ExtractionError::Storage(e.to_string())
}

fn parse_status(s: &str) -> Result<JobStatus> {
    match s {
        "pending" => Ok(JobStatus::Pending),
        "processing" => Ok(JobStatus::Processing),
        "completed" => Ok(JobStatus::Completed),
        "failed" => Ok(JobStatus::Failed),
        other => Err(ExtractionError::Storage(format!(
            "unknown job status in database: {other}"
        ))),
    }
}

fn parse_timestamp(s: &str) -> Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(storage_err)
}

fn row_to_job(row: &SqliteRow) -> Result<Job> {
    let id: String = row.try_get("id").map_err(storage_err)?;
    let source: String = row.try_get("source").map_err(storage_err)?;
    let status: String = row.try_get("status").map_err(storage_err)?;
    let result: Option<String> = row.try_get("result").map_err(storage_err)?;
    let created_at: String = row.try_get("created_at").map_err(storage_err)?;
    let started_at: Option<String> = row.try_get("started_at").map_err(storage_err)?;
    let completed_at: Option<String> = row.try_get("completed_at").map_err(storage_err)?;
    let progress: i64 = row.try_get("progress").map_err(storage_err)?;

    Ok(Job {
        id: Uuid::parse_str(&id).map_err(storage_err)?,
        owner_id: row.try_get("owner_id").map_err(storage_err)?,
        source: serde_json::from_str(&source).map_err(storage_err)?,
        status: parse_status(&status)?,
        progress: progress.clamp(0, 100) as u8,
        current_step: row.try_get("current_step").map_err(storage_err)?,
        result: match result {
            Some(json) => Some(serde_json::from_str(&json).map_err(storage_err)?),
            None => None,
        },
        error_message: row.try_get("error_message").map_err(storage_err)?,
        created_at: parse_timestamp(&created_at)?,
        started_at: started_at.as_deref().map(parse_timestamp).transpose()?,
        completed_at: completed_at.as_deref().map(parse_timestamp).transpose()?,
    })
}

#[async_trait]
impl JobStore for SqliteStore {
    async fn create(&self, job: &Job) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO jobs
                (id, owner_id, source, status, progress, current_step,
                 result, error_message, created_at, started_at, completed_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(job.id.to_string())
        .bind(&job.owner_id)
        .bind(serde_json::to_string(&job.source).map_err(storage_err)?)
        .bind(job.status.as_str())
        .bind(job.progress as i64)
        .bind(&job.current_step)
        .bind(
            job.result
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(storage_err)?,
        )
        .bind(&job.error_message)
        .bind(job.created_at.to_rfc3339())
        .bind(job.started_at.map(|t| t.to_rfc3339()))
        .bind(job.completed_at.map(|t| t.to_rfc3339()))
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }

    async fn get(&self, id: Uuid, owner_id: &str) -> Result<Option<Job>> {
        let row = sqlx::query("SELECT * FROM jobs WHERE id = ? AND owner_id = ?")
            .bind(id.to_string())
            .bind(owner_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        row.as_ref().map(row_to_job).transpose()
    }

    async fn list_for_owner(
        &self,
        owner_id: &str,
        limit: usize,
        offset: usize,
    ) -> Result<Vec<Job>> {
        let rows = sqlx::query(
            "SELECT * FROM jobs WHERE owner_id = ? ORDER BY created_at DESC LIMIT ? OFFSET ?",
        )
        .bind(owner_id)
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(storage_err)?;

        rows.iter().map(row_to_job).collect()
    }

    async fn update(&self, job: &Job) -> Result<()> {
        // Conditional on the stored row being non-terminal; an update
        // that matches zero rows is a late write against a frozen job.
        sqlx::query(
            r#"
            UPDATE jobs
            SET status = ?, progress = ?, current_step = ?,
                result = ?, error_message = ?, started_at = ?, completed_at = ?
            WHERE id = ? AND status NOT IN ('completed', 'failed')
            "#,
        )
        .bind(job.status.as_str())
        .bind(job.progress as i64)
        .bind(&job.current_step)
        .bind(
            job.result
                .as_ref()
                .map(serde_json::to_string)
                .transpose()
                .map_err(storage_err)?,
        )
        .bind(&job.error_message)
        .bind(job.started_at.map(|t| t.to_rfc3339()))
        .bind(job.completed_at.map(|t| t.to_rfc3339()))
        .bind(job.id.to_string())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }
}

#[async_trait]
impl GuideCache for SqliteStore {
    async fn lookup(&self, canonical_url: &str) -> Result<Option<CachedGuide>> {
        let row = sqlx::query("SELECT entry FROM guide_cache WHERE canonical_url = ?")
            .bind(canonical_url)
            .fetch_optional(&self.pool)
            .await
            .map_err(storage_err)?;

        match row {
            Some(row) => {
                let entry: String = row.try_get("entry").map_err(storage_err)?;
                Ok(Some(serde_json::from_str(&entry).map_err(storage_err)?))
            }
            None => Ok(None),
        }
    }

    async fn store(&self, entry: &CachedGuide) -> Result<()> {
        // Last write wins; concurrent duplicate inserts are equivalent.
        sqlx::query(
            r#"
            INSERT INTO guide_cache (canonical_url, entry, created_at)
            VALUES (?, ?, ?)
            ON CONFLICT (canonical_url) DO UPDATE SET entry = excluded.entry
            "#,
        )
        .bind(&entry.canonical_url)
        .bind(serde_json::to_string(entry).map_err(storage_err)?)
        .bind(entry.created_at.to_rfc3339())
        .execute(&self.pool)
        .await
        .map_err(storage_err)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::SourceInput;

    async fn test_store() -> SqliteStore {
        SqliteStore::connect("sqlite::memory:").await.unwrap()
    }

    #[tokio::test]
    async fn roundtrip_job() {
        let store = test_store().await;
        let mut job = Job::new("alice", SourceInput::url("https://example.com/a"));
        store.create(&job).await.unwrap();

        job.begin();
        job.set_progress(40, "Fetching source...");
        store.update(&job).await.unwrap();

        let loaded = store.get(job.id, "alice").await.unwrap().unwrap();
        assert_eq!(loaded.status, JobStatus::Processing);
        assert_eq!(loaded.progress, 40);
        assert_eq!(loaded.current_step, "Fetching source...");
        assert_eq!(loaded.source, job.source);
    }

    #[tokio::test]
    async fn owner_scoping_in_sql() {
        let store = test_store().await;
        let job = Job::new("alice", SourceInput::url("https://example.com/a"));
        store.create(&job).await.unwrap();

        assert!(store.get(job.id, "bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn terminal_rows_are_frozen() {
        let store = test_store().await;
        let mut job = Job::new("alice", SourceInput::url("https://example.com/a"));
        store.create(&job).await.unwrap();

        job.begin();
        job.fail("broken");
        store.update(&job).await.unwrap();

        let mut stale = job.clone();
        stale.status = JobStatus::Processing;
        stale.error_message = None;
        store.update(&stale).await.unwrap();

        let loaded = store.get(job.id, "alice").await.unwrap().unwrap();
        assert_eq!(loaded.status, JobStatus::Failed);
        assert_eq!(loaded.error_message.as_deref(), Some("broken"));
    }
}
