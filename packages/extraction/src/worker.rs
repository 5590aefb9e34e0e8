//! Bounded worker pool driving the pipeline.
//!
//! Submissions enqueue the whole job; a fixed number of workers share
//! the queue, so a burst of submissions leaves jobs `Pending` in the
//! store instead of spawning a task per request. Only the worker that
//! dequeues a job writes to it from then on.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::{ExtractionError, Result};
use crate::jobs::Job;
use crate::pipeline::Pipeline;

/// Default number of concurrent pipeline workers.
pub const DEFAULT_WORKER_COUNT: usize = 4;

/// Submission side of the worker pool.
#[derive(Clone)]
pub struct JobQueue {
    tx: mpsc::UnboundedSender<Job>,
    depth: Arc<AtomicUsize>,
}

impl JobQueue {
    /// Hand a freshly created job to the pool.
    pub fn submit(&self, job: Job) -> Result<()> {
        self.depth.fetch_add(1, Ordering::SeqCst);
        self.tx.send(job).map_err(|e| {
            self.depth.fetch_sub(1, Ordering::SeqCst);
            ExtractionError::Storage(format!("worker pool is shut down: job {} dropped", e.0.id))
        })
    }

    /// Jobs enqueued but not yet picked up by a worker.
    pub fn depth(&self) -> usize {
        self.depth.load(Ordering::SeqCst)
    }
}

/// Handles to the running workers.
pub struct WorkerPool {
    handles: Vec<JoinHandle<()>>,
}

impl WorkerPool {
    /// Spawn `workers` tasks sharing one queue.
    pub fn spawn(pipeline: Arc<Pipeline>, workers: usize) -> (JobQueue, WorkerPool) {
        let workers = workers.max(1);
        let (tx, rx) = mpsc::unbounded_channel::<Job>();
        let rx = Arc::new(Mutex::new(rx));
        let depth = Arc::new(AtomicUsize::new(0));

        let handles = (0..workers)
            .map(|worker_id| {
                let pipeline = Arc::clone(&pipeline);
                let rx = Arc::clone(&rx);
                let depth = Arc::clone(&depth);
                tokio::spawn(async move {
                    debug!(worker_id, "worker started");
                    loop {
                        // The lock is held only while idle; it is released
                        // before the job runs so other workers keep draining.
                        let job = { rx.lock().await.recv().await };
                        let Some(job) = job else { break };
                        depth.fetch_sub(1, Ordering::SeqCst);
                        pipeline.run(job).await;
                    }
                    debug!(worker_id, "worker stopped");
                })
            })
            .collect();

        info!(workers, "worker pool started");
        (JobQueue { tx, depth }, WorkerPool { handles })
    }

    /// Wait for the workers to drain and exit. Workers stop once every
    /// `JobQueue` clone has been dropped and the queue is empty.
    pub async fn shutdown(self) {
        for handle in self.handles {
            if let Err(e) = handle.await {
                warn!(error = %e, "worker task panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::acquire::{Acquirer, ArticleStrategy, TranscriptStrategy};
    use crate::jobs::JobStatus;
    use crate::stores::MemoryStore;
    use crate::testing::{MockAI, MockTranscriptSource};
    use crate::traits::JobStore;
    use crate::types::SourceInput;

    fn cooking_transcript() -> String {
        "First we cut the onions and add them to the pot. Then pour in the \
         stock and heat it until it simmers. Mix in the spices and cook for \
         twenty minutes. Finally we make the garnish and serve. This recipe \
         feeds four people comfortably."
            .to_string()
    }

    fn test_pipeline(store: Arc<MemoryStore>) -> Pipeline {
        let acquirer = Acquirer::new(vec![
            Box::new(TranscriptStrategy::new(Arc::new(
                MockTranscriptSource::returning(cooking_transcript(), 12),
            ))),
            Box::new(ArticleStrategy::new()),
        ]);
        Pipeline::new(
            acquirer,
            Arc::new(MockAI::new()),
            store.clone(),
            store,
            std::env::temp_dir().join("worker-pool-test"),
        )
    }

    #[tokio::test]
    async fn pool_drains_queued_jobs_to_terminal() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Arc::new(test_pipeline(store.clone()));
        let (queue, pool) = WorkerPool::spawn(pipeline, 2);

        let mut ids = Vec::new();
        for i in 0..6 {
            let job = Job::new(
                "alice",
                SourceInput::url(format!("https://www.youtube.com/watch?v=aaaaaaaaa{i:02}")),
            );
            ids.push(job.id);
            store.create(&job).await.unwrap();
            queue.submit(job).unwrap();
        }

        drop(queue);
        pool.shutdown().await;

        for id in ids {
            let job = store.get(id, "alice").await.unwrap().unwrap();
            assert_eq!(job.status, JobStatus::Completed);
            assert_eq!(job.progress, 100);
        }
    }

    #[tokio::test]
    async fn depth_tracks_backlog() {
        let store = Arc::new(MemoryStore::new());
        let pipeline = Arc::new(test_pipeline(store.clone()));

        // No workers draining yet: spawn with one worker but submit first
        // through a clone to observe the counter move.
        let (queue, pool) = WorkerPool::spawn(pipeline, 1);
        let job = Job::new("alice", SourceInput::url("https://www.youtube.com/watch?v=bbbbbbbbbbb"));
        store.create(&job).await.unwrap();
        queue.submit(job).unwrap();

        // Drained to zero once the worker picks it up.
        for _ in 0..50 {
            if queue.depth() == 0 {
                break;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        assert_eq!(queue.depth(), 0);

        drop(queue);
        pool.shutdown().await;
    }

    #[tokio::test]
    async fn submit_without_workers_errors_and_keeps_depth() {
        let (tx, rx) = mpsc::unbounded_channel();
        drop(rx);
        let queue = JobQueue {
            tx,
            depth: Arc::new(AtomicUsize::new(0)),
        };

        let job = Job::new("alice", SourceInput::url("https://www.youtube.com/watch?v=ccccccccccc"));
        assert!(queue.submit(job).is_err());
        assert_eq!(queue.depth(), 0);
    }
}
