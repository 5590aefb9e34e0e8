//! Guide Extraction Library
//!
//! Turns a video URL, article URL, or uploaded media file into a
//! structured step-by-step guide (title, ingredients, steps, metadata).
//! Processing is asynchronous: callers create a job, hand it to the
//! worker pool, and poll the job record until it reaches a terminal
//! state.
//!
//! # Design
//!
//! - **Cheapest source first**: platform transcripts when they pass the
//!   quality gate, media download + speech-to-text as the fallback,
//!   article fetch for non-video links.
//! - **One writer per job**: the submission handler creates the record,
//!   the worker that dequeues it owns every later write, and terminal
//!   states are frozen at the store layer.
//! - **Dedup by canonical identity**: normalized URLs (and content
//!   hashes for uploads) key a guide cache, so re-submitting a source
//!   answers synchronously.
//!
//! # Modules
//!
//! - [`traits`] - Core trait abstractions (AI, Transcriber, stores)
//! - [`types`] - Guides, sources, and acquisition artifacts
//! - [`normalize`] - Canonical source URLs
//! - [`quality`] - Transcript quality gate
//! - [`acquire`] - Acquisition strategy chain
//! - [`pipeline`] - Job orchestration and model-response parsing
//! - [`worker`] - Bounded worker pool
//! - [`jobs`] - Job records and the state machine
//! - [`stores`] - Storage implementations (memory, SQLite)
//! - [`testing`] - Mock implementations for testing
//!
//! # Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use extraction::{Acquirer, ArticleStrategy, MemoryStore, Pipeline, WorkerPool};
//! use extraction::testing::MockAI;
//!
//! let store = Arc::new(MemoryStore::new());
//! let acquirer = Acquirer::new(vec![Box::new(ArticleStrategy::new())]);
//! let pipeline = Pipeline::new(
//!     acquirer,
//!     Arc::new(MockAI::new()),
//!     store.clone(),
//!     store,
//!     std::env::temp_dir(),
//! );
//! let (queue, pool) = WorkerPool::spawn(Arc::new(pipeline), 4);
//! ```

pub mod acquire;
pub mod error;
pub mod jobs;
pub mod normalize;
pub mod pipeline;
pub mod quality;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod transcripts;
pub mod types;
pub mod worker;

#[cfg(any(feature = "anthropic", feature = "openai"))]
pub mod ai;

// Re-export core types at crate root
pub use error::{AcquireError, ExtractionError, Result};
pub use jobs::{Job, JobResult, JobSnapshot, JobStatus};
pub use traits::{GuideCache, JobStore, MediaDownloader, Transcriber, TranscriptSource, AI};
pub use types::{
    AcquiredText, AcquisitionMethod, CachedGuide, Difficulty, Guide, GuideType, NativeTranscript,
    SourceInput, Transcription,
};

// Re-export the pipeline surface
pub use acquire::{
    Acquirer, AcquireStrategy, ArticleStrategy, DownloadStrategy, HttpMediaDownloader,
    TranscriptStrategy, YtDlpDownloader,
};
pub use normalize::canonical_source_url;
pub use pipeline::Pipeline;
pub use quality::{assess_transcript, QualityReport, QualityTier};
pub use transcripts::YoutubeTimedTextSource;
pub use worker::{JobQueue, WorkerPool, DEFAULT_WORKER_COUNT};

pub use stores::MemoryStore;

#[cfg(feature = "sqlite")]
pub use stores::SqliteStore;

#[cfg(feature = "anthropic")]
pub use ai::AnthropicModel;

#[cfg(feature = "openai")]
pub use ai::WhisperTranscriber;
