//! Core trait abstractions: LLM, speech-to-text, transcript fetch,
//! media download, and storage seams.

pub mod ai;
pub mod downloader;
pub mod store;
pub mod transcriber;
pub mod transcripts;

pub use ai::AI;
pub use downloader::MediaDownloader;
pub use store::{GuideCache, JobStore};
pub use transcriber::Transcriber;
pub use transcripts::TranscriptSource;
