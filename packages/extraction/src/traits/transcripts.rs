//! Platform-native transcript fetch trait (the fast path).

use async_trait::async_trait;

use crate::error::Result;
use crate::types::NativeTranscript;

/// Fetches platform-native captions for a video id.
#[async_trait]
pub trait TranscriptSource: Send + Sync {
    /// `Ok(None)` means the platform has no transcript for this video
    /// (disabled, missing, or private); the caller falls back to the
    /// download path. Errors are treated the same way by the
    /// acquisition layer; a failed transcript fetch is never fatal.
    async fn fetch(&self, video_id: &str) -> Result<Option<NativeTranscript>>;
}
