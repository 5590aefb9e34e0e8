//! Speech-to-text adapter trait.

use std::path::Path;

use async_trait::async_trait;

use crate::error::Result;
use crate::types::Transcription;

/// Hosted speech-to-text service.
///
/// Treated as a single atomic call with no partial results: any error
/// propagates as `ExtractionError::Transcription` and is terminal for
/// the job; there is no fallback below this layer.
#[async_trait]
pub trait Transcriber: Send + Sync {
    /// Transcribe an audio file. `language_hint` enables a fixed
    /// language; auto-detect when absent.
    async fn transcribe(
        &self,
        audio_path: &Path,
        language_hint: Option<&str>,
    ) -> Result<Transcription>;
}
