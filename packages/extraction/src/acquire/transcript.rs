//! Fast path: platform-native transcripts, quality-gated.

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::acquire::AcquireStrategy;
use crate::error::Result;
use crate::normalize::youtube_video_id;
use crate::quality::assess_transcript;
use crate::traits::TranscriptSource;
use crate::types::{AcquiredText, AcquisitionMethod, SourceInput};

/// Fetches a platform-native caption track and runs it through the
/// quality gate. Defers (rather than fails) whenever the transcript is
/// missing, unfetchable, or below the quality bar, so the download
/// fallback always gets its turn.
pub struct TranscriptStrategy {
    source: Arc<dyn TranscriptSource>,
}

impl TranscriptStrategy {
    pub fn new(source: Arc<dyn TranscriptSource>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl AcquireStrategy for TranscriptStrategy {
    fn name(&self) -> &str {
        "native-transcript"
    }

    fn supports(&self, source: &SourceInput) -> bool {
        match source {
            SourceInput::Url { url } => youtube_video_id(url).is_some(),
            SourceInput::Upload { .. } => false,
        }
    }

    async fn acquire(
        &self,
        source: &SourceInput,
        _workdir: &Path,
    ) -> Result<Option<AcquiredText>> {
        let SourceInput::Url { url } = source else {
            return Ok(None);
        };
        let Some(video_id) = youtube_video_id(url) else {
            return Ok(None);
        };

        // A failed transcript fetch is never fatal: the download path
        // can still succeed.
        let transcript = match self.source.fetch(&video_id).await {
            Ok(Some(t)) => t,
            Ok(None) => {
                debug!(%video_id, "no native transcript available");
                return Ok(None);
            }
            Err(e) => {
                warn!(%video_id, error = %e, "transcript fetch failed, deferring");
                return Ok(None);
            }
        };

        let report = assess_transcript(&transcript.text, transcript.segment_count);
        if !report.tier.use_fast_path() {
            info!(
                %video_id,
                tier = ?report.tier,
                score = report.score,
                "transcript below quality bar, deferring to download"
            );
            return Ok(None);
        }

        info!(%video_id, tier = ?report.tier, segments = transcript.segment_count, "using native transcript");

        let mut acquired = AcquiredText::new(transcript.text, AcquisitionMethod::NativeTranscript)
            .with_segment_count(transcript.segment_count);
        if let Some(language) = transcript.language {
            acquired = acquired.with_language(language);
        }
        Ok(Some(acquired))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;
    use crate::types::NativeTranscript;

    struct FixedSource(Option<NativeTranscript>);

    #[async_trait]
    impl TranscriptSource for FixedSource {
        async fn fetch(&self, _video_id: &str) -> Result<Option<NativeTranscript>> {
            Ok(self.0.clone())
        }
    }

    struct FailingSource;

    #[async_trait]
    impl TranscriptSource for FailingSource {
        async fn fetch(&self, _video_id: &str) -> Result<Option<NativeTranscript>> {
            Err(ExtractionError::Model("transport down".into()))
        }
    }

    fn cooking_transcript() -> NativeTranscript {
        NativeTranscript {
            text: "First we cut the onions and add them to the pot. Then pour in \
                   the stock and heat it until it simmers. Mix in the spices and \
                   cook for twenty minutes. Finally we make the garnish and serve. \
                   This recipe feeds four people comfortably."
                .to_string(),
            segment_count: 12,
            language: Some("en".to_string()),
        }
    }

    fn youtube_source() -> SourceInput {
        SourceInput::url("https://www.youtube.com/watch?v=dQw4w9WgXcQ")
    }

    #[tokio::test]
    async fn good_transcript_is_used() {
        let strategy = TranscriptStrategy::new(Arc::new(FixedSource(Some(cooking_transcript()))));
        let acquired = strategy
            .acquire(&youtube_source(), Path::new("/tmp"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(acquired.method, AcquisitionMethod::NativeTranscript);
        assert_eq!(acquired.segment_count, Some(12));
        assert_eq!(acquired.language.as_deref(), Some("en"));
    }

    #[tokio::test]
    async fn poor_transcript_defers() {
        let poor = NativeTranscript {
            text: "[music] la la la".to_string(),
            segment_count: 2,
            language: None,
        };
        let strategy = TranscriptStrategy::new(Arc::new(FixedSource(Some(poor))));
        let result = strategy
            .acquire(&youtube_source(), Path::new("/tmp"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn missing_transcript_defers() {
        let strategy = TranscriptStrategy::new(Arc::new(FixedSource(None)));
        let result = strategy
            .acquire(&youtube_source(), Path::new("/tmp"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn fetch_error_defers_instead_of_failing() {
        let strategy = TranscriptStrategy::new(Arc::new(FailingSource));
        let result = strategy
            .acquire(&youtube_source(), Path::new("/tmp"))
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn only_recognized_video_urls_supported() {
        let strategy = TranscriptStrategy::new(Arc::new(FixedSource(None)));
        assert!(strategy.supports(&youtube_source()));
        assert!(!strategy.supports(&SourceInput::url("https://example.com/article")));
        assert!(!strategy.supports(&SourceInput::upload("/tmp/a.mp4", "a.mp4", b"x")));
    }
}
