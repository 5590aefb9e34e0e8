//! Mock implementations of the external-service traits.
//!
//! Used by unit and integration tests; kept in the library proper so
//! downstream crates can drive the pipeline without live services.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{AcquireError, ExtractionError, Result};
use crate::traits::{MediaDownloader, Transcriber, TranscriptSource, AI};
use crate::types::{Guide, GuideType, NativeTranscript, Transcription};

/// A plausible extracted guide for assertions.
pub fn sample_guide() -> Guide {
    Guide {
        title: "Weeknight tomato pasta".to_string(),
        guide_type: GuideType::Recipe,
        category: Some("Italian cuisine".to_string()),
        language: Some("english".to_string()),
        ingredients: vec![
            "400g spaghetti".to_string(),
            "2 cans crushed tomatoes".to_string(),
            "3 cloves garlic".to_string(),
        ],
        steps: vec![
            "Boil the spaghetti in salted water".to_string(),
            "Cook the garlic gently in olive oil".to_string(),
            "Add the tomatoes and simmer for ten minutes".to_string(),
            "Toss the pasta through the sauce".to_string(),
        ],
        duration: Some("25 minutes".to_string()),
        servings: Some("4".to_string()),
        difficulty: None,
        tips: vec!["Save a cup of pasta water for the sauce".to_string()],
        summary: Some("A quick tomato pasta for busy evenings.".to_string()),
    }
}

/// The same guide as a raw model response.
pub fn sample_guide_json() -> String {
    serde_json::to_string(&sample_guide()).expect("sample guide serializes")
}

/// Scripted model: pops queued responses, falling back to the sample
/// guide once the script runs dry. Counts calls for retry assertions.
pub struct MockAI {
    responses: Mutex<VecDeque<Result<String>>>,
    calls: AtomicUsize,
}

impl Default for MockAI {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAI {
    pub fn new() -> Self {
        Self {
            responses: Mutex::new(VecDeque::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Queue a raw response to return for the next call.
    pub fn respond_with(self, response: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Ok(response.into()));
        self
    }

    /// Queue a transport failure for the next call.
    pub fn fail_with(self, message: impl Into<String>) -> Self {
        self.responses
            .lock()
            .unwrap()
            .push_back(Err(ExtractionError::Model(message.into())));
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl AI for MockAI {
    async fn extract_guide(&self, _text: &str, _language_hint: Option<&str>) -> Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match self.responses.lock().unwrap().pop_front() {
            Some(scripted) => scripted,
            None => Ok(sample_guide_json()),
        }
    }
}

/// Transcriber returning fixed text, or failing when constructed broken.
pub struct MockTranscriber {
    outcome: Result<Transcription>,
}

impl MockTranscriber {
    pub fn returning(text: impl Into<String>) -> Self {
        Self {
            outcome: Ok(Transcription {
                text: text.into(),
                language: Some("en".to_string()),
                duration_secs: Some(90.0),
            }),
        }
    }

    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            outcome: Err(ExtractionError::Transcription(message.into())),
        }
    }
}

#[async_trait]
impl Transcriber for MockTranscriber {
    async fn transcribe(
        &self,
        _audio_path: &Path,
        _language_hint: Option<&str>,
    ) -> Result<Transcription> {
        match &self.outcome {
            Ok(t) => Ok(t.clone()),
            Err(ExtractionError::Transcription(m)) => {
                Err(ExtractionError::Transcription(m.clone()))
            }
            Err(_) => unreachable!("mock transcriber only fails with Transcription"),
        }
    }
}

/// Transcript source returning a fixed track, or none.
pub struct MockTranscriptSource {
    transcript: Option<NativeTranscript>,
}

impl MockTranscriptSource {
    pub fn returning(text: impl Into<String>, segment_count: usize) -> Self {
        Self {
            transcript: Some(NativeTranscript {
                text: text.into(),
                segment_count,
                language: Some("en".to_string()),
            }),
        }
    }

    pub fn empty() -> Self {
        Self { transcript: None }
    }
}

#[async_trait]
impl TranscriptSource for MockTranscriptSource {
    async fn fetch(&self, _video_id: &str) -> Result<Option<NativeTranscript>> {
        Ok(self.transcript.clone())
    }
}

/// Downloader that writes fixed bytes to the destination, or reports the
/// platform as blocked.
pub struct MockDownloader {
    blocked: bool,
}

impl MockDownloader {
    pub fn writing_media() -> Self {
        Self { blocked: false }
    }

    pub fn blocked() -> Self {
        Self { blocked: true }
    }
}

#[async_trait]
impl MediaDownloader for MockDownloader {
    fn name(&self) -> &str {
        "mock"
    }

    fn supports(&self, _url: &str) -> bool {
        true
    }

    async fn download(&self, _url: &str, dest: &Path) -> std::result::Result<(), AcquireError> {
        if self.blocked {
            return Err(AcquireError::blocked("sign-in required"));
        }
        tokio::fs::write(dest, b"mock media bytes")
            .await
            .map_err(|e| AcquireError::unavailable(e.to_string()))?;
        Ok(())
    }
}
