//! Intermediate artifacts produced by the acquisition layer.

use serde::{Deserialize, Serialize};

/// Which path produced the text for a job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AcquisitionMethod {
    /// Platform-native transcript, no media download.
    NativeTranscript,
    /// Full media download, audio extraction, speech-to-text.
    DownloadTranscribe,
    /// HTML or PDF article fetch.
    Article,
    /// User-uploaded file, audio extraction, speech-to-text.
    Upload,
}

/// Plain text describing a source, ready for the guide extractor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AcquiredText {
    pub text: String,

    /// Detected or declared language, when known.
    pub language: Option<String>,

    pub method: AcquisitionMethod,

    /// Source title, when the acquisition path could see one (articles).
    pub title: Option<String>,

    /// Number of discrete transcript segments, for the quality gate.
    pub segment_count: Option<usize>,
}

impl AcquiredText {
    pub fn new(text: impl Into<String>, method: AcquisitionMethod) -> Self {
        Self {
            text: text.into(),
            language: None,
            method,
            title: None,
            segment_count: None,
        }
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = Some(language.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_segment_count(mut self, count: usize) -> Self {
        self.segment_count = Some(count);
        self
    }
}

/// A platform-native caption track, before the quality gate.
#[derive(Debug, Clone)]
pub struct NativeTranscript {
    /// All segments joined into one text.
    pub text: String,
    pub segment_count: usize,
    pub language: Option<String>,
}

/// Output of the speech-to-text adapter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transcription {
    pub text: String,
    pub language: Option<String>,
    pub duration_secs: Option<f64>,
}
