//! Typed errors for the guide extraction pipeline.
//!
//! Uses `thiserror` for library errors (not `anyhow`). Every variant that can
//! terminate a job maps to a user-presentable message via [`user_message`],
//! which is what gets written into the job's `error` field. The `Display`
//! output stays a technical diagnostic for logs.
//!
//! [`user_message`]: ExtractionError::user_message

use thiserror::Error;

/// Errors from the acquisition layer (download, transcript fetch, article fetch).
///
/// Split into two categories because the user-facing remedy differs:
/// a blocked platform means "upload the file instead", an unavailable
/// source means "check the link / try again later".
#[derive(Debug, Error)]
pub enum AcquireError {
    /// The platform detected automated access (bot check, sign-in wall).
    #[error("platform blocked access: {detail}")]
    PlatformBlocked { detail: String },

    /// Network failure, not-found, or otherwise unreachable source.
    #[error("source unavailable: {detail}")]
    Unavailable { detail: String },
}

impl AcquireError {
    pub fn blocked(detail: impl Into<String>) -> Self {
        Self::PlatformBlocked {
            detail: detail.into(),
        }
    }

    pub fn unavailable(detail: impl Into<String>) -> Self {
        Self::Unavailable {
            detail: detail.into(),
        }
    }
}

/// Errors that can occur while processing an extraction job.
#[derive(Debug, Error)]
pub enum ExtractionError {
    /// All acquisition strategies were exhausted.
    #[error("acquisition failed: {0}")]
    Acquisition(#[from] AcquireError),

    /// The speech-to-text call failed. Terminal; no fallback below this layer.
    #[error("transcription failed: {0}")]
    Transcription(String),

    /// The model response contained no parseable guide payload.
    #[error("malformed guide payload: {0}")]
    Malformed(String),

    /// Extraction succeeded but the source is not instructional content
    /// (lyrics, narration, no actionable steps).
    #[error("source is not instructional content")]
    NonInstructional,

    /// Transport-level failure talking to the language model.
    #[error("model service error: {0}")]
    Model(String),

    /// Job store or cache write failure. Logged and best-effort retried at
    /// the orchestration boundary; never changes a computed pipeline result.
    #[error("storage error: {0}")]
    Storage(String),

    /// Filesystem failure (working directory, media files).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl ExtractionError {
    /// The message shown to the user when this error terminates a job.
    ///
    /// Deliberately free of technical vocabulary: "bot detection", "API",
    /// and HTTP status codes are rewritten into actionable guidance.
    pub fn user_message(&self) -> String {
        match self {
            Self::Acquisition(AcquireError::PlatformBlocked { .. }) => {
                "This platform blocked automatic processing. Please download the \
                 video and upload the file directly instead."
                    .to_string()
            }
            Self::Acquisition(AcquireError::Unavailable { .. }) => {
                "We couldn't fetch this source. Please check the link and try \
                 again later."
                    .to_string()
            }
            Self::Transcription(_) => {
                "We couldn't transcribe the audio from this video. Please try \
                 again later, or upload a recording with clearer audio."
                    .to_string()
            }
            Self::Malformed(_) | Self::Model(_) => {
                "We couldn't turn this content into a structured guide right \
                 now. Please try again in a few minutes."
                    .to_string()
            }
            Self::NonInstructional => {
                "This content doesn't appear to be an instructional video or \
                 article, so no guide was created. Try a link that walks \
                 through a recipe or project step by step."
                    .to_string()
            }
            Self::Storage(_) | Self::Io(_) => {
                "Something went wrong while processing this source. Please try \
                 again."
                    .to_string()
            }
        }
    }
}

/// Result type alias for extraction operations.
pub type Result<T> = std::result::Result<T, ExtractionError>;
