//! Data types for the guide extraction pipeline.

pub mod acquired;
pub mod guide;
pub mod source;

pub use acquired::{AcquiredText, AcquisitionMethod, NativeTranscript, Transcription};
pub use guide::{CachedGuide, Difficulty, Guide, GuideType};
pub use source::SourceInput;
