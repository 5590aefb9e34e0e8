//! Live service adapters, behind cargo features.

#[cfg(feature = "anthropic")]
pub mod anthropic;

#[cfg(feature = "openai")]
pub mod whisper;

#[cfg(feature = "anthropic")]
pub use anthropic::AnthropicModel;

#[cfg(feature = "openai")]
pub use whisper::WhisperTranscriber;
