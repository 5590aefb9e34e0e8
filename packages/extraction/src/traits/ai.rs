//! AI trait for the guide extraction LLM call.

use async_trait::async_trait;

use crate::error::Result;

/// The hosted language model behind guide extraction.
///
/// Implementations wrap a specific provider and handle transport only.
/// The method returns the *raw* model response: the pipeline locates and
/// parses the structured payload itself, because a response may wrap the
/// JSON in prose and because parse failures drive the retry-once policy.
#[async_trait]
pub trait AI: Send + Sync {
    /// Ask the model to extract a structured guide from source text.
    ///
    /// `language_hint` is the detected source language, when known; the
    /// prompt tells the model to detect it otherwise.
    async fn extract_guide(&self, text: &str, language_hint: Option<&str>) -> Result<String>;
}
