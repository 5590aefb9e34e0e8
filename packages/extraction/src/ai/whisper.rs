//! Whisper speech-to-text adapter.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::error::{ExtractionError, Result};
use crate::traits::Transcriber;
use crate::types::Transcription;

const TRANSCRIPTIONS_URL: &str = "https://api.openai.com/v1/audio/transcriptions";
const MODEL: &str = "whisper-1";

/// Transcriber backed by the OpenAI audio transcriptions endpoint.
pub struct WhisperTranscriber {
    client: reqwest::Client,
    api_key: String,
}

impl WhisperTranscriber {
    pub fn new(api_key: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(300))
            .build()
            .unwrap_or_default();
        Self {
            client,
            api_key: api_key.into(),
        }
    }
}

#[derive(Deserialize)]
struct VerboseTranscription {
    text: String,
    #[serde(default)]
    language: Option<String>,
    #[serde(default)]
    duration: Option<f64>,
}

#[async_trait]
impl Transcriber for WhisperTranscriber {
    async fn transcribe(
        &self,
        audio_path: &Path,
        language_hint: Option<&str>,
    ) -> Result<Transcription> {
        let bytes = tokio::fs::read(audio_path).await?;
        let file_name = audio_path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("audio.mp3")
            .to_string();

        debug!(file = %file_name, bytes = bytes.len(), "uploading audio for transcription");

        let mut form = reqwest::multipart::Form::new()
            .part(
                "file",
                reqwest::multipart::Part::bytes(bytes).file_name(file_name),
            )
            .text("model", MODEL)
            .text("response_format", "verbose_json");
        if let Some(language) = language_hint {
            form = form.text("language", language.to_string());
        }

        let response = self
            .client
            .post(TRANSCRIPTIONS_URL)
            .bearer_auth(&self.api_key)
            .multipart(form)
            .send()
            .await
            .map_err(|e| ExtractionError::Transcription(format!("transcription request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ExtractionError::Transcription(format!(
                "transcription request returned {status}: {body}"
            )));
        }

        let parsed: VerboseTranscription = response.json().await.map_err(|e| {
            ExtractionError::Transcription(format!("transcription response did not parse: {e}"))
        })?;

        Ok(Transcription {
            text: parsed.text,
            language: parsed.language,
            duration_secs: parsed.duration,
        })
    }
}
