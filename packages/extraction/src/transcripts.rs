//! Live platform transcript source for YouTube.

use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::debug;

use crate::error::Result;
use crate::traits::TranscriptSource;
use crate::types::NativeTranscript;

const TIMEDTEXT_URL: &str = "https://www.youtube.com/api/timedtext";

/// Fetches YouTube's timedtext caption track.
///
/// The endpoint returns an empty body instead of an error when the
/// video has no captions; that maps to `Ok(None)` so the acquisition
/// layer falls back to downloading.
pub struct YoutubeTimedTextSource {
    client: reqwest::Client,
    language: String,
}

impl Default for YoutubeTimedTextSource {
    fn default() -> Self {
        Self::new("en")
    }
}

impl YoutubeTimedTextSource {
    pub fn new(language: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .unwrap_or_default();
        Self {
            client,
            language: language.into(),
        }
    }
}

#[async_trait]
impl TranscriptSource for YoutubeTimedTextSource {
    async fn fetch(&self, video_id: &str) -> Result<Option<NativeTranscript>> {
        let response = self
            .client
            .get(TIMEDTEXT_URL)
            .query(&[("v", video_id), ("lang", &self.language)])
            .send()
            .await
            .map_err(|e| crate::error::ExtractionError::Model(format!("timedtext fetch failed: {e}")))?;

        if !response.status().is_success() {
            debug!(%video_id, status = %response.status(), "timedtext request rejected");
            return Ok(None);
        }

        let body = response
            .text()
            .await
            .map_err(|e| crate::error::ExtractionError::Model(format!("timedtext body read failed: {e}")))?;

        Ok(parse_timedtext(&body, &self.language))
    }
}

/// Parse the timedtext XML into joined segments. Returns `None` for
/// empty or segment-free documents.
fn parse_timedtext(xml: &str, language: &str) -> Option<NativeTranscript> {
    if xml.trim().is_empty() {
        return None;
    }

    let segment_re = Regex::new(r"(?s)<text[^>]*>(.*?)</text>").unwrap();
    let segments: Vec<String> = segment_re
        .captures_iter(xml)
        .map(|c| decode_segment(&c[1]))
        .filter(|s| !s.is_empty())
        .collect();

    if segments.is_empty() {
        return None;
    }

    Some(NativeTranscript {
        segment_count: segments.len(),
        text: segments.join(" "),
        language: Some(language.to_string()),
    })
}

fn decode_segment(raw: &str) -> String {
    raw.replace("&amp;#39;", "'")
        .replace("&#39;", "'")
        .replace("&amp;quot;", "\"")
        .replace("&quot;", "\"")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace('\n', " ")
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_segments_and_entities() {
        let xml = r#"<?xml version="1.0" encoding="utf-8"?>
            <transcript>
              <text start="0.0" dur="2.1">first we&amp;#39;ll chop</text>
              <text start="2.1" dur="1.8">the onions &amp; garlic</text>
              <text start="3.9" dur="2.0">then cook them</text>
            </transcript>"#;
        let transcript = parse_timedtext(xml, "en").unwrap();
        assert_eq!(transcript.segment_count, 3);
        assert_eq!(
            transcript.text,
            "first we'll chop the onions & garlic then cook them"
        );
        assert_eq!(transcript.language.as_deref(), Some("en"));
    }

    #[test]
    fn empty_body_is_no_transcript() {
        assert!(parse_timedtext("", "en").is_none());
        assert!(parse_timedtext("  \n ", "en").is_none());
        assert!(parse_timedtext("<transcript></transcript>", "en").is_none());
    }
}
