//! Article path: fetch a web page or PDF and reduce it to plain text.

use std::path::Path;
use std::time::Duration;

use async_trait::async_trait;
use regex::Regex;
use tracing::{debug, info};

use crate::acquire::AcquireStrategy;
use crate::error::{AcquireError, Result};
use crate::normalize::is_video_url;
use crate::types::{AcquiredText, AcquisitionMethod, SourceInput};

/// Hard cap on article text passed to the extractor.
const MAX_ARTICLE_CHARS: usize = 50_000;

/// Pages with less readable text than this are treated as empty.
const MIN_ARTICLE_CHARS: usize = 100;

const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Fetches non-video URLs as articles: HTML pages get tag-stripped,
/// PDFs get text-extracted. Final strategy in the chain, so its errors
/// are what the user sees when nothing else applied.
pub struct ArticleStrategy {
    client: reqwest::Client,
}

impl Default for ArticleStrategy {
    fn default() -> Self {
        Self::new()
    }
}

impl ArticleStrategy {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

#[async_trait]
impl AcquireStrategy for ArticleStrategy {
    fn name(&self) -> &str {
        "article"
    }

    fn supports(&self, source: &SourceInput) -> bool {
        match source {
            SourceInput::Url { url } => !is_video_url(url),
            SourceInput::Upload { .. } => false,
        }
    }

    async fn acquire(&self, source: &SourceInput, _workdir: &Path) -> Result<Option<AcquiredText>> {
        let SourceInput::Url { url } = source else {
            return Ok(None);
        };

        debug!(%url, "fetching article");
        let response = self
            .client
            .get(url)
            .header("Accept", "text/html,application/xhtml+xml,application/pdf;q=0.9,*/*;q=0.8")
            .send()
            .await
            .map_err(|e| AcquireError::unavailable(format!("article fetch failed: {e}")))?;

        match response.status() {
            reqwest::StatusCode::FORBIDDEN => {
                return Err(AcquireError::blocked("article fetch returned 403").into());
            }
            reqwest::StatusCode::NOT_FOUND => {
                return Err(AcquireError::unavailable("article not found (404)").into());
            }
            status if !status.is_success() => {
                return Err(
                    AcquireError::unavailable(format!("article fetch returned {status}")).into(),
                );
            }
            _ => {}
        }

        let is_pdf = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("application/pdf"))
            .unwrap_or(false)
            || url.split('?').next().unwrap_or(url).ends_with(".pdf");

        let (text, title) = if is_pdf {
            let bytes = response
                .bytes()
                .await
                .map_err(|e| AcquireError::unavailable(format!("pdf body read failed: {e}")))?;
            let text = pdf_extract::extract_text_from_mem(&bytes)
                .map_err(|e| AcquireError::unavailable(format!("pdf text extraction failed: {e}")))?;
            (text, None)
        } else {
            let html = response
                .text()
                .await
                .map_err(|e| AcquireError::unavailable(format!("article body read failed: {e}")))?;
            (html_to_text(&html), page_title(&html))
        };

        let text = normalize_whitespace(&text);
        if text.chars().count() < MIN_ARTICLE_CHARS {
            return Err(
                AcquireError::unavailable("page contained no readable article text").into(),
            );
        }

        let text = truncate_chars(&text, MAX_ARTICLE_CHARS);
        info!(%url, chars = text.chars().count(), pdf = is_pdf, "article text extracted");

        let mut acquired = AcquiredText::new(text, AcquisitionMethod::Article);
        if let Some(title) = title {
            acquired = acquired.with_title(title);
        }
        Ok(Some(acquired))
    }
}

/// Strip markup down to readable text. Deliberately regex-based: good
/// enough for prose pages without pulling in a DOM parser.
fn html_to_text(html: &str) -> String {
    let no_scripts = Regex::new(r"(?is)<(script|style|noscript)\b.*?</(script|style|noscript)>")
        .unwrap()
        .replace_all(html, " ");
    let no_comments = Regex::new(r"(?s)<!--.*?-->")
        .unwrap()
        .replace_all(&no_scripts, " ");
    let with_breaks = Regex::new(r"(?i)</(p|div|li|h[1-6]|tr)>|<br\s*/?>")
        .unwrap()
        .replace_all(&no_comments, "\n");
    let stripped = Regex::new(r"<[^>]+>")
        .unwrap()
        .replace_all(&with_breaks, " ");
    decode_entities(&stripped)
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
}

fn page_title(html: &str) -> Option<String> {
    let captures = Regex::new(r"(?is)<title[^>]*>(.*?)</title>")
        .unwrap()
        .captures(html)?;
    let title = normalize_whitespace(&decode_entities(&captures[1]));
    (!title.is_empty()).then_some(title)
}

/// Collapse runs of whitespace, keeping at most one blank line.
fn normalize_whitespace(text: &str) -> String {
    let lines: Vec<String> = text
        .lines()
        .map(|l| l.split_whitespace().collect::<Vec<_>>().join(" "))
        .collect();

    let mut out = Vec::with_capacity(lines.len());
    let mut blank_run = 0usize;
    for line in lines {
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push(line);
    }
    out.join("\n").trim().to_string()
}

fn truncate_chars(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    text.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_markup_and_scripts() {
        let html = r#"<html><head><title>Bread at Home</title>
            <script>alert("no")</script><style>p { color: red }</style></head>
            <body><!-- nav --><p>Knead the dough for ten minutes.</p>
            <p>Let it rise &amp; bake at 230&deg;.</p></body></html>"#;
        let text = normalize_whitespace(&html_to_text(html));
        assert!(text.contains("Knead the dough for ten minutes."));
        assert!(text.contains("Let it rise & bake"));
        assert!(!text.contains("alert"));
        assert!(!text.contains("color: red"));
        assert!(!text.contains("<p>"));
    }

    #[test]
    fn extracts_and_cleans_title() {
        let html = "<html><head><title>  Sourdough &amp; Rye \n Basics </title></head></html>";
        assert_eq!(page_title(html).as_deref(), Some("Sourdough & Rye Basics"));
        assert_eq!(page_title("<html><body>no title</body></html>"), None);
    }

    #[test]
    fn whitespace_collapses_to_single_blank_lines() {
        let raw = "First   line\n\n\n\nSecond\tline\n";
        assert_eq!(normalize_whitespace(raw), "First line\n\nSecond line");
    }

    #[test]
    fn truncation_is_char_based() {
        let long = "ü".repeat(MAX_ARTICLE_CHARS + 10);
        let cut = truncate_chars(&long, MAX_ARTICLE_CHARS);
        assert_eq!(cut.chars().count(), MAX_ARTICLE_CHARS);
    }

    #[test]
    fn supports_non_video_urls_only() {
        let strategy = ArticleStrategy::new();
        assert!(strategy.supports(&SourceInput::url("https://example.com/recipe")));
        assert!(!strategy.supports(&SourceInput::url(
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        )));
        assert!(!strategy.supports(&SourceInput::upload("/tmp/a.mp4", "a.mp4", b"x")));
    }
}
