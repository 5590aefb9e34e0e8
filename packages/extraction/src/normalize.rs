//! Canonical source identity for cache lookups.
//!
//! Two URLs that refer to the same underlying content should normalize to
//! the same string whenever the platform's stable identifier is
//! extractable. Normalization is pure and fails open: on any parse
//! failure the original string comes back unchanged, because a cache miss
//! is safe and crashing a submission is not.

use url::Url;

/// Normalize a raw URL to its canonical form.
///
/// Recognized video platforms are reduced to a minimal URL around the
/// platform's stable content id (tracking parameters, playlist context
/// and timestamps are discarded). Unrecognized hosts keep
/// scheme + host + path, dropping query string and fragment.
pub fn canonical_source_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return raw.to_string();
    }

    if let Some(id) = youtube_video_id(trimmed) {
        return format!("https://www.youtube.com/watch?v={id}");
    }

    match Url::parse(trimmed) {
        Ok(parsed) => match parsed.host_str() {
            Some(host) => format!("{}://{}{}", parsed.scheme(), host, parsed.path()),
            None => raw.to_string(),
        },
        Err(_) => raw.to_string(),
    }
}

/// Extract the 11-character YouTube video id from any known URL shape.
pub fn youtube_video_id(url: &str) -> Option<String> {
    if !url.contains("youtube.com") && !url.contains("youtu.be") {
        return None;
    }

    let pattern = regex::Regex::new(
        r"(?:youtube\.com/watch\?.*?v=|youtu\.be/|youtube\.com/embed/|youtube\.com/shorts/|youtube\.com/v/)([A-Za-z0-9_-]{11})",
    )
    .unwrap();

    pattern
        .captures(url)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().to_string())
}

/// True when the URL points at a platform we treat as video.
pub fn is_video_url(url: &str) -> bool {
    let lower = url.to_lowercase();
    lower.contains("youtube.com")
        || lower.contains("youtu.be")
        || lower.contains("tiktok.com")
        || lower.contains("instagram.com")
}

/// Whether two URLs refer to the same canonical source.
pub fn urls_match(a: &str, b: &str) -> bool {
    canonical_source_url(a) == canonical_source_url(b)
}
