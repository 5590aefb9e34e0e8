//! Fallback path: download media, extract audio, transcribe.
//!
//! Covers both submitted video URLs and uploaded files. Downloaders are
//! their own seam so the platform utility and the plain HTTP fetch can
//! fall through to each other; everything after the media file is on
//! disk (audio extraction, speech-to-text) is terminal for the job.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info, warn};

use crate::acquire::AcquireStrategy;
use crate::error::{AcquireError, ExtractionError, Result};
use crate::traits::{MediaDownloader, Transcriber};
use crate::types::{AcquiredText, AcquisitionMethod, SourceInput};

/// Browser-like User-Agent for direct media fetches. Some platforms
/// serve an interstitial page to unknown clients.
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// Extensions the transcriber accepts directly, no audio extraction.
const AUDIO_EXTENSIONS: &[&str] = &["mp3", "m4a", "wav", "ogg", "flac", "webm"];

/// Download + transcribe strategy.
pub struct DownloadStrategy {
    downloaders: Vec<Box<dyn MediaDownloader>>,
    transcriber: Arc<dyn Transcriber>,
}

impl DownloadStrategy {
    pub fn new(downloaders: Vec<Box<dyn MediaDownloader>>, transcriber: Arc<dyn Transcriber>) -> Self {
        Self {
            downloaders,
            transcriber,
        }
    }

    /// Try each downloader that claims the URL, in order. A platform
    /// block is kept over later generic failures.
    async fn fetch_media(&self, url: &str, workdir: &Path) -> Result<PathBuf> {
        let dest = workdir.join("media.mp4");
        let mut last_error: Option<AcquireError> = None;

        for downloader in &self.downloaders {
            if !downloader.supports(url) {
                continue;
            }
            debug!(downloader = downloader.name(), %url, "downloading media");
            match downloader.download(url, &dest).await {
                Ok(()) => return Ok(dest),
                Err(e) => {
                    warn!(downloader = downloader.name(), error = %e, "download failed");
                    last_error = Some(match (last_error.take(), e) {
                        (
                            Some(blocked @ AcquireError::PlatformBlocked { .. }),
                            AcquireError::Unavailable { .. },
                        ) => blocked,
                        (_, e) => e,
                    });
                }
            }
        }

        Err(ExtractionError::Acquisition(last_error.unwrap_or_else(
            || AcquireError::unavailable("no downloader handles this URL"),
        )))
    }

    async fn transcribe_media(
        &self,
        media: &Path,
        workdir: &Path,
        method: AcquisitionMethod,
    ) -> Result<AcquiredText> {
        let audio = if is_audio_file(media) {
            media.to_path_buf()
        } else {
            let audio = workdir.join("audio.mp3");
            extract_audio(media, &audio).await?;
            audio
        };

        let transcription = self.transcriber.transcribe(&audio, None).await?;
        info!(
            chars = transcription.text.chars().count(),
            duration_secs = transcription.duration_secs,
            "transcription complete"
        );

        let mut acquired = AcquiredText::new(transcription.text, method);
        if let Some(language) = transcription.language {
            acquired = acquired.with_language(language);
        }
        Ok(acquired)
    }
}

#[async_trait]
impl AcquireStrategy for DownloadStrategy {
    fn name(&self) -> &str {
        "download-transcribe"
    }

    fn supports(&self, source: &SourceInput) -> bool {
        source.is_video()
    }

    async fn acquire(&self, source: &SourceInput, workdir: &Path) -> Result<Option<AcquiredText>> {
        match source {
            SourceInput::Url { url } => {
                let media = self.fetch_media(url, workdir).await?;
                let acquired = self
                    .transcribe_media(&media, workdir, AcquisitionMethod::DownloadTranscribe)
                    .await?;
                Ok(Some(acquired))
            }
            SourceInput::Upload { path, file_name, .. } => {
                debug!(%file_name, "transcribing uploaded file");
                let acquired = self
                    .transcribe_media(path, workdir, AcquisitionMethod::Upload)
                    .await?;
                Ok(Some(acquired))
            }
        }
    }
}

fn is_audio_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| AUDIO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

/// Strip the video track and re-encode the audio to mp3.
async fn extract_audio(media: &Path, audio: &Path) -> Result<()> {
    let output = Command::new("ffmpeg")
        .arg("-y")
        .arg("-i")
        .arg(media)
        .args(["-vn", "-acodec", "libmp3lame", "-b:a", "128k"])
        .arg(audio)
        .stdout(Stdio::null())
        .stderr(Stdio::piped())
        .output()
        .await?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractionError::Transcription(format!(
            "audio extraction failed: {}",
            stderr.lines().last().unwrap_or("ffmpeg error")
        )));
    }
    Ok(())
}

/// Downloads video URLs through the `yt-dlp` utility.
pub struct YtDlpDownloader {
    binary: String,
    timeout: Duration,
}

impl Default for YtDlpDownloader {
    fn default() -> Self {
        Self {
            binary: "yt-dlp".to_string(),
            timeout: Duration::from_secs(300),
        }
    }
}

impl YtDlpDownloader {
    pub fn new(binary: impl Into<String>, timeout: Duration) -> Self {
        Self {
            binary: binary.into(),
            timeout,
        }
    }
}

#[async_trait]
impl MediaDownloader for YtDlpDownloader {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    fn supports(&self, url: &str) -> bool {
        crate::normalize::is_video_url(url)
    }

    async fn download(&self, url: &str, dest: &Path) -> std::result::Result<(), AcquireError> {
        // Lowest-bitrate mp4: only the audio track matters downstream.
        let run = Command::new(&self.binary)
            .args(["-f", "worst[ext=mp4]/worst", "--no-playlist", "-o"])
            .arg(dest)
            .arg(url)
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .output();

        let output = tokio::time::timeout(self.timeout, run)
            .await
            .map_err(|_| AcquireError::unavailable("download timed out"))?
            .map_err(|e| AcquireError::unavailable(format!("failed to run downloader: {e}")))?;

        if output.status.success() {
            return Ok(());
        }

        let stderr = String::from_utf8_lossy(&output.stderr).to_lowercase();
        if stderr.contains("sign in to confirm") || stderr.contains("bot") {
            Err(AcquireError::blocked("platform requires sign-in"))
        } else {
            Err(AcquireError::unavailable(format!(
                "downloader exited with {}",
                output.status
            )))
        }
    }
}

/// Plain HTTP fetch for direct media links.
pub struct HttpMediaDownloader {
    client: reqwest::Client,
}

impl Default for HttpMediaDownloader {
    fn default() -> Self {
        Self::new()
    }
}

impl HttpMediaDownloader {
    pub fn new() -> Self {
        let client = reqwest::Client::builder()
            .user_agent(BROWSER_USER_AGENT)
            .timeout(Duration::from_secs(120))
            .build()
            .unwrap_or_default();
        Self { client }
    }
}

#[async_trait]
impl MediaDownloader for HttpMediaDownloader {
    fn name(&self) -> &str {
        "http"
    }

    fn supports(&self, url: &str) -> bool {
        url.starts_with("http://") || url.starts_with("https://")
    }

    async fn download(&self, url: &str, dest: &Path) -> std::result::Result<(), AcquireError> {
        let mut response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| AcquireError::unavailable(format!("media fetch failed: {e}")))?;

        if response.status() == reqwest::StatusCode::FORBIDDEN {
            return Err(AcquireError::blocked("media fetch returned 403"));
        }
        if !response.status().is_success() {
            return Err(AcquireError::unavailable(format!(
                "media fetch returned {}",
                response.status()
            )));
        }

        let html_content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|ct| ct.starts_with("text/html"))
            .unwrap_or(false);
        if html_content_type {
            return Err(AcquireError::blocked(
                "platform served a page instead of media",
            ));
        }

        // Stream straight to disk; media files run to hundreds of MB.
        // The first chunk is sniffed because an interstitial page can
        // arrive without an honest content type.
        let mut file = tokio::fs::File::create(dest)
            .await
            .map_err(|e| AcquireError::unavailable(format!("failed to save media: {e}")))?;
        let mut sniffed = false;
        while let Some(chunk) = response
            .chunk()
            .await
            .map_err(|e| AcquireError::unavailable(format!("media body read failed: {e}")))?
        {
            if !sniffed {
                sniffed = true;
                if sniffs_as_html(&chunk) {
                    return Err(AcquireError::blocked(
                        "platform served a page instead of media",
                    ));
                }
            }
            file.write_all(&chunk)
                .await
                .map_err(|e| AcquireError::unavailable(format!("failed to save media: {e}")))?;
        }
        file.flush()
            .await
            .map_err(|e| AcquireError::unavailable(format!("failed to save media: {e}")))?;
        Ok(())
    }
}

/// An HTML page instead of media bytes is an interstitial, not the file.
fn sniffs_as_html(head: &[u8]) -> bool {
    let head = String::from_utf8_lossy(&head[..head.len().min(256)]).to_lowercase();
    head.contains("<!doctype") || head.contains("<html")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Transcription;

    struct WritesBytes;

    #[async_trait]
    impl MediaDownloader for WritesBytes {
        fn name(&self) -> &str {
            "writes"
        }
        fn supports(&self, _: &str) -> bool {
            true
        }
        async fn download(&self, _: &str, dest: &Path) -> std::result::Result<(), AcquireError> {
            tokio::fs::write(dest, b"media bytes")
                .await
                .map_err(|e| AcquireError::unavailable(e.to_string()))?;
            Ok(())
        }
    }

    struct BlockedDownloader;

    #[async_trait]
    impl MediaDownloader for BlockedDownloader {
        fn name(&self) -> &str {
            "blocked"
        }
        fn supports(&self, _: &str) -> bool {
            true
        }
        async fn download(&self, _: &str, _: &Path) -> std::result::Result<(), AcquireError> {
            Err(AcquireError::blocked("sign-in wall"))
        }
    }

    struct UnavailableDownloader;

    #[async_trait]
    impl MediaDownloader for UnavailableDownloader {
        fn name(&self) -> &str {
            "unavailable"
        }
        fn supports(&self, _: &str) -> bool {
            true
        }
        async fn download(&self, _: &str, _: &Path) -> std::result::Result<(), AcquireError> {
            Err(AcquireError::unavailable("connection reset"))
        }
    }

    struct EchoTranscriber;

    #[async_trait]
    impl Transcriber for EchoTranscriber {
        async fn transcribe(
            &self,
            audio_path: &Path,
            _language_hint: Option<&str>,
        ) -> Result<Transcription> {
            let _ = tokio::fs::metadata(audio_path).await?;
            Ok(Transcription {
                text: "transcribed words".to_string(),
                language: Some("en".to_string()),
                duration_secs: Some(12.5),
            })
        }
    }

    fn workdir() -> PathBuf {
        let dir = std::env::temp_dir().join(format!("download-test-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[tokio::test]
    async fn fetch_media_falls_through_to_working_downloader() {
        let strategy = DownloadStrategy::new(
            vec![Box::new(UnavailableDownloader), Box::new(WritesBytes)],
            Arc::new(EchoTranscriber),
        );
        let dir = workdir();
        let media = strategy
            .fetch_media("https://www.tiktok.com/@u/video/1", &dir)
            .await
            .unwrap();
        assert!(media.exists());
    }

    #[tokio::test]
    async fn fetch_media_prefers_blocked_error() {
        let strategy = DownloadStrategy::new(
            vec![Box::new(BlockedDownloader), Box::new(UnavailableDownloader)],
            Arc::new(EchoTranscriber),
        );
        let err = strategy
            .fetch_media("https://www.tiktok.com/@u/video/1", &workdir())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Acquisition(AcquireError::PlatformBlocked { .. })
        ));
    }

    #[tokio::test]
    async fn uploaded_audio_skips_extraction() {
        let dir = workdir();
        let upload_path = dir.join("voice-note.mp3");
        tokio::fs::write(&upload_path, b"fake mp3").await.unwrap();

        let strategy = DownloadStrategy::new(vec![], Arc::new(EchoTranscriber));
        let source = SourceInput::upload(&upload_path, "voice-note.mp3", b"fake mp3");
        let acquired = strategy.acquire(&source, &dir).await.unwrap().unwrap();

        assert_eq!(acquired.method, AcquisitionMethod::Upload);
        assert_eq!(acquired.text, "transcribed words");
        assert_eq!(acquired.language.as_deref(), Some("en"));
    }

    #[test]
    fn html_sniff_catches_interstitial_pages() {
        assert!(sniffs_as_html(b"<!DOCTYPE html><html><head>"));
        assert!(sniffs_as_html(b"\n  <HTML lang=\"en\">"));
        // mp4 container magic, then arbitrary bytes.
        assert!(!sniffs_as_html(b"\x00\x00\x00\x20ftypisom\x00\x00\x02\x00"));
        assert!(!sniffs_as_html(b""));
    }

    #[test]
    fn audio_extension_detection() {
        assert!(is_audio_file(Path::new("/tmp/a.MP3")));
        assert!(is_audio_file(Path::new("/tmp/a.wav")));
        assert!(!is_audio_file(Path::new("/tmp/a.mp4")));
        assert!(!is_audio_file(Path::new("/tmp/noext")));
    }

    #[test]
    fn ytdlp_supports_only_video_platforms() {
        let d = YtDlpDownloader::default();
        assert!(d.supports("https://www.youtube.com/watch?v=abc12345678"));
        assert!(d.supports("https://www.tiktok.com/@u/video/1"));
        assert!(!d.supports("https://example.com/blog/post"));
    }
}
