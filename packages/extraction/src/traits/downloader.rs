//! Media download trait for the fallback path.

use std::path::Path;

use async_trait::async_trait;

use crate::error::AcquireError;

/// One strategy for getting a media file onto disk.
///
/// Downloaders are tried in priority order by the download strategy:
/// the platform-specific utility first, then the generic HTTP fetch.
/// Each failure falls through to the next downloader.
#[async_trait]
pub trait MediaDownloader: Send + Sync {
    /// Short name for logs ("yt-dlp", "http").
    fn name(&self) -> &str;

    /// Whether this downloader handles the given URL shape.
    fn supports(&self, url: &str) -> bool;

    /// Download the media behind `url` to `dest`.
    async fn download(&self, url: &str, dest: &Path) -> Result<(), AcquireError>;
}
