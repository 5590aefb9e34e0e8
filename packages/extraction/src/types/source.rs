//! Source inputs: the URL or uploaded file a job was submitted with.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::normalize::{canonical_source_url, is_video_url};

/// What the user submitted. Immutable after job creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SourceInput {
    /// A link to a video or article.
    Url { url: String },

    /// A file the user uploaded directly.
    Upload {
        /// Where the upload was saved on disk.
        path: PathBuf,
        /// Original file name, for display.
        file_name: String,
        /// SHA-256 of the file content, lowercase hex.
        content_hash: String,
    },
}

impl SourceInput {
    pub fn url(url: impl Into<String>) -> Self {
        Self::Url { url: url.into() }
    }

    pub fn upload(path: impl Into<PathBuf>, file_name: impl Into<String>, content: &[u8]) -> Self {
        Self::Upload {
            path: path.into(),
            file_name: file_name.into(),
            content_hash: hash_content(content),
        }
    }

    /// Canonical identity used as the cache key.
    ///
    /// URLs go through the normalizer; uploads are keyed by content hash
    /// so the same file uploaded twice dedupes regardless of file name.
    pub fn canonical_identity(&self) -> String {
        match self {
            Self::Url { url } => canonical_source_url(url),
            Self::Upload { content_hash, .. } => format!("upload:sha256:{content_hash}"),
        }
    }

    /// True for URLs pointing at a recognized video platform, and for
    /// uploads (which are always treated as media).
    pub fn is_video(&self) -> bool {
        match self {
            Self::Url { url } => is_video_url(url),
            Self::Upload { .. } => true,
        }
    }

    /// Short description for logs.
    pub fn describe(&self) -> String {
        match self {
            Self::Url { url } => url.clone(),
            Self::Upload { file_name, .. } => format!("upload:{file_name}"),
        }
    }
}

/// SHA-256 content hash, lowercase hex.
pub fn hash_content(content: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content);
    let digest = hasher.finalize();
    digest.iter().map(|b| format!("{b:02x}")).collect()
}
