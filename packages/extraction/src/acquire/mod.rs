//! Acquisition layer: turn a source into plain text.
//!
//! Strategies are an ordered list behind one trait, tried until one
//! yields text. A strategy can *defer* (`Ok(None)`: "not mine, or not
//! good enough, try the next one") or *fail*. Acquisition failures fall
//! through to the next strategy; anything else (transcription errors in
//! particular) aborts immediately because the layers below have no
//! further fallback.

pub mod article;
pub mod download;
pub mod transcript;
pub mod workdir;

use std::path::Path;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::error::{AcquireError, ExtractionError, Result};
use crate::types::{AcquiredText, SourceInput};

pub use article::ArticleStrategy;
pub use download::{DownloadStrategy, HttpMediaDownloader, YtDlpDownloader};
pub use transcript::TranscriptStrategy;
pub use workdir::JobWorkdir;

/// One way of obtaining text for a source.
#[async_trait]
pub trait AcquireStrategy: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Whether this strategy applies to the source shape at all.
    fn supports(&self, source: &SourceInput) -> bool;

    /// Attempt acquisition. `Ok(None)` defers to the next strategy.
    async fn acquire(
        &self,
        source: &SourceInput,
        workdir: &Path,
    ) -> Result<Option<AcquiredText>>;
}

/// Ordered strategy chain. Preference order is fixed at construction:
/// native transcript, then download + transcribe, then article.
pub struct Acquirer {
    strategies: Vec<Box<dyn AcquireStrategy>>,
}

impl Acquirer {
    pub fn new(strategies: Vec<Box<dyn AcquireStrategy>>) -> Self {
        Self { strategies }
    }

    /// Run the chain until a strategy yields text.
    ///
    /// When every applicable strategy fails or defers, the error kept is
    /// the most actionable one seen: a platform block beats a generic
    /// unavailability, because the user remedies differ.
    pub async fn acquire(&self, source: &SourceInput, workdir: &Path) -> Result<AcquiredText> {
        let mut last_error: Option<AcquireError> = None;

        for strategy in &self.strategies {
            if !strategy.supports(source) {
                continue;
            }

            debug!(strategy = strategy.name(), source = %source.describe(), "trying acquisition strategy");

            match strategy.acquire(source, workdir).await {
                Ok(Some(text)) => {
                    info!(
                        strategy = strategy.name(),
                        method = ?text.method,
                        chars = text.text.chars().count(),
                        "acquisition succeeded"
                    );
                    return Ok(text);
                }
                Ok(None) => {
                    debug!(strategy = strategy.name(), "strategy deferred");
                }
                Err(ExtractionError::Acquisition(e)) => {
                    warn!(strategy = strategy.name(), error = %e, "strategy failed");
                    last_error = Some(prefer_blocked(last_error, e));
                }
                // Transcription and everything below it is terminal.
                Err(other) => return Err(other),
            }
        }

        Err(ExtractionError::Acquisition(last_error.unwrap_or_else(
            || AcquireError::unavailable("no acquisition strategy matched this source"),
        )))
    }
}

/// Keep a platform-block error over a generic unavailability.
fn prefer_blocked(previous: Option<AcquireError>, new: AcquireError) -> AcquireError {
    match (previous, new) {
        (Some(blocked @ AcquireError::PlatformBlocked { .. }), AcquireError::Unavailable { .. }) => {
            blocked
        }
        (_, new) => new,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::AcquisitionMethod;

    struct Defers;

    #[async_trait]
    impl AcquireStrategy for Defers {
        fn name(&self) -> &str {
            "defers"
        }
        fn supports(&self, _: &SourceInput) -> bool {
            true
        }
        async fn acquire(&self, _: &SourceInput, _: &Path) -> Result<Option<AcquiredText>> {
            Ok(None)
        }
    }

    struct Blocks;

    #[async_trait]
    impl AcquireStrategy for Blocks {
        fn name(&self) -> &str {
            "blocks"
        }
        fn supports(&self, _: &SourceInput) -> bool {
            true
        }
        async fn acquire(&self, _: &SourceInput, _: &Path) -> Result<Option<AcquiredText>> {
            Err(AcquireError::blocked("sign-in wall").into())
        }
    }

    struct Unavail;

    #[async_trait]
    impl AcquireStrategy for Unavail {
        fn name(&self) -> &str {
            "unavail"
        }
        fn supports(&self, _: &SourceInput) -> bool {
            true
        }
        async fn acquire(&self, _: &SourceInput, _: &Path) -> Result<Option<AcquiredText>> {
            Err(AcquireError::unavailable("timeout").into())
        }
    }

    struct Succeeds;

    #[async_trait]
    impl AcquireStrategy for Succeeds {
        fn name(&self) -> &str {
            "succeeds"
        }
        fn supports(&self, _: &SourceInput) -> bool {
            true
        }
        async fn acquire(&self, _: &SourceInput, _: &Path) -> Result<Option<AcquiredText>> {
            Ok(Some(AcquiredText::new(
                "some text",
                AcquisitionMethod::Article,
            )))
        }
    }

    #[tokio::test]
    async fn falls_through_deferral_and_failure_to_success() {
        let acquirer = Acquirer::new(vec![Box::new(Defers), Box::new(Unavail), Box::new(Succeeds)]);
        let source = SourceInput::url("https://example.com/a");
        let text = acquirer.acquire(&source, Path::new("/tmp")).await.unwrap();
        assert_eq!(text.text, "some text");
    }

    #[tokio::test]
    async fn platform_block_survives_later_failures() {
        let acquirer = Acquirer::new(vec![Box::new(Blocks), Box::new(Unavail)]);
        let source = SourceInput::url("https://example.com/a");
        let err = acquirer
            .acquire(&source, Path::new("/tmp"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Acquisition(AcquireError::PlatformBlocked { .. })
        ));
    }

    #[tokio::test]
    async fn all_deferred_is_unavailable() {
        let acquirer = Acquirer::new(vec![Box::new(Defers)]);
        let source = SourceInput::url("https://example.com/a");
        let err = acquirer
            .acquire(&source, Path::new("/tmp"))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            ExtractionError::Acquisition(AcquireError::Unavailable { .. })
        ));
    }
}
