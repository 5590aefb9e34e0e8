//! Content quality gate for native transcripts.
//!
//! Decides whether a platform transcript is substantive enough for the
//! fast path, or whether the job should fall back to download +
//! transcribe (higher cost, higher fidelity). This is a heuristic
//! router, not a hard gate: it never fails, it only routes.

use serde::{Deserialize, Serialize};

/// Minimum character count for a transcript to be usable as-is.
pub const MIN_TRANSCRIPT_CHARS: usize = 200;

/// Minimum number of discrete caption segments.
pub const MIN_TRANSCRIPT_SEGMENTS: usize = 5;

/// Verbs that indicate instructional content.
const ACTION_VOCABULARY: &str =
    r"(?i)\b(add|mix|cut|pour|heat|cook|make|create|build|stir|place|apply|attach)\b";

/// Markers that dominate music-only or otherwise garbled caption tracks.
const GARBLED_MARKERS: &[&str] = &["[music]", "[applause]", "[laughter]"];

/// Quality tier for acquired text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QualityTier {
    Poor,
    Fair,
    Good,
    Excellent,
}

impl QualityTier {
    /// Only Excellent and Good transcripts proceed on the fast path;
    /// Fair and Poor force the download + transcribe fallback.
    pub fn use_fast_path(self) -> bool {
        matches!(self, Self::Excellent | Self::Good)
    }
}

/// Individual heuristic checks behind a quality assessment.
#[derive(Debug, Clone, Copy)]
pub struct QualityChecks {
    pub min_length: bool,
    pub multiple_segments: bool,
    pub not_garbled: bool,
    pub action_vocabulary: bool,
}

impl QualityChecks {
    fn passed(&self) -> usize {
        [
            self.min_length,
            self.multiple_segments,
            self.not_garbled,
            self.action_vocabulary,
        ]
        .iter()
        .filter(|&&c| c)
        .count()
    }
}

/// The result of assessing a transcript.
#[derive(Debug, Clone)]
pub struct QualityReport {
    pub tier: QualityTier,
    pub score: f32,
    pub checks: QualityChecks,
}

/// Assess transcript text against the quality heuristics.
///
/// Score thresholds: >= 0.75 Excellent, >= 0.5 Good, >= 0.25 Fair, else
/// Poor. Text below [`MIN_TRANSCRIPT_CHARS`] is capped at Fair no matter
/// what else passes, so short text can never take the fast path.
pub fn assess_transcript(text: &str, segment_count: usize) -> QualityReport {
    let char_count = text.chars().count();
    let lower = text.to_lowercase();

    let garbled = GARBLED_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
        && char_count <= 500;

    let checks = QualityChecks {
        min_length: char_count >= MIN_TRANSCRIPT_CHARS,
        multiple_segments: segment_count >= MIN_TRANSCRIPT_SEGMENTS,
        not_garbled: !garbled,
        action_vocabulary: regex::Regex::new(ACTION_VOCABULARY).unwrap().is_match(text),
    };

    let score = checks.passed() as f32 / 4.0;

    let mut tier = if score >= 0.75 {
        QualityTier::Excellent
    } else if score >= 0.5 {
        QualityTier::Good
    } else if score >= 0.25 {
        QualityTier::Fair
    } else {
        QualityTier::Poor
    };

    // Length is a hard floor: too-short text never fast-paths.
    if !checks.min_length {
        tier = tier.min(QualityTier::Fair);
    }

    QualityReport {
        tier,
        score,
        checks,
    }
}
