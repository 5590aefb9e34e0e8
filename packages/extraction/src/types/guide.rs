//! The Guide artifact: the structured output of extraction.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

use super::acquired::AcquisitionMethod;

/// What kind of guide the model classified the source as.
///
/// `Unclear` is a low-confidence marker, not an error: the model still
/// emits a guide, it just couldn't classify the source confidently.
/// Unknown strings from the model also land here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum GuideType {
    Recipe,
    Craft,
    Howto,
    Other,
    #[serde(other)]
    Unclear,
}

/// Difficulty estimate for a guide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

/// A structured how-to guide extracted from a video or article.
///
/// `ingredients` and `steps` are order-significant: `steps` must reflect
/// the execution order conveyed by the source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Guide {
    pub title: String,

    #[serde(rename = "type", default = "default_guide_type")]
    pub guide_type: GuideType,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default)]
    pub language: Option<String>,

    /// Materials or ingredients, in the order the source lists them.
    #[serde(default)]
    pub ingredients: Vec<String>,

    /// Instructions in execution order.
    #[serde(default)]
    pub steps: Vec<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub duration: Option<String>,

    #[serde(default, deserialize_with = "string_or_number")]
    pub servings: Option<String>,

    #[serde(default, deserialize_with = "lenient_difficulty")]
    pub difficulty: Option<Difficulty>,

    #[serde(default)]
    pub tips: Vec<String>,

    #[serde(default)]
    pub summary: Option<String>,
}

fn default_guide_type() -> GuideType {
    GuideType::Unclear
}

/// Models occasionally return `"servings": 4` where a string was asked for.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// An off-list difficulty string ("moderate", "beginner") becomes `None`
/// rather than failing the whole parse.
fn lenient_difficulty<'de, D>(deserializer: D) -> Result<Option<Difficulty>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.and_then(|s| match s.to_lowercase().as_str() {
        "easy" => Some(Difficulty::Easy),
        "medium" => Some(Difficulty::Medium),
        "hard" => Some(Difficulty::Hard),
        _ => None,
    }))
}

/// A previously extracted guide keyed by canonical source identity.
///
/// The first successful extraction for a canonical source becomes the
/// template cloned for every later requester of the same source. Clones
/// are independent copies; nothing is shared with the stored entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CachedGuide {
    /// Canonical source identity (see [`crate::normalize`]).
    pub canonical_url: String,

    pub guide: Guide,

    /// Raw transcript or article text the guide was extracted from.
    pub source_text: String,

    pub method: AcquisitionMethod,

    pub created_at: DateTime<Utc>,
}

impl CachedGuide {
    pub fn new(
        canonical_url: impl Into<String>,
        guide: Guide,
        source_text: impl Into<String>,
        method: AcquisitionMethod,
    ) -> Self {
        Self {
            canonical_url: canonical_url.into(),
            guide,
            source_text: source_text.into(),
            method,
            created_at: Utc::now(),
        }
    }
}
