use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::config::ConfigError;
use crate::constants::{AUTO_LEARN_THRESHOLD, FUZZY_SCORE_CUTOFF, SIMILARITY_THRESHOLD, UNKNOWN_TITLE};
use crate::text::format_title;

/// Terminal classification of a resolved title.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Confidence {
    /// Placeholder cell; canonical output is empty.
    Blank,
    /// The normalized text is a mapping key.
    ExactDictionary,
    /// A fuzzy substitution produced a mapping key.
    Fuzzy,
    /// Nearest neighbour cleared the auto-learn bar; the variant was added to the mapping.
    AutoLearned,
    /// Nearest neighbour cleared the acceptance bar.
    Accepted,
    /// Nothing matched confidently.
    Unknown,
}

impl Confidence {
    /// Every variant, in cascade order.
    pub const ALL: [Confidence; 6] = [
        Confidence::Blank,
        Confidence::ExactDictionary,
        Confidence::Fuzzy,
        Confidence::AutoLearned,
        Confidence::Accepted,
        Confidence::Unknown,
    ];

    /// Stable lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::Blank => "blank",
            Confidence::ExactDictionary => "exact_dictionary",
            Confidence::Fuzzy => "fuzzy",
            Confidence::AutoLearned => "auto_learned",
            Confidence::Accepted => "accepted",
            Confidence::Unknown => "unknown",
        }
    }

    /// Returns `true` if a canonical title (other than the sentinel) was assigned.
    pub fn is_resolved(&self) -> bool {
        matches!(
            self,
            Confidence::ExactDictionary | Confidence::Fuzzy | Confidence::AutoLearned | Confidence::Accepted
        )
    }
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of [`TitleResolver::resolve`](super::TitleResolver::resolve).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResolutionResult {
    /// Input cell, untouched.
    pub raw: String,
    /// Variant key after sanitize, rules, fuzzy and re-sanitize. `None` for blank rows.
    pub normalized: Option<String>,
    /// Canonical title: a mapping value, the Unknown sentinel, or empty for blank rows.
    pub canonical: String,
    /// Which stage terminated resolution.
    pub confidence: Confidence,
    /// Stage score in `[0, 1]`: `1.0` for exact hits, ratio / 100 for fuzzy, cosine otherwise.
    pub score: Option<f32>,
    /// Mapping key the canonical title was taken from.
    pub matched_key: Option<String>,
}

impl ResolutionResult {
    pub(crate) fn blank(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            normalized: None,
            canonical: String::new(),
            confidence: Confidence::Blank,
            score: None,
            matched_key: None,
        }
    }

    pub(crate) fn unknown(raw: &str, normalized: String, score: Option<f32>) -> Self {
        Self {
            raw: raw.to_string(),
            normalized: Some(normalized),
            canonical: UNKNOWN_TITLE.to_string(),
            confidence: Confidence::Unknown,
            score,
            matched_key: None,
        }
    }

    /// Returns `true` for blank rows.
    pub fn is_blank(&self) -> bool {
        self.confidence == Confidence::Blank
    }

    /// Returns `true` for the Unknown classification.
    pub fn is_unknown(&self) -> bool {
        self.confidence == Confidence::Unknown
    }

    /// Display form of the canonical title (empty for blank rows).
    pub fn display_title(&self) -> String {
        format_title(&self.canonical)
    }
}

/// The two similarity bars of the embedding stage.
///
/// Construction enforces `auto_learn >= similarity`, both within `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    similarity: f32,
    auto_learn: f32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            similarity: SIMILARITY_THRESHOLD,
            auto_learn: AUTO_LEARN_THRESHOLD,
        }
    }
}

impl Thresholds {
    /// Validates and creates a threshold pair.
    pub fn new(similarity: f32, auto_learn: f32) -> Result<Self, ConfigError> {
        check_unit("similarity threshold", similarity)?;
        check_unit("auto-learn threshold", auto_learn)?;
        if auto_learn < similarity {
            return Err(ConfigError::ThresholdOrder {
                similarity,
                auto_learn,
            });
        }
        Ok(Self {
            similarity,
            auto_learn,
        })
    }

    /// Accepted floor.
    pub fn similarity(&self) -> f32 {
        self.similarity
    }

    /// AutoLearned floor.
    pub fn auto_learn(&self) -> f32 {
        self.auto_learn
    }

    /// Classifies a nearest-neighbour score.
    pub fn classify(&self, score: f32) -> Confidence {
        if score >= self.auto_learn {
            Confidence::AutoLearned
        } else if score >= self.similarity {
            Confidence::Accepted
        } else {
            Confidence::Unknown
        }
    }
}

fn check_unit(name: &'static str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::ThresholdOutOfRange { name, value })
    }
}

/// What happens to the embedding index when a variant is auto-learned mid-run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndexPolicy {
    /// The index is built once per run; learned variants become searchable next run.
    #[default]
    Snapshot,
    /// The learned variant's vector is appended to the index immediately.
    Incremental,
}

impl IndexPolicy {
    /// Lowercase label.
    pub fn as_str(&self) -> &'static str {
        match self {
            IndexPolicy::Snapshot => "snapshot",
            IndexPolicy::Incremental => "incremental",
        }
    }
}

impl FromStr for IndexPolicy {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "snapshot" => Ok(IndexPolicy::Snapshot),
            "incremental" => Ok(IndexPolicy::Incremental),
            _ => Err(ConfigError::UnknownIndexPolicy {
                value: s.to_string(),
            }),
        }
    }
}

impl fmt::Display for IndexPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Tunables for [`TitleResolver`](super::TitleResolver).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolverConfig {
    /// Embedding-stage bars.
    pub thresholds: Thresholds,
    /// Minimum fuzzy ratio (0-100) for a substitution.
    pub fuzzy_cutoff: u8,
    /// Index behaviour on auto-learn.
    pub index_policy: IndexPolicy,
}

impl Default for ResolverConfig {
    fn default() -> Self {
        Self {
            thresholds: Thresholds::default(),
            fuzzy_cutoff: FUZZY_SCORE_CUTOFF,
            index_policy: IndexPolicy::default(),
        }
    }
}
