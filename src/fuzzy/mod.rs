//! Edit-distance matching against known mapping keys.
//!
//! The score is `round(100 * normalized_levenshtein(query, key))`, an integer in `0..=100`.
//! A substitution happens only when the best score reaches the configured cutoff.


use tracing::debug;

use crate::constants::FUZZY_SCORE_CUTOFF;

/// Best-scoring candidate for a query.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FuzzyMatch<'a> {
    /// The winning candidate.
    pub candidate: &'a str,
    /// Similarity ratio in `0..=100`.
    pub score: u8,
}

/// Output of [`FuzzyMatcher::correct`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FuzzyCorrection {
    /// The substituted key, or the input text when nothing cleared the cutoff.
    pub text: String,
    /// Score of the matched key, if one cleared the cutoff.
    pub score: Option<u8>,
}

impl FuzzyCorrection {
    /// Returns `true` if a known key cleared the cutoff.
    pub fn is_match(&self) -> bool {
        self.score.is_some()
    }
}

/// Scores text against a candidate set with a fixed acceptance floor.
#[derive(Debug, Clone, Copy)]
pub struct FuzzyMatcher {
    cutoff: u8,
}

impl Default for FuzzyMatcher {
    fn default() -> Self {
        Self {
            cutoff: FUZZY_SCORE_CUTOFF,
        }
    }
}

impl FuzzyMatcher {
    /// Creates a matcher; `cutoff` is clamped to `0..=100`.
    pub fn new(cutoff: u8) -> Self {
        Self {
            cutoff: cutoff.min(100),
        }
    }

    /// Returns the acceptance floor.
    pub fn cutoff(&self) -> u8 {
        self.cutoff
    }

    /// Similarity ratio between two strings, in `0..=100`.
    pub fn ratio(a: &str, b: &str) -> u8 {
        let similarity = strsim::normalized_levenshtein(a, b);
        (similarity * 100.0).round().clamp(0.0, 100.0) as u8
    }

    /// Returns the best-scoring candidate regardless of the cutoff.
    ///
    /// Ties keep the earliest candidate. Returns `None` for an empty candidate set.
    pub fn best_match<'a, I>(&self, query: &str, candidates: I) -> Option<FuzzyMatch<'a>>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut best: Option<FuzzyMatch<'a>> = None;
        for candidate in candidates {
            let score = Self::ratio(query, candidate);
            if best.is_none_or(|b| score > b.score) {
                best = Some(FuzzyMatch { candidate, score });
                if score == 100 {
                    break;
                }
            }
        }
        best
    }

    /// Replaces `text` with the best candidate if its score is at least the cutoff.
    pub fn correct<'a, I>(&self, text: &str, candidates: I) -> FuzzyCorrection
    where
        I: IntoIterator<Item = &'a str>,
    {
        match self.best_match(text, candidates) {
            Some(hit) if hit.score >= self.cutoff => {
                if hit.candidate != text {
                    debug!(query = text, candidate = hit.candidate, score = hit.score, "Fuzzy substitution");
                }
                FuzzyCorrection {
                    text: hit.candidate.to_string(),
                    score: Some(hit.score),
                }
            }
            _ => FuzzyCorrection {
                text: text.to_string(),
                score: None,
            },
        }
    }
}
