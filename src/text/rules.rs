use std::sync::LazyLock;

use regex::{NoExpand, Regex};
use tracing::trace;

/// Built-in correction rules as `(pattern, replacement)`, applied top to bottom.
///
/// Order matters: each rule runs over the output of the previous one, so a later pattern
/// can match text produced by an earlier replacement. Keep this a slice, never a map.
pub const DEFAULT_RULES: &[(&str, &str)] = &[
    (r"\bengg\b", "engineer"),
    (r"\bengr\b", "engineer"),
    (r"\basst\b", "assistant"),
    (r"\bsupv\b|\bsuprv\b", "supervisor"),
    (r"\b(?:supervisior|supervsor|superviser|supervisour)\b", "supervisor"),
    (r"\b(?:carpendar|carpendry|carpentry)\b", "carpenter"),
    (r"\b(?:technicain|techncian|technision|techician|technican)\b", "technician"),
    (r"\bsr\b\.?\s*", "senior "),
    (r"\bjr\b\.?\s*", "junior "),
    (r"\bmgr\b", "manager"),
    (r"\bexec\b", "executive"),
];

static DEFAULT_CORRECTOR: LazyLock<RuleCorrector> = LazyLock::new(|| {
    RuleCorrector::new(DEFAULT_RULES).expect("built-in correction rules are valid regexes")
});

/// A compiled `(pattern, replacement)` pair.
#[derive(Debug, Clone)]
pub struct CorrectionRule {
    pattern: Regex,
    replacement: String,
}

impl CorrectionRule {
    /// Compiles `pattern`; `replacement` is inserted literally (no `$group` expansion).
    pub fn new(pattern: &str, replacement: impl Into<String>) -> Result<Self, regex::Error> {
        Ok(Self {
            pattern: Regex::new(pattern)?,
            replacement: replacement.into(),
        })
    }

    /// Returns the source pattern.
    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Returns the replacement text.
    pub fn replacement(&self) -> &str {
        &self.replacement
    }

    fn apply(&self, text: &str) -> String {
        self.pattern
            .replace_all(text, NoExpand(&self.replacement))
            .into_owned()
    }
}

/// Applies an ordered list of regex rules to sanitized text.
#[derive(Debug, Clone)]
pub struct RuleCorrector {
    rules: Vec<CorrectionRule>,
}

impl Default for RuleCorrector {
    fn default() -> Self {
        DEFAULT_CORRECTOR.clone()
    }
}

impl RuleCorrector {
    /// Compiles `rules` in the given order.
    pub fn new(rules: &[(&str, &str)]) -> Result<Self, regex::Error> {
        let rules = rules
            .iter()
            .map(|(pattern, replacement)| CorrectionRule::new(pattern, *replacement))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { rules })
    }

    /// Creates a corrector from already compiled rules.
    pub fn from_rules(rules: Vec<CorrectionRule>) -> Self {
        Self { rules }
    }

    /// A corrector that leaves text unchanged.
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    /// Returns the rules in application order.
    pub fn rules(&self) -> &[CorrectionRule] {
        &self.rules
    }

    /// Runs every rule, in order, over the progressively rewritten text, then collapses
    /// whitespace runs so replacements that add a separator never leave doubled or
    /// trailing spaces.
    pub fn correct(&self, text: &str) -> String {
        let mut current = text.to_string();
        for rule in &self.rules {
            let next = rule.apply(&current);
            if next != current {
                trace!(pattern = rule.pattern(), before = %current, after = %next, "Rule applied");
                current = next;
            }
        }
        collapse_whitespace(&current)
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
