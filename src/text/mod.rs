//! Plain-text stages of the pipeline.
//!
//! - [`sanitize`] lowercases, trims and classifies blank placeholder cells.
//! - [`RuleCorrector`] expands abbreviations and fixes known misspellings, in order.
//! - [`format_title`] renders a canonical title in display case.

mod format;
mod rules;
mod sanitize;

#[cfg(test)]
mod tests;

pub use format::format_title;
pub use rules::{CorrectionRule, DEFAULT_RULES, RuleCorrector};
pub use sanitize::{Sanitized, is_blank, sanitize};
