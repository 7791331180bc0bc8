//! Review ranking: which rows did resolution change the most.
//!
//! The change score is `1 - cosine(embed(original), embed(normalized))`. It is a proxy for
//! how far a title moved, used only to pick rows for human review.
//!
//! # Sampling
//!
//! Large columns are not scored in full. When more rows are eligible than
//! [`SamplingConfig::sample_size`], a fixed-seed sample is scored instead, so the returned
//! list is an approximation of the true top-k. The same input and seed always produce the
//! same list.

pub mod error;
pub mod scorer;
pub mod types;


pub use error::ScoringError;
pub use scorer::ChangeScorer;
pub use types::{ChangeRecord, SamplingConfig};
