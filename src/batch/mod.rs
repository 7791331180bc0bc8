//! Batch driver: one column in, standardized column and review material out.
//!
//! The driver owns the mapping lifecycle. It validates the request against the table,
//! loads the mapping, builds a [`TitleResolver`], resolves every row in order, and then
//! derives the unknown list, the department grouping and the change ranking.
//!
//! Any failure aborts the run; there is no partial report.

pub mod error;
pub mod types;

#[cfg(test)]
mod tests;

pub use error::BatchError;
pub use types::{
    BatchReport, BatchRequest, CancelFlag, ClassificationCounts, InputTable, NoProgress,
    ProgressObserver, RunSummary,
};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::embedding::Embedder;
use crate::mapping::MappingStore;
use crate::resolver::{ResolutionResult, ResolverConfig, TitleResolver};
use crate::scoring::{ChangeScorer, SamplingConfig};
use crate::text::{RuleCorrector, is_blank, sanitize};

/// Runs batches against one mapping store and one embedder.
pub struct BatchDriver {
    store: Arc<dyn MappingStore>,
    embedder: Arc<dyn Embedder>,
    resolver_config: ResolverConfig,
    sampling: SamplingConfig,
    rules: Option<RuleCorrector>,
}

impl std::fmt::Debug for BatchDriver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BatchDriver")
            .field("resolver_config", &self.resolver_config)
            .field("sampling", &self.sampling)
            .field("custom_rules", &self.rules.is_some())
            .finish()
    }
}

impl BatchDriver {
    pub fn new(store: Arc<dyn MappingStore>, embedder: Arc<dyn Embedder>) -> Self {
        Self {
            store,
            embedder,
            resolver_config: ResolverConfig::default(),
            sampling: SamplingConfig::default(),
            rules: None,
        }
    }

    pub fn with_resolver_config(mut self, config: ResolverConfig) -> Self {
        self.resolver_config = config;
        self
    }

    pub fn with_sampling(mut self, sampling: SamplingConfig) -> Self {
        self.sampling = sampling;
        self
    }

    /// Overrides the built-in correction rules.
    pub fn with_rules(mut self, rules: RuleCorrector) -> Self {
        self.rules = Some(rules);
        self
    }

    /// Resolves `request.target_column` of `table`.
    ///
    /// `progress` is told `(rows_done, total)` after each row; `cancel` is checked before
    /// each row.
    pub fn run(
        &self,
        table: &InputTable,
        request: &BatchRequest,
        progress: &dyn ProgressObserver,
        cancel: &CancelFlag,
    ) -> Result<BatchReport, BatchError> {
        let started_at = Utc::now();
        let run_id = Uuid::new_v4();

        let target = table
            .column_index(&request.target_column)
            .ok_or_else(|| BatchError::MissingColumn {
                column: request.target_column.clone(),
                available: table.headers().to_vec(),
            })?;

        let department = request.department_column.as_deref().and_then(|name| {
            let index = table.column_index(name);
            if index.is_none() {
                warn!(column = name, "Department column not found, skipping grouping");
            }
            index
        });

        let mapping = self.store.load()?;
        let mut resolver = TitleResolver::new(
            mapping,
            self.embedder.clone(),
            self.store.clone(),
            self.resolver_config,
        )?;
        if let Some(rules) = &self.rules {
            resolver = resolver.with_rules(rules.clone());
        }

        let titles = table.column(target);
        let total = titles.len();
        info!(%run_id, rows = total, column = %request.target_column, "Batch started");

        let mut results = Vec::with_capacity(total);
        let mut counts = ClassificationCounts::default();
        for (row, raw) in titles.iter().enumerate() {
            if cancel.is_cancelled() {
                warn!(%run_id, processed = row, "Batch cancelled");
                return Err(BatchError::Cancelled { processed: row });
            }

            let result = resolver.resolve(raw)?;
            debug!(row, raw, canonical = %result.canonical, confidence = %result.confidence, "Row resolved");
            counts.record(result.confidence);
            results.push(result);

            progress.on_row(row + 1, total);
        }

        let standardized: Vec<String> = results.iter().map(ResolutionResult::display_title).collect();
        let unknown_titles = unknown_titles(&results);
        let departments = department.map(|index| group_by_department(&table.column(index), &results, &standardized));

        let changes = if request.review_top_k > 0 {
            let pairs: Vec<(&str, &str)> = titles
                .iter()
                .zip(&standardized)
                .map(|(raw, out)| (*raw, out.as_str()))
                .collect();
            let scorer = ChangeScorer::new(self.embedder.clone(), self.sampling);
            Some(scorer.rank(&pairs, request.review_top_k)?)
        } else {
            None
        };

        let summary = RunSummary {
            run_id,
            started_at,
            finished_at: Utc::now(),
            rows: total,
            counts,
            auto_learned_variants: resolver.auto_learned(),
            persistence_failures: resolver.persistence_failures(),
            mapping_fully_persisted: resolver.mapping_fully_persisted(),
            mapping_entries: resolver.mapping_len(),
        };

        info!(
            %run_id,
            rows = summary.rows,
            exact = counts.exact_dictionary,
            fuzzy = counts.fuzzy,
            auto_learned = counts.auto_learned,
            accepted = counts.accepted,
            unknown = counts.unknown,
            blank = counts.blank,
            mapping_fully_persisted = summary.mapping_fully_persisted,
            "Batch finished"
        );
        if !summary.mapping_fully_persisted {
            warn!(
                %run_id,
                failures = summary.persistence_failures,
                "Canonical mapping not fully persisted"
            );
        }

        Ok(BatchReport {
            results,
            standardized,
            unknown_titles,
            departments,
            changes,
            summary,
        })
    }
}

fn unknown_titles(results: &[ResolutionResult]) -> Vec<String> {
    results
        .iter()
        .filter(|r| r.is_unknown())
        .filter_map(|r| sanitize(&r.raw).as_text().map(str::to_string))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

fn group_by_department(
    departments: &[&str],
    results: &[ResolutionResult],
    standardized: &[String],
) -> BTreeMap<String, Vec<String>> {
    let mut groups: BTreeMap<String, BTreeSet<&str>> = BTreeMap::new();

    for ((department, result), title) in departments.iter().zip(results).zip(standardized) {
        if is_blank(department) || result.is_blank() || result.is_unknown() || title.is_empty() {
            continue;
        }
        groups
            .entry(department.trim().to_string())
            .or_default()
            .insert(title.as_str());
    }

    groups
        .into_iter()
        .map(|(department, titles)| (department, titles.into_iter().map(str::to_string).collect()))
        .collect()
}
