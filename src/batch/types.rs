use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use super::error::BatchError;
use crate::constants::{DEFAULT_REVIEW_TOP_K, DEFAULT_TARGET_COLUMN};
use crate::resolver::{Confidence, ResolutionResult};
use crate::scoring::ChangeRecord;

/// A header row plus string cells. Short rows read as empty cells.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl InputTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    /// Parses tab-separated text; the first record holds the headers.
    ///
    /// Cells may be double-quoted to carry tabs, quotes, or line breaks. Rows may be
    /// shorter or longer than the header row.
    pub fn from_tsv(text: &str) -> Result<Self, BatchError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b'\t')
            .flexible(true)
            .from_reader(text.as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(table_error)?
            .iter()
            .map(|h| h.trim().to_string())
            .collect();
        if headers.iter().all(String::is_empty) {
            return Err(BatchError::InvalidTable {
                reason: "no header line".to_string(),
            });
        }

        let rows = reader
            .records()
            .map(|record| {
                record
                    .map(|record| record.iter().map(str::to_string).collect())
                    .map_err(table_error)
            })
            .collect::<Result<Vec<Vec<String>>, _>>()?;

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Cells of column `index`, one per row.
    pub fn column(&self, index: usize) -> Vec<&str> {
        self.rows
            .iter()
            .map(|row| row.get(index).map(String::as_str).unwrap_or(""))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Renders the table as TSV with `values` appended as a new column.
    ///
    /// Every row is padded or cut to the header width so the new column lines up with
    /// its header. Cells holding tabs, quotes, or line breaks are quoted.
    pub fn to_tsv_with_column(&self, name: &str, values: &[String]) -> Result<String, BatchError> {
        let width = self.headers.len();
        let mut writer = csv::WriterBuilder::new()
            .delimiter(b'\t')
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer
            .write_record(self.headers.iter().map(String::as_str).chain([name]))
            .map_err(table_error)?;

        let mut overflowing = 0usize;
        for (i, row) in self.rows.iter().enumerate() {
            if row.len() > width {
                overflowing += 1;
            }
            let cells = (0..width).map(|col| row.get(col).map(String::as_str).unwrap_or(""));
            let value = values.get(i).map(String::as_str).unwrap_or("");
            writer.write_record(cells.chain([value])).map_err(table_error)?;
        }
        if overflowing > 0 {
            warn!(rows = overflowing, width, "Cells beyond the header width were dropped");
        }

        let bytes = writer.into_inner().map_err(|e| BatchError::InvalidTable {
            reason: e.to_string(),
        })?;
        String::from_utf8(bytes).map_err(|e| BatchError::InvalidTable {
            reason: e.to_string(),
        })
    }
}

fn table_error(err: csv::Error) -> BatchError {
    BatchError::InvalidTable {
        reason: err.to_string(),
    }
}

/// What to resolve and what to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchRequest {
    /// Column holding raw titles.
    pub target_column: String,
    /// Optional column to group standardized titles by.
    pub department_column: Option<String>,
    /// Number of change records to return; `0` skips ranking.
    pub review_top_k: usize,
}

impl Default for BatchRequest {
    fn default() -> Self {
        Self {
            target_column: DEFAULT_TARGET_COLUMN.to_string(),
            department_column: None,
            review_top_k: DEFAULT_REVIEW_TOP_K,
        }
    }
}

impl BatchRequest {
    pub fn new(target_column: impl Into<String>) -> Self {
        Self {
            target_column: target_column.into(),
            ..Default::default()
        }
    }

    pub fn with_department_column(mut self, column: impl Into<String>) -> Self {
        self.department_column = Some(column.into());
        self
    }

    pub fn with_review_top_k(mut self, k: usize) -> Self {
        self.review_top_k = k;
        self
    }
}

/// Receives `(rows_done, total)` after every row.
pub trait ProgressObserver {
    fn on_row(&self, done: usize, total: usize);
}

impl<F: Fn(usize, usize)> ProgressObserver for F {
    fn on_row(&self, done: usize, total: usize) {
        self(done, total)
    }
}

/// Observer that ignores progress.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressObserver for NoProgress {
    fn on_row(&self, _done: usize, _total: usize) {}
}

/// Shared cancellation flag, checked once per row.
#[derive(Debug, Clone, Default)]
pub struct CancelFlag(Arc<AtomicBool>);

impl CancelFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Rows per classification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationCounts {
    pub blank: usize,
    pub exact_dictionary: usize,
    pub fuzzy: usize,
    pub auto_learned: usize,
    pub accepted: usize,
    pub unknown: usize,
}

impl ClassificationCounts {
    pub fn record(&mut self, confidence: Confidence) {
        *self.slot(confidence) += 1;
    }

    pub fn get(&self, confidence: Confidence) -> usize {
        match confidence {
            Confidence::Blank => self.blank,
            Confidence::ExactDictionary => self.exact_dictionary,
            Confidence::Fuzzy => self.fuzzy,
            Confidence::AutoLearned => self.auto_learned,
            Confidence::Accepted => self.accepted,
            Confidence::Unknown => self.unknown,
        }
    }

    pub fn total(&self) -> usize {
        Confidence::ALL.iter().map(|c| self.get(*c)).sum()
    }

    fn slot(&mut self, confidence: Confidence) -> &mut usize {
        match confidence {
            Confidence::Blank => &mut self.blank,
            Confidence::ExactDictionary => &mut self.exact_dictionary,
            Confidence::Fuzzy => &mut self.fuzzy,
            Confidence::AutoLearned => &mut self.auto_learned,
            Confidence::Accepted => &mut self.accepted,
            Confidence::Unknown => &mut self.unknown,
        }
    }
}

/// Run-level bookkeeping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub rows: usize,
    pub counts: ClassificationCounts,
    /// Distinct variants added to the mapping this run.
    pub auto_learned_variants: usize,
    pub persistence_failures: usize,
    /// `false` if any auto-learn write failed; the persisted file then lags the run.
    pub mapping_fully_persisted: bool,
    pub mapping_entries: usize,
}

/// Everything a batch run produces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub results: Vec<ResolutionResult>,
    /// Display-cased canonical title per row (empty for blank rows).
    pub standardized: Vec<String>,
    /// Sorted, de-duplicated sanitized titles that resolved to Unknown.
    pub unknown_titles: Vec<String>,
    /// Department → sorted standardized titles, when a department column was used.
    pub departments: Option<BTreeMap<String, Vec<String>>>,
    /// Most-changed rows, when ranking was requested.
    pub changes: Option<Vec<ChangeRecord>>,
    pub summary: RunSummary,
}
