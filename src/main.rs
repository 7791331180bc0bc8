//! `titlenorm` entrypoint.
//!
//! Reads a tab-separated table (from the path given as the first argument, or stdin),
//! writes it back to stdout with a standardized title column appended. Logs go to stderr.

use std::io::{self, Read, Write};
use std::sync::Arc;

use anyhow::Context;
use mimalloc::MiMalloc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use titlenorm::storage::write_json_atomic;
use titlenorm::{
    BatchDriver, CachedEmbedder, CancelFlag, Config, Embedder, InputTable, JsonMappingStore,
    STANDARDIZED_COLUMN, SentenceEmbedder,
};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

const PROGRESS_EVERY: usize = 1_000;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let config = Config::from_env()?;
    config.validate()?;

    let input = read_input(std::env::args().nth(1))?;
    let table = InputTable::from_tsv(&input)?;

    info!(
        mapping = %config.mapping_path.display(),
        rows = table.len(),
        column = %config.target_column,
        index_policy = %config.index_policy,
        embedder = %config.embedder,
        "titlenorm starting"
    );

    let sentence_config = config.sentence_config();
    if sentence_config.testing_stub {
        warn!("TITLENORM_EMBEDDER=stub: lexical vectors only, auto-learning is disabled");
    }
    let sentence = SentenceEmbedder::load(sentence_config)?;
    let embedder: Arc<dyn Embedder> = Arc::new(CachedEmbedder::with_capacity(
        Arc::new(sentence),
        config.embed_cache_capacity,
    ));
    let store = Arc::new(JsonMappingStore::new(&config.mapping_path));

    let driver = BatchDriver::new(store, embedder)
        .with_resolver_config(config.resolver_config()?)
        .with_sampling(config.sampling()?);

    let progress = |done: usize, total: usize| {
        if done % PROGRESS_EVERY == 0 || done == total {
            info!(done, total, "Progress");
        }
    };
    let report = driver.run(&table, &config.batch_request(), &progress, &CancelFlag::new())?;

    let output = table.to_tsv_with_column(STANDARDIZED_COLUMN, &report.standardized)?;
    io::stdout()
        .lock()
        .write_all(output.as_bytes())
        .context("failed to write output table")?;

    for change in report.changes.iter().flatten() {
        info!(
            row = change.row,
            original = %change.original,
            normalized = %change.normalized,
            change_score = change.change_score,
            "Review candidate"
        );
    }

    if !report.unknown_titles.is_empty() {
        warn!(count = report.unknown_titles.len(), "Titles need review");
        for title in &report.unknown_titles {
            info!(title = %title, "Unknown title");
        }
    }

    if let (Some(path), Some(groups)) = (&config.department_output, &report.departments) {
        write_json_atomic(path, groups)
            .with_context(|| format!("failed to write department grouping to {}", path.display()))?;
        info!(path = %path.display(), departments = groups.len(), "Department grouping written");
    }

    if let Some(path) = &config.report_path {
        write_json_atomic(path, &report)
            .with_context(|| format!("failed to write run report to {}", path.display()))?;
        info!(path = %path.display(), "Run report written");
    }

    Ok(())
}

fn read_input(path: Option<String>) -> anyhow::Result<String> {
    match path {
        Some(path) => std::fs::read_to_string(&path).with_context(|| format!("failed to read {path}")),
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("failed to read stdin")?;
            Ok(buf)
        }
    }
}
