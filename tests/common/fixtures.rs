//! Test fixtures for integration tests.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use titlenorm::{CanonicalMapping, JsonMappingStore, MockEmbedder};

pub const TEST_DIM: usize = 8;

/// Shared axis carrying the non-matching remainder of partial-similarity vectors.
const OFF_AXIS: usize = TEST_DIM - 2;

pub const TITLE_COLUMN: &str = "Designation*";

pub const SEED_ENTRIES: &[(&str, &str)] = &[
    ("engineer", "Engineer"),
    ("carpenter", "Carpenter"),
    ("site supervisor", "Site Supervisor"),
    ("hr executive", "HR Executive"),
    ("senior technician", "Senior Technician"),
];

pub fn seed_mapping() -> CanonicalMapping {
    CanonicalMapping::from_raw_entries(SEED_ENTRIES.iter().copied())
}

/// Unit vector with cosine `cos` to `axis`.
pub fn toward(axis: usize, cos: f32) -> Vec<f32> {
    let mut v = vec![0.0; TEST_DIM];
    v[axis] = cos;
    v[OFF_AXIS] = (1.0 - cos * cos).max(0.0).sqrt();
    v
}

/// Mock embedder with one axis per seed key, plus the given extra texts.
pub fn seeded_embedder(extra: &[(&str, usize, f32)]) -> Arc<MockEmbedder> {
    let embedder = MockEmbedder::new(TEST_DIM);
    for (axis, (key, _)) in SEED_ENTRIES.iter().enumerate() {
        embedder.insert(key, &toward(axis, 1.0));
    }
    for (text, axis, cos) in extra {
        embedder.insert(text, &toward(*axis, *cos));
    }
    Arc::new(embedder)
}

/// Writes `mapping` as the JSON mapping file under `dir`.
pub fn write_mapping(dir: &Path, mapping: &CanonicalMapping) -> PathBuf {
    let path = dir.join("canonical_mapping_raw.json");
    titlenorm::storage::write_json_atomic(&path, mapping).expect("mapping fixture should write");
    path
}

pub fn json_store(dir: &Path) -> Arc<JsonMappingStore> {
    Arc::new(JsonMappingStore::new(write_mapping(dir, &seed_mapping())))
}

/// Builds a TSV table with an id column and the title column.
pub fn titles_tsv(titles: &[&str]) -> String {
    let mut out = format!("Emp ID\t{TITLE_COLUMN}\n");
    for (i, title) in titles.iter().enumerate() {
        out.push_str(&format!("{}\t{}\n", i + 1, title));
    }
    out
}
