//! Benchmark data files

use anyhow::{Context, Result};
use latcast_core::RawRow;
use latcast_predict::InMemoryStore;
use std::path::Path;
use tracing::info;

/// Read a JSON or YAML array of raw rows; the extension picks the format
pub fn load_rows(path: &Path) -> Result<Vec<RawRow>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read data file {}", path.display()))?;

    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_lowercase);

    let rows = match extension.as_deref() {
        Some("yaml") | Some("yml") => serde_yaml::from_str(&contents)
            .with_context(|| format!("Failed to parse YAML rows in {}", path.display()))?,
        _ => serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse JSON rows in {}", path.display()))?,
    };

    Ok(rows)
}

/// Load the data file into a fresh store
pub fn load_store(path: Option<&Path>) -> Result<InMemoryStore> {
    let path = path.context("No benchmark data given, pass --data <FILE>")?;
    let rows = load_rows(path)?;

    let store = InMemoryStore::new();
    let count = store.insert_rows(rows);
    info!(
        "Loaded {} benchmark rows for {} models from {}",
        count,
        store.model_count(),
        path.display()
    );

    Ok(store)
}
