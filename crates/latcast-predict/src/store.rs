//! In-memory observation store

use dashmap::DashMap;
use latcast_core::{ObservationSource, RawRow};
use std::sync::Arc;
use tracing::debug;

/// In-memory benchmark row store keyed by model name
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    rows: Arc<DashMap<String, Vec<RawRow>>>,
}

impl InMemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from an existing set of rows
    pub fn from_rows(rows: impl IntoIterator<Item = RawRow>) -> Self {
        let store = Self::new();
        store.insert_rows(rows);
        store
    }

    /// Append a single row
    pub fn insert_row(&self, row: RawRow) {
        self.rows.entry(row.model_name.clone()).or_default().push(row);
    }

    /// Append many rows, returning how many were inserted
    pub fn insert_rows(&self, rows: impl IntoIterator<Item = RawRow>) -> usize {
        let mut inserted = 0;
        for row in rows {
            self.insert_row(row);
            inserted += 1;
        }
        debug!("Inserted {} benchmark rows", inserted);
        inserted
    }

    /// Number of rows stored for a model
    pub fn row_count(&self, model_name: &str) -> usize {
        self.rows.get(model_name).map(|rows| rows.len()).unwrap_or(0)
    }

    /// Number of distinct models with rows
    pub fn model_count(&self) -> usize {
        self.rows.len()
    }

    /// Drop every row for a model, returning how many were removed
    pub fn clear_model(&self, model_name: &str) -> usize {
        self.rows
            .remove(model_name)
            .map(|(_, rows)| rows.len())
            .unwrap_or(0)
    }
}

impl ObservationSource for InMemoryStore {
    fn fetch_rows(&self, model_name: &str) -> latcast_core::Result<Vec<RawRow>> {
        Ok(self
            .rows
            .get(model_name)
            .map(|rows| rows.value().clone())
            .unwrap_or_default())
    }

    fn model_names(&self) -> latcast_core::Result<Vec<String>> {
        let mut names: Vec<String> = self.rows.iter().map(|entry| entry.key().clone()).collect();
        names.sort();
        Ok(names)
    }
}
