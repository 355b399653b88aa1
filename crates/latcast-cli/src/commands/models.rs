//! Model listing

use crate::output::{Formattable, OutputFormat, OutputFormatter};
use anyhow::{Context, Result};
use latcast_core::ObservationSource;
use latcast_predict::aggregate_rows;
use serde::Serialize;

/// A model with benchmark data
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ModelEntry {
    pub model_name: String,
    pub raw_rows: usize,
    pub observations: usize,
}

impl Formattable for ModelEntry {
    fn table_headers() -> Vec<String> {
        vec![
            "Model".to_string(),
            "Rows".to_string(),
            "Observations".to_string(),
        ]
    }

    fn table_row(&self) -> Vec<String> {
        vec![
            self.model_name.clone(),
            self.raw_rows.to_string(),
            self.observations.to_string(),
        ]
    }

    fn key_value_pairs(&self) -> Vec<(String, String)> {
        vec![
            ("model".to_string(), self.model_name.clone()),
            ("raw_rows".to_string(), self.raw_rows.to_string()),
            ("observations".to_string(), self.observations.to_string()),
        ]
    }
}

/// Every model the source knows, with row and aggregated observation counts
pub fn model_entries<S>(source: &S) -> Result<Vec<ModelEntry>>
where
    S: ObservationSource,
{
    let names = source.model_names().context("Failed to list models")?;
    names
        .into_iter()
        .map(|model_name| {
            let rows = source
                .fetch_rows(&model_name)
                .with_context(|| format!("Failed to fetch rows for model '{}'", model_name))?;
            Ok(ModelEntry {
                raw_rows: rows.len(),
                observations: aggregate_rows(&rows).len(),
                model_name,
            })
        })
        .collect()
}

pub fn list_models<S>(source: &S, output_format: OutputFormat) -> Result<()>
where
    S: ObservationSource,
{
    let formatter = OutputFormatter::new(output_format);
    formatter.print_list(&model_entries(source)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use latcast_core::{MetricSet, RawRow};
    use latcast_predict::InMemoryStore;

    fn raw(model: &str, benchmark: &str, input: f64) -> RawRow {
        RawRow {
            benchmark_id: benchmark.to_string(),
            model_name: model.to_string(),
            input_tokens: input,
            output_tokens: 128.0,
            traffic_level: None,
            metrics: MetricSet::default(),
        }
    }

    #[test]
    fn test_model_entries() {
        let store = InMemoryStore::from_rows([
            raw("mistral-7b", "run-1", 256.0),
            raw("llama-3-8b", "run-1", 512.0),
            raw("llama-3-8b", "run-1", 512.0),
            raw("llama-3-8b", "run-2", 512.0),
            raw("llama-3-8b", "run-1", 1024.0),
        ]);

        let entries = model_entries(&store).unwrap();
        assert_eq!(
            entries,
            vec![
                ModelEntry {
                    model_name: "llama-3-8b".to_string(),
                    raw_rows: 4,
                    observations: 3,
                },
                ModelEntry {
                    model_name: "mistral-7b".to_string(),
                    raw_rows: 1,
                    observations: 1,
                },
            ]
        );
    }

    #[test]
    fn test_empty_store_lists_nothing() {
        let store = InMemoryStore::new();
        assert!(model_entries(&store).unwrap().is_empty());
        list_models(&store, OutputFormat::Json).unwrap();
    }
}
