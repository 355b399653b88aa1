//! Aggregated observation listing

use crate::output::{format_millis, format_rate, format_tokens, Formattable, OutputFormat, OutputFormatter};
use anyhow::{Context, Result};
use latcast_core::{Config, Observation, ObservationSource};
use latcast_predict::{ObservationSummary, Predictor};
use serde::Serialize;

/// Observations and their envelope, as one document
#[derive(Debug, Serialize)]
struct ObservationReport<'a> {
    model_name: &'a str,
    summary: &'a ObservationSummary,
    observations: &'a [Observation],
}

#[derive(Debug, Serialize)]
struct ObservationRow<'a>(&'a Observation);

impl Formattable for ObservationRow<'_> {
    fn table_headers() -> Vec<String> {
        [
            "Benchmark",
            "Input",
            "Output",
            "Traffic",
            "Rows",
            "TTFT mean",
            "User TPS mean",
            "E2E mean",
            "Throughput",
        ]
        .iter()
        .map(|h| h.to_string())
        .collect()
    }

    fn table_row(&self) -> Vec<String> {
        self.key_value_pairs().into_iter().map(|(_, v)| v).collect()
    }

    fn key_value_pairs(&self) -> Vec<(String, String)> {
        let obs = self.0;
        vec![
            ("benchmark_id".to_string(), obs.benchmark_id.clone()),
            ("input_tokens".to_string(), format_tokens(obs.input_tokens)),
            ("output_tokens".to_string(), format_tokens(obs.output_tokens)),
            (
                "traffic_level".to_string(),
                obs.traffic_level
                    .map(|t| t.to_string())
                    .unwrap_or_else(|| "-".to_string()),
            ),
            ("sample_count".to_string(), obs.sample_count.to_string()),
            ("ttft_mean".to_string(), format_millis(obs.metrics.ttft.mean)),
            ("user_tps_mean".to_string(), format_rate(obs.metrics.user_tps.mean)),
            ("e2e_mean".to_string(), format_millis(obs.metrics.e2e.mean)),
            ("throughput".to_string(), format_rate(obs.metrics.throughput)),
        ]
    }
}

fn summary_rows(summary: &ObservationSummary) -> Vec<(String, String)> {
    let traffic = if summary.traffic_levels.is_empty() {
        "-".to_string()
    } else {
        summary
            .traffic_levels
            .iter()
            .map(|t| t.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    vec![
        ("observations".to_string(), summary.count.to_string()),
        ("raw_rows".to_string(), summary.raw_rows.to_string()),
        (
            "input_tokens".to_string(),
            format!(
                "{} - {}",
                format_tokens(summary.min_input_tokens),
                format_tokens(summary.max_input_tokens)
            ),
        ),
        (
            "output_tokens".to_string(),
            format!(
                "{} - {}",
                format_tokens(summary.min_output_tokens),
                format_tokens(summary.max_output_tokens)
            ),
        ),
        ("traffic_levels".to_string(), traffic),
    ]
}

/// Show the aggregated observations the predictor would fit for a model
pub fn show_observations<S>(
    source: &S,
    config: &Config,
    model_name: &str,
    output_format: OutputFormat,
) -> Result<()>
where
    S: ObservationSource,
{
    let formatter = OutputFormatter::new(output_format);
    let predictor = Predictor::with_config(config.predictor.clone());

    let observations = predictor
        .load_observations(source, model_name)
        .with_context(|| format!("Failed to load observations for model '{}'", model_name))?;
    let summary = Predictor::summarize(&observations).ok_or_else(|| {
        latcast_core::Error::no_data(format!(
            "No benchmark data found for model '{}'",
            model_name
        ))
    })?;

    if formatter.is_structured() {
        return formatter.print_serialized(&ObservationReport {
            model_name,
            summary: &summary,
            observations: &observations,
        });
    }

    let rows: Vec<ObservationRow<'_>> = observations.iter().map(ObservationRow).collect();
    formatter.print_list(&rows)?;
    println!();
    formatter.print_metrics(&summary, &summary_rows(&summary))
}

#[cfg(test)]
mod tests {
    use super::*;
    use latcast_core::{MetricSet, RawRow};
    use latcast_predict::InMemoryStore;

    fn raw(input: f64, output: f64, traffic: Option<f64>) -> RawRow {
        RawRow {
            benchmark_id: "run-1".to_string(),
            model_name: "llama-3-8b".to_string(),
            input_tokens: input,
            output_tokens: output,
            traffic_level: traffic,
            metrics: MetricSet::default(),
        }
    }

    #[test]
    fn test_observation_row_matches_headers() {
        let obs = Observation::new(512.0, 128.0, MetricSet::default()).with_traffic(0.5);
        let row = ObservationRow(&obs);
        assert_eq!(row.table_row().len(), ObservationRow::table_headers().len());
        assert_eq!(row.table_row()[3], "0.5");
    }

    #[test]
    fn test_summary_rows() {
        let observations = vec![
            Observation::new(128.0, 64.0, MetricSet::default()),
            Observation::new(1024.0, 256.0, MetricSet::default()).with_traffic(1.0),
        ];
        let summary = Predictor::summarize(&observations).unwrap();
        let rows = summary_rows(&summary);

        assert_eq!(rows[0].1, "2");
        assert_eq!(rows[2].1, "128 - 1024");
        assert_eq!(rows[3].1, "64 - 256");
        assert_eq!(rows[4].1, "1");
    }

    #[test]
    fn test_unknown_model_is_an_error() {
        let store = InMemoryStore::from_rows([raw(128.0, 64.0, None)]);
        let err = show_observations(&store, &Config::default(), "missing", OutputFormat::Json)
            .unwrap_err();
        assert!(err.to_string().contains("No benchmark data found"));
        assert!(matches!(
            err.downcast_ref::<latcast_core::Error>(),
            Some(latcast_core::Error::NoData(_))
        ));
    }

    #[test]
    fn test_known_model_prints() {
        let store = InMemoryStore::from_rows([raw(128.0, 64.0, None), raw(512.0, 64.0, Some(0.5))]);
        for format in [OutputFormat::Json, OutputFormat::Yaml, OutputFormat::Text] {
            show_observations(&store, &Config::default(), "llama-3-8b", format).unwrap();
        }
    }
}
