//! Grouping of raw benchmark rows into observations

use latcast_core::{MetricSet, Observation, RawRow};
use latcast_core::types::METRIC_COUNT;
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::debug;

/// Rows with identical run, token lengths and traffic level collapse into one group
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct GroupKey {
    benchmark_id: String,
    input_bits: u64,
    output_bits: u64,
    traffic_bits: Option<u64>,
}

impl GroupKey {
    fn from_row(row: &RawRow) -> Self {
        Self {
            benchmark_id: row.benchmark_id.clone(),
            input_bits: canonical_bits(row.input_tokens),
            output_bits: canonical_bits(row.output_tokens),
            traffic_bits: row.traffic_level.map(canonical_bits),
        }
    }
}

/// Bit pattern with `-0.0` folded into `0.0`
fn canonical_bits(value: f64) -> u64 {
    (value + 0.0).to_bits()
}

#[derive(Debug)]
struct Accumulator {
    input_tokens: f64,
    output_tokens: f64,
    traffic_level: Option<f64>,
    sums: [f64; METRIC_COUNT],
    count: usize,
}

impl Accumulator {
    fn new(row: &RawRow) -> Self {
        Self {
            input_tokens: row.input_tokens,
            output_tokens: row.output_tokens,
            traffic_level: row.traffic_level,
            sums: [0.0; METRIC_COUNT],
            count: 0,
        }
    }

    fn add(&mut self, metrics: &MetricSet) {
        for (sum, value) in self.sums.iter_mut().zip(metrics.values()) {
            *sum += value;
        }
        self.count += 1;
    }

    fn finish(self, benchmark_id: String) -> Observation {
        let n = self.count as f64;
        let mut means = self.sums;
        for mean in means.iter_mut() {
            *mean /= n;
        }
        Observation {
            benchmark_id,
            input_tokens: self.input_tokens,
            output_tokens: self.output_tokens,
            traffic_level: self.traffic_level,
            sample_count: self.count,
            metrics: MetricSet::from_values(means),
        }
    }
}

/// Average raw rows into one observation per (run, input, output, traffic) group.
///
/// Output is sorted by input tokens, output tokens, traffic level (absent
/// first) and finally benchmark id.
pub fn aggregate_rows(rows: &[RawRow]) -> Vec<Observation> {
    let mut groups: HashMap<GroupKey, Accumulator> = HashMap::new();

    for row in rows {
        groups
            .entry(GroupKey::from_row(row))
            .or_insert_with(|| Accumulator::new(row))
            .add(&row.metrics);
    }

    let mut observations: Vec<Observation> = groups
        .into_iter()
        .map(|(key, acc)| acc.finish(key.benchmark_id))
        .collect();
    observations.sort_by(compare_observations);

    debug!(
        "Aggregated {} rows into {} observations",
        rows.len(),
        observations.len()
    );

    observations
}

fn compare_observations(a: &Observation, b: &Observation) -> Ordering {
    a.input_tokens
        .total_cmp(&b.input_tokens)
        .then_with(|| a.output_tokens.total_cmp(&b.output_tokens))
        .then_with(|| match (a.traffic_level, b.traffic_level) {
            (None, None) => Ordering::Equal,
            (None, Some(_)) => Ordering::Less,
            (Some(_), None) => Ordering::Greater,
            (Some(x), Some(y)) => x.total_cmp(&y),
        })
        .then_with(|| a.benchmark_id.cmp(&b.benchmark_id))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(run: &str, input: f64, output: f64, traffic: Option<f64>, ttft: f64) -> RawRow {
        let mut metrics = MetricSet::default();
        metrics.ttft.mean = ttft;
        metrics.ttft.p99 = ttft * 2.0;
        metrics.throughput = ttft / 10.0;
        RawRow {
            benchmark_id: run.to_string(),
            model_name: "llama-7b".to_string(),
            input_tokens: input,
            output_tokens: output,
            traffic_level: traffic,
            metrics,
        }
    }

    #[test]
    fn test_empty_rows() {
        assert!(aggregate_rows(&[]).is_empty());
    }

    #[test]
    fn test_duplicate_rows_are_averaged() {
        let rows = vec![
            row("run-1", 512.0, 128.0, None, 100.0),
            row("run-1", 512.0, 128.0, None, 200.0),
            row("run-1", 512.0, 128.0, None, 300.0),
        ];

        let observations = aggregate_rows(&rows);
        assert_eq!(observations.len(), 1);

        let obs = &observations[0];
        assert_eq!(obs.sample_count, 3);
        assert!((obs.metrics.ttft.mean - 200.0).abs() < 1e-12);
        assert!((obs.metrics.ttft.p99 - 400.0).abs() < 1e-12);
        assert!((obs.metrics.throughput - 20.0).abs() < 1e-12);
    }

    #[test]
    fn test_groups_split_by_run_and_traffic() {
        let rows = vec![
            row("run-1", 512.0, 128.0, Some(0.5), 100.0),
            row("run-2", 512.0, 128.0, Some(0.5), 110.0),
            row("run-1", 512.0, 128.0, Some(1.0), 150.0),
            row("run-1", 512.0, 128.0, None, 90.0),
        ];

        let observations = aggregate_rows(&rows);
        assert_eq!(observations.len(), 4);
        assert!(observations.iter().all(|o| o.sample_count == 1));
    }

    #[test]
    fn test_deterministic_ordering() {
        let rows = vec![
            row("run-1", 1024.0, 64.0, None, 1.0),
            row("run-1", 128.0, 256.0, Some(1.0), 2.0),
            row("run-1", 128.0, 256.0, None, 3.0),
            row("run-1", 128.0, 64.0, None, 4.0),
        ];

        let observations = aggregate_rows(&rows);
        let points: Vec<(f64, f64, Option<f64>)> = observations
            .iter()
            .map(|o| (o.input_tokens, o.output_tokens, o.traffic_level))
            .collect();
        assert_eq!(
            points,
            vec![
                (128.0, 64.0, None),
                (128.0, 256.0, None),
                (128.0, 256.0, Some(1.0)),
                (1024.0, 64.0, None),
            ]
        );
    }
}
