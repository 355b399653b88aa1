//! Mechanistic end-to-end latency
//!
//! Autoregressive decoding costs one TTFT followed by `output_tokens` decode
//! steps at the per-user rate, so `e2e = ttft + output / tps`.

use tracing::debug;

/// Derive the mean end-to-end latency in milliseconds.
///
/// `ttft_mean` is in milliseconds and `user_tps_mean` in tokens per second. A
/// missing, non-positive or non-finite rate is replaced by
/// `fallback_tokens_per_ms`; a non-finite or negative total falls back to the
/// same rate. The result is always finite and non-negative.
pub fn derive_e2e_mean(
    ttft_mean: f64,
    user_tps_mean: Option<f64>,
    output_tokens: f64,
    fallback_tokens_per_ms: f64,
) -> f64 {
    let fallback = ttft_mean + output_tokens / fallback_tokens_per_ms;

    let e2e = match user_tps_mean {
        Some(tps) if tps.is_finite() && tps > 0.0 => ttft_mean + (output_tokens / tps) * 1000.0,
        _ => {
            debug!(
                "Per-user TPS {:?} unusable, assuming {} tokens/ms",
                user_tps_mean, fallback_tokens_per_ms
            );
            fallback
        }
    };

    if e2e.is_finite() && e2e >= 0.0 {
        e2e
    } else if fallback.is_finite() && fallback >= 0.0 {
        fallback
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ttft_plus_generation_time() {
        assert_eq!(derive_e2e_mean(100.0, Some(50.0), 200.0, 0.1), 4100.0);
    }

    #[test]
    fn test_unusable_rate_uses_fallback() {
        for tps in [None, Some(0.0), Some(-3.0), Some(f64::NAN), Some(f64::INFINITY)] {
            let e2e = derive_e2e_mean(100.0, tps, 200.0, 0.1);
            assert!((e2e - 2100.0).abs() < 1e-9, "tps {:?} gave {}", tps, e2e);
        }
    }

    #[test]
    fn test_negative_total_uses_fallback() {
        // neither the regular total nor the fallback is usable
        let e2e = derive_e2e_mean(-1e12, Some(1.0), 10.0, 0.1);
        assert_eq!(e2e, 0.0);

        let e2e = derive_e2e_mean(5.0, Some(f64::MIN_POSITIVE), 10.0, 0.1);
        assert!((e2e - 105.0).abs() < 1e-9);
    }
}
