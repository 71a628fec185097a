//! Technical indicator computation: simple moving averages and RSI.
//!
//! Pure functions over close-price slices. All arithmetic stays in f64 end to
//! end; rounding is left to presentation boundaries.
//!
//! SMA comes in two semantics:
//! - [`sma`] (strict): a value exists only once a full window of closes is
//!   available. This is the canonical mode for the decision path, since partial
//!   windows early in history produce misleadingly confident early signals.
//! - [`sma_lenient`] (min-periods = 1): averages whatever prefix is available,
//!   producing a value from index 0. Opt-in only.
//!
//! RSI uses exponential smoothing of per-step gains and losses with
//! `alpha = 2 / (period + 1)`. Indices before the warm-up window report the
//! neutral value 50 (a fill policy, not a missing marker), which avoids
//! spurious overbought/oversold triggers on short history. A smoothing window
//! with zero average loss reports 100, never NaN.

use crate::domain::price::{closes, PricePoint};

/// Neutral RSI value reported during warm-up.
pub const RSI_NEUTRAL: f64 = 50.0;

/// Per-index indicator values for a price series. `None` SMA entries mark the
/// strict-mode warm-up window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IndicatorSnapshot {
    pub sma_short: Option<f64>,
    pub sma_long: Option<f64>,
    pub rsi: f64,
}

/// Strict simple moving average: `None` until `window` closes are available.
pub fn sma(values: &[f64], window: usize) -> Vec<Option<f64>> {
    if window == 0 {
        return vec![None; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut running = 0.0;
    for (i, v) in values.iter().enumerate() {
        running += v;
        if i + 1 < window {
            out.push(None);
        } else {
            if i + 1 > window {
                running -= values[i - window];
            }
            out.push(Some(running / window as f64));
        }
    }
    out
}

/// Lenient simple moving average: averages however many closes exist when
/// fewer than `window` are available, so index 0 already has a value.
pub fn sma_lenient(values: &[f64], window: usize) -> Vec<f64> {
    if window == 0 {
        return vec![0.0; values.len()];
    }

    let mut out = Vec::with_capacity(values.len());
    let mut running = 0.0;
    for (i, v) in values.iter().enumerate() {
        running += v;
        let span = (i + 1).min(window);
        if i + 1 > window {
            running -= values[i - window];
        }
        out.push(running / span as f64);
    }
    out
}

/// RSI over exponentially smoothed gains/losses.
///
/// The first delta is treated as zero, seeding both averages. Indices before
/// `period - 1` report [`RSI_NEUTRAL`]; a zero average loss reports 100.
pub fn rsi(values: &[f64], period: usize) -> Vec<f64> {
    if period == 0 {
        return vec![RSI_NEUTRAL; values.len()];
    }

    let alpha = 2.0 / (period as f64 + 1.0);
    let mut out = Vec::with_capacity(values.len());
    let mut avg_gain = 0.0;
    let mut avg_loss = 0.0;

    for i in 0..values.len() {
        let delta = if i == 0 { 0.0 } else { values[i] - values[i - 1] };
        let gain = delta.max(0.0);
        let loss = (-delta).max(0.0);

        if i == 0 {
            avg_gain = gain;
            avg_loss = loss;
        } else {
            avg_gain = alpha * gain + (1.0 - alpha) * avg_gain;
            avg_loss = alpha * loss + (1.0 - alpha) * avg_loss;
        }

        if i + 1 < period {
            out.push(RSI_NEUTRAL);
        } else if avg_loss == 0.0 {
            out.push(100.0);
        } else {
            let rs = avg_gain / avg_loss;
            out.push(100.0 - 100.0 / (1.0 + rs));
        }
    }
    out
}

/// Compute per-index snapshots for a series: strict short/long SMAs plus RSI.
pub fn compute_snapshots(
    points: &[PricePoint],
    short_period: usize,
    long_period: usize,
    rsi_period: usize,
) -> Vec<IndicatorSnapshot> {
    let close_values = closes(points);
    let short = sma(&close_values, short_period);
    let long = sma(&close_values, long_period);
    let rsi_values = rsi(&close_values, rsi_period);

    short
        .into_iter()
        .zip(long)
        .zip(rsi_values)
        .map(|((sma_short, sma_long), rsi)| IndicatorSnapshot {
            sma_short,
            sma_long,
            rsi,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn sma_strict_warmup() {
        let values = vec![1.0, 2.0, 3.0, 4.0, 5.0];
        let out = sma(&values, 3);
        assert_eq!(out[0], None);
        assert_eq!(out[1], None);
        assert_relative_eq!(out[2].unwrap(), 2.0);
        assert_relative_eq!(out[3].unwrap(), 3.0);
        assert_relative_eq!(out[4].unwrap(), 4.0);
    }

    #[test]
    fn sma_window_larger_than_series() {
        let values = vec![1.0, 2.0];
        assert_eq!(sma(&values, 5), vec![None, None]);
    }

    #[test]
    fn sma_zero_window() {
        assert_eq!(sma(&[1.0, 2.0], 0), vec![None, None]);
    }

    #[test]
    fn sma_lenient_from_first_index() {
        let values = vec![2.0, 4.0, 6.0, 8.0];
        let out = sma_lenient(&values, 3);
        assert_relative_eq!(out[0], 2.0);
        assert_relative_eq!(out[1], 3.0);
        assert_relative_eq!(out[2], 4.0);
        assert_relative_eq!(out[3], 6.0);
    }

    #[test]
    fn sma_lenient_matches_strict_after_warmup() {
        let values: Vec<f64> = (1..=30).map(|i| i as f64 * 1.5).collect();
        let strict = sma(&values, 10);
        let lenient = sma_lenient(&values, 10);
        for i in 9..values.len() {
            assert_relative_eq!(strict[i].unwrap(), lenient[i], epsilon = 1e-9);
        }
    }

    #[test]
    fn rsi_neutral_during_warmup() {
        let values: Vec<f64> = (0..20).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&values, 14);
        for i in 0..13 {
            assert_relative_eq!(out[i], RSI_NEUTRAL, epsilon = 1e-12);
        }
        assert!(out[13] != RSI_NEUTRAL);
    }

    #[test]
    fn rsi_all_gains_is_100() {
        // Monotonically increasing closes: no losses, so RSI pins at 100.
        let values: Vec<f64> = (0..30).map(|i| 100.0 + i as f64).collect();
        let out = rsi(&values, 14);
        for i in 13..values.len() {
            assert_relative_eq!(out[i], 100.0);
        }
    }

    #[test]
    fn rsi_flat_series_is_100() {
        // Zero deltas everywhere: both smoothed averages stay 0 and the
        // zero-loss policy applies.
        let values = vec![42.0; 40];
        let out = rsi(&values, 14);
        for i in 13..values.len() {
            assert_relative_eq!(out[i], 100.0);
        }
    }

    #[test]
    fn rsi_all_losses_is_0() {
        let values: Vec<f64> = (0..30).map(|i| 100.0 - i as f64).collect();
        let out = rsi(&values, 14);
        for i in 13..values.len() {
            assert_relative_eq!(out[i], 0.0);
        }
    }

    #[test]
    fn rsi_known_mixed_series_in_bullish_territory() {
        let values = vec![
            44.0, 44.25, 44.5, 43.75, 44.5, 44.25, 44.75, 45.25, 45.5, 45.25, 45.5, 46.0, 46.25,
            46.0, 46.5,
        ];
        let out = rsi(&values, 14);
        let last = out[14];
        assert!(last > 50.0 && last < 100.0, "RSI {} not bullish", last);
    }

    #[test]
    fn snapshots_align_with_series_length() {
        let points: Vec<crate::domain::price::PricePoint> = (0..60)
            .map(|i| crate::domain::price::PricePoint {
                timestamp: chrono::Utc::now(),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0 + (i as f64 * 0.1),
                volume: 1000,
            })
            .collect();
        let snaps = compute_snapshots(&points, 20, 50, 14);
        assert_eq!(snaps.len(), 60);
        assert!(snaps[18].sma_short.is_none());
        assert!(snaps[19].sma_short.is_some());
        assert!(snaps[48].sma_long.is_none());
        assert!(snaps[49].sma_long.is_some());
    }

    proptest! {
        #[test]
        fn rsi_bounded_and_finite(
            values in prop::collection::vec(0.01f64..10_000.0, 0..200),
            period in 1usize..30,
        ) {
            for v in rsi(&values, period) {
                prop_assert!(v.is_finite());
                prop_assert!((0.0..=100.0).contains(&v));
            }
        }

        #[test]
        fn strict_sma_defined_exactly_after_window(
            values in prop::collection::vec(0.01f64..10_000.0, 1..100),
            window in 1usize..40,
        ) {
            let out = sma(&values, window);
            for (i, v) in out.iter().enumerate() {
                prop_assert_eq!(v.is_some(), i + 1 >= window);
            }
        }
    }
}
