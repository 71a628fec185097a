//! Signal decision rules: SMA crossovers with RSI threshold overrides.
//!
//! Rule evaluation is strictly ordered; the order encodes priority, not
//! independent conditions. A bar that is simultaneously a golden cross and
//! overbought resolves as BUY because cross rules outrank RSI-only rules.
//!
//! Confidence is sampled uniformly within a fixed band per rule. The random
//! source is injected so callers can seed it for reproducible tests;
//! production passes `rand::thread_rng()`.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::indicator::{compute_snapshots, IndicatorSnapshot};
use crate::domain::price::PricePoint;

/// Confidence reported when there is not enough history to evaluate rules.
pub const INSUFFICIENT_HISTORY_CONFIDENCE: u8 = 10;

/// Trading action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Signal::Buy => write!(f, "BUY"),
            Signal::Sell => write!(f, "SELL"),
            Signal::Hold => write!(f, "HOLD"),
        }
    }
}

/// Where the price series behind a decision came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum DataSource {
    Live,
    Mock,
    Failed,
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Live => write!(f, "LIVE"),
            DataSource::Mock => write!(f, "MOCK"),
            DataSource::Failed => write!(f, "FAILED"),
        }
    }
}

/// Strategy parameters: SMA windows, RSI period, and RSI thresholds.
#[derive(Debug, Clone, PartialEq)]
pub struct StrategyParams {
    pub short_period: usize,
    pub long_period: usize,
    pub rsi_period: usize,
    pub oversold: f64,
    pub overbought: f64,
}

impl Default for StrategyParams {
    fn default() -> Self {
        Self {
            short_period: 20,
            long_period: 50,
            rsi_period: 14,
            oversold: 30.0,
            overbought: 70.0,
        }
    }
}

impl StrategyParams {
    /// Minimum series length for rule evaluation: a full long window plus the
    /// prior bar needed for crossover detection.
    pub fn min_points(&self) -> usize {
        self.long_period + 1
    }
}

/// Outcome of rule evaluation, before it is stamped into a [`Decision`].
#[derive(Debug, Clone, PartialEq)]
pub struct Verdict {
    pub action: Signal,
    pub confidence: u8,
    pub rationale: String,
}

/// A finalized advisory decision for one symbol. Immutable after creation.
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    pub symbol: String,
    pub action: Signal,
    pub confidence: u8,
    pub rationale: String,
    pub last_close: f64,
    pub as_of: DateTime<Utc>,
    pub data_source: DataSource,
}

fn crossed_above(prev: &IndicatorSnapshot, last: &IndicatorSnapshot) -> bool {
    match (prev.sma_short, prev.sma_long, last.sma_short, last.sma_long) {
        (Some(ps), Some(pl), Some(ls), Some(ll)) => ps <= pl && ls > ll,
        _ => false,
    }
}

fn crossed_below(prev: &IndicatorSnapshot, last: &IndicatorSnapshot) -> bool {
    match (prev.sma_short, prev.sma_long, last.sma_short, last.sma_long) {
        (Some(ps), Some(pl), Some(ls), Some(ll)) => ps >= pl && ls < ll,
        _ => false,
    }
}

/// Apply the rule table to the previous and latest indicator snapshots.
///
/// Priority order: golden cross, oversold, death cross, overbought, hold.
pub fn decide<R: Rng>(
    prev: &IndicatorSnapshot,
    last: &IndicatorSnapshot,
    params: &StrategyParams,
    rng: &mut R,
) -> Verdict {
    if crossed_above(prev, last) {
        return Verdict {
            action: Signal::Buy,
            confidence: rng.gen_range(80..=95),
            rationale: "Golden cross: short-term SMA moved above long-term SMA.".to_string(),
        };
    }

    if last.rsi < params.oversold {
        return Verdict {
            action: Signal::Buy,
            confidence: rng.gen_range(70..=85),
            rationale: format!(
                "RSI ({:.2}) is oversold, indicating a potential buying opportunity.",
                last.rsi
            ),
        };
    }

    if crossed_below(prev, last) {
        return Verdict {
            action: Signal::Sell,
            confidence: rng.gen_range(80..=95),
            rationale: "Death cross: short-term SMA moved below long-term SMA.".to_string(),
        };
    }

    if last.rsi > params.overbought {
        return Verdict {
            action: Signal::Sell,
            confidence: rng.gen_range(70..=85),
            rationale: format!(
                "RSI ({:.2}) is overbought, consider selling or reducing exposure.",
                last.rsi
            ),
        };
    }

    // Higher conviction when RSI sits well inside the neutral band.
    if last.rsi > params.oversold && last.rsi < params.overbought {
        Verdict {
            action: Signal::Hold,
            confidence: rng.gen_range(50..=65),
            rationale: "Market is consolidating. Awaiting a clear SMA or RSI signal.".to_string(),
        }
    } else {
        Verdict {
            action: Signal::Hold,
            confidence: rng.gen_range(30..=50),
            rationale: "Market neutral or mixed signals. Monitoring recommended.".to_string(),
        }
    }
}

/// Evaluate the latest bar of a full price series.
///
/// Series shorter than `long_period + 1` produce a deterministic forced HOLD
/// with confidence [`INSUFFICIENT_HISTORY_CONFIDENCE`]; this is a terminal
/// outcome for the call, not an error.
pub fn evaluate_latest<R: Rng>(
    points: &[PricePoint],
    params: &StrategyParams,
    rng: &mut R,
) -> Verdict {
    if points.len() < params.min_points() {
        return Verdict {
            action: Signal::Hold,
            confidence: INSUFFICIENT_HISTORY_CONFIDENCE,
            rationale: format!(
                "Insufficient history: have {} points, need at least {} for long-period indicators.",
                points.len(),
                params.min_points()
            ),
        };
    }

    let snapshots = compute_snapshots(
        points,
        params.short_period,
        params.long_period,
        params.rsi_period,
    );
    let prev = &snapshots[snapshots.len() - 2];
    let last = &snapshots[snapshots.len() - 1];
    decide(prev, last, params, rng)
}
