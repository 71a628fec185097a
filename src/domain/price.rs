//! OHLCV price point representation.

use chrono::{DateTime, Utc};

/// One bar of an OHLCV series. Series are chronological, oldest first, with
/// non-decreasing timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

/// Extract the close column from a series.
pub fn closes(points: &[PricePoint]) -> Vec<f64> {
    points.iter().map(|p| p.close).collect()
}

/// Round to 2 decimal places. Presentation-boundary only; indicator
/// computations stay unrounded so smoothing error does not compound.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
