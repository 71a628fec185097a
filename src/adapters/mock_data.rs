//! Randomized mock market data with signal forcing.
//!
//! Generates an hourly random-walk OHLCV series, then optionally shocks the
//! final close to push the series into a specific rule branch. Forcing is a
//! price shock, not a direct indicator override, so the shapes still obey the
//! OHLCV ordering contract and flow through the real indicator math.

use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::domain::error::QuantsigError;
use crate::domain::price::{round2, PricePoint};
use crate::ports::market_data::MarketDataSource;

const DEFAULT_POINTS: usize = 360;
const WALK_VOLATILITY: f64 = 0.005;

/// The signal shape a generated series is nudged toward.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForcedShape {
    /// Sharp +10% final close, dragging the short SMA above the long SMA.
    BuyCross,
    /// Sharp -10% final close.
    SellCross,
    /// Severe -15% drop from the prior close.
    Oversold,
    /// Severe +15% jump from the prior close.
    Overbought,
    /// No manipulation; the random walk decides.
    NaturalHold,
}

pub struct MockMarketData {
    forced: Option<ForcedShape>,
    seed: Option<u64>,
    points: usize,
}

impl Default for MockMarketData {
    fn default() -> Self {
        Self::new()
    }
}

impl MockMarketData {
    pub fn new() -> Self {
        Self {
            forced: None,
            seed: None,
            points: DEFAULT_POINTS,
        }
    }

    /// Always force the given shape instead of drawing one at random.
    pub fn with_forced(mut self, shape: ForcedShape) -> Self {
        self.forced = Some(shape);
        self
    }

    /// Seed the generator for reproducible series.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn with_points(mut self, points: usize) -> Self {
        self.points = points;
        self
    }

    fn base_price(symbol: &str, rng: &mut StdRng) -> f64 {
        match symbol.to_uppercase().as_str() {
            "AAPL" => 310.0,
            "TSLA" => 430.0,
            "MSFT" => 280.0,
            "GOOGL" => 135.0,
            "AMZN" => 140.0,
            _ => rng.gen_range(100.0..500.0),
        }
    }

    fn draw_shape(rng: &mut StdRng) -> ForcedShape {
        // Weights 20/20/15/15/30: a 70% chance of an active signal shape.
        let roll: f64 = rng.r#gen();
        if roll < 0.20 {
            ForcedShape::BuyCross
        } else if roll < 0.40 {
            ForcedShape::SellCross
        } else if roll < 0.55 {
            ForcedShape::Oversold
        } else if roll < 0.70 {
            ForcedShape::Overbought
        } else {
            ForcedShape::NaturalHold
        }
    }

    fn generate(&self, symbol: &str) -> Vec<PricePoint> {
        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        let n = self.points;
        let start = Utc::now() - Duration::hours(n.saturating_sub(1) as i64);
        let mut points = Vec::with_capacity(n);
        let mut close = Self::base_price(symbol, &mut rng);

        for i in 0..n {
            close *= rng.gen_range(1.0 - WALK_VOLATILITY..1.0 + WALK_VOLATILITY);
            let close_r = round2(close);
            let open = round2(close_r * rng.gen_range(0.998..1.002));
            let high = round2(open.max(close_r) * rng.gen_range(1.0..1.001));
            let low = round2(open.min(close_r) * rng.gen_range(0.999..1.0));
            points.push(PricePoint {
                timestamp: start + Duration::hours(i as i64),
                open,
                high,
                low,
                close: close_r,
                volume: rng.gen_range(50_000..500_000),
            });
        }

        let shape = self.forced.unwrap_or_else(|| Self::draw_shape(&mut rng));
        Self::apply_shape(&mut points, shape);
        points
    }

    fn apply_shape(points: &mut [PricePoint], shape: ForcedShape) {
        if points.len() < 2 || shape == ForcedShape::NaturalHold {
            return;
        }

        let last_idx = points.len() - 1;
        let prev_close = points[last_idx - 1].close;
        let last = &mut points[last_idx];
        let forced_close = match shape {
            ForcedShape::BuyCross => last.close * 1.10,
            ForcedShape::SellCross => last.close * 0.90,
            ForcedShape::Oversold => prev_close * 0.85,
            ForcedShape::Overbought => prev_close * 1.15,
            ForcedShape::NaturalHold => unreachable!(),
        };

        last.close = round2(forced_close);
        last.high = last.high.max(last.close);
        last.low = last.low.min(last.close);
    }
}

#[async_trait]
impl MarketDataSource for MockMarketData {
    async fn fetch_historical(
        &self,
        symbol: &str,
        _period: &str,
        _interval: &str,
    ) -> Result<Vec<PricePoint>, QuantsigError> {
        Ok(self.generate(symbol))
    }
}
