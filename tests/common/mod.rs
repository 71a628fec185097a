#![allow(dead_code)]

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{TimeZone, Utc};

use quantsig::domain::decision::Decision;
use quantsig::domain::error::QuantsigError;
use quantsig::domain::price::PricePoint;
use quantsig::ports::commentary::CommentaryGenerator;
use quantsig::ports::market_data::MarketDataSource;

/// Scripted market data: fixed series or errors per symbol.
pub struct ScriptedSource {
    data: HashMap<String, Vec<PricePoint>>,
    errors: HashMap<String, String>,
}

impl ScriptedSource {
    pub fn new() -> Self {
        Self {
            data: HashMap::new(),
            errors: HashMap::new(),
        }
    }

    pub fn with_series(mut self, symbol: &str, points: Vec<PricePoint>) -> Self {
        self.data.insert(symbol.to_string(), points);
        self
    }

    pub fn with_error(mut self, symbol: &str, reason: &str) -> Self {
        self.errors.insert(symbol.to_string(), reason.to_string());
        self
    }
}

#[async_trait]
impl MarketDataSource for ScriptedSource {
    async fn fetch_historical(
        &self,
        symbol: &str,
        _period: &str,
        _interval: &str,
    ) -> Result<Vec<PricePoint>, QuantsigError> {
        if let Some(reason) = self.errors.get(symbol) {
            return Err(QuantsigError::DataFetch {
                symbol: symbol.to_string(),
                reason: reason.clone(),
            });
        }
        self.data
            .get(symbol)
            .cloned()
            .ok_or_else(|| QuantsigError::DataFetch {
                symbol: symbol.to_string(),
                reason: "no scripted data".to_string(),
            })
    }
}

/// Data source that takes longer than any reasonable test deadline.
pub struct SlowSource {
    pub delay: Duration,
}

#[async_trait]
impl MarketDataSource for SlowSource {
    async fn fetch_historical(
        &self,
        _symbol: &str,
        _period: &str,
        _interval: &str,
    ) -> Result<Vec<PricePoint>, QuantsigError> {
        tokio::time::sleep(self.delay).await;
        Ok(flat_series(60, 100.0))
    }
}

pub struct FixedCommentary(pub String);

#[async_trait]
impl CommentaryGenerator for FixedCommentary {
    async fn generate(&self, _decision: &Decision) -> Result<String, QuantsigError> {
        Ok(self.0.clone())
    }
}

pub struct FailingCommentary;

#[async_trait]
impl CommentaryGenerator for FailingCommentary {
    async fn generate(&self, _decision: &Decision) -> Result<String, QuantsigError> {
        Err(QuantsigError::Commentary {
            reason: "generator offline".to_string(),
        })
    }
}

/// Hourly bar at index `i` of a series starting 2024-06-01 00:00 UTC.
pub fn make_point(i: usize, close: f64) -> PricePoint {
    PricePoint {
        timestamp: Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap()
            + chrono::Duration::hours(i as i64),
        open: close,
        high: close + 0.5,
        low: close - 0.5,
        close,
        volume: 100_000,
    }
}

pub fn flat_series(n: usize, price: f64) -> Vec<PricePoint> {
    (0..n).map(|i| make_point(i, price)).collect()
}

/// Flat history with a sharp final jump: produces a golden cross on the last
/// bar (short SMA overtakes long SMA) with RSI pinned high.
pub fn buy_cross_series(n: usize) -> Vec<PricePoint> {
    let mut points = flat_series(n - 1, 100.0);
    points.push(make_point(n - 1, 150.0));
    points
}

/// Flat history with a sharp final drop. The last bar is both a death cross
/// and deeply oversold (RSI 0), so rule priority resolves it as BUY.
pub fn crash_series(n: usize) -> Vec<PricePoint> {
    let mut points = flat_series(n - 1, 100.0);
    points.push(make_point(n - 1, 60.0));
    points
}
