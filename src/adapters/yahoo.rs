//! Live market data from the Yahoo Finance v8 chart endpoint.

use async_trait::async_trait;
use chrono::DateTime;
use serde::Deserialize;

use crate::domain::error::QuantsigError;
use crate::domain::price::PricePoint;
use crate::ports::market_data::MarketDataSource;

const DEFAULT_BASE_URL: &str = "https://query1.finance.yahoo.com";

pub struct YahooMarketData {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: Chart,
}

#[derive(Debug, Deserialize)]
struct Chart {
    result: Option<Vec<ChartResult>>,
    error: Option<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

impl Default for YahooMarketData {
    fn default() -> Self {
        Self::new()
    }
}

impl YahooMarketData {
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.into(),
        }
    }

    fn fetch_error(symbol: &str, reason: impl Into<String>) -> QuantsigError {
        QuantsigError::DataFetch {
            symbol: symbol.to_string(),
            reason: reason.into(),
        }
    }
}

/// Map a chart payload into a chronological price series. Entries with a
/// missing timestamp or close (halts, partial bars) are skipped.
fn parse_chart(symbol: &str, response: ChartResponse) -> Result<Vec<PricePoint>, QuantsigError> {
    if let Some(err) = response.chart.error {
        return Err(YahooMarketData::fetch_error(symbol, err.to_string()));
    }

    let result = response
        .chart
        .result
        .and_then(|mut r| if r.is_empty() { None } else { Some(r.remove(0)) })
        .ok_or_else(|| QuantsigError::EmptySeries {
            symbol: symbol.to_string(),
        })?;

    let timestamps = result.timestamp.unwrap_or_default();
    let quote = result
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| QuantsigError::EmptySeries {
            symbol: symbol.to_string(),
        })?;

    let mut points = Vec::with_capacity(timestamps.len());
    for (i, &ts) in timestamps.iter().enumerate() {
        let close = match quote.close.get(i).copied().flatten() {
            Some(c) => c,
            None => continue,
        };
        let Some(timestamp) = DateTime::from_timestamp(ts, 0) else {
            continue;
        };
        points.push(PricePoint {
            timestamp,
            open: quote.open.get(i).copied().flatten().unwrap_or(close),
            high: quote.high.get(i).copied().flatten().unwrap_or(close),
            low: quote.low.get(i).copied().flatten().unwrap_or(close),
            close,
            volume: quote.volume.get(i).copied().flatten().unwrap_or(0),
        });
    }

    if points.is_empty() {
        return Err(QuantsigError::EmptySeries {
            symbol: symbol.to_string(),
        });
    }

    points.sort_by_key(|p| p.timestamp);
    Ok(points)
}

#[async_trait]
impl MarketDataSource for YahooMarketData {
    async fn fetch_historical(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<PricePoint>, QuantsigError> {
        let url = format!(
            "{}/v8/finance/chart/{}?range={}&interval={}",
            self.base_url, symbol, period, interval
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| Self::fetch_error(symbol, e.to_string()))?;

        if !response.status().is_success() {
            return Err(Self::fetch_error(
                symbol,
                format!("upstream returned HTTP {}", response.status()),
            ));
        }

        let body: ChartResponse = response
            .json()
            .await
            .map_err(|e| Self::fetch_error(symbol, format!("malformed chart payload: {e}")))?;

        parse_chart(symbol, body)
    }
}
