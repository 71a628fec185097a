//! Market data acquisition port.

use async_trait::async_trait;

use crate::domain::error::QuantsigError;
use crate::domain::price::PricePoint;

/// Source of historical OHLCV series. Implementations must return points in
/// chronological order, oldest first.
#[async_trait]
pub trait MarketDataSource: Send + Sync {
    /// Fetch a historical series for `symbol`. `period` is a lookback window
    /// such as `6mo` or `1y`; `interval` is the bar granularity such as `1d`
    /// or `1h`.
    async fn fetch_historical(
        &self,
        symbol: &str,
        period: &str,
        interval: &str,
    ) -> Result<Vec<PricePoint>, QuantsigError>;
}
