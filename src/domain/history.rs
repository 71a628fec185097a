//! Durable decision-log record schema.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::decision::{DataSource, Decision, Signal};
use crate::domain::price::round2;

/// One row of the decision log. `timestamp` is record-write time, distinct
/// from the decision's `as_of`. Records are never mutated after append;
/// the stored history is kept sorted by `timestamp` ascending.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryRecord {
    pub timestamp: DateTime<Utc>,
    pub symbol: String,
    pub action: Signal,
    pub price: f64,
    pub confidence: u8,
    pub rationale: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub commentary: Option<String>,
    pub data_source: DataSource,
}

impl HistoryRecord {
    /// Build a record from a finalized decision. Price is rounded here, at
    /// the presentation boundary.
    pub fn from_decision(decision: &Decision, commentary: Option<String>) -> Self {
        Self {
            timestamp: Utc::now(),
            symbol: decision.symbol.clone(),
            action: decision.action,
            price: round2(decision.last_close),
            confidence: decision.confidence,
            rationale: decision.rationale.clone(),
            commentary,
            data_source: decision.data_source,
        }
    }
}
