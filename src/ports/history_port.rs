//! Decision history persistence port.

use async_trait::async_trait;

use crate::domain::error::QuantsigError;
use crate::domain::history::HistoryRecord;

/// Durable append-only decision log.
///
/// Contract: after `append` returns, `load_all` includes the record and the
/// returned sequence is sorted non-decreasingly by `timestamp` (stable for
/// ties). Implementations must serialize concurrent appends so no record is
/// lost, and must never expose a partially written store to readers.
#[async_trait]
pub trait HistoryPort: Send + Sync {
    async fn append(&self, record: HistoryRecord) -> Result<(), QuantsigError>;

    /// Load the full history. A missing or unreadable store yields an empty
    /// sequence, not an error; corruption is an operator-log concern.
    async fn load_all(&self) -> Result<Vec<HistoryRecord>, QuantsigError>;
}
