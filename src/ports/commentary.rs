//! Trade commentary generation port.

use async_trait::async_trait;

use crate::domain::decision::Decision;
use crate::domain::error::QuantsigError;

/// Produces a freeform natural-language commentary for a finalized decision.
/// Failures are recovered by the caller; they must never abort a pipeline run.
#[async_trait]
pub trait CommentaryGenerator: Send + Sync {
    async fn generate(&self, decision: &Decision) -> Result<String, QuantsigError>;
}
