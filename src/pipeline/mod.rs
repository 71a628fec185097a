//! Per-symbol analysis pipeline and concurrent multi-symbol orchestration.
//!
//! One symbol's run is strictly sequential: fetch series, compute indicators,
//! decide, optionally generate commentary, persist a history record, return
//! the decision. A batch fans the runs out concurrently and fans results back
//! in input order; any single symbol's failure is converted to an error
//! decision so it never aborts its siblings.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, warn};

use crate::domain::decision::{evaluate_latest, DataSource, Decision, Signal, StrategyParams};
use crate::domain::error::QuantsigError;
use crate::domain::history::HistoryRecord;
use crate::ports::commentary::CommentaryGenerator;
use crate::ports::history_port::HistoryPort;
use crate::ports::market_data::MarketDataSource;

/// Default per-symbol deadline.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(15);

/// Result of one symbol's pipeline run.
#[derive(Debug, Clone)]
pub struct SymbolReport {
    pub decision: Decision,
    pub commentary: Option<String>,
}

/// Split a comma-separated symbol list into normalized uppercase tickers.
pub fn parse_symbols(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[derive(Clone)]
pub struct Orchestrator {
    data: Arc<dyn MarketDataSource>,
    history: Arc<dyn HistoryPort>,
    commentary: Option<Arc<dyn CommentaryGenerator>>,
    params: StrategyParams,
    source_tag: DataSource,
    period: String,
    interval: String,
    timeout: Duration,
}

impl Orchestrator {
    pub fn new(
        data: Arc<dyn MarketDataSource>,
        history: Arc<dyn HistoryPort>,
        source_tag: DataSource,
        params: StrategyParams,
    ) -> Self {
        Self {
            data,
            history,
            commentary: None,
            params,
            source_tag,
            period: "6mo".to_string(),
            interval: "1d".to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Enable commentary generation for each decision.
    pub fn with_commentary(mut self, generator: Arc<dyn CommentaryGenerator>) -> Self {
        self.commentary = Some(generator);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_fetch_window(mut self, period: impl Into<String>, interval: impl Into<String>) -> Self {
        self.period = period.into();
        self.interval = interval.into();
        self
    }

    /// Analyze one symbol under the per-symbol deadline.
    ///
    /// Data-fetch failures are converted into a FAILED-source decision and
    /// still recorded in history, so the log shows attempted-but-failed
    /// analyses. A deadline overrun is surfaced as
    /// [`QuantsigError::Timeout`] and records nothing.
    pub async fn run_one(&self, symbol: &str) -> Result<SymbolReport, QuantsigError> {
        let symbol = symbol.trim().to_uppercase();
        match tokio::time::timeout(self.timeout, self.run_pipeline(&symbol)).await {
            Ok(report) => Ok(report),
            Err(_) => Err(QuantsigError::Timeout {
                symbol,
                seconds: self.timeout.as_secs(),
            }),
        }
    }

    /// Analyze a batch concurrently. The result order matches the input
    /// symbol order, and every symbol settles: failures (including timeouts)
    /// become per-symbol error decisions instead of aborting the batch.
    pub async fn run_many(&self, symbols: &[String]) -> Vec<SymbolReport> {
        let handles: Vec<_> = symbols
            .iter()
            .map(|symbol| {
                let orchestrator = self.clone();
                let symbol = symbol.clone();
                tokio::spawn(async move { orchestrator.run_one(&symbol).await })
            })
            .collect();

        let mut reports = Vec::with_capacity(symbols.len());
        for (symbol, handle) in symbols.iter().zip(handles) {
            let report = match handle.await {
                Ok(Ok(report)) => report,
                Ok(Err(e)) => {
                    warn!(symbol = %symbol, error = %e, "symbol analysis failed");
                    failed_report(symbol, &e.to_string())
                }
                Err(e) => {
                    error!(symbol = %symbol, error = %e, "symbol analysis task panicked");
                    failed_report(symbol, "internal analysis task failure")
                }
            };
            reports.push(report);
        }
        reports
    }

    async fn run_pipeline(&self, symbol: &str) -> SymbolReport {
        let points = match self
            .data
            .fetch_historical(symbol, &self.period, &self.interval)
            .await
        {
            Ok(points) if points.is_empty() => {
                let e = QuantsigError::EmptySeries {
                    symbol: symbol.to_string(),
                };
                return self.record_failed_fetch(symbol, &e.to_string()).await;
            }
            Ok(points) => points,
            Err(e) => {
                return self.record_failed_fetch(symbol, &e.to_string()).await;
            }
        };

        // Indicator and decision computation is synchronous and cheap; the
        // RNG is scoped so the future stays Send across the awaits below.
        let verdict = {
            let mut rng = rand::thread_rng();
            evaluate_latest(&points, &self.params, &mut rng)
        };

        let last = &points[points.len() - 1];
        let decision = Decision {
            symbol: symbol.to_string(),
            action: verdict.action,
            confidence: verdict.confidence,
            rationale: verdict.rationale,
            last_close: last.close,
            as_of: last.timestamp,
            data_source: self.source_tag,
        };

        let commentary = match &self.commentary {
            Some(generator) => Some(match generator.generate(&decision).await {
                Ok(text) => text,
                Err(e) => {
                    // Commentary failure never aborts the pipeline; attach a
                    // marker instead.
                    warn!(symbol = %symbol, error = %e, "commentary generation failed");
                    format!("[commentary unavailable: {e}]")
                }
            }),
            None => None,
        };

        self.append_record(HistoryRecord::from_decision(&decision, commentary.clone()))
            .await;

        SymbolReport {
            decision,
            commentary,
        }
    }

    async fn record_failed_fetch(&self, symbol: &str, reason: &str) -> SymbolReport {
        let report = failed_report(symbol, reason);
        self.append_record(HistoryRecord::from_decision(&report.decision, None))
            .await;
        report
    }

    async fn append_record(&self, record: HistoryRecord) {
        // Availability over durability: a failed append is an operator
        // concern, not a pipeline failure.
        if let Err(e) = self.history.append(record).await {
            error!(error = %e, "failed to append history record");
        }
    }
}

fn failed_report(symbol: &str, reason: &str) -> SymbolReport {
    SymbolReport {
        decision: Decision {
            symbol: symbol.trim().to_uppercase(),
            action: Signal::Hold,
            confidence: 0,
            rationale: reason.to_string(),
            last_close: 0.0,
            as_of: Utc::now(),
            data_source: DataSource::Failed,
        },
        commentary: None,
    }
}
