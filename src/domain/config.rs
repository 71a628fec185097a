//! Typed configuration loading and validation.
//!
//! All config fields are validated up front, before the pipeline runs, so a
//! bad strategy window or a missing LLM key is a startup error rather than a
//! mid-pipeline surprise.

use std::path::PathBuf;

use crate::domain::decision::StrategyParams;
use crate::domain::error::QuantsigError;
use crate::ports::config_port::ConfigPort;

/// How trade commentary is produced, resolved at startup.
#[derive(Debug, Clone, PartialEq)]
pub enum CommentaryProvider {
    /// Offline template rendering; always available.
    Template,
    /// OpenAI-compatible chat endpoint.
    Llm {
        api_key: String,
        endpoint: String,
        model: String,
    },
}

/// Validated pipeline settings.
#[derive(Debug, Clone, PartialEq)]
pub struct PipelineConfig {
    pub history_path: PathBuf,
    pub timeout_secs: u64,
    pub period: String,
    pub interval: String,
    pub commentary: CommentaryProvider,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            history_path: PathBuf::from("data/trade_history.json"),
            timeout_secs: 15,
            period: "6mo".to_string(),
            interval: "1d".to_string(),
            commentary: CommentaryProvider::Template,
        }
    }
}

fn invalid(section: &str, key: &str, reason: impl Into<String>) -> QuantsigError {
    QuantsigError::ConfigInvalid {
        section: section.to_string(),
        key: key.to_string(),
        reason: reason.into(),
    }
}

/// Load and validate strategy parameters from the `[strategy]` section,
/// falling back to defaults for absent keys.
pub fn load_strategy_params(config: &dyn ConfigPort) -> Result<StrategyParams, QuantsigError> {
    let defaults = StrategyParams::default();
    let params = StrategyParams {
        short_period: config.get_usize("strategy", "short_period", defaults.short_period),
        long_period: config.get_usize("strategy", "long_period", defaults.long_period),
        rsi_period: config.get_usize("strategy", "rsi_period", defaults.rsi_period),
        oversold: config.get_double("strategy", "oversold", defaults.oversold),
        overbought: config.get_double("strategy", "overbought", defaults.overbought),
    };

    if params.short_period == 0 {
        return Err(invalid("strategy", "short_period", "must be at least 1"));
    }
    if params.long_period <= params.short_period {
        return Err(invalid(
            "strategy",
            "long_period",
            "must be greater than short_period",
        ));
    }
    if params.rsi_period < 2 {
        return Err(invalid("strategy", "rsi_period", "must be at least 2"));
    }
    if !(0.0 < params.oversold && params.oversold < params.overbought && params.overbought < 100.0)
    {
        return Err(invalid(
            "strategy",
            "oversold",
            "thresholds must satisfy 0 < oversold < overbought < 100",
        ));
    }
    Ok(params)
}

/// Load and validate pipeline settings from `[pipeline]`, `[history]`, and
/// `[commentary]`.
pub fn load_pipeline_config(config: &dyn ConfigPort) -> Result<PipelineConfig, QuantsigError> {
    let defaults = PipelineConfig::default();

    let timeout_secs = config.get_int(
        "pipeline",
        "timeout_secs",
        defaults.timeout_secs as i64,
    );
    if timeout_secs <= 0 {
        return Err(invalid("pipeline", "timeout_secs", "must be positive"));
    }

    let history_path = config
        .get_string("history", "path")
        .map(PathBuf::from)
        .unwrap_or(defaults.history_path);
    if history_path.as_os_str().is_empty() {
        return Err(invalid("history", "path", "must not be empty"));
    }

    let commentary = match config
        .get_string("commentary", "provider")
        .unwrap_or_else(|| "template".to_string())
        .to_lowercase()
        .as_str()
    {
        "template" => CommentaryProvider::Template,
        "llm" => {
            let api_key = config.get_string("commentary", "api_key").ok_or_else(|| {
                QuantsigError::ConfigMissing {
                    section: "commentary".to_string(),
                    key: "api_key".to_string(),
                }
            })?;
            CommentaryProvider::Llm {
                api_key,
                endpoint: config
                    .get_string("commentary", "endpoint")
                    .unwrap_or_else(|| "https://api.openai.com/v1/chat/completions".to_string()),
                model: config
                    .get_string("commentary", "model")
                    .unwrap_or_else(|| "gpt-4o-mini".to_string()),
            }
        }
        other => {
            return Err(invalid(
                "commentary",
                "provider",
                format!("unknown provider '{other}', expected 'template' or 'llm'"),
            ));
        }
    };

    Ok(PipelineConfig {
        history_path,
        timeout_secs: timeout_secs as u64,
        period: config
            .get_string("pipeline", "period")
            .unwrap_or(defaults.period),
        interval: config
            .get_string("pipeline", "interval")
            .unwrap_or(defaults.interval),
        commentary,
    })
}
