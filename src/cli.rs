//! CLI definition and dispatch.

use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand};

use crate::adapters::commentary::{LlmCommentary, TemplateCommentary};
use crate::adapters::csv_export::export_history_csv;
use crate::adapters::file_config::FileConfigAdapter;
use crate::adapters::json_history::JsonHistoryStore;
use crate::adapters::mock_data::MockMarketData;
use crate::adapters::yahoo::YahooMarketData;
use crate::domain::config::{load_pipeline_config, load_strategy_params, CommentaryProvider, PipelineConfig};
use crate::domain::decision::{DataSource, StrategyParams};
use crate::domain::error::QuantsigError;
use crate::pipeline::{parse_symbols, Orchestrator};
use crate::ports::commentary::CommentaryGenerator;
use crate::ports::history_port::HistoryPort;
use crate::ports::market_data::MarketDataSource;

#[derive(Parser, Debug)]
#[command(name = "quantsig", about = "Technical-indicator trading signals")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Analyze symbols and append decisions to the history log
    Analyze {
        /// Comma-separated ticker symbols, e.g. AAPL,TSLA
        #[arg(short, long)]
        symbols: String,
        /// Use the randomized mock data source instead of live quotes
        #[arg(long)]
        mock: bool,
        /// Generate commentary for each decision
        #[arg(long)]
        commentary: bool,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Inspect or export the decision history
    History {
        #[command(subcommand)]
        command: HistoryCommand,
    },
    /// Validate a configuration file
    Validate {
        #[arg(short, long)]
        config: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
pub enum HistoryCommand {
    /// Print recent decisions, oldest first
    Show {
        /// Only the most recent N records
        #[arg(long)]
        limit: Option<usize>,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Export the full history as CSV
    Export {
        #[arg(short, long)]
        output: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub async fn run(cli: Cli) -> ExitCode {
    match cli.command {
        Command::Analyze {
            symbols,
            mock,
            commentary,
            config,
        } => run_analyze(&symbols, mock, commentary, config.as_ref()).await,
        Command::History { command } => match command {
            HistoryCommand::Show { limit, config } => run_history_show(limit, config.as_ref()).await,
            HistoryCommand::Export { output, config } => {
                run_history_export(&output, config.as_ref()).await
            }
        },
        Command::Validate { config } => run_validate(&config),
    }
}

fn fail(err: &QuantsigError) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::from(err)
}

fn load_settings(
    config_path: Option<&PathBuf>,
) -> Result<(StrategyParams, PipelineConfig), QuantsigError> {
    match config_path {
        None => Ok((StrategyParams::default(), PipelineConfig::default())),
        Some(path) => {
            let adapter =
                FileConfigAdapter::from_file(path).map_err(|e| QuantsigError::ConfigParse {
                    file: path.display().to_string(),
                    reason: e.to_string(),
                })?;
            let params = load_strategy_params(&adapter)?;
            let pipeline = load_pipeline_config(&adapter)?;
            Ok((params, pipeline))
        }
    }
}

async fn run_analyze(
    symbols: &str,
    mock: bool,
    commentary: bool,
    config_path: Option<&PathBuf>,
) -> ExitCode {
    let (params, settings) = match load_settings(config_path) {
        Ok(loaded) => loaded,
        Err(e) => return fail(&e),
    };

    let symbol_list = parse_symbols(symbols);
    if symbol_list.is_empty() {
        let err = QuantsigError::ConfigInvalid {
            section: "cli".to_string(),
            key: "symbols".to_string(),
            reason: "no symbols given".to_string(),
        };
        return fail(&err);
    }

    let (data, source_tag): (Arc<dyn MarketDataSource>, DataSource) = if mock {
        (Arc::new(MockMarketData::new()), DataSource::Mock)
    } else {
        (Arc::new(YahooMarketData::new()), DataSource::Live)
    };
    let history: Arc<dyn HistoryPort> = Arc::new(JsonHistoryStore::new(&settings.history_path));

    let mut orchestrator = Orchestrator::new(data, history, source_tag, params)
        .with_timeout(Duration::from_secs(settings.timeout_secs))
        .with_fetch_window(settings.period.clone(), settings.interval.clone());

    if commentary {
        let generator: Arc<dyn CommentaryGenerator> = match &settings.commentary {
            CommentaryProvider::Template => Arc::new(TemplateCommentary),
            CommentaryProvider::Llm {
                api_key,
                endpoint,
                model,
            } => Arc::new(LlmCommentary::new(
                endpoint.clone(),
                api_key.clone(),
                model.clone(),
            )),
        };
        orchestrator = orchestrator.with_commentary(generator);
    }

    let reports = orchestrator.run_many(&symbol_list).await;

    println!(
        "{:<8} {:>10} {:<6} {:>5} {:<8} RATIONALE",
        "SYMBOL", "CLOSE", "SIGNAL", "CONF", "SOURCE"
    );
    for report in &reports {
        let d = &report.decision;
        println!(
            "{:<8} {:>10.2} {:<6} {:>4}% {:<8} {}",
            d.symbol, d.last_close, d.action, d.confidence, d.data_source, d.rationale
        );
        if let Some(text) = &report.commentary {
            println!("         {text}");
        }
    }
    ExitCode::SUCCESS
}

async fn run_history_show(limit: Option<usize>, config_path: Option<&PathBuf>) -> ExitCode {
    let (_, settings) = match load_settings(config_path) {
        Ok(loaded) => loaded,
        Err(e) => return fail(&e),
    };

    let store = JsonHistoryStore::new(&settings.history_path);
    let records = match store.load_all().await {
        Ok(records) => records,
        Err(e) => return fail(&e),
    };

    let skip = limit.map_or(0, |n| records.len().saturating_sub(n));
    for record in &records[skip..] {
        println!(
            "{} {:<8} {:<6} {:>10.2} {:>4}% {:<8} {}",
            record.timestamp.format("%Y-%m-%d %H:%M:%S"),
            record.symbol,
            record.action,
            record.price,
            record.confidence,
            record.data_source,
            record.rationale
        );
    }
    ExitCode::SUCCESS
}

async fn run_history_export(output: &PathBuf, config_path: Option<&PathBuf>) -> ExitCode {
    let (_, settings) = match load_settings(config_path) {
        Ok(loaded) => loaded,
        Err(e) => return fail(&e),
    };

    let store = JsonHistoryStore::new(&settings.history_path);
    let records = match store.load_all().await {
        Ok(records) => records,
        Err(e) => return fail(&e),
    };

    if let Err(e) = export_history_csv(&records, output) {
        return fail(&e);
    }
    eprintln!("exported {} records to {}", records.len(), output.display());
    ExitCode::SUCCESS
}

fn run_validate(config_path: &PathBuf) -> ExitCode {
    match load_settings(Some(config_path)) {
        Ok((params, settings)) => {
            eprintln!(
                "config ok: SMA {}/{}, RSI {} ({}..{}), history at {}",
                params.short_period,
                params.long_period,
                params.rsi_period,
                params.oversold,
                params.overbought,
                settings.history_path.display()
            );
            ExitCode::SUCCESS
        }
        Err(e) => fail(&e),
    }
}
