mod analysis;
mod config;
mod error;
mod export;
mod indicator;
mod model;
mod momentum;
mod pipeline;
mod ranking;
mod report;
mod series;
mod supplier;
mod trend;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use derive_more::{Display, Error};
use error_stack::{Report, ResultExt};
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::EnvFilter;

use analysis::{AnalysisBatch, Analyzer};
use config::AppConfig;
use report::Reporter;
use report::terminal::TerminalReporter;

#[derive(Debug, Display, Error)]
pub enum AppError {
    #[display("configuration error")]
    Config,
    #[display("supplier error")]
    Supplier,
    #[display("export error")]
    Export,
}

#[derive(Parser)]
#[command(name = "stock-ranker", about = "Daily equity indicators, trends and rankings")]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Fetch daily bars for every configured ticker, analyze, save and report
    Analyze {
        /// Where to write the batch; defaults to `general.output_path`
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Report on a previously saved batch without fetching anything
    Compare {
        /// Saved batch to read; defaults to `general.output_path`
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(report) = run().await {
        eprintln!("{report:?}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Report<AppError>> {
    let cli = Cli::parse();
    let config = config::load(Path::new(&cli.config)).change_context(AppError::Config)?;

    init_tracing(&config);

    let batch = match cli.command {
        Command::Analyze { output } => {
            let output = output.unwrap_or_else(|| PathBuf::from(&config.general.output_path));
            let batch = analyze(&config).await?;
            export::save(&output, &batch).change_context(AppError::Export)?;
            batch
        }
        Command::Compare { input } => {
            let input = input.unwrap_or_else(|| PathBuf::from(&config.general.output_path));
            export::load(&input).change_context(AppError::Export)?
        }
    };

    let records = batch.records();
    let summary = ranking::summarize(&records, config.analysis.ranking_horizon);
    TerminalReporter.report(&batch, &summary);

    Ok(())
}

async fn analyze(config: &AppConfig) -> Result<AnalysisBatch, Report<AppError>> {
    let analyzer = Analyzer::new(&config.analysis).change_context(AppError::Config)?;
    let supplier = supplier::build_supplier(&config.supplier).change_context(AppError::Supplier)?;

    // ── Shutdown ──────────────────────────────────────────────────────────────
    let cancel = CancellationToken::new();
    let ctrl_c = tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("ctrl+c received, cancelling remaining tickers");
                cancel.cancel();
            }
        }
    });

    let batch = pipeline::run_batch(supplier.as_ref(), &analyzer, &config.tickers, &cancel).await;
    ctrl_c.abort();

    Ok(batch)
}

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::new(&config.general.log_level);
    match config.general.log_format.as_str() {
        "json" => {
            tracing_subscriber::fmt()
                .json()
                .with_env_filter(filter)
                .init();
        }
        _ => {
            tracing_subscriber::fmt().with_env_filter(filter).init();
        }
    }
}
