//! CLI entry point for trace_averager.
//!
//! Reads score trace records from standard input (or `--input`) and prints
//! one running average line per timestamp bucket.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use trace_averager::{
    aggregators::{SimpleMean, TREC_CSV_HEADER, TrecMean},
    config::LogConfig,
    output::{CsvWriter, PlainWriter},
    pipeline::{InputFormat, StreamSummary, run},
};

#[derive(Parser)]
#[command(name = "trace_averager")]
#[command(about = "Running per-timestamp score averages over a record stream", long_about = None)]
struct Cli {
    /// Read records from FILE instead of standard input
    #[arg(short, long, global = true, value_name = "FILE")]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sum of the latest score per topic divided by the record divisor.
    ///
    /// Input lines: <timestamp> <divisor> <topic> <score>
    Mean,
    /// Average score per TREC collection (4, 5, 6 and 7).
    ///
    /// Input lines: <timestamp> <trec> <topic> <score>
    Trec {
        /// Read comma separated input, skipping rows that start with 'T',
        /// and emit CSV with a header row
        #[arg(long, default_value_t = false)]
        csv: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    dotenvy::dotenv().ok();
    let _log_guard = init_tracing(&LogConfig::from_env())?;

    let input = open_input(cli.input.as_deref())?;
    let stdout = io::stdout().lock();

    let summary: StreamSummary = match cli.command {
        Commands::Mean => {
            info!("Averaging scores over divisor");
            run(
                SimpleMean::new(),
                input,
                InputFormat::Whitespace,
                &mut PlainWriter::new(stdout),
            )?
        }
        Commands::Trec { csv: false } => {
            info!("Averaging scores per TREC collection");
            run(
                TrecMean::new(),
                input,
                InputFormat::Whitespace,
                &mut PlainWriter::new(stdout),
            )?
        }
        Commands::Trec { csv: true } => {
            info!("Averaging scores per TREC collection, CSV output");
            let mut sink = CsvWriter::new(stdout, &TREC_CSV_HEADER)?;
            run(TrecMean::new(), input, InputFormat::Csv, &mut sink)?
        }
    };

    info!(
        records = summary.records,
        buckets = summary.buckets,
        "Stream finished"
    );
    Ok(())
}

/// Stderr logging, plus a JSON rolling log file when one is configured.
///
/// The returned guard must live until exit so buffered file logs are written.
fn init_tracing(config: &LogConfig) -> Result<Option<WorkerGuard>> {
    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_writer(io::stderr)
        .with_filter(
            EnvFilter::try_new(&config.stderr_filter)
                .with_context(|| format!("invalid RUST_LOG filter {:?}", config.stderr_filter))?,
        );

    let (json_layer, guard) = match config.file_parts() {
        Some((dir, file_name)) => {
            let file_appender = tracing_appender::rolling::daily(dir, file_name);
            let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);
            let layer = fmt::layer()
                .json()
                .with_current_span(true)
                .with_span_list(true)
                .with_writer(non_blocking_file)
                .with_filter(EnvFilter::try_new(&config.json_filter).with_context(|| {
                    format!("invalid RUST_LOG_JSON filter {:?}", config.json_filter)
                })?);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    Ok(guard)
}

fn open_input(path: Option<&Path>) -> Result<Box<dyn BufRead>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file =
                File::open(path).with_context(|| format!("failed to open {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        _ => Ok(Box::new(io::stdin().lock())),
    }
}
