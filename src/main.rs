//! CLI entry point for the transit feed decoder.
//!
//! Flattens saved 511 SIRI JSON responses into CSV tables, validates
//! GTFS-Realtime payloads, and processes whole directories of saved feeds.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand};
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};
use transit_feed_decoder::{
    Decoded, FeedKind, FeedOutcome,
    feed::{parse_document, process_bytes},
    normalize,
    output::{print_json, write_csv_file},
    parser::validate_feed,
    summary::FeedSummary,
};

/// Feeds whose header timestamp is older than this are logged as stale.
const STALE_FEED_SECS: i64 = 300;

#[derive(Parser)]
#[command(name = "transit_feed_decoder")]
#[command(about = "Flatten 511 SIRI feeds to CSV and validate GTFS-RT payloads", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Decode one saved feed file
    Decode {
        /// Saved JSON or protobuf feed
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Feed kind; detected from the file name when omitted
        #[arg(short, long)]
        kind: Option<FeedKind>,

        /// CSV file to write (defaults to the input path with a .csv extension)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Fail on the first malformed record instead of skipping it
        #[arg(long, default_value_t = false)]
        strict: bool,

        /// Gzip compress the CSV output
        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Check that a GTFS-RT payload is a well-formed FeedMessage
    Validate {
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Also log the summary as JSON
        #[arg(long, default_value_t = false)]
        json: bool,
    },
    /// Decode every recognised feed file in a directory
    Batch {
        /// Directory containing saved feeds
        #[arg(short = 'd', long, default_value = "sample")]
        input_dir: PathBuf,

        /// Directory to write CSV files to
        #[arg(short, long, default_value = "decoded")]
        output_dir: PathBuf,

        /// Maximum number of feeds decoded at once
        #[arg(short, long, default_value_t = 4)]
        concurrency: usize,

        #[arg(long, default_value_t = false)]
        strict: bool,

        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
    /// Flatten any JSON record list into dotted columns
    Flatten {
        #[arg(value_name = "FILE")]
        source: PathBuf,

        /// Dotted path to the record list,
        /// e.g. ServiceDelivery.StopMonitoringDelivery.MonitoredStopVisit
        #[arg(short, long)]
        records: String,

        #[arg(short, long)]
        output: Option<PathBuf>,

        #[arg(long, default_value_t = false)]
        gzip: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path = std::env::var("LOG_FILE_PATH")
        .unwrap_or_else(|_| "logs/transit_feed_decoder.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("transit_feed_decoder.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse()?));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse()?));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Decode {
            source,
            kind,
            output,
            strict,
            gzip,
        } => {
            let kind = match kind {
                Some(kind) => kind,
                None => FeedKind::from_path(&source).with_context(|| {
                    format!("cannot detect feed kind of {}, pass --kind", source.display())
                })?,
            };
            let output = output.unwrap_or_else(|| default_output(&source, gzip));
            decode_file(&source, kind, &output, strict, gzip)?;
        }
        Commands::Validate { source, json } => {
            let bytes = read_feed(&source)?;
            let summary = validate_feed(&bytes)?;
            log_summary(&summary);
            if json {
                print_json(&summary)?;
            }
        }
        Commands::Batch {
            input_dir,
            output_dir,
            concurrency,
            strict,
            gzip,
        } => {
            decode_directory(&input_dir, &output_dir, concurrency, strict, gzip).await?;
        }
        Commands::Flatten {
            source,
            records,
            output,
            gzip,
        } => {
            let bytes = read_feed(&source)?;
            let document = parse_document(&bytes)?;
            let decoded = normalize::decode_at(&document, &records)?;
            log_rejections(&decoded);

            let output = output.unwrap_or_else(|| default_output(&source, gzip));
            write_csv_file(&output, &decoded.batch, gzip)?;
            info!(
                rows = decoded.batch.len(),
                columns = decoded.batch.columns().len(),
                output = %output.display(),
                "Records flattened"
            );
        }
    }

    Ok(())
}

fn read_feed(source: &Path) -> Result<Vec<u8>> {
    std::fs::read(source).with_context(|| format!("failed to read {}", source.display()))
}

/// `sample/StopMonitoring.json` becomes `sample/StopMonitoring.csv`.
fn default_output(source: &Path, gzip: bool) -> PathBuf {
    source.with_extension(if gzip { "csv.gz" } else { "csv" })
}

/// Decodes or validates one saved feed. Row output is written to `output`;
/// GTFS-RT payloads produce no file.
#[tracing::instrument(skip_all, fields(source = %source.display(), kind = %kind))]
fn decode_file(
    source: &Path,
    kind: FeedKind,
    output: &Path,
    strict: bool,
    gzip: bool,
) -> Result<()> {
    let bytes = read_feed(source)?;
    debug!(bytes = bytes.len(), "Feed bytes read");

    match process_bytes(kind, &bytes)? {
        FeedOutcome::Rows(decoded) => {
            log_rejections(&decoded);
            let batch = if strict {
                decoded.into_strict()?
            } else {
                decoded.batch
            };
            write_csv_file(output, &batch, gzip)?;
            info!(rows = batch.len(), output = %output.display(), "Feed decoded");
        }
        FeedOutcome::Validated(summary) => log_summary(&summary),
    }

    Ok(())
}

fn log_rejections(decoded: &Decoded) {
    for record in &decoded.rejected {
        warn!(index = record.index, reason = %record.reason, "Malformed record");
    }
}

fn log_summary(summary: &FeedSummary) {
    let age_secs = summary.age_at(Utc::now()).map(|age| age.num_seconds());
    info!(
        version = %summary.gtfs_realtime_version,
        entities = summary.total_entities,
        trip_updates = summary.trip_updates,
        vehicles = summary.vehicles,
        alerts = summary.alerts,
        age_secs,
        "GTFS-RT feed is well-formed"
    );
    if age_secs.is_some_and(|age| age > STALE_FEED_SECS) {
        warn!(age_secs, "Feed header timestamp is stale");
    }
}

/// Decodes every saved feed in `input_dir` concurrently. Files whose name
/// maps to no decoder are skipped; a failed feed does not stop the others.
#[tracing::instrument(
    skip_all,
    fields(
        input_dir = %input_dir.display(),
        output_dir = %output_dir.display(),
        concurrency = concurrency
    )
)]
async fn decode_directory(
    input_dir: &Path,
    output_dir: &Path,
    concurrency: usize,
    strict: bool,
    gzip: bool,
) -> Result<()> {
    std::fs::create_dir_all(output_dir)
        .with_context(|| format!("failed to create {}", output_dir.display()))?;

    let semaphore = Arc::new(tokio::sync::Semaphore::new(concurrency.max(1)));
    let mut tasks = vec![];

    for entry in std::fs::read_dir(input_dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let Some(kind) = FeedKind::from_path(&path) else {
            debug!(path = %path.display(), "No decoder for file, skipping");
            continue;
        };

        let file_name = path.file_name().unwrap_or(OsStr::new("feed"));
        let output = default_output(&output_dir.join(file_name), gzip);
        let permit = semaphore.clone().acquire_owned().await?;
        let feed_span = tracing::info_span!("process_feed", feed = %path.display(), %kind);

        let task = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            let _enter = feed_span.enter();
            match decode_file(&path, kind, &output, strict, gzip) {
                Ok(()) => true,
                Err(e) => {
                    error!(error = %e, "Feed failed");
                    false
                }
            }
        });
        tasks.push(task);
    }

    let total = tasks.len();
    let mut failed = 0;
    for task in tasks {
        if !task.await? {
            failed += 1;
        }
    }

    info!(feeds = total, failed, "Finished processing all feeds");
    Ok(())
}
