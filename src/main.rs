use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use toci::config::Config;
use toci::oci::client::{format_oci_error, OciClient};
use toci::report::{self, ReportOptions};
use toci::resource::UsageRange;
use tracing::Level;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

/// Inventory, metrics and usage report for OCI
#[derive(Parser, Debug)]
#[command(name = "toci", version, about, long_about = None)]
struct Args {
    /// Settings file with OCI_CONFIG_* variables (default: ./.env)
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// OCI region to query, overriding the settings
    #[arg(short, long)]
    region: Option<String>,

    /// Send every API call to this base URL instead of the regional endpoints
    #[arg(long)]
    endpoint: Option<String>,

    /// First day of the billing period
    #[arg(long, default_value = "2024-05-01")]
    usage_start: NaiveDate,

    /// Day after the billing period
    #[arg(long, default_value = "2024-05-31")]
    usage_end: NaiveDate,

    /// Also list boot volumes per availability domain
    #[arg(long)]
    boot_volumes: bool,

    /// Log level for debugging
    #[arg(long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LogLevel {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    fn to_tracing_level(self) -> Option<Level> {
        match self {
            LogLevel::Off => None,
            LogLevel::Error => Some(Level::ERROR),
            LogLevel::Warn => Some(Level::WARN),
            LogLevel::Info => Some(Level::INFO),
            LogLevel::Debug => Some(Level::DEBUG),
            LogLevel::Trace => Some(Level::TRACE),
        }
    }
}

fn setup_logging(
    level: LogLevel,
    log_file: Option<&Path>,
) -> Result<Option<tracing_appender::non_blocking::WorkerGuard>> {
    let Some(tracing_level) = level.to_tracing_level() else {
        return Ok(None);
    };

    let (writer, guard) = match log_file {
        Some(path) => {
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
            }
            let file = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .with_context(|| format!("Failed to open log file {}", path.display()))?;
            tracing_appender::non_blocking(file)
        }
        None => tracing_appender::non_blocking(std::io::stderr()),
    };

    // RUST_LOG, when set, takes precedence over --log-level
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::from_level(tracing_level).into())
        .from_env_lossy();

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .init();

    tracing::info!("toci {} started with log level: {:?}", toci::VERSION, level);

    Ok(Some(guard))
}

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    let _log_guard = match setup_logging(args.log_level, args.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(err) => {
            eprintln!("Error: {err:#}");
            return ExitCode::FAILURE;
        }
    };

    match run(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::debug!("Fatal error: {err:?}");
            eprintln!("Error: {}: {}", err, format_oci_error(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: &Args) -> Result<()> {
    let mut config = Config::load(args.settings.as_deref()).context("Invalid configuration")?;
    if let Some(region) = &args.region {
        config.set_region(region).context("Invalid configuration")?;
    }
    let usage =
        UsageRange::new(args.usage_start, args.usage_end).context("Invalid billing period")?;

    tracing::info!("Using tenancy: {}, region: {}", config.tenancy_id, config.region);

    let mut client = OciClient::new(&config)?;
    if let Some(endpoint) = &args.endpoint {
        client = client.with_endpoint(endpoint)?;
    }

    let options = ReportOptions {
        usage,
        boot_volumes: args.boot_volumes,
    };

    let mut stdout = std::io::stdout();
    report::run(&client, &options, &mut stdout).await?;
    stdout.flush().context("Failed to write report")?;

    Ok(())
}
