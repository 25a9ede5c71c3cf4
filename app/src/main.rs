use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

use browseql_adapters::sqlite::{SqliteGateway, SqliteOpenError};
use browseql_core::config::{BrowserConfig, ConfigError};
use clap::Parser;
use thiserror::Error;
use tokio::runtime::{Builder, Handle};

mod logging;

use logging::LoggingError;

/// Browse the tables of a SQLite database and run ad-hoc queries.
#[derive(Parser, Debug)]
#[command(name = "browseql", version, about)]
struct Args {
    /// Path to the database file
    database: PathBuf,

    /// Configuration file path
    #[arg(long, value_name = "FILE", env = "BROWSEQL_CONFIG")]
    config: Option<PathBuf>,

    /// Write logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,

    /// Maximum rows fetched when opening a table
    #[arg(long, value_name = "N")]
    row_limit: Option<usize>,
}

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Logging(#[from] LoggingError),
    #[error("failed to connect to database: {0}")]
    Database(#[from] SqliteOpenError),
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] std::io::Error),
    #[error("program error: {0}")]
    Tui(#[from] browseql_tui::TuiError),
}

fn load_config(args: &Args) -> Result<BrowserConfig, ConfigError> {
    let mut config = match &args.config {
        Some(path) => BrowserConfig::load_from_path(path)?,
        None => BrowserConfig::load_default()?,
    };

    if let Some(row_limit) = args.row_limit {
        config.row_limit = row_limit;
    }
    if let Some(log_file) = &args.log_file {
        config.log.file = Some(log_file.clone());
    }
    config.validate()?;
    Ok(config)
}

fn run_app(
    args: &Args,
    run_tui: impl FnOnce(
        Handle,
        Arc<SqliteGateway>,
        &BrowserConfig,
        &str,
    ) -> Result<(), browseql_tui::TuiError>,
) -> Result<(), AppError> {
    let config = load_config(args)?;
    logging::init_logging(&config.log)?;

    let gateway = Arc::new(SqliteGateway::open(&args.database)?);
    let runtime = Builder::new_multi_thread()
        .thread_name("browseql-load")
        .enable_all()
        .build()
        .map_err(AppError::Runtime)?;

    let label = args
        .database
        .file_name()
        .map_or_else(
            || args.database.display().to_string(),
            |name| name.to_string_lossy().into_owned(),
        );
    tracing::info!(
        database = %args.database.display(),
        row_limit = config.row_limit,
        "starting session"
    );

    run_tui(runtime.handle().clone(), gateway, &config, &label)?;
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run_app(&args, browseql_tui::run) {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!(%error, "startup failed");
            eprintln!("Error: {error}");
            ExitCode::FAILURE
        }
    }
}
