//! # JobCost Pro Desktop Library
//!
//! Application host for JobCost Pro: configuration, request dispatch,
//! PDF reports and the stdin/stdout loop the UI talks to.
//!
//! ## Module Organization
//! ```text
//! jobcost_desktop_lib/
//! ├── lib.rs          ◄─── You are here (startup & host loop)
//! ├── dispatch.rs     ◄─── Invocation → Request → handler → Response
//! ├── state/
//! │   ├── mod.rs      ◄─── AppState
//! │   ├── db.rs       ◄─── Database state wrapper
//! │   └── config.rs   ◄─── Configuration state
//! ├── commands/       ◄─── One module per channel group
//! ├── reports/        ◄─── PDF layout and the four reports
//! └── error.rs        ◄─── API error type for every channel
//! ```
//!
//! ## Wire Protocol
//! ```text
//! stdin : {"id": 7, "channel": "jobs:get", "args": {"id": 12}}
//! stdout: {"id": 7, "ok": true, "data": {"job": {...}, "machineEntries": [...]}}
//! stdout: {"id": 8, "ok": false, "error": {"code": "NOT_FOUND", "message": "Job 99 not found"}}
//! stderr: logs
//! ```

pub mod commands;
pub mod dispatch;
pub mod error;
pub mod reports;
pub mod state;

use std::path::PathBuf;
use thiserror::Error;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use jobcost_db::{Database, DbConfig, DbError};
use state::{AppState, ConfigState, DbState};

/// Errors that stop the backend from starting or serving.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("could not determine the app data directory")]
    NoDataDir,

    #[error(transparent)]
    Database(#[from] DbError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not encode response: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Runs the backend until stdin closes.
///
/// ## Startup Sequence
/// ```text
/// ┌─────────────────────────────────────────────────────────────────────────┐
/// │                       Application Startup                               │
/// │                                                                         │
/// │  1. Initialize Logging ───────────────────────────────────────────────► │
/// │     • tracing-subscriber with env filter, written to stderr            │
/// │     • Default: info,jobcost=debug,sqlx=warn (override with RUST_LOG)    │
/// │                                                                         │
/// │  2. Load Configuration ───────────────────────────────────────────────► │
/// │     • JOBCOST_* environment variables over defaults                     │
/// │                                                                         │
/// │  3. Connect to Database ──────────────────────────────────────────────► │
/// │     • SQLite with WAL mode                                              │
/// │     • Run pending migrations                                            │
/// │     • Load demo data into a fresh database (JOBCOST_SEED_DEMO)          │
/// │                                                                         │
/// │  4. Serve ────────────────────────────────────────────────────────────► │
/// │     • One invocation per stdin line, one response per stdout line       │
/// └─────────────────────────────────────────────────────────────────────────┘
/// ```
pub fn run() -> Result<(), StartupError> {
    init_tracing();

    info!("Starting JobCost Pro backend");

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(async {
        let config = ConfigState::from_env();
        let db_path = get_database_path(&config)?;
        info!(?db_path, reports_dir = ?config.reports_dir, "Paths determined");

        let db = Database::new(DbConfig::new(db_path)).await?;
        info!("Database connected and migrations applied");

        if config.seed_demo {
            let today = chrono::Local::now().date_naive();
            if db.seed_if_empty(today).await? {
                info!("Demo data loaded");
            }
        }

        let state = AppState::new(DbState::new(db.clone()), config);
        let served = serve(&state).await;

        db.close().await;
        served
    })
}

/// Reads invocations from stdin until EOF, answering each on stdout.
///
/// Calls are handled one at a time, so responses come back in call order.
pub async fn serve(state: &AppState) -> Result<(), StartupError> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let mut stdout = tokio::io::stdout();

    while let Some(line) = lines.next_line().await? {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let response = dispatch::handle_line(state, line).await;
        let mut encoded = serde_json::to_vec(&response)?;
        encoded.push(b'\n');
        stdout.write_all(&encoded).await?;
        stdout.flush().await?;
    }

    info!("stdin closed, shutting down");
    Ok(())
}

/// Initializes the tracing subscriber for structured logging.
///
/// ## Log Levels
/// - `RUST_LOG=debug` - Show debug messages
/// - `RUST_LOG=jobcost=trace` - Show trace for jobcost crates only
/// - Default: info, debug for jobcost crates
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,jobcost=debug,sqlx=warn"));

    let installed = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    if installed.is_err() {
        warn!("tracing subscriber already installed");
    }
}

/// Determines the database file path based on the platform.
///
/// ## Platform-Specific Paths
/// - **macOS**: `~/Library/Application Support/com.jobcostpro.JobCost-Pro/jobcostpro.db`
/// - **Windows**: `%APPDATA%\jobcostpro\JobCost Pro\data\jobcostpro.db`
/// - **Linux**: `~/.local/share/jobcostpro/jobcostpro.db`
///
/// ## Development Override
/// Set `JOBCOST_DB_PATH` to use a custom path.
fn get_database_path(config: &ConfigState) -> Result<PathBuf, StartupError> {
    if let Some(path) = &config.db_path {
        return Ok(path.clone());
    }

    let proj_dirs = state::project_dirs().ok_or(StartupError::NoDataDir)?;
    let data_dir = proj_dirs.data_dir();

    // Create directory if it doesn't exist
    std::fs::create_dir_all(data_dir)?;

    Ok(data_dir.join("jobcostpro.db"))
}
