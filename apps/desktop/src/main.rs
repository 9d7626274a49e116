//! # JobCost Pro Desktop Backend Entry Point
//!
//! ## Process Layout
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        JobCost Pro Desktop                              │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                      UI process                                  │  │
//! │  │  • Job form           • Dashboard                                │  │
//! │  │  • Master data        • Report screen                            │  │
//! │  └──────────────────────────────┬───────────────────────────────────┘  │
//! │                 one JSON line per call (stdin/stdout)                   │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    Rust Backend (this crate)                     │  │
//! │  │  main.rs ────► exit code                                         │  │
//! │  │  lib.rs ─────► logging, database, state, host loop               │  │
//! │  │  dispatch ───► "customers:list", "jobs:create", ...              │  │
//! │  │  reports/ ───► PDF files                                         │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! │                                 │                                       │
//! │                                 ▼                                       │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │  jobcostpro.db (SQLite, WAL mode)                                │  │
//! │  └──────────────────────────────────────────────────────────────────┘  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::process::ExitCode;

fn main() -> ExitCode {
    // The actual setup is in lib.rs for better testability
    match jobcost_desktop_lib::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("jobcost-desktop: {err}");
            ExitCode::FAILURE
        }
    }
}
