//! # State Module
//!
//! Application state shared by every channel handler.
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    State Architecture                                   │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                      AppState (dispatcher)                      │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                              │                                          │
//! │                   ┌──────────┴──────────┐                               │
//! │                   ▼                     ▼                               │
//! │           ┌──────────────┐      ┌──────────────────┐                    │
//! │           │   DbState    │      │   ConfigState    │                    │
//! │           │              │      │                  │                    │
//! │           │  Database    │      │  business_name   │                    │
//! │           │  (SQLite     │      │  currency_symbol │                    │
//! │           │   pool)      │      │  reports_dir     │                    │
//! │           └──────────────┘      └──────────────────┘                    │
//! │                                                                         │
//! │  THREAD SAFETY:                                                        │
//! │  • DbState: Database has internal connection pool (thread-safe)        │
//! │  • ConfigState: Read-only after initialization                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

mod config;
mod db;

pub use config::ConfigState;
pub(crate) use config::project_dirs;
pub use db::DbState;

/// Everything a channel handler can reach.
#[derive(Debug, Clone)]
pub struct AppState {
    pub db: DbState,
    pub config: ConfigState,
}

impl AppState {
    pub fn new(db: DbState, config: ConfigState) -> Self {
        AppState { db, config }
    }
}
