//! # Database State
//!
//! Wraps the `Database` connection for use in channel handlers.
//!
//! ## Thread Safety
//! The `Database` struct from `jobcost-db` contains a `SqlitePool` which
//! is inherently thread-safe. Cloning shares the same pool.
//!
//! ## Usage in Handlers
//! ```rust,ignore
//! pub async fn list(state: &AppState) -> Result<Vec<Customer>, ApiError> {
//!     Ok(state.db.inner().customers().list().await?)
//! }
//! ```

use jobcost_db::Database;

/// Wrapper around `Database` for handler state.
#[derive(Debug, Clone)]
pub struct DbState {
    db: Database,
}

impl DbState {
    /// Creates a new DbState wrapping the database connection.
    pub fn new(db: Database) -> Self {
        DbState { db }
    }

    /// Returns a reference to the inner Database.
    pub fn inner(&self) -> &Database {
        &self.db
    }
}
