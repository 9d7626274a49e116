//! # jobcost-db: Database Layer for JobCost Pro
//!
//! SQLite storage for customers, items, machines, employees and jobs, with
//! sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        JobCost Data Flow                                │
//! │                                                                         │
//! │  Desktop request (jobs:create)                                         │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     jobcost-db (THIS CRATE)                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────┐    ┌──────────────┐  │   │
//! │  │   │   Database    │    │  Repositories │    │  Migrations  │  │   │
//! │  │   │   (pool.rs)   │    │   (job.rs)    │    │  (embedded)  │  │   │
//! │  │   │               │    │               │    │              │  │   │
//! │  │   │ SqlitePool    │    │ JobRepo       │    │ 001_initial  │  │   │
//! │  │   │ Connection    │◄───│ MachineRepos  │    │ _schema.sql  │  │   │
//! │  │   │ Management    │    │ CustomerRepo  │    │              │  │   │
//! │  │   └───────────────┘    └───────────────┘    └──────────────┘  │   │
//! │  │                                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     SQLite Database                             │   │
//! │  │   <data dir>/jobcost.db                                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - Connection pool creation and configuration
//! - [`migrations`] - Embedded database migrations
//! - [`error`] - Database error types
//! - [`repository`] - One repository per table group
//! - [`seed`] - First-run demo data
//!
//! ## Usage
//!
//! ```rust,ignore
//! use jobcost_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("path/to/jobcost.db")).await?;
//! db.seed_if_empty(chrono::Local::now().date_naive()).await?;
//!
//! let detail = db.jobs().create(&input, &entries).await?;
//! println!("{}", detail.job.job.job_number);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;
pub mod seed;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

// Repository re-exports for convenience
pub use repository::category::CategoryRepository;
pub use repository::customer::CustomerRepository;
pub use repository::dashboard::DashboardRepository;
pub use repository::employee::EmployeeRepository;
pub use repository::item::ItemRepository;
pub use repository::job::JobRepository;
pub use repository::machine::{MachineEntryRepository, MachineTypeRepository};
pub use repository::meta::MetaRepository;
