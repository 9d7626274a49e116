//! # jobcost-core: Pure Business Logic for JobCost Pro
//!
//! This crate is the **heart** of JobCost Pro. It contains the costing rules,
//! job numbering and report arithmetic as pure functions with zero I/O.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                       JobCost Pro Architecture                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (forms, lists)                      │   │
//! │  │    Masters ──► Job Entry ──► Reports ──► Dashboard              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ JSON requests                          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    Request handlers (desktop)                   │   │
//! │  │    jobs:create, jobs:getByCustomerItem, reports:generatePdf     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              ★ jobcost-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │  costing  │  │ validation│  │   │
//! │  │   │    Job    │  │   Money   │  │ calculate │  │   rules   │  │   │
//! │  │   │  Machine  │  │ Percentage│  │ Breakdown │  │  checks   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  fields   │  │job_number │  │   dates   │  │  report   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO CLOCK • PURE FUNCTIONS             │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                   jobcost-db (Database Layer)                   │   │
//! │  │              SQLite queries, migrations, repositories           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Customer, Item, Job, MachineEntry, ...)
//! - [`money`] - Money in paise and percentages in basis points
//! - [`costing`] - The job cost calculator
//! - [`job_number`] - `JOB-YYYYMMDD-NNN` formatting and parsing
//! - [`fields`] - Machine type custom field schemas
//! - [`validation`] - Form validation
//! - [`dates`] - Quick-pick date ranges
//! - [`report`] - Report totals and breakdowns
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use jobcost_core::costing::{calculate, CostInput};
//! use jobcost_core::money::{Money, Percentage};
//!
//! let breakdown = calculate(&CostInput {
//!     quantity: 3000,
//!     rate: Money::from_paise(115),               // ₹1.15
//!     waste_percentage: Percentage::from_bps(200), // 2%
//!     cooly: Money::from_paise(80_000),            // ₹800
//!     machines: Vec::new(),
//! })
//! .unwrap();
//!
//! assert_eq!(breakdown.amount_paise, 345_000);
//! assert_eq!(breakdown.waste_amount_paise, 6_900);
//! assert_eq!(breakdown.grand_total_paise, 345_000 + 80_000 + 6_900);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod costing;
pub mod dates;
pub mod error;
pub mod fields;
pub mod job_number;
pub mod money;
pub mod report;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================
// These allow users to do `use jobcost_core::Money` instead of
// `use jobcost_core::money::Money`

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::{Money, Percentage};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum length of names (customers, items, machines, employees).
pub const MAX_NAME_LEN: usize = 200;

/// Maximum length of a phone number.
pub const MAX_PHONE_LEN: usize = 20;

/// Maximum length of job notes and addresses.
pub const MAX_NOTES_LEN: usize = 2000;

/// Maximum length of a job list search query.
pub const MAX_SEARCH_LEN: usize = 100;

/// Largest grand total a single job may carry (₹1,00,00,00,00,000).
///
/// Keeps report and dashboard sums over stored jobs well inside `i64`.
pub const MAX_JOB_TOTAL_PAISE: i64 = 10_000_000_000_000;

/// Number of jobs shown in the dashboard's recent list.
pub const RECENT_JOBS_LIMIT: u32 = 10;
