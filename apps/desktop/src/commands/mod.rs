//! # Channel Handlers
//!
//! One module per entity. Each handler takes the shared [`AppState`] plus
//! its decoded arguments and returns `Result<T, ApiError>`.
//!
//! ## Organization
//! ```text
//! commands/
//! ├── mod.rs            ◄─── You are here (shared argument shapes)
//! ├── customer.rs       ◄─── customers:*
//! ├── category.rs       ◄─── categories:*
//! ├── item.rs           ◄─── items:*
//! ├── machine.rs        ◄─── machines:*
//! ├── employee.rs       ◄─── employees:*
//! ├── job.rs            ◄─── jobs:*
//! ├── machine_entry.rs  ◄─── jobMachineEntries:*
//! ├── dashboard.rs      ◄─── dashboard:getStats
//! ├── report.rs         ◄─── reports:generatePdf
//! ├── costs.rs          ◄─── costs:calculate
//! ├── dates.rs          ◄─── dates:resolveRange
//! └── config.rs         ◄─── config:get
//! ```
//!
//! ## How a Call Flows
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  UI                                                                     │
//! │  invoke('items:update', { id: 3, input: { name, categoryId, size } })   │
//! │         │                                                               │
//! │         │ (one JSON line on stdin)                                      │
//! │         ▼                                                               │
//! │  dispatch::Request::ItemsUpdate(UpdateArgs<ItemInput>)                  │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  commands::item::update(&state, 3, &input)                              │
//! │      -> Result<Item, ApiError>                                          │
//! │         │                                                               │
//! │         │ (one JSON line on stdout)                                     │
//! │         ▼                                                               │
//! │  { "id": ..., "ok": true, "data": { "id": 3, ... } }                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::Deserialize;

pub mod category;
pub mod config;
pub mod costs;
pub mod customer;
pub mod dashboard;
pub mod dates;
pub mod employee;
pub mod item;
pub mod job;
pub mod machine;
pub mod machine_entry;
pub mod report;

/// `{ "id": 7 }`
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct IdArgs {
    pub id: i64,
}

/// `{ "id": 7, "input": { ... } }`
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateArgs<T> {
    pub id: i64,
    pub input: T,
}

/// An optional inclusive period.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PeriodArgs {
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

/// Elapsed milliseconds since `start`, for log fields.
pub(crate) fn elapsed_ms(start: std::time::Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::state::{AppState, ConfigState, DbState};
    use jobcost_db::{Database, DbConfig};

    /// App state over an empty in-memory database.
    pub async fn state() -> AppState {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        AppState::new(DbState::new(db), ConfigState::default())
    }
}
