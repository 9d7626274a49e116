//! # Job Commands
//!
//! `jobs:list|get|create|update|delete|getByCustomerItem|getForReport|getByCustomer|getByEmployee|getByMachine`
//!
//! ## Save Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Job form "Save"                                                        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  jobs:create { job, machineEntries }                                    │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate job + every entry against its machine's schema               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN                                                                  │
//! │    next JOB-YYYYMMDD-NNN for the job date                              │
//! │    INSERT job (totals from the calculator)                             │
//! │    INSERT entries                                                       │
//! │  COMMIT  (number taken by a concurrent writer → retry)                 │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  JobDetail { job, machineEntries }                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Instant;
use tracing::{debug, info};

use super::{elapsed_ms, PeriodArgs};
use crate::error::ApiError;
use crate::state::AppState;
use jobcost_core::{
    AutoFill, JobDetail, JobFilter, JobInput, JobView, MachineEntryInput, MachineUsage,
};

/// `{ "job": { ... }, "machineEntries": [ ... ] }`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateJobArgs {
    pub job: JobInput,
    #[serde(default)]
    pub machine_entries: Vec<MachineEntryInput>,
}

/// `machineEntries` absent keeps the stored entries; present replaces them.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateJobArgs {
    pub id: i64,
    pub job: JobInput,
    #[serde(default)]
    pub machine_entries: Option<Vec<MachineEntryInput>>,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerItemArgs {
    pub customer_id: i64,
    pub item_id: i64,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportQueryArgs {
    pub date_from: NaiveDate,
    pub date_to: NaiveDate,
    #[serde(default)]
    pub customer_id: Option<i64>,
}

/// Owner id plus an optional period. `id` is the customer, employee or
/// machine type depending on the channel.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerArgs {
    pub id: i64,
    #[serde(flatten)]
    pub period: PeriodArgs,
}

/// Filtered job list, newest first.
pub async fn list(state: &AppState, filter: &JobFilter) -> Result<Vec<JobView>, ApiError> {
    let start = Instant::now();
    let jobs = state.db.inner().jobs().list(filter).await?;

    debug!(
        count = jobs.len(),
        search = ?filter.search,
        status = ?filter.status,
        elapsed_ms = elapsed_ms(start),
        "jobs:list"
    );
    Ok(jobs)
}

/// A job with its machine entries.
pub async fn get(state: &AppState, id: i64) -> Result<JobDetail, ApiError> {
    Ok(state.db.inner().jobs().get_detail(id).await?)
}

pub async fn create(state: &AppState, args: &CreateJobArgs) -> Result<JobDetail, ApiError> {
    let start = Instant::now();
    let detail = state
        .db
        .inner()
        .jobs()
        .create(&args.job, &args.machine_entries)
        .await?;

    let job = &detail.job.job;
    info!(
        id = job.id,
        job_number = %job.job_number,
        entries = detail.machine_entries.len(),
        total = %state.config.format_currency(job.total_amount_paise),
        elapsed_ms = elapsed_ms(start),
        "Job created"
    );
    Ok(detail)
}

pub async fn update(state: &AppState, args: &UpdateJobArgs) -> Result<JobDetail, ApiError> {
    let detail = state
        .db
        .inner()
        .jobs()
        .update(args.id, &args.job, args.machine_entries.as_deref())
        .await?;

    info!(
        id = args.id,
        job_number = %detail.job.job.job_number,
        replaced_entries = args.machine_entries.is_some(),
        "Job updated"
    );
    Ok(detail)
}

/// Deletes a job and its machine entries.
pub async fn delete(state: &AppState, id: i64) -> Result<(), ApiError> {
    state.db.inner().jobs().delete(id).await?;
    info!(id, "Job deleted");
    Ok(())
}

/// Values of the latest job for this customer and item, or `None`.
pub async fn get_by_customer_item(
    state: &AppState,
    args: CustomerItemArgs,
) -> Result<Option<AutoFill>, ApiError> {
    let fill = state
        .db
        .inner()
        .jobs()
        .auto_fill(args.customer_id, args.item_id)
        .await?;

    debug!(
        customer_id = args.customer_id,
        item_id = args.item_id,
        source = ?fill.as_ref().map(|f| f.source_job_number.as_str()),
        "jobs:getByCustomerItem"
    );
    Ok(fill)
}

/// Jobs in a period with their entries, oldest first.
pub async fn get_for_report(
    state: &AppState,
    args: ReportQueryArgs,
) -> Result<Vec<JobDetail>, ApiError> {
    if args.date_from > args.date_to {
        return Err(ApiError::validation(format!(
            "Invalid period: {} is after {}",
            args.date_from, args.date_to
        )));
    }

    Ok(state
        .db
        .inner()
        .jobs()
        .details_for_report(args.date_from, args.date_to, args.customer_id)
        .await?)
}

pub async fn get_by_customer(state: &AppState, args: OwnerArgs) -> Result<Vec<JobView>, ApiError> {
    Ok(state
        .db
        .inner()
        .jobs()
        .by_customer(args.id, args.period.date_from, args.period.date_to)
        .await?)
}

pub async fn get_by_employee(state: &AppState, args: OwnerArgs) -> Result<Vec<JobView>, ApiError> {
    Ok(state
        .db
        .inner()
        .jobs()
        .by_employee(args.id, args.period.date_from, args.period.date_to)
        .await?)
}

pub async fn get_by_machine(
    state: &AppState,
    args: OwnerArgs,
) -> Result<Vec<MachineUsage>, ApiError> {
    Ok(state
        .db
        .inner()
        .jobs()
        .by_machine(args.id, args.period.date_from, args.period.date_to)
        .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support;
    use crate::error::ErrorCode;
    use jobcost_core::MAX_SEARCH_LEN;

    #[tokio::test]
    async fn test_list_rejects_overlong_search() {
        let state = test_support::state().await;

        let ok = list(
            &state,
            &JobFilter {
                search: Some("  JOB-2025  ".to_string()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert!(ok.is_empty());

        let err = list(
            &state,
            &JobFilter {
                search: Some("a".repeat(MAX_SEARCH_LEN + 1)),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert_eq!(err.code, ErrorCode::ValidationError);
        assert_eq!(err.message, "Search must be at most 100 characters");
    }
}
