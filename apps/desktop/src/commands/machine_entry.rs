//! # Machine Entry Commands
//!
//! `jobMachineEntries:listByJob|create|delete`
//!
//! Single-entry edits from the job detail view. Each one recomputes the
//! parent job's totals before returning.

use serde::Deserialize;
use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use jobcost_core::{MachineEntryInput, MachineEntryView};

/// `{ "jobId": 4, "entry": { machineTypeId, customData, costPaise, ... } }`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateEntryArgs {
    pub job_id: i64,
    pub entry: MachineEntryInput,
}

pub async fn list_by_job(state: &AppState, job_id: i64) -> Result<Vec<MachineEntryView>, ApiError> {
    Ok(state.db.inner().machine_entries().list_by_job(job_id).await?)
}

pub async fn create(state: &AppState, args: &CreateEntryArgs) -> Result<MachineEntryView, ApiError> {
    let entry = state
        .db
        .inner()
        .machine_entries()
        .create(args.job_id, &args.entry)
        .await?;
    info!(
        id = entry.entry.id,
        job_id = args.job_id,
        machine = %entry.machine_type_name,
        "Machine entry added"
    );
    Ok(entry)
}

pub async fn delete(state: &AppState, id: i64) -> Result<(), ApiError> {
    state.db.inner().machine_entries().delete(id).await?;
    info!(id, "Machine entry deleted");
    Ok(())
}
