//! # Machine Type Commands
//!
//! `machines:list|get|getSchema|create|update|delete|fieldSummary`
//!
//! A machine type's schema drives the dynamic fields of its entry cards:
//! ```text
//! machines:getSchema(1)
//!   → [{ name: "rollNo", label: "Roll No.", type: "text", required: true }, ...]
//! ```

use std::time::Instant;
use tracing::{debug, info};

use super::{elapsed_ms, PeriodArgs};
use crate::error::ApiError;
use crate::state::AppState;
use jobcost_core::fields::FieldDescriptor;
use jobcost_core::report::{numeric_field_summary, FieldSummary};
use jobcost_core::{MachineEntry, MachineType, MachineTypeInput};

pub async fn list(state: &AppState) -> Result<Vec<MachineType>, ApiError> {
    Ok(state.db.inner().machine_types().list().await?)
}

pub async fn get(state: &AppState, id: i64) -> Result<MachineType, ApiError> {
    Ok(state.db.inner().machine_types().get(id).await?)
}

pub async fn get_schema(state: &AppState, id: i64) -> Result<Vec<FieldDescriptor>, ApiError> {
    Ok(state.db.inner().machine_types().get_schema(id).await?)
}

pub async fn create(state: &AppState, input: &MachineTypeInput) -> Result<MachineType, ApiError> {
    let machine = state.db.inner().machine_types().create(input).await?;
    info!(
        id = machine.id,
        name = %machine.name,
        fields = input.custom_fields.len(),
        "Machine type created"
    );
    Ok(machine)
}

pub async fn update(
    state: &AppState,
    id: i64,
    input: &MachineTypeInput,
) -> Result<MachineType, ApiError> {
    Ok(state.db.inner().machine_types().update(id, input).await?)
}

pub async fn delete(state: &AppState, id: i64) -> Result<(), ApiError> {
    state.db.inner().machine_types().delete(id).await?;
    info!(id, "Machine type deleted");
    Ok(())
}

/// Totals and averages of the numeric custom fields recorded on a machine,
/// for the machine detail view.
pub async fn field_summary(
    state: &AppState,
    id: i64,
    period: PeriodArgs,
) -> Result<Vec<FieldSummary>, ApiError> {
    let start = Instant::now();
    let db = state.db.inner();

    let schema = db.machine_types().get_schema(id).await?;
    let usages = db.jobs().by_machine(id, period.date_from, period.date_to).await?;
    let entries: Vec<MachineEntry> = usages.into_iter().map(|u| u.entry.entry).collect();
    let summary = numeric_field_summary(&schema, &entries);

    debug!(
        id,
        entries = entries.len(),
        elapsed_ms = elapsed_ms(start),
        "machines:fieldSummary"
    );
    Ok(summary)
}
