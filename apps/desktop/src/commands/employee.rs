//! # Employee Commands
//!
//! `employees:list|get|create|update|delete`

use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use jobcost_core::{Employee, EmployeeInput};

pub async fn list(state: &AppState) -> Result<Vec<Employee>, ApiError> {
    Ok(state.db.inner().employees().list().await?)
}

pub async fn get(state: &AppState, id: i64) -> Result<Employee, ApiError> {
    Ok(state.db.inner().employees().get(id).await?)
}

pub async fn create(state: &AppState, input: &EmployeeInput) -> Result<Employee, ApiError> {
    let employee = state.db.inner().employees().create(input).await?;
    info!(id = employee.id, name = %employee.name, "Employee created");
    Ok(employee)
}

pub async fn update(state: &AppState, id: i64, input: &EmployeeInput) -> Result<Employee, ApiError> {
    Ok(state.db.inner().employees().update(id, input).await?)
}

/// Jobs keep their history; they lose the employee link.
pub async fn delete(state: &AppState, id: i64) -> Result<(), ApiError> {
    state.db.inner().employees().delete(id).await?;
    info!(id, "Employee deleted");
    Ok(())
}
