//! # Customer Commands
//!
//! `customers:list|get|create|update|delete`

use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;
use jobcost_core::{Customer, CustomerInput};

/// All customers, ordered by name.
pub async fn list(state: &AppState) -> Result<Vec<Customer>, ApiError> {
    let customers = state.db.inner().customers().list().await?;
    debug!(count = customers.len(), "customers:list");
    Ok(customers)
}

pub async fn get(state: &AppState, id: i64) -> Result<Customer, ApiError> {
    Ok(state.db.inner().customers().get(id).await?)
}

pub async fn create(state: &AppState, input: &CustomerInput) -> Result<Customer, ApiError> {
    let customer = state.db.inner().customers().create(input).await?;
    info!(id = customer.id, name = %customer.name, "Customer created");
    Ok(customer)
}

pub async fn update(state: &AppState, id: i64, input: &CustomerInput) -> Result<Customer, ApiError> {
    Ok(state.db.inner().customers().update(id, input).await?)
}

/// Deletes a customer. Refused by the database while jobs reference it.
pub async fn delete(state: &AppState, id: i64) -> Result<(), ApiError> {
    state.db.inner().customers().delete(id).await?;
    info!(id, "Customer deleted");
    Ok(())
}
