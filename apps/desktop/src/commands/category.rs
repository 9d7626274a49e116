//! # Category Commands
//!
//! `categories:list|create|update|delete`

use tracing::info;

use crate::error::ApiError;
use crate::state::AppState;
use jobcost_core::{CategoryInput, ItemCategory};

pub async fn list(state: &AppState) -> Result<Vec<ItemCategory>, ApiError> {
    Ok(state.db.inner().categories().list().await?)
}

pub async fn create(state: &AppState, input: &CategoryInput) -> Result<ItemCategory, ApiError> {
    let category = state.db.inner().categories().create(input).await?;
    info!(id = category.id, name = %category.name, "Category created");
    Ok(category)
}

pub async fn update(
    state: &AppState,
    id: i64,
    input: &CategoryInput,
) -> Result<ItemCategory, ApiError> {
    Ok(state.db.inner().categories().update(id, input).await?)
}

/// Deletes an empty category.
///
/// ## Returns
/// * `Err(BUSINESS_LOGIC)` - Items still belong to the category; nothing is deleted
pub async fn delete(state: &AppState, id: i64) -> Result<(), ApiError> {
    state.db.inner().categories().delete(id).await?;
    info!(id, "Category deleted");
    Ok(())
}
