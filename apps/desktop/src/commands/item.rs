//! # Item Commands
//!
//! `items:list|get|create|update|delete|byCategory`

use tracing::{debug, info};

use crate::error::ApiError;
use crate::state::AppState;
use jobcost_core::{Item, ItemInput};

pub async fn list(state: &AppState) -> Result<Vec<Item>, ApiError> {
    Ok(state.db.inner().items().list().await?)
}

pub async fn get(state: &AppState, id: i64) -> Result<Item, ApiError> {
    Ok(state.db.inner().items().get(id).await?)
}

/// Items of one category, for the job form's item picker.
pub async fn by_category(state: &AppState, category_id: i64) -> Result<Vec<Item>, ApiError> {
    let items = state.db.inner().items().list_by_category(category_id).await?;
    debug!(category_id, count = items.len(), "items:byCategory");
    Ok(items)
}

pub async fn create(state: &AppState, input: &ItemInput) -> Result<Item, ApiError> {
    let item = state.db.inner().items().create(input).await?;
    info!(id = item.id, name = %item.name, category = %item.category_name, "Item created");
    Ok(item)
}

pub async fn update(state: &AppState, id: i64, input: &ItemInput) -> Result<Item, ApiError> {
    Ok(state.db.inner().items().update(id, input).await?)
}

pub async fn delete(state: &AppState, id: i64) -> Result<(), ApiError> {
    state.db.inner().items().delete(id).await?;
    info!(id, "Item deleted");
    Ok(())
}
