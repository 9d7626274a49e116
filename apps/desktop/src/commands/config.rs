//! # Config Commands
//!
//! `config:get`

use tracing::debug;

use crate::state::{AppState, ConfigState};

/// The current application configuration.
///
/// ## When Used
/// - App startup (business name in the title bar)
/// - Currency formatting in the UI
/// - Showing where reports are saved
pub fn get(state: &AppState) -> ConfigState {
    debug!("config:get");
    state.config.clone()
}
