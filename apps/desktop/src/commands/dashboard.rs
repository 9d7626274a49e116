//! # Dashboard Commands
//!
//! `dashboard:getStats`

use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Instant;
use tracing::debug;

use super::elapsed_ms;
use crate::error::ApiError;
use crate::state::AppState;
use jobcost_core::dates::{DateRange, DateRangePreset};
use jobcost_core::DashboardStats;

/// Explicit dates win over the preset; with neither, the current month.
#[derive(Debug, Clone, Copy, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StatsArgs {
    pub preset: Option<DateRangePreset>,
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

impl StatsArgs {
    pub fn range(&self, today: NaiveDate) -> DateRange {
        let base = self
            .preset
            .unwrap_or(DateRangePreset::ThisMonth)
            .resolve(today);
        DateRange::new(
            self.date_from.unwrap_or(base.from),
            self.date_to.unwrap_or(base.to),
        )
    }
}

pub async fn get_stats(
    state: &AppState,
    args: StatsArgs,
    today: NaiveDate,
) -> Result<DashboardStats, ApiError> {
    let start = Instant::now();
    let range = args.range(today);
    let stats = state.db.inner().dashboard().stats(range).await?;

    debug!(
        from = %range.from,
        to = %range.to,
        jobs = stats.job_count,
        elapsed_ms = elapsed_ms(start),
        "dashboard:getStats"
    );
    Ok(stats)
}
