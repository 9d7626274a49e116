//! # Date Commands
//!
//! `dates:resolveRange` turns a quick-pick preset into concrete dates.

use chrono::NaiveDate;
use serde::Deserialize;

use jobcost_core::dates::{DateRange, DateRangePreset};

#[derive(Debug, Clone, Copy, Deserialize)]
pub struct ResolveRangeArgs {
    pub preset: DateRangePreset,
}

pub fn resolve_range(args: ResolveRangeArgs, today: NaiveDate) -> DateRange {
    args.preset.resolve(today)
}
