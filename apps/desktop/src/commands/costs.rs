//! # Cost Commands
//!
//! `costs:calculate` runs the pure calculator for the job form's live
//! totals. The same function prices the job again when it is saved, so
//! the preview and the stored figures agree.

use serde::Deserialize;

use jobcost_core::costing::{calculate as calculate_costs, CostBreakdown, CostInput, MachineCostInput};
use jobcost_core::{MachineEntryInput, Money, Percentage};

use crate::error::ApiError;

/// The form fields that feed the calculator. Missing values count as zero.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CalculateArgs {
    pub quantity: i64,
    pub rate_paise: i64,
    pub waste_percentage_bps: u32,
    pub cooly_paise: i64,
    pub machine_entries: Vec<MachineEntryInput>,
}

/// Fails with a validation error when a figure is too large to price.
pub fn calculate(args: &CalculateArgs) -> Result<CostBreakdown, ApiError> {
    let breakdown = calculate_costs(&CostInput {
        quantity: args.quantity,
        rate: Money::from_paise(args.rate_paise),
        waste_percentage: Percentage::from_bps(args.waste_percentage_bps),
        cooly: Money::from_paise(args.cooly_paise),
        machines: args.machine_entries.iter().map(MachineCostInput::from).collect(),
    })?;
    Ok(breakdown)
}
