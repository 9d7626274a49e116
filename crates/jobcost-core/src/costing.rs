//! # Job Cost Calculator
//!
//! One pure function turns form inputs into every derived money field of a
//! job. The job form calls it for live totals and the job repository calls
//! it again before every write, so stored totals never drift from inputs.
//!
//! ## Formula
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  amount        = quantity × rate                                        │
//! │  waste_amount  = amount × waste%                (half-up to the paisa)  │
//! │                                                                         │
//! │  per machine line:                                                      │
//! │    line_waste  = entered waste amount, or cost × line waste%            │
//! │  machine_cost  = Σ line cost                                            │
//! │  machine_waste = Σ line_waste                                           │
//! │                                                                         │
//! │  grand_total   = amount + cooly + waste_amount                          │
//! │                         + machine_cost + machine_waste                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every step is checked. A figure that overflows, or a grand total above
//! [`MAX_JOB_TOTAL_PAISE`], fails with [`CoreError::AmountTooLarge`] instead
//! of wrapping.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::{Money, Percentage};
use crate::types::{JobInput, MachineEntryInput};
use crate::MAX_JOB_TOTAL_PAISE;

/// Cost inputs for one machine line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MachineCostInput {
    pub cost: Money,
    pub waste_percentage: Percentage,
    /// Directly entered waste; wins over the percentage when present.
    pub waste_amount: Option<Money>,
}

impl MachineCostInput {
    /// Waste for this line.
    pub fn resolved_waste(&self) -> Money {
        self.waste_amount
            .unwrap_or_else(|| self.waste_percentage.of(self.cost))
    }

    fn checked_waste(&self) -> Option<Money> {
        match self.waste_amount {
            Some(amount) => Some(amount),
            None => self.waste_percentage.checked_of(self.cost),
        }
    }
}

impl From<&MachineEntryInput> for MachineCostInput {
    fn from(entry: &MachineEntryInput) -> Self {
        MachineCostInput {
            cost: Money::from_paise(entry.cost_paise),
            waste_percentage: Percentage::from_bps(entry.waste_percentage_bps),
            waste_amount: entry.waste_amount_paise.map(Money::from_paise),
        }
    }
}

/// Everything the calculator needs.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CostInput {
    pub quantity: i64,
    pub rate: Money,
    pub waste_percentage: Percentage,
    pub cooly: Money,
    pub machines: Vec<MachineCostInput>,
}

impl CostInput {
    /// Builds calculator input from a job form and its machine entries.
    pub fn for_job(job: &JobInput, entries: &[MachineEntryInput]) -> Self {
        CostInput {
            quantity: job.quantity,
            rate: Money::from_paise(job.rate_paise),
            waste_percentage: Percentage::from_bps(job.waste_percentage_bps),
            cooly: Money::from_paise(job.cooly_paise),
            machines: entries.iter().map(MachineCostInput::from).collect(),
        }
    }
}

/// Derived figures for one machine line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MachineCostLine {
    pub cost_paise: i64,
    pub waste_amount_paise: i64,
}

/// Every derived money field of a job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CostBreakdown {
    pub amount_paise: i64,
    pub waste_amount_paise: i64,
    pub cooly_paise: i64,
    pub machines: Vec<MachineCostLine>,
    pub machine_cost_paise: i64,
    pub machine_waste_paise: i64,
    pub grand_total_paise: i64,
}

impl CostBreakdown {
    pub fn amount(&self) -> Money {
        Money::from_paise(self.amount_paise)
    }

    pub fn waste_amount(&self) -> Money {
        Money::from_paise(self.waste_amount_paise)
    }

    pub fn grand_total(&self) -> Money {
        Money::from_paise(self.grand_total_paise)
    }
}

/// Computes every derived figure for a job.
///
/// ## Example
/// ```rust
/// use jobcost_core::costing::{calculate, CostInput, MachineCostInput};
/// use jobcost_core::money::{Money, Percentage};
///
/// let breakdown = calculate(&CostInput {
///     quantity: 1000,
///     rate: Money::from_paise(500),                  // ₹5.00
///     waste_percentage: Percentage::from_bps(300),   // 3%
///     cooly: Money::from_paise(50_000),              // ₹500
///     machines: vec![MachineCostInput {
///         cost: Money::from_paise(50_000),
///         waste_percentage: Percentage::from_bps(300),
///         waste_amount: None,
///     }],
/// })
/// .unwrap();
///
/// assert_eq!(breakdown.amount_paise, 500_000);
/// assert_eq!(breakdown.waste_amount_paise, 15_000);
/// assert_eq!(breakdown.grand_total_paise, 500_000 + 50_000 + 15_000 + 50_000 + 1_500);
/// ```
pub fn calculate(input: &CostInput) -> CoreResult<CostBreakdown> {
    let amount = input
        .rate
        .checked_mul_quantity(input.quantity)
        .ok_or_else(|| too_large("Amount"))?;
    let waste_amount = input
        .waste_percentage
        .checked_of(amount)
        .ok_or_else(|| too_large("Waste"))?;

    let machines = input
        .machines
        .iter()
        .map(|m| {
            let waste = m.checked_waste().ok_or_else(|| too_large("Machine waste"))?;
            Ok(MachineCostLine {
                cost_paise: m.cost.paise(),
                waste_amount_paise: waste.paise(),
            })
        })
        .collect::<CoreResult<Vec<MachineCostLine>>>()?;

    let machine_cost = checked_sum(machines.iter().map(|m| m.cost_paise))
        .ok_or_else(|| too_large("Machine cost"))?;
    let machine_waste = checked_sum(machines.iter().map(|m| m.waste_amount_paise))
        .ok_or_else(|| too_large("Machine waste"))?;

    let grand_total = [amount, input.cooly, waste_amount, machine_cost, machine_waste]
        .into_iter()
        .try_fold(Money::zero(), Money::checked_add)
        .filter(|total| total.paise().unsigned_abs() <= MAX_JOB_TOTAL_PAISE as u64)
        .ok_or_else(|| too_large("Total"))?;

    Ok(CostBreakdown {
        amount_paise: amount.paise(),
        waste_amount_paise: waste_amount.paise(),
        cooly_paise: input.cooly.paise(),
        machines,
        machine_cost_paise: machine_cost.paise(),
        machine_waste_paise: machine_waste.paise(),
        grand_total_paise: grand_total.paise(),
    })
}

fn checked_sum(values: impl Iterator<Item = i64>) -> Option<Money> {
    values
        .map(Money::from_paise)
        .try_fold(Money::zero(), Money::checked_add)
}

fn too_large(field: &str) -> CoreError {
    CoreError::AmountTooLarge {
        field: field.to_string(),
        max: Money::from_paise(MAX_JOB_TOTAL_PAISE),
    }
}
