//! # Domain Types
//!
//! Core domain types used throughout JobCost Pro.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌──────────────┐   ┌──────────────┐   ┌──────────────────────────┐    │
//! │  │   Customer   │   │ ItemCategory │◄──│          Item            │    │
//! │  └──────┬───────┘   └──────────────┘   └────────────┬─────────────┘    │
//! │         │                                           │                   │
//! │         ▼                                           ▼                   │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                              Job                                 │  │
//! │  │  job_number  JOB-20250114-003                                    │  │
//! │  │  quantity × rate = amount, + cooly + waste + machines = total    │  │
//! │  │  status      draft │ pending │ in-progress │ completed │ cancelled│  │
//! │  └──────────────┬───────────────────────────────────────────────────┘  │
//! │                 │ 0..n                                                  │
//! │                 ▼                                                       │
//! │  ┌──────────────────────────┐        ┌──────────────────────────────┐  │
//! │  │     MachineEntry         │───────►│        MachineType           │  │
//! │  │  custom data (JSON)      │        │  custom fields schema (JSON) │  │
//! │  │  cost, waste             │        └──────────────┬───────────────┘  │
//! │  └──────────────────────────┘                       │ 0..1              │
//! │                                          ┌──────────┴───────┐           │
//! │                                          │     Employee     │           │
//! │                                          └──────────────────┘           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Storage Conventions
//! - Identifiers are SQLite autoincrement integers
//! - `*_paise` fields are [`Money`] in paise
//! - `*_bps` fields are [`Percentage`] in basis points

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::fields::{self, FieldDescriptor};
use crate::money::{Money, Percentage};

// =============================================================================
// Customers, Categories, Items
// =============================================================================

/// A customer the shop does jobs for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Customer {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Fields submitted by the customer form.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerInput {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ItemCategory {
    pub id: i64,
    pub name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CategoryInput {
    pub name: String,
}

/// A product the shop makes (bags, letterheads, cut sheets, ...).
///
/// Every item belongs to exactly one category. `category_name` is filled
/// by joined list queries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Item {
    pub id: i64,
    pub name: String,
    pub category_id: i64,
    pub size: String,
    pub category_name: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct ItemInput {
    pub name: String,
    pub category_id: i64,
    pub size: String,
}

// =============================================================================
// Machine Types & Employees
// =============================================================================

/// A machine or process (printing, cutting, bag making).
///
/// `custom_fields_schema` is the raw JSON list of [`FieldDescriptor`]s that
/// drives the dynamic form for this machine's entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MachineType {
    pub id: i64,
    pub name: String,
    pub model: Option<String>,
    pub description: Option<String>,
    pub custom_fields_schema: String,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl MachineType {
    /// Parses the stored custom fields schema.
    pub fn fields(&self) -> CoreResult<Vec<FieldDescriptor>> {
        fields::parse_schema(&self.custom_fields_schema)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MachineTypeInput {
    pub name: String,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub custom_fields: Vec<FieldDescriptor>,
}

/// A machine operator, optionally assigned to one machine type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Employee {
    pub id: i64,
    pub name: String,
    pub phone: Option<String>,
    pub machine_type_id: Option<i64>,
    pub machine_type_name: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct EmployeeInput {
    pub name: String,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub machine_type_id: Option<i64>,
}

// =============================================================================
// Job Status
// =============================================================================

/// Where a job is in its life.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "kebab-case"))]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum JobStatus {
    Draft,
    Pending,
    InProgress,
    Completed,
    Cancelled,
}

impl JobStatus {
    pub const ALL: [JobStatus; 5] = [
        JobStatus::Draft,
        JobStatus::Pending,
        JobStatus::InProgress,
        JobStatus::Completed,
        JobStatus::Cancelled,
    ];

    /// Wire/storage form (`in-progress`).
    pub const fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Draft => "draft",
            JobStatus::Pending => "pending",
            JobStatus::InProgress => "in-progress",
            JobStatus::Completed => "completed",
            JobStatus::Cancelled => "cancelled",
        }
    }

    /// Human form (`In Progress`).
    pub const fn label(&self) -> &'static str {
        match self {
            JobStatus::Draft => "Draft",
            JobStatus::Pending => "Pending",
            JobStatus::InProgress => "In Progress",
            JobStatus::Completed => "Completed",
            JobStatus::Cancelled => "Cancelled",
        }
    }
}

/// The job form preselects `pending`.
impl Default for JobStatus {
    fn default() -> Self {
        JobStatus::Pending
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ValidationError::NotAllowed {
                field: "status".to_string(),
                allowed: JobStatus::ALL.iter().map(|s| s.as_str().to_string()).collect(),
            })
    }
}

// =============================================================================
// Jobs
// =============================================================================

/// A job as stored. Every `*_paise` total is derived by
/// [`crate::costing::calculate`] when the job is saved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct Job {
    pub id: i64,
    pub job_number: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub customer_id: i64,
    pub employee_id: Option<i64>,
    pub item_id: i64,
    pub quantity: i64,
    pub rate_paise: i64,
    pub amount_paise: i64,
    pub waste_percentage_bps: u32,
    pub waste_amount_paise: i64,
    pub cooly_paise: i64,
    pub machine_cost_paise: i64,
    pub machine_waste_paise: i64,
    pub total_amount_paise: i64,
    pub notes: Option<String>,
    pub status: JobStatus,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

impl Job {
    #[inline]
    pub fn rate(&self) -> Money {
        Money::from_paise(self.rate_paise)
    }

    #[inline]
    pub fn amount(&self) -> Money {
        Money::from_paise(self.amount_paise)
    }

    #[inline]
    pub fn waste_percentage(&self) -> Percentage {
        Percentage::from_bps(self.waste_percentage_bps)
    }

    #[inline]
    pub fn waste_amount(&self) -> Money {
        Money::from_paise(self.waste_amount_paise)
    }

    #[inline]
    pub fn cooly(&self) -> Money {
        Money::from_paise(self.cooly_paise)
    }

    #[inline]
    pub fn machine_cost(&self) -> Money {
        Money::from_paise(self.machine_cost_paise)
    }

    #[inline]
    pub fn machine_waste(&self) -> Money {
        Money::from_paise(self.machine_waste_paise)
    }

    #[inline]
    pub fn total_amount(&self) -> Money {
        Money::from_paise(self.total_amount_paise)
    }

    /// Job-level plus machine-level waste.
    pub fn total_waste(&self) -> Money {
        self.waste_amount() + self.machine_waste()
    }
}

/// A job joined with the names the lists and reports display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct JobView {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub job: Job,
    pub customer_name: String,
    pub customer_phone: Option<String>,
    pub customer_address: Option<String>,
    pub item_name: String,
    pub item_size: String,
    pub category_name: String,
    pub employee_name: Option<String>,
}

/// Fields submitted by the job form. Derived totals are never accepted
/// from the caller.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct JobInput {
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub customer_id: i64,
    #[serde(default)]
    pub employee_id: Option<i64>,
    pub item_id: i64,
    pub quantity: i64,
    pub rate_paise: i64,
    #[serde(default)]
    pub waste_percentage_bps: u32,
    #[serde(default)]
    pub cooly_paise: i64,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub status: Option<JobStatus>,
}

impl JobInput {
    /// Status to store: the submitted one, or the form default.
    pub fn status_or_default(&self) -> JobStatus {
        self.status.unwrap_or_default()
    }
}

/// Filters for the job list and report queries. All fields are optional.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase", default)]
#[ts(export)]
pub struct JobFilter {
    /// Matches job number, customer name or item name (substring).
    pub search: Option<String>,
    pub status: Option<JobStatus>,
    #[ts(as = "Option<String>")]
    pub date_from: Option<NaiveDate>,
    #[ts(as = "Option<String>")]
    pub date_to: Option<NaiveDate>,
    pub customer_id: Option<i64>,
    pub employee_id: Option<i64>,
    pub item_id: Option<i64>,
    /// Jobs with at least one entry on this machine type.
    pub machine_type_id: Option<i64>,
    pub limit: Option<u32>,
}

// =============================================================================
// Machine Entries
// =============================================================================

/// One machine/process line on a job.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MachineEntry {
    pub id: i64,
    pub job_id: i64,
    pub machine_type_id: i64,
    /// JSON object keyed by custom field name.
    pub machine_custom_data: String,
    pub cost_paise: i64,
    pub waste_percentage_bps: u32,
    pub waste_amount_paise: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

impl MachineEntry {
    #[inline]
    pub fn cost(&self) -> Money {
        Money::from_paise(self.cost_paise)
    }

    #[inline]
    pub fn waste_amount(&self) -> Money {
        Money::from_paise(self.waste_amount_paise)
    }

    /// Parsed custom data; anything that is not a JSON object reads as empty.
    pub fn custom_data(&self) -> serde_json::Map<String, serde_json::Value> {
        match serde_json::from_str::<serde_json::Value>(&self.machine_custom_data) {
            Ok(serde_json::Value::Object(map)) => map,
            _ => serde_json::Map::new(),
        }
    }
}

/// A machine entry joined with its machine type name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MachineEntryView {
    #[serde(flatten)]
    #[cfg_attr(feature = "sqlx", sqlx(flatten))]
    pub entry: MachineEntry,
    pub machine_type_name: String,
    pub machine_model: Option<String>,
}

/// Fields submitted by a machine entry card.
///
/// `waste_amount_paise` is set when the operator typed the waste amount
/// directly; otherwise it is derived from `waste_percentage_bps`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MachineEntryInput {
    pub machine_type_id: i64,
    #[serde(default)]
    #[ts(type = "Record<string, unknown>")]
    pub custom_data: serde_json::Map<String, serde_json::Value>,
    #[serde(default)]
    pub cost_paise: i64,
    #[serde(default)]
    pub waste_percentage_bps: u32,
    #[serde(default)]
    pub waste_amount_paise: Option<i64>,
}

impl From<&MachineEntry> for MachineEntryInput {
    /// Stored waste is already resolved, so it carries over as an explicit amount.
    fn from(entry: &MachineEntry) -> Self {
        MachineEntryInput {
            machine_type_id: entry.machine_type_id,
            custom_data: entry.custom_data(),
            cost_paise: entry.cost_paise,
            waste_percentage_bps: entry.waste_percentage_bps,
            waste_amount_paise: Some(entry.waste_amount_paise),
        }
    }
}

/// A job with all of its machine entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct JobDetail {
    pub job: JobView,
    pub machine_entries: Vec<MachineEntryView>,
}

/// One use of a machine, with the job it belongs to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MachineUsage {
    pub job: JobView,
    pub entry: MachineEntryView,
}

// =============================================================================
// Auto-fill
// =============================================================================

/// Suggested defaults for a new job, copied from the latest job for the same
/// customer and item.
///
/// Date, job number, status and notes are never copied.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct AutoFill {
    pub source_job_id: i64,
    pub source_job_number: String,
    #[ts(as = "String")]
    pub source_date: NaiveDate,
    pub quantity: i64,
    pub rate_paise: i64,
    pub waste_percentage_bps: u32,
    pub cooly_paise: i64,
    pub machine_entries: Vec<MachineEntryInput>,
}

impl From<&JobDetail> for AutoFill {
    fn from(detail: &JobDetail) -> Self {
        let job = &detail.job.job;
        AutoFill {
            source_job_id: job.id,
            source_job_number: job.job_number.clone(),
            source_date: job.date,
            quantity: job.quantity,
            rate_paise: job.rate_paise,
            waste_percentage_bps: job.waste_percentage_bps,
            cooly_paise: job.cooly_paise,
            machine_entries: detail
                .machine_entries
                .iter()
                .map(|view| MachineEntryInput::from(&view.entry))
                .collect(),
        }
    }
}

// =============================================================================
// Dashboard
// =============================================================================

/// Headline numbers for a date range.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct DashboardStats {
    #[ts(as = "String")]
    pub from: NaiveDate,
    #[ts(as = "String")]
    pub to: NaiveDate,
    pub job_count: i64,
    pub total_amount_paise: i64,
    pub total_cooly_paise: i64,
    pub total_waste_paise: i64,
    pub recent_jobs: Vec<JobView>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in JobStatus::ALL {
            assert_eq!(status.as_str().parse::<JobStatus>().unwrap(), status);
        }
        assert!("in_progress".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_status_serde_is_kebab_case() {
        let json = serde_json::to_string(&JobStatus::InProgress).unwrap();
        assert_eq!(json, "\"in-progress\"");
        assert_eq!(JobStatus::default(), JobStatus::Pending);
        assert_eq!(JobStatus::InProgress.label(), "In Progress");
    }

    #[test]
    fn test_job_input_defaults() {
        let input: JobInput = serde_json::from_value(serde_json::json!({
            "date": "2025-01-14",
            "customerId": 1,
            "itemId": 2,
            "quantity": 500,
            "ratePaise": 800
        }))
        .unwrap();

        assert_eq!(input.waste_percentage_bps, 0);
        assert_eq!(input.cooly_paise, 0);
        assert_eq!(input.status_or_default(), JobStatus::Pending);
    }

    #[test]
    fn test_custom_data_tolerates_bad_json() {
        let entry = MachineEntry {
            id: 1,
            job_id: 1,
            machine_type_id: 1,
            machine_custom_data: "not json".to_string(),
            cost_paise: 0,
            waste_percentage_bps: 0,
            waste_amount_paise: 0,
            created_at: Utc::now(),
        };
        assert!(entry.custom_data().is_empty());
    }
}
