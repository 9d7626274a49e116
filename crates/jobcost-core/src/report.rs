//! # Report Aggregation
//!
//! Totals, sub-totals and per-machine breakdowns behind the PDF reports.
//! Rendering lives in the desktop app; everything here is plain arithmetic
//! over rows the repositories already loaded.
//!
//! ```text
//! ┌───────────────────┐    ┌─────────────────────┐    ┌──────────────────┐
//! │ Vec<JobDetail>    │───►│ JobTotals           │───►│ TOTALS row       │
//! │ (jobs + entries)  │    │ CustomerSubtotal    │    │ sub-total table  │
//! │                   │    │ BucketCosts         │    │ machine columns  │
//! │                   │    │ WasteLine           │    │ waste table      │
//! └───────────────────┘    └─────────────────────┘    └──────────────────┘
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use ts_rs::TS;

use crate::fields::{numeric_value, FieldDescriptor, FieldType};
use crate::money::Money;
use crate::types::{Job, JobDetail, JobView, MachineEntry, MachineEntryView};

// =============================================================================
// Job Totals
// =============================================================================

/// Running sums over a set of jobs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct JobTotals {
    pub jobs: i64,
    pub quantity: i64,
    pub amount_paise: i64,
    pub cooly_paise: i64,
    /// Job-level waste only; machine waste is tracked separately.
    pub waste_paise: i64,
    pub machine_cost_paise: i64,
    pub machine_waste_paise: i64,
    pub total_paise: i64,
}

impl JobTotals {
    pub fn add(&mut self, job: &Job) {
        self.jobs += 1;
        self.quantity += job.quantity;
        self.amount_paise += job.amount_paise;
        self.cooly_paise += job.cooly_paise;
        self.waste_paise += job.waste_amount_paise;
        self.machine_cost_paise += job.machine_cost_paise;
        self.machine_waste_paise += job.machine_waste_paise;
        self.total_paise += job.total_amount_paise;
    }

    pub fn from_jobs<'a>(jobs: impl IntoIterator<Item = &'a Job>) -> Self {
        let mut totals = JobTotals::default();
        for job in jobs {
            totals.add(job);
        }
        totals
    }

    pub fn amount(&self) -> Money {
        Money::from_paise(self.amount_paise)
    }

    pub fn cooly(&self) -> Money {
        Money::from_paise(self.cooly_paise)
    }

    pub fn waste(&self) -> Money {
        Money::from_paise(self.waste_paise)
    }

    pub fn total(&self) -> Money {
        Money::from_paise(self.total_paise)
    }
}

/// Totals for one customer within a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct CustomerSubtotal {
    pub customer_id: i64,
    pub customer_name: String,
    pub totals: JobTotals,
}

/// Groups jobs by customer, ordered by customer name.
pub fn summarize_by_customer(jobs: &[JobView]) -> Vec<CustomerSubtotal> {
    let mut by_id: BTreeMap<i64, CustomerSubtotal> = BTreeMap::new();

    for view in jobs {
        by_id
            .entry(view.job.customer_id)
            .or_insert_with(|| CustomerSubtotal {
                customer_id: view.job.customer_id,
                customer_name: view.customer_name.clone(),
                totals: JobTotals::default(),
            })
            .totals
            .add(&view.job);
    }

    let mut subtotals: Vec<CustomerSubtotal> = by_id.into_values().collect();
    subtotals.sort_by(|a, b| {
        a.customer_name
            .to_lowercase()
            .cmp(&b.customer_name.to_lowercase())
            .then(a.customer_id.cmp(&b.customer_id))
    });
    subtotals
}

// =============================================================================
// Machine Buckets
// =============================================================================

/// The fixed machine columns of the cost summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum MachineBucket {
    Printing,
    Cutting,
    Pp,
    Hm,
    Binding,
    Other,
}

impl MachineBucket {
    pub const COLUMNS: [MachineBucket; 5] = [
        MachineBucket::Printing,
        MachineBucket::Cutting,
        MachineBucket::Pp,
        MachineBucket::Hm,
        MachineBucket::Binding,
    ];

    pub const fn label(&self) -> &'static str {
        match self {
            MachineBucket::Printing => "Printing",
            MachineBucket::Cutting => "Cutting",
            MachineBucket::Pp => "PP",
            MachineBucket::Hm => "HM",
            MachineBucket::Binding => "Binding",
            MachineBucket::Other => "Other",
        }
    }

    /// Classifies a machine type by its name and model.
    ///
    /// ## Example
    /// ```rust
    /// use jobcost_core::report::MachineBucket;
    ///
    /// assert_eq!(MachineBucket::classify("Harish", Some("Cutting Machine")), MachineBucket::Cutting);
    /// assert_eq!(MachineBucket::classify("PP", Some("PP Bag Making Machine")), MachineBucket::Pp);
    /// assert_eq!(MachineBucket::classify("Lamination", None), MachineBucket::Other);
    /// ```
    pub fn classify(name: &str, model: Option<&str>) -> MachineBucket {
        let text = format!("{} {}", name, model.unwrap_or("")).to_lowercase();
        let has_word = |word: &str| {
            text.split(|c: char| !c.is_ascii_alphanumeric())
                .any(|token| token == word)
        };

        if text.contains("print") {
            MachineBucket::Printing
        } else if text.contains("cut") {
            MachineBucket::Cutting
        } else if has_word("pp") || text.contains("paper pasting") {
            MachineBucket::Pp
        } else if has_word("hm") || text.contains("hot melt") {
            MachineBucket::Hm
        } else if text.contains("bind") {
            MachineBucket::Binding
        } else {
            MachineBucket::Other
        }
    }

    pub fn of_entry(entry: &MachineEntryView) -> MachineBucket {
        MachineBucket::classify(&entry.machine_type_name, entry.machine_model.as_deref())
    }
}

/// Machine cost per bucket.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BucketCosts {
    costs: BTreeMap<MachineBucket, i64>,
}

impl BucketCosts {
    pub fn from_entries(entries: &[MachineEntryView]) -> Self {
        let mut costs = BucketCosts::default();
        for entry in entries {
            costs.add(MachineBucket::of_entry(entry), entry.entry.cost());
        }
        costs
    }

    pub fn add(&mut self, bucket: MachineBucket, cost: Money) {
        *self.costs.entry(bucket).or_insert(0) += cost.paise();
    }

    pub fn merge(&mut self, other: &BucketCosts) {
        for (bucket, paise) in &other.costs {
            *self.costs.entry(*bucket).or_insert(0) += paise;
        }
    }

    pub fn get(&self, bucket: MachineBucket) -> Money {
        Money::from_paise(self.costs.get(&bucket).copied().unwrap_or(0))
    }
}

// =============================================================================
// Waste
// =============================================================================

/// Machine name used for rows that carry job-level waste.
pub const JOB_LEVEL_WASTE: &str = "Job-level";

/// One row of the waste report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct WasteLine {
    pub job_number: String,
    pub customer_name: String,
    pub item_name: String,
    pub machine_name: String,
    pub quantity: i64,
    pub waste_percentage_bps: u32,
    pub waste_amount_paise: i64,
}

/// One row per machine entry, plus a job-level row for every job whose own
/// waste is above zero.
pub fn waste_lines(details: &[JobDetail]) -> Vec<WasteLine> {
    let mut lines = Vec::new();

    for detail in details {
        let view = &detail.job;
        let line = |machine_name: &str, bps: u32, paise: i64| WasteLine {
            job_number: view.job.job_number.clone(),
            customer_name: view.customer_name.clone(),
            item_name: view.item_name.clone(),
            machine_name: machine_name.to_string(),
            quantity: view.job.quantity,
            waste_percentage_bps: bps,
            waste_amount_paise: paise,
        };

        if view.job.waste_amount_paise > 0 {
            lines.push(line(
                JOB_LEVEL_WASTE,
                view.job.waste_percentage_bps,
                view.job.waste_amount_paise,
            ));
        }

        for entry in &detail.machine_entries {
            lines.push(line(
                &entry.machine_type_name,
                entry.entry.waste_percentage_bps,
                entry.entry.waste_amount_paise,
            ));
        }
    }

    lines
}

/// Waste totals for one machine type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct MachineWaste {
    pub machine_type_name: String,
    pub entries: i64,
    pub waste_paise: i64,
}

/// Entry count and total waste per machine type, ordered by machine name.
pub fn summarize_waste_by_machine(details: &[JobDetail]) -> Vec<MachineWaste> {
    let mut by_name: BTreeMap<&str, MachineWaste> = BTreeMap::new();

    for entry in details.iter().flat_map(|d| &d.machine_entries) {
        let summary = by_name
            .entry(entry.machine_type_name.as_str())
            .or_insert_with(|| MachineWaste {
                machine_type_name: entry.machine_type_name.clone(),
                entries: 0,
                waste_paise: 0,
            });
        summary.entries += 1;
        summary.waste_paise += entry.entry.waste_amount_paise;
    }

    by_name.into_values().collect()
}

// =============================================================================
// Custom Field Summaries
// =============================================================================

/// Total and average of one numeric custom field across entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(rename_all = "camelCase")]
#[ts(export)]
pub struct FieldSummary {
    pub name: String,
    pub label: String,
    pub count: i64,
    pub total: f64,
    pub average: f64,
}

/// Summarizes every number field of a schema. Entries with no value for a
/// field are not counted toward its average.
pub fn numeric_field_summary(
    schema: &[FieldDescriptor],
    entries: &[MachineEntry],
) -> Vec<FieldSummary> {
    let data: Vec<_> = entries.iter().map(MachineEntry::custom_data).collect();

    schema
        .iter()
        .filter(|f| f.field_type == FieldType::Number)
        .map(|field| {
            let values: Vec<f64> = data
                .iter()
                .filter_map(|d| d.get(&field.name).and_then(numeric_value))
                .collect();
            let total: f64 = values.iter().sum();
            let count = values.len() as i64;
            FieldSummary {
                name: field.name.clone(),
                label: field.label.clone(),
                count,
                total,
                average: if count > 0 { total / count as f64 } else { 0.0 },
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::JobStatus;
    use chrono::{NaiveDate, Utc};

    fn job(id: i64, customer_id: i64, amount: i64, waste: i64, total: i64) -> Job {
        Job {
            id,
            job_number: format!("JOB-20250114-{:03}", id),
            date: NaiveDate::from_ymd_opt(2025, 1, 14).unwrap(),
            customer_id,
            employee_id: None,
            item_id: 1,
            quantity: 100,
            rate_paise: amount / 100,
            amount_paise: amount,
            waste_percentage_bps: 200,
            waste_amount_paise: waste,
            cooly_paise: 1_000,
            machine_cost_paise: 0,
            machine_waste_paise: 0,
            total_amount_paise: total,
            notes: None,
            status: JobStatus::Completed,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn view(job: Job, customer: &str) -> JobView {
        JobView {
            job,
            customer_name: customer.to_string(),
            customer_phone: None,
            customer_address: None,
            item_name: "Letterhead A4".to_string(),
            item_size: "A4".to_string(),
            category_name: "Printed Material".to_string(),
            employee_name: None,
        }
    }

    fn entry(job_id: i64, machine: &str, model: Option<&str>, cost: i64, waste: i64) -> MachineEntryView {
        MachineEntryView {
            entry: MachineEntry {
                id: 0,
                job_id,
                machine_type_id: 1,
                machine_custom_data: r#"{"noOfColours": 4, "rollNo": "R-1"}"#.to_string(),
                cost_paise: cost,
                waste_percentage_bps: 100,
                waste_amount_paise: waste,
                created_at: Utc::now(),
            },
            machine_type_name: machine.to_string(),
            machine_model: model.map(str::to_string),
        }
    }

    #[test]
    fn test_job_totals() {
        let jobs = [job(1, 1, 10_000, 200, 11_200), job(2, 1, 5_000, 0, 6_000)];
        let totals = JobTotals::from_jobs(&jobs);
        assert_eq!(totals.jobs, 2);
        assert_eq!(totals.quantity, 200);
        assert_eq!(totals.amount_paise, 15_000);
        assert_eq!(totals.cooly_paise, 2_000);
        assert_eq!(totals.waste_paise, 200);
        assert_eq!(totals.total_paise, 17_200);
    }

    #[test]
    fn test_summarize_by_customer_orders_by_name() {
        let jobs = vec![
            view(job(1, 2, 10_000, 0, 10_000), "Murugan Stores"),
            view(job(2, 1, 5_000, 0, 5_000), "anand Paper House"),
            view(job(3, 2, 1_000, 0, 1_000), "Murugan Stores"),
        ];
        let subtotals = summarize_by_customer(&jobs);
        assert_eq!(subtotals.len(), 2);
        assert_eq!(subtotals[0].customer_name, "anand Paper House");
        assert_eq!(subtotals[1].totals.jobs, 2);
        assert_eq!(subtotals[1].totals.total_paise, 11_000);
    }

    #[test]
    fn test_classify_machines() {
        assert_eq!(MachineBucket::classify("Printing", None), MachineBucket::Printing);
        assert_eq!(
            MachineBucket::classify("Excel", Some("Cutting Machine")),
            MachineBucket::Cutting
        );
        assert_eq!(MachineBucket::classify("HM", Some("HM Bag Making Machine")), MachineBucket::Hm);
        assert_eq!(MachineBucket::classify("Paper Pasting", None), MachineBucket::Pp);
        assert_eq!(MachineBucket::classify("Hot Melt", None), MachineBucket::Hm);
        assert_eq!(MachineBucket::classify("Book Binding", None), MachineBucket::Binding);
        // "hm" inside a word is not a match
        assert_eq!(MachineBucket::classify("Rhythm", None), MachineBucket::Other);
    }

    #[test]
    fn test_bucket_costs() {
        let entries = vec![
            entry(1, "Printing", None, 40_000, 0),
            entry(1, "Harish", Some("Cutting Machine"), 10_000, 0),
            entry(1, "Mathan", Some("Cutting Machine"), 5_000, 0),
        ];
        let costs = BucketCosts::from_entries(&entries);
        assert_eq!(costs.get(MachineBucket::Printing).paise(), 40_000);
        assert_eq!(costs.get(MachineBucket::Cutting).paise(), 15_000);
        assert!(costs.get(MachineBucket::Binding).is_zero());
    }

    #[test]
    fn test_waste_lines_and_machine_summary() {
        let details = vec![
            JobDetail {
                job: view(job(1, 1, 10_000, 200, 0), "Lakshmi Traders"),
                machine_entries: vec![
                    entry(1, "Printing", None, 40_000, 400),
                    entry(1, "PP", None, 10_000, 100),
                ],
            },
            JobDetail {
                job: view(job(2, 1, 10_000, 0, 0), "Lakshmi Traders"),
                machine_entries: vec![entry(2, "Printing", None, 20_000, 200)],
            },
        ];

        let lines = waste_lines(&details);
        assert_eq!(lines.len(), 4);
        assert_eq!(lines[0].machine_name, JOB_LEVEL_WASTE);
        assert_eq!(lines[0].waste_amount_paise, 200);

        let summary = summarize_waste_by_machine(&details);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[1].machine_type_name, "Printing");
        assert_eq!(summary[1].entries, 2);
        assert_eq!(summary[1].waste_paise, 600);
    }

    #[test]
    fn test_numeric_field_summary() {
        let schema = vec![
            FieldDescriptor::new("rollNo", "Roll No", FieldType::Text, true),
            FieldDescriptor::new("noOfColours", "No. of Colours", FieldType::Number, true),
            FieldDescriptor::new("weight", "Weight", FieldType::Number, false),
        ];
        let entries: Vec<MachineEntry> = vec![
            entry(1, "Printing", None, 0, 0).entry,
            entry(2, "Printing", None, 0, 0).entry,
        ];

        let summary = numeric_field_summary(&schema, &entries);
        assert_eq!(summary.len(), 2);
        assert_eq!(summary[0].count, 2);
        assert_eq!(summary[0].total, 8.0);
        assert_eq!(summary[0].average, 4.0);
        assert_eq!(summary[1].count, 0);
        assert_eq!(summary[1].average, 0.0);
    }
}
