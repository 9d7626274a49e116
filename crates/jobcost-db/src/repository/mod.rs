//! # Repository Module
//!
//! Database repository implementations for JobCost Pro.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  Request handler                                                       │
//! │       │                                                                 │
//! │       │  db.jobs().create(&input, &entries)                            │
//! │       ▼                                                                 │
//! │  JobRepository                                                         │
//! │  ├── validate (jobcost-core)                                           │
//! │  ├── costing::calculate (jobcost-core)                                 │
//! │  ├── assign job number                                                 │
//! │  └── INSERT job + entries (one transaction)                            │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite Database                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`CustomerRepository`](customer::CustomerRepository) - Customer master
//! - [`CategoryRepository`](category::CategoryRepository) - Item categories, guarded delete
//! - [`ItemRepository`](item::ItemRepository) - Items with their category
//! - [`MachineTypeRepository`](machine::MachineTypeRepository) - Machines and field schemas
//! - [`EmployeeRepository`](employee::EmployeeRepository) - Operators
//! - [`JobRepository`](job::JobRepository) - Jobs, auto-fill, report queries
//! - [`MachineEntryRepository`](machine::MachineEntryRepository) - Per-job machine lines
//! - [`DashboardRepository`](dashboard::DashboardRepository) - Headline stats
//! - [`MetaRepository`](meta::MetaRepository) - Key/value flags

pub mod category;
pub mod customer;
pub mod dashboard;
pub mod employee;
pub mod item;
pub mod job;
pub mod machine;
pub mod meta;

/// Trims optional text and turns blank values into `None`.
pub(crate) fn clean_optional(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
pub(crate) mod test_support {
    //! Fixtures shared by the repository tests.

    use chrono::NaiveDate;
    use jobcost_core::fields::{FieldDescriptor, FieldType};
    use jobcost_core::{
        CategoryInput, CustomerInput, ItemInput, JobInput, MachineEntryInput, MachineTypeInput,
    };
    use serde_json::json;

    use crate::pool::{Database, DbConfig};

    pub struct Fixture {
        pub db: Database,
        pub customer_id: i64,
        pub category_id: i64,
        pub item_id: i64,
        pub printing_id: i64,
        pub cutting_id: i64,
    }

    pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        let customer = db
            .customers()
            .create(&CustomerInput {
                name: "Lakshmi Traders".to_string(),
                phone: Some("9876543210".to_string()),
                address: Some("12 Anna Nagar, Chennai".to_string()),
            })
            .await
            .unwrap();
        let category = db
            .categories()
            .create(&CategoryInput {
                name: "Cut Sheets".to_string(),
            })
            .await
            .unwrap();
        let item = db
            .items()
            .create(&ItemInput {
                name: "Cut Sheet A3".to_string(),
                category_id: category.id,
                size: "A3".to_string(),
            })
            .await
            .unwrap();
        let printing = db
            .machine_types()
            .create(&MachineTypeInput {
                name: "Printing".to_string(),
                model: Some("Printing Machine".to_string()),
                description: None,
                custom_fields: vec![
                    FieldDescriptor::new("rollNo", "Roll No", FieldType::Text, true),
                    FieldDescriptor::new("noOfColours", "No. of Colours", FieldType::Number, true),
                ],
            })
            .await
            .unwrap();
        let cutting = db
            .machine_types()
            .create(&MachineTypeInput {
                name: "Harish".to_string(),
                model: Some("Cutting Machine".to_string()),
                description: None,
                custom_fields: vec![FieldDescriptor::new("size", "Size", FieldType::Text, false)],
            })
            .await
            .unwrap();

        Fixture {
            db,
            customer_id: customer.id,
            category_id: category.id,
            item_id: item.id,
            printing_id: printing.id,
            cutting_id: cutting.id,
        }
    }

    impl Fixture {
        pub fn job_input(&self, date: NaiveDate) -> JobInput {
            JobInput {
                date,
                customer_id: self.customer_id,
                employee_id: None,
                item_id: self.item_id,
                quantity: 1000,
                rate_paise: 500,
                waste_percentage_bps: 300,
                cooly_paise: 50_000,
                notes: Some("Cutting job - card sheets".to_string()),
                status: None,
            }
        }

        pub fn printing_entry(&self, cost_paise: i64) -> MachineEntryInput {
            let custom_data = match json!({"rollNo": "R-301", "noOfColours": 4}) {
                serde_json::Value::Object(map) => map,
                _ => unreachable!(),
            };
            MachineEntryInput {
                machine_type_id: self.printing_id,
                custom_data,
                cost_paise,
                waste_percentage_bps: 200,
                waste_amount_paise: None,
            }
        }
    }
}
