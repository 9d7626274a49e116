//! # Demo Data
//!
//! A first-run data set so a fresh install has something to look at:
//! machine types with their field schemas, categories, customers,
//! employees, items and three weeks of jobs.
//!
//! Everything is written in one transaction guarded by `meta.seeded`, so a
//! partially seeded database never happens and a second call is a no-op.
//!
//! Jobs are dated relative to the `today` passed in.

use chrono::{Duration, NaiveDate, Utc};
use serde_json::{Map, Value};
use sqlx::{SqliteConnection, SqlitePool};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::error::{DbError, DbResult};
use crate::repository::job::insert_job;
use crate::repository::meta::{get_value, set_value, SEEDED_KEY};
use jobcost_core::fields::{schema_to_json, FieldDescriptor, FieldType};
use jobcost_core::job_number::format_job_number;
use jobcost_core::JobStatus::{self, Completed, InProgress};
use jobcost_core::{JobInput, MachineEntryInput};

// =============================================================================
// Masters
// =============================================================================

type FieldSpec = (&'static str, &'static str, FieldType, bool);

const PRINTING_FIELDS: &[FieldSpec] = &[
    ("matter", "Matter", FieldType::Text, true),
    ("rollNo", "Roll No.", FieldType::Text, true),
    ("size", "Size", FieldType::Text, true),
    ("weight", "Weight", FieldType::Number, false),
    ("noOfColours", "No. of Colours", FieldType::Number, true),
    ("ptgCooly", "Ptg Cooly", FieldType::Number, true),
    ("mCost", "M Cost", FieldType::Number, true),
];

const CUTTING_FIELDS: &[FieldSpec] = &[
    ("items", "Items", FieldType::Text, true),
    ("size", "Size", FieldType::Text, true),
    ("quantity", "Quantity", FieldType::Number, true),
    ("rate", "Rate", FieldType::Number, true),
    ("amount", "Amount", FieldType::Number, true),
    ("waste", "Waste", FieldType::Number, false),
];

const PP_FIELDS: &[FieldSpec] = &[
    ("ppRollNo", "PP Roll No.", FieldType::Text, true),
    ("rollSize", "Roll Size", FieldType::Text, true),
    ("rollWeight", "Roll Weight (kg)", FieldType::Number, true),
    ("waste", "Waste", FieldType::Number, false),
];

const HM_FIELDS: &[FieldSpec] = &[
    ("hmRollNo", "HM Roll No.", FieldType::Text, true),
    ("rollSize", "Roll Size", FieldType::Text, true),
    ("rollWeight", "Roll Weight (kg)", FieldType::Number, true),
    ("waste", "Waste", FieldType::Number, false),
];

/// (name, model, description, fields)
const MACHINE_TYPES: &[(&str, &str, &str, &[FieldSpec])] = &[
    ("Printing", "Printing Machine", "Multi-color printing on various materials", PRINTING_FIELDS),
    ("Harish", "Cutting Machine", "Cutting machine - Harish", CUTTING_FIELDS),
    ("Mathan", "Cutting Machine", "Cutting machine - Mathan", CUTTING_FIELDS),
    ("Jaquar", "Cutting Machine", "Cutting machine - Jaquar", CUTTING_FIELDS),
    ("Excel", "Cutting Machine", "Cutting machine - Excel", CUTTING_FIELDS),
    ("PP", "PP Bag Making Machine", "Polypropylene bag manufacturing", PP_FIELDS),
    ("HM", "HM Bag Making Machine", "HDPE bag manufacturing", HM_FIELDS),
];

const CATEGORIES: &[&str] = &["PP Bags", "HM Bags", "Printed Material", "Cut Sheets"];

/// (name, phone, address)
const CUSTOMERS: &[(&str, &str, &str)] = &[
    ("Lakshmi Traders", "9876543210", "12 Anna Nagar, Chennai"),
    ("Sri Balaji Enterprises", "9876543211", "45 T Nagar, Chennai"),
    ("Murugan Stores", "9876543212", "78 Mylapore, Chennai"),
    ("KVR Packaging", "9876543213", "23 Ambattur, Chennai"),
    ("New India Plastics", "9876543214", "56 Guindy, Chennai"),
    ("Anand Paper House", "9876543215", "89 Perambur, Chennai"),
];

/// (name, phone, machine type by position)
const EMPLOYEES: &[(&str, &str, usize)] = &[
    ("Ravi", "9000000001", 0),
    ("Suresh", "9000000002", 1),
    ("Kumar", "9000000003", 5),
    ("Prakash", "9000000004", 6),
    ("Manoj", "9000000005", 2),
    ("Dinesh", "9000000006", 3),
    ("Vijay", "9000000007", 4),
    ("Sathish", "9000000008", 0),
];

/// (name, category by position, size)
const ITEMS: &[(&str, usize, &str)] = &[
    ("PP Carry Bag 10x12", 0, "10x12"),
    ("HM Grocery Bag 16x20", 1, "16x20"),
    ("Letterhead A4", 2, "A4"),
    ("Cut Sheet A3", 3, "A3"),
    ("PP Carry Bag 14x18", 0, "14x18"),
    ("HM D-Cut Bag 12x16", 1, "12x16"),
    ("Bill Book A5", 2, "A5"),
    ("Visiting Card", 2, "3.5x2"),
    ("PP Shopping Bag 16x22", 0, "16x22"),
    ("Cut Sheet B4", 3, "B4"),
];

// =============================================================================
// Jobs
// =============================================================================

/// One demo job. Positions index the master tables above.
struct JobSeed {
    days_ago: i64,
    customer: usize,
    employee: usize,
    item: usize,
    quantity: i64,
    rate_paise: i64,
    waste_bps: u32,
    cooly_paise: i64,
    machine: usize,
    custom_data: &'static str,
    machine_cost_paise: i64,
    machine_waste_bps: u32,
    status: JobStatus,
    notes: &'static str,
}

/// Positions are (customer, employee, item); money is (quantity, rate,
/// waste bps, cooly); the machine line is (machine, custom data, cost,
/// waste bps).
const fn job(
    days_ago: i64,
    who: (usize, usize, usize),
    money: (i64, i64, u32, i64),
    machine: (usize, &'static str, i64, u32),
    status: JobStatus,
    notes: &'static str,
) -> JobSeed {
    JobSeed {
        days_ago,
        customer: who.0,
        employee: who.1,
        item: who.2,
        quantity: money.0,
        rate_paise: money.1,
        waste_bps: money.2,
        cooly_paise: money.3,
        machine: machine.0,
        custom_data: machine.1,
        machine_cost_paise: machine.2,
        machine_waste_bps: machine.3,
        status,
        notes,
    }
}

const JOBS: &[JobSeed] = &[
    // Today
    job(0, (0, 1, 3), (1000, 500, 300, 50_000),
        (1, r#"{"items":"Card sheets","size":"23x36","quantity":1000,"rate":5,"amount":5000,"waste":30}"#, 50_000, 300),
        Completed, "Cutting job - card sheets"),
    job(0, (1, 2, 1), (500, 800, 200, 40_000),
        (6, r#"{"hmRollNo":"HM-201","rollSize":"16x20","rollWeight":30,"waste":2}"#, 40_000, 150),
        InProgress, "HM grocery bags"),
    job(0, (0, 0, 2), (2000, 300, 100, 60_000),
        (0, r#"{"matter":"Company Letterhead","rollNo":"R-301","size":"A4","weight":50,"noOfColours":4,"ptgCooly":800,"mCost":400}"#, 120_000, 50),
        Completed, "Letterhead printing"),
    // Yesterday
    job(1, (2, 4, 9), (800, 400, 250, 35_000),
        (2, r#"{"items":"Invoice sheets","size":"B4","quantity":800,"rate":4,"amount":3200,"waste":20}"#, 35_000, 200),
        Completed, "B4 invoice cut"),
    job(1, (3, 2, 0), (3000, 200, 150, 45_000),
        (5, r#"{"ppRollNo":"PP-105","rollSize":"10x12","rollWeight":25,"waste":1.5}"#, 30_000, 100),
        Completed, "PP carry bags small"),
    job(1, (4, 7, 7), (5000, 150, 50, 70_000),
        (0, r#"{"matter":"Visiting Cards","rollNo":"R-302","size":"3.5x2","weight":15,"noOfColours":2,"ptgCooly":500,"mCost":200}"#, 70_000, 30),
        Completed, "Visiting card print run"),
    // 2 days ago
    job(2, (5, 5, 3), (1500, 450, 200, 55_000),
        (3, r#"{"items":"Flyer sheets","size":"A3","quantity":1500,"rate":4.5,"amount":6750,"waste":30}"#, 45_000, 200),
        Completed, "A3 flyers cut on Jaquar"),
    job(2, (1, 3, 5), (2000, 350, 100, 50_000),
        (6, r#"{"hmRollNo":"HM-202","rollSize":"12x16","rollWeight":22,"waste":1}"#, 35_000, 100),
        Completed, "HM D-cut bags"),
    // 3 days ago
    job(3, (0, 0, 6), (1000, 600, 100, 80_000),
        (0, r#"{"matter":"Bill Book Cover","rollNo":"R-303","size":"A5","weight":35,"noOfColours":3,"ptgCooly":600,"mCost":300}"#, 90_000, 50),
        Completed, "Bill book printing"),
    job(3, (2, 6, 3), (2000, 500, 300, 60_000),
        (4, r#"{"items":"Label sheets","size":"A3","quantity":2000,"rate":5,"amount":10000,"waste":60}"#, 55_000, 300),
        Completed, "Label sheets cut on Excel"),
    // 5 days ago
    job(5, (3, 1, 9), (600, 400, 200, 30_000),
        (1, r#"{"items":"Pamphlet sheets","size":"B4","quantity":600,"rate":4,"amount":2400,"waste":12}"#, 25_000, 200),
        Completed, "Pamphlet cutting"),
    job(5, (4, 2, 4), (4000, 250, 150, 50_000),
        (5, r#"{"ppRollNo":"PP-106","rollSize":"14x18","rollWeight":35,"waste":1.5}"#, 40_000, 100),
        Completed, "PP carry bags medium"),
    // Last week
    job(7, (5, 7, 2), (3000, 300, 100, 75_000),
        (0, r#"{"matter":"Invoice Pads","rollNo":"R-304","size":"A4","weight":60,"noOfColours":2,"ptgCooly":550,"mCost":250}"#, 80_000, 50),
        Completed, "Invoice pad printing"),
    job(7, (0, 4, 3), (1200, 500, 250, 40_000),
        (2, r#"{"items":"Poster sheets","size":"A3","quantity":1200,"rate":5,"amount":6000,"waste":30}"#, 40_000, 200),
        Completed, "Poster cutting on Mathan"),
    job(8, (1, 3, 1), (1000, 800, 200, 60_000),
        (6, r#"{"hmRollNo":"HM-203","rollSize":"16x20","rollWeight":40,"waste":2}"#, 50_000, 150),
        Completed, "HM grocery bags bulk"),
    job(8, (2, 5, 9), (900, 400, 200, 35_000),
        (3, r#"{"items":"Brochure sheets","size":"B4","quantity":900,"rate":4,"amount":3600,"waste":18}"#, 35_000, 200),
        Completed, "Brochure cut on Jaquar"),
    job(10, (3, 0, 6), (1500, 600, 100, 90_000),
        (0, r#"{"matter":"Receipt Books","rollNo":"R-305","size":"A5","weight":40,"noOfColours":1,"ptgCooly":400,"mCost":200}"#, 60_000, 50),
        Completed, "Receipt book printing"),
    job(10, (4, 6, 3), (2500, 500, 300, 70_000),
        (4, r#"{"items":"Wrapper sheets","size":"A3","quantity":2500,"rate":5,"amount":12500,"waste":75}"#, 60_000, 300),
        Completed, "Wrapper sheets on Excel"),
    job(12, (5, 1, 3), (800, 500, 200, 40_000),
        (1, r#"{"items":"Menu cards","size":"23x36","quantity":800,"rate":5,"amount":4000,"waste":16}"#, 35_000, 200),
        Completed, "Menu card cutting"),
    job(12, (0, 2, 8), (5000, 200, 100, 50_000),
        (5, r#"{"ppRollNo":"PP-107","rollSize":"16x22","rollWeight":45,"waste":1}"#, 45_000, 50),
        Completed, "PP shopping bags large"),
    // Two weeks back and older
    job(14, (1, 7, 7), (10_000, 150, 50, 100_000),
        (0, r#"{"matter":"Business Cards","rollNo":"R-306","size":"3.5x2","weight":25,"noOfColours":4,"ptgCooly":800,"mCost":500}"#, 130_000, 30),
        Completed, "Bulk business cards"),
    job(14, (2, 4, 9), (1100, 400, 200, 40_000),
        (2, r#"{"items":"Catalog sheets","size":"B4","quantity":1100,"rate":4,"amount":4400,"waste":22}"#, 38_000, 200),
        Completed, "Catalog sheets on Mathan"),
    job(16, (3, 3, 5), (3000, 350, 100, 60_000),
        (6, r#"{"hmRollNo":"HM-204","rollSize":"12x16","rollWeight":28,"waste":1}"#, 40_000, 100),
        Completed, "HM D-cut bags order"),
    job(16, (4, 5, 3), (1800, 450, 200, 50_000),
        (3, r#"{"items":"Envelope sheets","size":"A3","quantity":1800,"rate":4.5,"amount":8100,"waste":36}"#, 45_000, 200),
        Completed, "Envelope cutting on Jaquar"),
    job(18, (5, 0, 2), (4000, 300, 100, 90_000),
        (0, r#"{"matter":"Stationery Headers","rollNo":"R-307","size":"A4","weight":70,"noOfColours":3,"ptgCooly":700,"mCost":350}"#, 105_000, 50),
        Completed, "Stationery header printing"),
    job(18, (0, 6, 3), (3000, 500, 300, 80_000),
        (4, r#"{"items":"Box wraps","size":"A3","quantity":3000,"rate":5,"amount":15000,"waste":90}"#, 70_000, 300),
        Completed, "Box wrap cutting on Excel"),
    job(20, (1, 1, 3), (500, 500, 200, 25_000),
        (1, r#"{"items":"Tag sheets","size":"23x36","quantity":500,"rate":5,"amount":2500,"waste":10}"#, 20_000, 200),
        Completed, "Tag cutting"),
    job(20, (2, 2, 4), (6000, 250, 150, 70_000),
        (5, r#"{"ppRollNo":"PP-108","rollSize":"14x18","rollWeight":50,"waste":1.5}"#, 50_000, 100),
        Completed, "PP bags bulk order"),
];

// =============================================================================
// Seeding
// =============================================================================

/// Loads the demo data unless `meta.seeded` is already set.
///
/// ## Returns
/// `true` when data was written, `false` when the database was already seeded.
pub async fn seed_if_empty(pool: &SqlitePool, today: NaiveDate) -> DbResult<bool> {
    let mut tx = pool.begin().await?;

    if get_value(&mut tx, SEEDED_KEY).await?.is_some() {
        debug!("Database already seeded");
        return Ok(false);
    }

    let machine_ids = insert_machine_types(&mut tx).await?;
    let category_ids = insert_categories(&mut tx).await?;
    let customer_ids = insert_customers(&mut tx).await?;
    let item_ids = insert_items(&mut tx, &category_ids).await?;
    let employee_ids = insert_employees(&mut tx, &machine_ids).await?;
    let jobs = insert_jobs(&mut tx, today, &IdMaps {
        customers: &customer_ids,
        employees: &employee_ids,
        items: &item_ids,
        machines: &machine_ids,
    })
    .await?;

    set_value(&mut tx, SEEDED_KEY, "true").await?;
    tx.commit().await?;

    info!(
        machine_types = machine_ids.len(),
        customers = customer_ids.len(),
        items = item_ids.len(),
        employees = employee_ids.len(),
        jobs,
        "Seeded demo data"
    );
    Ok(true)
}

struct IdMaps<'a> {
    customers: &'a [i64],
    employees: &'a [i64],
    items: &'a [i64],
    machines: &'a [i64],
}

/// Looks up a row id by its position in a master table.
fn id_at(ids: &[i64], index: usize, what: &str) -> DbResult<i64> {
    ids.get(index)
        .copied()
        .ok_or_else(|| DbError::Internal(format!("demo {what} #{index} missing")))
}

async fn insert_machine_types(conn: &mut SqliteConnection) -> DbResult<Vec<i64>> {
    let now = Utc::now();
    let mut ids = Vec::with_capacity(MACHINE_TYPES.len());

    for (name, model, description, fields) in MACHINE_TYPES {
        let fields: Vec<FieldDescriptor> = fields
            .iter()
            .map(|(name, label, field_type, required)| {
                FieldDescriptor::new(name, label, *field_type, *required)
            })
            .collect();

        let id: i64 = sqlx::query_scalar(
            r#"
            INSERT INTO machine_types (name, model, description, custom_fields_schema, created_at)
            VALUES (?, ?, ?, ?, ?)
            RETURNING id
            "#,
        )
        .bind(*name)
        .bind(*model)
        .bind(*description)
        .bind(schema_to_json(&fields)?)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;
        ids.push(id);
    }

    Ok(ids)
}

async fn insert_categories(conn: &mut SqliteConnection) -> DbResult<Vec<i64>> {
    let now = Utc::now();
    let mut ids = Vec::with_capacity(CATEGORIES.len());

    for name in CATEGORIES {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO item_categories (name, created_at) VALUES (?, ?) RETURNING id",
        )
        .bind(*name)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;
        ids.push(id);
    }

    Ok(ids)
}

async fn insert_customers(conn: &mut SqliteConnection) -> DbResult<Vec<i64>> {
    let now = Utc::now();
    let mut ids = Vec::with_capacity(CUSTOMERS.len());

    for (name, phone, address) in CUSTOMERS {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO customers (name, phone, address, created_at) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(*name)
        .bind(*phone)
        .bind(*address)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;
        ids.push(id);
    }

    Ok(ids)
}

async fn insert_items(conn: &mut SqliteConnection, category_ids: &[i64]) -> DbResult<Vec<i64>> {
    let now = Utc::now();
    let mut ids = Vec::with_capacity(ITEMS.len());

    for (name, category, size) in ITEMS {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO items (name, category_id, size, created_at) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(*name)
        .bind(id_at(category_ids, *category, "category")?)
        .bind(*size)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;
        ids.push(id);
    }

    Ok(ids)
}

async fn insert_employees(conn: &mut SqliteConnection, machine_ids: &[i64]) -> DbResult<Vec<i64>> {
    let now = Utc::now();
    let mut ids = Vec::with_capacity(EMPLOYEES.len());

    for (name, phone, machine) in EMPLOYEES {
        let id: i64 = sqlx::query_scalar(
            "INSERT INTO employees (name, phone, machine_type_id, created_at) VALUES (?, ?, ?, ?) RETURNING id",
        )
        .bind(*name)
        .bind(*phone)
        .bind(id_at(machine_ids, *machine, "machine type")?)
        .bind(now)
        .fetch_one(&mut *conn)
        .await?;
        ids.push(id);
    }

    Ok(ids)
}

async fn insert_jobs(
    conn: &mut SqliteConnection,
    today: NaiveDate,
    ids: &IdMaps<'_>,
) -> DbResult<usize> {
    let mut per_date: HashMap<NaiveDate, u32> = HashMap::new();

    for seed in JOBS {
        let date = today - Duration::days(seed.days_ago);
        let seq = per_date.entry(date).or_insert(0);
        *seq += 1;

        let input = JobInput {
            date,
            customer_id: id_at(ids.customers, seed.customer, "customer")?,
            employee_id: Some(id_at(ids.employees, seed.employee, "employee")?),
            item_id: id_at(ids.items, seed.item, "item")?,
            quantity: seed.quantity,
            rate_paise: seed.rate_paise,
            waste_percentage_bps: seed.waste_bps,
            cooly_paise: seed.cooly_paise,
            notes: Some(seed.notes.to_string()),
            status: Some(seed.status),
        };
        let entry = MachineEntryInput {
            machine_type_id: id_at(ids.machines, seed.machine, "machine type")?,
            custom_data: parse_custom_data(seed.custom_data)?,
            cost_paise: seed.machine_cost_paise,
            waste_percentage_bps: seed.machine_waste_bps,
            waste_amount_paise: None,
        };

        insert_job(conn, &input, &[entry], &format_job_number(date, *seq)).await?;
    }

    Ok(JOBS.len())
}

fn parse_custom_data(json: &str) -> DbResult<Map<String, Value>> {
    serde_json::from_str(json).map_err(|e| DbError::Internal(format!("demo custom data: {e}")))
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use jobcost_core::fields::validate_custom_data;
    use jobcost_core::JobFilter;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 25).unwrap()
    }

    #[test]
    fn test_demo_custom_data_matches_schemas() {
        for seed in JOBS {
            let (_, _, _, fields) = MACHINE_TYPES[seed.machine];
            let schema: Vec<FieldDescriptor> = fields
                .iter()
                .map(|(n, l, t, r)| FieldDescriptor::new(n, l, *t, *r))
                .collect();
            let data = parse_custom_data(seed.custom_data).unwrap();
            validate_custom_data(&schema, &data).unwrap();
        }
    }

    #[tokio::test]
    async fn test_seed_once() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();

        assert!(db.seed_if_empty(today()).await.unwrap());
        assert!(!db.seed_if_empty(today()).await.unwrap());
        assert!(db.meta().is_seeded().await.unwrap());

        assert_eq!(db.machine_types().list().await.unwrap().len(), 7);
        assert_eq!(db.categories().list().await.unwrap().len(), 4);
        assert_eq!(db.customers().list().await.unwrap().len(), 6);
        assert_eq!(db.employees().list().await.unwrap().len(), 8);
        assert_eq!(db.items().list().await.unwrap().len(), 10);

        let jobs = db.jobs().list(&JobFilter::default()).await.unwrap();
        assert_eq!(jobs.len(), JOBS.len());
        assert_eq!(jobs[0].job.date, today());
        assert!(jobs
            .iter()
            .all(|j| j.job.date >= today() - Duration::days(20)));
    }

    #[tokio::test]
    async fn test_seeded_jobs_are_consistent() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.seed_if_empty(today()).await.unwrap();

        let todays = db
            .jobs()
            .list(&JobFilter {
                date_from: Some(today()),
                ..Default::default()
            })
            .await
            .unwrap();
        let mut numbers: Vec<&str> = todays.iter().map(|j| j.job.job_number.as_str()).collect();
        numbers.sort_unstable();
        assert_eq!(
            numbers,
            vec!["JOB-20250125-001", "JOB-20250125-002", "JOB-20250125-003"]
        );

        // First demo job: 1000 × ₹5, 3% waste, ₹500 cooly, ₹500 cutting at 3%
        let first = todays
            .iter()
            .find(|j| j.job.job_number == "JOB-20250125-001")
            .unwrap();
        assert_eq!(first.customer_name, "Lakshmi Traders");
        assert_eq!(first.job.amount_paise, 500_000);
        assert_eq!(
            first.job.total_amount_paise,
            500_000 + 50_000 + 15_000 + 50_000 + 1_500
        );

        let detail = db.jobs().get_detail(first.job.id).await.unwrap();
        assert_eq!(detail.machine_entries.len(), 1);
        assert_eq!(detail.machine_entries[0].machine_type_name, "Harish");
    }
}
