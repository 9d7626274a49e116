//! # Job Repository
//!
//! Jobs, their machine entries, the auto-fill lookup and the report queries.
//!
//! ## Job Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Job Write Path                                  │
//! │                                                                         │
//! │  1. VALIDATE                                                           │
//! │     └── validate_job() + each entry against its machine's schema       │
//! │                                                                         │
//! │  2. NUMBER (create only)                                               │
//! │     └── JOB-{date}-{count(date)+1}, probing past numbers in use        │
//! │                                                                         │
//! │  3. CALCULATE                                                          │
//! │     └── costing::calculate() → amount, waste, machine totals, total    │
//! │                                                                         │
//! │  4. WRITE (one transaction)                                            │
//! │     └── INSERT/UPDATE job, replace entries, store derived totals       │
//! │                                                                         │
//! │  A UNIQUE clash on job_number retries steps 2-4, at most 3 attempts.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Derived totals are never read from the caller. Adding or removing a single
//! machine entry (see [`MachineEntryRepository`](super::machine::MachineEntryRepository))
//! goes through [`recompute_totals`] as well.

use chrono::{NaiveDate, Utc};
use std::future::Future;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info, warn};

use crate::error::{DbError, DbResult};
use jobcost_core::costing::{calculate, CostBreakdown, CostInput, MachineCostInput};
use jobcost_core::fields::{self, FieldDescriptor};
use jobcost_core::job_number::format_job_number;
use jobcost_core::money::{Money, Percentage};
use jobcost_core::validation::{validate_job, validate_machine_entry, validate_search_query};
use jobcost_core::{
    AutoFill, JobDetail, JobFilter, JobInput, JobView, MachineEntryInput, MachineEntryView,
    MachineUsage,
};

/// Attempts at inserting a job before a job number clash is reported.
pub const MAX_JOB_NUMBER_ATTEMPTS: u32 = 3;

pub(crate) const JOB_VIEW_SELECT: &str = r#"
    SELECT
        j.*,
        c.name AS customer_name,
        c.phone AS customer_phone,
        c.address AS customer_address,
        i.name AS item_name,
        i.size AS item_size,
        COALESCE(ic.name, '') AS category_name,
        e.name AS employee_name
    FROM jobs j
    JOIN customers c ON c.id = j.customer_id
    JOIN items i ON i.id = j.item_id
    LEFT JOIN item_categories ic ON ic.id = i.category_id
    LEFT JOIN employees e ON e.id = j.employee_id
"#;

pub(crate) const ENTRY_VIEW_SELECT: &str = r#"
    SELECT
        me.*,
        m.name AS machine_type_name,
        m.model AS machine_model
    FROM job_machine_entries me
    JOIN machine_types m ON m.id = me.machine_type_id
"#;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Order {
    NewestFirst,
    OldestFirst,
}

/// Repository for job database operations.
#[derive(Debug, Clone)]
pub struct JobRepository {
    pool: SqlitePool,
}

impl JobRepository {
    /// Creates a new JobRepository.
    pub fn new(pool: SqlitePool) -> Self {
        JobRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists jobs matching `filter`, newest first.
    ///
    /// ## Example
    /// ```rust,ignore
    /// let pending = db.jobs().list(&JobFilter {
    ///     status: Some(JobStatus::Pending),
    ///     search: Some("Lakshmi".into()),
    ///     ..Default::default()
    /// }).await?;
    /// ```
    ///
    /// A search longer than [`MAX_SEARCH_LEN`](jobcost_core::MAX_SEARCH_LEN)
    /// characters is rejected.
    pub async fn list(&self, filter: &JobFilter) -> DbResult<Vec<JobView>> {
        if let Some(search) = filter.search.as_deref() {
            validate_search_query(search)?;
        }
        self.query_views(filter, Order::NewestFirst).await
    }

    async fn query_views(&self, filter: &JobFilter, order: Order) -> DbResult<Vec<JobView>> {
        let mut qb: QueryBuilder<Sqlite> = QueryBuilder::new(JOB_VIEW_SELECT);
        qb.push(" WHERE 1 = 1");

        if let Some(search) = filter
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let pattern = format!("%{}%", search);
            qb.push(" AND (j.job_number LIKE ")
                .push_bind(pattern.clone())
                .push(" OR c.name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR i.name LIKE ")
                .push_bind(pattern)
                .push(")");
        }
        if let Some(status) = filter.status {
            qb.push(" AND j.status = ").push_bind(status);
        }
        if let Some(from) = filter.date_from {
            qb.push(" AND j.date >= ").push_bind(from);
        }
        if let Some(to) = filter.date_to {
            qb.push(" AND j.date <= ").push_bind(to);
        }
        if let Some(customer_id) = filter.customer_id {
            qb.push(" AND j.customer_id = ").push_bind(customer_id);
        }
        if let Some(employee_id) = filter.employee_id {
            qb.push(" AND j.employee_id = ").push_bind(employee_id);
        }
        if let Some(item_id) = filter.item_id {
            qb.push(" AND j.item_id = ").push_bind(item_id);
        }
        if let Some(machine_type_id) = filter.machine_type_id {
            qb.push(
                " AND EXISTS (SELECT 1 FROM job_machine_entries x WHERE x.job_id = j.id AND x.machine_type_id = ",
            )
            .push_bind(machine_type_id)
            .push(")");
        }

        qb.push(match order {
            Order::NewestFirst => " ORDER BY j.date DESC, j.id DESC",
            Order::OldestFirst => " ORDER BY j.date ASC, j.id ASC",
        });

        if let Some(limit) = filter.limit {
            qb.push(" LIMIT ").push_bind(i64::from(limit));
        }

        let jobs = qb.build_query_as::<JobView>().fetch_all(&self.pool).await?;
        debug!(count = jobs.len(), "Job query returned rows");
        Ok(jobs)
    }

    /// Gets one job joined with its display names.
    pub async fn get(&self, id: i64) -> DbResult<JobView> {
        let sql = format!("{JOB_VIEW_SELECT} WHERE j.id = ?");
        sqlx::query_as::<_, JobView>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Job", id))
    }

    /// Gets a job with all of its machine entries.
    pub async fn get_detail(&self, id: i64) -> DbResult<JobDetail> {
        let job = self.get(id).await?;
        let mut conn = self.pool.acquire().await?;
        let machine_entries = entries_for_job(&mut conn, id).await?;
        Ok(JobDetail {
            job,
            machine_entries,
        })
    }

    async fn with_entries(&self, jobs: Vec<JobView>) -> DbResult<Vec<JobDetail>> {
        let mut conn = self.pool.acquire().await?;
        let mut details = Vec::with_capacity(jobs.len());
        for job in jobs {
            let machine_entries = entries_for_job(&mut conn, job.job.id).await?;
            details.push(JobDetail {
                job,
                machine_entries,
            });
        }
        Ok(details)
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Creates a job and its machine entries.
    ///
    /// ## Returns
    /// The stored job with its number and derived totals.
    pub async fn create(
        &self,
        input: &JobInput,
        entries: &[MachineEntryInput],
    ) -> DbResult<JobDetail> {
        validate_job(input)?;

        let (id, job_number) =
            retry_on_job_number_clash(input.date, || self.try_create(input, entries)).await?;

        info!(id, job_number = %job_number, "Created job");
        self.get_detail(id).await
    }

    async fn try_create(
        &self,
        input: &JobInput,
        entries: &[MachineEntryInput],
    ) -> DbResult<(i64, String)> {
        let mut tx = self.pool.begin().await?;

        validate_entries(&mut tx, entries).await?;

        let job_number = next_job_number(&mut tx, input.date).await?;
        let job_id = insert_job(&mut tx, input, entries, &job_number).await?;

        tx.commit().await?;
        Ok((job_id, job_number))
    }

    /// Updates a job.
    ///
    /// `entries` replaces the job's machine entries when given. When `None`,
    /// the stored entries stay and feed the recomputed totals. A missing
    /// `status` keeps the stored status. The job number never changes.
    pub async fn update(
        &self,
        id: i64,
        input: &JobInput,
        entries: Option<&[MachineEntryInput]>,
    ) -> DbResult<JobDetail> {
        validate_job(input)?;
        debug!(id, "Updating job");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE jobs SET
                date = ?,
                customer_id = ?,
                employee_id = ?,
                item_id = ?,
                quantity = ?,
                rate_paise = ?,
                waste_percentage_bps = ?,
                cooly_paise = ?,
                notes = ?,
                status = COALESCE(?, status),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(input.date)
        .bind(input.customer_id)
        .bind(input.employee_id)
        .bind(input.item_id)
        .bind(input.quantity)
        .bind(input.rate_paise)
        .bind(input.waste_percentage_bps)
        .bind(input.cooly_paise)
        .bind(super::clean_optional(input.notes.as_deref()))
        .bind(input.status)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Job", id));
        }

        if let Some(entries) = entries {
            validate_entries(&mut tx, entries).await?;
            sqlx::query("DELETE FROM job_machine_entries WHERE job_id = ?")
                .bind(id)
                .execute(&mut *tx)
                .await?;
            for entry in entries {
                insert_entry(&mut tx, id, entry).await?;
            }
        }

        recompute_totals(&mut tx, id).await?;
        tx.commit().await?;

        self.get_detail(id).await
    }

    /// Deletes a job. Its machine entries go with it.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting job");

        let result = sqlx::query("DELETE FROM jobs WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Job", id));
        }

        Ok(())
    }

    // =========================================================================
    // Auto-fill
    // =========================================================================

    /// The most recent job for a customer and item, with its entries.
    pub async fn latest_for_customer_item(
        &self,
        customer_id: i64,
        item_id: i64,
    ) -> DbResult<Option<JobDetail>> {
        let filter = JobFilter {
            customer_id: Some(customer_id),
            item_id: Some(item_id),
            limit: Some(1),
            ..Default::default()
        };

        match self.list(&filter).await?.into_iter().next() {
            Some(job) => {
                let mut details = self.with_entries(vec![job]).await?;
                Ok(details.pop())
            }
            None => Ok(None),
        }
    }

    /// Form defaults copied from the latest job for a customer and item.
    pub async fn auto_fill(&self, customer_id: i64, item_id: i64) -> DbResult<Option<AutoFill>> {
        let latest = self.latest_for_customer_item(customer_id, item_id).await?;
        if let Some(detail) = &latest {
            debug!(source = %detail.job.job.job_number, "Auto-fill source found");
        }
        Ok(latest.as_ref().map(AutoFill::from))
    }

    // =========================================================================
    // Report Queries
    // =========================================================================

    /// Jobs dated within `from..=to`, oldest first, optionally for one customer.
    pub async fn for_report(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        customer_id: Option<i64>,
    ) -> DbResult<Vec<JobView>> {
        let filter = JobFilter {
            date_from: Some(from),
            date_to: Some(to),
            customer_id,
            ..Default::default()
        };
        self.query_views(&filter, Order::OldestFirst).await
    }

    /// [`for_report`](Self::for_report) with each job's machine entries.
    pub async fn details_for_report(
        &self,
        from: NaiveDate,
        to: NaiveDate,
        customer_id: Option<i64>,
    ) -> DbResult<Vec<JobDetail>> {
        let jobs = self.for_report(from, to, customer_id).await?;
        self.with_entries(jobs).await
    }

    /// A customer's jobs, newest first.
    pub async fn by_customer(
        &self,
        customer_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DbResult<Vec<JobView>> {
        let filter = JobFilter {
            customer_id: Some(customer_id),
            date_from: from,
            date_to: to,
            ..Default::default()
        };
        self.list(&filter).await
    }

    /// An employee's jobs, newest first.
    pub async fn by_employee(
        &self,
        employee_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DbResult<Vec<JobView>> {
        let filter = JobFilter {
            employee_id: Some(employee_id),
            date_from: from,
            date_to: to,
            ..Default::default()
        };
        self.list(&filter).await
    }

    /// Every use of a machine type, newest job first.
    pub async fn by_machine(
        &self,
        machine_type_id: i64,
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    ) -> DbResult<Vec<MachineUsage>> {
        let filter = JobFilter {
            machine_type_id: Some(machine_type_id),
            date_from: from,
            date_to: to,
            ..Default::default()
        };
        let details = self.with_entries(self.list(&filter).await?).await?;

        let usages = details
            .into_iter()
            .flat_map(|detail| {
                let job = detail.job;
                detail
                    .machine_entries
                    .into_iter()
                    .filter(|e| e.entry.machine_type_id == machine_type_id)
                    .map(move |entry| MachineUsage {
                        job: job.clone(),
                        entry,
                    })
            })
            .collect();

        Ok(usages)
    }
}

// =============================================================================
// Connection-level helpers (shared with the machine entry repository)
// =============================================================================

/// Runs `attempt_create` until it succeeds, fails for another reason, or
/// has clashed on `jobs.job_number` [`MAX_JOB_NUMBER_ATTEMPTS`] times.
///
/// Each attempt must run in its own transaction so it picks a fresh number.
async fn retry_on_job_number_clash<T, F, Fut>(date: NaiveDate, mut attempt_create: F) -> DbResult<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = DbResult<T>>,
{
    let mut attempt = 1;
    loop {
        match attempt_create().await {
            Err(err)
                if err.is_unique_violation_on("jobs.job_number")
                    && attempt < MAX_JOB_NUMBER_ATTEMPTS =>
            {
                warn!(attempt, date = %date, "Job number already taken, retrying");
                attempt += 1;
            }
            result => return result,
        }
    }
}

/// Picks the next free job number for `date`.
async fn next_job_number(conn: &mut SqliteConnection, date: NaiveDate) -> DbResult<String> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs WHERE date = ?")
        .bind(date)
        .fetch_one(&mut *conn)
        .await?;

    let mut seq = u32::try_from(count + 1).map_err(|e| DbError::Internal(e.to_string()))?;
    loop {
        let candidate = format_job_number(date, seq);
        let taken: i64 =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM jobs WHERE job_number = ?)")
                .bind(&candidate)
                .fetch_one(&mut *conn)
                .await?;
        if taken == 0 {
            return Ok(candidate);
        }
        debug!(candidate = %candidate, "Job number in use, probing forward");
        seq += 1;
    }
}

/// Machine entries of a job, in entry order.
pub(crate) async fn entries_for_job(
    conn: &mut SqliteConnection,
    job_id: i64,
) -> DbResult<Vec<MachineEntryView>> {
    let sql = format!("{ENTRY_VIEW_SELECT} WHERE me.job_id = ? ORDER BY me.id");
    let entries = sqlx::query_as::<_, MachineEntryView>(&sql)
        .bind(job_id)
        .fetch_all(&mut *conn)
        .await?;
    Ok(entries)
}

/// Parsed custom fields of a machine type.
pub(crate) async fn machine_schema(
    conn: &mut SqliteConnection,
    machine_type_id: i64,
) -> DbResult<Vec<FieldDescriptor>> {
    let schema: Option<String> =
        sqlx::query_scalar("SELECT custom_fields_schema FROM machine_types WHERE id = ?")
            .bind(machine_type_id)
            .fetch_optional(&mut *conn)
            .await?;

    let schema = schema.ok_or_else(|| DbError::not_found("Machine type", machine_type_id))?;
    Ok(fields::parse_schema(&schema)?)
}

async fn validate_entries(
    conn: &mut SqliteConnection,
    entries: &[MachineEntryInput],
) -> DbResult<()> {
    for entry in entries {
        let schema = machine_schema(conn, entry.machine_type_id).await?;
        validate_machine_entry(entry, &schema)?;
    }
    Ok(())
}

/// Inserts a job under `job_number` with calculated totals, then its entries.
///
/// Entries must already be validated.
pub(crate) async fn insert_job(
    conn: &mut SqliteConnection,
    input: &JobInput,
    entries: &[MachineEntryInput],
    job_number: &str,
) -> DbResult<i64> {
    let breakdown = calculate(&CostInput::for_job(input, entries))?;
    let now = Utc::now();

    debug!(job_number, total = breakdown.grand_total_paise, "Inserting job");

    let result = sqlx::query(
        r#"
        INSERT INTO jobs (
            job_number, date, customer_id, employee_id, item_id,
            quantity, rate_paise, amount_paise,
            waste_percentage_bps, waste_amount_paise, cooly_paise,
            machine_cost_paise, machine_waste_paise, total_amount_paise,
            notes, status, created_at, updated_at
        ) VALUES (
            ?, ?, ?, ?, ?,
            ?, ?, ?,
            ?, ?, ?,
            ?, ?, ?,
            ?, ?, ?, ?
        )
        "#,
    )
    .bind(job_number)
    .bind(input.date)
    .bind(input.customer_id)
    .bind(input.employee_id)
    .bind(input.item_id)
    .bind(input.quantity)
    .bind(input.rate_paise)
    .bind(breakdown.amount_paise)
    .bind(input.waste_percentage_bps)
    .bind(breakdown.waste_amount_paise)
    .bind(breakdown.cooly_paise)
    .bind(breakdown.machine_cost_paise)
    .bind(breakdown.machine_waste_paise)
    .bind(breakdown.grand_total_paise)
    .bind(super::clean_optional(input.notes.as_deref()))
    .bind(input.status_or_default())
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let job_id = result.last_insert_rowid();
    for entry in entries {
        insert_entry(conn, job_id, entry).await?;
    }

    Ok(job_id)
}

/// Inserts one entry with its waste resolved to an amount.
pub(crate) async fn insert_entry(
    conn: &mut SqliteConnection,
    job_id: i64,
    entry: &MachineEntryInput,
) -> DbResult<i64> {
    let waste = MachineCostInput::from(entry).resolved_waste();
    let custom_data = serde_json::Value::Object(entry.custom_data.clone()).to_string();

    let result = sqlx::query(
        r#"
        INSERT INTO job_machine_entries (
            job_id, machine_type_id, machine_custom_data,
            cost_paise, waste_percentage_bps, waste_amount_paise, created_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(job_id)
    .bind(entry.machine_type_id)
    .bind(custom_data)
    .bind(entry.cost_paise)
    .bind(entry.waste_percentage_bps)
    .bind(waste.paise())
    .bind(Utc::now())
    .execute(&mut *conn)
    .await?;

    Ok(result.last_insert_rowid())
}

/// Recalculates and stores a job's derived totals from its stored inputs
/// and entries.
pub(crate) async fn recompute_totals(
    conn: &mut SqliteConnection,
    job_id: i64,
) -> DbResult<CostBreakdown> {
    let (quantity, rate_paise, waste_bps, cooly_paise): (i64, i64, u32, i64) = sqlx::query_as(
        "SELECT quantity, rate_paise, waste_percentage_bps, cooly_paise FROM jobs WHERE id = ?",
    )
    .bind(job_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DbError::not_found("Job", job_id))?;

    let machines: Vec<(i64, u32, i64)> = sqlx::query_as(
        "SELECT cost_paise, waste_percentage_bps, waste_amount_paise FROM job_machine_entries WHERE job_id = ? ORDER BY id",
    )
    .bind(job_id)
    .fetch_all(&mut *conn)
    .await?;

    let breakdown = calculate(&CostInput {
        quantity,
        rate: Money::from_paise(rate_paise),
        waste_percentage: Percentage::from_bps(waste_bps),
        cooly: Money::from_paise(cooly_paise),
        machines: machines
            .into_iter()
            .map(|(cost, bps, waste)| MachineCostInput {
                cost: Money::from_paise(cost),
                waste_percentage: Percentage::from_bps(bps),
                waste_amount: Some(Money::from_paise(waste)),
            })
            .collect(),
    })?;

    sqlx::query(
        r#"
        UPDATE jobs SET
            amount_paise = ?,
            waste_amount_paise = ?,
            machine_cost_paise = ?,
            machine_waste_paise = ?,
            total_amount_paise = ?,
            updated_at = ?
        WHERE id = ?
        "#,
    )
    .bind(breakdown.amount_paise)
    .bind(breakdown.waste_amount_paise)
    .bind(breakdown.machine_cost_paise)
    .bind(breakdown.machine_waste_paise)
    .bind(breakdown.grand_total_paise)
    .bind(Utc::now())
    .bind(job_id)
    .execute(&mut *conn)
    .await?;

    debug!(job_id, total = breakdown.grand_total_paise, "Recomputed job totals");
    Ok(breakdown)
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{date, fixture};
    use jobcost_core::job_number::parse_job_number;
    use jobcost_core::{CoreError, EmployeeInput, JobStatus, MAX_JOB_TOTAL_PAISE};

    #[tokio::test]
    async fn test_job_numbers_are_contiguous_per_date() {
        let fx = fixture().await;
        let repo = fx.db.jobs();
        let day = date(2025, 1, 14);

        let mut numbers = Vec::new();
        for _ in 0..3 {
            numbers.push(repo.create(&fx.job_input(day), &[]).await.unwrap().job.job.job_number);
        }
        let other_day = repo
            .create(&fx.job_input(date(2025, 1, 15)), &[])
            .await
            .unwrap();

        assert_eq!(
            numbers,
            vec!["JOB-20250114-001", "JOB-20250114-002", "JOB-20250114-003"]
        );
        assert_eq!(other_day.job.job.job_number, "JOB-20250115-001");
        for number in &numbers {
            assert_eq!(parse_job_number(number).unwrap().0, day);
        }
    }

    #[tokio::test]
    async fn test_job_number_skips_gap_left_by_delete() {
        let fx = fixture().await;
        let repo = fx.db.jobs();
        let day = date(2025, 2, 1);

        let first = repo.create(&fx.job_input(day), &[]).await.unwrap();
        repo.create(&fx.job_input(day), &[]).await.unwrap();
        repo.delete(first.job.job.id).await.unwrap();

        // count = 1 → "002" exists → skip to "003"
        let next = repo.create(&fx.job_input(day), &[]).await.unwrap();
        assert_eq!(next.job.job.job_number, "JOB-20250201-003");
    }

    fn job_number_clash() -> DbError {
        DbError::duplicate("jobs.job_number", "JOB-20250114-001")
    }

    #[tokio::test]
    async fn test_job_number_clash_is_retried() {
        let mut calls = 0;
        let result = retry_on_job_number_clash(date(2025, 1, 14), || {
            calls += 1;
            let call = calls;
            async move {
                if call < MAX_JOB_NUMBER_ATTEMPTS {
                    Err(job_number_clash())
                } else {
                    Ok(call)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), MAX_JOB_NUMBER_ATTEMPTS);
        assert_eq!(calls, MAX_JOB_NUMBER_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_job_number_clash_surfaces_after_max_attempts() {
        let mut calls = 0;
        let result: DbResult<()> = retry_on_job_number_clash(date(2025, 1, 14), || {
            calls += 1;
            async { Err(job_number_clash()) }
        })
        .await;

        assert!(result.unwrap_err().is_unique_violation_on("jobs.job_number"));
        assert_eq!(calls, MAX_JOB_NUMBER_ATTEMPTS);
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let mut calls = 0;
        let result: DbResult<()> = retry_on_job_number_clash(date(2025, 1, 14), || {
            calls += 1;
            async { Err(DbError::duplicate("categories.name", "Cut Sheets")) }
        })
        .await;

        assert!(matches!(result, Err(DbError::UniqueViolation { .. })));
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_create_reports_persistent_job_number_clash() {
        let fx = fixture().await;
        sqlx::query(
            r#"
            CREATE TRIGGER jobs_number_clash BEFORE INSERT ON jobs
            BEGIN
                SELECT RAISE(ABORT, 'UNIQUE constraint failed: jobs.job_number');
            END
            "#,
        )
        .execute(fx.db.pool())
        .await
        .unwrap();

        let err = fx
            .db
            .jobs()
            .create(&fx.job_input(date(2025, 1, 14)), &[fx.printing_entry(1_000)])
            .await
            .unwrap_err();
        assert!(err.is_unique_violation_on("jobs.job_number"));

        sqlx::query("DROP TRIGGER jobs_number_clash")
            .execute(fx.db.pool())
            .await
            .unwrap();
        assert!(fx.db.jobs().list(&JobFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_create_rejects_amount_overflow() {
        let fx = fixture().await;
        let mut input = fx.job_input(date(2025, 1, 14));
        input.quantity = 100_000_000_000;
        input.rate_paise = 100_000_000_000;

        let err = fx.db.jobs().create(&input, &[]).await.unwrap_err();
        assert!(matches!(
            err,
            DbError::Invalid(CoreError::AmountTooLarge { .. })
        ));
        assert!(fx.db.jobs().list(&JobFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_rejects_total_above_limit() {
        let fx = fixture().await;
        let repo = fx.db.jobs();
        let created = repo
            .create(&fx.job_input(date(2025, 1, 14)), &[])
            .await
            .unwrap();

        let mut input = fx.job_input(date(2025, 1, 14));
        input.quantity = 1;
        input.rate_paise = MAX_JOB_TOTAL_PAISE;
        let err = repo
            .update(created.job.job.id, &input, None)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Invalid(CoreError::AmountTooLarge { .. })
        ));

        // Rolled back: the stored job is untouched
        let stored = repo.get(created.job.job.id).await.unwrap();
        assert_eq!(stored.job.quantity, 1000);
        assert_eq!(stored.job.total_amount_paise, created.job.job.total_amount_paise);
    }

    #[tokio::test]
    async fn test_create_stores_calculated_totals() {
        let fx = fixture().await;
        let mut cutting = fx.printing_entry(0);
        cutting.machine_type_id = fx.cutting_id;
        cutting.cost_paise = 10_000;
        cutting.waste_amount_paise = Some(750);

        let detail = fx
            .db
            .jobs()
            .create(
                &fx.job_input(date(2025, 1, 14)),
                &[fx.printing_entry(40_000), cutting],
            )
            .await
            .unwrap();
        let job = &detail.job.job;

        assert_eq!(job.amount_paise, 500_000);
        assert_eq!(job.waste_amount_paise, 15_000);
        assert_eq!(job.machine_cost_paise, 50_000);
        // 2% of ₹400 = ₹8, plus the entered ₹7.50
        assert_eq!(job.machine_waste_paise, 800 + 750);
        assert_eq!(
            job.total_amount_paise,
            500_000 + 50_000 + 15_000 + 50_000 + 1_550
        );
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(detail.job.customer_name, "Lakshmi Traders");
        assert_eq!(detail.job.category_name, "Cut Sheets");
        assert_eq!(detail.machine_entries.len(), 2);
        assert_eq!(detail.machine_entries[0].machine_type_name, "Printing");
        assert_eq!(detail.machine_entries[1].entry.waste_amount_paise, 750);
    }

    #[tokio::test]
    async fn test_create_rejects_invalid_entries() {
        let fx = fixture().await;
        let mut entry = fx.printing_entry(1_000);
        entry.custom_data.remove("rollNo");

        let err = fx
            .db
            .jobs()
            .create(&fx.job_input(date(2025, 1, 14)), &[entry])
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Invalid(_)));

        let mut unknown = fx.printing_entry(1_000);
        unknown.machine_type_id = 999;
        let err = fx
            .db
            .jobs()
            .create(&fx.job_input(date(2025, 1, 14)), &[unknown])
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Machine type 999 not found");

        // Nothing was written
        assert!(fx.db.jobs().list(&JobFilter::default()).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_recomputes_and_replaces_entries() {
        let fx = fixture().await;
        let repo = fx.db.jobs();
        let created = repo
            .create(&fx.job_input(date(2025, 1, 14)), &[fx.printing_entry(40_000)])
            .await
            .unwrap();
        let id = created.job.job.id;

        // Keep entries, change quantity
        let mut input = fx.job_input(date(2025, 1, 14));
        input.quantity = 2000;
        input.status = Some(JobStatus::Completed);
        let updated = repo.update(id, &input, None).await.unwrap();
        assert_eq!(updated.job.job.amount_paise, 1_000_000);
        assert_eq!(updated.job.job.machine_cost_paise, 40_000);
        assert_eq!(updated.job.job.status, JobStatus::Completed);
        assert_eq!(updated.job.job.job_number, created.job.job.job_number);

        // Omitted status keeps the stored one; empty entries clear machines
        input.status = None;
        let cleared = repo.update(id, &input, Some(&[])).await.unwrap();
        assert!(cleared.machine_entries.is_empty());
        assert_eq!(cleared.job.job.machine_cost_paise, 0);
        assert_eq!(cleared.job.job.status, JobStatus::Completed);
        assert_eq!(
            cleared.job.job.total_amount_paise,
            1_000_000 + 50_000 + 30_000
        );
    }

    #[tokio::test]
    async fn test_list_filters() {
        let fx = fixture().await;
        let repo = fx.db.jobs();
        let ravi = fx
            .db
            .employees()
            .create(&EmployeeInput {
                name: "Ravi".to_string(),
                phone: None,
                machine_type_id: Some(fx.printing_id),
            })
            .await
            .unwrap();

        let mut with_employee = fx.job_input(date(2025, 1, 10));
        with_employee.employee_id = Some(ravi.id);
        with_employee.status = Some(JobStatus::Completed);
        repo.create(&with_employee, &[fx.printing_entry(1_000)])
            .await
            .unwrap();
        repo.create(&fx.job_input(date(2025, 1, 20)), &[])
            .await
            .unwrap();

        let all = repo.list(&JobFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].job.date, date(2025, 1, 20));

        let by_status = repo
            .list(&JobFilter {
                status: Some(JobStatus::Completed),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_status.len(), 1);
        assert_eq!(by_status[0].employee_name.as_deref(), Some("Ravi"));

        let by_search = repo
            .list(&JobFilter {
                search: Some("lakshmi".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_search.len(), 2);

        let by_number = repo
            .list(&JobFilter {
                search: Some("20250120".to_string()),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_number.len(), 1);

        let by_range = repo
            .list(&JobFilter {
                date_from: Some(date(2025, 1, 15)),
                date_to: Some(date(2025, 1, 31)),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_range.len(), 1);

        let by_machine = repo
            .list(&JobFilter {
                machine_type_id: Some(fx.printing_id),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(by_machine.len(), 1);

        assert_eq!(repo.by_employee(ravi.id, None, None).await.unwrap().len(), 1);
        assert_eq!(
            repo.by_customer(fx.customer_id, Some(date(2025, 1, 1)), None)
                .await
                .unwrap()
                .len(),
            2
        );

        let limited = repo
            .list(&JobFilter {
                limit: Some(1),
                ..Default::default()
            })
            .await
            .unwrap();
        assert_eq!(limited.len(), 1);

        let too_long = repo
            .list(&JobFilter {
                search: Some("x".repeat(jobcost_core::MAX_SEARCH_LEN + 1)),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert_eq!(too_long.to_string(), "Search must be at most 100 characters");
    }

    #[tokio::test]
    async fn test_auto_fill_none_without_history() {
        let fx = fixture().await;
        assert!(fx
            .db
            .jobs()
            .auto_fill(fx.customer_id, fx.item_id)
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_auto_fill_copies_latest_job() {
        let fx = fixture().await;
        let repo = fx.db.jobs();

        let mut older = fx.job_input(date(2025, 1, 10));
        older.quantity = 500;
        repo.create(&older, &[]).await.unwrap();

        let mut latest = fx.job_input(date(2025, 1, 12));
        latest.quantity = 3000;
        latest.rate_paise = 115;
        latest.status = Some(JobStatus::Completed);
        let latest = repo
            .create(&latest, &[fx.printing_entry(40_000)])
            .await
            .unwrap();

        let fill = repo
            .auto_fill(fx.customer_id, fx.item_id)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(fill.source_job_id, latest.job.job.id);
        assert_eq!(fill.quantity, 3000);
        assert_eq!(fill.rate_paise, 115);
        assert_eq!(fill.waste_percentage_bps, 300);
        assert_eq!(fill.cooly_paise, 50_000);
        assert_eq!(fill.machine_entries.len(), 1);
        assert_eq!(fill.machine_entries[0].machine_type_id, fx.printing_id);
        assert_eq!(fill.machine_entries[0].cost_paise, 40_000);
        assert_eq!(
            fill.machine_entries[0].custom_data.get("rollNo"),
            Some(&serde_json::json!("R-301"))
        );
    }

    #[tokio::test]
    async fn test_auto_fill_keeps_entered_machine_waste() {
        let fx = fixture().await;
        let repo = fx.db.jobs();

        // 2% of ₹100 would be ₹2, but ₹7.50 was entered directly.
        let mut entry = fx.printing_entry(10_000);
        entry.waste_amount_paise = Some(750);
        let source = repo
            .create(&fx.job_input(date(2025, 1, 12)), &[entry])
            .await
            .unwrap();
        assert_eq!(source.machine_entries[0].entry.waste_amount_paise, 750);

        let fill = repo
            .auto_fill(fx.customer_id, fx.item_id)
            .await
            .unwrap()
            .unwrap();
        let copied = &fill.machine_entries[0];
        assert_eq!(copied.cost_paise, 10_000);
        assert_eq!(copied.waste_percentage_bps, 200);
        assert_eq!(copied.waste_amount_paise, Some(750));

        // Saving the suggestion reproduces the source job's totals.
        let mut input = fx.job_input(date(2025, 1, 20));
        input.quantity = fill.quantity;
        input.rate_paise = fill.rate_paise;
        input.waste_percentage_bps = fill.waste_percentage_bps;
        input.cooly_paise = fill.cooly_paise;
        let copy = repo.create(&input, &fill.machine_entries).await.unwrap();
        assert_eq!(copy.job.job.machine_waste_paise, 750);
        assert_eq!(
            copy.job.job.total_amount_paise,
            source.job.job.total_amount_paise
        );
    }

    #[tokio::test]
    async fn test_report_queries() {
        let fx = fixture().await;
        let repo = fx.db.jobs();
        repo.create(&fx.job_input(date(2025, 1, 20)), &[fx.printing_entry(1_000)])
            .await
            .unwrap();
        repo.create(&fx.job_input(date(2025, 1, 5)), &[])
            .await
            .unwrap();
        repo.create(&fx.job_input(date(2025, 2, 5)), &[])
            .await
            .unwrap();

        let january = repo
            .for_report(date(2025, 1, 1), date(2025, 1, 31), None)
            .await
            .unwrap();
        assert_eq!(january.len(), 2);
        assert_eq!(january[0].job.date, date(2025, 1, 5));

        let details = repo
            .details_for_report(date(2025, 1, 1), date(2025, 1, 31), Some(fx.customer_id))
            .await
            .unwrap();
        assert_eq!(details[1].machine_entries.len(), 1);

        let usages = repo.by_machine(fx.printing_id, None, None).await.unwrap();
        assert_eq!(usages.len(), 1);
        assert_eq!(usages[0].job.job.date, date(2025, 1, 20));
    }

    #[tokio::test]
    async fn test_delete_cascades_entries() {
        let fx = fixture().await;
        let detail = fx
            .db
            .jobs()
            .create(&fx.job_input(date(2025, 1, 14)), &[fx.printing_entry(1_000)])
            .await
            .unwrap();

        fx.db.jobs().delete(detail.job.job.id).await.unwrap();
        assert!(fx
            .db
            .machine_entries()
            .list_by_job(detail.job.job.id)
            .await
            .unwrap()
            .is_empty());
        assert!(matches!(
            fx.db.jobs().delete(detail.job.job.id).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
