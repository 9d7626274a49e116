//! # Machine Repositories
//!
//! Machine types carry a JSON field schema; machine entries record one use
//! of a machine on a job, with custom data shaped by that schema.
//!
//! ```text
//! machine_types.custom_fields_schema   '[{"name":"rollNo","type":"text",...}]'
//!              │
//!              ▼ validates
//! job_machine_entries.machine_custom_data   '{"rollNo":"R-301"}'
//! ```
//!
//! Adding or removing an entry recomputes the parent job's totals in the
//! same transaction.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};

use super::job::{entries_for_job, insert_entry, machine_schema, recompute_totals, ENTRY_VIEW_SELECT};
use crate::error::{DbError, DbResult};
use crate::repository::clean_optional;
use jobcost_core::fields::{schema_to_json, FieldDescriptor};
use jobcost_core::validation::{validate_machine_entry, validate_machine_type};
use jobcost_core::{MachineEntryInput, MachineEntryView, MachineType, MachineTypeInput};

const MACHINE_TYPE_COLUMNS: &str =
    "id, name, model, description, custom_fields_schema, created_at";

// =============================================================================
// Machine Types
// =============================================================================

/// Repository for machine type database operations.
#[derive(Debug, Clone)]
pub struct MachineTypeRepository {
    pool: SqlitePool,
}

impl MachineTypeRepository {
    /// Creates a new MachineTypeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        MachineTypeRepository { pool }
    }

    /// Lists machine types, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<MachineType>> {
        let sql = format!(
            "SELECT {MACHINE_TYPE_COLUMNS} FROM machine_types ORDER BY name COLLATE NOCASE"
        );
        let machines = sqlx::query_as::<_, MachineType>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(machines)
    }

    pub async fn get(&self, id: i64) -> DbResult<MachineType> {
        let sql = format!("SELECT {MACHINE_TYPE_COLUMNS} FROM machine_types WHERE id = ?");
        sqlx::query_as::<_, MachineType>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Machine type", id))
    }

    /// The parsed custom field schema of a machine type.
    pub async fn get_schema(&self, id: i64) -> DbResult<Vec<FieldDescriptor>> {
        let mut conn = self.pool.acquire().await?;
        machine_schema(&mut conn, id).await
    }

    /// Creates a machine type.
    ///
    /// ## Returns
    /// * `Err(DbError::Invalid)` - Bad name or a malformed field schema
    /// * `Err(DbError::UniqueViolation)` - The name is taken
    pub async fn create(&self, input: &MachineTypeInput) -> DbResult<MachineType> {
        validate_machine_type(input)?;
        let schema = schema_to_json(&input.custom_fields)?;
        debug!(name = %input.name, fields = input.custom_fields.len(), "Creating machine type");

        let result = sqlx::query(
            r#"
            INSERT INTO machine_types (name, model, description, custom_fields_schema, created_at)
            VALUES (?, ?, ?, ?, ?)
            "#,
        )
        .bind(input.name.trim())
        .bind(clean_optional(input.model.as_deref()))
        .bind(clean_optional(input.description.as_deref()))
        .bind(schema)
        .bind(Utc::now())
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_name(e.into(), &input.name))?;

        self.get(result.last_insert_rowid()).await
    }

    /// Updates a machine type and replaces its schema.
    ///
    /// Entries recorded under the old schema keep their custom data as is.
    pub async fn update(&self, id: i64, input: &MachineTypeInput) -> DbResult<MachineType> {
        validate_machine_type(input)?;
        let schema = schema_to_json(&input.custom_fields)?;
        debug!(id, "Updating machine type");

        let result = sqlx::query(
            r#"
            UPDATE machine_types
            SET name = ?, model = ?, description = ?, custom_fields_schema = ?
            WHERE id = ?
            "#,
        )
        .bind(input.name.trim())
        .bind(clean_optional(input.model.as_deref()))
        .bind(clean_optional(input.description.as_deref()))
        .bind(schema)
        .bind(id)
        .execute(&self.pool)
        .await
        .map_err(|e| duplicate_name(e.into(), &input.name))?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Machine type", id));
        }

        self.get(id).await
    }

    /// Deletes a machine type. Fails while job entries reference it;
    /// employees assigned to it lose the assignment.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting machine type");

        let result = sqlx::query("DELETE FROM machine_types WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Machine type", id));
        }

        Ok(())
    }
}

fn duplicate_name(err: DbError, name: &str) -> DbError {
    match err {
        DbError::UniqueViolation { .. } => DbError::duplicate("machine type", name.trim()),
        other => other,
    }
}

// =============================================================================
// Machine Entries
// =============================================================================

/// Repository for single machine entry operations.
///
/// Whole-set replacement goes through [`JobRepository::update`](super::job::JobRepository::update).
#[derive(Debug, Clone)]
pub struct MachineEntryRepository {
    pool: SqlitePool,
}

impl MachineEntryRepository {
    pub fn new(pool: SqlitePool) -> Self {
        MachineEntryRepository { pool }
    }

    /// Entries of a job with their machine type name.
    pub async fn list_by_job(&self, job_id: i64) -> DbResult<Vec<MachineEntryView>> {
        let mut conn = self.pool.acquire().await?;
        entries_for_job(&mut conn, job_id).await
    }

    /// Adds an entry to a job and recomputes the job's totals.
    pub async fn create(&self, job_id: i64, input: &MachineEntryInput) -> DbResult<MachineEntryView> {
        let mut tx = self.pool.begin().await?;

        let schema = machine_schema(&mut tx, input.machine_type_id).await?;
        validate_machine_entry(input, &schema)?;

        let exists: i64 = sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM jobs WHERE id = ?)")
            .bind(job_id)
            .fetch_one(&mut *tx)
            .await?;
        if exists == 0 {
            return Err(DbError::not_found("Job", job_id));
        }

        let id = insert_entry(&mut tx, job_id, input).await?;
        let breakdown = recompute_totals(&mut tx, job_id).await?;

        let sql = format!("{ENTRY_VIEW_SELECT} WHERE me.id = ?");
        let entry = sqlx::query_as::<_, MachineEntryView>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        info!(id, job_id, total = breakdown.grand_total_paise, "Added machine entry");
        Ok(entry)
    }

    /// Removes an entry and recomputes its job's totals.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        let mut tx = self.pool.begin().await?;

        let job_id: i64 = sqlx::query_scalar("SELECT job_id FROM job_machine_entries WHERE id = ?")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or_else(|| DbError::not_found("Machine entry", id))?;

        sqlx::query("DELETE FROM job_machine_entries WHERE id = ?")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        recompute_totals(&mut tx, job_id).await?;

        tx.commit().await?;
        debug!(id, job_id, "Deleted machine entry");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::{date, fixture};
    use jobcost_core::fields::FieldType;
    use jobcost_core::CoreError;

    #[tokio::test]
    async fn test_machine_type_schema_roundtrip() {
        let fx = fixture().await;
        let repo = fx.db.machine_types();

        let schema = repo.get_schema(fx.printing_id).await.unwrap();
        assert_eq!(schema.len(), 2);
        assert_eq!(schema[0].name, "rollNo");
        assert!(schema[1].required);

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|m| m.name).collect();
        assert_eq!(names, vec!["Harish", "Printing"]);

        let err = repo.get_schema(77).await.unwrap_err();
        assert_eq!(err.to_string(), "Machine type 77 not found");
    }

    #[tokio::test]
    async fn test_machine_type_update_and_duplicate() {
        let fx = fixture().await;
        let repo = fx.db.machine_types();

        let updated = repo
            .update(
                fx.cutting_id,
                &MachineTypeInput {
                    name: "Harish".to_string(),
                    model: Some("Cutting Machine".to_string()),
                    description: Some("Paper cutter".to_string()),
                    custom_fields: vec![FieldDescriptor::new("sheets", "Sheets", FieldType::Number, true)],
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.description.as_deref(), Some("Paper cutter"));
        assert_eq!(updated.fields().unwrap()[0].name, "sheets");

        let err = repo
            .create(&MachineTypeInput {
                name: "Printing".to_string(),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_machine_type_in_use_cannot_be_deleted() {
        let fx = fixture().await;
        fx.db
            .jobs()
            .create(&fx.job_input(date(2025, 1, 14)), &[fx.printing_entry(1_000)])
            .await
            .unwrap();

        let err = fx.db.machine_types().delete(fx.printing_id).await.unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_entry_create_and_delete_recompute_job() {
        let fx = fixture().await;
        let job = fx
            .db
            .jobs()
            .create(&fx.job_input(date(2025, 1, 14)), &[])
            .await
            .unwrap();
        let job_id = job.job.job.id;
        let base_total = job.job.job.total_amount_paise;

        let entry = fx
            .db
            .machine_entries()
            .create(job_id, &fx.printing_entry(40_000))
            .await
            .unwrap();
        assert_eq!(entry.machine_type_name, "Printing");
        assert_eq!(entry.machine_model.as_deref(), Some("Printing Machine"));
        assert_eq!(entry.entry.waste_amount_paise, 800);
        assert_eq!(
            entry.entry.custom_data().get("noOfColours"),
            Some(&serde_json::json!(4))
        );

        let after_add = fx.db.jobs().get(job_id).await.unwrap();
        assert_eq!(after_add.job.machine_cost_paise, 40_000);
        assert_eq!(after_add.job.total_amount_paise, base_total + 40_800);

        fx.db.machine_entries().delete(entry.entry.id).await.unwrap();
        let after_delete = fx.db.jobs().get(job_id).await.unwrap();
        assert_eq!(after_delete.job.total_amount_paise, base_total);
        assert!(fx.db.machine_entries().list_by_job(job_id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entry_that_overflows_total_is_rejected() {
        let fx = fixture().await;
        let job = fx
            .db
            .jobs()
            .create(&fx.job_input(date(2025, 1, 14)), &[])
            .await
            .unwrap();
        let job_id = job.job.job.id;

        let err = fx
            .db
            .machine_entries()
            .create(job_id, &fx.printing_entry(i64::MAX))
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DbError::Invalid(CoreError::AmountTooLarge { .. })
        ));

        // Entry and totals rolled back together
        assert!(fx.db.machine_entries().list_by_job(job_id).await.unwrap().is_empty());
        let stored = fx.db.jobs().get(job_id).await.unwrap();
        assert_eq!(stored.job.total_amount_paise, job.job.job.total_amount_paise);
    }

    #[tokio::test]
    async fn test_entry_errors() {
        let fx = fixture().await;

        let err = fx
            .db
            .machine_entries()
            .create(404, &fx.printing_entry(1_000))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Job 404 not found");

        assert!(matches!(
            fx.db.machine_entries().delete(9).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
