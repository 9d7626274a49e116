//! # Employee Repository
//!
//! Operators, each optionally tied to one machine type. Deleting the
//! machine type clears the link (`ON DELETE SET NULL`).

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::clean_optional;
use jobcost_core::validation::validate_employee;
use jobcost_core::{Employee, EmployeeInput};

const EMPLOYEE_SELECT: &str = r#"
    SELECT e.id, e.name, e.phone, e.machine_type_id, m.name AS machine_type_name, e.created_at
    FROM employees e
    LEFT JOIN machine_types m ON m.id = e.machine_type_id
"#;

/// Repository for employee database operations.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    /// Lists employees with their machine type name, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Employee>> {
        let sql = format!("{EMPLOYEE_SELECT} ORDER BY e.name COLLATE NOCASE, e.id");
        let employees = sqlx::query_as::<_, Employee>(&sql)
            .fetch_all(&self.pool)
            .await?;
        Ok(employees)
    }

    pub async fn get(&self, id: i64) -> DbResult<Employee> {
        let sql = format!("{EMPLOYEE_SELECT} WHERE e.id = ?");
        sqlx::query_as::<_, Employee>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("Employee", id))
    }

    pub async fn create(&self, input: &EmployeeInput) -> DbResult<Employee> {
        validate_employee(input)?;
        debug!(name = %input.name, "Creating employee");

        let result = sqlx::query(
            "INSERT INTO employees (name, phone, machine_type_id, created_at) VALUES (?, ?, ?, ?)",
        )
        .bind(input.name.trim())
        .bind(clean_optional(input.phone.as_deref()))
        .bind(input.machine_type_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get(result.last_insert_rowid()).await
    }

    pub async fn update(&self, id: i64, input: &EmployeeInput) -> DbResult<Employee> {
        validate_employee(input)?;
        debug!(id, "Updating employee");

        let result =
            sqlx::query("UPDATE employees SET name = ?, phone = ?, machine_type_id = ? WHERE id = ?")
                .bind(input.name.trim())
                .bind(clean_optional(input.phone.as_deref()))
                .bind(input.machine_type_id)
                .bind(id)
                .execute(&self.pool)
                .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", id));
        }

        self.get(id).await
    }

    /// Deletes an employee. Jobs they worked on keep their history with no
    /// employee attached.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting employee");

        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", id));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::test_support::fixture;

    #[tokio::test]
    async fn test_employee_machine_link() {
        let fx = fixture().await;
        let repo = fx.db.employees();

        let ravi = repo
            .create(&EmployeeInput {
                name: "Ravi".to_string(),
                phone: Some("9000000001".to_string()),
                machine_type_id: Some(fx.printing_id),
            })
            .await
            .unwrap();
        let kumar = repo
            .create(&EmployeeInput {
                name: "Kumar".to_string(),
                phone: None,
                machine_type_id: None,
            })
            .await
            .unwrap();

        assert_eq!(ravi.machine_type_name.as_deref(), Some("Printing"));
        assert_eq!(kumar.machine_type_name, None);

        let names: Vec<String> = repo.list().await.unwrap().into_iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["Kumar", "Ravi"]);

        fx.db.machine_types().delete(fx.printing_id).await.unwrap();
        let ravi = repo.get(ravi.id).await.unwrap();
        assert_eq!(ravi.machine_type_id, None);
    }

    #[tokio::test]
    async fn test_missing_employee() {
        let fx = fixture().await;
        assert!(matches!(
            fx.db.employees().delete(42).await,
            Err(DbError::NotFound { .. })
        ));
    }
}
