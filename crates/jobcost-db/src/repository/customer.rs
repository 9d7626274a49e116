//! # Customer Repository
//!
//! CRUD for the customer master. Customers that jobs reference cannot be
//! deleted; SQLite rejects the delete and the caller sees an invalid
//! reference error.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::{DbError, DbResult};
use crate::repository::clean_optional;
use jobcost_core::validation::validate_customer;
use jobcost_core::{Customer, CustomerInput};

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    pool: SqlitePool,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CustomerRepository { pool }
    }

    /// Lists all customers, ordered by name.
    pub async fn list(&self) -> DbResult<Vec<Customer>> {
        let customers = sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, address, created_at FROM customers ORDER BY name COLLATE NOCASE, id",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(customers)
    }

    /// Gets a customer by ID.
    pub async fn get(&self, id: i64) -> DbResult<Customer> {
        sqlx::query_as::<_, Customer>(
            "SELECT id, name, phone, address, created_at FROM customers WHERE id = ?",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("Customer", id))
    }

    /// Creates a customer.
    pub async fn create(&self, input: &CustomerInput) -> DbResult<Customer> {
        validate_customer(input)?;
        debug!(name = %input.name, "Creating customer");

        let customer = sqlx::query_as::<_, Customer>(
            r#"
            INSERT INTO customers (name, phone, address, created_at)
            VALUES (?, ?, ?, ?)
            RETURNING id, name, phone, address, created_at
            "#,
        )
        .bind(input.name.trim())
        .bind(clean_optional(input.phone.as_deref()))
        .bind(clean_optional(input.address.as_deref()))
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        Ok(customer)
    }

    /// Updates a customer.
    pub async fn update(&self, id: i64, input: &CustomerInput) -> DbResult<Customer> {
        validate_customer(input)?;
        debug!(id, "Updating customer");

        let result = sqlx::query("UPDATE customers SET name = ?, phone = ?, address = ? WHERE id = ?")
            .bind(input.name.trim())
            .bind(clean_optional(input.phone.as_deref()))
            .bind(clean_optional(input.address.as_deref()))
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        self.get(id).await
    }

    /// Deletes a customer.
    pub async fn delete(&self, id: i64) -> DbResult<()> {
        debug!(id, "Deleting customer");

        let result = sqlx::query("DELETE FROM customers WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", id));
        }

        Ok(())
    }
}
