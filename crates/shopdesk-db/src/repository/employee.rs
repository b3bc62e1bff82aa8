//! # Employee Repository
//!
//! Staff records of a shop. Deleting an employee leaves their attendance
//! rows in place.

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use super::{generate_id, ts};
use crate::error::{DbError, DbResult};
use shopdesk_core::Employee;

#[derive(Debug, sqlx::FromRow)]
struct EmployeeRow {
    id: String,
    shop_id: String,
    name: String,
    position: String,
    contact: String,
    email: Option<String>,
    address: Option<String>,
    salary_cents: i64,
    joining_date: NaiveDate,
    created_at: DateTime<Utc>,
}

impl From<EmployeeRow> for Employee {
    fn from(row: EmployeeRow) -> Self {
        Employee {
            id: row.id,
            shop_id: row.shop_id,
            name: row.name,
            position: row.position,
            contact: row.contact,
            email: row.email,
            address: row.address,
            salary_cents: row.salary_cents,
            joining_date: row.joining_date,
            created_at: row.created_at,
        }
    }
}

/// Fields supplied when adding an employee.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEmployee {
    pub name: String,
    pub position: String,
    pub contact: String,
    pub email: Option<String>,
    pub address: Option<String>,
    pub salary_cents: i64,
    pub joining_date: NaiveDate,
}

/// Repository for employee database operations.
#[derive(Debug, Clone)]
pub struct EmployeeRepository {
    pool: SqlitePool,
}

impl EmployeeRepository {
    /// Creates a new EmployeeRepository.
    pub fn new(pool: SqlitePool) -> Self {
        EmployeeRepository { pool }
    }

    /// Inserts an employee for `shop_id` and returns the stored record.
    pub async fn insert(&self, shop_id: &str, employee: &NewEmployee) -> DbResult<Employee> {
        debug!(shop_id = %shop_id, name = %employee.name, "Inserting employee");

        let id = generate_id();
        sqlx::query(
            r#"
            INSERT INTO employees (
                id, shop_id, name, position, contact, email, address,
                salary_cents, joining_date, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&id)
        .bind(shop_id)
        .bind(&employee.name)
        .bind(&employee.position)
        .bind(&employee.contact)
        .bind(&employee.email)
        .bind(&employee.address)
        .bind(employee.salary_cents)
        .bind(employee.joining_date)
        .bind(ts(&Utc::now()))
        .execute(&self.pool)
        .await?;

        self.get_by_id(shop_id, &id)
            .await?
            .ok_or_else(|| DbError::not_found("Employee", &id))
    }

    /// Gets an employee by ID within a shop.
    pub async fn get_by_id(&self, shop_id: &str, id: &str) -> DbResult<Option<Employee>> {
        let row = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, shop_id, name, position, contact, email, address,
                   salary_cents, joining_date, created_at
            FROM employees
            WHERE id = ?1 AND shop_id = ?2
            "#,
        )
        .bind(id)
        .bind(shop_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(Employee::from))
    }

    /// Lists the employees of a shop ordered by name.
    pub async fn list_by_shop(&self, shop_id: &str) -> DbResult<Vec<Employee>> {
        let rows = sqlx::query_as::<_, EmployeeRow>(
            r#"
            SELECT id, shop_id, name, position, contact, email, address,
                   salary_cents, joining_date, created_at
            FROM employees
            WHERE shop_id = ?1
            ORDER BY name, created_at
            "#,
        )
        .bind(shop_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Employee::from).collect())
    }

    /// Counts the employees of a shop.
    pub async fn count_by_shop(&self, shop_id: &str) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM employees WHERE shop_id = ?1")
            .bind(shop_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// Deletes an employee. Their attendance rows stay behind and list
    /// without a name.
    ///
    /// ## Returns
    /// * `Ok(())` - Employee removed
    /// * `Err(DbError::NotFound)` - No such employee in this shop
    pub async fn delete(&self, shop_id: &str, id: &str) -> DbResult<()> {
        debug!(shop_id = %shop_id, id = %id, "Deleting employee");

        let result = sqlx::query("DELETE FROM employees WHERE id = ?1 AND shop_id = ?2")
            .bind(id)
            .bind(shop_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Employee", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
