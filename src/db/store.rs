//! Employee record persistence.
//!
//! `EmployeeStore` owns every query the service runs against the employees
//! table and translates database outcomes into domain errors. Handlers never
//! touch SQL for employee records directly.

use chrono::Utc;
use thiserror::Error;
use uuid::Uuid;

use super::models::{Employee, EmployeeUpdate, NewEmployee};
use super::DbPool;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Employee not found")]
    NotFound,
    #[error("Employee with this email already exists")]
    DuplicateEmail,
    #[error("{0}")]
    InvalidRecord(String),
    #[error("Storage backend timed out")]
    Unavailable(#[source] sqlx::Error),
    #[error("Database error")]
    Database(#[source] sqlx::Error),
}

impl From<sqlx::Error> for StoreError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::PoolTimedOut) {
            return StoreError::Unavailable(err);
        }

        if let sqlx::Error::Database(ref db_err) = err {
            let msg = db_err.message();
            if msg.contains("UNIQUE constraint failed: employees.email") {
                // Lost the check-then-insert race; same outcome as the
                // pre-check catching it.
                return StoreError::DuplicateEmail;
            }
            if msg.contains("constraint failed") {
                return StoreError::InvalidRecord(
                    "Record violates a storage constraint".to_string(),
                );
            }
        }

        StoreError::Database(err)
    }
}

/// Sort direction for list queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SortOrder::Ascending => "ASC",
            SortOrder::Descending => "DESC",
        }
    }
}

/// Normalized filter/sort/pagination parameters for a list query.
///
/// `sort_column` must be one of the employees table's column names; the query
/// builder in `api::query` only ever produces entries from its fixed table,
/// which is what lets the store splice it into SQL.
#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub department: Option<String>,
    pub position: Option<String>,
    pub sort_column: &'static str,
    pub order: SortOrder,
    pub page: i64,
    pub limit: i64,
    pub skip: i64,
}

/// One page of employees plus the filter-wide totals.
#[derive(Debug)]
pub struct EmployeePage {
    pub employees: Vec<Employee>,
    pub total: i64,
    pub total_pages: i64,
}

#[derive(Clone)]
pub struct EmployeeStore {
    pool: DbPool,
}

impl EmployeeStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    /// Insert a new employee, enforcing email uniqueness.
    pub async fn create(&self, new: NewEmployee) -> Result<Employee, StoreError> {
        let existing: Option<(String,)> = sqlx::query_as("SELECT id FROM employees WHERE email = ?")
            .bind(&new.email)
            .fetch_optional(&self.pool)
            .await?;

        if existing.is_some() {
            return Err(StoreError::DuplicateEmail);
        }

        let id = Uuid::new_v4().to_string();
        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            INSERT INTO employees (id, name, email, position, department, salary, hire_date, is_active, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&new.name)
        .bind(&new.email)
        .bind(&new.position)
        .bind(&new.department)
        .bind(new.salary)
        .bind(&new.hire_date)
        .bind(new.is_active)
        .bind(&now)
        .bind(&now)
        .execute(&self.pool)
        .await?;

        self.get(&id).await
    }

    /// Fetch one page of employees matching the spec, with totals computed
    /// over the whole filter.
    pub async fn list(&self, spec: &QuerySpec) -> Result<EmployeePage, StoreError> {
        let mut conditions = Vec::new();
        if spec.department.is_some() {
            conditions.push("department = ?");
        }
        if spec.position.is_some() {
            conditions.push("position = ?");
        }
        let where_sql = if conditions.is_empty() {
            String::new()
        } else {
            format!(" WHERE {}", conditions.join(" AND "))
        };

        let select_sql = format!(
            "SELECT * FROM employees{} ORDER BY {} {} LIMIT ? OFFSET ?",
            where_sql,
            spec.sort_column,
            spec.order.as_sql()
        );

        let mut query = sqlx::query_as::<_, Employee>(&select_sql);
        if let Some(ref department) = spec.department {
            query = query.bind(department);
        }
        if let Some(ref position) = spec.position {
            query = query.bind(position);
        }
        let employees = query
            .bind(spec.limit)
            .bind(spec.skip)
            .fetch_all(&self.pool)
            .await?;

        let count_sql = format!("SELECT COUNT(*) FROM employees{}", where_sql);
        let mut count_query = sqlx::query_as::<_, (i64,)>(&count_sql);
        if let Some(ref department) = spec.department {
            count_query = count_query.bind(department);
        }
        if let Some(ref position) = spec.position {
            count_query = count_query.bind(position);
        }
        let (total,) = count_query.fetch_one(&self.pool).await?;

        let total_pages = if total == 0 {
            0
        } else {
            (total + spec.limit - 1) / spec.limit
        };

        Ok(EmployeePage {
            employees,
            total,
            total_pages,
        })
    }

    pub async fn get(&self, id: &str) -> Result<Employee, StoreError> {
        sqlx::query_as::<_, Employee>("SELECT * FROM employees WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    /// Apply a partial update. Absent fields keep their stored values.
    pub async fn update(&self, id: &str, update: EmployeeUpdate) -> Result<Employee, StoreError> {
        // Check existence first so a bad id reports NotFound rather than a
        // zero-row update silently succeeding.
        self.get(id).await?;

        let now = Utc::now().to_rfc3339();

        sqlx::query(
            r#"
            UPDATE employees SET
                name = COALESCE(?, name),
                position = COALESCE(?, position),
                department = COALESCE(?, department),
                salary = COALESCE(?, salary),
                hire_date = COALESCE(?, hire_date),
                is_active = COALESCE(?, is_active),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(&update.name)
        .bind(&update.position)
        .bind(&update.department)
        .bind(update.salary)
        .bind(&update.hire_date)
        .bind(update.is_active)
        .bind(&now)
        .bind(id)
        .execute(&self.pool)
        .await?;

        self.get(id).await
    }

    /// Remove an employee, returning the deleted record's snapshot.
    pub async fn delete(&self, id: &str) -> Result<Employee, StoreError> {
        let employee = self.get(id).await?;

        let result = sqlx::query("DELETE FROM employees WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(employee)
    }
}
