//! Record store seam.
//!
//! Handlers and the reconciliation/status engines talk to persistence only
//! through [`RecordStore`]. `PgRecordStore` is the production implementation
//! on top of diesel; `MemoryRecordStore` keeps the same contract in process
//! and backs the test suites.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::shared::models::{Company, Employee};

pub use memory::MemoryRecordStore;
pub use postgres::PgRecordStore;

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Connection error: {0}")]
    Connection(String),
    #[error("Query error: {0}")]
    Query(String),
    #[error("Duplicate key: {0}")]
    Conflict(String),
    #[error("Blocking task failed: {0}")]
    Join(String),
}

impl From<diesel::result::Error> for StoreError {
    fn from(err: diesel::result::Error) -> Self {
        use diesel::result::{DatabaseErrorKind, Error};
        match err {
            Error::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
                Self::Conflict(info.message().to_string())
            }
            other => Self::Query(other.to_string()),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Mutable employee attributes. Missing input values are stored as "".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EmployeeFields {
    pub name: String,
    pub dept: String,
    pub phone: String,
    pub email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

/// The most recent recording of an employee joined with its motion type.
#[derive(Debug, Clone, PartialEq)]
pub struct LatestRecording {
    pub employee_id: Uuid,
    pub employee_name: String,
    pub motion_name: String,
    pub score: f64,
    pub recorded_at: DateTime<Utc>,
}

#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn create_company(
        &self,
        biz_no: &str,
        name: &str,
        password_hash: &str,
    ) -> StoreResult<Company>;

    async fn find_company_by_biz_no(&self, biz_no: &str) -> StoreResult<Option<Company>>;

    async fn get_company(&self, company_id: Uuid) -> StoreResult<Option<Company>>;

    /// Creates or overwrites the employee keyed by (company_id, emp_no).
    async fn upsert_employee(
        &self,
        company_id: Uuid,
        emp_no: &str,
        fields: EmployeeFields,
    ) -> StoreResult<(Employee, UpsertOutcome)>;

    async fn list_employees(&self, company_id: Uuid) -> StoreResult<Vec<Employee>>;

    async fn get_employee(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
    ) -> StoreResult<Option<Employee>>;

    /// Fails with [`StoreError::Conflict`] when the emp_no is taken in the company.
    async fn create_employee(
        &self,
        company_id: Uuid,
        emp_no: &str,
        fields: EmployeeFields,
    ) -> StoreResult<Employee>;

    async fn update_employee(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
        emp_no: &str,
        fields: EmployeeFields,
    ) -> StoreResult<Option<Employee>>;

    async fn delete_employee(&self, company_id: Uuid, employee_id: Uuid) -> StoreResult<bool>;

    /// Latest recording by `recorded_at` across employees carrying `emp_no`.
    /// Rows with identical timestamps are returned in no particular order.
    async fn latest_recording(&self, emp_no: &str) -> StoreResult<Option<LatestRecording>>;

    async fn enrollment_status(
        &self,
        employee_id: Uuid,
        course_title: &str,
    ) -> StoreResult<Option<bool>>;

    async fn ping(&self) -> bool;
}
