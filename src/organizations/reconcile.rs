//! Bulk roster reconciliation.
//!
//! A batch of loosely-typed employee records (usually spreadsheet rows sent
//! as JSON) is upserted into the owner's roster keyed by `emp_no`. Records
//! without a usable `emp_no` are skipped without being counted. The batch is
//! not transactional: a store failure stops processing and records already
//! written stay written.

use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, info};
use uuid::Uuid;

use super::error::OrganizationsError;
use super::types::ReconciliationResult;
use crate::store::{EmployeeFields, RecordStore, UpsertOutcome};

pub const EMPLOYEES_NOT_A_LIST: &str = "'employees' must be a list.";
pub const BODY_NOT_AN_OBJECT: &str = "Request body must be a JSON object.";

/// One batch entry after coercion into store types.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawEmployeeRecord {
    pub emp_no: String,
    pub fields: EmployeeFields,
}

impl RawEmployeeRecord {
    /// Returns `None` for entries that are not objects or whose `emp_no` is
    /// missing, empty, zero, boolean, null, an array or an object.
    pub fn from_value(value: &Value) -> Option<Self> {
        let record = value.as_object()?;
        let emp_no = coerce_emp_no(record.get("emp_no")?)?;

        let field = |key: &str| record.get(key).map(coerce_text).unwrap_or_default();

        Some(Self {
            emp_no,
            fields: EmployeeFields {
                name: field("name"),
                dept: field("dept"),
                phone: field("phone"),
                email: field("email"),
            },
        })
    }
}

fn coerce_emp_no(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) if n.as_f64() != Some(0.0) => Some(n.to_string()),
        _ => None,
    }
}

fn coerce_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct RosterReconciler {
    store: Arc<dyn RecordStore>,
}

impl RosterReconciler {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// Reads the `employees` member of a request body. A missing member is an
    /// empty batch.
    pub async fn reconcile_body(
        &self,
        owner: Uuid,
        body: &Value,
    ) -> Result<ReconciliationResult, OrganizationsError> {
        let Value::Object(map) = body else {
            return Err(OrganizationsError::InvalidBatchShape(
                BODY_NOT_AN_OBJECT.to_string(),
            ));
        };

        match map.get("employees") {
            Some(records) => self.reconcile(owner, records).await,
            None => Ok(ReconciliationResult::default()),
        }
    }

    pub async fn reconcile(
        &self,
        owner: Uuid,
        records: &Value,
    ) -> Result<ReconciliationResult, OrganizationsError> {
        let Value::Array(records) = records else {
            return Err(OrganizationsError::InvalidBatchShape(
                EMPLOYEES_NOT_A_LIST.to_string(),
            ));
        };

        let mut result = ReconciliationResult::default();
        let mut skipped = 0usize;

        for value in records {
            let Some(record) = RawEmployeeRecord::from_value(value) else {
                skipped += 1;
                continue;
            };

            let (_, outcome) = self
                .store
                .upsert_employee(owner, &record.emp_no, record.fields)
                .await?;

            match outcome {
                UpsertOutcome::Created => result.created += 1,
                UpsertOutcome::Updated => result.updated += 1,
            }
        }

        if skipped > 0 {
            debug!("Skipped {skipped} roster records without emp_no for company {owner}");
        }
        info!(
            "Roster sync for company {owner}: {} created, {} updated",
            result.created, result.updated
        );

        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::shared::models::{Company, Employee};
    use crate::store::{LatestRecording, MemoryRecordStore, StoreError, StoreResult};
    use async_trait::async_trait;
    use axum::{http::StatusCode, response::IntoResponse};
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Delegates to a memory store but fails the upsert numbered `fail_on`.
    struct FailingUpsertStore {
        inner: MemoryRecordStore,
        upserts: AtomicUsize,
        fail_on: usize,
    }

    #[async_trait]
    impl RecordStore for FailingUpsertStore {
        async fn create_company(
            &self,
            biz_no: &str,
            name: &str,
            password_hash: &str,
        ) -> StoreResult<Company> {
            self.inner.create_company(biz_no, name, password_hash).await
        }

        async fn find_company_by_biz_no(&self, biz_no: &str) -> StoreResult<Option<Company>> {
            self.inner.find_company_by_biz_no(biz_no).await
        }

        async fn get_company(&self, company_id: Uuid) -> StoreResult<Option<Company>> {
            self.inner.get_company(company_id).await
        }

        async fn upsert_employee(
            &self,
            company_id: Uuid,
            emp_no: &str,
            fields: EmployeeFields,
        ) -> StoreResult<(Employee, UpsertOutcome)> {
            let n = self.upserts.fetch_add(1, Ordering::SeqCst) + 1;
            if n == self.fail_on {
                return Err(StoreError::Query("connection reset".to_string()));
            }
            self.inner.upsert_employee(company_id, emp_no, fields).await
        }

        async fn list_employees(&self, company_id: Uuid) -> StoreResult<Vec<Employee>> {
            self.inner.list_employees(company_id).await
        }

        async fn get_employee(
            &self,
            company_id: Uuid,
            employee_id: Uuid,
        ) -> StoreResult<Option<Employee>> {
            self.inner.get_employee(company_id, employee_id).await
        }

        async fn create_employee(
            &self,
            company_id: Uuid,
            emp_no: &str,
            fields: EmployeeFields,
        ) -> StoreResult<Employee> {
            self.inner.create_employee(company_id, emp_no, fields).await
        }

        async fn update_employee(
            &self,
            company_id: Uuid,
            employee_id: Uuid,
            emp_no: &str,
            fields: EmployeeFields,
        ) -> StoreResult<Option<Employee>> {
            self.inner
                .update_employee(company_id, employee_id, emp_no, fields)
                .await
        }

        async fn delete_employee(&self, company_id: Uuid, employee_id: Uuid) -> StoreResult<bool> {
            self.inner.delete_employee(company_id, employee_id).await
        }

        async fn latest_recording(&self, emp_no: &str) -> StoreResult<Option<LatestRecording>> {
            self.inner.latest_recording(emp_no).await
        }

        async fn enrollment_status(
            &self,
            employee_id: Uuid,
            course_title: &str,
        ) -> StoreResult<Option<bool>> {
            self.inner.enrollment_status(employee_id, course_title).await
        }

        async fn ping(&self) -> bool {
            self.inner.ping().await
        }
    }

    async fn setup() -> (Arc<MemoryRecordStore>, RosterReconciler, Uuid) {
        let store = Arc::new(MemoryRecordStore::new());
        let company = store
            .create_company("123-45-67890", "Acme", "hash")
            .await
            .expect("company");
        let reconciler = RosterReconciler::new(store.clone());
        (store, reconciler, company.id)
    }

    #[test]
    fn test_record_coercion() {
        let record = RawEmployeeRecord::from_value(&json!({
            "emp_no": 1024,
            "name": "Kim",
            "phone": null,
            "dept": 7
        }))
        .expect("record");

        assert_eq!(record.emp_no, "1024");
        assert_eq!(record.fields.name, "Kim");
        assert_eq!(record.fields.dept, "7");
        assert_eq!(record.fields.phone, "");
        assert_eq!(record.fields.email, "");
    }

    #[test]
    fn test_unusable_emp_no_is_skipped() {
        for emp_no in [json!(""), json!(0), json!(null), json!(false), json!([]), json!({})] {
            assert!(RawEmployeeRecord::from_value(&json!({ "emp_no": emp_no })).is_none());
        }
        assert!(RawEmployeeRecord::from_value(&json!({ "name": "No Number" })).is_none());
        assert!(RawEmployeeRecord::from_value(&json!("A1")).is_none());
    }

    #[tokio::test]
    async fn test_duplicate_and_blank_rows() {
        let (store, reconciler, owner) = setup().await;

        let result = reconciler
            .reconcile(
                owner,
                &json!([
                    { "emp_no": "A1", "name": "Kim" },
                    { "emp_no": "", "name": "Ghost" },
                    { "emp_no": "A1", "name": "Kim Updated" }
                ]),
            )
            .await
            .expect("reconcile");

        assert_eq!(result, ReconciliationResult { created: 1, updated: 1 });
        let employees = store.list_employees(owner).await.expect("list");
        assert_eq!(employees.len(), 1);
        assert_eq!(employees[0].name, "Kim Updated");
        assert_eq!(employees[0].dept, "");
    }

    #[tokio::test]
    async fn test_second_run_only_updates() {
        let (_store, reconciler, owner) = setup().await;
        let batch = json!([
            { "emp_no": "E001", "name": "Lee", "dept": "Ops" },
            { "emp_no": "E002", "name": "Park" },
            { "name": "skipped" }
        ]);

        let first = reconciler.reconcile(owner, &batch).await.expect("first");
        let second = reconciler.reconcile(owner, &batch).await.expect("second");

        assert_eq!(first, ReconciliationResult { created: 2, updated: 0 });
        assert_eq!(second, ReconciliationResult { created: 0, updated: 2 });
    }

    #[tokio::test]
    async fn test_companies_do_not_collide() {
        let (store, reconciler, owner) = setup().await;
        let other = store
            .create_company("999-99-99999", "Other", "hash")
            .await
            .expect("company");
        let batch = json!([{ "emp_no": "E001", "name": "Same Number" }]);

        reconciler.reconcile(owner, &batch).await.expect("owner");
        let result = reconciler.reconcile(other.id, &batch).await.expect("other");

        assert_eq!(result.created, 1);
        assert_eq!(store.employee_count().await, 2);
    }

    #[tokio::test]
    async fn test_batch_shape() {
        let (store, reconciler, owner) = setup().await;

        for body in [json!({ "employees": {"emp_no": "A1"} }), json!({ "employees": null }), json!([])] {
            let err = reconciler.reconcile_body(owner, &body).await.unwrap_err();
            assert!(matches!(err, OrganizationsError::InvalidBatchShape(_)));
        }

        let empty = reconciler.reconcile_body(owner, &json!({})).await.expect("empty");
        assert_eq!(empty, ReconciliationResult::default());
        assert_eq!(store.employee_count().await, 0);
    }

    #[tokio::test]
    async fn test_store_failure_keeps_earlier_rows() {
        let store = Arc::new(FailingUpsertStore {
            inner: MemoryRecordStore::new(),
            upserts: AtomicUsize::new(0),
            fail_on: 3,
        });
        let owner = Uuid::new_v4();
        let reconciler = RosterReconciler::new(store.clone());

        let err = reconciler
            .reconcile(
                owner,
                &json!([
                    { "emp_no": "E001", "name": "Lee" },
                    { "emp_no": "E002", "name": "Park" },
                    { "emp_no": "E003", "name": "Choi" },
                    { "emp_no": "E004", "name": "Han" }
                ]),
            )
            .await
            .unwrap_err();

        assert!(matches!(err, OrganizationsError::Store(StoreError::Query(_))));
        let saved: Vec<String> = store
            .list_employees(owner)
            .await
            .expect("list")
            .into_iter()
            .map(|e| e.emp_no)
            .collect();
        assert_eq!(saved, vec!["E001".to_string(), "E002".to_string()]);

        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body");
        let body: Value = serde_json::from_slice(&bytes).expect("json");
        assert_eq!(body, json!({ "error": "Internal server error" }));
    }
}
