use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use super::{EmployeeFields, LatestRecording, RecordStore, StoreError, StoreResult, UpsertOutcome};
use crate::core::shared::models::{
    Company, Course, Employee, Enrollment, MotionType, UserRecording,
};

#[derive(Debug, Default)]
struct MemoryTables {
    companies: HashMap<Uuid, Company>,
    employees: HashMap<Uuid, Employee>,
    motion_types: HashMap<Uuid, MotionType>,
    courses: HashMap<Uuid, Course>,
    recordings: Vec<UserRecording>,
    enrollments: Vec<Enrollment>,
}

impl MemoryTables {
    fn find_employee_id(&self, company_id: Uuid, emp_no: &str) -> Option<Uuid> {
        self.employees
            .values()
            .find(|e| e.company_id == company_id && e.emp_no == emp_no)
            .map(|e| e.id)
    }
}

/// In-process [`RecordStore`]. Every write holds the table lock for its whole
/// lookup-then-write sequence, which gives the same (company, emp_no)
/// uniqueness guarantee as the database constraint.
#[derive(Debug, Default)]
pub struct MemoryRecordStore {
    tables: RwLock<MemoryTables>,
}

impl MemoryRecordStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_motion_type(&self, motion_name: &str) -> MotionType {
        let motion_type = MotionType {
            id: Uuid::new_v4(),
            motion_name: motion_name.to_string(),
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .motion_types
            .insert(motion_type.id, motion_type.clone());
        motion_type
    }

    pub async fn add_course(&self, title: &str) -> Course {
        let course = Course {
            id: Uuid::new_v4(),
            title: title.to_string(),
            description: None,
            created_at: Utc::now(),
        };
        self.tables
            .write()
            .await
            .courses
            .insert(course.id, course.clone());
        course
    }

    pub async fn add_recording(
        &self,
        employee_id: Uuid,
        motion_type_id: Uuid,
        score: f64,
        recorded_at: DateTime<Utc>,
    ) -> UserRecording {
        let recording = UserRecording {
            id: Uuid::new_v4(),
            employee_id,
            motion_type_id,
            score,
            recorded_at,
        };
        self.tables.write().await.recordings.push(recording.clone());
        recording
    }

    pub async fn add_enrollment(&self, employee_id: Uuid, course_id: Uuid, status: bool) -> Enrollment {
        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            employee_id,
            course_id,
            status,
            enrolled_at: Utc::now(),
        };
        self.tables.write().await.enrollments.push(enrollment.clone());
        enrollment
    }

    pub async fn set_company_active(&self, company_id: Uuid, is_active: bool) {
        if let Some(company) = self.tables.write().await.companies.get_mut(&company_id) {
            company.is_active = is_active;
        }
    }

    pub async fn employee_count(&self) -> usize {
        self.tables.read().await.employees.len()
    }
}

#[async_trait]
impl RecordStore for MemoryRecordStore {
    async fn create_company(
        &self,
        biz_no: &str,
        name: &str,
        password_hash: &str,
    ) -> StoreResult<Company> {
        let mut tables = self.tables.write().await;
        if tables.companies.values().any(|c| c.biz_no == biz_no) {
            return Err(StoreError::Conflict(format!(
                "company with biz_no {biz_no} already exists"
            )));
        }
        let company = Company {
            id: Uuid::new_v4(),
            biz_no: biz_no.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        tables.companies.insert(company.id, company.clone());
        Ok(company)
    }

    async fn find_company_by_biz_no(&self, biz_no: &str) -> StoreResult<Option<Company>> {
        let tables = self.tables.read().await;
        Ok(tables.companies.values().find(|c| c.biz_no == biz_no).cloned())
    }

    async fn get_company(&self, company_id: Uuid) -> StoreResult<Option<Company>> {
        Ok(self.tables.read().await.companies.get(&company_id).cloned())
    }

    async fn upsert_employee(
        &self,
        company_id: Uuid,
        emp_no: &str,
        fields: EmployeeFields,
    ) -> StoreResult<(Employee, UpsertOutcome)> {
        let mut tables = self.tables.write().await;
        let now = Utc::now();

        if let Some(id) = tables.find_employee_id(company_id, emp_no) {
            if let Some(employee) = tables.employees.get_mut(&id) {
                employee.name = fields.name;
                employee.dept = fields.dept;
                employee.phone = fields.phone;
                employee.email = fields.email;
                employee.updated_at = now;
                return Ok((employee.clone(), UpsertOutcome::Updated));
            }
        }

        let employee = Employee {
            id: Uuid::new_v4(),
            company_id,
            emp_no: emp_no.to_string(),
            name: fields.name,
            dept: fields.dept,
            phone: fields.phone,
            email: fields.email,
            created_at: now,
            updated_at: now,
        };
        tables.employees.insert(employee.id, employee.clone());
        Ok((employee, UpsertOutcome::Created))
    }

    async fn list_employees(&self, company_id: Uuid) -> StoreResult<Vec<Employee>> {
        let tables = self.tables.read().await;
        let mut rows: Vec<Employee> = tables
            .employees
            .values()
            .filter(|e| e.company_id == company_id)
            .cloned()
            .collect();
        rows.sort_by(|a, b| a.emp_no.cmp(&b.emp_no));
        Ok(rows)
    }

    async fn get_employee(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
    ) -> StoreResult<Option<Employee>> {
        let tables = self.tables.read().await;
        Ok(tables
            .employees
            .get(&employee_id)
            .filter(|e| e.company_id == company_id)
            .cloned())
    }

    async fn create_employee(
        &self,
        company_id: Uuid,
        emp_no: &str,
        fields: EmployeeFields,
    ) -> StoreResult<Employee> {
        let mut tables = self.tables.write().await;
        if tables.find_employee_id(company_id, emp_no).is_some() {
            return Err(StoreError::Conflict(format!(
                "employee {emp_no} already exists in company {company_id}"
            )));
        }
        let now = Utc::now();
        let employee = Employee {
            id: Uuid::new_v4(),
            company_id,
            emp_no: emp_no.to_string(),
            name: fields.name,
            dept: fields.dept,
            phone: fields.phone,
            email: fields.email,
            created_at: now,
            updated_at: now,
        };
        tables.employees.insert(employee.id, employee.clone());
        Ok(employee)
    }

    async fn update_employee(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
        emp_no: &str,
        fields: EmployeeFields,
    ) -> StoreResult<Option<Employee>> {
        let mut tables = self.tables.write().await;
        if let Some(other) = tables.find_employee_id(company_id, emp_no) {
            if other != employee_id {
                return Err(StoreError::Conflict(format!(
                    "employee {emp_no} already exists in company {company_id}"
                )));
            }
        }
        let Some(employee) = tables
            .employees
            .get_mut(&employee_id)
            .filter(|e| e.company_id == company_id)
        else {
            return Ok(None);
        };
        employee.emp_no = emp_no.to_string();
        employee.name = fields.name;
        employee.dept = fields.dept;
        employee.phone = fields.phone;
        employee.email = fields.email;
        employee.updated_at = Utc::now();
        Ok(Some(employee.clone()))
    }

    async fn delete_employee(&self, company_id: Uuid, employee_id: Uuid) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        let owned = tables
            .employees
            .get(&employee_id)
            .is_some_and(|e| e.company_id == company_id);
        if !owned {
            return Ok(false);
        }
        tables.employees.remove(&employee_id);
        tables.recordings.retain(|r| r.employee_id != employee_id);
        tables.enrollments.retain(|e| e.employee_id != employee_id);
        Ok(true)
    }

    async fn latest_recording(&self, emp_no: &str) -> StoreResult<Option<LatestRecording>> {
        let tables = self.tables.read().await;
        let latest = tables
            .recordings
            .iter()
            .filter_map(|r| {
                let employee = tables.employees.get(&r.employee_id)?;
                (employee.emp_no == emp_no).then_some((r, employee))
            })
            .max_by_key(|(r, _)| r.recorded_at);

        let Some((recording, employee)) = latest else {
            return Ok(None);
        };
        let motion_name = tables
            .motion_types
            .get(&recording.motion_type_id)
            .map(|m| m.motion_name.clone())
            .ok_or_else(|| {
                StoreError::Query(format!(
                    "recording {} references unknown motion type {}",
                    recording.id, recording.motion_type_id
                ))
            })?;

        Ok(Some(LatestRecording {
            employee_id: employee.id,
            employee_name: employee.name.clone(),
            motion_name,
            score: recording.score,
            recorded_at: recording.recorded_at,
        }))
    }

    async fn enrollment_status(
        &self,
        employee_id: Uuid,
        course_title: &str,
    ) -> StoreResult<Option<bool>> {
        let tables = self.tables.read().await;
        Ok(tables
            .enrollments
            .iter()
            .filter(|e| e.employee_id == employee_id)
            .find(|e| {
                tables
                    .courses
                    .get(&e.course_id)
                    .is_some_and(|c| c.title == course_title)
            })
            .map(|e| e.status))
    }

    async fn ping(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn fields(name: &str) -> EmployeeFields {
        EmployeeFields {
            name: name.to_string(),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_upsert_creates_then_updates() {
        let store = MemoryRecordStore::new();
        let company = Uuid::new_v4();

        let (first, outcome) = store
            .upsert_employee(company, "A1", fields("Kim"))
            .await
            .expect("upsert");
        assert_eq!(outcome, UpsertOutcome::Created);

        let (second, outcome) = store
            .upsert_employee(company, "A1", fields("Kim Updated"))
            .await
            .expect("upsert");
        assert_eq!(outcome, UpsertOutcome::Updated);
        assert_eq!(first.id, second.id);
        assert_eq!(second.name, "Kim Updated");
        assert_eq!(store.employee_count().await, 1);
    }

    #[tokio::test]
    async fn test_same_emp_no_in_two_companies() {
        let store = MemoryRecordStore::new();
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());

        store.upsert_employee(a, "E1", fields("A")).await.expect("upsert");
        let (_, outcome) = store.upsert_employee(b, "E1", fields("B")).await.expect("upsert");

        assert_eq!(outcome, UpsertOutcome::Created);
        assert_eq!(store.list_employees(a).await.expect("list").len(), 1);
        assert_eq!(store.list_employees(b).await.expect("list")[0].name, "B");
    }

    #[tokio::test]
    async fn test_create_employee_conflict() {
        let store = MemoryRecordStore::new();
        let company = Uuid::new_v4();
        store
            .create_employee(company, "E1", fields("A"))
            .await
            .expect("create");

        let result = store.create_employee(company, "E1", fields("B")).await;
        assert!(matches!(result, Err(StoreError::Conflict(_))));
    }

    #[tokio::test]
    async fn test_foreign_company_cannot_touch_employee() {
        let store = MemoryRecordStore::new();
        let (owner, intruder) = (Uuid::new_v4(), Uuid::new_v4());
        let employee = store
            .create_employee(owner, "E1", fields("A"))
            .await
            .expect("create");

        assert!(store
            .get_employee(intruder, employee.id)
            .await
            .expect("get")
            .is_none());
        assert!(!store
            .delete_employee(intruder, employee.id)
            .await
            .expect("delete"));
        assert!(store
            .update_employee(intruder, employee.id, "E1", fields("X"))
            .await
            .expect("update")
            .is_none());
    }

    #[tokio::test]
    async fn test_latest_recording_picks_newest() {
        let store = MemoryRecordStore::new();
        let (employee, _) = store
            .upsert_employee(Uuid::new_v4(), "E2", fields("Lee"))
            .await
            .expect("upsert");
        let squat = store.add_motion_type("Squat").await;
        let lunge = store.add_motion_type("Lunge").await;
        let now = Utc::now();

        store.add_recording(employee.id, squat.id, 70.0, now - Duration::hours(2)).await;
        store.add_recording(employee.id, lunge.id, 88.5, now).await;

        let latest = store
            .latest_recording("E2")
            .await
            .expect("query")
            .expect("recording");
        assert_eq!(latest.motion_name, "Lunge");
        assert_eq!(latest.score, 88.5);
        assert_eq!(latest.employee_name, "Lee");
    }
}
