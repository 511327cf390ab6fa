use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::dsl::sql;
use diesel::prelude::*;
use diesel::sql_types::Bool;
use uuid::Uuid;

use super::{EmployeeFields, LatestRecording, RecordStore, StoreError, StoreResult, UpsertOutcome};
use crate::core::shared::models::{
    companies, courses, employees, enrollments, motion_types, user_recordings, Company, Employee,
};
use crate::core::shared::utils::DbPool;

pub struct PgRecordStore {
    db: DbPool,
}

impl PgRecordStore {
    pub fn new(db: DbPool) -> Self {
        Self { db }
    }

    async fn run<F, T>(&self, f: F) -> StoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> StoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.db.clone();
        tokio::task::spawn_blocking(move || {
            let mut conn = pool
                .get()
                .map_err(|e| StoreError::Connection(e.to_string()))?;
            f(&mut conn)
        })
        .await
        .map_err(|e| StoreError::Join(e.to_string()))?
    }
}

#[async_trait]
impl RecordStore for PgRecordStore {
    async fn create_company(
        &self,
        biz_no: &str,
        name: &str,
        password_hash: &str,
    ) -> StoreResult<Company> {
        let company = Company {
            id: Uuid::new_v4(),
            biz_no: biz_no.to_string(),
            name: name.to_string(),
            password_hash: password_hash.to_string(),
            is_active: true,
            created_at: Utc::now(),
        };
        self.run(move |conn| {
            diesel::insert_into(companies::table)
                .values(&company)
                .execute(conn)?;
            Ok(company)
        })
        .await
    }

    async fn find_company_by_biz_no(&self, biz_no: &str) -> StoreResult<Option<Company>> {
        let biz_no = biz_no.to_string();
        self.run(move |conn| {
            Ok(companies::table
                .filter(companies::biz_no.eq(biz_no))
                .first::<Company>(conn)
                .optional()?)
        })
        .await
    }

    async fn get_company(&self, company_id: Uuid) -> StoreResult<Option<Company>> {
        self.run(move |conn| {
            Ok(companies::table
                .filter(companies::id.eq(company_id))
                .first::<Company>(conn)
                .optional()?)
        })
        .await
    }

    async fn upsert_employee(
        &self,
        company_id: Uuid,
        emp_no: &str,
        fields: EmployeeFields,
    ) -> StoreResult<(Employee, UpsertOutcome)> {
        let now = Utc::now();
        let row = Employee {
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
        self.run(move |conn| {
            // xmax is zero only on a tuple this statement inserted.
            let (employee, inserted) = diesel::insert_into(employees::table)
                .values(&row)
                .on_conflict((employees::company_id, employees::emp_no))
                .do_update()
                .set((
                    employees::name.eq(&row.name),
                    employees::dept.eq(&row.dept),
                    employees::phone.eq(&row.phone),
                    employees::email.eq(&row.email),
                    employees::updated_at.eq(now),
                ))
                .returning((employees::all_columns, sql::<Bool>("(xmax = 0)")))
                .get_result::<(Employee, bool)>(conn)?;
            let outcome = if inserted {
                UpsertOutcome::Created
            } else {
                UpsertOutcome::Updated
            };
            Ok((employee, outcome))
        })
        .await
    }

    async fn list_employees(&self, company_id: Uuid) -> StoreResult<Vec<Employee>> {
        self.run(move |conn| {
            Ok(employees::table
                .filter(employees::company_id.eq(company_id))
                .order(employees::emp_no.asc())
                .load::<Employee>(conn)?)
        })
        .await
    }

    async fn get_employee(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
    ) -> StoreResult<Option<Employee>> {
        self.run(move |conn| {
            Ok(employees::table
                .filter(employees::id.eq(employee_id))
                .filter(employees::company_id.eq(company_id))
                .first::<Employee>(conn)
                .optional()?)
        })
        .await
    }

    async fn create_employee(
        &self,
        company_id: Uuid,
        emp_no: &str,
        fields: EmployeeFields,
    ) -> StoreResult<Employee> {
        let now = Utc::now();
        let row = Employee {
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
        self.run(move |conn| {
            diesel::insert_into(employees::table)
                .values(&row)
                .execute(conn)?;
            Ok(row)
        })
        .await
    }

    async fn update_employee(
        &self,
        company_id: Uuid,
        employee_id: Uuid,
        emp_no: &str,
        fields: EmployeeFields,
    ) -> StoreResult<Option<Employee>> {
        let emp_no = emp_no.to_string();
        self.run(move |conn| {
            Ok(diesel::update(
                employees::table
                    .filter(employees::id.eq(employee_id))
                    .filter(employees::company_id.eq(company_id)),
            )
            .set((
                employees::emp_no.eq(emp_no),
                employees::name.eq(fields.name),
                employees::dept.eq(fields.dept),
                employees::phone.eq(fields.phone),
                employees::email.eq(fields.email),
                employees::updated_at.eq(Utc::now()),
            ))
            .get_result::<Employee>(conn)
            .optional()?)
        })
        .await
    }

    async fn delete_employee(&self, company_id: Uuid, employee_id: Uuid) -> StoreResult<bool> {
        self.run(move |conn| {
            let deleted = diesel::delete(
                employees::table
                    .filter(employees::id.eq(employee_id))
                    .filter(employees::company_id.eq(company_id)),
            )
            .execute(conn)?;
            Ok(deleted > 0)
        })
        .await
    }

    async fn latest_recording(&self, emp_no: &str) -> StoreResult<Option<LatestRecording>> {
        let emp_no = emp_no.to_string();
        self.run(move |conn| {
            let row = user_recordings::table
                .inner_join(employees::table)
                .inner_join(motion_types::table)
                .filter(employees::emp_no.eq(emp_no))
                .order(user_recordings::recorded_at.desc())
                .select((
                    employees::id,
                    employees::name,
                    motion_types::motion_name,
                    user_recordings::score,
                    user_recordings::recorded_at,
                ))
                .first::<(Uuid, String, String, f64, DateTime<Utc>)>(conn)
                .optional()?;

            Ok(row.map(
                |(employee_id, employee_name, motion_name, score, recorded_at)| LatestRecording {
                    employee_id,
                    employee_name,
                    motion_name,
                    score,
                    recorded_at,
                },
            ))
        })
        .await
    }

    async fn enrollment_status(
        &self,
        employee_id: Uuid,
        course_title: &str,
    ) -> StoreResult<Option<bool>> {
        let course_title = course_title.to_string();
        self.run(move |conn| {
            Ok(enrollments::table
                .inner_join(courses::table)
                .filter(enrollments::employee_id.eq(employee_id))
                .filter(courses::title.eq(course_title))
                .order(enrollments::enrolled_at.asc())
                .select(enrollments::status)
                .first::<bool>(conn)
                .optional()?)
        })
        .await
    }

    async fn ping(&self) -> bool {
        self.run(|conn| {
            diesel::sql_query("SELECT 1").execute(conn)?;
            Ok(())
        })
        .await
        .is_ok()
    }
}
