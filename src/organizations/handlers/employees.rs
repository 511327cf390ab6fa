use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::core::middleware::AuthenticatedCompany;
use crate::core::shared::models::Employee;
use crate::core::shared::state::AppState;
use crate::organizations::error::OrganizationsError;
use crate::organizations::reconcile::RosterReconciler;
use crate::organizations::types::{BulkSyncResponse, EmployeePatch, EmployeeRequest};
use crate::store::{EmployeeFields, StoreError};

fn parse_employee_id(raw: &str) -> Result<Uuid, OrganizationsError> {
    Uuid::parse_str(raw).map_err(|_| OrganizationsError::NotFound)
}

fn require_emp_no(emp_no: Option<String>) -> Result<String, OrganizationsError> {
    match emp_no {
        Some(emp_no) if !emp_no.trim().is_empty() => Ok(emp_no),
        _ => Err(OrganizationsError::Validation(
            "emp_no: This field is required.".to_string(),
        )),
    }
}

fn conflict_or_store(emp_no: &str) -> impl FnOnce(StoreError) -> OrganizationsError + '_ {
    move |err| match err {
        StoreError::Conflict(_) => OrganizationsError::Conflict(emp_no.to_string()),
        other => OrganizationsError::Store(other),
    }
}

pub async fn handle_list_employees(
    State(state): State<Arc<AppState>>,
    company: AuthenticatedCompany,
) -> Result<Json<Vec<Employee>>, OrganizationsError> {
    let employees = state.store.list_employees(company.company_id).await?;
    Ok(Json(employees))
}

pub async fn handle_create_employee(
    State(state): State<Arc<AppState>>,
    company: AuthenticatedCompany,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Employee>), OrganizationsError> {
    let Json(payload) = payload.map_err(OrganizationsError::invalid_body)?;
    let (emp_no, fields) = payload.into_parts();
    let emp_no = require_emp_no(emp_no)?;

    let employee = state
        .store
        .create_employee(company.company_id, &emp_no, fields)
        .await
        .map_err(conflict_or_store(&emp_no))?;

    info!("Company {} created employee {}", company.biz_no, employee.emp_no);
    Ok((StatusCode::CREATED, Json(employee)))
}

pub async fn handle_get_employee(
    State(state): State<Arc<AppState>>,
    company: AuthenticatedCompany,
    Path(id): Path<String>,
) -> Result<Json<Employee>, OrganizationsError> {
    let id = parse_employee_id(&id)?;
    state
        .store
        .get_employee(company.company_id, id)
        .await?
        .map(Json)
        .ok_or(OrganizationsError::NotFound)
}

pub async fn handle_update_employee(
    State(state): State<Arc<AppState>>,
    company: AuthenticatedCompany,
    Path(id): Path<String>,
    payload: Result<Json<EmployeeRequest>, JsonRejection>,
) -> Result<Json<Employee>, OrganizationsError> {
    let Json(payload) = payload.map_err(OrganizationsError::invalid_body)?;
    let id = parse_employee_id(&id)?;
    let (emp_no, fields) = payload.into_parts();
    let emp_no = require_emp_no(emp_no)?;

    state
        .store
        .update_employee(company.company_id, id, &emp_no, fields)
        .await
        .map_err(conflict_or_store(&emp_no))?
        .map(Json)
        .ok_or(OrganizationsError::NotFound)
}

pub async fn handle_patch_employee(
    State(state): State<Arc<AppState>>,
    company: AuthenticatedCompany,
    Path(id): Path<String>,
    patch: Result<Json<EmployeePatch>, JsonRejection>,
) -> Result<Json<Employee>, OrganizationsError> {
    let Json(patch) = patch.map_err(OrganizationsError::invalid_body)?;
    let id = parse_employee_id(&id)?;
    let current = state
        .store
        .get_employee(company.company_id, id)
        .await?
        .ok_or(OrganizationsError::NotFound)?;

    let emp_no = match patch.emp_no {
        Some(emp_no) => require_emp_no(Some(emp_no))?,
        None => current.emp_no,
    };
    let fields = EmployeeFields {
        name: patch.name.unwrap_or(current.name),
        dept: patch.dept.unwrap_or(current.dept),
        phone: patch.phone.unwrap_or(current.phone),
        email: patch.email.unwrap_or(current.email),
    };

    state
        .store
        .update_employee(company.company_id, id, &emp_no, fields)
        .await
        .map_err(conflict_or_store(&emp_no))?
        .map(Json)
        .ok_or(OrganizationsError::NotFound)
}

pub async fn handle_delete_employee(
    State(state): State<Arc<AppState>>,
    company: AuthenticatedCompany,
    Path(id): Path<String>,
) -> Result<StatusCode, OrganizationsError> {
    let id = parse_employee_id(&id)?;
    if state.store.delete_employee(company.company_id, id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(OrganizationsError::NotFound)
    }
}

pub async fn handle_bulk_employees(
    State(state): State<Arc<AppState>>,
    company: AuthenticatedCompany,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<BulkSyncResponse>, OrganizationsError> {
    let Json(body) = body
        .map_err(|e| OrganizationsError::InvalidBatchShape(e.body_text()))?;
    let reconciler = RosterReconciler::new(state.store.clone());
    let result = reconciler.reconcile_body(company.company_id, &body).await?;
    Ok(Json(result.into()))
}
