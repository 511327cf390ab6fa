use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::core::shared::models::Company;
use crate::store::EmployeeFields;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenRequest {
    #[serde(default)]
    pub biz_no: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompanySummary {
    pub id: Uuid,
    pub biz_no: String,
    pub name: String,
}

impl From<&Company> for CompanySummary {
    fn from(company: &Company) -> Self {
        Self {
            id: company.id,
            biz_no: company.biz_no.clone(),
            name: company.name.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access: String,
    pub refresh: String,
    pub company: CompanySummary,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshResponse {
    pub access: String,
}

/// Body of POST and PUT on employees. Absent attributes are stored as "".
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeeRequest {
    #[serde(default)]
    pub emp_no: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub dept: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl EmployeeRequest {
    pub fn into_parts(self) -> (Option<String>, EmployeeFields) {
        (
            self.emp_no,
            EmployeeFields {
                name: self.name.unwrap_or_default(),
                dept: self.dept.unwrap_or_default(),
                phone: self.phone.unwrap_or_default(),
                email: self.email.unwrap_or_default(),
            },
        )
    }
}

/// Body of PATCH on employees. Absent attributes keep their current value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct EmployeePatch {
    pub emp_no: Option<String>,
    pub name: Option<String>,
    pub dept: Option<String>,
    pub phone: Option<String>,
    pub email: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReconciliationResult {
    pub created: u64,
    pub updated: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BulkSyncResponse {
    pub message: String,
    pub created: u64,
    pub updated: u64,
}

impl From<ReconciliationResult> for BulkSyncResponse {
    fn from(result: ReconciliationResult) -> Self {
        Self {
            message: "Bulk employee sync completed.".to_string(),
            created: result.created,
            updated: result.updated,
        }
    }
}
