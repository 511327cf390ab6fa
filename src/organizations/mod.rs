//! Company logins and the employee roster they own.

pub mod error;
pub mod handlers;
pub mod reconcile;
pub mod types;

use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;

use crate::core::shared::state::AppState;
use crate::core::urls::ApiUrls;

pub use error::OrganizationsError;
pub use handlers::*;
pub use reconcile::{RawEmployeeRecord, RosterReconciler};
pub use types::*;

/// Public credential exchange routes.
pub fn configure_auth_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(ApiUrls::TOKEN, post(handle_obtain_token))
        .route(ApiUrls::TOKEN_REFRESH, post(handle_refresh_token))
}

/// Roster routes. Callers must layer `require_company_middleware` on top.
pub fn configure_employee_routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            ApiUrls::EMPLOYEES,
            get(handle_list_employees).post(handle_create_employee),
        )
        .route(ApiUrls::EMPLOYEES_BULK, post(handle_bulk_employees))
        .route(
            ApiUrls::EMPLOYEE_BY_ID,
            get(handle_get_employee)
                .put(handle_update_employee)
                .patch(handle_patch_employee)
                .delete(handle_delete_employee),
        )
}
