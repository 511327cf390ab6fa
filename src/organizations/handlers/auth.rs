use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::core::shared::state::AppState;
use crate::organizations::error::OrganizationsError;
use crate::organizations::types::{
    CompanySummary, RefreshRequest, RefreshResponse, TokenRequest, TokenResponse,
};

pub async fn handle_obtain_token(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<TokenRequest>, JsonRejection>,
) -> Result<Json<TokenResponse>, OrganizationsError> {
    let Json(payload) = payload.map_err(|e| {
        debug!("Rejected token request body: {}", e.body_text());
        OrganizationsError::InvalidCredentials
    })?;
    let (Some(biz_no), Some(password)) = (payload.biz_no, payload.password) else {
        return Err(OrganizationsError::InvalidCredentials);
    };

    let Some(company) = state.store.find_company_by_biz_no(&biz_no).await? else {
        warn!("Login attempt for unknown company {biz_no}");
        return Err(OrganizationsError::InvalidCredentials);
    };
    if !company.is_active {
        warn!("Login attempt for inactive company {biz_no}");
        return Err(OrganizationsError::InvalidCredentials);
    }

    let hasher = state.password_hasher.clone();
    let hash = company.password_hash.clone();
    let verified = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
        .await
        .map_err(|e| OrganizationsError::Internal(e.to_string()))?
        .map_err(|e| OrganizationsError::Internal(e.to_string()))?;

    if !verified {
        warn!("Invalid password for company {biz_no}");
        return Err(OrganizationsError::InvalidCredentials);
    }

    let pair = state
        .jwt_manager
        .generate_token_pair(company.id, &company.biz_no)
        .map_err(|e| OrganizationsError::Internal(e.to_string()))?;

    info!("Issued tokens for company {}", company.biz_no);
    Ok(Json(TokenResponse {
        access: pair.access,
        refresh: pair.refresh,
        company: CompanySummary::from(&company),
    }))
}

pub async fn handle_refresh_token(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<RefreshRequest>, JsonRejection>,
) -> Result<Json<RefreshResponse>, OrganizationsError> {
    let Json(payload) = payload.map_err(|e| {
        debug!("Rejected refresh request body: {}", e.body_text());
        OrganizationsError::InvalidToken
    })?;
    let refresh = payload.refresh.ok_or(OrganizationsError::InvalidToken)?;

    let access = state
        .jwt_manager
        .refresh_access_token(&refresh)
        .map_err(|_| OrganizationsError::InvalidToken)?;

    Ok(Json(RefreshResponse { access }))
}
