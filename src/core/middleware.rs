use axum::{
    body::Body,
    extract::{FromRequestParts, State},
    http::{header::AUTHORIZATION, request::Parts, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, error};
use uuid::Uuid;

use crate::core::shared::state::AppState;
use crate::security::identity::IdentityError;
use crate::security::jwt::extract_bearer_token;

/// Company resolved from the bearer token of the current request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticatedCompany {
    pub company_id: Uuid,
    pub biz_no: String,
    pub name: String,
}

/// Rejects the request with 401 unless it carries a valid access token for an
/// active company; on success the company is stored in request extensions.
pub async fn require_company_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, Response> {
    let token = match bearer_token(&request) {
        Ok(token) => token,
        Err(e) => return Err(unauthorized(e)),
    };

    let company = match state.identity.authenticate(&token).await {
        Ok(company) => company,
        Err(IdentityError::Store(e)) => {
            error!("Identity lookup failed: {e}");
            return Err((
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": "Internal server error" })),
            )
                .into_response());
        }
        Err(e) => return Err(unauthorized(e)),
    };

    debug!("Authenticated company {}", company.biz_no);
    request.extensions_mut().insert(company);
    Ok(next.run(request).await)
}

fn bearer_token(request: &Request<Body>) -> Result<String, IdentityError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .ok_or(IdentityError::MissingToken)?
        .to_str()
        .map_err(|_| IdentityError::InvalidFormat)?;

    extract_bearer_token(header)
        .map(str::to_string)
        .ok_or(IdentityError::InvalidFormat)
}

fn unauthorized(err: IdentityError) -> Response {
    debug!("Rejected request: {err}");
    let detail = match err {
        IdentityError::CompanyNotFound | IdentityError::CompanyInactive => {
            IdentityError::InvalidToken.to_string()
        }
        other => other.to_string(),
    };
    UnauthorizedResponse::new(&detail).into_response()
}

pub struct UnauthorizedResponse {
    detail: String,
}

impl UnauthorizedResponse {
    pub fn new(detail: &str) -> Self {
        Self {
            detail: detail.to_string(),
        }
    }
}

impl IntoResponse for UnauthorizedResponse {
    fn into_response(self) -> Response {
        (
            StatusCode::UNAUTHORIZED,
            [("WWW-Authenticate", "Bearer")],
            Json(serde_json::json!({ "detail": self.detail })),
        )
            .into_response()
    }
}

#[axum::async_trait]
impl<S> FromRequestParts<S> for AuthenticatedCompany
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<AuthenticatedCompany>()
            .cloned()
            .ok_or_else(|| {
                UnauthorizedResponse::new(&IdentityError::MissingToken.to_string()).into_response()
            })
    }
}
