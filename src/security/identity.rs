use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::core::middleware::AuthenticatedCompany;
use crate::security::jwt::JwtManager;
use crate::store::{RecordStore, StoreError};

#[derive(Debug, thiserror::Error)]
pub enum IdentityError {
    #[error("Authentication credentials were not provided.")]
    MissingToken,
    #[error("Authorization header must be of the form 'Bearer <token>'.")]
    InvalidFormat,
    #[error("Given token not valid for any token type")]
    InvalidToken,
    #[error("Company not found")]
    CompanyNotFound,
    #[error("Company is inactive")]
    CompanyInactive,
    #[error("Identity lookup failed: {0}")]
    Store(#[from] StoreError),
}

/// Resolves a bearer credential into the company that owns it.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn authenticate(&self, token: &str) -> Result<AuthenticatedCompany, IdentityError>;
}

pub struct JwtIdentityProvider {
    jwt_manager: Arc<JwtManager>,
    store: Arc<dyn RecordStore>,
}

impl JwtIdentityProvider {
    pub fn new(jwt_manager: Arc<JwtManager>, store: Arc<dyn RecordStore>) -> Self {
        Self { jwt_manager, store }
    }
}

#[async_trait]
impl IdentityProvider for JwtIdentityProvider {
    async fn authenticate(&self, token: &str) -> Result<AuthenticatedCompany, IdentityError> {
        let claims = self.jwt_manager.validate_access_token(token).map_err(|e| {
            debug!("JWT validation failed: {e}");
            IdentityError::InvalidToken
        })?;
        let company_id = claims.company_id().map_err(|_| IdentityError::InvalidToken)?;

        let company = self
            .store
            .get_company(company_id)
            .await?
            .ok_or(IdentityError::CompanyNotFound)?;

        if !company.is_active {
            warn!("Rejected token for inactive company {}", company.biz_no);
            return Err(IdentityError::CompanyInactive);
        }

        Ok(AuthenticatedCompany {
            company_id: company.id,
            biz_no: company.biz_no,
            name: company.name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::security::jwt::JwtConfig;
    use crate::store::MemoryRecordStore;
    use uuid::Uuid;

    fn manager() -> Arc<JwtManager> {
        Arc::new(
            JwtManager::new(
                JwtConfig::default(),
                "identity-provider-test-secret-0123456789",
            )
            .expect("manager"),
        )
    }

    #[tokio::test]
    async fn test_authenticates_active_company() {
        let store = Arc::new(MemoryRecordStore::new());
        let company = store
            .create_company("111-22-33333", "Acme", "hash")
            .await
            .expect("company");
        let jwt = manager();
        let provider = JwtIdentityProvider::new(jwt.clone(), store);

        let pair = jwt.generate_token_pair(company.id, &company.biz_no).expect("pair");
        let identity = provider.authenticate(&pair.access).await.expect("identity");

        assert_eq!(identity.company_id, company.id);
        assert_eq!(identity.name, "Acme");
    }

    #[tokio::test]
    async fn test_rejects_refresh_token_and_unknown_company() {
        let store = Arc::new(MemoryRecordStore::new());
        let jwt = manager();
        let provider = JwtIdentityProvider::new(jwt.clone(), store);
        let pair = jwt.generate_token_pair(Uuid::new_v4(), "1").expect("pair");

        assert!(matches!(
            provider.authenticate(&pair.refresh).await,
            Err(IdentityError::InvalidToken)
        ));
        assert!(matches!(
            provider.authenticate(&pair.access).await,
            Err(IdentityError::CompanyNotFound)
        ));
    }

    #[tokio::test]
    async fn test_rejects_inactive_company() {
        let store = Arc::new(MemoryRecordStore::new());
        let company = store.create_company("9", "Gone", "hash").await.expect("company");
        store.set_company_active(company.id, false).await;
        let jwt = manager();
        let provider = JwtIdentityProvider::new(jwt.clone(), store);
        let pair = jwt.generate_token_pair(company.id, "9").expect("pair");

        assert!(matches!(
            provider.authenticate(&pair.access).await,
            Err(IdentityError::CompanyInactive)
        ));
    }
}
