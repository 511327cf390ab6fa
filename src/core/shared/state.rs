use anyhow::{Context, Result};
use std::sync::Arc;

use crate::core::config::AppConfig;
use crate::security::identity::{IdentityProvider, JwtIdentityProvider};
use crate::security::jwt::JwtManager;
use crate::security::password::PasswordHasher;
use crate::store::RecordStore;

pub struct AppState {
    pub config: AppConfig,
    pub store: Arc<dyn RecordStore>,
    pub jwt_manager: Arc<JwtManager>,
    pub identity: Arc<dyn IdentityProvider>,
    pub password_hasher: PasswordHasher,
}

impl AppState {
    pub fn new(config: AppConfig, store: Arc<dyn RecordStore>) -> Result<Self> {
        let jwt_manager = Arc::new(
            JwtManager::from_settings(&config.jwt).context("Failed to initialize JWT manager")?,
        );
        let identity: Arc<dyn IdentityProvider> =
            Arc::new(JwtIdentityProvider::new(jwt_manager.clone(), store.clone()));
        let password_hasher =
            PasswordHasher::with_defaults().context("Failed to initialize password hasher")?;

        Ok(Self {
            config,
            store,
            jwt_manager,
            identity,
            password_hasher,
        })
    }

    pub fn with_password_hasher(mut self, password_hasher: PasswordHasher) -> Self {
        self.password_hasher = password_hasher;
        self
    }

    pub fn with_identity_provider(mut self, identity: Arc<dyn IdentityProvider>) -> Self {
        self.identity = identity;
        self
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("server", &self.config.server)
            .field("cors_allowed_origins", &self.config.cors_allowed_origins)
            .finish_non_exhaustive()
    }
}
