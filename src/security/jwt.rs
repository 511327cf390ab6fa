use anyhow::{anyhow, Result};
use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, TokenData, Validation};
use serde::{Deserialize, Serialize};
use tracing::debug;
use uuid::Uuid;

use crate::core::config::JwtSettings;

/// Tokens are always signed and verified with HMAC-SHA256.
pub const JWT_ALGORITHM: Algorithm = Algorithm::HS256;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JwtConfig {
    pub issuer: String,
    pub audience: String,
    pub access_token_expiry_minutes: i64,
    pub refresh_token_expiry_days: i64,
    pub leeway_seconds: u64,
}

impl Default for JwtConfig {
    fn default() -> Self {
        Self {
            issuer: "motionserver".into(),
            audience: "motionserver-api".into(),
            access_token_expiry_minutes: 5,
            refresh_token_expiry_days: 1,
            leeway_seconds: 60,
        }
    }
}

impl JwtConfig {
    pub fn from_settings(settings: &JwtSettings) -> Self {
        Self {
            issuer: settings.issuer.clone(),
            access_token_expiry_minutes: settings.access_token_expiry_minutes,
            refresh_token_expiry_days: settings.refresh_token_expiry_days,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TokenType {
    Access,
    Refresh,
}

impl TokenType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Access => "access",
            Self::Refresh => "refresh",
        }
    }
}

/// Claims carried by company tokens. `sub` is the company id.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub iss: String,
    pub aud: String,
    pub exp: i64,
    pub iat: i64,
    pub nbf: i64,
    pub jti: String,
    #[serde(rename = "type")]
    pub token_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub biz_no: Option<String>,
}

impl Claims {
    pub fn new(
        company_id: Uuid,
        issuer: &str,
        audience: &str,
        token_type: TokenType,
        expiry: DateTime<Utc>,
    ) -> Self {
        let now = Utc::now();
        Self {
            sub: company_id.to_string(),
            iss: issuer.to_string(),
            aud: audience.to_string(),
            exp: expiry.timestamp(),
            iat: now.timestamp(),
            nbf: now.timestamp(),
            jti: Uuid::new_v4().to_string(),
            token_type: token_type.as_str().to_string(),
            biz_no: None,
        }
    }

    pub fn with_biz_no(mut self, biz_no: String) -> Self {
        self.biz_no = Some(biz_no);
        self
    }

    pub fn company_id(&self) -> Result<Uuid> {
        Uuid::parse_str(&self.sub).map_err(|e| anyhow!("Invalid company ID in claims: {e}"))
    }

    pub fn is_access_token(&self) -> bool {
        self.token_type == TokenType::Access.as_str()
    }

    pub fn is_refresh_token(&self) -> bool {
        self.token_type == TokenType::Refresh.as_str()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access: String,
    pub refresh: String,
}

pub struct JwtManager {
    config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl JwtManager {
    pub fn new(config: JwtConfig, secret: &str) -> Result<Self> {
        if secret.len() < 32 {
            return Err(anyhow!("JWT secret must be at least 32 characters"));
        }
        Ok(Self {
            config,
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
        })
    }

    pub fn from_settings(settings: &JwtSettings) -> Result<Self> {
        Self::new(JwtConfig::from_settings(settings), &settings.secret)
    }

    fn encode_claims(&self, claims: &Claims) -> Result<String> {
        let header = Header::new(JWT_ALGORITHM);
        encode(&header, claims, &self.encoding_key)
            .map_err(|e| anyhow!("Failed to encode {} token: {e}", claims.token_type))
    }

    fn access_claims(&self, company_id: Uuid, biz_no: Option<String>) -> Claims {
        let expiry = Utc::now() + Duration::minutes(self.config.access_token_expiry_minutes);
        let claims = Claims::new(
            company_id,
            &self.config.issuer,
            &self.config.audience,
            TokenType::Access,
            expiry,
        );
        match biz_no {
            Some(b) => claims.with_biz_no(b),
            None => claims,
        }
    }

    pub fn generate_token_pair(&self, company_id: Uuid, biz_no: &str) -> Result<TokenPair> {
        let refresh_expiry = Utc::now() + Duration::days(self.config.refresh_token_expiry_days);

        let access_claims = self.access_claims(company_id, Some(biz_no.to_string()));
        let refresh_claims = Claims::new(
            company_id,
            &self.config.issuer,
            &self.config.audience,
            TokenType::Refresh,
            refresh_expiry,
        )
        .with_biz_no(biz_no.to_string());

        Ok(TokenPair {
            access: self.encode_claims(&access_claims)?,
            refresh: self.encode_claims(&refresh_claims)?,
        })
    }

    pub fn validate_token(&self, token: &str) -> Result<TokenData<Claims>> {
        let mut validation = Validation::new(JWT_ALGORITHM);
        validation.set_issuer(&[&self.config.issuer]);
        validation.set_audience(&[&self.config.audience]);
        validation.leeway = self.config.leeway_seconds;

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map_err(|e| anyhow!("Token validation failed: {e}"))
    }

    pub fn validate_access_token(&self, token: &str) -> Result<Claims> {
        let token_data = self.validate_token(token)?;

        if !token_data.claims.is_access_token() {
            return Err(anyhow!("Token is not an access token"));
        }

        Ok(token_data.claims)
    }

    pub fn validate_refresh_token(&self, token: &str) -> Result<Claims> {
        let token_data = self.validate_token(token)?;

        if !token_data.claims.is_refresh_token() {
            return Err(anyhow!("Token is not a refresh token"));
        }

        Ok(token_data.claims)
    }

    /// Issues a new access token for the company named by a valid refresh token.
    pub fn refresh_access_token(&self, refresh_token: &str) -> Result<String> {
        let claims = self.validate_refresh_token(refresh_token)?;
        let company_id = claims.company_id()?;

        let access = self.encode_claims(&self.access_claims(company_id, claims.biz_no))?;
        debug!("Refreshed access token for company {company_id}");
        Ok(access)
    }

    pub fn config(&self) -> &JwtConfig {
        &self.config
    }
}

pub fn extract_bearer_token(auth_header: &str) -> Option<&str> {
    auth_header
        .strip_prefix("Bearer ")
        .or_else(|| auth_header.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
