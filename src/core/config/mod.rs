use anyhow::{anyhow, Result};
use std::env;
use tracing::warn;

pub const DEV_JWT_SECRET: &str = "dev-secret-key-change-in-production-minimum-32-chars";

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtSettings,
    pub cors_allowed_origins: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Clone, Debug)]
pub struct JwtSettings {
    pub secret: String,
    pub issuer: String,
    pub access_token_expiry_minutes: i64,
    pub refresh_token_expiry_days: i64,
}

impl AppConfig {
    /// Reads configuration from the process environment. Call `dotenvy::dotenv()`
    /// first if a `.env` file should be honored.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = match get("SERVER_PORT") {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|e| anyhow!("Invalid SERVER_PORT '{raw}': {e}"))?,
            None => 8000,
        };

        let max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw
                .parse::<u32>()
                .map_err(|e| anyhow!("Invalid DATABASE_MAX_CONNECTIONS '{raw}': {e}"))?,
            None => 10,
        };

        let secret = get("JWT_SECRET").unwrap_or_else(|| {
            warn!("JWT_SECRET not set, using default development secret - DO NOT USE IN PRODUCTION");
            DEV_JWT_SECRET.to_string()
        });
        if secret.len() < 32 {
            return Err(anyhow!("JWT_SECRET must be at least 32 characters"));
        }

        let access_token_expiry_minutes = parse_positive(get("JWT_ACCESS_TOKEN_MINUTES"), 5)
            .map_err(|e| anyhow!("Invalid JWT_ACCESS_TOKEN_MINUTES: {e}"))?;
        let refresh_token_expiry_days = parse_positive(get("JWT_REFRESH_TOKEN_DAYS"), 1)
            .map_err(|e| anyhow!("Invalid JWT_REFRESH_TOKEN_DAYS: {e}"))?;

        let cors_allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .map(|origins| {
                origins
                    .split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            server: ServerConfig {
                host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
                port,
            },
            database: DatabaseConfig {
                url: get("DATABASE_URL").unwrap_or_else(|| {
                    "postgres://motion:@localhost:5432/motionserver".to_string()
                }),
                max_connections,
            },
            jwt: JwtSettings {
                secret,
                issuer: get("JWT_ISSUER").unwrap_or_else(|| "motionserver".to_string()),
                access_token_expiry_minutes,
                refresh_token_expiry_days,
            },
            cors_allowed_origins,
        })
    }
}

fn parse_positive(raw: Option<String>, default: i64) -> Result<i64> {
    let Some(raw) = raw else {
        return Ok(default);
    };
    let value = raw.trim().parse::<i64>()?;
    if value <= 0 {
        return Err(anyhow!("value must be positive, got {value}"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_environment_is_empty() {
        let config = AppConfig::from_lookup(|_| None).expect("defaults should load");

        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8000);
        assert_eq!(config.database.max_connections, 10);
        assert_eq!(config.jwt.secret, DEV_JWT_SECRET);
        assert_eq!(config.jwt.access_token_expiry_minutes, 5);
        assert_eq!(config.jwt.refresh_token_expiry_days, 1);
        assert!(config.cors_allowed_origins.is_empty());
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = AppConfig::from_lookup(lookup_from(&[
            ("SERVER_PORT", "9100"),
            ("DATABASE_URL", "postgres://u:p@db/motion"),
            ("JWT_SECRET", "0123456789abcdef0123456789abcdef"),
            ("JWT_ACCESS_TOKEN_MINUTES", "30"),
            ("CORS_ALLOWED_ORIGINS", "http://a.example, ,http://b.example"),
        ]))
        .expect("config should load");

        assert_eq!(config.server.port, 9100);
        assert_eq!(config.database.url, "postgres://u:p@db/motion");
        assert_eq!(config.jwt.access_token_expiry_minutes, 30);
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://a.example".to_string(), "http://b.example".to_string()]
        );
    }

    #[test]
    fn test_short_secret_is_rejected() {
        let result = AppConfig::from_lookup(lookup_from(&[("JWT_SECRET", "too-short")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_invalid_numbers_are_rejected() {
        assert!(AppConfig::from_lookup(lookup_from(&[("SERVER_PORT", "http")])).is_err());
        assert!(
            AppConfig::from_lookup(lookup_from(&[("JWT_REFRESH_TOKEN_DAYS", "0")])).is_err()
        );
    }
}
