use axum::http::{header, HeaderValue, Method};
use std::time::Duration;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::info;

#[derive(Debug, Clone)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
    pub allowed_methods: Vec<Method>,
    pub allowed_headers: Vec<header::HeaderName>,
    pub allow_credentials: bool,
    pub max_age_secs: u64,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            allowed_origins: vec![],
            allowed_methods: vec![
                Method::GET,
                Method::POST,
                Method::PUT,
                Method::DELETE,
                Method::PATCH,
                Method::OPTIONS,
            ],
            allowed_headers: vec![header::CONTENT_TYPE, header::AUTHORIZATION, header::ACCEPT],
            allow_credentials: true,
            max_age_secs: 3600,
        }
    }
}

impl CorsConfig {
    pub fn with_origins(mut self, origins: Vec<String>) -> Self {
        self.allowed_origins = origins;
        self
    }

    pub fn build(self) -> CorsLayer {
        let origins: Vec<HeaderValue> = self
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();

        let allow_origin = if origins.is_empty() {
            AllowOrigin::predicate(|origin: &HeaderValue, _: &axum::http::request::Parts| {
                origin.to_str().map(is_valid_origin_format).unwrap_or(false)
            })
        } else {
            info!("CORS configured with {} allowed origins", origins.len());
            AllowOrigin::list(origins)
        };

        let mut cors = CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(self.allowed_methods)
            .allow_headers(self.allowed_headers)
            .max_age(Duration::from_secs(self.max_age_secs));

        if self.allow_credentials {
            cors = cors.allow_credentials(true);
        }

        cors
    }
}

/// Empty `origins` accepts any well-formed http(s) origin.
pub fn create_cors_layer(origins: &[String]) -> CorsLayer {
    CorsConfig::default().with_origins(origins.to_vec()).build()
}

fn is_valid_origin_format(origin: &str) -> bool {
    let Some(rest) = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
    else {
        return false;
    };

    if rest.is_empty() || rest.contains("..") || rest.contains('/') {
        return false;
    }

    let lower = rest.to_lowercase();
    !["<", ">", "%3c", "%3e", "\\", "javascript:"]
        .iter()
        .any(|p| lower.contains(p))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_origin_format() {
        assert!(is_valid_origin_format("https://example.com"));
        assert!(is_valid_origin_format("http://localhost:3000"));
        assert!(!is_valid_origin_format("ftp://example.com"));
        assert!(!is_valid_origin_format("https://"));
        assert!(!is_valid_origin_format("https://evil.com/path"));
        assert!(!is_valid_origin_format("http://a..b"));
        assert!(!is_valid_origin_format("https://x%3Cscript"));
    }

    #[test]
    fn test_builder_keeps_origins() {
        let config = CorsConfig::default().with_origins(vec!["https://a.example".into()]);
        assert_eq!(config.allowed_origins.len(), 1);
        let _layer = config.build();
    }
}
