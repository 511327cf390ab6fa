#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

use motionserver::core::config::AppConfig;
use motionserver::core::shared::models::Company;
use motionserver::core::shared::state::AppState;
use motionserver::main_module::build_router;
use motionserver::security::password::{Argon2Config, PasswordHasher};
use motionserver::store::{MemoryRecordStore, RecordStore};

pub const PASSWORD: &str = "company-pass-1234";

pub struct TestApp {
    pub router: Router,
    pub store: Arc<MemoryRecordStore>,
    pub hasher: PasswordHasher,
}

impl TestApp {
    pub fn new() -> Self {
        let store = Arc::new(MemoryRecordStore::new());
        let config = AppConfig::from_lookup(|_| None).expect("config");
        let hasher = PasswordHasher::new(Argon2Config::low_memory()).expect("hasher");
        let state = AppState::new(config, store.clone())
            .expect("state")
            .with_password_hasher(hasher.clone());

        Self {
            router: build_router(Arc::new(state)),
            store,
            hasher,
        }
    }

    pub async fn create_company(&self, biz_no: &str, name: &str) -> Company {
        let hash = self.hasher.hash(PASSWORD).expect("hash");
        self.store
            .create_company(biz_no, name, &hash)
            .await
            .expect("company")
    }

    /// Logs in through the API and returns the access token.
    pub async fn login(&self, biz_no: &str) -> String {
        let (status, body) = self
            .send(
                Method::POST,
                "/token",
                None,
                Some(serde_json::json!({ "biz_no": biz_no, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        body["access"].as_str().expect("access token").to_string()
    }

    /// Sends `body` verbatim with an optional content type.
    pub async fn send_raw(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        if let Some(content_type) = content_type {
            builder = builder.header(header::CONTENT_TYPE, content_type);
        }
        let request = builder.body(Body::from(body.to_string())).unwrap();
        self.dispatch(request).await
    }

    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        self.dispatch(request).await
    }

    async fn dispatch(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, json)
    }
}
