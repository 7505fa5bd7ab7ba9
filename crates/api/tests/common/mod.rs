//! Shared helpers for API integration tests.
//!
//! Builds the production router over in-memory stores so tests exercise the
//! full middleware stack without a database.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use tower::ServiceExt;

use depot_api::auth::jwt::{generate_access_token, JwtConfig};
use depot_api::config::ServerConfig;
use depot_api::router::build_app_router;
use depot_api::state::AppState;
use depot_core::approval::DocumentType;
use depot_core::document::{Document, Product};
use depot_core::roles::Role;
use depot_core::types::DbId;
use depot_events::SessionRegistry;
use depot_workflow::memory::{InMemoryDirectory, InMemoryStore};

pub const ADMIN: DbId = 1;
pub const KEEPER: DbId = 2;
pub const EMPLOYEE: DbId = 7;
pub const OTHER_EMPLOYEE: DbId = 8;
pub const PRODUCT: DbId = 1;
pub const INITIAL_STOCK: i64 = 100;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        heartbeat_interval_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

pub struct TestApp {
    pub router: Router,
    pub sessions: Arc<SessionRegistry>,
    pub store: Arc<InMemoryStore>,
    config: ServerConfig,
}

impl TestApp {
    pub async fn new() -> Self {
        let config = test_config();
        let sessions = Arc::new(SessionRegistry::new());
        let store = Arc::new(InMemoryStore::new());
        let directory = Arc::new(InMemoryDirectory::new());

        directory.add_user(ADMIN, Role::Admin, "Ada").await;
        directory.add_user(KEEPER, Role::WarehouseKeeper, "Kim").await;
        directory.add_user(EMPLOYEE, Role::Employee, "Sam").await;
        directory.add_user(OTHER_EMPLOYEE, Role::Employee, "Max").await;
        store
            .insert_product(Product {
                id: PRODUCT,
                name: "Steel bolts".into(),
                stock_qty: INITIAL_STOCK,
            })
            .await;

        let state = AppState::assemble(
            config.clone(),
            None,
            Arc::clone(&sessions),
            store.clone(),
            store.clone(),
            directory,
        );
        let router = build_app_router(state, &config);

        Self {
            router,
            sessions,
            store,
            config,
        }
    }

    pub async fn draft(&self, id: DbId, document_type: DocumentType, quantity: i64) {
        self.store
            .insert_document(Document::draft(id, document_type, PRODUCT, quantity))
            .await;
    }

    pub fn token(&self, user_id: DbId, role: Role) -> String {
        generate_access_token(user_id, role.as_str(), &self.config.jwt).unwrap()
    }

    pub fn admin(&self) -> String {
        self.token(ADMIN, Role::Admin)
    }

    pub fn keeper(&self) -> String {
        self.token(KEEPER, Role::WarehouseKeeper)
    }

    pub fn employee(&self) -> String {
        self.token(EMPLOYEE, Role::Employee)
    }

    pub fn other_employee(&self) -> String {
        self.token(OTHER_EMPLOYEE, Role::Employee)
    }

    /// Send a request through the router and return status plus JSON body.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header("authorization", format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json = if bytes.is_empty() {
            serde_json::Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(serde_json::Value::Null)
        };
        (status, json)
    }

    pub async fn post(
        &self,
        uri: &str,
        token: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, serde_json::Value) {
        self.send(Method::POST, uri, Some(token), body).await
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, serde_json::Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }
}
