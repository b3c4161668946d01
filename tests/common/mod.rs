#![allow(dead_code)]

use std::str::FromStr;
use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Method, Request, StatusCode},
    response::Response,
    Router,
};
use production_planner::{config::AppConfig, db, AppState};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use tower::ServiceExt;

/// Helper harness for spinning up an application backed by an in-memory SQLite database.
pub struct TestApp {
    router: Router,
    pub state: AppState,
}

impl TestApp {
    /// Construct a new test application with a fresh, migrated database.
    pub async fn new() -> Self {
        let mut cfg = AppConfig::new(
            "sqlite::memory:".to_string(),
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        // one connection keeps the in-memory database alive and shared
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let state = AppState::new(Arc::new(pool), cfg);
        let router = production_planner::build_router(state.clone());

        Self { router, state }
    }

    /// Send a request against the router with an optional JSON body.
    pub async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    pub async fn get(&self, uri: &str) -> Response {
        self.request(Method::GET, uri, None).await
    }

    pub async fn post(&self, uri: &str, body: Value) -> Response {
        self.request(Method::POST, uri, Some(body)).await
    }

    pub async fn put(&self, uri: &str, body: Value) -> Response {
        self.request(Method::PUT, uri, Some(body)).await
    }

    pub async fn delete(&self, uri: &str) -> Response {
        self.request(Method::DELETE, uri, None).await
    }

    pub async fn create_product(&self, code: &str, value: &str) -> Value {
        let response = self
            .post(
                "/api/v1/products",
                json!({ "code": code, "name": format!("Product {}", code), "value": value }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "seed product {}", code);
        response_json(response).await
    }

    pub async fn create_raw_material(&self, code: &str, stock: &str) -> Value {
        let response = self
            .post(
                "/api/v1/raw-materials",
                json!({ "code": code, "name": format!("Material {}", code), "stockQuantity": stock }),
            )
            .await;
        assert_eq!(
            response.status(),
            StatusCode::CREATED,
            "seed raw material {}",
            code
        );
        response_json(response).await
    }

    pub async fn associate(&self, product_id: i64, raw_material_id: i64, required: &str) -> Value {
        let response = self
            .post(
                "/api/v1/product-raw-materials",
                json!({
                    "productId": product_id,
                    "rawMaterialId": raw_material_id,
                    "requiredQuantity": required
                }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::CREATED, "seed association");
        response_json(response).await
    }
}

pub async fn response_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("failed to read response body");
    serde_json::from_slice(&bytes).expect("response body is not JSON")
}

/// Reads a decimal field that may be serialized as a string or a number.
pub fn decimal(value: &Value) -> Decimal {
    match value {
        Value::String(s) => Decimal::from_str(s).expect("decimal string"),
        Value::Number(n) => Decimal::from_str(&n.to_string()).expect("decimal number"),
        other => panic!("expected a decimal, got {other}"),
    }
}

pub fn id_of(value: &Value) -> i64 {
    value["id"].as_i64().expect("id field")
}
