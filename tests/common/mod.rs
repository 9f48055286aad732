#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use skillset::{
    config::Config,
    create_api_router,
    infrastructure::SqliteDatabase,
    models::{NewProduct, NewUser},
    AppState,
};

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Value,
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        let db = SqliteDatabase::new_in_memory().await.unwrap();
        let state = AppState::with_database(Config::for_testing(), Arc::new(db));
        let router = create_api_router(state.clone());
        Self { state, router }
    }

    /// Insert a user directly and return its id with a valid session token
    pub async fn user(&self, email: &str, name: &str) -> (String, String) {
        let user = self
            .state
            .database
            .create_user(NewUser {
                email: email.to_string(),
                password_hash: "not-a-real-hash".to_string(),
                name: name.to_string(),
                country: "CA".to_string(),
                birthday: None,
            })
            .await
            .unwrap();
        let session = self.state.security.issue_session(&user.id).unwrap();
        (user.id, session.token)
    }

    pub async fn product(&self, owner_id: &str, title: &str) -> String {
        self.state
            .database
            .create_product(NewProduct {
                title: title.to_string(),
                description: "A fine service".to_string(),
                price: 25.0,
                date: None,
                image_location: None,
                user_id: owner_id.to_string(),
            })
            .await
            .unwrap()
            .id
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::COOKIE, format!("session={}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| json!(String::from_utf8_lossy(&bytes)))
        };

        TestResponse {
            status,
            headers,
            body,
        }
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> TestResponse {
        self.request(Method::GET, uri, token, None).await
    }

    pub async fn post(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::POST, uri, token, Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::PATCH, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>, body: Value) -> TestResponse {
        self.request(Method::DELETE, uri, token, Some(body)).await
    }
}
