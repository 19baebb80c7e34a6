//! Shared harness: a router over a throwaway database and media directory.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Request, Response, header},
};
use http_body_util::BodyExt;
use tidewave_api::storage::Storage;
use tidewave_api::{AppState, AppStateInner, router};
use tidewave_core::Allocator;
use tidewave_db::Database;
use tower::ServiceExt;

pub const MAX_UPLOAD_BYTES: usize = 1024;

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    dir: PathBuf,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_allocator(Allocator::default()).await
    }

    pub async fn with_allocator(allocator: Allocator) -> Self {
        let dir = std::env::temp_dir().join(format!("tidewave-api-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();

        let db = Database::open(&dir.join("tidewave.db")).unwrap();
        let storage = Storage::new(dir.join("media")).await.unwrap();
        let state: AppState = Arc::new(AppStateInner {
            db,
            storage,
            jwt_secret: "integration-test-secret".into(),
            allocator,
            max_insert_attempts: 5,
            max_upload_bytes: MAX_UPLOAD_BYTES,
        });

        Self {
            router: router(state.clone()),
            state,
            dir,
        }
    }

    pub async fn send(&self, req: Request<Body>) -> Response<Body> {
        self.router.clone().oneshot(req).await.unwrap()
    }

    pub async fn get(&self, uri: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::get(uri);
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    pub async fn post_form(&self, uri: &str, body: &str, cookie: Option<&str>) -> Response<Body> {
        let mut req = Request::post(uri).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            req = req.header(header::COOKIE, cookie);
        }
        self.send(req.body(Body::from(body.to_string())).unwrap()).await
    }

    pub async fn post_json(&self, uri: &str, body: serde_json::Value, token: Option<&str>) -> Response<Body> {
        let mut req = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        self.send(req.body(Body::from(body.to_string())).unwrap()).await
    }

    /// Sign up through the form and return the session cookie pair.
    pub async fn sign_up(&self, username: &str, password: &str) -> String {
        let resp = self
            .post_form("/sign-in", &format!("username={}&password={}", username, password), None)
            .await;
        session_cookie(&resp).expect("sign-up sets a session cookie")
    }

    /// Register through the JSON API and return the bearer token.
    pub async fn api_token(&self, username: &str) -> String {
        let resp = self
            .post_json(
                "/api/auth/register",
                serde_json::json!({ "username": username, "password": "correct-horse" }),
                None,
            )
            .await;
        let body = json(resp).await;
        body["token"].as_str().unwrap().to_string()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.dir);
    }
}

pub async fn text(resp: Response<Body>) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

pub async fn json(resp: Response<Body>) -> serde_json::Value {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub fn location(resp: &Response<Body>) -> &str {
    resp.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

/// `name=value` of the session cookie set by `resp`, ready for a Cookie
/// header.
pub fn session_cookie(resp: &Response<Body>) -> Option<String> {
    resp.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("tidewave_session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}
