#![allow(dead_code)]

use std::net::SocketAddr;

use axum::{body::Body, http::{header, Request, StatusCode}, Router};
use serde_json::{json, Value};
use socialite::{db, profiles::{self, Profile}, AppState, Config};
use sqlx::SqlitePool;
use tower::ServiceExt;

/// A fresh in-memory database with the schema applied.
pub async fn test_pool() -> SqlitePool {
    let db_pool = db::connect("sqlite::memory:", 1).await.unwrap();
    db::init_schema(&db_pool).await.unwrap();
    db_pool
}

pub async fn user(db_pool: &SqlitePool, name: &str) -> Profile {
    profiles::create_profile(db_pool, name, Some(&format!("https://cdn.example/{name}.png")))
        .await
        .unwrap()
}

pub async fn count(db_pool: &SqlitePool, table: &str) -> i64 {
    let (n,): (i64,) = sqlx::query_as(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(db_pool)
        .await
        .unwrap();
    n
}

pub struct TestApp {
    pub app: Router,
    pub state: AppState,
}

impl TestApp {
    pub async fn new() -> Self {
        let state = AppState::new(test_pool().await);
        let app = socialite::router(state.clone(), &Config::default()).unwrap();
        Self { app, state }
    }

    pub async fn request(&self, method: &str, uri: &str, cookie: Option<&str>, body: Option<Value>) -> (StatusCode, Option<String>, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.split(';').next())
            .map(str::to_owned);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };

        (status, set_cookie, body)
    }

    pub async fn new_user(&self, name: &str) -> String {
        let (status, _, body) = self
            .request("POST", "/api/user/new", None, Some(json!({ "name": name })))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["id"].as_str().unwrap().to_owned()
    }

    pub async fn login(&self, user_id: &str) -> String {
        let (status, cookie, body) = self
            .request("POST", "/api/auth/login", None, Some(json!({ "user_id": user_id })))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["id"], user_id);
        cookie.expect("login sets a session cookie")
    }

    /// Serves a clone of the router on an ephemeral port. Sessions are
    /// shared with `request`, so a cookie from `login` works on both.
    pub async fn serve(&self) -> SocketAddr {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let app = self.app.clone();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        addr
    }
}
