use std::net::SocketAddr;
use std::path::PathBuf;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use uuid::Uuid;

use pagecheck::config::{Config, CrawlerConfig};

/// A running test server with its own throwaway SQLite database.
pub struct TestApp {
    pub addr: SocketAddr,
    pub pool: SqlitePool,
    pub client: Client,
    pub db_path: PathBuf,
    pub reports_dir: PathBuf,
}

/// Open a migrated pool on a fresh temp database file.
pub async fn test_pool() -> (SqlitePool, PathBuf) {
    let db_path = std::env::temp_dir().join(format!("pagecheck-test-{}.db", Uuid::now_v7()));

    let options = SqliteConnectOptions::new()
        .filename(&db_path)
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect_with(options)
        .await
        .expect("failed to open test database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .expect("failed to run migrations");

    (pool, db_path)
}

pub async fn spawn_app() -> TestApp {
    let (pool, db_path) = test_pool().await;

    let reports_dir = std::env::temp_dir().join(format!("pagecheck-reports-{}", Uuid::now_v7()));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("failed to bind test listener");
    let addr = listener.local_addr().expect("listener has no addr");

    let config = Config {
        database_path: db_path.clone(),
        reports_dir: reports_dir.clone(),
        secret: "test-secret".to_string(),
        host: addr.ip(),
        port: addr.port(),
        base_url: format!("http://{addr}"),
        log_level: "warn".to_string(),
        crawler: CrawlerConfig {
            connect_timeout_secs: 2,
            read_timeout_secs: 5,
        },
        smtp: None,
        managed_auth: None,
    };

    let app = pagecheck::build_app(pool.clone(), config);
    tokio::spawn(async move {
        axum::serve(listener, app).await.expect("test server failed");
    });

    TestApp {
        addr,
        pool,
        client: Client::new(),
        db_path,
        reports_dir,
    }
}

pub async fn cleanup(app: TestApp) {
    app.pool.close().await;
    for suffix in ["", "-wal", "-shm"] {
        let mut path = app.db_path.clone().into_os_string();
        path.push(suffix);
        let _ = std::fs::remove_file(path);
    }
    let _ = std::fs::remove_dir_all(&app.reports_dir);
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub async fn signup(&self, identifier: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/signup"))
            .json(&json!({
                "identifier": identifier,
                "password": password,
                "confirm": password,
            }))
            .send()
            .await
            .expect("signup request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn login(&self, identifier: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/login"))
            .json(&json!({ "identifier": identifier, "password": password }))
            .send()
            .await
            .expect("login request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn forgot(&self, identifier: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/forgot-password"))
            .json(&json!({ "identifier": identifier }))
            .send()
            .await
            .expect("forgot request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    pub async fn reset(&self, token: &str, password: &str) -> (Value, StatusCode) {
        let resp = self
            .client
            .post(self.url("/api/v1/auth/reset-password"))
            .json(&json!({ "token": token, "password": password }))
            .send()
            .await
            .expect("reset request failed");
        let status = resp.status();
        let body: Value = resp.json().await.unwrap_or(json!(null));
        (body, status)
    }

    /// Sign up a default account, return (user_id, access_token).
    pub async fn bootstrap(&self) -> (i64, String) {
        let (body, status) = self.signup("admin@test.com", "password123").await;
        assert_eq!(status, StatusCode::OK, "bootstrap signup failed: {body}");
        (
            body["user"]["id"].as_i64().expect("user id"),
            body["access_token"].as_str().expect("access token").to_string(),
        )
    }
}
