#![allow(dead_code)]

use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use sea_orm::DatabaseConnection;
use serde_json::Value;
use study_vault::config::{AppConfig, parse_bootstrap_users};
use study_vault::infrastructure::{database, storage};
use study_vault::{AppState, create_app};
use tempfile::TempDir;
use tower::ServiceExt;

pub const BOUNDARY: &str = "---------------------------123456789012345678901234567";

pub struct TestApp {
    pub app: Router,
    pub db: DatabaseConnection,
    pub config: AppConfig,
    // Keeps the database file and uploads alive for the test
    pub dir: TempDir,
}

pub async fn setup(bootstrap_users: &str) -> TestApp {
    setup_with(bootstrap_users, |_| {}).await
}

pub async fn setup_with(bootstrap_users: &str, tweak: impl FnOnce(&mut AppConfig)) -> TestApp {
    let dir = tempfile::tempdir().unwrap();
    let mut config = AppConfig::development(dir.path());
    config.bootstrap_users = parse_bootstrap_users(bootstrap_users);
    tweak(&mut config);

    let db = database::setup_database(&config.database_url).await.unwrap();
    let storage_service = storage::setup_storage(&config.upload_dir).await.unwrap();
    let state = AppState::new(db.clone(), storage_service, config.clone());

    TestApp {
        app: create_app(state),
        db,
        config,
        dir,
    }
}

pub async fn send(app: &Router, req: Request<Body>) -> (StatusCode, HeaderMap, Bytes) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = response.into_body().collect().await.unwrap().to_bytes();
    (status, headers, body)
}

pub fn location(headers: &HeaderMap) -> Option<&str> {
    headers.get(header::LOCATION).and_then(|v| v.to_str().ok())
}

/// Posts the login form, returning the raw response parts.
pub async fn post_login(app: &Router, username: &str, password: &str) -> (StatusCode, HeaderMap, Bytes) {
    send(
        app,
        Request::builder()
            .method("POST")
            .uri("/")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={}&password={}", username, password)))
            .unwrap(),
    )
    .await
}

/// Logs in and returns the `session=...` pair to send back as a Cookie header.
pub async fn login(app: &Router, username: &str, password: &str) -> String {
    let (status, headers, _) = post_login(app, username, password).await;
    assert_eq!(status, StatusCode::SEE_OTHER, "login failed for {}", username);
    assert_eq!(location(&headers), Some("/dashboard"));

    let set_cookie = headers
        .get(header::SET_COOKIE)
        .expect("login sets a session cookie")
        .to_str()
        .unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

pub fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn delete(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("DELETE").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

pub fn multipart_body(filename: Option<&str>, category: Option<&str>, content: &[u8]) -> Vec<u8> {
    let mut body = Vec::new();
    if let Some(category) = category {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"category\"\r\n\r\n{category}\r\n"
            )
            .as_bytes(),
        );
    }
    if let Some(filename) = filename {
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\nContent-Type: text/plain\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(cookie: Option<&str>, body: Vec<u8>) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri("/api/files/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        );
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body)).unwrap()
}

/// Uploads a text file and returns the status with the parsed JSON body.
pub async fn upload(
    app: &Router,
    cookie: &str,
    filename: &str,
    category: Option<&str>,
    content: &[u8],
) -> (StatusCode, Value) {
    let (status, _, body) = send(
        app,
        upload_request(Some(cookie), multipart_body(Some(filename), category, content)),
    )
    .await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

pub async fn list(app: &Router, cookie: Option<&str>, category: &str) -> (StatusCode, Value) {
    let (status, _, body) = send(app, get(&format!("/api/files/{}", category), cookie)).await;
    (status, serde_json::from_slice(&body).unwrap_or(Value::Null))
}

pub fn names(listing: &Value) -> Vec<String> {
    listing
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap().to_string())
        .collect()
}
