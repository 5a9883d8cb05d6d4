#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
};
use mygigguide::db;
use mygigguide::infrastructure::AppState;
use mygigguide::infrastructure::storage::MediaStorage;
use mygigguide::server;
use serde_json::{Value, json};
use tower::util::ServiceExt; // for `oneshot`

pub const PASSWORD: &str = "password123";
pub const MAX_UPLOAD_BYTES: usize = 4096;
pub const MAX_GALLERY_IMAGES: usize = 3;

/// Smallest header `image::guess_format` recognises as PNG
pub const PNG: &[u8] = &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A, 0, 0, 0, 0];
pub const JPEG: &[u8] = &[0xFF, 0xD8, 0xFF, 0xE0, 0, 0x10, b'J', b'F', b'I', b'F'];

const BOUNDARY: &str = "mygigguide-test-boundary";

pub struct TestApp {
    pub router: Router,
    pub state: AppState,
}

// Helper to create an app over an in-memory database and a temp upload dir
pub async fn setup_app() -> TestApp {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    let root = std::env::temp_dir().join(format!("mygigguide-test-{}", uuid::Uuid::new_v4()));
    let storage = MediaStorage::new(root, MAX_UPLOAD_BYTES, MAX_GALLERY_IMAGES);
    let state = AppState::new(db, storage);
    let router = server::build_router(state.clone(), &[]);
    TestApp { router, state }
}

impl TestApp {
    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("Failed to execute request");
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("Failed to read body");
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, body)
    }

    pub async fn call(
        &self,
        method: &str,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();
        self.send(request).await
    }

    pub async fn get(&self, uri: &str) -> (StatusCode, Value) {
        self.call("GET", uri, None, None).await
    }

    /// Upload files as `file` parts of a multipart body
    pub async fn upload(&self, uri: &str, token: &str, files: &[&[u8]]) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri(uri)
            .header(header::AUTHORIZATION, format!("Bearer {}", token))
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={}", BOUNDARY),
            )
            .body(Body::from(multipart_body(files)))
            .unwrap();
        self.send(request).await
    }

    /// Register a user and return (token, user id)
    pub async fn register(&self, username: &str, role: &str) -> (String, i64) {
        let (status, body) = self
            .call(
                "POST",
                "/api/auth/register",
                None,
                Some(json!({
                    "username": username,
                    "email": format!("{}@example.com", username),
                    "password": PASSWORD,
                    "role": role
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        (
            body["token"].as_str().unwrap().to_string(),
            body["user"]["id"].as_i64().unwrap(),
        )
    }

    pub async fn create_artist(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self
            .call(
                "POST",
                "/api/artists",
                Some(token),
                Some(json!({ "name": name, "genre": "Jazz", "location": "Leeds" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create artist failed: {}", body);
        body["artist"]["id"].as_i64().unwrap()
    }

    pub async fn create_venue(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self
            .call(
                "POST",
                "/api/venues",
                Some(token),
                Some(json!({ "name": name, "city": "Manchester", "capacity": 250 })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "create venue failed: {}", body);
        body["venue"]["id"].as_i64().unwrap()
    }
}

pub fn multipart_body(files: &[&[u8]]) -> Vec<u8> {
    let mut body = Vec::new();
    for (i, bytes) in files.iter().enumerate() {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"file\"; filename=\"image{}.bin\"\r\n",
                i
            )
            .as_bytes(),
        );
        body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
        body.extend_from_slice(bytes);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());
    body
}

/// RFC 3339 timestamp `days` from now
pub fn days_from_now(days: i64) -> String {
    (chrono::Utc::now() + chrono::Duration::days(days))
        .format("%Y-%m-%dT%H:%M:%SZ")
        .to_string()
}
