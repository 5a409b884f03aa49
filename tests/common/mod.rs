#![allow(dead_code)]

use std::io::Cursor;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::{
    Json, Router,
    body::{Body, to_bytes},
    extract::{Path as UrlPath, State},
    http::{HeaderMap, Request, StatusCode, header},
    response::Response,
    routing::{get, post},
};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use serde_json::{Value, json};

use cutout_backend::config::{ResourcesConfig, UpstreamConfig};
use cutout_backend::{AppConfig, AppState, build_router};

pub const TEST_TOKEN: &str = "r8_test_token";
pub const KNOWN_PREDICTION_ID: &str = "pred-123";
pub const BOUNDARY: &str = "----cutout-test-boundary";

/// 上游替身服务记录的调用情况
#[derive(Clone, Default)]
pub struct FakeReplicate {
    pub submissions: Arc<AtomicUsize>,
    pub status_calls: Arc<AtomicUsize>,
    pub last_submission: Arc<Mutex<Option<Value>>>,
}

impl FakeReplicate {
    pub fn submissions(&self) -> usize {
        self.submissions.load(Ordering::SeqCst)
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    pub fn last_submission(&self) -> Option<Value> {
        self.last_submission.lock().expect("lock").clone()
    }
}

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v == format!("Bearer {TEST_TOKEN}"))
}

async fn create_prediction(
    State(fake): State<FakeReplicate>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid token." })),
        );
    }
    fake.submissions.fetch_add(1, Ordering::SeqCst);
    *fake.last_submission.lock().expect("lock") = Some(body);
    (
        StatusCode::CREATED,
        Json(json!({ "id": KNOWN_PREDICTION_ID, "status": "starting" })),
    )
}

async fn get_prediction(
    State(fake): State<FakeReplicate>,
    headers: HeaderMap,
    UrlPath(id): UrlPath<String>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "detail": "Invalid token." })),
        );
    }
    fake.status_calls.fetch_add(1, Ordering::SeqCst);
    if id == KNOWN_PREDICTION_ID {
        (StatusCode::OK, Json(known_prediction()))
    } else {
        (StatusCode::NOT_FOUND, Json(json!({ "detail": "Not found." })))
    }
}

/// 替身服务对已知任务返回的 JSON
pub fn known_prediction() -> Value {
    json!({
        "id": KNOWN_PREDICTION_ID,
        "status": "succeeded",
        "output": "https://replicate.delivery/pbxt/cutout.png",
        "metrics": { "predict_time": 1.25 },
        "error": null
    })
}

/// 在本地临时端口启动 Replicate 替身，返回其 base URL
pub async fn spawn_fake_replicate() -> (String, FakeReplicate) {
    let fake = FakeReplicate::default();
    let router = Router::new()
        .route("/v1/predictions", post(create_prediction))
        .route("/v1/predictions/:id", get(get_prediction))
        .with_state(fake.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake upstream");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve fake upstream");
    });

    (format!("http://{addr}/v1"), fake)
}

/// 对任意请求都返回同一个固定响应的上游，返回其 base URL
pub async fn spawn_canned_upstream(
    status: StatusCode,
    content_type: &'static str,
    body: &'static str,
) -> String {
    let router = Router::new()
        .fallback(move || async move { (status, [(header::CONTENT_TYPE, content_type)], body) });

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind canned upstream");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router).await.expect("serve canned upstream");
    });

    format!("http://{addr}/v1")
}

/// 接受连接但从不应答的上游，用来触发客户端超时
pub async fn spawn_silent_upstream() -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind silent upstream");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        while let Ok((socket, _)) = listener.accept().await {
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_secs(5)).await;
                drop(socket);
            });
        }
    });

    format!("http://{addr}/v1")
}

pub fn test_config(base_url: &str, token: Option<&str>) -> AppConfig {
    let root = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources");
    AppConfig {
        upstream: UpstreamConfig {
            base_url: base_url.to_string(),
            api_token: token.map(str::to_string),
            timeout_secs: Some(10),
        },
        resources: ResourcesConfig {
            templates_dir: root.join("templates").to_string_lossy().into_owned(),
            static_dir: root.join("static").to_string_lossy().into_owned(),
        },
        ..AppConfig::default()
    }
}

pub fn build_app(config: &AppConfig) -> Router {
    let state = AppState::from_config(config).expect("build app state");
    build_router(config, state)
}

/// 生成一张小尺寸 JPEG
pub fn sample_jpeg() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(8, 8, Rgb([200, 30, 30])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Jpeg)
        .expect("encode jpeg");
    buf
}

/// multipart 表单中的一个字段
pub struct Part<'a> {
    pub name: &'a str,
    pub filename: Option<&'a str>,
    pub data: &'a [u8],
}

impl<'a> Part<'a> {
    pub fn file(name: &'a str, filename: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            filename: Some(filename),
            data,
        }
    }

    pub fn text(name: &'a str, data: &'a [u8]) -> Self {
        Self {
            name,
            filename: None,
            data,
        }
    }
}

pub fn multipart_body(parts: &[Part<'_>]) -> Vec<u8> {
    let mut body = Vec::new();
    for part in parts {
        body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
        match part.filename {
            Some(filename) => {
                body.extend_from_slice(
                    format!(
                        "Content-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n",
                        part.name, filename
                    )
                    .as_bytes(),
                );
                body.extend_from_slice(b"Content-Type: application/octet-stream\r\n");
            }
            None => body.extend_from_slice(
                format!("Content-Disposition: form-data; name=\"{}\"\r\n", part.name).as_bytes(),
            ),
        }
        body.extend_from_slice(b"\r\n");
        body.extend_from_slice(part.data);
        body.extend_from_slice(b"\r\n");
    }
    body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
    body
}

pub fn upload_request(parts: &[Part<'_>]) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .body(Body::from(multipart_body(parts)))
        .expect("build upload request")
}

pub async fn json_body(resp: Response) -> Value {
    let bytes = to_bytes(resp.into_body(), usize::MAX)
        .await
        .expect("read body");
    serde_json::from_slice(&bytes).expect("parse json body")
}
