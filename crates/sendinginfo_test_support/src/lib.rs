//! In-process stand-in for the SendingInfo share service, for integration tests.
//!
//! Serves the same routes and bodies as the real service on `127.0.0.1:0`
//! from a dedicated thread, so it works from both sync and `#[tokio::test]`
//! callers. Every request is recorded for "was anything sent?" assertions.
//!
//! Canned behaviors:
//! - `/download/AB12` → `report.pdf` attachment; `/download/NONAME` → bytes
//!   without `Content-Disposition`; `/download/ZZZZ` → 404 `{"error":"expired"}`;
//!   `/download/BLANK` → 500 with an empty body; anything else → 404.
//! - `/upload` of a file named `quota.txt` → 200 carrying an `error` field.

use axum::extract::{Multipart, Path, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Form, Json, Router};
use serde_json::{json, Value};
use std::collections::{BTreeMap, HashMap};
use std::future::IntoFuture;
use std::sync::{Arc, Mutex};
use std::thread;

/// Body served for `/download/AB12`.
pub const STUB_REPORT_BYTES: &[u8] = b"quarterly numbers";
/// Code the stub issues for every paste.
pub const STUB_PASTE_CODE: &str = "AB12CD";
/// Code the stub issues for every upload.
pub const STUB_UPLOAD_CODE: &str = "AB12";

/// One request as the stub saw it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedRequest {
    pub path: String,
    pub fields: BTreeMap<String, String>,
}

#[derive(Clone, Default)]
struct StubState {
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl StubState {
    fn record(&self, path: String, fields: BTreeMap<String, String>) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(RecordedRequest { path, fields });
        }
    }
}

fn clamp_limit(raw: Option<&str>) -> u32 {
    raw.and_then(|value| value.trim().parse::<i64>().ok())
        .unwrap_or(1)
        .clamp(1, 100) as u32
}

fn json_error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

async fn create_paste(State(state): State<StubState>, Json(body): Json<Value>) -> Response {
    let mut fields = BTreeMap::new();
    for key in ["content", "lang", "max_views"] {
        if let Some(value) = body.get(key) {
            let text = value
                .as_str()
                .map(str::to_string)
                .unwrap_or_else(|| value.to_string());
            fields.insert(key.to_string(), text);
        }
    }
    state.record("/create_paste".to_string(), fields.clone());

    let content = fields.get("content").map(|c| c.trim()).unwrap_or("");
    if content.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "Content cannot be empty!");
    }
    Json(json!({
        "message": "Paste created successfully!",
        "code": STUB_PASTE_CODE,
        "max_views": clamp_limit(fields.get("max_views").map(String::as_str)),
    }))
    .into_response()
}

async fn upload(State(state): State<StubState>, mut multipart: Multipart) -> Response {
    let mut fields = BTreeMap::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let name = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let data = field.bytes().await.unwrap_or_default();
        match file_name {
            Some(file_name) => {
                fields.insert(format!("{}.name", name), file_name);
                fields.insert(format!("{}.len", name), data.len().to_string());
            }
            None => {
                fields.insert(name, String::from_utf8_lossy(&data).into_owned());
            }
        }
    }
    state.record("/upload".to_string(), fields.clone());

    let Some(file_name) = fields.get("file.name") else {
        return json_error(StatusCode::BAD_REQUEST, "No file selected!");
    };
    if fields.get("agreed_terms").map(String::as_str) != Some("true") {
        return json_error(StatusCode::BAD_REQUEST, "Please accept the Terms first!");
    }
    if file_name == "quota.txt" {
        return json_error(StatusCode::OK, "Upload quota reached");
    }
    Json(json!({
        "message": "File uploaded successfully!",
        "code": STUB_UPLOAD_CODE,
        "max_downloads": clamp_limit(fields.get("max_downloads").map(String::as_str)),
        "expires_in_hours": 24,
    }))
    .into_response()
}

async fn download(State(state): State<StubState>, Path(code): Path<String>) -> Response {
    state.record(format!("/download/{}", code), BTreeMap::new());
    match code.as_str() {
        "AB12" => (
            [
                (header::CONTENT_TYPE, "application/pdf"),
                (
                    header::CONTENT_DISPOSITION,
                    "attachment; filename=\"report.pdf\"",
                ),
            ],
            STUB_REPORT_BYTES,
        )
            .into_response(),
        "NONAME" => ([(header::CONTENT_TYPE, "application/octet-stream")], "raw bytes").into_response(),
        "ZZZZ" => json_error(StatusCode::NOT_FOUND, "expired"),
        "BLANK" => StatusCode::INTERNAL_SERVER_ERROR.into_response(),
        _ => json_error(StatusCode::NOT_FOUND, "Invalid or expired code!"),
    }
}

async fn feedback(
    State(state): State<StubState>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let fields: BTreeMap<String, String> = form.into_iter().collect();
    state.record("/feedback".to_string(), fields.clone());
    let message = fields.get("message").map(|m| m.trim()).unwrap_or("");
    if message.is_empty() {
        return json_error(StatusCode::BAD_REQUEST, "Feedback message cannot be empty!");
    }
    Json(json!({ "message": "Thank you for your feedback!" })).into_response()
}

async fn healthz(State(state): State<StubState>) -> Response {
    state.record("/healthz".to_string(), BTreeMap::new());
    Json(json!({ "status": "ok", "time_utc": "2026-10-18T12:00:00.000000" })).into_response()
}

fn router(state: StubState) -> Router {
    Router::new()
        .route("/create_paste", post(create_paste))
        .route("/upload", post(upload))
        .route("/download/:code", get(download))
        .route("/feedback", post(feedback))
        .route("/healthz", get(healthz))
        .with_state(state)
}

/// Running stub server; stops when dropped.
pub struct StubShareServer {
    base_url: String,
    state: StubState,
    shutdown_tx: Option<tokio::sync::oneshot::Sender<()>>,
    worker: Option<thread::JoinHandle<()>>,
}

impl StubShareServer {
    /// Bind an ephemeral loopback port and start serving.
    ///
    /// # Panics
    /// Panics if the port cannot be bound or the serving thread cannot start.
    pub fn spawn() -> Self {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind stub listener");
        listener
            .set_nonblocking(true)
            .expect("set stub listener non-blocking");
        let base_url = format!("http://{}", listener.local_addr().expect("stub addr"));
        let state = StubState::default();
        let app = router(state.clone());
        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let worker = thread::Builder::new()
            .name("stub-share-server".to_string())
            .spawn(move || {
                let runtime = tokio::runtime::Builder::new_current_thread()
                    .enable_all()
                    .build()
                    .expect("stub runtime");
                runtime.block_on(async move {
                    let listener =
                        tokio::net::TcpListener::from_std(listener).expect("stub tokio listener");
                    tokio::select! {
                        _ = axum::serve(listener, app).into_future() => {}
                        _ = shutdown_rx => {}
                    }
                });
            })
            .expect("spawn stub server thread");

        Self {
            base_url,
            state,
            shutdown_tx: Some(shutdown_tx),
            worker: Some(worker),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Snapshot of every request received so far, oldest first.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.state
            .requests
            .lock()
            .map(|requests| requests.clone())
            .unwrap_or_default()
    }

    /// Number of recorded requests whose path starts with `prefix`.
    pub fn request_count(&self, prefix: &str) -> usize {
        self.requests()
            .iter()
            .filter(|request| request.path.starts_with(prefix))
            .count()
    }
}

impl Drop for StubShareServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(worker) = self.worker.take() {
            let _ = worker.join();
        }
    }
}

/// Base URL of a loopback port with nothing listening on it.
pub fn unreachable_base_url() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").expect("bind ephemeral listener");
    let addr = listener.local_addr().expect("listener addr");
    drop(listener);
    format!("http://{}", addr)
}
