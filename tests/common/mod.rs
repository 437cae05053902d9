//! Shared fixtures: an in-process fake template API and test doubles.

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use axum::{
    extract::{Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

use topol_email_templates::cache::{CacheBackendStats, CacheError, MemoryTemplateCache, TemplateCache};
use topol_email_templates::config::{ApiConfig, CacheConfig};
use topol_email_templates::mail::{MailError, MailSender};
use topol_email_templates::template::{MessageSpec, Template};

/// Requests observed by the fake API
#[derive(Default)]
pub struct FakeApiState {
    hits: AtomicUsize,
    auth_headers: Mutex<Vec<Option<String>>>,
}

impl FakeApiState {
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::SeqCst)
    }

    pub fn auth_headers(&self) -> Vec<Option<String>> {
        self.auth_headers.lock().unwrap().clone()
    }
}

pub struct FakeApi {
    pub base_url: String,
    pub state: Arc<FakeApiState>,
}

/// Serve `GET /templates/{id}` on an ephemeral port.
///
/// IDs with special behaviour: `404`, `500`, `slow` (3s delay), `array`
/// (non-object body). Anything else returns `template_body(id)`.
pub async fn spawn_fake_api() -> FakeApi {
    let state = Arc::new(FakeApiState::default());
    let app = Router::new()
        .route("/templates/{id}", get(serve_template))
        .with_state(state.clone());

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    FakeApi {
        base_url: format!("http://{}", addr),
        state,
    }
}

async fn serve_template(
    State(state): State<Arc<FakeApiState>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string);
    state.auth_headers.lock().unwrap().push(auth);

    match id.as_str() {
        "404" => (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Template not found"})),
        )
            .into_response(),
        "500" => (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded").into_response(),
        "slow" => {
            tokio::time::sleep(Duration::from_secs(3)).await;
            Json(template_body(&id)).into_response()
        }
        "array" => Json(json!([1, 2, 3])).into_response(),
        _ => Json(template_body(&id)).into_response(),
    }
}

/// Answer every request with a 500 whose body is cut short.
///
/// The declared `Content-Length` exceeds what is written before the
/// connection closes, so reading the body fails on the client side.
pub async fn spawn_truncated_api() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(
                    b"HTTP/1.1 500 Internal Server Error\r\n\
                      content-type: text/plain\r\n\
                      content-length: 100\r\n\r\n\
                      partial",
                )
                .await;
            let _ = socket.shutdown().await;
        }
    });

    format!("http://{}", addr)
}

pub fn template_body(id: &str) -> Value {
    json!({
        "id": id,
        "name": "Order confirmation",
        "subject": "Hello {{name}}",
        "from_email": "shop@example.com",
        "from_name": "Shop",
        "reply_to": "support@example.com",
        "data": {"html": "<p>Hi {{name}}, order {order_id}</p>"},
        "text": "Hi {{name}}"
    })
}

pub fn api_config(base_url: &str, key: Option<&str>) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        key: key.map(str::to_string),
        timeout_seconds: 5,
    }
}

pub fn cache_config(enabled: bool, prefix: &str, ttl_seconds: u64) -> CacheConfig {
    CacheConfig {
        enabled,
        ttl_seconds,
        key_prefix: prefix.to_string(),
        ..Default::default()
    }
}

/// Memory cache that remembers every write
pub struct RecordingCache {
    inner: MemoryTemplateCache,
    puts: Mutex<Vec<(String, u64)>>,
}

impl RecordingCache {
    pub fn new() -> Self {
        Self {
            inner: MemoryTemplateCache::new(),
            puts: Mutex::new(Vec::new()),
        }
    }

    pub fn puts(&self) -> Vec<(String, u64)> {
        self.puts.lock().unwrap().clone()
    }
}

#[async_trait]
impl TemplateCache for RecordingCache {
    fn backend_type(&self) -> &'static str {
        "recording"
    }

    async fn get(&self, key: &str) -> Result<Option<Template>, CacheError> {
        self.inner.get(key).await
    }

    async fn put(&self, key: &str, template: &Template, ttl_seconds: u64) -> Result<(), CacheError> {
        self.puts
            .lock()
            .unwrap()
            .push((key.to_string(), ttl_seconds));
        self.inner.put(key, template, ttl_seconds).await
    }

    async fn forget(&self, key: &str) -> Result<(), CacheError> {
        self.inner.forget(key).await
    }

    async fn clear_prefix(&self, prefix: &str) -> Result<usize, CacheError> {
        self.inner.clear_prefix(prefix).await
    }

    async fn stats(&self) -> CacheBackendStats {
        self.inner.stats().await
    }
}

/// Cache whose every operation fails
pub struct BrokenCache;

#[async_trait]
impl TemplateCache for BrokenCache {
    fn backend_type(&self) -> &'static str {
        "broken"
    }

    async fn get(&self, _key: &str) -> Result<Option<Template>, CacheError> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    async fn put(&self, _key: &str, _template: &Template, _ttl: u64) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    async fn forget(&self, _key: &str) -> Result<(), CacheError> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    async fn clear_prefix(&self, _prefix: &str) -> Result<usize, CacheError> {
        Err(CacheError::Unavailable("cache offline".to_string()))
    }

    async fn stats(&self) -> CacheBackendStats {
        CacheBackendStats {
            backend_type: "broken".to_string(),
            entries: None,
            healthy: false,
        }
    }
}

/// Mail sender that keeps what it was given
#[derive(Default)]
pub struct RecordingSender {
    sent: Mutex<Vec<(String, MessageSpec)>>,
}

impl RecordingSender {
    pub fn sent(&self) -> Vec<(String, MessageSpec)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl MailSender for RecordingSender {
    fn name(&self) -> &'static str {
        "recording"
    }

    async fn send(&self, recipient: &str, message: &MessageSpec) -> Result<(), MailError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), message.clone()));
        Ok(())
    }
}
