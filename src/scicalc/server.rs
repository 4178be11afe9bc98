//! HTTP endpoint that stores saved calculations.
//!
//! This is the service a [`SaveClient`](crate::SaveClient) talks to. It serves
//! one path (default `/calculations`) and keeps everything in an in-memory
//! [`CalculationStore`]:
//!
//! | Method    | Answer                                                             |
//! |-----------|--------------------------------------------------------------------|
//! | `OPTIONS` | `200`, CORS preflight headers, empty body                          |
//! | `GET`     | `200 {"calculations": [...]}`, newest first, at most `max_listed`  |
//! | `POST`    | `201 {"id", "message"}`, or `400` when a field is missing or empty |
//! | other     | `405 {"error": "Method not allowed"}`                              |
//!
//! Every JSON answer carries `Access-Control-Allow-Origin: *` so a page on
//! another origin can call it.
//!
//! Available on the `server` feature.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use scicalc::server::{serve, CalculationStore, ServerConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
//!     scicalc::init_logger();
//!     let store = Arc::new(CalculationStore::new());
//!     let server = serve(ServerConfig::default(), store).await?;
//!     println!("listening on http://{}/calculations", server.addr());
//!     server.wait().await;
//!     Ok(())
//! }
//! ```

use std::error::Error;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, Method, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::any;
use axum::{Json, Router};
use chrono::Utc;
use log::{info, warn};
use serde_json::{json, Value as JsonValue};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

use crate::scicalc::save_client::SavedCalculation;

/// Where and how the endpoint is served.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Socket address to bind (port 0 picks a free port).
    pub addr: SocketAddr,
    /// Path the endpoint is mounted at.
    pub path: String,
    /// Maximum number of calculations returned by `GET`.
    pub max_listed: usize,
}

impl ServerConfig {
    pub fn with_addr(mut self, addr: SocketAddr) -> Self {
        self.addr = addr;
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_max_listed(mut self, max_listed: usize) -> Self {
        self.max_listed = max_listed;
        self
    }
}

impl Default for ServerConfig {
    /// `127.0.0.1:8080`, `/calculations`, 50 listed.
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 8080)),
            path: "/calculations".to_string(),
            max_listed: 50,
        }
    }
}

#[derive(Debug, Default)]
struct StoreInner {
    last_id: u64,
    items: Vec<SavedCalculation>,
}

/// Thread-safe in-memory list of saved calculations.
///
/// Ids start at 1 and increase with every insert.
#[derive(Debug, Default)]
pub struct CalculationStore {
    inner: Mutex<StoreInner>,
}

impl CalculationStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store a calculation stamped with the current time.
    pub fn insert(&self, expression: &str, result: &str) -> SavedCalculation {
        let mut inner = self.lock();
        inner.last_id += 1;
        let saved = SavedCalculation {
            id: inner.last_id,
            expression: expression.to_string(),
            result: result.to_string(),
            created_at: Utc::now(),
        };
        inner.items.push(saved.clone());
        saved
    }

    /// Up to `limit` calculations, newest first.
    ///
    /// Items are appended in id order, so walking them backwards is already
    /// newest first.
    pub fn recent(&self, limit: usize) -> Vec<SavedCalculation> {
        self.lock().items.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, StoreInner> {
        // A panic while holding the lock cannot leave the Vec half-written.
        self.inner
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

#[derive(Clone)]
struct AppState {
    store: Arc<CalculationStore>,
    max_listed: usize,
}

/// Build the router without binding a socket.
pub fn router(config: &ServerConfig, store: Arc<CalculationStore>) -> Router {
    let state = AppState {
        store,
        max_listed: config.max_listed,
    };
    Router::new()
        .route(&config.path, any(handle_calculations))
        .with_state(state)
}

async fn handle_calculations(
    State(state): State<AppState>,
    method: Method,
    body: Bytes,
) -> Response {
    info!("{} calculations", method);
    match method {
        Method::OPTIONS => preflight(),
        Method::GET => {
            let calculations = state.store.recent(state.max_listed);
            json_response(StatusCode::OK, json!({ "calculations": calculations }))
        }
        Method::POST => create(&state.store, &body),
        _ => json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            json!({"error": "Method not allowed"}),
        ),
    }
}

fn create(store: &CalculationStore, body: &[u8]) -> Response {
    // A body that is not JSON is treated like an empty object.
    let payload: JsonValue = serde_json::from_slice(body).unwrap_or(JsonValue::Null);
    let expression = payload["expression"].as_str().unwrap_or("");
    let result = payload["result"].as_str().unwrap_or("");

    if expression.is_empty() || result.is_empty() {
        warn!("rejected calculation without expression or result");
        return json_response(
            StatusCode::BAD_REQUEST,
            json!({"error": "Expression and result required"}),
        );
    }

    let saved = store.insert(expression, result);
    info!("stored calculation #{}: {} = {}", saved.id, saved.expression, saved.result);
    json_response(
        StatusCode::CREATED,
        json!({"id": saved.id, "message": "Calculation saved"}),
    )
}

fn preflight() -> Response {
    (
        StatusCode::OK,
        [
            (header::ACCESS_CONTROL_ALLOW_ORIGIN, "*"),
            (header::ACCESS_CONTROL_ALLOW_METHODS, "GET, POST, OPTIONS"),
            (header::ACCESS_CONTROL_ALLOW_HEADERS, "Content-Type"),
            (header::ACCESS_CONTROL_MAX_AGE, "86400"),
        ],
    )
        .into_response()
}

fn json_response(status: StatusCode, body: JsonValue) -> Response {
    (
        status,
        [(header::ACCESS_CONTROL_ALLOW_ORIGIN, "*")],
        Json(body),
    )
        .into_response()
}

/// A running server.
pub struct ServerHandle {
    addr: SocketAddr,
    task: JoinHandle<std::io::Result<()>>,
}

impl ServerHandle {
    /// Address actually bound (useful with port 0).
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Stop serving.
    pub fn shutdown(self) {
        self.task.abort();
    }

    /// Run until the server task ends.
    pub async fn wait(self) {
        match self.task.await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => warn!("calculations server stopped: {}", e),
            Err(e) => warn!("calculations server task failed: {}", e),
        }
    }
}

/// Bind `config.addr` and serve the endpoint on a background task.
pub async fn serve(
    config: ServerConfig,
    store: Arc<CalculationStore>,
) -> Result<ServerHandle, Box<dyn Error + Send + Sync>> {
    let listener = TcpListener::bind(config.addr).await?;
    let addr = listener.local_addr()?;
    let app = router(&config, store);

    info!("calculations endpoint listening on http://{}{}", addr, config.path);
    let task = tokio::spawn(async move { axum::serve(listener, app).await });

    Ok(ServerHandle { addr, task })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_assigns_increasing_ids() {
        let store = CalculationStore::new();
        assert!(store.is_empty());
        assert_eq!(store.insert("1 add 1", "2").id, 1);
        assert_eq!(store.insert("2 add 2", "4").id, 2);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_store_recent_is_newest_first_and_limited() {
        let store = CalculationStore::new();
        for i in 0..5 {
            store.insert(&format!("{} add 0", i), &i.to_string());
        }
        let recent = store.recent(3);
        let ids: Vec<u64> = recent.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![5, 4, 3]);
    }

    #[test]
    fn test_store_recent_handles_limits_past_the_end() {
        let store = CalculationStore::new();
        assert!(store.recent(10).is_empty());

        store.insert("1 add 1", "2");
        store.insert("2 add 2", "4");
        let recent = store.recent(10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].expression, "2 add 2");
        assert!(store.recent(0).is_empty());
        // Listing leaves the store untouched.
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.path, "/calculations");
        assert_eq!(config.max_listed, 50);
        assert_eq!(config.addr.port(), 8080);
    }
}
