//! Where the background settings document comes from.

use crate::{BackgroundError, BackgroundSettings, Result};
use async_trait::async_trait;
use gazette_http_client::HttpClient;
use gazette_log::debug;
use parking_lot::Mutex;
use serde_json::{Value, json};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tokio::sync::Notify;

/// Loads the whole settings document.
#[async_trait]
pub trait BackgroundRepository: Send + Sync {
    async fn load_settings(&self) -> Result<BackgroundSettings>;
}

/// Fetches the settings document from the assets host.
#[derive(Clone)]
pub struct HttpBackgroundRepository {
    client: HttpClient,
    path: String,
}

impl HttpBackgroundRepository {
    pub const DEFAULT_PATH: &'static str = "/configs/pageBackgrounds.json";

    pub fn new(client: HttpClient) -> Self {
        Self {
            client,
            path: Self::DEFAULT_PATH.to_string(),
        }
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }
}

#[async_trait]
impl BackgroundRepository for HttpBackgroundRepository {
    async fn load_settings(&self) -> Result<BackgroundSettings> {
        debug!("Fetching background settings from {}", self.path);
        let document: Value = self.client.get(self.path.as_str()).send_json().await?;
        BackgroundSettings::from_value(document)
    }
}

/// In-memory document for tests and offline use.
///
/// Starts with a black `default` entry. Counts loads, can be switched to
/// fail, and can hold loads until released.
pub struct MemoryBackgroundRepository {
    document: Mutex<Value>,
    gate: Mutex<Option<Arc<Notify>>>,
    failing: AtomicBool,
    loads: AtomicUsize,
}

impl MemoryBackgroundRepository {
    pub fn new() -> Self {
        Self::with_document(json!({"default": {"type": "color", "value": "#000000"}}))
    }

    /// Serve `document` as-is, even if it would be rejected as malformed.
    pub fn with_document(document: Value) -> Self {
        Self {
            document: Mutex::new(document),
            gate: Mutex::new(None),
            failing: AtomicBool::new(false),
            loads: AtomicUsize::new(0),
        }
    }

    pub fn set_document(&self, document: Value) {
        *self.document.lock() = document;
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Make every load wait until the returned handle is notified.
    pub fn hold(&self) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        *self.gate.lock() = Some(gate.clone());
        gate
    }

    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }
}

impl Default for MemoryBackgroundRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl BackgroundRepository for MemoryBackgroundRepository {
    async fn load_settings(&self) -> Result<BackgroundSettings> {
        self.loads.fetch_add(1, Ordering::SeqCst);

        let gate = self.gate.lock().take();
        if let Some(gate) = gate {
            gate.notified().await;
        }

        if self.failing.load(Ordering::SeqCst) {
            return Err(BackgroundError::Unavailable("settings store is offline".to_string()));
        }
        let document = self.document.lock().clone();
        BackgroundSettings::from_value(document)
    }
}
