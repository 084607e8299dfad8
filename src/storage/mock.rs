use super::{ObjectStore, StoredObject};
use crate::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Chunk size the mock uses to simulate transport-level progress ticks.
const MOCK_CHUNK_SIZE: usize = 256 * 1024;

#[derive(Clone)]
pub struct MockObjectStore {
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    base_url: String,
    store_count: Arc<Mutex<usize>>,
    resolve_count: Arc<Mutex<usize>>,
    fail_store: Option<String>,
    store_delay: Option<Duration>,
    journal: Option<Arc<Mutex<Vec<String>>>>,
}

impl MockObjectStore {
    pub fn new() -> Self {
        Self {
            objects: Arc::new(Mutex::new(HashMap::new())),
            base_url: "https://mock-store.example.com".to_string(),
            store_count: Arc::new(Mutex::new(0)),
            resolve_count: Arc::new(Mutex::new(0)),
            fail_store: None,
            store_delay: None,
            journal: None,
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url;
        self
    }

    pub fn with_object(self, key: String, content: Vec<u8>) -> Self {
        self.objects.lock().unwrap().insert(key, content);
        self
    }

    /// Make every `store` call fail with the given message.
    pub fn with_store_failure(mut self, message: String) -> Self {
        self.fail_store = Some(message);
        self
    }

    /// Delay `store` before it completes, to keep a submission in flight.
    pub fn with_store_delay(mut self, delay: Duration) -> Self {
        self.store_delay = Some(delay);
        self
    }

    /// Record call names into a journal shared with other mocks so tests
    /// can assert cross-service ordering.
    pub fn with_journal(mut self, journal: Arc<Mutex<Vec<String>>>) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn get_store_count(&self) -> usize {
        *self.store_count.lock().unwrap()
    }

    pub fn get_resolve_count(&self) -> usize {
        *self.resolve_count.lock().unwrap()
    }

    pub fn get_objects(&self) -> HashMap<String, Vec<u8>> {
        self.objects.lock().unwrap().clone()
    }

    fn journal_push(&self, call: &str) {
        if let Some(journal) = &self.journal {
            journal.lock().unwrap().push(call.to_string());
        }
    }
}

impl Default for MockObjectStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ObjectStore for MockObjectStore {
    async fn store(
        &self,
        key: &str,
        data: &[u8],
        _content_type: &str,
        progress: &(dyn Fn(f64) + Send + Sync),
        cancel: &CancellationToken,
    ) -> Result<StoredObject> {
        self.journal_push("store");
        *self.store_count.lock().unwrap() += 1;

        if let Some(delay) = self.store_delay {
            tokio::select! {
                _ = cancel.cancelled() => return Err(Error::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        if let Some(message) = &self.fail_store {
            return Err(Error::Storage(message.clone()));
        }

        progress(0.0);
        let total = data.len().max(1);
        let mut sent = 0usize;
        for chunk in data.chunks(MOCK_CHUNK_SIZE) {
            sent += chunk.len();
            progress(sent as f64 / total as f64 * 100.0);
        }
        progress(100.0);

        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), data.to_vec());

        Ok(StoredObject {
            key: key.to_string(),
        })
    }

    async fn resolve_url(&self, object: &StoredObject) -> Result<String> {
        self.journal_push("resolve_url");
        *self.resolve_count.lock().unwrap() += 1;

        if !self.objects.lock().unwrap().contains_key(&object.key) {
            return Err(Error::Storage(format!("Object not found: {}", object.key)));
        }
        Ok(format!("{}/{}", self.base_url, object.key))
    }

    async fn exists(&self, key: &str) -> Result<bool> {
        Ok(self.objects.lock().unwrap().contains_key(key))
    }
}
