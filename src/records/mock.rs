use super::RecordStore;
use crate::models::ProductRecord;
use crate::{Error, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};
use uuid::Uuid;

#[derive(Clone)]
pub struct MockRecordStore {
    records: Arc<Mutex<Vec<(String, ProductRecord)>>>,
    append_count: Arc<Mutex<usize>>,
    fail_append: Option<String>,
    journal: Option<Arc<Mutex<Vec<String>>>>,
}

impl MockRecordStore {
    pub fn new() -> Self {
        Self {
            records: Arc::new(Mutex::new(Vec::new())),
            append_count: Arc::new(Mutex::new(0)),
            fail_append: None,
            journal: None,
        }
    }

    /// Make every `append` call fail with the given message.
    pub fn with_append_failure(mut self, message: String) -> Self {
        self.fail_append = Some(message);
        self
    }

    /// Record call names into a journal shared with other mocks so tests
    /// can assert cross-service ordering.
    pub fn with_journal(mut self, journal: Arc<Mutex<Vec<String>>>) -> Self {
        self.journal = Some(journal);
        self
    }

    pub fn get_append_count(&self) -> usize {
        *self.append_count.lock().unwrap()
    }

    pub fn get_records(&self) -> Vec<(String, ProductRecord)> {
        self.records.lock().unwrap().clone()
    }
}

impl Default for MockRecordStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RecordStore for MockRecordStore {
    async fn append(&self, collection: &str, record: &ProductRecord) -> Result<String> {
        if let Some(journal) = &self.journal {
            journal.lock().unwrap().push("append".to_string());
        }
        *self.append_count.lock().unwrap() += 1;

        if let Some(message) = &self.fail_append {
            return Err(Error::Records(message.clone()));
        }

        self.records
            .lock()
            .unwrap()
            .push((collection.to_string(), record.clone()));

        Ok(Uuid::new_v4().to_string())
    }
}
