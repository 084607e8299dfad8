//! Document store integration for persisted product records
//!
//! Appends one flat document per submission to a named collection and
//! returns the generated record identifier.

pub mod client;
pub mod mock;

pub use client::HttpRecordStore;
pub use mock::MockRecordStore;

use crate::models::ProductRecord;
use crate::Result;
use async_trait::async_trait;

#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Append `record` to `collection`, returning the generated record id.
    /// The write is durable once this returns success.
    async fn append(&self, collection: &str, record: &ProductRecord) -> Result<String>;
}
