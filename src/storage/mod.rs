//! Object store integration for uploaded listing images
//!
//! Handles storing image bytes in S3-compatible object storage and
//! resolving the durable public URL a stored object can be fetched from.

pub mod client;
pub mod mock;

pub use client::ObjectStoreClient;
pub use mock::MockObjectStore;

use crate::Result;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Handle to a fully stored object.
///
/// Only `store` produces one, so a URL can never be resolved for an upload
/// that has not completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub key: String,
}

#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// Store `data` under `key`, reporting progress as a non-decreasing
    /// percentage in `[0, 100]`. Honors `cancel` at I/O boundaries.
    async fn store(
        &self,
        key: &str,
        data: &[u8],
        content_type: &str,
        progress: &(dyn Fn(f64) + Send + Sync),
        cancel: &CancellationToken,
    ) -> Result<StoredObject>;

    /// Resolve the durable public URL for a stored object.
    async fn resolve_url(&self, object: &StoredObject) -> Result<String>;

    async fn exists(&self, key: &str) -> Result<bool>;
}
