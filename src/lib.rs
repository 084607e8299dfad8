//! Headless client for posting a product listing ("Post an Ad")
//!
//! Submits one listing per run: validates the selected image, uploads it to
//! S3-compatible object storage, resolves its public URL, then appends a
//! product record referencing that URL to a document-store collection.

pub mod error;
pub mod models;
pub mod notify;
pub mod records;
pub mod storage;
pub mod validation;
pub mod workflow;

pub use error::{Error, Result};
