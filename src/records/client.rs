use super::RecordStore;
use crate::models::ProductRecord;
use crate::{Error, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct AppendResponse {
    id: String,
}

/// Record store backed by a JSON document API.
///
/// Documents are appended with `POST {base}/collections/{collection}/documents`;
/// the response body carries the generated id.
pub struct HttpRecordStore {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl HttpRecordStore {
    pub fn new(base_url: String, api_key: Option<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key,
        }
    }
}

#[async_trait]
impl RecordStore for HttpRecordStore {
    async fn append(&self, collection: &str, record: &ProductRecord) -> Result<String> {
        let url = format!("{}/collections/{}/documents", self.base_url, collection);

        let mut request = self.client.post(&url).json(record);
        if let Some(api_key) = &self.api_key {
            request = request.header("Authorization", format!("Bearer {}", api_key));
        }

        let response = request.send().await.map_err(|e| {
            tracing::error!("Failed to send record to document store: {}", e);
            e
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await?;
            tracing::error!("Document store error (status {}): {}", status, error_text);
            return Err(Error::Records(format!(
                "Document store error (status {}): {}",
                status, error_text
            )));
        }

        let body = response.text().await?;
        let appended: AppendResponse = serde_json::from_str(&body).map_err(|e| {
            tracing::error!("Failed to parse document store response: {}\nBody: {}", e, body);
            Error::Records(format!("Failed to parse document store response: {}", e))
        })?;

        Ok(appended.id)
    }
}
