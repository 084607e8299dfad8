//! Data models and structures
//!
//! Defines the candidate file, the submitted form, the persisted product
//! record, and application configuration.

use serde::{Deserialize, Serialize};

/// A user-selected file awaiting validation and upload.
///
/// Held only for the duration of one form session; consumed read-only by
/// the submission workflow and never persisted.
#[derive(Debug, Clone)]
pub struct CandidateFile {
    pub name: String,
    /// Declared media type, as reported by the selecting UI.
    pub content_type: String,
    pub data: Vec<u8>,
}

impl CandidateFile {
    pub fn size_bytes(&self) -> u64 {
        self.data.len() as u64
    }
}

/// The four field values collected at the UI boundary.
#[derive(Debug, Clone, Default)]
pub struct ListingForm {
    pub title: String,
    /// Raw user-entered price text, parsed by the validation gate.
    pub price: String,
    pub description: String,
    pub file: Option<CandidateFile>,
}

/// The persisted document describing one listed item.
///
/// Field names serialize in camelCase so the stored document carries
/// `imageUrl` exactly as readers expect.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    pub title: String,
    pub price: f64,
    pub description: String,
    pub image_url: String,
}

// Configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub storage_access_key_id: Option<String>,
    pub storage_secret_access_key: Option<String>,
    pub storage_endpoint: String,
    pub storage_bucket: String,
    pub storage_public_base_url: String,
    pub records_endpoint: Option<String>,
    pub records_api_key: Option<String>,
    pub records_collection: String,
    pub upload_timeout_secs: u64,
    pub record_timeout_secs: u64,
    pub dry_run: bool,
}

impl Config {
    pub fn from_env() -> crate::Result<Self> {
        dotenvy::dotenv().ok();

        let dry_run = std::env::var("DRY_RUN")
            .map(|v| v == "1" || v.eq_ignore_ascii_case("true"))
            .unwrap_or(false);

        let storage_endpoint = std::env::var("STORAGE_ENDPOINT")
            .unwrap_or_else(|_| "https://nyc3.digitaloceanspaces.com".to_string());
        let storage_bucket =
            std::env::var("STORAGE_BUCKET").unwrap_or_else(|_| "adpost".to_string());
        let storage_public_base_url = std::env::var("STORAGE_PUBLIC_BASE_URL")
            .unwrap_or_else(|_| format!("{}/{}", storage_endpoint, storage_bucket));

        let config = Self {
            storage_access_key_id: std::env::var("STORAGE_ACCESS_KEY_ID").ok(),
            storage_secret_access_key: std::env::var("STORAGE_SECRET_ACCESS_KEY").ok(),
            storage_endpoint,
            storage_bucket,
            storage_public_base_url,
            records_endpoint: std::env::var("RECORDS_ENDPOINT").ok(),
            records_api_key: std::env::var("RECORDS_API_KEY").ok(),
            records_collection: std::env::var("RECORDS_COLLECTION")
                .unwrap_or_else(|_| "products".to_string()),
            upload_timeout_secs: env_u64("UPLOAD_TIMEOUT_SECS", 120),
            record_timeout_secs: env_u64("RECORD_TIMEOUT_SECS", 30),
            dry_run,
        };

        if !config.dry_run {
            for (name, value) in [
                ("STORAGE_ACCESS_KEY_ID", &config.storage_access_key_id),
                (
                    "STORAGE_SECRET_ACCESS_KEY",
                    &config.storage_secret_access_key,
                ),
                ("RECORDS_ENDPOINT", &config.records_endpoint),
            ] {
                if value.is_none() {
                    return Err(crate::Error::Config(format!("{} not set", name)));
                }
            }
        }

        Ok(config)
    }
}

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_record_serializes_with_camel_case_image_url() {
        let record = ProductRecord {
            title: "Lamp".to_string(),
            price: 25.0,
            description: "Desk lamp".to_string(),
            image_url: "https://cdn.example.com/files/lamp.png".to_string(),
        };

        let json = serde_json::to_string(&record).unwrap();
        assert!(json.contains("\"imageUrl\":\"https://cdn.example.com/files/lamp.png\""));
        assert!(json.contains("\"price\":25"));

        let deserialized: ProductRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, record);
    }

    #[test]
    fn test_candidate_file_size() {
        let file = CandidateFile {
            name: "photo.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0u8; 2_000_000],
        };
        assert_eq!(file.size_bytes(), 2_000_000);
    }
}
