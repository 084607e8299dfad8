//! Submission workflow orchestration for posting one product listing.

use crate::models::{Config, ListingForm, ProductRecord};
use crate::notify::{ConsoleNotifier, Notifier};
use crate::records::{HttpRecordStore, MockRecordStore, RecordStore};
use crate::storage::{MockObjectStore, ObjectStore, ObjectStoreClient};
use crate::validation::{self, ValidationError};
use crate::{Error, Result};
use std::time::Duration;
use tokio::sync::{watch, Mutex};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Namespace uploaded objects are stored under.
const FILES_PREFIX: &str = "files";

const DEFAULT_UPLOAD_TIMEOUT: Duration = Duration::from_secs(120);
const DEFAULT_RECORD_TIMEOUT: Duration = Duration::from_secs(30);

/// Per-attempt submission state. Rendering derives from this, never the
/// reverse.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionState {
    Idle,
    Guarding,
    Uploading { percent: f64 },
    Resolving,
    Recording,
    Succeeded { record_id: String },
    Failed { message: String },
}

/// Injectable service bundle used to construct [`SubmissionWorkflow`] in
/// tests/harnesses.
pub struct WorkflowServices {
    pub store: Box<dyn ObjectStore>,
    pub records: Box<dyn RecordStore>,
    pub notifier: Box<dyn Notifier>,
}

/// Coordinates validation, image upload, URL resolution, and the record
/// write for one submission at a time.
pub struct SubmissionWorkflow {
    store: Box<dyn ObjectStore>,
    records: Box<dyn RecordStore>,
    notifier: Box<dyn Notifier>,
    collection: String,
    upload_timeout: Duration,
    record_timeout: Duration,
    state: watch::Sender<SubmissionState>,
    in_flight: Mutex<()>,
}

impl SubmissionWorkflow {
    /// Build a workflow from concrete service dependencies.
    ///
    /// This is primarily useful for integration tests and local harnesses
    /// that need to inject mocks.
    pub fn with_services(services: WorkflowServices, collection: String) -> Self {
        let (state, _) = watch::channel(SubmissionState::Idle);
        Self {
            store: services.store,
            records: services.records,
            notifier: services.notifier,
            collection,
            upload_timeout: DEFAULT_UPLOAD_TIMEOUT,
            record_timeout: DEFAULT_RECORD_TIMEOUT,
            state,
            in_flight: Mutex::new(()),
        }
    }

    pub fn with_timeouts(mut self, upload: Duration, record: Duration) -> Self {
        self.upload_timeout = upload;
        self.record_timeout = record;
        self
    }

    /// Construct a workflow from environment configuration
    /// (`Config::from_env`).
    pub async fn new() -> Result<Self> {
        let config = Config::from_env()?;

        let store: Box<dyn ObjectStore> = if config.dry_run {
            info!("DRY_RUN enabled — using mock backends, no network calls will be made");
            Box::new(
                MockObjectStore::new().with_base_url(config.storage_public_base_url.clone()),
            )
        } else {
            Box::new(
                ObjectStoreClient::new(
                    config
                        .storage_access_key_id
                        .clone()
                        .expect("STORAGE_ACCESS_KEY_ID validated in Config::from_env"),
                    config
                        .storage_secret_access_key
                        .clone()
                        .expect("STORAGE_SECRET_ACCESS_KEY validated in Config::from_env"),
                    config.storage_endpoint.clone(),
                    config.storage_bucket.clone(),
                    config.storage_public_base_url.clone(),
                )
                .await?,
            )
        };

        let records: Box<dyn RecordStore> = if config.dry_run {
            Box::new(MockRecordStore::new())
        } else {
            Box::new(HttpRecordStore::new(
                config
                    .records_endpoint
                    .clone()
                    .expect("RECORDS_ENDPOINT validated in Config::from_env"),
                config.records_api_key.clone(),
                Duration::from_secs(config.record_timeout_secs),
            ))
        };

        Ok(Self::with_services(
            WorkflowServices {
                store,
                records,
                notifier: Box::new(ConsoleNotifier),
            },
            config.records_collection.clone(),
        )
        .with_timeouts(
            Duration::from_secs(config.upload_timeout_secs),
            Duration::from_secs(config.record_timeout_secs),
        ))
    }

    /// Observe the per-attempt submission state.
    pub fn state(&self) -> watch::Receiver<SubmissionState> {
        self.state.subscribe()
    }

    /// Run one submission attempt to a terminal state.
    ///
    /// Rejects immediately if another attempt is in flight. Every outcome
    /// is surfaced through the notifier; the returned result carries the
    /// generated record id on success.
    pub async fn submit(&self, form: ListingForm, cancel: &CancellationToken) -> Result<String> {
        let _in_flight = self
            .in_flight
            .try_lock()
            .map_err(|_| Error::SubmissionInFlight)?;

        self.state.send_replace(SubmissionState::Guarding);

        let outcome = self.run_phases(form, cancel).await;

        match &outcome {
            Ok(record_id) => {
                self.state.send_replace(SubmissionState::Succeeded {
                    record_id: record_id.clone(),
                });
                self.notifier.notify_success("Product added successfully");
                info!("Product record written with id {}", record_id);
            }
            Err(e) => {
                self.state.send_replace(SubmissionState::Failed {
                    message: e.to_string(),
                });
                match e {
                    Error::Validation(validation) => {
                        self.notifier.notify_error(&validation.to_string());
                    }
                    Error::Cancelled => {
                        self.notifier.notify_error("Submission cancelled");
                    }
                    _ => {
                        self.notifier.notify_error("Error adding product");
                        error!("Error adding product: {}", e);
                    }
                }
            }
        }

        outcome
    }

    async fn run_phases(&self, form: ListingForm, cancel: &CancellationToken) -> Result<String> {
        // Guard: no network call happens past a failure here.
        let file = form.file.ok_or(ValidationError::MissingFile)?;
        validation::check_size(&file)?;
        let price = validation::parse_price(&form.price)?;

        let key = format!("{}/{}", FILES_PREFIX, file.name);
        info!("Uploading {} ({} bytes)", key, file.size_bytes());

        self.state
            .send_replace(SubmissionState::Uploading { percent: 0.0 });
        let progress = |percent: f64| {
            self.state
                .send_replace(SubmissionState::Uploading { percent });
        };

        let object = tokio::time::timeout(
            self.upload_timeout,
            self.store
                .store(&key, &file.data, &file.content_type, &progress, cancel),
        )
        .await
        .map_err(|_| Error::Timeout("Upload".to_string()))??;

        if cancel.is_cancelled() {
            return Err(Error::Cancelled);
        }

        self.state.send_replace(SubmissionState::Resolving);
        let image_url = self.store.resolve_url(&object).await?;
        info!("Resolved object URL: {}", image_url);

        self.state.send_replace(SubmissionState::Recording);
        let record = ProductRecord {
            title: form.title,
            price,
            description: form.description,
            image_url,
        };

        let appended = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(Error::Cancelled),
            result = tokio::time::timeout(
                self.record_timeout,
                self.records.append(&self.collection, &record),
            ) => result
                .map_err(|_| Error::Timeout("Record write".to_string()))
                .and_then(|r| r),
        };

        match appended {
            Ok(record_id) => Ok(record_id),
            Err(e) => {
                // No compensating delete: the object stays for an offline
                // reconciliation sweep.
                warn!(
                    "Record write failed; uploaded object '{}' left for reconciliation",
                    object.key
                );
                Err(e)
            }
        }
    }
}
