use adpost::models::{CandidateFile, ListingForm, ProductRecord};
use adpost::notify::MockNotifier;
use adpost::records::MockRecordStore;
use adpost::storage::{MockObjectStore, ObjectStore};
use adpost::validation::{self, ValidationError};
use adpost::workflow::{SubmissionWorkflow, WorkflowServices};
use adpost::Error;
use pretty_assertions::assert_eq;
use std::fs;
use std::sync::{Arc, Mutex};
use tokio_util::sync::CancellationToken;

const TEST_BASE_URL: &str = "https://cdn.test";

struct TestHarness {
    workflow: SubmissionWorkflow,
    store: MockObjectStore,
    records: MockRecordStore,
    notifier: MockNotifier,
    journal: Arc<Mutex<Vec<String>>>,
}

fn build_test_harness(store: MockObjectStore, records: MockRecordStore) -> TestHarness {
    let journal = Arc::new(Mutex::new(Vec::new()));
    let store = store
        .with_base_url(TEST_BASE_URL.to_string())
        .with_journal(journal.clone());
    let records = records.with_journal(journal.clone());
    let notifier = MockNotifier::new();

    let workflow = SubmissionWorkflow::with_services(
        WorkflowServices {
            store: Box::new(store.clone()),
            records: Box::new(records.clone()),
            notifier: Box::new(notifier.clone()),
        },
        "products".to_string(),
    );

    TestHarness {
        workflow,
        store,
        records,
        notifier,
        journal,
    }
}

fn lamp_form(size: usize) -> ListingForm {
    ListingForm {
        title: "Lamp".to_string(),
        price: "25".to_string(),
        description: "Desk lamp".to_string(),
        file: Some(CandidateFile {
            name: "lamp.png".to_string(),
            content_type: "image/png".to_string(),
            data: vec![0u8; size],
        }),
    }
}

#[tokio::test]
async fn test_successful_submission_calls_store_then_resolve_then_append() {
    let harness = build_test_harness(MockObjectStore::new(), MockRecordStore::new());

    harness
        .workflow
        .submit(lamp_form(2_000_000), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        *harness.journal.lock().unwrap(),
        vec!["store", "resolve_url", "append"]
    );
    assert_eq!(harness.store.get_store_count(), 1);
    assert_eq!(harness.store.get_resolve_count(), 1);
    assert_eq!(harness.records.get_append_count(), 1);

    // The stored object lives under the files/ namespace and the appended
    // record references exactly the resolved URL.
    let objects = harness.store.get_objects();
    assert_eq!(objects["files/lamp.png"].len(), 2_000_000);

    let records = harness.records.get_records();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].0, "products");
    assert_eq!(
        records[0].1,
        ProductRecord {
            title: "Lamp".to_string(),
            price: 25.0,
            description: "Desk lamp".to_string(),
            image_url: format!("{}/files/lamp.png", TEST_BASE_URL),
        }
    );

    assert_eq!(
        harness.notifier.get_successes(),
        vec!["Product added successfully"]
    );
    assert!(harness.notifier.get_errors().is_empty());
}

#[tokio::test]
async fn test_oversized_file_aborts_before_any_network_call() {
    let harness = build_test_harness(MockObjectStore::new(), MockRecordStore::new());

    let err = harness
        .workflow
        .submit(lamp_form(6_000_000), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        Error::Validation(ValidationError::FileTooLarge { .. })
    ));
    assert_eq!(harness.store.get_store_count(), 0);
    assert_eq!(harness.records.get_append_count(), 0);
    assert!(harness.journal.lock().unwrap().is_empty());
    assert_eq!(
        harness.notifier.get_errors(),
        vec!["File size must be less than 5MB"]
    );
}

#[tokio::test]
async fn test_store_failure_skips_record_phase() {
    let harness = build_test_harness(
        MockObjectStore::new().with_store_failure("network unreachable".to_string()),
        MockRecordStore::new(),
    );

    let err = harness
        .workflow
        .submit(lamp_form(2_000_000), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Storage(_)));
    assert_eq!(harness.records.get_append_count(), 0);
    assert_eq!(*harness.journal.lock().unwrap(), vec!["store"]);
    assert_eq!(harness.notifier.get_errors(), vec!["Error adding product"]);
    assert!(harness.notifier.get_successes().is_empty());
}

#[tokio::test]
async fn test_record_failure_reports_failure_and_leaves_uploaded_object() {
    let harness = build_test_harness(
        MockObjectStore::new(),
        MockRecordStore::new().with_append_failure("write denied".to_string()),
    );

    let err = harness
        .workflow
        .submit(lamp_form(2_000_000), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, Error::Records(_)));
    assert_eq!(
        *harness.journal.lock().unwrap(),
        vec!["store", "resolve_url", "append"]
    );

    // The upload is neither retried nor rolled back; the orphaned object
    // stays behind for reconciliation.
    assert_eq!(harness.store.get_store_count(), 1);
    assert!(harness.store.exists("files/lamp.png").await.unwrap());
    assert_eq!(harness.notifier.get_errors(), vec!["Error adding product"]);
}

#[tokio::test]
async fn test_repeated_submission_overwrites_object_under_same_name() {
    let harness = build_test_harness(MockObjectStore::new(), MockRecordStore::new());

    harness
        .workflow
        .submit(lamp_form(1_000), &CancellationToken::new())
        .await
        .unwrap();
    harness
        .workflow
        .submit(lamp_form(2_000), &CancellationToken::new())
        .await
        .unwrap();

    let objects = harness.store.get_objects();
    assert_eq!(objects.len(), 1);
    assert_eq!(objects["files/lamp.png"].len(), 2_000);
    assert_eq!(harness.records.get_append_count(), 2);
}

#[tokio::test]
async fn test_selection_gate_from_on_disk_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("lamp.png");
    fs::write(&path, vec![0u8; 1_024]).unwrap();

    let candidate = CandidateFile {
        name: "lamp.png".to_string(),
        content_type: "image/png".to_string(),
        data: fs::read(&path).unwrap(),
    };

    let accepted = validation::select_file(candidate).unwrap();
    assert_eq!(accepted.size_bytes(), 1_024);

    let rejected = validation::select_file(CandidateFile {
        name: "notes.pdf".to_string(),
        content_type: "application/pdf".to_string(),
        data: vec![0u8; 16],
    });
    assert_eq!(
        rejected.unwrap_err().to_string(),
        "Please select an image file (png or jpeg)"
    );
}
