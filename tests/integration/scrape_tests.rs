//! Integration tests for the scrape pipeline
//!
//! These tests use wiremock to serve a listings page and a temporary SQLite
//! store to run the full fetch, extract, reconcile cycle end-to-end.

use async_trait::async_trait;
use finn_scout::config::{Config, LogConfig, SourceConfig, StoreConfig, StoreTarget};
use finn_scout::scrape::Coordinator;
use finn_scout::storage::{
    Dialect, ListingStore, RowId, SqliteStore, StorageError, StorageResult,
};
use finn_scout::{AdRecord, ScoutError, StoredListing};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CARD_CLASSES: &str =
    "relative cursor-pointer overflow-hidden transition-all outline-none f-card rounded-8";

fn card(url: &str, title: &str, price: &str) -> String {
    format!(
        r#"<article class="{classes}">
            <a class="sf-search-ad-link absolute inset-0" href="{url}">
                <div class="aspect-w-16 aspect-h-9 bg-white"><img src="https://images.example.com{url}.jpg"></div>
            </a>
            <div class="mt-4"><span class="text-14 text-gray-500">Storgata 1, Oslo</span></div>
            <h3>{title}</h3>
            <div class="mt-16 flex justify-between"><span>54 m²</span><span>{price}</span></div>
        </article>"#,
        classes = CARD_CLASSES,
        url = url,
        title = title,
        price = price
    )
}

fn page(cards: &[String]) -> String {
    format!(
        "<html><head><title>Results</title></head><body><main>{}</main></body></html>",
        cards.join("\n")
    )
}

/// Creates a test configuration pointing at the mock server and a temp store
fn create_test_config(source_url: &str, dir: &Path) -> Config {
    Config {
        store: StoreConfig {
            target: StoreTarget::Sqlite {
                path: dir.join("scout.db"),
            },
            max_concurrency: 4,
        },
        source: SourceConfig {
            url: source_url.to_string(),
            timeout: Duration::from_secs(5),
            user_agent: "finn-scout-test/1.0".to_string(),
        },
        log: LogConfig {
            path: dir.join("log.txt"),
        },
    }
}

async fn serve_page(mock_server: &MockServer, body: String) {
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(body)
                .insert_header("content-type", "text/html; charset=utf-8"),
        )
        .mount(mock_server)
        .await;
}

fn coordinator(config: &Config) -> (Coordinator, Arc<dyn ListingStore>) {
    let StoreTarget::Sqlite { path } = &config.store.target else {
        panic!("test config must use sqlite");
    };
    let store: Arc<dyn ListingStore> = Arc::new(SqliteStore::new(path));
    let coordinator = Coordinator::with_store(config.clone(), Arc::clone(&store))
        .expect("Failed to build coordinator");
    (coordinator, store)
}

#[tokio::test]
async fn test_duplicate_cards_are_stored_once() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    serve_page(
        &mock_server,
        page(&[
            card("/ad/123", "Lys leilighet", "3 950 000 kr"),
            card("/ad/123", "Lys leilighet", "3 950 000 kr"),
        ]),
    )
    .await;

    let config = create_test_config(&format!("{}/search", mock_server.uri()), temp_dir.path());
    let (coordinator, store) = coordinator(&config);

    let summary = coordinator.run().await.expect("Run failed");

    assert!(summary.table_created);
    assert_eq!(summary.extracted, 2);
    assert_eq!(summary.unique, 1);
    assert_eq!(summary.report.inserted, 1);
    assert!(!summary.report.has_errors());

    let listings = store.list_listings().await.unwrap();
    assert_eq!(listings.len(), 1);
    assert_eq!(listings[0].record.url.as_deref(), Some("/ad/123"));
    assert_eq!(listings[0].record.title.as_deref(), Some("Lys leilighet"));
    assert_eq!(listings[0].record.price.as_deref(), Some("3 950 000 kr"));
    assert_eq!(listings[0].record.area.as_deref(), Some("54 m²"));
    assert_eq!(
        listings[0].record.address.as_deref(),
        Some("Storgata 1, Oslo")
    );
}

#[tokio::test]
async fn test_already_stored_listing_is_not_inserted() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    serve_page(&mock_server, page(&[card("/ad/9", "Rekkehus", "5 100 000 kr")])).await;

    let config = create_test_config(&format!("{}/search", mock_server.uri()), temp_dir.path());
    let (coordinator, store) = coordinator(&config);

    finn_scout::storage::ensure_schema(store.as_ref())
        .await
        .unwrap();
    store
        .insert(&AdRecord {
            url: Some("/ad/9".to_string()),
            title: Some("Rekkehus".to_string()),
            ..Default::default()
        })
        .await
        .unwrap();

    let summary = coordinator.run().await.expect("Run failed");

    assert!(!summary.table_created);
    assert_eq!(summary.report.inserted, 0);
    assert_eq!(summary.report.skipped_existing, 1);
    assert!(!summary.report.has_errors());
    assert_eq!(store.list_listings().await.unwrap().len(), 1);
}

#[tokio::test]
async fn test_second_run_is_idempotent() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    serve_page(
        &mock_server,
        page(&[
            card("/ad/1", "Hytte", "1 990 000 kr"),
            card("/ad/2", "Enebolig", "7 500 000 kr"),
            card("/ad/3", "Leilighet", "2 800 000 kr"),
        ]),
    )
    .await;

    let config = create_test_config(&format!("{}/search", mock_server.uri()), temp_dir.path());
    let (coordinator, store) = coordinator(&config);

    let first = coordinator.run().await.expect("First run failed");
    assert!(first.table_created);
    assert_eq!(first.report.inserted, 3);

    let second = coordinator.run().await.expect("Second run failed");
    assert!(!second.table_created);
    assert_eq!(second.report.inserted, 0);
    assert_eq!(second.report.skipped_existing, 3);

    assert_eq!(store.list_listings().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_server_error_aborts_before_ingest() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/search", mock_server.uri()), temp_dir.path());
    let (coordinator, store) = coordinator(&config);

    let result = coordinator.run().await;
    assert!(matches!(result, Err(ScoutError::Fetch(_))));

    // The schema check runs before the fetch, so the table is there but empty
    assert!(store.list_listings().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_operation_log_records_run_and_new_entries() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    serve_page(
        &mock_server,
        page(&[
            card("/ad/10", "Hytte", "1 990 000 kr"),
            card("/ad/11", "Enebolig", "7 500 000 kr"),
        ]),
    )
    .await;

    let config = create_test_config(&format!("{}/search", mock_server.uri()), temp_dir.path());
    let (coordinator, _store) = coordinator(&config);

    coordinator.run().await.expect("First run failed");
    coordinator.run().await.expect("Second run failed");

    let log = std::fs::read_to_string(&config.log.path).unwrap();
    let lines: Vec<&str> = log.lines().collect();

    let run_starts = lines
        .iter()
        .filter(|l| l.starts_with("New scrape at: "))
        .count();
    assert_eq!(run_starts, 2);

    let entries: Vec<&&str> = lines
        .iter()
        .filter(|l| l.starts_with("New entry added to database at "))
        .collect();
    assert_eq!(entries.len(), 2);
    assert!(entries[0].ends_with("URL: /ad/10"));
    assert!(entries[1].ends_with("URL: /ad/11"));
}

#[tokio::test]
async fn test_preview_does_not_touch_store() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    serve_page(
        &mock_server,
        page(&[
            card("/ad/5", "Hytte", "1 990 000 kr"),
            card("/ad/5", "Hytte", "1 990 000 kr"),
        ]),
    )
    .await;

    let config = create_test_config(&format!("{}/search", mock_server.uri()), temp_dir.path());
    let (coordinator, _store) = coordinator(&config);

    let records = coordinator.preview().await.expect("Preview failed");
    assert_eq!(records.len(), 1);
    assert!(!temp_dir.path().join("scout.db").exists());
    assert!(!config.log.path.exists());
}

/// Store whose metadata lookup always fails, as with an unreachable server
struct UnreachableStore;

#[async_trait]
impl ListingStore for UnreachableStore {
    fn dialect(&self) -> Dialect {
        Dialect::MySql
    }

    async fn table_exists(&self, _name: &str) -> StorageResult<bool> {
        Err(StorageError::Task("connection refused".to_string()))
    }

    async fn create_table(&self, _ddl: &str) -> StorageResult<()> {
        panic!("create_table must not run when the metadata lookup failed");
    }

    async fn exists_by_url(&self, _url: &str) -> StorageResult<bool> {
        panic!("exists_by_url must not run after a schema failure");
    }

    async fn insert(&self, _record: &AdRecord) -> StorageResult<RowId> {
        panic!("insert must not run after a schema failure");
    }

    async fn list_listings(&self) -> StorageResult<Vec<StoredListing>> {
        Ok(Vec::new())
    }
}

#[tokio::test]
async fn test_schema_failure_aborts_before_fetch() {
    let mock_server = MockServer::start().await;
    let temp_dir = TempDir::new().unwrap();

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_string(page(&[card("/ad/1", "Hytte", "1 kr")])),
        )
        .expect(0)
        .mount(&mock_server)
        .await;

    let config = create_test_config(&format!("{}/search", mock_server.uri()), temp_dir.path());
    let coordinator = Coordinator::with_store(config.clone(), Arc::new(UnreachableStore))
        .expect("Failed to build coordinator");

    let result = coordinator.run().await;
    assert!(matches!(result, Err(ScoutError::Schema(_))));

    // The run start is still recorded, but nothing was added
    let log = std::fs::read_to_string(&config.log.path).unwrap();
    assert_eq!(log.lines().count(), 1);
    assert!(log.starts_with("New scrape at: "));

    mock_server.verify().await;
}
