//! Scrape run coordinator
//!
//! One run is: open the operation log, make sure the table exists, fetch the
//! listings page, extract and de-duplicate ad cards, then reconcile them with
//! the store. Schema and fetch failures end the run; row failures do not.

use crate::config::Config;
use crate::listing::AdRecord;
use crate::output::{OperationLog, RunSummary};
use crate::scrape::dedup::dedupe;
use crate::scrape::extractor::Extractor;
use crate::scrape::fetcher::{build_http_client, fetch_page};
use crate::scrape::reconciler::Reconciler;
use crate::storage::{ensure_schema, open_store, ListingStore};
use crate::{FetchError, ScoutError};
use chrono::Local;
use reqwest::Client;
use std::sync::Arc;

/// Main scrape coordinator structure
pub struct Coordinator {
    config: Config,
    store: Arc<dyn ListingStore>,
    client: Client,
    extractor: Extractor,
}

impl Coordinator {
    /// Creates a coordinator using the store described by the configuration
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new(config: Config) -> Result<Self, ScoutError> {
        let store = open_store(&config.store);
        Self::with_store(config, store)
    }

    /// Creates a coordinator around an existing store
    pub fn with_store(config: Config, store: Arc<dyn ListingStore>) -> Result<Self, ScoutError> {
        let client = build_http_client(&config.source).map_err(|source| FetchError::Transport {
            url: config.source.url.clone(),
            source,
        })?;
        let extractor = Extractor::new()?;

        Ok(Self {
            config,
            store,
            client,
            extractor,
        })
    }

    pub fn store(&self) -> &Arc<dyn ListingStore> {
        &self.store
    }

    /// Runs one fetch-and-reconcile pass
    ///
    /// # Returns
    ///
    /// * `Ok(RunSummary)` - The run completed; row failures are listed inside
    /// * `Err(ScoutError)` - The log, schema check, fetch, or extraction failed
    pub async fn run(&self) -> Result<RunSummary, ScoutError> {
        let mut log = OperationLog::open(&self.config.log.path)?;
        log.record_run_start(Local::now())?;

        let result = self.run_with_log(&mut log).await;
        settle(result, log.close())
    }

    async fn run_with_log(&self, log: &mut OperationLog) -> Result<RunSummary, ScoutError> {
        let table_existed = ensure_schema(self.store.as_ref()).await?;
        if !table_existed {
            tracing::info!("Table created successfully");
        }

        tracing::info!("Fetching {}", self.config.source.url);
        let records = self.fetch_records().await?;
        let extracted = records.len();

        let unique = dedupe(records);
        tracing::info!(
            "Found {} ads, {} after removing duplicates",
            extracted,
            unique.len()
        );

        let unique_count = unique.len();
        let reconciler = Reconciler::new(
            Arc::clone(&self.store),
            self.config.store.max_concurrency as usize,
        );
        let report = reconciler.reconcile(unique, log).await;

        Ok(RunSummary {
            table_created: !table_existed,
            extracted,
            unique: unique_count,
            report,
        })
    }

    /// Fetches and extracts the listings page without touching the store
    pub async fn preview(&self) -> Result<Vec<AdRecord>, ScoutError> {
        let records = self.fetch_records().await?;
        Ok(dedupe(records))
    }

    async fn fetch_records(&self) -> Result<Vec<AdRecord>, ScoutError> {
        let body = fetch_page(&self.client, &self.config.source.url).await?;
        Ok(self.extractor.extract(&body))
    }
}

/// Combines a run's result with the outcome of closing its log
///
/// A failed run reports its own error even when closing the log fails too.
fn settle(
    result: Result<RunSummary, ScoutError>,
    closed: std::io::Result<()>,
) -> Result<RunSummary, ScoutError> {
    let summary = result?;
    closed?;
    Ok(summary)
}

/// Runs one scrape pass with the given configuration and releases the store
pub async fn run_scrape(config: Config) -> Result<RunSummary, ScoutError> {
    let coordinator = Coordinator::new(config)?;
    let result = coordinator.run().await;
    coordinator.store().close().await;
    result
}
