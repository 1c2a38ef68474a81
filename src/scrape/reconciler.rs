//! Reconciliation of extracted records against the store
//!
//! Every keyed record gets an existence check and, when absent, an insert.
//! Rows are processed concurrently, but each row's outcome is independent:
//! a failing row never cancels or alters another.

use crate::listing::AdRecord;
use crate::output::OperationLog;
use crate::storage::{ListingStore, RowId, StorageError};
use chrono::Local;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Semaphore;
use tokio::task::{self, JoinSet};

/// Step of a row's check-then-insert pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowStage {
    ExistenceCheck,
    Insert,
    /// The row's task died before reporting back
    Task,
}

impl fmt::Display for RowStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ExistenceCheck => f.write_str("existence check"),
            Self::Insert => f.write_str("insert"),
            Self::Task => f.write_str("row task"),
        }
    }
}

/// Failure of one row, recorded without aborting the run
#[derive(Debug, Error)]
#[error("{stage} failed for {url}: {source}")]
pub struct RowError {
    pub url: String,
    pub stage: RowStage,
    #[source]
    pub source: StorageError,
}

/// Outcome of one reconciliation pass
#[derive(Debug, Default)]
pub struct ReconcileReport {
    /// Number of listings stored by this pass
    pub inserted: usize,

    /// Records whose url was already stored
    pub skipped_existing: usize,

    /// Records without a url, which cannot be checked and are not stored
    pub unkeyed: usize,

    /// Urls of the stored listings, in input order
    pub new_urls: Vec<String>,

    /// Rows that failed, in input order
    pub errors: Vec<RowError>,
}

impl ReconcileReport {
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }
}

enum RowOutcome {
    Inserted(RowId),
    AlreadyStored,
}

/// Inserts records the store does not know yet
pub struct Reconciler {
    store: Arc<dyn ListingStore>,
    max_concurrency: usize,
}

impl Reconciler {
    /// Creates a reconciler running at most `max_concurrency` rows at once
    pub fn new(store: Arc<dyn ListingStore>, max_concurrency: usize) -> Self {
        Self {
            store,
            max_concurrency: max_concurrency.max(1),
        }
    }

    /// Checks every record against the store and inserts the new ones
    ///
    /// Each insert is written to `log` as it is collected. Row failures end up
    /// in the report; this method itself never fails.
    pub async fn reconcile(&self, records: Vec<AdRecord>, log: &mut OperationLog) -> ReconcileReport {
        let mut report = ReconcileReport::default();
        let permits = Arc::new(Semaphore::new(self.max_concurrency));

        // Dropping the set aborts every row still in flight.
        let mut tasks = JoinSet::new();
        let mut urls: Vec<String> = Vec::new();
        let mut slot_of: HashMap<task::Id, usize> = HashMap::new();

        for record in records {
            let Some(url) = record.url.clone() else {
                tracing::warn!(
                    "Skipping ad without url (title: {})",
                    record.title.as_deref().unwrap_or("<none>")
                );
                report.unkeyed += 1;
                continue;
            };

            let store = Arc::clone(&self.store);
            let permits = Arc::clone(&permits);
            let task_url = url.clone();
            let handle = tasks.spawn(async move {
                let _permit = permits.acquire_owned().await;
                reconcile_row(store.as_ref(), &record, task_url).await
            });
            slot_of.insert(handle.id(), urls.len());
            urls.push(url);
        }

        let mut outcomes: Vec<Option<Result<RowOutcome, RowError>>> =
            urls.iter().map(|_| None).collect();

        while let Some(joined) = tasks.join_next_with_id().await {
            let (id, outcome) = match joined {
                Ok((id, outcome)) => (id, outcome),
                Err(e) => {
                    let id = e.id();
                    let url = slot_of
                        .get(&id)
                        .map(|&slot| urls[slot].clone())
                        .unwrap_or_default();
                    (
                        id,
                        Err(RowError {
                            url,
                            stage: RowStage::Task,
                            source: StorageError::from(e),
                        }),
                    )
                }
            };

            if let Some(&slot) = slot_of.get(&id) {
                outcomes[slot] = Some(outcome);
            }
        }

        for (url, outcome) in urls.into_iter().zip(outcomes) {
            let Some(outcome) = outcome else {
                continue;
            };

            match outcome {
                Ok(RowOutcome::Inserted(id)) => {
                    tracing::info!("New entry {} stored with id {}", url, id);
                    if let Err(e) = log.record_new_entry(&url, Local::now()) {
                        tracing::warn!(
                            "Failed to write to operation log {}: {}",
                            log.path().display(),
                            e
                        );
                    }
                    report.inserted += 1;
                    report.new_urls.push(url);
                }
                Ok(RowOutcome::AlreadyStored) => {
                    report.skipped_existing += 1;
                }
                Err(e) => {
                    tracing::error!("{}", e);
                    report.errors.push(e);
                }
            }
        }

        if report.inserted == 0 {
            tracing::info!("No new entries found");
        } else {
            tracing::info!("{} new entries added", report.inserted);
        }
        if report.has_errors() {
            tracing::warn!("{} rows failed", report.errors.len());
        }

        report
    }
}

async fn reconcile_row(
    store: &dyn ListingStore,
    record: &AdRecord,
    url: String,
) -> Result<RowOutcome, RowError> {
    let exists = match store.exists_by_url(&url).await {
        Ok(exists) => exists,
        Err(source) => {
            return Err(RowError {
                url,
                stage: RowStage::ExistenceCheck,
                source,
            })
        }
    };

    if exists {
        tracing::trace!("{} already stored", url);
        return Ok(RowOutcome::AlreadyStored);
    }

    match store.insert(record).await {
        Ok(id) => Ok(RowOutcome::Inserted(id)),
        Err(source) => Err(RowError {
            url,
            stage: RowStage::Insert,
            source,
        }),
    }
}
