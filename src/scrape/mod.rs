//! Scrape module for fetching and ingesting listings
//!
//! This module contains the ingestion pipeline:
//! - HTTP fetching of the listings page
//! - Ad card extraction with per-field fallback selectors
//! - De-duplication by listing url
//! - Reconciliation against the store
//! - Overall run coordination

mod coordinator;
mod dedup;
mod extractor;
mod fetcher;
mod reconciler;

pub use coordinator::{run_scrape, Coordinator};
pub use dedup::dedupe;
pub use extractor::{Extract, Extractor, FieldRule, FieldRules, CARD_SELECTOR};
pub use fetcher::{build_http_client, fetch_page};
pub use reconciler::{ReconcileReport, Reconciler, RowError, RowStage};
