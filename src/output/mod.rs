//! Output module for run results and stored listings
//!
//! This module handles:
//! - The append-only operational log written during a run
//! - The run summary shown on the console
//! - Rendering stored listings for the console and as markdown

mod listings;
mod oplog;
mod summary;

pub use listings::{format_markdown_listings, print_listings, write_markdown_listings};
pub use oplog::OperationLog;
pub use summary::{format_run_summary, print_run_summary, RunSummary};
