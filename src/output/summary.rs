//! Run summary
//!
//! The console-facing result of one scrape run.

use crate::scrape::ReconcileReport;

/// Result of one completed run
#[derive(Debug)]
pub struct RunSummary {
    /// Whether the listings table had to be created by this run
    pub table_created: bool,

    /// Ad cards found on the page
    pub extracted: usize,

    /// Ad cards left after de-duplication
    pub unique: usize,

    /// Outcome of reconciling the unique cards with the store
    pub report: ReconcileReport,
}

/// Formats the summary as console lines
pub fn format_run_summary(summary: &RunSummary) -> Vec<String> {
    let report = &summary.report;
    let mut lines = Vec::new();

    if summary.table_created {
        lines.push("Table created successfully!".to_string());
    }

    lines.push(format!(
        "Scraped {} ads ({} unique)",
        summary.extracted, summary.unique
    ));

    if report.inserted == 0 {
        lines.push(
            "No new entries found, remember to scrape regularly to find new entries.".to_string(),
        );
    } else {
        lines.push(format!(
            "{} new entries added! Check your log file for more information",
            report.inserted
        ));
        for url in &report.new_urls {
            lines.push(format!("  + {}", url));
        }
    }

    if report.skipped_existing > 0 {
        lines.push(format!("{} already stored", report.skipped_existing));
    }

    if report.unkeyed > 0 {
        lines.push(format!("{} ads without a link were skipped", report.unkeyed));
    }

    if !report.errors.is_empty() {
        lines.push(format!("{} rows failed:", report.errors.len()));
        for error in &report.errors {
            lines.push(format!("  ! {}", error));
        }
    }

    lines
}

/// Prints the summary to stdout
pub fn print_run_summary(summary: &RunSummary) {
    for line in format_run_summary(summary) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrape::{RowError, RowStage};
    use crate::storage::StorageError;

    #[test]
    fn test_no_new_entries_notice() {
        let summary = RunSummary {
            table_created: false,
            extracted: 3,
            unique: 2,
            report: ReconcileReport {
                skipped_existing: 2,
                ..Default::default()
            },
        };

        let lines = format_run_summary(&summary);
        assert!(lines.iter().any(|l| l.starts_with("No new entries found")));
        assert!(!lines.iter().any(|l| l.contains("Table created")));
    }

    #[test]
    fn test_new_entries_and_failures_are_listed() {
        let summary = RunSummary {
            table_created: true,
            extracted: 2,
            unique: 2,
            report: ReconcileReport {
                inserted: 1,
                new_urls: vec!["/ad/1".to_string()],
                errors: vec![RowError {
                    url: "/ad/2".to_string(),
                    stage: RowStage::Insert,
                    source: StorageError::Task("boom".to_string()),
                }],
                ..Default::default()
            },
        };

        let lines = format_run_summary(&summary);
        assert_eq!(lines[0], "Table created successfully!");
        assert!(lines.iter().any(|l| l.starts_with("1 new entries added")));
        assert!(lines.iter().any(|l| l == "  + /ad/1"));
        assert!(lines
            .iter()
            .any(|l| l.contains("insert failed for /ad/2")));
    }
}
