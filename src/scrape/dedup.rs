//! De-duplication of extracted records

use crate::listing::AdRecord;
use std::collections::HashSet;

/// Keeps the first record for each distinct url, preserving order
///
/// Records without a url have no identity to compare, so each one is kept.
///
/// # Example
///
/// ```
/// use finn_scout::{dedupe, AdRecord};
///
/// let ad = |url: &str, title: &str| AdRecord {
///     url: Some(url.to_string()),
///     title: Some(title.to_string()),
///     ..Default::default()
/// };
///
/// let unique = dedupe(vec![ad("/ad/1", "first"), ad("/ad/1", "second")]);
/// assert_eq!(unique.len(), 1);
/// assert_eq!(unique[0].title.as_deref(), Some("first"));
/// ```
pub fn dedupe(records: Vec<AdRecord>) -> Vec<AdRecord> {
    let mut seen: HashSet<String> = HashSet::with_capacity(records.len());

    records
        .into_iter()
        .filter(|record| match record.key() {
            Some(url) => seen.insert(url.to_string()),
            None => true,
        })
        .collect()
}
