//! Listing records
//!
//! [`AdRecord`] is what the extractor produces from one ad card;
//! [`StoredListing`] is the same record once the store has given it an id.

use chrono::{DateTime, Utc};

/// One listing as extracted from the search-results page
///
/// Every field is opaque text. A field the extractor could not find is `None`,
/// never an empty string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AdRecord {
    /// Link to the listing, used as the natural key
    pub url: Option<String>,
    pub thumbnail: Option<String>,
    pub title: Option<String>,
    pub price: Option<String>,
    pub area: Option<String>,
    pub address: Option<String>,
}

impl AdRecord {
    /// Returns the identifying url, if the card had one
    pub fn key(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// True when no field could be extracted at all
    pub fn is_blank(&self) -> bool {
        self.url.is_none()
            && self.thumbnail.is_none()
            && self.title.is_none()
            && self.price.is_none()
            && self.area.is_none()
            && self.address.is_none()
    }
}

/// A listing row in the `scraped_data` table
#[derive(Debug, Clone, PartialEq)]
pub struct StoredListing {
    pub id: i64,
    pub record: AdRecord,
    pub created_at: DateTime<Utc>,
}
