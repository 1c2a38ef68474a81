//! Ad card extraction
//!
//! The listings page has shipped in (at least) two markup variants. Each
//! field is therefore described by a [`FieldRule`]: an ordered list of
//! selectors tried one after the other until one yields a non-empty value.

use crate::listing::AdRecord;
use crate::ExtractError;
use scraper::{ElementRef, Html, Selector};

/// Selector matching one ad card
pub const CARD_SELECTOR: &str =
    ".relative.cursor-pointer.overflow-hidden.transition-all.outline-none.f-card.rounded-8";

const URL_SELECTORS: &[&str] = &["a.sf-search-ad-link", "a.sf-search-ad-link.absolute.inset-0"];

const THUMBNAIL_SELECTORS: &[&str] = &[
    "a.sf-search-ad-link div.aspect-w-16.aspect-h-9.bg-white img",
    "div.sf-realestate-image img",
    "a .aspect-w-16.aspect-h-9 img",
];

const TITLE_SELECTORS: &[&str] = &["h3", "h3.h4.mb-0.sf-realestate-heading"];

const PRICE_SELECTORS: &[&str] = &[
    ".mt-16.flex span:nth-child(2)",
    ".mt-16.flex.justify-between span:nth-child(2)",
];

const AREA_SELECTORS: &[&str] = &[
    ".mt-16.flex span:nth-child(1)",
    ".mt-16.flex.justify-between span:nth-child(1)",
];

// Both markup variants place the address under `.mt-4`; gray spans elsewhere
// on the card are not addresses.
const ADDRESS_SELECTORS: &[&str] = &[".mt-4 span.text-14.text-gray-500"];

/// What to read from an element matched by a field selector
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// Text of every matched element, concatenated
    Text,
    /// The named attribute of the first matched element
    Attr(&'static str),
}

impl Extract {
    fn read(self, card: ElementRef<'_>, selector: &Selector) -> Option<String> {
        let value = match self {
            Self::Text => card
                .select(selector)
                .flat_map(|element| element.text())
                .collect::<String>(),
            Self::Attr(name) => card
                .select(selector)
                .next()
                .and_then(|element| element.value().attr(name))
                .unwrap_or_default()
                .to_string(),
        };

        let value = value.trim();
        if value.is_empty() {
            None
        } else {
            Some(value.to_string())
        }
    }
}

/// Ordered fallback chain for one field
#[derive(Debug, Clone)]
pub struct FieldRule {
    selectors: Vec<Selector>,
    extract: Extract,
}

impl FieldRule {
    /// Compiles a rule from selectors in priority order
    pub fn new(selectors: &[&str], extract: Extract) -> Result<Self, ExtractError> {
        let selectors = selectors
            .iter()
            .map(|s| compile(s))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { selectors, extract })
    }

    /// Returns the first non-empty value any selector yields inside `card`
    pub fn apply(&self, card: ElementRef<'_>) -> Option<String> {
        self.selectors
            .iter()
            .find_map(|selector| self.extract.read(card, selector))
    }
}

/// Field rules for all six listing fields
#[derive(Debug, Clone)]
pub struct FieldRules {
    pub url: FieldRule,
    pub thumbnail: FieldRule,
    pub title: FieldRule,
    pub price: FieldRule,
    pub area: FieldRule,
    pub address: FieldRule,
}

impl FieldRules {
    /// Rules for the known markup variants of the listings page
    pub fn builtin() -> Result<Self, ExtractError> {
        Ok(Self {
            url: FieldRule::new(URL_SELECTORS, Extract::Attr("href"))?,
            thumbnail: FieldRule::new(THUMBNAIL_SELECTORS, Extract::Attr("src"))?,
            title: FieldRule::new(TITLE_SELECTORS, Extract::Text)?,
            price: FieldRule::new(PRICE_SELECTORS, Extract::Text)?,
            area: FieldRule::new(AREA_SELECTORS, Extract::Text)?,
            address: FieldRule::new(ADDRESS_SELECTORS, Extract::Text)?,
        })
    }

    fn apply(&self, card: ElementRef<'_>) -> AdRecord {
        AdRecord {
            url: self.url.apply(card),
            thumbnail: self.thumbnail.apply(card),
            title: self.title.apply(card),
            price: self.price.apply(card),
            area: self.area.apply(card),
            address: self.address.apply(card),
        }
    }
}

/// Turns a listings page into ad records
#[derive(Debug, Clone)]
pub struct Extractor {
    card: Selector,
    rules: FieldRules,
}

impl Extractor {
    /// Creates an extractor for the built-in card selector and field rules
    pub fn new() -> Result<Self, ExtractError> {
        Self::with_rules(CARD_SELECTOR, FieldRules::builtin()?)
    }

    /// Creates an extractor with a custom card selector and field rules
    pub fn with_rules(card: &str, rules: FieldRules) -> Result<Self, ExtractError> {
        Ok(Self {
            card: compile(card)?,
            rules,
        })
    }

    /// Extracts one record per ad card, in document order
    ///
    /// A card where no field matches still produces an (empty) record. The
    /// HTML parser itself is lenient, so extraction cannot fail.
    ///
    /// # Example
    ///
    /// ```
    /// use finn_scout::scrape::Extractor;
    ///
    /// let html = r#"<div class="relative cursor-pointer overflow-hidden transition-all outline-none f-card rounded-8">
    ///     <a class="sf-search-ad-link" href="/ad/1"></a><h3> Koselig hytte </h3>
    /// </div>"#;
    ///
    /// let records = Extractor::new().unwrap().extract(html);
    /// assert_eq!(records[0].url.as_deref(), Some("/ad/1"));
    /// assert_eq!(records[0].title.as_deref(), Some("Koselig hytte"));
    /// ```
    pub fn extract(&self, body: &str) -> Vec<AdRecord> {
        let document = Html::parse_document(body);

        let records: Vec<AdRecord> = document
            .select(&self.card)
            .map(|card| self.rules.apply(card))
            .collect();

        let blank = records.iter().filter(|r| r.is_blank()).count();
        if blank > 0 {
            tracing::warn!("{} of {} ad cards had no recognizable fields", blank, records.len());
        }
        tracing::debug!("Extracted {} ad cards", records.len());

        records
    }
}

fn compile(selector: &str) -> Result<Selector, ExtractError> {
    Selector::parse(selector).map_err(|e| ExtractError::InvalidSelector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}
