use serde::{Deserialize, Serialize};

/// Placeholder for any field that could not be resolved from the page
pub const NOT_AVAILABLE: &str = "N/A";

/// One rental listing scraped from a search results page
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ListingRecord {
    /// Card title, possibly joined with its subtitle
    pub name: String,
    /// Current nightly price such as `£95`, or `N/A`
    pub price: String,
    /// Crossed-out price when the card shows a discount
    pub original_price: Option<String>,
    pub location: String,
    pub url: String,
    /// The city query that produced this record
    pub city: String,
}

impl ListingRecord {
    /// Whether either price field resolved to an amount
    pub fn has_price(&self) -> bool {
        self.price != NOT_AVAILABLE
            || self
                .original_price
                .as_deref()
                .is_some_and(|p| p != NOT_AVAILABLE)
    }
}
