use crate::error::Result;
use crate::models::ListingRecord;
use crate::scrapers::types::ProgressSink;
use async_trait::async_trait;
use std::time::Duration;

/// A way of turning one search page into listing records.
///
/// Implementations push records into `out` as they go so a failure halfway
/// through a city still leaves the earlier records with the caller.
#[async_trait]
pub trait ListingBackend: Send + Sync {
    async fn scrape_listings(
        &self,
        city: &str,
        url: &str,
        out: &mut Vec<ListingRecord>,
        progress: &ProgressSink,
    ) -> Result<()>;

    /// Get the name of the backend
    fn source_name(&self) -> &'static str;
}

/// Looks up fields inside a single listing card.
///
/// Every lookup answers `None` instead of failing, so extractors can
/// degrade field by field.
pub trait FieldLocator {
    /// Text content of the first element matching `selector`
    fn text(&self, selector: &str) -> Option<String>;

    /// Attribute `name` of the first element matching `selector`
    fn attr(&self, selector: &str, name: &str) -> Option<String>;

    /// Like [`FieldLocator::text`], but keeps polling for up to `timeout`
    /// until the element shows non-empty text. Static trees have nothing
    /// to wait for.
    fn wait_for_text(&self, selector: &str, _timeout: Duration) -> Option<String> {
        self.text(selector).filter(|t| !t.trim().is_empty())
    }
}
