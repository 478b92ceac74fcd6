//! Field-by-field record assembly for a single listing card.
//!
//! Both strategies only talk to a [`FieldLocator`], so the same code runs
//! against live Chrome elements and against parsed HTML.

use crate::config::{HtmlSelectors, RenderedSelectors};
use crate::models::{ListingRecord, NOT_AVAILABLE};
use crate::normalize::{absolute_url, clean_price, clean_text, find_prices};
use crate::scrapers::traits::FieldLocator;
use std::time::Duration;
use tracing::debug;

/// Build a record from a rendered card.
///
/// Returns `None` when the title never shows up within `title_wait` or when
/// no price can be read. All other fields fall back to `N/A` or the city.
pub fn extract_rendered_card<L>(
    card: &L,
    city: &str,
    selectors: &RenderedSelectors,
    base_url: &str,
    title_wait: Duration,
) -> Option<ListingRecord>
where
    L: FieldLocator + ?Sized,
{
    let Some(title) = card
        .wait_for_text(&selectors.title, title_wait)
        .map(|t| clean_text(&t))
        .filter(|t| t != NOT_AVAILABLE)
    else {
        debug!(city, "Card has no title, skipping");
        return None;
    };

    let name = match card
        .text(&selectors.subtitle)
        .map(|t| clean_text(&t))
        .filter(|t| t != NOT_AVAILABLE)
    {
        Some(subtitle) => format!("{title} — {subtitle}"),
        None => title,
    };

    let prices = card
        .text(&selectors.price)
        .map(|t| find_prices(&t))
        .unwrap_or_default();
    // Discounted cards list the crossed-out price first.
    let (price, original_price) = match prices.as_slice() {
        [] => {
            debug!(city, %name, "Card has no price, skipping");
            return None;
        }
        [current] => (current.clone(), None),
        [original, current, ..] => (current.clone(), Some(original.clone())),
    };

    let url = card
        .attr(&selectors.link, "href")
        .filter(|href| !href.trim().is_empty())
        .map(|href| absolute_url(href.trim(), base_url))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let location = card
        .text(&selectors.location)
        .and_then(|t| t.lines().next().map(clean_text))
        .filter(|l| l != NOT_AVAILABLE)
        .unwrap_or_else(|| city.to_string());

    Some(ListingRecord {
        name,
        price,
        original_price,
        location,
        url,
        city: city.to_string(),
    })
}

/// Build a record from a card in raw server HTML.
///
/// Never gives up on a card; the caller drops records without a price.
pub fn extract_static_card<L>(
    card: &L,
    city: &str,
    selectors: &HtmlSelectors,
    base_url: &str,
) -> ListingRecord
where
    L: FieldLocator + ?Sized,
{
    let name = card
        .text(&selectors.name)
        .map(|t| clean_text(&t))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let price = card
        .text(&selectors.price)
        .map(|t| clean_price(&t))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    let location = card
        .text(&selectors.location)
        .map(|t| clean_text(&t))
        .unwrap_or_else(|| city.to_string());

    let url = card
        .attr(&selectors.link, "href")
        .filter(|href| !href.trim().is_empty())
        .map(|href| absolute_url(href.trim(), base_url))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string());

    ListingRecord {
        name,
        price,
        original_price: None,
        location,
        url,
        city: city.to_string(),
    }
}
