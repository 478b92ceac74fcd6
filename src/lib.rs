//! Short-term rental listing scraper.
//!
//! Turns city names into [`ListingRecord`]s by driving either headless
//! Chrome or plain HTTP against the search results pages, then exports them
//! as CSV, spreadsheet or JSON.

pub mod config;
pub mod error;
pub mod export;
pub mod models;
pub mod normalize;
pub mod scrapers;

pub use config::ScraperConfig;
pub use models::{ListingRecord, NOT_AVAILABLE};
pub use scrapers::{ProgressSink, RunFlag, StayScraper};
