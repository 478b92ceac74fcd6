use thiserror::Error;

/// Failures a fetch backend reports for a whole city.
///
/// Per-card problems never surface here; the extractors absorb them.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("browser error: {0}")]
    Browser(String),

    #[error("failed to load {url}: {reason}")]
    Navigation { url: String, reason: String },

    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("{url} returned status {status}")]
    Status { url: String, status: u16 },

    #[error("invalid selector `{0}`")]
    Selector(String),
}

pub type Result<T> = std::result::Result<T, ScrapeError>;
