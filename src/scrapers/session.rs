use crate::config::ScraperConfig;
use crate::error::Result;
use crate::models::ListingRecord;
use crate::normalize::generate_search_url;
use crate::scrapers::browser::BrowserBackend;
use crate::scrapers::http::HttpBackend;
use crate::scrapers::traits::ListingBackend;
use crate::scrapers::types::{ProgressSink, RunFlag};
use tracing::{error, info, warn};

/// Scrapes search results city by city through a single fetch backend.
///
/// The backend is picked once at construction: headless Chrome when enabled
/// and it launches, plain HTTP otherwise.
pub struct StayScraper {
    backend: Box<dyn ListingBackend>,
    config: ScraperConfig,
    run_flag: RunFlag,
}

impl StayScraper {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let backend: Box<dyn ListingBackend> = if config.use_browser {
            match BrowserBackend::launch(config.clone()) {
                Ok(browser) => Box::new(browser),
                Err(e) => {
                    error!(error = %e, "Failed to initialize browser, using plain HTTP instead");
                    Box::new(HttpBackend::new(config.clone())?)
                }
            }
        } else {
            Box::new(HttpBackend::new(config.clone())?)
        };

        Ok(Self::with_backend(config, backend))
    }

    pub fn with_backend(config: ScraperConfig, backend: Box<dyn ListingBackend>) -> Self {
        info!(backend = backend.source_name(), "Scraper ready");
        Self {
            backend,
            config,
            run_flag: RunFlag::new(),
        }
    }

    /// Share an externally owned run flag, e.g. one wired to a stop button
    pub fn with_run_flag(mut self, run_flag: RunFlag) -> Self {
        self.run_flag = run_flag;
        self
    }

    pub fn backend_name(&self) -> &'static str {
        self.backend.source_name()
    }

    pub fn config(&self) -> &ScraperConfig {
        &self.config
    }

    /// Handle for stopping a multi-city run from elsewhere
    pub fn run_flag(&self) -> RunFlag {
        self.run_flag.clone()
    }

    /// Scrape one city. Failures are logged and reported, never returned;
    /// whatever was collected before a failure is kept.
    pub async fn scrape_city(&self, city: &str, progress: &ProgressSink) -> Vec<ListingRecord> {
        info!(city, "Scraping listings");
        let url = generate_search_url(&self.config.site.base_url, city);

        let mut listings = Vec::new();
        if let Err(e) = self
            .backend
            .scrape_listings(city, &url, &mut listings, progress)
            .await
        {
            error!(city, error = %e, "Error scraping city");
            progress.emit(format!("Error scraping {}: {}", city, e));
        }

        info!(
            city,
            count = listings.len(),
            "Found {} listings for {}",
            listings.len(),
            city
        );
        listings
    }

    /// Scrape cities in order, pausing between them.
    ///
    /// The run flag is checked before each city; a stop request lets the
    /// current city finish and skips the rest.
    pub async fn scrape_cities<S>(
        &self,
        cities: &[S],
        progress: &ProgressSink,
    ) -> Vec<ListingRecord>
    where
        S: AsRef<str> + Sync,
    {
        let total = cities.len();
        let mut all_listings = Vec::new();

        for (i, city) in cities.iter().enumerate() {
            let city = city.as_ref();
            if !self.run_flag.is_running() {
                warn!(remaining = total - i, "Stop requested, skipping remaining cities");
                break;
            }

            progress.emit(format!("Processing city {}/{}: {}", i + 1, total, city));
            all_listings.extend(self.scrape_city(city, progress).await);

            if i + 1 < total {
                tokio::time::sleep(self.config.jittered_delay()).await;
            }
        }

        info!(count = all_listings.len(), "Scrape finished");
        all_listings
    }
}
