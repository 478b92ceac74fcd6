use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};
use crate::models::ListingRecord;
use crate::scrapers::extract::extract_rendered_card;
use crate::scrapers::traits::{FieldLocator, ListingBackend};
use crate::scrapers::types::ProgressSink;
use async_trait::async_trait;
use headless_chrome::{Browser, Element, LaunchOptions, Tab};
use std::ffi::OsStr;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Tried in order; the first clickable match dismisses the consent banner
const COOKIE_BUTTON_LABELS: [&str; 5] = [
    "Accept all",
    "Accept cookies",
    "Agree",
    "I agree",
    "Accept",
];

/// Browser-based backend using headless Chrome.
///
/// Owns one Chrome process and one tab for its whole lifetime; dropping the
/// backend shuts Chrome down.
pub struct BrowserBackend {
    // Held so the Chrome process lives as long as the tab.
    _browser: Browser,
    tab: Arc<Tab>,
    config: Arc<ScraperConfig>,
}

fn browser_error(err: impl std::fmt::Display) -> ScrapeError {
    ScrapeError::Browser(err.to_string())
}

impl BrowserBackend {
    /// Launch Chrome and open the tab used for every city
    pub fn launch(config: ScraperConfig) -> Result<Self> {
        info!("Launching headless Chrome...");

        let user_agent_arg = format!("--user-agent={}", config.user_agent());
        let args: Vec<&OsStr> = [
            "--no-sandbox",
            "--disable-dev-shm-usage",
            "--disable-gpu",
            "--disable-software-rasterizer",
            "--disable-blink-features=AutomationControlled",
            "--disable-features=VoiceTranscription",
            "--disable-speech-api",
            user_agent_arg.as_str(),
        ]
        .into_iter()
        .map(OsStr::new)
        .collect();

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .sandbox(false)
            .idle_browser_timeout(Duration::from_secs(300))
            .args(args)
            .build()
            .map_err(browser_error)?;

        let browser = Browser::new(options).map_err(browser_error)?;
        let tab = browser.new_tab().map_err(browser_error)?;
        tab.set_user_agent(config.user_agent(), Some("en-US,en"), Some("Win32"))
            .map_err(browser_error)?;

        info!("Chrome session initialized");
        Ok(Self {
            _browser: browser,
            tab,
            config: Arc::new(config),
        })
    }
}

/// Click away the cookie banner if one shows up within the configured wait
fn accept_cookies(tab: &Tab, config: &ScraperConfig) {
    let deadline = Instant::now() + config.cookie_wait();
    loop {
        for label in COOKIE_BUTTON_LABELS {
            let xpath = format!(r#"//button[contains(text(), "{label}")]"#);
            let Ok(button) = tab.find_element_by_xpath(&xpath) else {
                continue;
            };
            match button.scroll_into_view().and_then(|b| b.click()) {
                Ok(_) => {
                    info!(label, "Accepted cookies");
                    return;
                }
                Err(e) => debug!(label, error = %e, "Cookie button not clickable"),
            }
        }
        if Instant::now() >= deadline {
            info!("No cookie acceptance button found or already accepted");
            return;
        }
        thread::sleep(POLL_INTERVAL);
    }
}

fn scrape_page(
    tab: &Tab,
    config: &ScraperConfig,
    city: &str,
    url: &str,
    out: &mut Vec<ListingRecord>,
    progress: &ProgressSink,
) -> Result<()> {
    let navigation_error = |e: anyhow::Error| ScrapeError::Navigation {
        url: url.to_string(),
        reason: e.to_string(),
    };

    info!(city, "Opening search page {}", url);
    tab.navigate_to(url).map_err(navigation_error)?;
    tab.wait_until_navigated().map_err(navigation_error)?;

    accept_cookies(tab, config);

    let selectors = &config.selectors.rendered;
    if let Err(e) = tab.wait_for_element_with_custom_timeout(&selectors.title, config.page_wait()) {
        warn!(city, error = %e, "No listings appeared before timeout");
        return Ok(());
    }

    let cards = match tab.find_elements(&selectors.card) {
        Ok(cards) => cards,
        Err(e) => {
            warn!(city, error = %e, "No listing cards found");
            return Ok(());
        }
    };
    info!(city, "Found {} listing cards on page", cards.len());

    let total = cards.len().min(config.listings_per_city);
    for (i, card) in cards.iter().take(total).enumerate() {
        match extract_rendered_card(
            card,
            city,
            selectors,
            &config.site.base_url,
            config.card_wait(),
        ) {
            Some(record) => out.push(record),
            None => debug!(city, index = i, "Skipped card without title or price"),
        }
        progress.emit(format!("Scraped {}/{} listings from {}", i + 1, total, city));
    }

    Ok(())
}

/// Run Chrome DevTools calls on the blocking pool.
///
/// Works under both the multi-thread and the current-thread runtime; a panic
/// in `work` comes back as [`ScrapeError::Browser`].
async fn run_blocking<T, F>(work: F) -> Result<T>
where
    F: FnOnce() -> T + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(work)
        .await
        .map_err(browser_error)
}

#[async_trait]
impl ListingBackend for BrowserBackend {
    async fn scrape_listings(
        &self,
        city: &str,
        url: &str,
        out: &mut Vec<ListingRecord>,
        progress: &ProgressSink,
    ) -> Result<()> {
        let tab = Arc::clone(&self.tab);
        let config = Arc::clone(&self.config);
        let city = city.to_string();
        let url = url.to_string();
        let progress = progress.clone();

        // Records gathered before a failure still come back with the error.
        let (records, result) = run_blocking(move || {
            let mut records = Vec::new();
            let result = scrape_page(&tab, &config, &city, &url, &mut records, &progress);
            (records, result)
        })
        .await?;

        out.extend(records);
        result
    }

    fn source_name(&self) -> &'static str {
        "browser"
    }
}

impl FieldLocator for Element<'_> {
    fn text(&self, selector: &str) -> Option<String> {
        self.find_element(selector).ok()?.get_inner_text().ok()
    }

    fn attr(&self, selector: &str, name: &str) -> Option<String> {
        self.find_element(selector)
            .ok()?
            .get_attribute_value(name)
            .ok()
            .flatten()
    }

    fn wait_for_text(&self, selector: &str, timeout: Duration) -> Option<String> {
        let deadline = Instant::now() + timeout;
        loop {
            // innerText is empty until the element is actually rendered
            if let Some(text) = self.text(selector).filter(|t| !t.trim().is_empty()) {
                return Some(text);
            }
            if Instant::now() >= deadline {
                return None;
            }
            thread::sleep(POLL_INTERVAL);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_blocking_work_on_current_thread_runtime() {
        let records = run_blocking(|| {
            thread::sleep(Duration::from_millis(10));
            vec!["done".to_string()]
        })
        .await
        .unwrap();
        assert_eq!(records, vec!["done"]);
    }

    #[tokio::test]
    async fn test_panicking_blocking_work_becomes_browser_error() {
        let result: Result<()> = run_blocking(|| panic!("devtools connection lost")).await;
        assert!(matches!(result, Err(ScrapeError::Browser(_))));
    }
}
