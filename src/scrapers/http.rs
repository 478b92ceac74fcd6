use crate::config::ScraperConfig;
use crate::error::{Result, ScrapeError};
use crate::models::ListingRecord;
use crate::scrapers::extract::extract_static_card;
use crate::scrapers::traits::{FieldLocator, ListingBackend};
use crate::scrapers::types::ProgressSink;
use async_trait::async_trait;
use rand::seq::IndexedRandom;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue, ACCEPT_ENCODING};
use reqwest::{Client, Proxy};
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info, warn};

/// Plain HTTP backend: fetch the search page and parse the server markup
pub struct HttpBackend {
    client: Client,
    config: ScraperConfig,
}

impl HttpBackend {
    pub fn new(config: ScraperConfig) -> Result<Self> {
        let client = build_client(&config, None)?;
        Ok(Self { client, config })
    }

    fn pick_proxy(&self) -> Option<&str> {
        if !self.config.use_proxies {
            return None;
        }
        self.config
            .proxies
            .choose(&mut rand::rng())
            .map(String::as_str)
    }

    async fn fetch_page(&self, url: &str) -> Result<String> {
        let proxied;
        let client = match self.pick_proxy() {
            Some(proxy) => {
                debug!(proxy, "Routing request through proxy");
                proxied = build_client(&self.config, Some(proxy))?;
                &proxied
            }
            None => &self.client,
        };

        debug!("Fetching URL: {}", url);
        let response = client.get(url).send().await?;

        if !response.status().is_success() {
            warn!("{} returned status: {}", url, response.status());
            return Err(ScrapeError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        let html = response.text().await?;
        debug!("Downloaded {} bytes of HTML", html.len());
        Ok(html)
    }
}

fn build_client(config: &ScraperConfig, proxy: Option<&str>) -> Result<Client> {
    let mut headers = HeaderMap::new();
    for (name, value) in &config.headers {
        let (Ok(name), Ok(value)) = (
            HeaderName::from_bytes(name.as_bytes()),
            HeaderValue::from_str(value),
        ) else {
            warn!(header = %name, "Ignoring invalid header");
            continue;
        };
        // reqwest negotiates and decodes compression itself
        if name == ACCEPT_ENCODING {
            continue;
        }
        headers.insert(name, value);
    }

    let mut builder = Client::builder()
        .timeout(config.timeout())
        .user_agent(config.user_agent())
        .default_headers(headers);
    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::all(proxy)?);
    }
    Ok(builder.build()?)
}

/// Extract up to `listings_per_city` cards from a search page.
///
/// Records come back in page order, including those without a price so the
/// caller can report progress per card.
pub fn parse_listing_page(
    html: &str,
    city: &str,
    config: &ScraperConfig,
) -> Result<Vec<ListingRecord>> {
    let selectors = &config.selectors.html;
    let card_selector = Selector::parse(&selectors.card)
        .map_err(|_| ScrapeError::Selector(selectors.card.clone()))?;

    let document = Html::parse_document(html);
    let records = document
        .select(&card_selector)
        .take(config.listings_per_city)
        .map(|card| extract_static_card(&card, city, selectors, &config.site.base_url))
        .collect();
    Ok(records)
}

#[async_trait]
impl ListingBackend for HttpBackend {
    async fn scrape_listings(
        &self,
        city: &str,
        url: &str,
        out: &mut Vec<ListingRecord>,
        progress: &ProgressSink,
    ) -> Result<()> {
        let html = self.fetch_page(url).await?;
        let cards = parse_listing_page(&html, city, &self.config)?;
        info!(city, "Found {} listing cards in HTML", cards.len());

        let total = cards.len();
        for (i, record) in cards.into_iter().enumerate() {
            if record.has_price() {
                out.push(record);
            } else {
                debug!(city, name = %record.name, "Skipped listing without price");
            }
            progress.emit(format!("Scraped {}/{} listings from {}", i + 1, total, city));
            tokio::time::sleep(self.config.jittered_delay()).await;
        }

        Ok(())
    }

    fn source_name(&self) -> &'static str {
        "http"
    }
}

impl FieldLocator for ElementRef<'_> {
    fn text(&self, selector: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        self.select(&selector)
            .next()
            .map(|el| el.text().collect::<String>())
    }

    fn attr(&self, selector: &str, name: &str) -> Option<String> {
        let selector = Selector::parse(selector).ok()?;
        self.select(&selector)
            .find_map(|el| el.value().attr(name))
            .map(str::to_string)
    }
}
