//! Scraper configuration.
//!
//! A single [`ScraperConfig`] value is built once (defaults, optionally
//! overlaid by a YAML file) and handed to [`StayScraper`](crate::scrapers::StayScraper).

use anyhow::{Context, Result};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;

pub const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Cities offered when none are chosen explicitly
pub const DEFAULT_CITIES: &[&str] = &[
    "New York, NY",
    "Los Angeles, CA",
    "Chicago, IL",
    "Houston, TX",
    "Phoenix, AZ",
    "Philadelphia, PA",
    "San Antonio, TX",
    "San Diego, CA",
    "Dallas, TX",
    "San Jose, CA",
    "Austin, TX",
    "Jacksonville, FL",
    "Fort Worth, TX",
    "Columbus, OH",
    "Charlotte, NC",
    "San Francisco, CA",
    "Indianapolis, IN",
    "Seattle, WA",
    "Denver, CO",
    "Washington, DC",
    "Boston, MA",
    "El Paso, TX",
    "Nashville, TN",
    "Detroit, MI",
    "Oklahoma City, OK",
    "Portland, OR",
    "Las Vegas, NV",
    "Memphis, TN",
    "Louisville, KY",
    "Baltimore, MD",
    "Milwaukee, WI",
    "Albuquerque, NM",
    "Tucson, AZ",
    "Fresno, CA",
    "Mesa, AZ",
    "Sacramento, CA",
    "Atlanta, GA",
    "Kansas City, MO",
    "Colorado Springs, CO",
    "Miami, FL",
    "Raleigh, NC",
    "Omaha, NE",
    "Long Beach, CA",
    "Virginia Beach, VA",
    "Oakland, CA",
    "Minneapolis, MN",
    "Tulsa, OK",
    "Arlington, TX",
    "Tampa, FL",
    "New Orleans, LA",
];

/// Target site
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    /// Origin used for search URLs and to absolutize relative links
    pub base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.airbnb.com".to_string(),
        }
    }
}

/// CSS selectors for pages rendered in Chrome
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderedSelectors {
    pub card: String,
    pub title: String,
    pub subtitle: String,
    pub price: String,
    pub link: String,
    pub location: String,
}

impl Default for RenderedSelectors {
    fn default() -> Self {
        Self {
            card: "[data-testid='card-container']".to_string(),
            title: "[data-testid='listing-card-title']".to_string(),
            subtitle: "[data-testid='listing-card-name']".to_string(),
            price: "._w3xh25".to_string(),
            link: "a".to_string(),
            location: "[class*='atm_7l_1kw7nm4']".to_string(),
        }
    }
}

/// CSS selectors for raw server HTML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HtmlSelectors {
    pub card: String,
    pub name: String,
    pub price: String,
    pub location: String,
    pub link: String,
}

impl Default for HtmlSelectors {
    fn default() -> Self {
        Self {
            card: "div.lxq01kf".to_string(),
            name: "div.t1jojoys".to_string(),
            price: "span._1p7iugi".to_string(),
            location: "div.fb4nyux".to_string(),
            link: "a".to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Selectors {
    pub rendered: RenderedSelectors,
    pub html: HtmlSelectors,
}

/// Everything a scrape run needs to know
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScraperConfig {
    pub cities: Vec<String>,
    /// Maximum listing cards extracted per city
    pub listings_per_city: usize,
    /// Base pause between requests, in seconds
    pub request_delay_secs: f64,
    /// Upper bound of the random extra pause added to `request_delay_secs`
    pub delay_jitter_secs: f64,
    /// HTTP request timeout, in seconds
    pub timeout_secs: u64,
    pub headers: BTreeMap<String, String>,
    pub use_proxies: bool,
    pub proxies: Vec<String>,
    /// Try headless Chrome before falling back to plain HTTP
    pub use_browser: bool,
    pub headless: bool,
    pub page_wait_secs: u64,
    pub card_wait_secs: u64,
    pub cookie_wait_secs: u64,
    pub site: SiteConfig,
    pub selectors: Selectors,
}

impl Default for ScraperConfig {
    fn default() -> Self {
        let headers = [
            ("User-Agent", DEFAULT_USER_AGENT),
            (
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/webp,*/*;q=0.8",
            ),
            ("Accept-Language", "en-US,en;q=0.5"),
            ("Accept-Encoding", "gzip, deflate"),
            ("Connection", "keep-alive"),
            ("Upgrade-Insecure-Requests", "1"),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Self {
            cities: DEFAULT_CITIES.iter().map(|c| c.to_string()).collect(),
            listings_per_city: 10,
            request_delay_secs: 2.0,
            delay_jitter_secs: 2.0,
            timeout_secs: 30,
            headers,
            use_proxies: false,
            proxies: Vec::new(),
            use_browser: true,
            headless: true,
            page_wait_secs: 20,
            card_wait_secs: 5,
            cookie_wait_secs: 5,
            site: SiteConfig::default(),
            selectors: Selectors::default(),
        }
    }
}

impl ScraperConfig {
    /// Load a YAML file; keys it omits keep their defaults.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_yaml_str(&text)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(text)?;
        Ok(config)
    }

    pub fn with_cities<I, S>(mut self, cities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.cities = cities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_listings_per_city(mut self, limit: usize) -> Self {
        self.listings_per_city = limit;
        self
    }

    pub fn with_delay(mut self, base_secs: f64, jitter_secs: f64) -> Self {
        self.request_delay_secs = base_secs;
        self.delay_jitter_secs = jitter_secs;
        self
    }

    pub fn with_browser(mut self, enabled: bool) -> Self {
        self.use_browser = enabled;
        self
    }

    pub fn with_proxies(mut self, proxies: Vec<String>) -> Self {
        self.use_proxies = !proxies.is_empty();
        self.proxies = proxies;
        self
    }

    /// The `User-Agent` header, shared by the HTTP client and the browser override
    pub fn user_agent(&self) -> &str {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case("user-agent"))
            .map(|(_, v)| v.as_str())
            .unwrap_or(DEFAULT_USER_AGENT)
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn page_wait(&self) -> Duration {
        Duration::from_secs(self.page_wait_secs)
    }

    pub fn card_wait(&self) -> Duration {
        Duration::from_secs(self.card_wait_secs)
    }

    pub fn cookie_wait(&self) -> Duration {
        Duration::from_secs(self.cookie_wait_secs)
    }

    /// Base request delay plus a random extra of up to `delay_jitter_secs`
    pub fn jittered_delay(&self) -> Duration {
        let base = self.request_delay_secs.max(0.0);
        let extra = if self.delay_jitter_secs > 0.0 {
            rand::rng().random_range(0.0..self.delay_jitter_secs)
        } else {
            0.0
        };
        Duration::from_secs_f64(base + extra)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ScraperConfig::default();
        assert_eq!(config.cities.len(), 50);
        assert_eq!(config.cities[0], "New York, NY");
        assert_eq!(config.listings_per_city, 10);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.user_agent(), DEFAULT_USER_AGENT);
        assert!(!config.use_proxies);
    }

    #[test]
    fn test_yaml_overrides_keep_other_defaults() {
        let yaml = r#"
cities:
  - "Austin, TX"
listings_per_city: 3
use_proxies: true
proxies:
  - "http://10.0.0.1:8080"
selectors:
  html:
    card: "div.card"
"#;
        let config = ScraperConfig::from_yaml_str(yaml).unwrap();
        assert_eq!(config.cities, vec!["Austin, TX"]);
        assert_eq!(config.listings_per_city, 3);
        assert!(config.use_proxies);
        assert_eq!(config.selectors.html.card, "div.card");
        assert_eq!(config.selectors.html.price, "span._1p7iugi");
        assert_eq!(config.request_delay_secs, 2.0);
    }

    #[test]
    fn test_user_agent_lookup_is_case_insensitive() {
        let mut config = ScraperConfig::default();
        config.headers.remove("User-Agent");
        config
            .headers
            .insert("user-agent".to_string(), "TestAgent/1.0".to_string());
        assert_eq!(config.user_agent(), "TestAgent/1.0");
    }

    #[test]
    fn test_jittered_delay_bounds() {
        let config = ScraperConfig::default().with_delay(1.0, 0.5);
        for _ in 0..50 {
            let delay = config.jittered_delay();
            assert!(delay >= Duration::from_secs(1));
            assert!(delay < Duration::from_millis(1500));
        }
        let none = ScraperConfig::default().with_delay(0.0, 0.0);
        assert_eq!(none.jittered_delay(), Duration::ZERO);
    }

    #[test]
    fn test_builders() {
        let config = ScraperConfig::default()
            .with_cities(["Miami, FL", "Tampa, FL"])
            .with_listings_per_city(4)
            .with_delay(0.0, 0.0)
            .with_browser(false)
            .with_proxies(vec!["http://p:1".to_string()]);
        assert_eq!(config.cities, vec!["Miami, FL", "Tampa, FL"]);
        assert_eq!(config.listings_per_city, 4);
        assert!(!config.use_browser);
        assert!(config.use_proxies);
    }
}
