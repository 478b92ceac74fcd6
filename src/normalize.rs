//! Text and price normalization for scraped strings.
//!
//! Everything here is pure: the extractors call these helpers on raw
//! element text before building a [`ListingRecord`](crate::models::ListingRecord).

use crate::models::NOT_AVAILABLE;
use once_cell::sync::Lazy;
use regex::Regex;

static PRICE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?P<symbol>[£$€])\s?(?P<amount>[\d,]+(?:\.\d{1,2})?)")
        .expect("price pattern is valid")
});

static LINE_BREAKS_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\r\n]+").expect("line break pattern is valid"));

/// Trim and flatten scraped text onto a single line.
///
/// Empty or whitespace-only input yields `N/A`. Runs of carriage returns and
/// newlines become a single space.
pub fn clean_text(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return NOT_AVAILABLE.to_string();
    }
    LINE_BREAKS_RE.replace_all(trimmed, " ").into_owned()
}

/// Extract the first currency amount from `raw`, e.g. `"£1,234.50 per night"` -> `"£1234.50"`.
pub fn clean_price(raw: &str) -> String {
    PRICE_RE
        .captures(raw)
        .and_then(|caps| normalize_amount(&caps["symbol"], &caps["amount"]))
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Every currency amount found in `raw`, in document order.
///
/// Matches whose amount does not parse as a number are skipped.
pub fn find_prices(raw: &str) -> Vec<String> {
    PRICE_RE
        .captures_iter(raw)
        .filter_map(|caps| normalize_amount(&caps["symbol"], &caps["amount"]))
        .collect()
}

fn normalize_amount(symbol: &str, amount: &str) -> Option<String> {
    let amount = amount.replace(',', "");
    amount.parse::<f64>().ok()?;
    Some(format!("{symbol}{amount}"))
}

/// Turn a city such as `"New York, NY"` into its search path segment `"New-York--NY"`.
pub fn format_city_for_url(city: &str) -> String {
    city.replace(", ", "--").replace(',', "--").replace(' ', "-")
}

/// Search results URL for `city` under `base_url`.
pub fn generate_search_url(base_url: &str, city: &str) -> String {
    format!(
        "{}/s/{}/homes",
        base_url.trim_end_matches('/'),
        format_city_for_url(city)
    )
}

/// Prefix relative links with the site origin.
pub fn absolute_url(href: &str, base_url: &str) -> String {
    if href.starts_with("http") {
        href.to_string()
    } else {
        format!("{}{}", base_url.trim_end_matches('/'), href)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_text_empty() {
        assert_eq!(clean_text(""), "N/A");
        assert_eq!(clean_text("   \n"), "N/A");
    }

    #[test]
    fn test_clean_text_flattens_lines() {
        assert_eq!(clean_text(" a\nb\r"), "a b");
        assert_eq!(clean_text("Cozy loft\r\nin Soho"), "Cozy loft in Soho");
    }

    #[test]
    fn test_clean_text_idempotent() {
        let samples = [
            "",
            " ",
            "\n",
            " a\nb\r",
            "a\r\n\r\nb",
            "N/A",
            "  Entire home \n hosted by Sam  ",
            "tab\tseparated\n",
        ];
        for s in samples {
            let once = clean_text(s);
            assert_eq!(clean_text(&once), once, "input {s:?}");
        }
    }

    #[test]
    fn test_clean_price() {
        assert_eq!(clean_price(""), "N/A");
        assert_eq!(clean_price("£1,234.50 per night"), "£1234.50");
        assert_eq!(clean_price("no price here"), "N/A");
        assert_eq!(clean_price("$ 89 night"), "$89");
        assert_eq!(clean_price("total €2,000"), "€2000");
    }

    #[test]
    fn test_clean_price_uses_first_match() {
        assert_eq!(clean_price("£120 £95"), "£120");
    }

    #[test]
    fn test_find_prices() {
        assert_eq!(find_prices("£120 £95 night"), vec!["£120", "£95"]);
        assert_eq!(find_prices("£95"), vec!["£95"]);
        assert!(find_prices("free").is_empty());
        // a bare separator is not an amount
        assert_eq!(find_prices("$, then $40"), vec!["$40"]);
    }

    #[test]
    fn test_generate_search_url() {
        assert_eq!(
            generate_search_url("https://www.airbnb.com", "New York, NY"),
            "https://www.airbnb.com/s/New-York--NY/homes"
        );
        assert_eq!(
            generate_search_url("https://www.airbnb.com/", "Austin, TX"),
            "https://www.airbnb.com/s/Austin--TX/homes"
        );
    }

    #[test]
    fn test_absolute_url() {
        let base = "https://www.airbnb.com";
        assert_eq!(
            absolute_url("/rooms/42", base),
            "https://www.airbnb.com/rooms/42"
        );
        assert_eq!(
            absolute_url("https://www.airbnb.co.uk/rooms/42", base),
            "https://www.airbnb.co.uk/rooms/42"
        );
    }
}
