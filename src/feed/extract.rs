//! Listing extraction from a search-results page.
//!
//! Best effort: a candidate missing its title, price or link is skipped and
//! the rest of the page is still read. Nothing here returns an error.

use super::types::{Extraction, ListingRecord};
use crate::config::SelectorConfig;
use anyhow::{anyhow, Result};
use scraper::{ElementRef, Html, Selector};
use url::Url;

/// Only the first this-many listing candidates of a page are examined.
pub const MAX_CANDIDATES: usize = 20;

const CURRENCY_SYMBOLS: [char; 3] = ['€', '$', '£'];

/// Compiled CSS selectors for the listing markup.
#[derive(Debug, Clone)]
pub struct ListingSelectors {
    item: Selector,
    title: Selector,
    price: Selector,
    link: Selector,
}

impl ListingSelectors {
    pub fn from_config(config: &SelectorConfig) -> Result<Self> {
        Ok(Self {
            item: compile("item", &config.item)?,
            title: compile("title", &config.title)?,
            price: compile("price", &config.price)?,
            link: compile("link", &config.link)?,
        })
    }
}

fn compile(name: &str, css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| anyhow!("invalid {} selector {:?}: {:?}", name, css, e))
}

/// Extract up to [`MAX_CANDIDATES`] listings from `html`, in document order.
/// Relative links are resolved against `page_url`.
pub fn extract_listings(html: &str, page_url: &Url, selectors: &ListingSelectors) -> Extraction {
    let document = Html::parse_document(html);
    let mut extraction = Extraction::default();

    for item in document.select(&selectors.item).take(MAX_CANDIDATES) {
        match extract_candidate(item, page_url, selectors) {
            Some(record) => extraction.records.push(record),
            None => extraction.skipped += 1,
        }
    }

    if extraction.skipped > 0 {
        tracing::debug!(
            kept = extraction.records.len(),
            skipped = extraction.skipped,
            "skipped malformed listing candidates"
        );
    }
    extraction
}

fn extract_candidate(
    item: ElementRef<'_>,
    page_url: &Url,
    selectors: &ListingSelectors,
) -> Option<ListingRecord> {
    let title = item.select(&selectors.title).next().map(element_text)?;
    if title.is_empty() {
        return None;
    }

    let price = item
        .select(&selectors.price)
        .next()
        .and_then(|el| parse_price(&element_text(el)))?;

    let href = item.select(&selectors.link).next()?.value().attr("href")?.trim();
    if href.is_empty() {
        return None;
    }
    let link = page_url.join(href).ok()?;
    if !matches!(link.scheme(), "http" | "https") {
        return None;
    }

    Some(ListingRecord { title, price, link })
}

/// Text content with runs of whitespace collapsed.
fn element_text(el: ElementRef<'_>) -> String {
    el.text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Parse a displayed price such as "12 500 €" or "€12.500" into whole units.
///
/// `.` and `,` are accepted only as thousands separators (followed by exactly
/// three digits); anything with a fractional part or other text is rejected.
pub fn parse_price(text: &str) -> Option<u64> {
    let compact: String = text
        .chars()
        .filter(|c| !c.is_whitespace() && !CURRENCY_SYMBOLS.contains(c))
        .collect();

    let mut groups = compact.split(['.', ',']);
    let mut digits = groups.next()?.to_string();
    for group in groups {
        if group.len() != 3 {
            return None;
        }
        digits.push_str(group);
    }

    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    digits.parse().ok()
}
