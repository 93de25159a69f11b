use serde::Serialize;
use url::Url;

/// One classified ad as read from a search-results page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ListingRecord {
    pub title: String,
    pub price: u64, // whole currency units
    pub link: Url,
}

/// Why a search page could not be retrieved. Callers treat this as zero listings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum FetchUnavailable {
    #[error("search page returned HTTP {0}")]
    Status(u16),
    #[error("search request failed: {0}")]
    Transport(String),
}

/// Records pulled from one page, plus how many candidates were malformed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Extraction {
    pub records: Vec<ListingRecord>,
    pub skipped: usize,
}
