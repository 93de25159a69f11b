//! Search -> fetch -> extract -> ROI -> top 10.

use crate::config::Config;
use crate::engine::ranking::rank_listings;
use crate::engine::{RankedListing, SearchCriteria};
use crate::feed::extract::{extract_listings, ListingSelectors};
use crate::feed::query::build_search_url;
use crate::feed::types::FetchUnavailable;
use crate::feed::ListingSource;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use std::time::Instant;
use url::Url;

/// One ranking run. `listings` is best-first and holds at most
/// [`TOP_N`](crate::engine::TOP_N) entries.
#[derive(Debug, Clone)]
pub struct RankingResult {
    pub listings: Vec<RankedListing>,
    /// Set when the search page could not be fetched; `listings` is then empty.
    pub unavailable: Option<FetchUnavailable>,
    pub skipped_candidates: usize,
    pub undefined_roi: usize,
    pub ranked_at: DateTime<Utc>,
}

impl RankingResult {
    fn unavailable(reason: FetchUnavailable) -> Self {
        Self {
            listings: Vec::new(),
            unavailable: Some(reason),
            skipped_candidates: 0,
            undefined_roi: 0,
            ranked_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

pub struct RankingPipeline<S> {
    source: S,
    search_base: Url,
    selectors: ListingSelectors,
    resale_markup: u64,
}

impl<S: ListingSource> RankingPipeline<S> {
    pub fn new(source: S, config: &Config) -> Result<Self> {
        let search_base = Url::parse(&config.search.base_url)
            .with_context(|| format!("invalid search.base_url: {}", config.search.base_url))?;
        let selectors = ListingSelectors::from_config(&config.selectors)?;
        Ok(Self {
            source,
            search_base,
            selectors,
            resale_markup: config.ranking.resale_markup,
        })
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn resale_markup(&self) -> u64 {
        self.resale_markup
    }

    /// Run one independent search for `criteria`. Never fails: an unreachable
    /// site yields an empty result with `unavailable` set.
    pub async fn rank(&self, criteria: &SearchCriteria) -> RankingResult {
        let started = Instant::now();
        let url = build_search_url(&self.search_base, criteria);

        let body = match self.source.fetch_page(&url).await {
            Ok(body) => body,
            Err(reason) => {
                tracing::warn!(%url, error = %reason, "no listings: search page unavailable");
                return RankingResult::unavailable(reason);
            }
        };

        let extraction = extract_listings(&body, &url, &self.selectors);
        let extracted = extraction.records.len();
        let ranked = rank_listings(extraction.records, criteria, self.resale_markup);

        tracing::info!(
            make = %criteria.make,
            model = %criteria.model,
            extracted,
            skipped = extraction.skipped,
            undefined_roi = ranked.undefined_roi,
            returned = ranked.listings.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "ranking complete"
        );

        RankingResult {
            listings: ranked.listings,
            unavailable: None,
            skipped_candidates: extraction.skipped,
            undefined_roi: ranked.undefined_roi,
            ranked_at: Utc::now(),
        }
    }
}
