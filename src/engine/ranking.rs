//! ROI annotation and top-N ordering of extracted listings.

use super::criteria::SearchCriteria;
use super::roi::{calculate_roi, estimate_resale_value};
use crate::feed::types::ListingRecord;
use serde::Serialize;

/// Maximum number of listings a ranking returns.
pub const TOP_N: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedListing {
    #[serde(flatten)]
    pub listing: ListingRecord,
    pub estimated_resale_value: u64,
    pub roi_percent: f64,
}

/// Output of [`rank_listings`]: the kept listings plus how many were dropped
/// because their ROI is undefined.
#[derive(Debug, Clone, Default)]
pub struct Ranked {
    pub listings: Vec<RankedListing>,
    pub undefined_roi: usize,
}

/// Annotate each record with its resale estimate and ROI, then keep the
/// `TOP_N` best by ROI. Equal ROIs keep their input order.
pub fn rank_listings(
    records: Vec<ListingRecord>,
    criteria: &SearchCriteria,
    resale_markup: u64,
) -> Ranked {
    let mut undefined_roi = 0;
    let mut listings: Vec<RankedListing> = records
        .into_iter()
        .filter_map(|listing| {
            let resale = estimate_resale_value(listing.price, resale_markup);
            match calculate_roi(listing.price, criteria.import_fee, criteria.sale_fee, resale) {
                Ok(roi_percent) => Some(RankedListing {
                    listing,
                    estimated_resale_value: resale,
                    roi_percent,
                }),
                Err(e) => {
                    tracing::debug!(title = %listing.title, error = %e, "dropping listing");
                    undefined_roi += 1;
                    None
                }
            }
        })
        .collect();

    // sort_by is stable: ties stay in extraction order
    listings.sort_by(|a, b| b.roi_percent.total_cmp(&a.roi_percent));
    listings.truncate(TOP_N);

    Ranked { listings, undefined_roi }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn record(title: &str, price: u64) -> ListingRecord {
        ListingRecord {
            title: title.to_string(),
            price,
            link: Url::parse(&format!("https://example.test/{}", title)).unwrap(),
        }
    }

    fn criteria() -> SearchCriteria {
        SearchCriteria {
            import_fee: 1_500,
            sale_fee: 500,
            ..SearchCriteria::default()
        }
    }

    #[test]
    fn test_orders_by_roi_descending() {
        let records = vec![record("a", 10_000), record("b", 20_000), record("c", 5_000)];
        let ranked = rank_listings(records, &criteria(), 3_000);
        let prices: Vec<u64> = ranked.listings.iter().map(|r| r.listing.price).collect();
        assert_eq!(prices, vec![5_000, 10_000, 20_000]);
        let rois: Vec<f64> = ranked.listings.iter().map(|r| r.roi_percent).collect();
        assert_eq!(rois, vec![20.0, 10.0, 5.0]);
        assert_eq!(ranked.listings[0].estimated_resale_value, 8_000);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let records = vec![record("first", 10_000), record("cheap", 5_000), record("second", 10_000)];
        let ranked = rank_listings(records, &criteria(), 3_000);
        let titles: Vec<&str> = ranked.listings.iter().map(|r| r.listing.title.as_str()).collect();
        assert_eq!(titles, vec!["cheap", "first", "second"]);
    }

    #[test]
    fn test_truncates_to_top_n() {
        let records: Vec<ListingRecord> = (1..=15).map(|i| record(&format!("car{i}"), i * 1_000)).collect();
        let ranked = rank_listings(records, &criteria(), 3_000);
        assert_eq!(ranked.listings.len(), TOP_N);
        assert!(ranked
            .listings
            .windows(2)
            .all(|w| w[0].roi_percent >= w[1].roi_percent));
        // cheapest car has the highest ROI with a flat markup
        assert_eq!(ranked.listings[0].listing.price, 1_000);
    }

    #[test]
    fn test_zero_price_dropped_not_fatal() {
        let records = vec![record("free", 0), record("paid", 10_000)];
        let ranked = rank_listings(records, &criteria(), 3_000);
        assert_eq!(ranked.undefined_roi, 1);
        assert_eq!(ranked.listings.len(), 1);
        assert_eq!(ranked.listings[0].listing.title, "paid");
    }

    #[test]
    fn test_empty_input() {
        let ranked = rank_listings(Vec::new(), &criteria(), 3_000);
        assert!(ranked.listings.is_empty());
        assert_eq!(ranked.undefined_roi, 0);
    }
}
