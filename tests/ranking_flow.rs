//! End-to-end ranking runs against canned search pages.

use async_trait::async_trait;
use autoroi::config::Config;
use autoroi::engine::SearchCriteria;
use autoroi::feed::types::FetchUnavailable;
use autoroi::feed::ListingSource;
use autoroi::pipeline::RankingPipeline;
use std::sync::Mutex;
use url::Url;

/// Serves a fixed page (or failure) and records the URLs it was asked for.
struct StubSource {
    page: Result<String, FetchUnavailable>,
    requested: Mutex<Vec<Url>>,
}

impl StubSource {
    fn page(html: String) -> Self {
        Self { page: Ok(html), requested: Mutex::new(Vec::new()) }
    }

    fn failing(reason: FetchUnavailable) -> Self {
        Self { page: Err(reason), requested: Mutex::new(Vec::new()) }
    }
}

#[async_trait]
impl ListingSource for StubSource {
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchUnavailable> {
        self.requested.lock().unwrap().push(url.clone());
        self.page.clone()
    }
}

fn listing(title: &str, price: &str, href: &str) -> String {
    format!(
        r#"<div class="listing-item">
            <h3 class="listing-title">{title}</h3>
            <div class="listing-price">{price}</div>
            <a href="{href}">Details</a>
        </div>"#
    )
}

fn page(items: &[String]) -> String {
    format!("<html><body><section class=\"results\">{}</section></body></html>", items.concat())
}

fn criteria() -> SearchCriteria {
    SearchCriteria {
        import_fee: 1_500,
        sale_fee: 500,
        ..SearchCriteria::default()
    }
}

fn pipeline(source: StubSource) -> RankingPipeline<StubSource> {
    RankingPipeline::new(source, &Config::default()).unwrap()
}

#[tokio::test]
async fn test_three_listings_ranked_by_roi() {
    let html = page(&[
        listing("BMW 530d Touring", "10 000 €", "/annonce/a"),
        listing("BMW 530d Berline", "20 000 €", "/annonce/b"),
        listing("BMW 530d Luxury", "5 000 €", "/annonce/c"),
    ]);
    let result = pipeline(StubSource::page(html)).rank(&criteria()).await;

    assert!(result.unavailable.is_none());
    let got: Vec<(u64, f64)> = result
        .listings
        .iter()
        .map(|r| (r.listing.price, r.roi_percent))
        .collect();
    assert_eq!(got, vec![(5_000, 20.0), (10_000, 10.0), (20_000, 5.0)]);
    assert_eq!(
        result.listings[0].listing.link.as_str(),
        "https://www.leparking.fr/annonce/c"
    );
}

#[tokio::test]
async fn test_only_candidate_missing_price_gives_empty_result() {
    let html = page(&[r#"<div class="listing-item">
        <h3 class="listing-title">BMW 530d</h3>
        <a href="/annonce/x">Details</a>
    </div>"#
        .to_string()]);
    let result = pipeline(StubSource::page(html)).rank(&criteria()).await;

    assert!(result.is_empty());
    assert!(result.unavailable.is_none());
    assert_eq!(result.skipped_candidates, 1);
}

#[tokio::test]
async fn test_unavailable_source_gives_empty_result() {
    let result = pipeline(StubSource::failing(FetchUnavailable::Status(500)))
        .rank(&criteria())
        .await;

    assert!(result.is_empty());
    assert_eq!(result.unavailable, Some(FetchUnavailable::Status(500)));
}

#[tokio::test]
async fn test_twenty_five_candidates_capped_then_top_ten() {
    let items: Vec<String> = (1..=25)
        .map(|i| listing(&format!("Car {i}"), &format!("{} 000 €", 30 - i), &format!("/annonce/{i}")))
        .collect();
    let result = pipeline(StubSource::page(page(&items))).rank(&criteria()).await;

    // Candidates 21..25 are never read, so the cheapest cars (prices 5k..9k) are absent.
    assert_eq!(result.listings.len(), 10);
    assert!(result.listings.iter().all(|r| r.listing.price >= 10_000));
    assert_eq!(result.listings[0].listing.title, "Car 20");
    assert!(result
        .listings
        .windows(2)
        .all(|w| w[0].roi_percent >= w[1].roi_percent));
}

#[tokio::test]
async fn test_equal_roi_keeps_document_order() {
    let html = page(&[
        listing("First", "12 000 €", "/1"),
        listing("Second", "12 000 €", "/2"),
        listing("Third", "12 000 €", "/3"),
    ]);
    let result = pipeline(StubSource::page(html)).rank(&criteria()).await;
    let titles: Vec<&str> = result.listings.iter().map(|r| r.listing.title.as_str()).collect();
    assert_eq!(titles, vec!["First", "Second", "Third"]);
}

#[tokio::test]
async fn test_zero_price_listing_dropped() {
    let html = page(&[
        listing("Free?", "0 €", "/free"),
        listing("Real", "10 000 €", "/real"),
    ]);
    let result = pipeline(StubSource::page(html)).rank(&criteria()).await;
    assert_eq!(result.undefined_roi, 1);
    assert_eq!(result.listings.len(), 1);
    assert_eq!(result.listings[0].listing.title, "Real");
}

#[tokio::test]
async fn test_markup_is_configurable() {
    let mut config = Config::default();
    config.ranking.resale_markup = 5_000;
    let html = page(&[listing("Car", "10 000 €", "/c")]);
    let pipeline = RankingPipeline::new(StubSource::page(html), &config).unwrap();

    let result = pipeline.rank(&criteria()).await;
    // (15000 - 10000 - 2000) / 10000 = 30%
    assert_eq!(result.listings[0].estimated_resale_value, 15_000);
    assert_eq!(result.listings[0].roi_percent, 30.0);
}

#[tokio::test]
async fn test_search_url_built_from_criteria() {
    let pipeline = pipeline(StubSource::page(String::new()));
    let criteria = SearchCriteria {
        make: "Audi".to_string(),
        model: "A6".to_string(),
        max_price: 18_000,
        ..criteria()
    };
    let result = pipeline.rank(&criteria).await;
    assert!(result.is_empty());

    let requested = pipeline.source().requested.lock().unwrap();
    assert_eq!(
        requested[0].as_str(),
        "https://www.leparking.fr/recherche?marque=Audi&modele=A6&prix_max=18000&annee_min=2017&km_max=120000"
    );
}

#[tokio::test]
async fn test_each_run_fetches_again() {
    let pipeline = pipeline(StubSource::page(page(&[listing("Car", "10 000 €", "/c")])));
    let first = pipeline.rank(&criteria()).await;
    let second = pipeline.rank(&criteria()).await;
    assert_eq!(first.listings, second.listings);
    assert_eq!(pipeline.source().requested.lock().unwrap().len(), 2);
}

#[test]
fn test_invalid_base_url_rejected() {
    let mut config = Config::default();
    config.search.base_url = "not a url".to_string();
    assert!(RankingPipeline::new(StubSource::page(String::new()), &config).is_err());
}
