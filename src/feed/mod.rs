pub mod extract;
pub mod http;
pub mod query;
pub mod types;

use async_trait::async_trait;
use types::FetchUnavailable;
use url::Url;

/// Where search-result pages come from.
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch the raw page at `url`, or report that it is unavailable.
    async fn fetch_page(&self, url: &Url) -> Result<String, FetchUnavailable>;
}
