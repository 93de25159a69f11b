use crate::engine::SearchCriteria;
use url::Url;

/// Build the search URL for `criteria` on top of `base`.
///
/// Parameter names are the ones the classifieds site expects. Values are
/// passed through unvalidated.
pub fn build_search_url(base: &Url, criteria: &SearchCriteria) -> Url {
    let mut url = base.clone();
    url.query_pairs_mut()
        .append_pair("marque", &criteria.make)
        .append_pair("modele", &criteria.model)
        .append_pair("prix_max", &criteria.max_price.to_string())
        .append_pair("annee_min", &criteria.min_year.to_string())
        .append_pair("km_max", &criteria.max_mileage.to_string());
    url
}
