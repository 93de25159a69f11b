pub mod criteria;
pub mod ranking;
pub mod roi;

pub use criteria::{CriteriaField, CriteriaValue, SearchCriteria, ValidationError};
pub use ranking::{rank_listings, RankedListing, TOP_N};
