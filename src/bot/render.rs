//! Message text and keyboards. All text is Telegram HTML.

use super::types::{InlineKeyboardButton, InlineKeyboardMarkup};
use crate::engine::{CriteriaField, CriteriaValue, SearchCriteria, ValidationError, TOP_N};
use crate::pipeline::RankingResult;
use std::fmt::Write;

pub const EDIT_PREFIX: &str = "edit_";
pub const SHOW_ADS: &str = "show_ads";

const MAX_TITLE_CHARS: usize = 80;

pub fn welcome_text() -> String {
    "🚗 <b>Welcome to AutoROI.</b>\n\n\
     Use /menu to change your search criteria.\n\
     Use /criteria to see them.\n\
     Use /runonce to see the 10 best listings."
        .to_string()
}

pub fn menu_text() -> String {
    "⚙️ Choose a criterion to change:".to_string()
}

pub fn menu_keyboard() -> InlineKeyboardMarkup {
    use CriteriaField::*;
    let button = |field: CriteriaField| {
        InlineKeyboardButton::callback(field.label(), &format!("{}{}", EDIT_PREFIX, field.key()))
    };
    InlineKeyboardMarkup {
        inline_keyboard: vec![
            vec![button(Make), button(Model)],
            vec![button(MaxPrice), button(MinYear)],
            vec![button(MaxMileage)],
            vec![button(ImportFee), button(SaleFee)],
            vec![InlineKeyboardButton::callback("✅ Show listings", SHOW_ADS)],
        ],
    }
}

pub fn criteria_text(c: &SearchCriteria) -> String {
    format!(
        "📋 <b>Current criteria:</b>\n\
         - Make: {}\n\
         - Model: {}\n\
         - Max price: {} €\n\
         - Min year: {}\n\
         - Max mileage: {} km\n\
         - Import fee: {} €\n\
         - Sale fee: {} €",
        escape_html(&c.make),
        escape_html(&c.model),
        group_thousands(c.max_price),
        c.min_year,
        group_thousands(c.max_mileage),
        group_thousands(c.import_fee),
        group_thousands(c.sale_fee),
    )
}

pub fn edit_prompt(field: CriteriaField) -> String {
    format!("✏️ Enter a new value for <b>{}</b>:", escape_html(field.label()))
}

pub fn updated_text(field: CriteriaField, value: &CriteriaValue) -> String {
    format!(
        "✅ {} updated: {}",
        escape_html(field.label()),
        escape_html(&value.to_string())
    )
}

pub fn validation_text(err: &ValidationError) -> String {
    match err {
        ValidationError::NotANumber { .. } => "⚠️ Please enter a valid whole number.".to_string(),
        ValidationError::Empty { field } => {
            format!("⚠️ {} cannot be empty.", escape_html(field.label()))
        }
        ValidationError::UnknownField(_) => "⚠️ Unknown criterion.".to_string(),
    }
}

pub fn ranking_text(result: &RankingResult) -> String {
    if result.is_empty() {
        let mut text = "😕 No listings found.".to_string();
        if let Some(reason) = &result.unavailable {
            let _ = write!(text, "\nThe search site is unavailable ({}).", escape_html(&reason.to_string()));
        }
        return text;
    }

    let mut text = format!("🔔 <b>TOP {} best deals:</b>\n\n", TOP_N);
    for (i, ranked) in result.listings.iter().enumerate() {
        let _ = writeln!(
            text,
            "{}. <a href=\"{}\">{} – {} € – ROI {:.1}%</a>",
            i + 1,
            escape_html(ranked.listing.link.as_str()),
            escape_html(&truncate_chars(&ranked.listing.title, MAX_TITLE_CHARS)),
            group_thousands(ranked.listing.price),
            ranked.roi_percent,
        );
    }
    text
}

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// 1234567 -> "1 234 567"
pub fn group_thousands(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(' ');
        }
        out.push(ch);
    }
    out
}

fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max - 1).collect();
    out.push('…');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::RankedListing;
    use crate::feed::types::{FetchUnavailable, ListingRecord};
    use url::Url;

    fn result(listings: Vec<RankedListing>, unavailable: Option<FetchUnavailable>) -> RankingResult {
        RankingResult {
            listings,
            unavailable,
            skipped_candidates: 0,
            undefined_roi: 0,
            ranked_at: chrono::Utc::now(),
        }
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0), "0");
        assert_eq!(group_thousands(999), "999");
        assert_eq!(group_thousands(1_000), "1 000");
        assert_eq!(group_thousands(25_000), "25 000");
        assert_eq!(group_thousands(1_234_567), "1 234 567");
    }

    #[test]
    fn test_menu_callbacks() {
        let kb = menu_keyboard();
        let data: Vec<&str> = kb
            .inline_keyboard
            .iter()
            .flatten()
            .map(|b| b.callback_data.as_str())
            .collect();
        assert_eq!(
            data,
            vec![
                "edit_make", "edit_model", "edit_maxPrice", "edit_minYear",
                "edit_maxMileage", "edit_importFee", "edit_saleFee", "show_ads"
            ]
        );
    }

    #[test]
    fn test_criteria_text_escapes() {
        let c = SearchCriteria {
            model: "<script>".to_string(),
            ..SearchCriteria::default()
        };
        let text = criteria_text(&c);
        assert!(text.contains("&lt;script&gt;"));
        assert!(text.contains("Max price: 25 000 €"));
    }

    #[test]
    fn test_ranking_text_lists_entries() {
        let listing = RankedListing {
            listing: ListingRecord {
                title: "BMW 530d & co".to_string(),
                price: 5_000,
                link: Url::parse("https://example.test/a?x=1&y=2").unwrap(),
            },
            estimated_resale_value: 8_000,
            roi_percent: 20.0,
        };
        let text = ranking_text(&result(vec![listing], None));
        assert!(text.contains("TOP 10"));
        assert!(text.contains(
            "1. <a href=\"https://example.test/a?x=1&amp;y=2\">BMW 530d &amp; co – 5 000 € – ROI 20.0%</a>"
        ));
    }

    #[test]
    fn test_ranking_text_empty_and_unavailable() {
        assert_eq!(ranking_text(&result(vec![], None)), "😕 No listings found.");
        let text = ranking_text(&result(vec![], Some(FetchUnavailable::Status(503))));
        assert!(text.starts_with("😕 No listings found."));
        assert!(text.contains("HTTP 503"));
    }

    #[test]
    fn test_long_titles_truncated() {
        let long = "x".repeat(200);
        let t = truncate_chars(&long, MAX_TITLE_CHARS);
        assert_eq!(t.chars().count(), MAX_TITLE_CHARS);
        assert!(t.ends_with('…'));
    }
}
