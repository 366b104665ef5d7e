//! Edition-date parsing for bulletin labels.
//!
//! Source pages label each bulletin with free text like
//! `"Weekly Current Affairs (28 Oct - 03 Nov, 2024)"`. Only the end of the
//! covered period matters for filing and deduplication, since it is the
//! effective "as of" date of the document, so a range's start date is matched
//! but discarded.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

/// A date fragment inside one parenthesis group: an optional range-start
/// prefix ending in `-`, then day (with optional ordinal suffix), month name,
/// and 4-digit year.
static DATE_IN_PARENS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\(([^()]*-)?\s*(\d{1,2})\s*(?:st|nd|rd|th)?\s+([A-Za-z]{3,9})\.?\s+(\d{4})\s*\)")
        .unwrap()
});

/// Parse the edition date out of a bulletin label.
///
/// Returns `None` for labels without a recognizable parenthesized date; most
/// page elements are expected to be non-matching noise, so this is not an
/// error condition.
pub fn parse_label(label: &str) -> Option<NaiveDate> {
    // Commas show up both as list punctuation and between month and year.
    let cleaned = label.replace(',', "");
    let caps = DATE_IN_PARENS.captures(&cleaned)?;
    compose(&caps[2], &caps[3], &caps[4])
}

/// Compose a calendar date from day, English month name, and year tokens.
/// Unrecognized month names and impossible days both yield `None`.
fn compose(day: &str, month: &str, year: &str) -> Option<NaiveDate> {
    let text = format!("{day} {month} {year}");
    NaiveDate::parse_from_str(&text, "%d %b %Y")
        .or_else(|_| NaiveDate::parse_from_str(&text, "%d %B %Y"))
        .ok()
}
