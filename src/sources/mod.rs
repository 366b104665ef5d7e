//! Source registry and per-source candidate extraction.
//!
//! Each source pairs an archive page with the rule that pulls
//! `(label, link)` candidates out of its rendered HTML. Rules are pure
//! functions over the rendered document: no side effects, no network access.
//!
//! # Registered Sources
//!
//! | Source | Rule | Notes |
//! |--------|------|-------|
//! | Adda247 current affairs | [`ExtractionRule::KeywordPdfLinks`] | Inline PDF links, filtered by label keyword |
//! | AffairsCloud weekly PDFs | [`ExtractionRule::StructuredList`] | Archive table: label cell, then link cell |
//!
//! Registry order matters: the deduplicator keeps the first candidate it sees
//! for an edition, so earlier sources take priority.

use scraper::{ElementRef, Html, Selector};
use std::error::Error;
use url::Url;

use crate::models::RawCandidate;

/// A scrape target paired with its extraction rule. Built once at startup,
/// read-only for the run.
#[derive(Debug)]
pub struct SourceDescriptor {
    pub location: Url,
    pub extract: ExtractionRule,
}

/// How to pull candidates out of one source's rendered page.
///
/// One variant per page shape keeps each source's quirks isolated and
/// independently testable.
#[derive(Debug)]
pub enum ExtractionRule {
    /// Keep every link to a `.pdf` whose visible text contains `keyword`
    /// (case-insensitively).
    KeywordPdfLinks { keyword: &'static str },
    /// Walk the rows matched by `rows`; in each row the first child element
    /// holds the label and the first link inside the second child holds the
    /// href. A row missing either part is a structural error, not a skip.
    StructuredList { rows: &'static str },
}

/// The known sources, in priority order.
pub fn registry() -> Result<Vec<SourceDescriptor>, Box<dyn Error>> {
    Ok(vec![
        SourceDescriptor {
            location: Url::parse("https://currentaffairs.adda247.com/weekly-current-affairs-pdf/")?,
            extract: ExtractionRule::KeywordPdfLinks {
                keyword: "weekly current affairs",
            },
        },
        SourceDescriptor {
            location: Url::parse("https://affairscloud.com/current-affairs-pdf/weekly-pdf/")?,
            extract: ExtractionRule::StructuredList {
                rows: "div.entry-content table tr",
            },
        },
    ])
}

impl ExtractionRule {
    /// Extract raw candidates from rendered page HTML, resolving links
    /// against `base`.
    pub fn extract(&self, html: &str, base: &Url) -> Result<Vec<RawCandidate>, Box<dyn Error>> {
        let document = Html::parse_document(html);
        match self {
            ExtractionRule::KeywordPdfLinks { keyword } => {
                Ok(extract_keyword_links(&document, base, keyword))
            }
            ExtractionRule::StructuredList { rows } => {
                extract_structured_list(&document, base, rows)
            }
        }
    }
}

/// Visible text of an element, whitespace-normalized.
fn visible_text(element: ElementRef) -> String {
    element
        .text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Scan every hyperlink ending in `.pdf` and keep those whose visible text
/// contains the keyword. Zero matches is a valid empty result; unresolvable
/// hrefs are dropped.
fn extract_keyword_links(document: &Html, base: &Url, keyword: &str) -> Vec<RawCandidate> {
    let link_selector = Selector::parse("a[href]").unwrap();
    let keyword = keyword.to_lowercase();

    let mut candidates = Vec::new();
    for element in document.select(&link_selector) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        if !href.to_lowercase().ends_with(".pdf") {
            continue;
        }
        let label = visible_text(element);
        if !label.to_lowercase().contains(&keyword) {
            continue;
        }
        if let Ok(resolved) = base.join(href) {
            candidates.push(RawCandidate {
                label,
                link: resolved,
            });
        }
    }
    candidates
}

/// Walk a fixed row structure: first child is the label cell, first link
/// inside the second child is the download href. Absent structure is fatal
/// for the source.
fn extract_structured_list(
    document: &Html,
    base: &Url,
    rows: &str,
) -> Result<Vec<RawCandidate>, Box<dyn Error>> {
    let row_selector =
        Selector::parse(rows).map_err(|e| format!("bad row selector `{rows}`: {e}"))?;
    let link_selector = Selector::parse("a[href]").unwrap();

    let matched: Vec<_> = document.select(&row_selector).collect();
    if matched.is_empty() {
        return Err(format!("no rows matched `{rows}`").into());
    }

    let mut candidates = Vec::new();
    for row in matched {
        let mut cells = row.child_elements();
        let label_cell = cells
            .next()
            .ok_or_else(|| format!("row in `{rows}` has no label cell"))?;
        let link_cell = cells
            .next()
            .ok_or_else(|| format!("row in `{rows}` has no link cell"))?;
        let anchor = link_cell
            .select(&link_selector)
            .next()
            .ok_or_else(|| format!("row in `{rows}` has no link"))?;
        let href = anchor
            .value()
            .attr("href")
            .ok_or_else(|| format!("row in `{rows}` has a link without href"))?;

        candidates.push(RawCandidate {
            label: visible_text(label_cell),
            link: base.join(href)?,
        });
    }
    Ok(candidates)
}
