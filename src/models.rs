//! Data models for discovered documents.
//!
//! Two structs carry a document through the pipeline:
//! - [`RawCandidate`]: a `(label, link)` pair straight out of a rendered page
//! - [`CanonicalDocument`]: the single retained representative of one weekly
//!   edition, after the label has been parsed and near-duplicates collapsed

use chrono::NaiveDate;
use url::Url;

/// A candidate document as extracted from a rendered source page.
///
/// Candidates are transient: each one is offered to the deduplicator, which
/// either promotes it to a [`CanonicalDocument`] or drops it.
#[derive(Debug)]
pub struct RawCandidate {
    /// The visible text the source attached to the link.
    pub label: String,
    /// The absolute URL of the PDF.
    pub link: Url,
}

/// A deduplicated document, keyed by its edition date.
///
/// `key` is the edition date at UTC midnight expressed as seconds since the
/// Unix epoch. It serves as both the dedup comparison key and the leading
/// filename component, so a document keeps the same on-disk name across runs.
#[derive(Debug)]
pub struct CanonicalDocument {
    /// Label of the first candidate discovered for this edition.
    pub label: String,
    /// Download URL of that candidate.
    pub link: Url,
    /// Edition date parsed out of the label.
    pub date: NaiveDate,
    /// `date` at UTC midnight, as epoch seconds.
    pub key: i64,
}

impl CanonicalDocument {
    /// Deterministic on-disk name: `"<key> <YYYY-MM-DD>.pdf"`.
    pub fn file_name(&self) -> String {
        format!("{} {}.pdf", self.key, self.date.format("%Y-%m-%d"))
    }
}
