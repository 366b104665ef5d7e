//! Canonical-document admission by date proximity.
//!
//! Sources re-list the same weekly edition with slightly different labels and
//! links, and two sources usually carry the same edition a day or two apart.
//! Exact-date equality is therefore too strict; instead a candidate is
//! admitted only if no already-kept document's date lies within a proximity
//! window of it. Genuinely distinct editions sit at least a week apart, so
//! the default window of 4 days separates them cleanly.

use tracing::{debug, warn};

use crate::dates;
use crate::models::{CanonicalDocument, RawCandidate};
use crate::utils::truncate_for_log;

/// Default proximity window, in days.
pub const DEFAULT_PROXIMITY_DAYS: i64 = 4;

const SECS_PER_DAY: i64 = 86_400;

/// Owns the canonical result set for one run.
///
/// The admission check is a linear scan over all kept keys. The set is
/// bounded by the number of editions the sources have ever published, tens to
/// low hundreds, so nothing fancier is warranted.
pub struct Deduplicator {
    window_secs: i64,
    documents: Vec<CanonicalDocument>,
}

impl Deduplicator {
    pub fn new(proximity_days: i64) -> Self {
        Self {
            window_secs: proximity_days * SECS_PER_DAY,
            documents: Vec::new(),
        }
    }

    /// Offer a candidate for admission.
    ///
    /// Candidates whose labels carry no parseable date are skipped with a
    /// warning. Otherwise the candidate is kept unless an already-admitted
    /// document's key lies strictly within the proximity window, in which
    /// case the earlier discovery wins and the candidate is dropped.
    pub fn offer(&mut self, candidate: RawCandidate) {
        let Some(date) = dates::parse_label(&candidate.label) else {
            warn!(
                label = %truncate_for_log(&candidate.label, 120),
                "No date in label; skipping candidate"
            );
            return;
        };
        let key = date.and_hms_opt(0, 0, 0).unwrap().and_utc().timestamp();

        if let Some(existing) = self
            .documents
            .iter()
            .find(|d| (d.key - key).abs() < self.window_secs)
        {
            debug!(
                %date,
                kept = %existing.date,
                "Candidate within proximity window of kept document; dropping"
            );
            return;
        }

        debug!(%date, key, label = %truncate_for_log(&candidate.label, 120), "Admitted document");
        self.documents.push(CanonicalDocument {
            label: candidate.label,
            link: candidate.link,
            date,
            key,
        });
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Hand the canonical set over to the download phase.
    pub fn into_documents(self) -> Vec<CanonicalDocument> {
        self.documents
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use url::Url;

    fn candidate(label: &str) -> RawCandidate {
        RawCandidate {
            label: label.to_string(),
            link: Url::parse("https://example.com/weekly.pdf").unwrap(),
        }
    }

    #[test]
    fn test_three_day_gap_keeps_first_only() {
        let mut dedup = Deduplicator::new(DEFAULT_PROXIMITY_DAYS);
        dedup.offer(candidate("Weekly Current Affairs (28 Oct - 03 Nov 2024)"));
        dedup.offer(candidate("Weekly One Liners (31 Oct - 06 Nov 2024)"));

        let docs = dedup.into_documents();
        assert_eq!(docs.len(), 1);
        assert_eq!(docs[0].date.to_string(), "2024-11-03");
        assert!(docs[0].label.starts_with("Weekly Current Affairs"));
    }

    #[test]
    fn test_seven_day_gap_keeps_both() {
        let mut dedup = Deduplicator::new(DEFAULT_PROXIMITY_DAYS);
        dedup.offer(candidate("Weekly Current Affairs (28 Oct - 03 Nov 2024)"));
        dedup.offer(candidate("Weekly Current Affairs (04 Nov - 10 Nov 2024)"));
        assert_eq!(dedup.len(), 2);
    }

    #[test]
    fn test_identical_dates_collapse() {
        let mut dedup = Deduplicator::new(DEFAULT_PROXIMITY_DAYS);
        dedup.offer(candidate("Weekly Current Affairs (03 Nov 2024)"));
        dedup.offer(candidate("Weekly Current Affairs PDF (03 Nov 2024)"));
        assert_eq!(dedup.len(), 1);
    }

    #[test]
    fn test_gap_equal_to_window_is_admitted() {
        let mut dedup = Deduplicator::new(DEFAULT_PROXIMITY_DAYS);
        dedup.offer(candidate("Bulletin (03 Nov 2024)"));
        dedup.offer(candidate("Bulletin (07 Nov 2024)"));
        assert_eq!(dedup.len(), 2);
    }

    #[test]
    fn test_window_is_configurable() {
        let mut dedup = Deduplicator::new(1);
        dedup.offer(candidate("Bulletin (03 Nov 2024)"));
        dedup.offer(candidate("Bulletin (04 Nov 2024)"));
        assert_eq!(dedup.len(), 2);

        let mut wide = Deduplicator::new(10);
        wide.offer(candidate("Bulletin (03 Nov 2024)"));
        wide.offer(candidate("Bulletin (10 Nov 2024)"));
        assert_eq!(wide.len(), 1);
    }

    #[test]
    fn test_unparseable_label_is_skipped() {
        let mut dedup = Deduplicator::new(DEFAULT_PROXIMITY_DAYS);
        dedup.offer(candidate("Miscellaneous Notice"));
        assert!(dedup.is_empty());
    }

    #[test]
    fn test_key_is_utc_midnight_epoch() {
        let mut dedup = Deduplicator::new(DEFAULT_PROXIMITY_DAYS);
        dedup.offer(candidate("Weekly Current Affairs (28 Oct - 03 Nov 2024)"));
        assert_eq!(dedup.into_documents()[0].key, 1_730_592_000);
    }
}
