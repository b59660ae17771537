// src/pipeline/eligibility.rs
//! Pure candidate selection: which entries may be dispatched, and in what order.

use chrono::{DateTime, Utc};
use std::fmt;

use crate::ingest::types::Entry;
use crate::state::ProcessedIds;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SkipReason {
    NoLink,
    AlreadyProcessed,
    Stale,
}

impl SkipReason {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NoLink => "no_link",
            Self::AlreadyProcessed => "already_processed",
            Self::Stale => "stale",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Eligibility {
    Admit,
    Skip(SkipReason),
}

/// Hours since publication. Entries without a timestamp count as brand new (0h).
pub fn entry_age_hours(entry: &Entry, now: DateTime<Utc>) -> f64 {
    match entry.published_at {
        Some(ts) => now.signed_duration_since(ts).num_milliseconds() as f64 / 3_600_000.0,
        None => 0.0,
    }
}

pub fn classify(
    entry: &Entry,
    processed: &ProcessedIds,
    now: DateTime<Utc>,
    max_age_hours: u64,
) -> Eligibility {
    if entry.link.is_none() {
        return Eligibility::Skip(SkipReason::NoLink);
    }
    if entry.key().is_some_and(|k| processed.contains(k)) {
        return Eligibility::Skip(SkipReason::AlreadyProcessed);
    }
    if entry_age_hours(entry, now) > max_age_hours as f64 {
        return Eligibility::Skip(SkipReason::Stale);
    }
    Eligibility::Admit
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkipCounts {
    pub no_link: usize,
    pub already_processed: usize,
    pub stale: usize,
}

impl SkipCounts {
    pub fn bump(&mut self, reason: SkipReason) {
        match reason {
            SkipReason::NoLink => self.no_link += 1,
            SkipReason::AlreadyProcessed => self.already_processed += 1,
            SkipReason::Stale => self.stale += 1,
        }
    }
}

/// Classify every entry in feed order; admitted entries keep their relative order.
pub fn filter_entries(
    entries: &[Entry],
    processed: &ProcessedIds,
    now: DateTime<Utc>,
    max_age_hours: u64,
) -> (Vec<Entry>, SkipCounts) {
    let mut admitted = Vec::with_capacity(entries.len());
    let mut skipped = SkipCounts::default();
    for entry in entries {
        match classify(entry, processed, now, max_age_hours) {
            Eligibility::Admit => admitted.push(entry.clone()),
            Eligibility::Skip(reason) => {
                tracing::info!(
                    title = entry.display_title(),
                    reason = reason.as_str(),
                    age_h = entry_age_hours(entry, now),
                    "entry skipped"
                );
                metrics::counter!("feed_skipped_total", "reason" => reason.as_str()).increment(1);
                skipped.bump(reason);
            }
        }
    }
    (admitted, skipped)
}

/// Oldest first. Missing timestamps sort as the epoch; ties keep feed order.
pub fn order_for_dispatch(mut entries: Vec<Entry>) -> Vec<Entry> {
    entries.sort_by_key(|e| e.published_at.unwrap_or_default());
    entries
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 9, 6, 12, 0, 0).unwrap()
    }

    fn entry(link: Option<&str>, hours_ago: Option<i64>) -> Entry {
        Entry {
            id: None,
            title: Some("t".into()),
            link: link.map(str::to_string),
            published_at: hours_ago.map(|h| now() - Duration::hours(h)),
        }
    }

    #[test]
    fn stale_window_boundary() {
        let ids = ProcessedIds::new();
        assert_eq!(
            classify(&entry(Some("l"), Some(200)), &ids, now(), 168),
            Eligibility::Skip(SkipReason::Stale)
        );
        assert_eq!(
            classify(&entry(Some("l"), Some(167)), &ids, now(), 168),
            Eligibility::Admit
        );
        // exactly at the window is not older than it
        assert_eq!(
            classify(&entry(Some("l"), Some(168)), &ids, now(), 168),
            Eligibility::Admit
        );
    }

    #[test]
    fn missing_timestamp_is_never_stale() {
        let ids = ProcessedIds::new();
        assert_eq!(
            classify(&entry(Some("l"), None), &ids, now(), 0),
            Eligibility::Admit
        );
    }

    #[test]
    fn no_link_wins_over_other_reasons() {
        let mut e = entry(None, Some(1000));
        e.id = Some("seen".into());
        let ids: ProcessedIds = ["seen".to_string()].into_iter().collect();
        assert_eq!(
            classify(&e, &ids, now(), 24),
            Eligibility::Skip(SkipReason::NoLink)
        );
    }

    #[test]
    fn ordering_puts_unknown_first_and_is_stable() {
        let mut a = entry(Some("a"), Some(1));
        let b = entry(Some("b"), Some(3));
        let c = entry(Some("c"), None);
        let d = entry(Some("d"), Some(2));
        a.published_at = b.published_at; // tie with b
        let ordered = order_for_dispatch(vec![a, b, c, d]);
        let links: Vec<_> = ordered.iter().map(|e| e.link.as_deref().unwrap()).collect();
        assert_eq!(links, ["c", "a", "b", "d"]);
    }
}
