// src/ingest/mod.rs
pub mod providers;
pub mod types;

use chrono::{DateTime, Utc};
use time::format_description::well_known::{Rfc2822, Rfc3339};
use time::OffsetDateTime;

/// Trim and decode entities; blank strings become `None`.
pub fn clean_field(s: Option<String>) -> Option<String> {
    let s = s?;
    let decoded = html_escape::decode_html_entities(s.trim()).trim().to_string();
    if decoded.is_empty() {
        None
    } else {
        Some(decoded)
    }
}

/// Parse an RFC 2822 (RSS) or RFC 3339 (Atom) timestamp into UTC.
pub fn parse_feed_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    if ts.is_empty() {
        return None;
    }
    let parsed = OffsetDateTime::parse(ts, &Rfc2822)
        .or_else(|_| OffsetDateTime::parse(ts, &Rfc3339))
        .ok()
        .and_then(|dt| DateTime::<Utc>::from_timestamp(dt.unix_timestamp(), dt.nanosecond()));
    // chrono is more forgiving with obsolete zone names ("EST", "GMT").
    parsed.or_else(|| {
        DateTime::parse_from_rfc2822(ts)
            .ok()
            .map(|dt| dt.with_timezone(&Utc))
    })
}

/// Replace HTML-only entities that make an otherwise valid feed unparseable as XML.
pub fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&hellip;", "...")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
}
