// src/message.rs
//! Length-bounded post composition. All lengths are counted in characters.

pub const TRUNCATION_MARKER: char = '…';

pub const SUMMARY_MAX_CHARS: usize = 140;
const SUMMARY_KEEP_CHARS: usize = 138;

pub const MESSAGE_MAX_CHARS: usize = 270;

fn take_chars(s: &str, n: usize) -> &str {
    match s.char_indices().nth(n) {
        Some((idx, _)) => &s[..idx],
        None => s,
    }
}

/// Summaries over 140 chars become their first 138 chars plus the marker.
pub fn clamp_summary(summary: &str) -> String {
    if summary.chars().count() <= SUMMARY_MAX_CHARS {
        return summary.to_string();
    }
    let mut out = take_chars(summary, SUMMARY_KEEP_CHARS).to_string();
    out.push(TRUNCATION_MARKER);
    out
}

/// `{prefix}{summary} {link}`, at most 270 chars.
///
/// Only the summary is shortened; the link is kept verbatim. If the link and
/// prefix alone leave no room, the summary shrinks to just the marker and the
/// result may still exceed the limit.
pub fn compose_message(prefix: &str, summary: &str, link: &str) -> String {
    let full = format!("{prefix}{summary} {link}");
    if full.chars().count() <= MESSAGE_MAX_CHARS {
        return full;
    }

    // prefix + summary + marker + space + link
    let fixed = prefix.chars().count() + 1 + 1 + link.chars().count();
    let keep = MESSAGE_MAX_CHARS.saturating_sub(fixed);
    let cut = take_chars(summary, keep);
    format!("{prefix}{cut}{TRUNCATION_MARKER} {link}")
}
