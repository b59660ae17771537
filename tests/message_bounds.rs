// tests/message_bounds.rs
mod common;

use common::*;
use feed_courier::config::DryRunMode;
use feed_courier::message::{compose_message, MESSAGE_MAX_CHARS, TRUNCATION_MARKER};
use feed_courier::summarize::finish_summary;
use feed_courier::{Collaborators, Entry, Pipeline};
use std::sync::Arc;

#[test]
fn two_hundred_char_summary_is_cut_before_composition() {
    let raw = "要".repeat(200);
    let summary = finish_summary(&raw);
    assert_eq!(summary.chars().count(), 139);
    assert_eq!(summary.chars().last(), Some(TRUNCATION_MARKER));
}

#[test]
fn three_hundred_char_message_is_bounded_with_link_intact() {
    let link = format!("https://news.test/{}", "a".repeat(142)); // 160 chars
    let summary = "s".repeat(135);
    // 4 + 135 + 1 + 160 = 300
    assert_eq!(
        "【新着】".chars().count() + summary.chars().count() + 1 + link.chars().count(),
        300
    );

    let m = compose_message("【新着】", &summary, &link);
    assert!(m.chars().count() <= MESSAGE_MAX_CHARS);
    assert!(m.ends_with(&format!(" {link}")));
}

#[tokio::test]
async fn delivered_message_respects_bounds() {
    let tmp = tempfile::tempdir().unwrap();
    let state = tmp.path().join("data.json");
    let h = Harness::new(FakeFetcher::default(), RecordingDelivery::default());
    let cfg = config(&state, DryRunMode::None);

    let link = format!("https://news.test/{}", "long-slug-".repeat(15));
    let e = Entry {
        link: Some(link.clone()),
        ..entry(1, Some(1))
    };
    let collab = Collaborators {
        summarizer: Arc::new(FakeSummarizer { pad_to: Some(200) }),
        ..h.collaborators(vec![e])
    };
    Pipeline::new(&cfg, collab).run_at(now()).await;

    let sent = h.sent();
    assert_eq!(sent.len(), 1);
    assert!(sent[0].chars().count() <= MESSAGE_MAX_CHARS);
    assert!(sent[0].ends_with(&link));
    assert!(sent[0].contains(TRUNCATION_MARKER));
}
