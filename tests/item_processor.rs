// tests/item_processor.rs
mod common;

use common::*;
use feed_courier::config::DryRunMode;
use feed_courier::pipeline::processor::{DeliveryStatus, ItemOutcome, ItemProcessor};
use feed_courier::state::{JsonStateStore, ProcessedIds};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

fn processor(h: &Harness, state: &Path, mode: DryRunMode) -> ItemProcessor {
    ItemProcessor::new(
        h.fetcher.clone(),
        Arc::new(FakeSummarizer { pad_to: None }),
        h.delivery.clone(),
        JsonStateStore::new(state),
        mode,
        "【新着】",
        Duration::ZERO,
    )
}

#[tokio::test]
async fn each_mode_reports_its_side_effects() {
    let cases = [
        (DryRunMode::None, DeliveryStatus::Delivered, true),
        (DryRunMode::PrintOnly, DeliveryStatus::NotAttempted, false),
        (DryRunMode::RecordOnly, DeliveryStatus::NotAttempted, true),
    ];
    for (mode, want_delivery, want_recorded) in cases {
        let tmp = tempfile::tempdir().unwrap();
        let state = tmp.path().join("data.json");
        let h = Harness::new(FakeFetcher::default(), RecordingDelivery::default());
        let mut ids = ProcessedIds::new();

        let outcome = processor(&h, &state, mode).process(&entry(1, Some(1)), &mut ids).await;
        let ItemOutcome::Processed(p) = &outcome else {
            panic!("{mode}: expected Processed, got {outcome:?}");
        };
        assert_eq!(p.message, "【新着】Summary of Article 1 https://news.test/1", "{mode}");
        assert_eq!(p.delivery, want_delivery, "{mode}");
        assert_eq!(p.recorded, want_recorded, "{mode}");
        assert_eq!(ids.contains("id-1"), want_recorded, "{mode}");
        assert_eq!(read_state(&state).contains(&"id-1".to_string()), want_recorded, "{mode}");
    }
}

#[tokio::test]
async fn failed_delivery_is_reported_and_recorded() {
    let tmp = tempfile::tempdir().unwrap();
    let state = tmp.path().join("data.json");
    let h = Harness::new(
        FakeFetcher::default(),
        RecordingDelivery {
            fail: true,
            ..Default::default()
        },
    );
    let mut ids = ProcessedIds::new();

    let outcome = processor(&h, &state, DryRunMode::None)
        .process(&entry(2, None), &mut ids)
        .await;
    let ItemOutcome::Processed(p) = &outcome else {
        panic!("expected Processed, got {outcome:?}");
    };
    assert!(matches!(p.delivery, DeliveryStatus::Failed(ref e) if e.contains("500")));
    assert!(p.recorded);
    assert_eq!(read_state(&state), vec!["id-2".to_string()]);
}

#[tokio::test]
async fn fetch_error_is_a_failed_outcome_without_recording() {
    let tmp = tempfile::tempdir().unwrap();
    let state = tmp.path().join("data.json");
    let h = Harness::new(
        FakeFetcher::failing_on(&["https://news.test/3"]),
        RecordingDelivery::default(),
    );
    let mut ids = ProcessedIds::new();

    let outcome = processor(&h, &state, DryRunMode::None)
        .process(&entry(3, Some(2)), &mut ids)
        .await;
    assert!(matches!(outcome, ItemOutcome::Failed(_)));
    assert!(ids.is_empty());
    assert!(h.sent().is_empty());
    assert!(!state.exists());
}
