// tests/common/mod.rs
// Deterministic fakes for the pipeline's external collaborators.
#![allow(dead_code)]

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use feed_courier::config::{Config, DryRunMode};
use feed_courier::extract::ContentFetcher;
use feed_courier::notify::{Delivery, DeliveryChannel};
use feed_courier::summarize::Summarizer;
use feed_courier::{Collaborators, Entry, FeedSource};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;

pub fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 9, 6, 12, 0, 0).unwrap()
}

pub fn entry(n: usize, hours_ago: Option<i64>) -> Entry {
    Entry {
        id: Some(format!("id-{n}")),
        title: Some(format!("Article {n}")),
        link: Some(format!("https://news.test/{n}")),
        published_at: hours_ago.map(|h| now() - Duration::hours(h)),
    }
}

pub struct StaticFeed(pub Vec<Entry>);

#[async_trait]
impl FeedSource for StaticFeed {
    async fn fetch_entries(&self) -> Result<Vec<Entry>> {
        Ok(self.0.clone())
    }
    fn name(&self) -> &str {
        "static"
    }
}

pub struct BrokenFeed;

#[async_trait]
impl FeedSource for BrokenFeed {
    async fn fetch_entries(&self) -> Result<Vec<Entry>> {
        Err(anyhow!("connection refused"))
    }
    fn name(&self) -> &str {
        "broken"
    }
}

/// Returns long text for every link except the ones listed as failing or short.
#[derive(Default)]
pub struct FakeFetcher {
    pub failing: HashSet<String>,
    pub short: HashSet<String>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeFetcher {
    pub fn failing_on(links: &[&str]) -> Self {
        Self {
            failing: links.iter().map(|s| s.to_string()).collect(),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ContentFetcher for FakeFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        self.calls.lock().push(url.to_string());
        if self.failing.contains(url) {
            return Err(anyhow!("HTTP 503 for {url}"));
        }
        if self.short.contains(url) {
            return Ok("too short".to_string());
        }
        Ok(format!("Body of {url}. {}", "Lorem ipsum dolor sit amet. ".repeat(10)))
    }
}

/// Echoes the title, optionally padded to a fixed length.
pub struct FakeSummarizer {
    pub pad_to: Option<usize>,
}

#[async_trait]
impl Summarizer for FakeSummarizer {
    async fn summarize(&self, title: &str, _text: &str) -> Result<String> {
        let mut s = format!("Summary of {title}");
        if let Some(n) = self.pad_to {
            while s.chars().count() < n {
                s.push('x');
            }
        }
        Ok(s)
    }
    fn name(&self) -> &'static str {
        "fake"
    }
}

/// Records every message; can be told to fail or to report "not configured".
#[derive(Default)]
pub struct RecordingDelivery {
    pub fail: bool,
    pub unconfigured: bool,
    pub sent: Mutex<Vec<String>>,
}

#[async_trait]
impl DeliveryChannel for RecordingDelivery {
    async fn deliver(&self, message: &str) -> Result<Delivery> {
        if self.unconfigured {
            return Ok(Delivery::NotConfigured);
        }
        self.sent.lock().push(message.to_string());
        if self.fail {
            Err(anyhow!("webhook non-2xx: 500"))
        } else {
            Ok(Delivery::Delivered)
        }
    }
}

pub fn config(state_path: &Path, mode: DryRunMode) -> Config {
    Config {
        state_path: state_path.to_path_buf(),
        dry_run: mode,
        max_fetch: 10,
        max_age_hours: 168,
        dispatch_delay_secs: 0,
        ..Config::default()
    }
}

pub struct Harness {
    pub fetcher: Arc<FakeFetcher>,
    pub delivery: Arc<RecordingDelivery>,
}

impl Harness {
    pub fn new(fetcher: FakeFetcher, delivery: RecordingDelivery) -> Self {
        Self {
            fetcher: Arc::new(fetcher),
            delivery: Arc::new(delivery),
        }
    }

    pub fn collaborators(&self, feed: Vec<Entry>) -> Collaborators {
        Collaborators {
            feed: Arc::new(StaticFeed(feed)),
            fetcher: self.fetcher.clone(),
            summarizer: Arc::new(FakeSummarizer { pad_to: None }),
            delivery: self.delivery.clone(),
        }
    }

    pub fn sent(&self) -> Vec<String> {
        self.delivery.sent.lock().clone()
    }
}

pub fn read_state(path: &Path) -> Vec<String> {
    match std::fs::read_to_string(path) {
        Ok(s) => serde_json::from_str(&s).unwrap(),
        Err(_) => Vec::new(),
    }
}
