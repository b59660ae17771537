// src/pipeline/mod.rs
//! One run: fetch feed → filter → order → process each → report.

pub mod eligibility;
pub mod processor;

use anyhow::Result;
use chrono::{DateTime, Utc};
use metrics::{describe_counter, describe_histogram};
use once_cell::sync::OnceCell;
use std::fmt;
use std::sync::Arc;

use crate::config::{Config, DryRunMode};
use crate::extract::{ContentFetcher, HttpContentFetcher};
use crate::ingest::providers::rss::RssFeedSource;
use crate::ingest::types::FeedSource;
use crate::notify::webhook::WebhookChannel;
use crate::notify::DynDelivery;
use crate::state::JsonStateStore;
use crate::summarize::openai::OpenAiSummarizer;
use crate::summarize::DynSummarizer;

use eligibility::{filter_entries, order_for_dispatch, SkipCounts};
use processor::{DeliveryStatus, ItemOutcome, ItemProcessor, ItemSkip};

/// One-time metrics registration (so series carry descriptions when exported).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("feed_entries_total", "Entries parsed from the feed.");
        describe_counter!("feed_skipped_total", "Entries rejected by eligibility, by reason.");
        describe_counter!(
            "items_processed_total",
            "Items that reached the dispatch/record step."
        );
        describe_counter!("items_failed_total", "Items whose processing failed.");
        describe_counter!("deliveries_total", "Webhook delivery attempts, by outcome.");
        describe_counter!("state_save_errors_total", "Failed writes of the state file.");
        describe_histogram!("feed_parse_ms", "Feed parse time in milliseconds.");
    });
}

/// External capabilities, constructed once per process.
pub struct Collaborators {
    pub feed: Arc<dyn FeedSource>,
    pub fetcher: Arc<dyn ContentFetcher>,
    pub summarizer: DynSummarizer,
    pub delivery: DynDelivery,
}

impl Collaborators {
    /// Production wiring: HTTP feed, HTTP article fetch, OpenAI, webhook.
    pub fn from_config(cfg: &Config) -> Result<Self> {
        let feed = RssFeedSource::from_url(cfg.feed_url.clone(), &cfg.user_agent)?;
        let fetcher = HttpContentFetcher::new(&cfg.user_agent)?;
        let summarizer =
            OpenAiSummarizer::new(&cfg.openai_model, &cfg.summary_language, &cfg.user_agent)?;
        let delivery = WebhookChannel::new(cfg.webhook_url.clone(), cfg.webhook_field.clone());
        Ok(Self {
            feed: Arc::new(feed),
            fetcher: Arc::new(fetcher),
            summarizer: Arc::new(summarizer),
            delivery: Arc::new(delivery),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub mode: DryRunMode,
    pub max_age_hours: u64,
    /// Entries returned by the feed.
    pub fetched: usize,
    /// Entries looked at after the `max_fetch` cut.
    pub considered: usize,
    pub admitted: usize,
    pub skipped: SkipCounts,
    /// Items that reached the dispatch/record step.
    pub processed: usize,
    pub too_short: usize,
    pub failed: usize,
    pub delivered: usize,
}

impl RunReport {
    fn empty(mode: DryRunMode, max_age_hours: u64) -> Self {
        Self {
            mode,
            max_age_hours,
            fetched: 0,
            considered: 0,
            admitted: 0,
            skipped: SkipCounts::default(),
            processed: 0,
            too_short: 0,
            failed: 0,
            delivered: 0,
        }
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "processed={} mode={} max_age_hours={} (fetched={} considered={} admitted={} \
             no_link={} already_processed={} stale={} too_short={} failed={} delivered={})",
            self.processed,
            self.mode,
            self.max_age_hours,
            self.fetched,
            self.considered,
            self.admitted,
            self.skipped.no_link,
            self.skipped.already_processed,
            self.skipped.stale,
            self.too_short,
            self.failed,
            self.delivered,
        )
    }
}

pub struct Pipeline {
    feed: Arc<dyn FeedSource>,
    processor: ItemProcessor,
    store: JsonStateStore,
    max_fetch: usize,
    max_age_hours: u64,
}

impl Pipeline {
    pub fn new(cfg: &Config, collab: Collaborators) -> Self {
        let store = JsonStateStore::new(cfg.state_path.clone());
        let processor = ItemProcessor::new(
            collab.fetcher,
            collab.summarizer,
            collab.delivery,
            store.clone(),
            cfg.dry_run,
            cfg.message_prefix.clone(),
            cfg.dispatch_delay(),
        );
        Self {
            feed: collab.feed,
            processor,
            store,
            max_fetch: cfg.max_fetch,
            max_age_hours: cfg.max_age_hours,
        }
    }

    pub fn from_config(cfg: &Config) -> Result<Self> {
        Ok(Self::new(cfg, Collaborators::from_config(cfg)?))
    }

    pub async fn run(&self) -> RunReport {
        self.run_at(Utc::now()).await
    }

    /// Run once with an explicit clock. Always returns a report.
    pub async fn run_at(&self, now: DateTime<Utc>) -> RunReport {
        ensure_metrics_described();
        let mode = self.processor.mode();
        let mut report = RunReport::empty(mode, self.max_age_hours);

        tracing::info!(feed = self.feed.name(), %mode, "fetching feed");
        let entries = match self.feed.fetch_entries().await {
            Ok(v) => v,
            Err(e) => {
                tracing::warn!(feed = self.feed.name(), error = %format!("{e:#}"), "feed fetch failed");
                Vec::new()
            }
        };
        report.fetched = entries.len();
        if entries.is_empty() {
            tracing::info!("feed has no entries");
            return report;
        }

        let considered = &entries[..entries.len().min(self.max_fetch)];
        report.considered = considered.len();

        let mut ids = self.store.load().await;
        let (admitted, skipped) = filter_entries(considered, &ids, now, self.max_age_hours);
        report.skipped = skipped;
        report.admitted = admitted.len();
        if admitted.is_empty() {
            tracing::info!("no eligible entries");
            return report;
        }

        for (idx, entry) in order_for_dispatch(admitted).iter().enumerate() {
            tracing::info!(n = idx + 1, title = entry.display_title(), "processing");
            match self.processor.process(entry, &mut ids).await {
                ItemOutcome::Processed(p) => {
                    report.processed += 1;
                    if p.delivery == DeliveryStatus::Delivered {
                        report.delivered += 1;
                    }
                }
                ItemOutcome::Skipped(ItemSkip::TooShort { .. }) => report.too_short += 1,
                ItemOutcome::Skipped(ItemSkip::AlreadyProcessed) => {
                    report.skipped.already_processed += 1
                }
                ItemOutcome::Failed(_) => report.failed += 1,
            }
        }

        tracing::info!(
            processed = report.processed,
            failed = report.failed,
            mode = %mode,
            max_age_hours = self.max_age_hours,
            "run finished"
        );
        report
    }
}
