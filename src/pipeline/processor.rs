// src/pipeline/processor.rs
//! Turns one admitted entry into a post and applies the dry-run side-effect table.

use anyhow::{bail, Context, Result};
use metrics::counter;
use std::sync::Arc;
use std::time::Duration;

use crate::config::DryRunMode;
use crate::extract::{ContentFetcher, MIN_TEXT_CHARS};
use crate::ingest::types::Entry;
use crate::message::compose_message;
use crate::notify::{Delivery, DynDelivery};
use crate::state::{JsonStateStore, ProcessedIds};
use crate::summarize::{finish_summary, DynSummarizer};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// Mode does not deliver.
    NotAttempted,
    Delivered,
    NotConfigured,
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct Processed {
    pub message: String,
    pub delivery: DeliveryStatus,
    pub recorded: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItemSkip {
    /// Extracted text under the minimum length.
    TooShort { chars: usize },
    /// Same id already recorded earlier in this run.
    AlreadyProcessed,
}

#[derive(Debug)]
pub enum ItemOutcome {
    Processed(Processed),
    Skipped(ItemSkip),
    Failed(anyhow::Error),
}

pub struct ItemProcessor {
    fetcher: Arc<dyn ContentFetcher>,
    summarizer: DynSummarizer,
    delivery: DynDelivery,
    store: JsonStateStore,
    mode: DryRunMode,
    prefix: String,
    dispatch_delay: Duration,
}

impl ItemProcessor {
    pub fn new(
        fetcher: Arc<dyn ContentFetcher>,
        summarizer: DynSummarizer,
        delivery: DynDelivery,
        store: JsonStateStore,
        mode: DryRunMode,
        prefix: impl Into<String>,
        dispatch_delay: Duration,
    ) -> Self {
        Self {
            fetcher,
            summarizer,
            delivery,
            store,
            mode,
            prefix: prefix.into(),
            dispatch_delay,
        }
    }

    pub fn mode(&self) -> DryRunMode {
        self.mode
    }

    /// Never panics or propagates: every error ends up in `ItemOutcome::Failed`.
    pub async fn process(&self, entry: &Entry, ids: &mut ProcessedIds) -> ItemOutcome {
        match self.try_process(entry, ids).await {
            Ok(outcome) => outcome,
            Err(e) => {
                counter!("items_failed_total").increment(1);
                tracing::warn!(title = entry.display_title(), error = %format!("{e:#}"), "item failed");
                ItemOutcome::Failed(e)
            }
        }
    }

    async fn try_process(&self, entry: &Entry, ids: &mut ProcessedIds) -> Result<ItemOutcome> {
        let Some(link) = entry.link.as_deref() else {
            bail!("entry has no link");
        };
        let key = entry.key().unwrap_or(link).to_string();
        if ids.contains(&key) {
            return Ok(ItemOutcome::Skipped(ItemSkip::AlreadyProcessed));
        }

        let text = self
            .fetcher
            .fetch_text(link)
            .await
            .with_context(|| format!("fetching {link}"))?;
        let chars = text.chars().count();
        if chars < MIN_TEXT_CHARS {
            tracing::info!(title = entry.display_title(), chars, "article text too short, skipping");
            return Ok(ItemOutcome::Skipped(ItemSkip::TooShort { chars }));
        }

        let raw = self
            .summarizer
            .summarize(entry.display_title(), &text)
            .await
            .with_context(|| format!("summarizing via {}", self.summarizer.name()))?;
        let summary = finish_summary(&raw);
        if summary.is_empty() {
            bail!("summary is empty after cleanup");
        }
        let message = compose_message(&self.prefix, &summary, link);

        println!("{message}");
        tracing::info!(title = entry.display_title(), mode = %self.mode, chars = message.chars().count(), "post composed");

        let delivery = if self.mode.delivers() {
            self.deliver(&message).await
        } else {
            DeliveryStatus::NotAttempted
        };

        let recorded = self.mode.records();
        if recorded {
            // Recorded even when delivery failed: a failed post is not retried.
            ids.insert(key.clone());
            self.store.save(ids).await;
            tracing::info!(id = %key, "recorded as processed");
        }

        if delivery == DeliveryStatus::Delivered && !self.dispatch_delay.is_zero() {
            tokio::time::sleep(self.dispatch_delay).await;
        }

        counter!("items_processed_total").increment(1);
        Ok(ItemOutcome::Processed(Processed {
            message,
            delivery,
            recorded,
        }))
    }

    async fn deliver(&self, message: &str) -> DeliveryStatus {
        match self.delivery.deliver(message).await {
            Ok(Delivery::Delivered) => {
                counter!("deliveries_total", "outcome" => "delivered").increment(1);
                tracing::info!("delivered");
                DeliveryStatus::Delivered
            }
            Ok(Delivery::NotConfigured) => {
                counter!("deliveries_total", "outcome" => "not_configured").increment(1);
                DeliveryStatus::NotConfigured
            }
            Err(e) => {
                counter!("deliveries_total", "outcome" => "failed").increment(1);
                let msg = format!("{e:#}");
                tracing::warn!(error = %msg, "delivery failed");
                DeliveryStatus::Failed(msg)
            }
        }
    }
}
