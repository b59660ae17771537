// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};

pub const UNTITLED: &str = "(no title)";

/// One feed item as delivered by a `FeedSource`. Never mutated by the pipeline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Entry {
    pub id: Option<String>,
    pub title: Option<String>,
    /// Entries without a link can never be dispatched.
    pub link: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Entry {
    /// Dedup key: explicit id, else the link.
    pub fn key(&self) -> Option<&str> {
        self.id.as_deref().or(self.link.as_deref())
    }

    pub fn display_title(&self) -> &str {
        self.title.as_deref().unwrap_or(UNTITLED)
    }
}

#[async_trait::async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_entries(&self) -> Result<Vec<Entry>>;
    fn name(&self) -> &str;
}
