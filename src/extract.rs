// src/extract.rs
//! Article fetch + best-effort main text extraction.

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use once_cell::sync::Lazy;
use scraper::{ElementRef, Html, Node, Selector};
use std::time::Duration;

/// Articles shorter than this (in characters) are not worth summarizing.
pub const MIN_TEXT_CHARS: usize = 100;

/// A candidate container must hold more text than this to be taken as the article body.
const CANDIDATE_MIN_CHARS: usize = 200;

const IGNORED_TAGS: &[&str] = &["script", "style", "noscript"];

#[async_trait]
pub trait ContentFetcher: Send + Sync {
    /// Fetch `url` and return its main text.
    async fn fetch_text(&self, url: &str) -> Result<String>;
}

pub struct HttpContentFetcher {
    client: reqwest::Client,
}

impl HttpContentFetcher {
    pub fn new(user_agent: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(20))
            .build()
            .context("building article http client")?;
        Ok(Self { client })
    }
}

#[async_trait]
impl ContentFetcher for HttpContentFetcher {
    async fn fetch_text(&self, url: &str) -> Result<String> {
        let resp = self
            .client
            .get(url)
            .send()
            .await
            .context("article http get()")?;
        let status = resp.status();
        if !status.is_success() {
            return Err(anyhow!("article http status {status}"));
        }
        let html = resp.text().await.context("article http .text()")?;
        Ok(extract_main_text(&html))
    }
}

static CANDIDATES: Lazy<Vec<Selector>> = Lazy::new(|| {
    [
        r#"div[class*="entry-content"], div[class*="post-content"], div[class*="content__body"]"#,
        "article",
        "main",
    ]
    .iter()
    .filter_map(|s| Selector::parse(s).ok())
    .collect()
});

/// WordPress-flavoured heuristic: known content containers first, whole page as fallback.
pub fn extract_main_text(html: &str) -> String {
    let doc = Html::parse_document(html);

    for sel in CANDIDATES.iter() {
        if let Some(node) = doc.select(sel).next() {
            let text = element_text(node);
            if text.chars().count() > CANDIDATE_MIN_CHARS {
                return text;
            }
        }
    }

    element_text(doc.root_element())
}

/// Text nodes under `el`, each trimmed, blanks dropped, joined by newlines.
fn element_text(el: ElementRef<'_>) -> String {
    let mut parts: Vec<&str> = Vec::new();
    for node in el.descendants() {
        let Node::Text(text) = node.value() else {
            continue;
        };
        let hidden = node.ancestors().any(|a| {
            a.value()
                .as_element()
                .is_some_and(|e| IGNORED_TAGS.contains(&e.name()))
        });
        if hidden {
            continue;
        }
        let t = text.trim();
        if !t.is_empty() {
            parts.push(t);
        }
    }
    parts.join("\n")
}
