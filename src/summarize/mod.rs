// src/summarize/mod.rs
//! Summarizer seam + client-side enforcement of the summary contract.

pub mod openai;

use anyhow::Result;
use async_trait::async_trait;
use once_cell::sync::OnceCell;
use regex::Regex;
use std::sync::Arc;

use crate::message::clamp_summary;

/// Article text sent to the model is cut to this many characters.
pub const SNIPPET_CHARS: usize = 2000;

#[async_trait]
pub trait Summarizer: Send + Sync {
    /// Return a short plain-text summary of the article.
    async fn summarize(&self, title: &str, text: &str) -> Result<String>;
    fn name(&self) -> &'static str;
}

pub type DynSummarizer = Arc<dyn Summarizer>;

/// Strip URLs, collapse whitespace and clamp to the summary budget.
pub fn finish_summary(raw: &str) -> String {
    static RE_URL: OnceCell<Regex> = OnceCell::new();
    static RE_WS: OnceCell<Regex> = OnceCell::new();
    let re_url = RE_URL.get_or_init(|| Regex::new(r"https?://\S+").expect("static regex"));
    let re_ws = RE_WS.get_or_init(|| Regex::new(r"\s+").expect("static regex"));

    let out = re_url.replace_all(raw, "");
    let out = re_ws.replace_all(&out, " ");
    clamp_summary(out.trim())
}

/// First `SNIPPET_CHARS` characters of the article text.
pub fn snippet(text: &str) -> &str {
    match text.char_indices().nth(SNIPPET_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}
