// src/summarize/openai.rs
//! OpenAI Chat Completions summarizer.

use anyhow::{anyhow, bail, Context, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::{snippet, Summarizer};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1/chat/completions";

pub struct OpenAiSummarizer {
    http: reqwest::Client,
    api_key: String,
    model: String,
    language: String,
    endpoint: String,
}

impl OpenAiSummarizer {
    /// Reads `OPENAI_API_KEY`. A missing key is reported on each call, not here.
    pub fn new(model: &str, language: &str, user_agent: &str) -> Result<Self> {
        let api_key = std::env::var("OPENAI_API_KEY").unwrap_or_default();
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(30))
            .build()
            .context("building openai http client")?;
        Ok(Self {
            http,
            api_key,
            model: model.to_string(),
            language: language.to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
        })
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = key.into();
        self
    }

    /// Point at a compatible endpoint (proxies, tests).
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    fn prompt(&self, title: &str, text: &str) -> String {
        format!(
            "You are an expert at writing summaries for social media.\n\
Summarize the following article in {lang}, in at most 140 characters, as a post for X (formerly Twitter).\n\
Rules:\n\
- Use a polite register.\n\
- At most one emoji.\n\
- Keep it low-key, not promotional; say the key point in one line.\n\
- Keep proper nouns and numbers where possible.\n\
- Do not include any URL (no external sites, no http/https).\n\
Article title: {title}\n\
Article excerpt:\n\
{excerpt}\n",
            lang = self.language,
            excerpt = snippet(text),
        )
    }
}

#[derive(Serialize)]
struct Msg<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Serialize)]
struct Req<'a> {
    model: &'a str,
    messages: Vec<Msg<'a>>,
    temperature: f32,
}

#[derive(Deserialize)]
struct Resp {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMsg,
}

#[derive(Deserialize)]
struct ChoiceMsg {
    content: Option<String>,
}

#[async_trait]
impl Summarizer for OpenAiSummarizer {
    async fn summarize(&self, title: &str, text: &str) -> Result<String> {
        if self.api_key.is_empty() {
            bail!("OPENAI_API_KEY is not set");
        }

        let prompt = self.prompt(title, text);
        let req = Req {
            model: &self.model,
            messages: vec![Msg {
                role: "user",
                content: &prompt,
            }],
            temperature: 0.3,
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&req)
            .send()
            .await
            .context("openai request")?;
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(anyhow!("openai status {status}: {body}"));
        }
        let body: Resp = resp.json().await.context("openai response json")?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .map(|c| c.trim().to_string())
            .unwrap_or_default();
        if content.is_empty() {
            bail!("openai returned an empty summary");
        }
        Ok(content)
    }

    fn name(&self) -> &'static str {
        "openai"
    }
}
