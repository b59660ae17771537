use anyhow::{Context, Result};
use reqwest::Client;
use std::time::Duration;

use super::{Delivery, DeliveryChannel};

/// Posts `{ "<field>": message }` to a webhook (IFTTT `value1` by default).
pub struct WebhookChannel {
    url: Option<String>,
    field: String,
    client: Client,
    timeout: Duration,
}

impl WebhookChannel {
    pub fn new(url: Option<String>, field: impl Into<String>) -> Self {
        Self {
            url: url.filter(|u| !u.trim().is_empty()),
            field: field.into(),
            client: Client::new(),
            timeout: Duration::from_secs(10),
        }
    }
}

#[async_trait::async_trait]
impl DeliveryChannel for WebhookChannel {
    async fn deliver(&self, message: &str) -> Result<Delivery> {
        let Some(url) = &self.url else {
            tracing::warn!("webhook url not configured, skipping delivery");
            return Ok(Delivery::NotConfigured);
        };

        let mut body = serde_json::Map::new();
        body.insert(self.field.clone(), serde_json::Value::from(message));

        self.client
            .post(url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .context("webhook post")?
            .error_for_status()
            .context("webhook non-2xx")?;
        Ok(Delivery::Delivered)
    }
}
