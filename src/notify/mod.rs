pub mod webhook;

use anyhow::Result;
use std::sync::Arc;

/// Result of a delivery call that did not error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Delivery {
    Delivered,
    /// No destination configured; nothing was sent.
    NotConfigured,
}

#[async_trait::async_trait]
pub trait DeliveryChannel: Send + Sync {
    /// Single delivery attempt, no retries. `Err` means the attempt failed.
    async fn deliver(&self, message: &str) -> Result<Delivery>;
}

pub type DynDelivery = Arc<dyn DeliveryChannel>;
