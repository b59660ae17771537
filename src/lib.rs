// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod config;
pub mod extract;
pub mod ingest;
pub mod message;
pub mod notify;
pub mod pipeline;
pub mod state;
pub mod summarize;
pub mod telemetry;

// ---- Re-exports for stable public API ----
pub use crate::config::{Config, DryRunMode};
pub use crate::ingest::types::{Entry, FeedSource};
pub use crate::pipeline::{Collaborators, Pipeline, RunReport};
