// src/state.rs
//! Persisted set of already dispatched entry ids (cross-run dedup).
//!
//! The file is a pretty-printed JSON array of at most [`MAX_PERSISTED_IDS`]
//! strings in lexicographic order. When the set is larger, only the
//! lexicographically smallest ids are written; which ids survive has nothing
//! to do with recency.

use anyhow::{Context, Result};
use metrics::counter;
use std::collections::BTreeSet;
use std::path::PathBuf;
use tokio::fs;

pub const MAX_PERSISTED_IDS: usize = 200;

pub type ProcessedIds = BTreeSet<String>;

#[derive(Debug, Clone)]
pub struct JsonStateStore {
    path: PathBuf,
}

impl JsonStateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Never fails: a missing or unreadable file means "nothing processed yet".
    pub async fn load(&self) -> ProcessedIds {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(s) => s,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return ProcessedIds::new(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "state read failed, starting empty");
                return ProcessedIds::new();
            }
        };
        match serde_json::from_str::<Vec<String>>(&raw) {
            Ok(ids) => ids.into_iter().collect(),
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "state file corrupt, starting empty");
                ProcessedIds::new()
            }
        }
    }

    /// Best-effort save; failures are logged and swallowed.
    pub async fn save(&self, ids: &ProcessedIds) {
        if let Err(e) = self.try_save(ids).await {
            counter!("state_save_errors_total").increment(1);
            tracing::warn!(path = %self.path.display(), error = %format!("{e:#}"), "saving processed ids failed");
        }
    }

    async fn try_save(&self, ids: &ProcessedIds) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("creating {}", parent.display()))?;
        }
        let json = serialize_ids(ids)?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, json)
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e).with_context(|| format!("renaming into {}", self.path.display()));
        }
        Ok(())
    }
}

/// Sorted, capped, 2-space indented JSON array.
pub fn serialize_ids(ids: &ProcessedIds) -> Result<String> {
    let kept: Vec<&str> = ids.iter().take(MAX_PERSISTED_IDS).map(String::as_str).collect();
    serde_json::to_string_pretty(&kept).context("serializing processed ids")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_is_sorted_and_capped() {
        let ids: ProcessedIds = (0..250).map(|i| format!("id-{i:03}")).collect();
        let json = serialize_ids(&ids).unwrap();
        let back: Vec<String> = serde_json::from_str(&json).unwrap();
        assert_eq!(back.len(), MAX_PERSISTED_IDS);
        assert_eq!(back.first().map(String::as_str), Some("id-000"));
        assert_eq!(back.last().map(String::as_str), Some("id-199"));
        assert!(json.contains("\n  \"id-000\""));
    }

    #[test]
    fn non_ascii_ids_are_not_escaped() {
        let ids: ProcessedIds = ["記事-1".to_string()].into_iter().collect();
        assert!(serialize_ids(&ids).unwrap().contains("記事-1"));
    }
}
