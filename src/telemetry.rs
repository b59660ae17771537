//! Prometheus textfile export (for node_exporter's textfile collector).

use anyhow::{Context, Result};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};
use std::path::PathBuf;

pub struct TextfileMetrics {
    handle: PrometheusHandle,
    path: PathBuf,
}

impl TextfileMetrics {
    /// Install the global Prometheus recorder. Call once, before the run.
    pub fn install(path: PathBuf) -> Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;
        Ok(Self { handle, path })
    }

    pub fn render(&self) -> String {
        self.handle.render()
    }

    /// Write the exposition atomically (temp file + rename).
    pub async fn write(&self) -> Result<()> {
        let tmp = self.path.with_extension("prom.tmp");
        tokio::fs::write(&tmp, self.render())
            .await
            .with_context(|| format!("writing {}", tmp.display()))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .with_context(|| format!("renaming into {}", self.path.display()))?;
        Ok(())
    }
}
