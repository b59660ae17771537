// src/config/mod.rs
//! Run configuration: optional TOML file, then environment overrides.

pub mod dry_run;

pub use dry_run::DryRunMode;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_CONFIG_PATH: &str = "FEED_COURIER_CONFIG";
const DEFAULT_CONFIG_PATH: &str = "config/feed-courier.toml";

pub const DEFAULT_USER_AGENT: &str = "feed-courier/0.1 (+https://github.com/feed-courier)";

fn default_feed_url() -> String {
    "https://loca-play.jp/essentials/feed/".to_string()
}
fn default_max_fetch() -> usize {
    3
}
fn default_max_age_hours() -> u64 {
    24
}
fn default_state_path() -> PathBuf {
    PathBuf::from("data.json")
}
fn default_webhook_field() -> String {
    "value1".to_string()
}
fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}
fn default_model() -> String {
    "gpt-3.5-turbo".to_string()
}
fn default_language() -> String {
    "Japanese".to_string()
}
fn default_dispatch_delay_secs() -> u64 {
    3
}
fn default_prefix() -> String {
    "【新着】".to_string()
}

/// Process-wide settings, built once at startup and passed to every component.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feed_url: String,
    /// Only the first `max_fetch` feed entries are considered per run.
    pub max_fetch: usize,
    pub max_age_hours: u64,
    #[serde(deserialize_with = "dry_run::deserialize_lenient")]
    pub dry_run: DryRunMode,
    pub state_path: PathBuf,
    pub webhook_url: Option<String>,
    pub webhook_field: String,
    pub user_agent: String,
    pub openai_model: String,
    pub summary_language: String,
    pub dispatch_delay_secs: u64,
    pub message_prefix: String,
    pub metrics_textfile: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            feed_url: default_feed_url(),
            max_fetch: default_max_fetch(),
            max_age_hours: default_max_age_hours(),
            dry_run: DryRunMode::None,
            state_path: default_state_path(),
            webhook_url: None,
            webhook_field: default_webhook_field(),
            user_agent: default_user_agent(),
            openai_model: default_model(),
            summary_language: default_language(),
            dispatch_delay_secs: default_dispatch_delay_secs(),
            message_prefix: default_prefix(),
            metrics_textfile: None,
        }
    }
}

impl Config {
    /// Load using file + env:
    /// 1) $FEED_COURIER_CONFIG (must exist)
    /// 2) config/feed-courier.toml (if present)
    /// 3) built-in defaults
    ///
    /// Environment variables override whatever the file set.
    pub fn load() -> Result<Self> {
        let base = if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            Self::from_file(&pb)?
        } else {
            let p = PathBuf::from(DEFAULT_CONFIG_PATH);
            if p.exists() {
                Self::from_file(&p)?
            } else {
                Self::default()
            }
        };
        Ok(base.with_env_overrides())
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    pub fn from_toml_str(s: &str) -> Result<Self> {
        let cfg: Config = toml::from_str(s)?;
        Ok(cfg)
    }

    /// Apply environment overrides on top of `self`.
    pub fn with_env_overrides(mut self) -> Self {
        if let Some(v) = env_string("FEED_URL") {
            self.feed_url = v;
        }
        if let Some(v) = env_parsed("MAX_FETCH") {
            self.max_fetch = v;
        }
        if let Some(v) = env_parsed("MAX_AGE_HOURS") {
            self.max_age_hours = v;
        }
        if let Some(v) = env_string("DRY_RUN") {
            self.dry_run = DryRunMode::parse_or_default(&v);
        }
        if let Some(v) = env_string("STATE_PATH") {
            self.state_path = PathBuf::from(v);
        }
        if let Some(v) = env_string("WEBHOOK_URL").or_else(|| env_string("IFTTT_WEBHOOK_URL")) {
            self.webhook_url = Some(v);
        }
        if let Some(v) = env_string("WEBHOOK_FIELD") {
            self.webhook_field = v;
        }
        if let Some(v) = env_string("USER_AGENT") {
            self.user_agent = v;
        }
        if let Some(v) = env_string("OPENAI_MODEL") {
            self.openai_model = v;
        }
        if let Some(v) = env_string("SUMMARY_LANGUAGE") {
            self.summary_language = v;
        }
        if let Some(v) = env_parsed("DISPATCH_DELAY_SECS") {
            self.dispatch_delay_secs = v;
        }
        if let Some(v) = env_string("MESSAGE_PREFIX") {
            self.message_prefix = v;
        }
        if let Some(v) = env_string("METRICS_TEXTFILE") {
            self.metrics_textfile = Some(PathBuf::from(v));
        }
        // Blank webhook in the file counts as unset.
        if self.webhook_url.as_deref().is_some_and(|u| u.trim().is_empty()) {
            self.webhook_url = None;
        }
        self
    }

    pub fn dispatch_delay(&self) -> Duration {
        Duration::from_secs(self.dispatch_delay_secs)
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn env_parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = env_string(key)?;
    match raw.parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!(key, value = %raw, "ignoring unparseable config override");
            None
        }
    }
}
