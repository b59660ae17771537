// src/config/dry_run.rs
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Which side effects a run is allowed to perform.
///
/// | mode          | delivery | id recorded |
/// |---------------|----------|-------------|
/// | `none`        | yes      | yes         |
/// | `print-only`  | no       | no          |
/// | `record-only` | no       | yes         |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DryRunMode {
    #[default]
    None,
    PrintOnly,
    RecordOnly,
}

impl DryRunMode {
    /// Parse a mode selector. Case-insensitive, `_` is accepted for `-`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "none" | "" => Some(Self::None),
            "print-only" => Some(Self::PrintOnly),
            "record-only" => Some(Self::RecordOnly),
            _ => None,
        }
    }

    /// Lenient variant used for env/config input: unknown values fall back to `none`.
    pub fn parse_or_default(s: &str) -> Self {
        Self::parse(s).unwrap_or_else(|| {
            tracing::warn!(value = s, "unrecognized DRY_RUN value, using `none`");
            Self::None
        })
    }

    pub fn delivers(self) -> bool {
        matches!(self, Self::None)
    }

    pub fn records(self) -> bool {
        matches!(self, Self::None | Self::RecordOnly)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::None => "none",
            Self::PrintOnly => "print-only",
            Self::RecordOnly => "record-only",
        }
    }
}

/// Config-file form of the selector; same leniency as the env override.
pub fn deserialize_lenient<'de, D: Deserializer<'de>>(d: D) -> Result<DryRunMode, D::Error> {
    let raw = String::deserialize(d)?;
    Ok(DryRunMode::parse_or_default(&raw))
}

impl fmt::Display for DryRunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
