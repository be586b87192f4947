//! Engine configuration: conflict policies per input channel.

use std::fmt;
use std::path::Path;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};

/// Which value wins when one page writes the same canonical slot twice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ConflictPolicy {
    /// Each write replaces the previous value. Later rows are more authoritative.
    LastWriteWins,
    /// The first value captured stays; later writes are dropped.
    FirstWriteWins,
}

impl ConflictPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConflictPolicy::LastWriteWins => "last-write-wins",
            ConflictPolicy::FirstWriteWins => "first-write-wins",
        }
    }
}

impl fmt::Display for ConflictPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConflictPolicy {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "last-write-wins" | "lww" | "last" => Ok(ConflictPolicy::LastWriteWins),
            "first-write-wins" | "fww" | "first" => Ok(ConflictPolicy::FirstWriteWins),
            other => Err(Error::Config(format!("unknown conflict policy: {other}"))),
        }
    }
}

/// Top-level engine configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Policy for raw entries harvested from data tables.
    pub table_policy: ConflictPolicy,
    /// Policy for regex matches found in auxiliary free-text blocks.
    pub text_policy: ConflictPolicy,
    /// Scan auxiliary text blocks at all.
    pub scan_text_blocks: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            table_policy: ConflictPolicy::LastWriteWins,
            text_policy: ConflictPolicy::FirstWriteWins,
            scan_text_blocks: true,
        }
    }
}

impl EngineConfig {
    /// Defaults overlaid with `CARSPEC_TABLE_POLICY`, `CARSPEC_TEXT_POLICY` and `CARSPEC_SCAN_TEXT`.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load a JSON config file. Missing fields keep their defaults.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        debug!("Loaded engine config from {}: {:?}", path.display(), config);
        Ok(config)
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();

        if let Some(v) = lookup("CARSPEC_TABLE_POLICY") {
            debug!("CARSPEC_TABLE_POLICY={}", v);
            config.table_policy = v.parse()?;
        }
        if let Some(v) = lookup("CARSPEC_TEXT_POLICY") {
            debug!("CARSPEC_TEXT_POLICY={}", v);
            config.text_policy = v.parse()?;
        }
        if let Some(v) = lookup("CARSPEC_SCAN_TEXT") {
            config.scan_text_blocks = match v.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                other => {
                    return Err(Error::Config(format!(
                        "CARSPEC_SCAN_TEXT must be a boolean, got {other}"
                    )))
                }
            };
        }

        Ok(config)
    }
}
