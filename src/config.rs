use serde::Deserialize;
use std::path::Path;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// URL of the appcast feed to display
    pub feed_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// How overlapping fetch cycles are resolved
    #[serde(default)]
    pub overlap: OverlapPolicy,
}

pub(crate) fn default_timeout_secs() -> u64 {
    30
}

pub(crate) fn default_user_agent() -> String {
    "AppcastNotes/0.1 (release notes viewer)".to_string()
}

/// Policy for fetch cycles that overlap in time.
#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum OverlapPolicy {
    /// The most recently started cycle wins; stale results are dropped.
    #[default]
    LatestWins,
    /// Cycles run one at a time and present in call order.
    Serialize,
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Parse config from a TOML string (useful for testing)
    pub fn from_str(content: &str) -> anyhow::Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }
}
