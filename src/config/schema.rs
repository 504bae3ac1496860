//! Configuration schema for volby
//!
//! Configuration is stored at `~/.config/volby/config.toml`

use crate::extract::FeedFormat;
use crate::source::USER_AGENT;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// General settings
    pub general: GeneralConfig,

    /// Upstream feed settings
    pub source: SourceConfig,

    /// Which election to show
    pub election: ElectionConfig,

    /// Disk cache settings
    pub cache: CacheConfig,
}

/// General application settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Log format: "text" or "json"
    pub log_format: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_format: "text".to_string(),
        }
    }
}

/// Upstream feed settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Base URL template, `{year}` is replaced with the election year
    pub base_url: String,

    /// Payload generation served by the upstream
    pub format: FeedFormat,

    /// Feed language code ("EN" or "CZ")
    pub lang: String,

    /// Whole-request deadline in seconds
    pub timeout_secs: u64,

    /// User-Agent header sent upstream
    pub user_agent: String,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            base_url: "https://www.volby.cz/pls/ps{year}/".to_string(),
            format: FeedFormat::Html,
            lang: "EN".to_string(),
            timeout_secs: 15,
            user_agent: USER_AGENT.to_string(),
        }
    }
}

impl SourceConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Election selection
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ElectionConfig {
    /// Year to show
    pub year: i32,

    /// Year to show instead while `year` is not published
    pub fallback_year: Option<i32>,
}

impl Default for ElectionConfig {
    fn default() -> Self {
        Self {
            year: 2025,
            fallback_year: Some(2021),
        }
    }
}

/// Disk cache settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Cache directory (default: platform cache dir)
    pub dir: Option<PathBuf>,

    /// Revalidate after this many seconds while counting is in progress
    pub partial_interval_secs: u64,

    /// Revalidate after this many seconds once every ward has reported
    pub final_interval_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dir: None,
            partial_interval_secs: 60,
            final_interval_secs: 3600,
        }
    }
}
