use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Application configuration loaded from `config.yaml`.
///
/// Every field has a default, so an empty file (or no file) is valid.
///
/// Example YAML:
/// ```yaml
/// weights_path: /var/lib/plugin-score/weights.json
/// log_level: info
/// cache:
///   enabled: true
///   ttl: 6h
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Where the weight store lives (default: ~/.config/plugin-score/weights.json)
    #[serde(default)]
    pub weights_path: Option<PathBuf>,

    /// tracing filter directive used when RUST_LOG is unset (default: "warn")
    #[serde(default)]
    pub log_level: Option<String>,

    #[serde(default)]
    pub cache: CacheSettings,
}

/// Score cache settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CacheSettings {
    #[serde(default = "default_cache_enabled")]
    pub enabled: bool,

    /// How long a cached score stays valid, e.g. "12h", "30m"
    #[serde(default = "default_cache_ttl")]
    pub ttl: String,

    /// Cache directory (default: platform cache dir)
    #[serde(default)]
    pub path: Option<PathBuf>,
}

fn default_cache_enabled() -> bool {
    true
}

fn default_cache_ttl() -> String {
    "12h".to_string()
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            enabled: default_cache_enabled(),
            ttl: default_cache_ttl(),
            path: None,
        }
    }
}
