mod schema;

pub use schema::{CacheSettings, Config};

use anyhow::{Context, Result};
use std::fs;
use std::path::PathBuf;
use std::time::Duration;

/// Get the config directory path (~/.config/plugin-score/)
pub fn get_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("plugin-score")
}

/// Get the default config file path (~/.config/plugin-score/config.yaml)
pub fn get_config_path() -> PathBuf {
    get_config_dir().join("config.yaml")
}

/// Get the default weight store path (~/.config/plugin-score/weights.json)
pub fn get_weights_path() -> PathBuf {
    get_config_dir().join("weights.json")
}

/// Load configuration from a YAML file
///
/// # Arguments
///
/// * `path` - Optional path to config file. If None, uses default path (~/.config/plugin-score/config.yaml)
///
/// A missing file yields the default configuration.
///
/// # Errors
///
/// Returns an error if the config file exists but cannot be read or parsed.
pub fn load_config(path: Option<PathBuf>) -> Result<Config> {
    let config_path = path.unwrap_or_else(get_config_path);

    if !config_path.exists() {
        return Ok(Config::default());
    }

    let config_content = fs::read_to_string(&config_path)
        .with_context(|| format!("Failed to read config file at {}", config_path.display()))?;

    let config: Config = serde_saphyr::from_str(&config_content)
        .with_context(|| format!("Failed to parse config: invalid YAML in {}", config_path.display()))?;

    Ok(config)
}

impl Config {
    pub fn weights_path(&self) -> PathBuf {
        self.weights_path.clone().unwrap_or_else(get_weights_path)
    }
}

impl CacheSettings {
    pub fn ttl(&self) -> Result<Duration> {
        humantime::parse_duration(self.ttl.trim())
            .with_context(|| format!("invalid cache ttl '{}'", self.ttl))
    }
}

/// Validate configuration at startup.
/// Returns all validation errors at once (not just the first).
pub fn validate_config(config: &Config) -> Result<(), Vec<String>> {
    let mut errors = Vec::new();

    if let Err(e) = config.cache.ttl() {
        errors.push(format!("cache.ttl: {:#}", e));
    }

    if let Some(ref level) = config.log_level {
        if level.trim().is_empty() {
            errors.push("log_level: must not be empty".to_string());
        } else if let Err(e) = tracing_subscriber::EnvFilter::try_new(level) {
            errors.push(format!("log_level: invalid filter '{}': {}", level, e));
        }
    }

    if let Some(ref path) = config.weights_path {
        if path.as_os_str().is_empty() {
            errors.push("weights_path: must not be empty".to_string());
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;

    #[test]
    fn test_missing_config_file_gives_defaults() {
        let path = env::temp_dir().join("plugin_score_test_no_config.yaml");
        let _ = fs::remove_file(&path);
        let config = load_config(Some(path)).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let path = env::temp_dir().join("plugin_score_test_bad_config.yaml");
        fs::write(&path, "cache: [unclosed").unwrap();
        let err = load_config(Some(path.clone())).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config"));
        let _ = fs::remove_file(&path);
    }

    #[test]
    fn test_default_weights_path() {
        let config = Config::default();
        assert!(config.weights_path().ends_with("plugin-score/weights.json"));
    }

    #[test]
    fn test_cache_ttl_parses() {
        let settings = CacheSettings {
            ttl: "2h 30m".to_string(),
            ..Default::default()
        };
        assert_eq!(settings.ttl().unwrap(), Duration::from_secs(9000));
    }

    #[test]
    fn test_valid_default_config() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_rejects_invalid_log_filter() {
        let config = Config {
            log_level: Some("plugin_score=notalevel".to_string()),
            ..Default::default()
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].starts_with("log_level: invalid filter 'plugin_score=notalevel'"));

        let config = Config {
            log_level: Some("warn,plugin_score=debug".to_string()),
            ..Default::default()
        };
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let config = Config {
            weights_path: Some(PathBuf::new()),
            log_level: Some(" ".to_string()),
            cache: CacheSettings {
                ttl: "soon".to_string(),
                ..Default::default()
            },
        };
        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("cache.ttl"));
    }
}
