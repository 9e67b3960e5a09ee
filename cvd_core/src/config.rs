//! Configuration file support for cvdrisk.
//!
//! Configuration is loaded from `$XDG_CONFIG_HOME/cvdrisk/config.toml`.

use crate::{Error, Region, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application configuration
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub coefficients: CoefficientsConfig,

    #[serde(default)]
    pub score2: Score2Config,

    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Where the optional SCORE2 coefficient file lives
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CoefficientsConfig {
    #[serde(default = "default_coefficients_path")]
    pub path: PathBuf,
}

impl Default for CoefficientsConfig {
    fn default() -> Self {
        Self {
            path: default_coefficients_path(),
        }
    }
}

/// SCORE2 defaults
#[derive(Clone, Debug, Serialize, Deserialize, Default)]
pub struct Score2Config {
    /// Region used when a profile carries no region key
    #[serde(default)]
    pub default_region: Region,
}

/// Logging defaults (RUST_LOG still wins)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

// Default value functions
fn default_coefficients_path() -> PathBuf {
    let base = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    base.join("cvdrisk").join("coefficients.json")
}

fn default_log_level() -> String {
    "warn".into()
}

impl Config {
    /// Load configuration from the standard config path
    pub fn load() -> Result<Self> {
        let config_path = Self::default_config_path();
        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!(
                "No config file found at {:?}, using defaults",
                config_path
            );
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&contents)?;
        tracing::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Get the default config file path
    pub fn default_config_path() -> PathBuf {
        let base = dirs::config_dir().unwrap_or_else(|| PathBuf::from("."));
        base.join("cvdrisk").join("config.toml")
    }

    /// Save the configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents = toml::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, contents)?;
        tracing::info!("Saved config to {:?}", path);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.score2.default_region, Region::Moderate);
        assert_eq!(config.logging.level, "warn");
        assert!(config.coefficients.path.ends_with("cvdrisk/coefficients.json"));
    }

    #[test]
    fn test_config_roundtrip() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.score2.default_region = Region::VeryHigh;
        config.save_to(&path).unwrap();

        let parsed = Config::load_from(&path).unwrap();
        assert_eq!(parsed.score2.default_region, Region::VeryHigh);
        assert_eq!(parsed.coefficients.path, config.coefficients.path);
    }

    #[test]
    fn test_partial_config() {
        let toml_str = r#"
[score2]
default_region = "High"
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.score2.default_region, Region::High);
        assert_eq!(config.logging.level, "warn"); // default
    }

    #[test]
    fn test_invalid_region_is_rejected() {
        let toml_str = r#"
[score2]
default_region = "Atlantis"
"#;
        assert!(toml::from_str::<Config>(toml_str).is_err());
    }
}
