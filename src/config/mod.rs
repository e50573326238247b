mod loader;

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::params::RenderParameters;
use crate::scene::SceneLayout;

pub use loader::load_config;

/// Main application configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    #[serde(default)]
    pub render: RenderParameters,
    #[serde(default)]
    pub scene: SceneConfig,
    /// Render worker threads; 0 = one per core, 1 = sequential
    #[serde(default)]
    pub threads: usize,
    #[serde(default)]
    pub stats: StatsConfig,
}

/// Scene arrangement configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct SceneConfig {
    #[serde(default)]
    pub layout: SceneLayout,
}

/// Stats logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StatsConfig {
    #[serde(default = "default_stats_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub format: StatsFormat,
}

fn default_stats_enabled() -> bool {
    true
}

impl Default for StatsConfig {
    fn default() -> Self {
        Self {
            enabled: default_stats_enabled(),
            format: StatsFormat::default(),
        }
    }
}

/// Stats output format
#[derive(Debug, Clone, Copy, Deserialize, Serialize, Default, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum StatsFormat {
    #[default]
    Pretty,
    Json,
    Compact,
}

impl AppConfig {
    /// Load configuration from a YAML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        load_config(path)
    }

    /// Load the given file, or the first default location that exists, or
    /// fall back to built-in defaults when no file is found at all
    pub fn load_or_default(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        match config_path {
            Some(path) => Self::from_file(path),
            None => {
                let default_paths = ["config.yaml", "config.yml", "./config/config.yaml"];
                for p in default_paths {
                    let path = Path::new(p);
                    if path.exists() {
                        return Self::from_file(path);
                    }
                }
                tracing::debug!("No config file found, using built-in defaults");
                Ok(Self::default())
            }
        }
    }

    /// Check the render parameters this config would produce
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.render
            .validate()
            .map_err(|e| ConfigError::Validation(e.to_string()))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    NotFound(String),

    #[error("Failed to read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("Configuration validation error: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.render, RenderParameters::default());
        assert_eq!(config.scene.layout, SceneLayout::Orbit);
        assert_eq!(config.threads, 0);
        assert!(config.stats.enabled);
        assert_eq!(config.stats.format, StatsFormat::Pretty);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_stats_format_serde() {
        assert_eq!(serde_json::to_string(&StatsFormat::Pretty).unwrap(), "\"pretty\"");
        assert_eq!(serde_json::to_string(&StatsFormat::Json).unwrap(), "\"json\"");
        assert_eq!(serde_json::to_string(&StatsFormat::Compact).unwrap(), "\"compact\"");

        let compact: StatsFormat = serde_json::from_str("\"compact\"").unwrap();
        assert_eq!(compact, StatsFormat::Compact);
    }

    #[test]
    fn test_validate_reports_parameter() {
        let mut config = AppConfig::default();
        config.render.fog = 0.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().contains("fog"));
    }

    #[test]
    fn test_config_error_display() {
        let err = ConfigError::NotFound("test.yaml".to_string());
        assert!(err.to_string().contains("test.yaml"));

        let err = ConfigError::Parse(serde_yaml::from_str::<AppConfig>("threads: [").unwrap_err());
        assert!(err.to_string().contains("parse"));
    }

    #[test]
    fn test_load_or_default_with_path() {
        let result = AppConfig::load_or_default(Some(Path::new("/nonexistent/config.yaml")));
        assert!(matches!(result.unwrap_err(), ConfigError::NotFound(_)));
    }

    #[test]
    fn test_config_roundtrips_through_yaml() {
        let mut config = AppConfig::default();
        config.render.width = 64;
        config.scene.layout = SceneLayout::Stacked;

        let yaml = serde_yaml::to_string(&config).unwrap();
        let parsed: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(parsed.render, config.render);
        assert_eq!(parsed.scene.layout, SceneLayout::Stacked);
    }
}
