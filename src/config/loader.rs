use std::path::Path;

use super::{AppConfig, ConfigError};

/// Load configuration from a YAML file
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<AppConfig, ConfigError> {
    let path = path.as_ref();

    if !path.exists() {
        return Err(ConfigError::NotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let config: AppConfig = serde_yaml::from_str(&content)?;
    config.validate()?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StatsFormat;
    use crate::scene::SceneLayout;

    fn write_temp(content: &str) -> tempfile::NamedTempFile {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), content).unwrap();
        file
    }

    #[test]
    fn test_load_missing_config() {
        let result = load_config("/nonexistent/config.yaml");
        assert!(matches!(result.unwrap_err(), ConfigError::NotFound(_)));
    }

    #[test]
    fn test_load_config_invalid_yaml() {
        let file = write_temp("render: [unclosed");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Parse(_)));
    }

    #[test]
    fn test_load_config_valid() {
        let file = write_temp(
            r#"
render:
  pixel_size: 0.05
  vp_distance: 2.0
  s_distance: 40.0
  s_r: 10.0
  fog: 30.0
  rot: 45.0
  width: 320
  height: 200

scene:
  layout: stacked

threads: 2

stats:
  enabled: false
  format: "compact"
"#,
        );

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.render.pixel_size, 0.05);
        assert_eq!(config.render.rot, 45.0);
        assert_eq!(config.render.width, 320);
        assert_eq!(config.render.height, 200);
        assert_eq!(config.scene.layout, SceneLayout::Stacked);
        assert_eq!(config.threads, 2);
        assert!(!config.stats.enabled);
        assert_eq!(config.stats.format, StatsFormat::Compact);
    }

    #[test]
    fn test_load_config_minimal() {
        let file = write_temp("render:\n  fog: 12.5\n");

        let config = load_config(file.path()).unwrap();
        assert_eq!(config.render.fog, 12.5);
        assert_eq!(config.render.width, 100);
        assert_eq!(config.scene.layout, SceneLayout::Orbit);
        assert_eq!(config.threads, 0);
        assert!(config.stats.enabled);
    }

    #[test]
    fn test_load_config_rejects_invalid_values() {
        let file = write_temp("render:\n  s_r: -3.0\n");
        let result = load_config(file.path());
        assert!(matches!(result.unwrap_err(), ConfigError::Validation(_)));
    }

    #[test]
    fn test_shipped_default_matches_builtin() {
        let file = write_temp(include_str!("../../config.yaml.default"));
        let config = load_config(file.path()).unwrap();
        assert_eq!(config.render, crate::params::RenderParameters::default());
        assert_eq!(config.scene.layout, SceneLayout::Orbit);
        assert_eq!(config.stats.format, StatsFormat::Pretty);
    }
}
