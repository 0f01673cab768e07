//! Конфиг демо (JSON): seed, settings, камера, сцена, частицы
//!
//! Все поля опциональны — отсутствующие берутся из Default.

use std::fmt;
use std::path::{Path, PathBuf};

use bevy::prelude::Resource;
use serde::{Deserialize, Serialize};

use crate::emitter::ParticleConfig;
use crate::figures::FiguresConfig;
use crate::physics::Settings;
use crate::render::CameraConfig;

/// Верхняя граница числа фигур (защита от опечаток в конфиге)
pub const MAX_FIGURES_LIMIT: u32 = 10_000;

/// Верхняя граница живых частиц одного фонтана
pub const MAX_PARTICLES_LIMIT: usize = 100_000;

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Io { path, source } => {
                write!(f, "failed to read config {}: {}", path.display(), source)
            }
            ConfigError::Parse(err) => write!(f, "failed to parse config: {}", err),
            ConfigError::Invalid(reason) => write!(f, "invalid config: {}", reason),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Parse(err) => Some(err),
            ConfigError::Invalid(_) => None,
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        ConfigError::Parse(err)
    }
}

#[derive(Resource, Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub seed: u64,
    pub settings: Settings,
    pub camera: CameraConfig,
    pub figures: FiguresConfig,
    pub particles: ParticleConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            settings: Settings::default(),
            camera: CameraConfig::default(),
            figures: FiguresConfig::default(),
            particles: ParticleConfig::default(),
        }
    }
}

impl DemoConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: DemoConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    pub fn to_json_pretty(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |reason: String| Err(ConfigError::Invalid(reason));

        if !self.settings.hz.is_finite() || self.settings.hz < 0.0 {
            return invalid(format!("settings.hz must be >= 0, got {}", self.settings.hz));
        }

        if !(self.camera.zoom.is_finite() && self.camera.zoom > 0.0) {
            return invalid(format!("camera.zoom must be > 0, got {}", self.camera.zoom));
        }

        let size = self.figures.size;
        if !(size.lower().is_finite() && size.upper().is_finite()) || size.lower() <= 0.0 {
            return invalid(format!(
                "figures.size must be positive, got [{}, {}]",
                size.lower(),
                size.upper()
            ));
        }

        if self.figures.max_figures > MAX_FIGURES_LIMIT {
            return invalid(format!(
                "figures.max_figures must be <= {}, got {}",
                MAX_FIGURES_LIMIT, self.figures.max_figures
            ));
        }

        if self.figures.density <= 0.0 {
            return invalid(format!("figures.density must be > 0, got {}", self.figures.density));
        }

        if self.particles.params.saturation > 100 {
            return invalid(format!(
                "particles.params.saturation must be <= 100, got {}",
                self.particles.params.saturation
            ));
        }

        if self.particles.max_particles > MAX_PARTICLES_LIMIT {
            return invalid(format!(
                "particles.max_particles must be <= {}, got {}",
                MAX_PARTICLES_LIMIT, self.particles.max_particles
            ));
        }

        if !(self.particles.lifetime.is_finite() && self.particles.lifetime >= 0.0) {
            return invalid(format!(
                "particles.lifetime must be >= 0, got {}",
                self.particles.lifetime
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_is_default() {
        let config = DemoConfig::from_json_str("{}").unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.seed, 42);
    }

    #[test]
    fn test_partial_sections() {
        let json = r#"{
            "seed": 7,
            "settings": { "hz": 30.0 },
            "figures": { "max_figures": 10, "circles": true, "size": { "lower": 0.5, "upper": 1.0 } },
            "particles": { "enabled": true, "params": { "saturation": 20 } }
        }"#;
        let config = DemoConfig::from_json_str(json).unwrap();

        assert_eq!(config.seed, 7);
        assert_eq!(config.settings.hz, 30.0);
        assert_eq!(config.settings.velocity_iterations, 8);
        assert_eq!(config.figures.max_figures, 10);
        assert!(config.figures.circles && config.figures.rectangles);
        assert_eq!(config.figures.size.lower(), 0.5);
        assert!(config.particles.enabled);
        assert_eq!(config.particles.params.saturation, 20);
        assert_eq!(config.particles.params.speed, 12);
    }

    #[test]
    fn test_reversed_size_range_is_ordered() {
        let json = r#"{ "figures": { "equal_size": true, "size": { "lower": 0.8, "upper": 0.25 } } }"#;
        let config = DemoConfig::from_json_str(json).unwrap();

        assert_eq!(config.figures.size.lower(), 0.25);
        assert_eq!(config.figures.size.upper(), 0.8);
    }

    #[test]
    fn test_parse_error() {
        let err = DemoConfig::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
        assert!(err.to_string().starts_with("failed to parse config"));
    }

    #[test]
    fn test_invalid_values() {
        for json in [
            r#"{ "settings": { "hz": -1.0 } }"#,
            r#"{ "camera": { "zoom": 0.0 } }"#,
            r#"{ "figures": { "size": { "lower": 0.0, "upper": 1.0 } } }"#,
            r#"{ "figures": { "max_figures": 1000000 } }"#,
            r#"{ "particles": { "params": { "saturation": 101 } } }"#,
            r#"{ "particles": { "enabled": true, "max_particles": 18446744073709551615 } }"#,
        ] {
            let err = DemoConfig::from_json_str(json).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{}: {}", json, err);
        }
    }

    #[test]
    fn test_missing_file() {
        let err = DemoConfig::load("/definitely/not/here.json").unwrap_err();
        match err {
            ConfigError::Io { path, .. } => assert!(path.ends_with("here.json")),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_round_trip_through_file() {
        let mut config = DemoConfig::default();
        config.seed = 1234;
        config.figures.max_figures = 50;

        let path = std::env::temp_dir().join(format!("figures_config_{}.json", std::process::id()));
        std::fs::write(&path, config.to_json_pretty().unwrap()).unwrap();
        let loaded = DemoConfig::load(&path).unwrap();
        let _ = std::fs::remove_file(&path);

        assert_eq!(loaded, config);
    }
}
