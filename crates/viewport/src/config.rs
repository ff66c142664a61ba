//! Viewer configuration, loaded from YAML.
//!
//! Every field has a default, so an empty file (or no file) is a valid
//! configuration matching the demos: 75 degree camera at (1, 1, 2), damped
//! orbit controls, pixel density capped at 2.

use crate::error::ConfigError;
use crate::viewport::PixelDensity;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window: WindowConfig,
    pub viewport: LoopConfig,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "viewloop".into(),
            width: 1280,
            height: 720,
        }
    }
}

/// Settings consumed by [`crate::ViewportLoop`] itself.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoopConfig {
    pub max_pixel_density: f64,
}

impl Default for LoopConfig {
    fn default() -> Self {
        Self {
            max_pixel_density: PixelDensity::DEFAULT_MAX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: [f32; 3],
    pub target: [f32; 3],
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 100.0,
            position: [1.0, 1.0, 2.0],
            target: [0.0, 0.0, 0.0],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enable_damping: bool,
    /// Fraction of the pending motion applied per frame when damping.
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            enable_damping: true,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
        }
    }
}

impl ViewerConfig {
    /// Read, parse and validate a YAML config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        let config = Self::from_yaml(&text)?;
        tracing::debug!("loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse and validate YAML text.
    pub fn from_yaml(text: &str) -> Result<Self, ConfigError> {
        let config: Self = if text.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml::from_str(text)?
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if self.window.width == 0 || self.window.height == 0 {
            return invalid(format!(
                "window size must be non-zero, got {}x{}",
                self.window.width, self.window.height
            ));
        }
        let density = self.viewport.max_pixel_density;
        if !density.is_finite() || density <= 0.0 {
            return invalid(format!("max_pixel_density must be positive, got {density}"));
        }
        let fov = self.camera.fov_degrees;
        if !(fov > 0.0 && fov < 180.0) {
            return invalid(format!("fov_degrees must be in (0, 180), got {fov}"));
        }
        if !(self.camera.near > 0.0 && self.camera.near < self.camera.far) {
            return invalid(format!(
                "camera planes must satisfy 0 < near < far, got near={} far={}",
                self.camera.near, self.camera.far
            ));
        }
        let factor = self.controls.damping_factor;
        if !(factor > 0.0 && factor <= 1.0) {
            return invalid(format!("damping_factor must be in (0, 1], got {factor}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_demos() {
        let config = ViewerConfig::default();
        assert_eq!(config.viewport.max_pixel_density, 2.0);
        assert_eq!(config.camera.fov_degrees, 75.0);
        assert_eq!(config.camera.position, [1.0, 1.0, 2.0]);
        assert!(config.controls.enable_damping);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn empty_yaml_is_default() {
        assert_eq!(ViewerConfig::from_yaml("").unwrap(), ViewerConfig::default());
    }

    #[test]
    fn partial_yaml_keeps_other_defaults() {
        let config = ViewerConfig::from_yaml(
            "window:\n  title: lights\ncamera:\n  fov_degrees: 45\n",
        )
        .unwrap();
        assert_eq!(config.window.title, "lights");
        assert_eq!(config.window.width, 1280);
        assert_eq!(config.camera.fov_degrees, 45.0);
        assert_eq!(config.camera.far, 100.0);
    }

    #[test]
    fn rejects_bad_values() {
        for yaml in [
            "viewport:\n  max_pixel_density: 0\n",
            "window:\n  width: 0\n",
            "camera:\n  fov_degrees: 180\n",
            "camera:\n  near: 10\n  far: 1\n",
            "controls:\n  damping_factor: 0\n",
        ] {
            let err = ViewerConfig::from_yaml(yaml).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid(_)), "{yaml}: {err}");
        }
    }

    #[test]
    fn rejects_malformed_yaml() {
        let err = ViewerConfig::from_yaml("window: [1, 2").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "viewport:\n  max_pixel_density: 1.5").unwrap();

        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.viewport.max_pixel_density, 1.5);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ViewerConfig::load(dir.path().join("nope.yaml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
