use std::path::Path;

use anyhow::{ensure, Context, Result};
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Every tunable of the viewer. Defaults reproduce the classic
/// translucent-cubes demo.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub window_width: u32,
    pub window_height: u32,
    pub background: Vec3,
    pub camera: CameraConfig,
    pub grid: GridConfig,
    pub lights: Vec<LightConfig>,
    pub controls: ControlsConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            window_width: 1280,
            window_height: 720,
            background: Vec3::ONE,
            camera: CameraConfig::default(),
            grid: GridConfig::default(),
            lights: vec![
                LightConfig {
                    position: Vec3::new(-1.0, 2.0, 4.0),
                    ..LightConfig::default()
                },
                LightConfig {
                    position: Vec3::new(1.0, -1.0, -2.0),
                    ..LightConfig::default()
                },
            ],
            controls: ControlsConfig::default(),
        }
    }
}

impl ViewerConfig {
    /// Reads a JSON config file. Missing fields keep their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::from_json(&text).with_context(|| format!("invalid config {}", path.display()))
    }

    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        for (index, light) in config.lights.iter().enumerate() {
            ensure!(
                light.position.length_squared() > f32::EPSILON,
                "light {index} has no direction: its position is the origin"
            );
        }
        Ok(config)
    }
}

/// Perspective projection and starting distance of the camera.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Vertical field of view in degrees.
    pub fov: f32,
    pub aspect: f32,
    pub near: f32,
    pub far: f32,
    /// Distance from the origin along +Z.
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov: 75.0,
            aspect: 2.0,
            near: 0.1,
            far: 25.0,
            distance: 4.0,
        }
    }
}

/// Layout and appearance of the 2x2x2 cube grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GridConfig {
    /// Offset of every cube center from the origin on each axis.
    pub spacing: f32,
    pub box_size: Vec3,
    pub opacity: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            spacing: 0.8,
            box_size: Vec3::ONE,
            opacity: 0.5,
            saturation: 1.0,
            lightness: 0.5,
        }
    }
}

/// A directional light shining from `position` towards the origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightConfig {
    /// Must not be the origin. Defaults to straight above.
    pub position: Vec3,
    pub color: Vec3,
    pub intensity: f32,
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            position: Vec3::Y,
            color: Vec3::ONE,
            intensity: 1.0,
        }
    }
}

/// Orbit controller tuning.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for ControlsConfig {
    fn default() -> Self {
        Self {
            damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::MAX,
        }
    }
}
