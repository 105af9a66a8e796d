//! Operator-facing settings, loaded from TOML or RON.

use std::path::{Path, PathBuf};

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::error::SettingsError;
use crate::primitives::ShapeParams;

/// Load/save for a serde settings type, with the format picked by file extension.
pub trait Config: Serialize + for<'de> Deserialize<'de> + Default {
    fn load_from_file(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;

        match extension(path) {
            Some("toml") => toml::from_str(&contents).map_err(|e| SettingsError::Parse(e.to_string())),
            Some("ron") => ron::from_str(&contents).map_err(|e| SettingsError::Parse(e.to_string())),
            _ => Err(SettingsError::UnsupportedFormat(path.display().to_string())),
        }
    }

    fn save_to_file(&self, path: impl AsRef<Path>) -> Result<(), SettingsError> {
        let path = path.as_ref();
        let contents = match extension(path) {
            Some("toml") => {
                toml::to_string_pretty(self).map_err(|e| SettingsError::Serialize(e.to_string()))?
            }
            Some("ron") => ron::ser::to_string_pretty(self, Default::default())
                .map_err(|e| SettingsError::Serialize(e.to_string()))?,
            _ => return Err(SettingsError::UnsupportedFormat(path.display().to_string())),
        };

        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Like [`Self::load_from_file`], but falls back to defaults when the file is missing.
    fn load_or_default(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            log::warn!("settings file {} not found, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from_file(path)
    }
}

fn extension(path: &Path) -> Option<&str> {
    path.extension().and_then(|ext| ext.to_str())
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowSettings {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowSettings {
    fn default() -> Self {
        Self {
            title: "scenery".to_string(),
            width: 800,
            height: 600,
        }
    }
}

/// An imported STL model drawn alongside the scene.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelSettings {
    pub path: PathBuf,
    pub color: Vec3,
    /// One instance sits at the origin; more are scattered on a ring.
    pub instances: u32,
    pub ring_radius: f32,
    pub ring_deviation: f32,
    pub seed: u32,
}

impl Default for ModelSettings {
    fn default() -> Self {
        Self {
            path: PathBuf::new(),
            color: Vec3::new(0.8, 0.8, 0.8),
            instances: 1,
            ring_radius: 50.0,
            ring_deviation: 2.5,
            seed: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub scene_file: Option<PathBuf>,
    pub shape_parameter_1: u32,
    pub shape_parameter_2: u32,
    pub near_plane: f32,
    pub far_plane: f32,
    pub per_pixel_filter: bool,
    pub kernel_filter: bool,
    pub filter_radius: u32,
    pub snapshot_path: PathBuf,
    pub skybox_dir: Option<PathBuf>,
    pub window: WindowSettings,
    pub model: Option<ModelSettings>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            scene_file: None,
            shape_parameter_1: 5,
            shape_parameter_2: 5,
            near_plane: 0.1,
            far_plane: 10.0,
            per_pixel_filter: false,
            kernel_filter: false,
            filter_radius: 5,
            snapshot_path: PathBuf::from("snapshot.png"),
            skybox_dir: None,
            window: WindowSettings::default(),
            model: None,
        }
    }
}

impl Config for Settings {}

/// Largest tessellation parameter the renderer will build meshes for.
pub const MAX_SHAPE_PARAMETER: u32 = 512;

impl Settings {
    /// The configured shape parameters, capped at [`MAX_SHAPE_PARAMETER`].
    pub fn shape_params(&self) -> ShapeParams {
        ShapeParams::new(
            self.shape_parameter_1.min(MAX_SHAPE_PARAMETER),
            self.shape_parameter_2.min(MAX_SHAPE_PARAMETER),
        )
    }

    /// Whether the clip planes allow a projection to be derived.
    pub fn has_valid_clip_planes(&self) -> bool {
        self.near_plane != self.far_plane
    }
}
