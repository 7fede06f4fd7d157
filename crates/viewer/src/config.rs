use duckview_common::Color;
use duckview_scene::{
    AmbientLight, DirectionalLight, DirectionalShadow, HemisphereLight, LightRig,
};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Everything the viewer is assembled from. Fields missing from a config
/// file keep their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub model: PathBuf,
    pub camera: CameraConfig,
    pub controls: ControlsConfig,
    pub lighting: LightingConfig,
    pub background: BackgroundConfig,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            model: PathBuf::from("Duck.glb"),
            camera: CameraConfig::default(),
            controls: ControlsConfig::default(),
            lighting: LightingConfig::default(),
            background: BackgroundConfig::default(),
        }
    }
}

impl ViewerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer_pretty(file, self)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub position: Vec3,
    pub target: Vec3,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_degrees: 75.0,
            near: 0.1,
            far: 1000.0,
            position: Vec3::new(0.0, 1.5, 3.0),
            target: Vec3::ZERO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ControlsConfig {
    pub enable_damping: bool,
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LightingConfig {
    pub sky_color: Color,
    pub ground_color: Color,
    pub hemisphere_intensity: f32,
    pub key_color: Color,
    pub key_intensity: f32,
    pub key_position: Vec3,
    pub cast_shadows: bool,
    pub shadow_map_size: u32,
    pub shadow_bias: f32,
    pub ambient_color: Color,
    pub ambient_intensity: f32,
}

impl Default for LightingConfig {
    fn default() -> Self {
        let rig = LightRig::default();
        let shadow = rig.directional.shadow.unwrap_or_default();
        Self {
            sky_color: rig.hemisphere.sky,
            ground_color: rig.hemisphere.ground,
            hemisphere_intensity: rig.hemisphere.intensity,
            key_color: rig.directional.color,
            key_intensity: rig.directional.intensity,
            key_position: rig.directional.position,
            cast_shadows: true,
            shadow_map_size: shadow.map_size,
            shadow_bias: shadow.bias,
            ambient_color: rig.ambient.color,
            ambient_intensity: rig.ambient.intensity,
        }
    }
}

impl LightingConfig {
    pub fn rig(&self) -> LightRig {
        let shadow = self.cast_shadows.then(|| DirectionalShadow {
            map_size: self.shadow_map_size.max(1),
            bias: self.shadow_bias,
            ..DirectionalShadow::default()
        });
        LightRig {
            hemisphere: HemisphereLight {
                sky: self.sky_color,
                ground: self.ground_color,
                intensity: self.hemisphere_intensity,
            },
            directional: DirectionalLight {
                color: self.key_color,
                intensity: self.key_intensity,
                position: self.key_position,
                target: Vec3::ZERO,
                shadow,
            },
            ambient: AmbientLight {
                color: self.ambient_color,
                intensity: self.ambient_intensity,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackgroundConfig {
    pub top: Color,
    pub bottom: Color,
}

impl Default for BackgroundConfig {
    fn default() -> Self {
        Self {
            top: Color::from_hex(0xadd8e6),
            bottom: Color::from_hex(0xe0f2f7),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_rig_matches_scene_defaults() {
        assert_eq!(LightingConfig::default().rig(), LightRig::default());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let cfg: ViewerConfig = serde_json::from_str(
            r##"{ "model": "Fox.glb", "background": { "top": "#000000" } }"##,
        )
        .unwrap();
        assert_eq!(cfg.model, PathBuf::from("Fox.glb"));
        assert_eq!(cfg.background.top, Color::BLACK);
        assert_eq!(cfg.background.bottom, BackgroundConfig::default().bottom);
        assert_eq!(cfg.camera, CameraConfig::default());
    }

    #[test]
    fn bad_color_rejected() {
        let err = serde_json::from_str::<ViewerConfig>(r#"{ "background": { "top": "blue" } }"#);
        assert!(err.is_err());
    }

    #[test]
    fn shadows_can_be_disabled() {
        let cfg = LightingConfig {
            cast_shadows: false,
            ..LightingConfig::default()
        };
        assert!(cfg.rig().directional.shadow.is_none());
    }

    #[test]
    fn save_and_load() {
        let tmp = tempfile::NamedTempFile::new().unwrap();
        let mut cfg = ViewerConfig::default();
        cfg.controls.damping_factor = 0.1;
        cfg.save(tmp.path()).unwrap();
        assert_eq!(ViewerConfig::load(tmp.path()).unwrap(), cfg);
    }
}
