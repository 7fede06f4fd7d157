//! Viewer: the single context that owns the scene, camera, controller and
//! renderer, and the loop that draws it.
//!
//! # Invariants
//! - One camera, one renderer, one controller per [`Viewer`]; at most one
//!   model root in the scene.
//! - Each frame updates the controller before rendering.
//! - A stopped [`FrameLoop`] never renders again.

mod config;
mod frame_loop;
mod viewer;

pub use config::{
    BackgroundConfig, CameraConfig, ConfigError, ControlsConfig, LightingConfig, ViewerConfig,
};
pub use frame_loop::{FrameLoop, StopHandle};
pub use viewer::{Viewer, assemble_scene, build_camera, build_controls};
