//! Input: pointer, wheel and touch events mapped onto an orbiting camera.
//!
//! # Invariants
//! - Input handlers only accumulate deltas; the camera moves in
//!   [`OrbitControls::update`], once per frame, before rendering.
//! - Windowing events are translated by the host into [`PointerButton`]
//!   and pixel positions; this crate never sees platform types.

pub mod orbit;
mod spherical;

pub use orbit::{OrbitControls, PointerButton};
pub use spherical::Spherical;

use duckview_scene::PerspectiveCamera;

/// Something that moves the camera once per frame.
pub trait CameraController {
    /// Advance one frame. Returns `true` if the camera moved.
    fn update(&mut self, camera: &mut PerspectiveCamera) -> bool;
}

impl CameraController for OrbitControls {
    fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        OrbitControls::update(self, camera)
    }
}
