//! wgpu render backend for the duck viewer.
//!
//! Draws a [`Scene`](duckview_scene::Scene) in three steps: a depth-only
//! shadow pass from the first shadow-casting directional light, the
//! gradient backdrop, then the lit meshes. The main pass is multisampled
//! when antialiasing is on.
//!
//! # Invariants
//! - The renderer never mutates the scene.
//! - Mesh data is uploaded once per node and released when the node leaves
//!   the scene.
//! - Size and pixel-ratio changes are applied at the start of the next frame.

mod gpu;
mod lighting;
mod mesh;
mod shaders;

pub use gpu::{RenderedFrame, WgpuRenderer};
