//! Scene: the objects a frame is drawn from.
//!
//! # Invariants
//! - The scene exclusively owns every light and model root added to it.
//! - Geometry recentering is per mesh, never per model.
//! - The camera projection matrix only changes through
//!   [`PerspectiveCamera::update_projection_matrix`].

mod background;
mod camera;
mod geometry;
mod light;
mod node;
mod scene;

pub use background::{Background, GRADIENT_HEIGHT, GRADIENT_WIDTH, GradientTexture, gradient_background};
pub use camera::PerspectiveCamera;
pub use geometry::{Aabb, Geometry};
pub use light::{AmbientLight, DirectionalLight, DirectionalShadow, HemisphereLight, Light, LightRig};
pub use node::{Material, Mesh, Node};
pub use scene::{Scene, SceneObject};

pub use duckview_common::{Color, NodeId, Transform};
