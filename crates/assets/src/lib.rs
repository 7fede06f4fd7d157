//! Model loading: glTF/GLB files become a scene [`Node`](duckview_scene::Node)
//! hierarchy.
//!
//! # Invariants
//! - Every mesh of a loaded model is recentered on its own bounding box.
//! - A load produces exactly one [`LoadOutcome`], success or failure; the
//!   caller decides what to do with a failure.

mod error;
mod gltf_import;
mod loader;

pub use error::AssetError;
pub use gltf_import::load_model;
pub use loader::{LoadOutcome, Model, PendingLoad, load_in_background, spawn_load};
