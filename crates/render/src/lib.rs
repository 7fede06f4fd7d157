//! Rendering adapter: renderer-agnostic interface.
//!
//! # Invariants
//! - Renderers read the scene and camera; they never mutate them.
//! - Render target size and pixel ratio change only through
//!   [`Renderer::set_size`] and [`Renderer::set_pixel_ratio`].
//!
//! The wgpu backend lives in `duckview-render-wgpu`; [`DebugTextRenderer`]
//! implements the same trait for headless use and tests.

mod renderer;

pub use renderer::{DebugTextRenderer, RenderError, Renderer, Viewport};
