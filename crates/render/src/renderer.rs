use duckview_scene::{Background, Light, PerspectiveCamera, Scene, SceneObject};
use std::fmt::Write;

/// Size of the drawable area in logical pixels, plus the device pixel ratio.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
    pub pixel_ratio: f64,
}

impl Viewport {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pixel_ratio: 1.0,
        }
    }

    pub fn with_pixel_ratio(mut self, pixel_ratio: f64) -> Self {
        self.pixel_ratio = pixel_ratio;
        self
    }

    /// Width over height. Only meaningful when [`is_empty`](Self::is_empty) is false.
    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Size in device pixels, at least 1 × 1.
    pub fn physical_size(&self) -> (u32, u32) {
        let scale = |v: u32| ((v as f64 * self.pixel_ratio).round() as u32).max(1);
        (scale(self.width), scale(self.height))
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("surface lost or outdated, reconfigured")]
    SurfaceLost,
    #[error("surface error: {0}")]
    Surface(String),
    #[error("device error: {0}")]
    Device(String),
}

/// Renderer-agnostic interface. All renderers implement this trait.
pub trait Renderer {
    /// What one frame produces.
    type Output;

    /// Resize the render target, in logical pixels.
    fn set_size(&mut self, width: u32, height: u32);

    fn set_pixel_ratio(&mut self, ratio: f64);

    /// Current target size and pixel ratio.
    fn viewport(&self) -> Viewport;

    /// Draw one frame of `scene` through `camera`.
    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> Self::Output;
}

/// Produces a human-readable description of what would be drawn.
/// Useful for the CLI, logging, and exercising the render interface.
#[derive(Debug)]
pub struct DebugTextRenderer {
    viewport: Viewport,
    frames: u64,
}

impl Default for DebugTextRenderer {
    fn default() -> Self {
        Self::new(Viewport::new(1280, 720))
    }
}

impl DebugTextRenderer {
    pub fn new(viewport: Viewport) -> Self {
        Self {
            viewport,
            frames: 0,
        }
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl Renderer for DebugTextRenderer {
    type Output = String;

    fn set_size(&mut self, width: u32, height: u32) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    fn set_pixel_ratio(&mut self, ratio: f64) {
        self.viewport.pixel_ratio = ratio;
    }

    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn render(&mut self, scene: &Scene, camera: &PerspectiveCamera) -> String {
        self.frames += 1;
        let mut out = String::new();
        let v = self.viewport;
        let _ = writeln!(
            out,
            "=== Frame {} ({}x{} @{:.2}) ===",
            self.frames, v.width, v.height, v.pixel_ratio
        );
        let p = camera.position;
        let t = camera.target;
        let _ = writeln!(
            out,
            "Camera: eye=({:.2}, {:.2}, {:.2}) target=({:.2}, {:.2}, {:.2}) fov={:.0} aspect={:.3}",
            p.x, p.y, p.z, t.x, t.y, t.z, camera.fov_degrees, camera.aspect
        );
        match &scene.background {
            Some(Background::Color(c)) => {
                let _ = writeln!(out, "Background: {c}");
            }
            Some(Background::Gradient(g)) => {
                let _ = writeln!(
                    out,
                    "Background: gradient {} -> {} ({}x{})",
                    g.top,
                    g.bottom,
                    g.width(),
                    g.height()
                );
            }
            None => {
                let _ = writeln!(out, "Background: none");
            }
        }
        let _ = writeln!(out, "Objects: {}", scene.len());

        for (id, object) in scene.objects() {
            match object {
                SceneObject::Light(light) => {
                    let detail = match light {
                        Light::Hemisphere(h) => {
                            format!("sky={} ground={} i={:.2}", h.sky, h.ground, h.intensity)
                        }
                        Light::Directional(d) => format!(
                            "color={} i={:.2} shadow={}",
                            d.color,
                            d.intensity,
                            d.shadow
                                .map(|s| format!("{}px", s.map_size))
                                .unwrap_or_else(|| "off".into())
                        ),
                        Light::Ambient(a) => format!("color={} i={:.2}", a.color, a.intensity),
                    };
                    let _ = writeln!(out, "  [{}] light {} {detail}", id.short(), light.kind());
                }
                SceneObject::Model(root) => {
                    let _ = writeln!(
                        out,
                        "  [{}] model {} meshes={}",
                        id.short(),
                        root.display_name(),
                        root.mesh_count()
                    );
                }
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use duckview_scene::{Color, LightRig, Node, gradient_background};

    #[test]
    fn debug_renderer_empty_scene() {
        let scene = Scene::new();
        let mut renderer = DebugTextRenderer::default();
        let output = renderer.render(&scene, &PerspectiveCamera::default());

        assert!(output.contains("Frame 1"));
        assert!(output.contains("Objects: 0"));
        assert!(output.contains("Background: none"));
        assert_eq!(renderer.frames(), 1);
    }

    #[test]
    fn debug_renderer_lists_lights_and_model() {
        let mut scene = Scene::new();
        for light in LightRig::default().lights() {
            scene.add_light(light);
        }
        scene.add_model(Node::named("duck"));
        scene.background = Some(Background::Gradient(gradient_background(
            Color::from_hex(0xadd8e6),
            Color::from_hex(0xe0f2f7),
        )));

        let mut renderer = DebugTextRenderer::default();
        let output = renderer.render(&scene, &PerspectiveCamera::default());

        assert!(output.contains("Objects: 4"));
        assert!(output.contains("light directional"));
        assert!(output.contains("shadow=1024px"));
        assert!(output.contains("model duck meshes=0"));
        assert!(output.contains("gradient #ADD8E6 -> #E0F2F7 (1x256)"));
    }

    #[test]
    fn set_size_and_ratio() {
        let mut renderer = DebugTextRenderer::default();
        renderer.set_size(800, 600);
        renderer.set_pixel_ratio(2.0);
        assert_eq!(renderer.viewport(), Viewport::new(800, 600).with_pixel_ratio(2.0));
    }

    #[test]
    fn viewport_physical_size() {
        let v = Viewport::new(640, 480).with_pixel_ratio(1.5);
        assert_eq!(v.physical_size(), (960, 720));
        assert_eq!(Viewport::new(0, 0).physical_size(), (1, 1));
        assert!(Viewport::new(0, 10).is_empty());
        assert_eq!(Viewport::new(800, 400).aspect(), 2.0);
    }
}
