use crate::config::ViewerConfig;
use duckview_assets::{AssetError, LoadOutcome};
use duckview_common::NodeId;
use duckview_input::{CameraController, OrbitControls};
use duckview_render::{Renderer, Viewport};
use duckview_scene::{Background, PerspectiveCamera, Scene, gradient_background};

/// Scene with the light rig installed and the gradient backdrop assigned.
pub fn assemble_scene(config: &ViewerConfig) -> Scene {
    let mut scene = Scene::new();
    for light in config.lighting.rig().lights() {
        scene.add_light(light);
    }
    scene.background = Some(Background::Gradient(gradient_background(
        config.background.top,
        config.background.bottom,
    )));
    scene
}

pub fn build_camera(config: &ViewerConfig, viewport: Viewport) -> PerspectiveCamera {
    let c = &config.camera;
    let aspect = if viewport.is_empty() {
        1.0
    } else {
        viewport.aspect()
    };
    let mut camera = PerspectiveCamera::new(c.fov_degrees, aspect, c.near, c.far);
    camera.position = c.position;
    camera.look_at(c.target);
    camera
}

pub fn build_controls(config: &ViewerConfig, viewport: Viewport) -> OrbitControls {
    let c = &config.controls;
    let mut controls = OrbitControls::new(config.camera.target);
    controls.enable_damping = c.enable_damping;
    controls.damping_factor = c.damping_factor;
    controls.rotate_speed = c.rotate_speed;
    controls.zoom_speed = c.zoom_speed;
    controls.pan_speed = c.pan_speed;
    controls.set_viewport(viewport.width as f32, viewport.height as f32);
    controls
}

/// Owns the scene, camera, controller and renderer for the lifetime of a
/// window. Event handlers borrow it; nothing is global.
pub struct Viewer<R: Renderer, C: CameraController = OrbitControls> {
    scene: Scene,
    camera: PerspectiveCamera,
    controls: C,
    renderer: R,
    model: Option<NodeId>,
}

impl<R: Renderer> Viewer<R, OrbitControls> {
    /// Assemble the scene, camera and orbit controls from `config` and size
    /// everything to `viewport`.
    pub fn new(config: &ViewerConfig, renderer: R, viewport: Viewport) -> Self {
        let mut viewer = Self::from_parts(
            assemble_scene(config),
            build_camera(config, viewport),
            build_controls(config, viewport),
            renderer,
        );
        viewer.resize(viewport);
        tracing::info!(
            objects = viewer.scene.len(),
            width = viewport.width,
            height = viewport.height,
            "viewer assembled"
        );
        viewer
    }
}

impl<R: Renderer, C: CameraController> Viewer<R, C> {
    pub fn from_parts(scene: Scene, camera: PerspectiveCamera, controls: C, renderer: R) -> Self {
        Self {
            scene,
            camera,
            controls,
            renderer,
            model: None,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn camera(&self) -> &PerspectiveCamera {
        &self.camera
    }

    pub fn controls(&self) -> &C {
        &self.controls
    }

    pub fn controls_mut(&mut self) -> &mut C {
        &mut self.controls
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Id of the inserted model root, once a load has succeeded.
    pub fn model(&self) -> Option<NodeId> {
        self.model
    }

    /// Resync camera and render target with a new viewport.
    /// Zero-area viewports (minimized windows) are ignored.
    pub fn resize(&mut self, viewport: Viewport) {
        if viewport.is_empty() {
            tracing::debug!(?viewport, "ignoring empty viewport");
            return;
        }
        self.camera.aspect = viewport.aspect();
        self.camera.update_projection_matrix();
        self.renderer.set_size(viewport.width, viewport.height);
        self.renderer.set_pixel_ratio(viewport.pixel_ratio);
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            pixel_ratio = viewport.pixel_ratio,
            "viewport resized"
        );
    }

    /// Apply the outcome of a model load.
    ///
    /// On success the model root is recentered per mesh and inserted,
    /// replacing any earlier model. On failure the scene is left untouched
    /// and the error is handed back so the caller can retry or report it.
    pub fn on_model_loaded(&mut self, outcome: LoadOutcome) -> Result<NodeId, AssetError> {
        let model = outcome.inspect_err(|e| tracing::warn!("model not inserted: {e}"))?;
        let source = model.source.clone();
        let mut root = model.into_root();
        // hand-built models may not be centered yet; centering is idempotent
        root.center_meshes();

        if let Some(previous) = self.model.take() {
            self.scene.remove(previous);
            tracing::debug!(id = %previous.short(), "previous model removed");
        }
        let id = self.scene.add_model(root);
        self.model = Some(id);
        tracing::info!(id = %id.short(), source = %source.display(), "model inserted");
        Ok(id)
    }

    /// One frame: advance the controller, then render.
    pub fn frame(&mut self) -> R::Output {
        self.controls.update(&mut self.camera);
        self.renderer.render(&self.scene, &self.camera)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use duckview_assets::Model;
    use duckview_render::DebugTextRenderer;
    use duckview_scene::{Geometry, Material, Mesh, Node, SceneObject};
    use glam::Vec3;
    use std::cell::RefCell;
    use std::path::PathBuf;
    use std::rc::Rc;

    pub(crate) type Log = Rc<RefCell<Vec<&'static str>>>;

    /// Records every call into a shared log.
    pub(crate) struct RecordingRenderer {
        pub log: Log,
        pub viewport: Viewport,
    }

    impl Renderer for RecordingRenderer {
        type Output = usize;

        fn set_size(&mut self, width: u32, height: u32) {
            self.log.borrow_mut().push("set_size");
            self.viewport.width = width;
            self.viewport.height = height;
        }

        fn set_pixel_ratio(&mut self, ratio: f64) {
            self.log.borrow_mut().push("set_pixel_ratio");
            self.viewport.pixel_ratio = ratio;
        }

        fn viewport(&self) -> Viewport {
            self.viewport
        }

        fn render(&mut self, scene: &Scene, _camera: &PerspectiveCamera) -> usize {
            self.log.borrow_mut().push("render");
            scene.len()
        }
    }

    pub(crate) struct RecordingController {
        pub log: Log,
    }

    impl CameraController for RecordingController {
        fn update(&mut self, _camera: &mut PerspectiveCamera) -> bool {
            self.log.borrow_mut().push("update");
            false
        }
    }

    pub(crate) fn recording_viewer(scene: Scene) -> (Viewer<RecordingRenderer, RecordingController>, Log) {
        let log: Log = Rc::default();
        let viewer = Viewer::from_parts(
            scene,
            PerspectiveCamera::default(),
            RecordingController { log: log.clone() },
            RecordingRenderer {
                log: log.clone(),
                viewport: Viewport::new(1, 1),
            },
        );
        (viewer, log)
    }

    fn triangle_mesh(offset: Vec3) -> Mesh {
        Mesh {
            geometry: Geometry::new(
                vec![offset, offset + Vec3::new(2.0, 0.0, 0.0), offset + Vec3::new(0.0, 2.0, 0.0)],
                vec![0, 1, 2],
            ),
            material: Material::default(),
        }
    }

    fn two_mesh_model() -> Model {
        let mut root = Node::named("duck");
        root.add_child(Node::named("body").with_mesh(triangle_mesh(Vec3::new(3.0, 1.0, 0.0))));
        root.add_child(Node::named("bill").with_mesh(triangle_mesh(Vec3::new(-1.0, 4.0, 2.0))));
        Model {
            source: PathBuf::from("Duck.glb"),
            root,
        }
    }

    fn debug_viewer() -> Viewer<DebugTextRenderer> {
        Viewer::new(
            &ViewerConfig::default(),
            DebugTextRenderer::default(),
            Viewport::new(1280, 720),
        )
    }

    #[test]
    fn assembly_installs_rig_background_and_camera() {
        let viewer = debug_viewer();
        assert_eq!(viewer.scene().len(), 3);
        assert!(viewer.scene().shadow_caster().is_some());
        assert!(matches!(viewer.scene().background, Some(Background::Gradient(_))));
        let cam = viewer.camera();
        assert_eq!(cam.fov_degrees, 75.0);
        assert_eq!((cam.near, cam.far), (0.1, 1000.0));
        assert_eq!(cam.position, Vec3::new(0.0, 1.5, 3.0));
        assert_eq!(cam.aspect, 1280.0 / 720.0);
        assert!(viewer.controls().enable_damping);
        assert_eq!(viewer.controls().damping_factor, 0.05);
        assert!(viewer.model().is_none());
    }

    #[test]
    fn controls_take_config_settings() {
        let mut config = ViewerConfig::default();
        config.camera.target = Vec3::new(0.0, 0.5, 0.0);
        config.controls.enable_damping = false;
        config.controls.damping_factor = 0.2;
        config.controls.rotate_speed = 2.0;
        config.controls.zoom_speed = 0.5;
        config.controls.pan_speed = 3.0;
        let controls = build_controls(&config, Viewport::new(800, 600));
        assert_eq!(controls.target, Vec3::new(0.0, 0.5, 0.0));
        assert!(!controls.enable_damping);
        assert_eq!(controls.damping_factor, 0.2);
        assert_eq!(
            (controls.rotate_speed, controls.zoom_speed, controls.pan_speed),
            (2.0, 0.5, 3.0)
        );
    }

    #[test]
    fn resize_syncs_camera_and_target() {
        let mut viewer = debug_viewer();
        let viewport = Viewport::new(1000, 300).with_pixel_ratio(2.0);
        viewer.resize(viewport);
        assert_eq!(viewer.camera().aspect, 1000.0_f32 / 300.0_f32);
        assert_eq!(
            viewer.camera().projection_matrix(),
            glam::Mat4::perspective_rh(75f32.to_radians(), 1000.0 / 300.0, 0.1, 1000.0)
        );
        assert_eq!(viewer.renderer().viewport(), viewport);
    }

    #[test]
    fn resize_is_idempotent() {
        let mut viewer = debug_viewer();
        let viewport = Viewport::new(777, 555).with_pixel_ratio(1.25);
        viewer.resize(viewport);
        let (camera, target) = (viewer.camera().clone(), viewer.renderer().viewport());
        viewer.resize(viewport);
        assert_eq!(viewer.camera(), &camera);
        assert_eq!(viewer.renderer().viewport(), target);
    }

    #[test]
    fn empty_viewport_is_ignored() {
        let mut viewer = debug_viewer();
        let before = viewer.camera().clone();
        viewer.resize(Viewport::new(0, 0));
        assert_eq!(viewer.camera(), &before);
        assert_eq!(viewer.renderer().viewport(), Viewport::new(1280, 720));
    }

    #[test]
    fn load_success_adds_one_centered_root() {
        let mut viewer = debug_viewer();
        let before = viewer.scene().len();
        let id = viewer.on_model_loaded(Ok(two_mesh_model())).unwrap();
        assert_eq!(viewer.scene().len(), before + 1);
        assert_eq!(viewer.model(), Some(id));

        let Some(SceneObject::Model(root)) = viewer.scene().get(id) else {
            panic!("model root missing");
        };
        assert_eq!(root.mesh_count(), 2);
        root.traverse(&mut |n| {
            if let Some(mesh) = &n.mesh {
                let c = mesh.geometry.bounding_box().unwrap().center();
                assert!(c.abs_diff_eq(Vec3::ZERO, 1e-6));
            }
        });
    }

    #[test]
    fn load_failure_leaves_scene_untouched() {
        let mut viewer = debug_viewer();
        let before = viewer.scene().len();
        let err = viewer
            .on_model_loaded(Err(AssetError::NoScene(PathBuf::from("Duck.glb"))))
            .unwrap_err();
        assert!(matches!(err, AssetError::NoScene(_)));
        assert_eq!(viewer.scene().len(), before);
        assert!(viewer.model().is_none());
    }

    #[test]
    fn second_load_replaces_model() {
        let mut viewer = debug_viewer();
        let first = viewer.on_model_loaded(Ok(two_mesh_model())).unwrap();
        let second = viewer.on_model_loaded(Ok(two_mesh_model())).unwrap();
        assert_ne!(first, second);
        assert_eq!(viewer.scene().models().count(), 1);
        assert!(viewer.scene().get(first).is_none());
    }

    #[test]
    fn end_to_end_empty_scene_two_meshes() {
        let (mut viewer, _log) = recording_viewer(Scene::new());
        assert!(viewer.scene().is_empty());
        viewer.on_model_loaded(Ok(two_mesh_model())).unwrap();
        assert_eq!(viewer.scene().len(), 1);
        let root = viewer.scene().models().next().unwrap();
        let mut centered = 0;
        root.traverse(&mut |n| {
            if let Some(mesh) = &n.mesh {
                let c = mesh.geometry.bounding_box().unwrap().center();
                assert!(c.abs_diff_eq(Vec3::ZERO, 1e-6));
                centered += 1;
            }
        });
        assert_eq!(centered, 2);
        // rendered frames now see the model
        assert_eq!(viewer.frame(), 1);
    }

    #[test]
    fn frame_updates_before_rendering() {
        let (mut viewer, log) = recording_viewer(Scene::new());
        viewer.frame();
        assert_eq!(*log.borrow(), ["update", "render"]);
    }

    #[test]
    fn frames_render_without_model_until_loaded() {
        let mut viewer = debug_viewer();
        assert!(viewer.frame().contains("Objects: 3"));
        viewer.on_model_loaded(Ok(two_mesh_model())).unwrap();
        assert!(viewer.frame().contains("model duck meshes=2"));
    }
}
