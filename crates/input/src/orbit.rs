use crate::spherical::Spherical;
use duckview_scene::PerspectiveCamera;
use glam::{Vec2, Vec3};
use std::collections::BTreeMap;
use std::f32::consts::{PI, TAU};

const EPS: f32 = 1e-6;

/// Pointer buttons the controller reacts to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    /// Rotate around the target.
    Primary,
    /// Dolly toward or away from the target.
    Middle,
    /// Pan the target in screen space.
    Secondary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Drag {
    Idle,
    Rotate,
    Dolly,
    Pan,
}

/// Orbit, dolly and pan a camera around a target point.
///
/// With damping enabled each [`update`](Self::update) applies
/// `damping_factor` of the pending rotation and pan, then decays what is
/// left by `1 - damping_factor`, so motion eases out over later frames.
#[derive(Debug, Clone)]
pub struct OrbitControls {
    pub target: Vec3,
    pub enabled: bool,
    pub enable_damping: bool,
    pub damping_factor: f32,
    pub rotate_speed: f32,
    pub zoom_speed: f32,
    pub pan_speed: f32,
    pub min_distance: f32,
    pub max_distance: f32,
    pub min_polar_angle: f32,
    pub max_polar_angle: f32,

    spherical_delta: Spherical,
    pan_offset: Vec3,
    pending_pan: Vec2,
    scale: f32,
    drag: Drag,
    last_pointer: Option<Vec2>,
    viewport: Vec2,
    touches: BTreeMap<u64, Vec2>,
}

impl Default for OrbitControls {
    fn default() -> Self {
        Self {
            target: Vec3::ZERO,
            enabled: true,
            enable_damping: false,
            damping_factor: 0.05,
            rotate_speed: 1.0,
            zoom_speed: 1.0,
            pan_speed: 1.0,
            min_distance: 0.0,
            max_distance: f32::INFINITY,
            min_polar_angle: 0.0,
            max_polar_angle: PI,
            spherical_delta: Spherical::default(),
            pan_offset: Vec3::ZERO,
            pending_pan: Vec2::ZERO,
            scale: 1.0,
            drag: Drag::Idle,
            last_pointer: None,
            viewport: Vec2::new(1280.0, 720.0),
            touches: BTreeMap::new(),
        }
    }
}

impl OrbitControls {
    pub fn new(target: Vec3) -> Self {
        Self {
            target,
            ..Self::default()
        }
    }

    /// Viewport size in the same units as pointer positions.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Vec2::new(width.max(1.0), height.max(1.0));
    }

    pub fn is_dragging(&self) -> bool {
        self.drag != Drag::Idle
    }

    // --- raw motions ---

    pub fn rotate_left(&mut self, angle: f32) {
        self.spherical_delta.theta -= angle;
    }

    pub fn rotate_up(&mut self, angle: f32) {
        self.spherical_delta.phi -= angle;
    }

    /// Shrink the orbit radius by `factor` (< 1 moves closer).
    pub fn dolly_in(&mut self, factor: f32) {
        self.scale *= factor;
    }

    pub fn dolly_out(&mut self, factor: f32) {
        self.scale /= factor;
    }

    /// Pan by a pixel delta; resolved against the camera in `update`.
    pub fn pan(&mut self, delta: Vec2) {
        self.pending_pan += delta * self.pan_speed;
    }

    fn zoom_scale(&self) -> f32 {
        0.95_f32.powf(self.zoom_speed)
    }

    fn rotate_by_pixels(&mut self, delta: Vec2) {
        let h = self.viewport.y;
        self.rotate_left(TAU * delta.x / h * self.rotate_speed);
        self.rotate_up(TAU * delta.y / h * self.rotate_speed);
    }

    // --- pointer events ---

    pub fn on_pointer_down(&mut self, button: PointerButton, position: Vec2) {
        if !self.enabled {
            return;
        }
        self.drag = match button {
            PointerButton::Primary => Drag::Rotate,
            PointerButton::Middle => Drag::Dolly,
            PointerButton::Secondary => Drag::Pan,
        };
        self.last_pointer = Some(position);
        tracing::trace!(?button, drag = ?self.drag, "drag started");
    }

    pub fn on_pointer_move(&mut self, position: Vec2) {
        let Some(last) = self.last_pointer else {
            return;
        };
        if !self.enabled || self.drag == Drag::Idle {
            self.last_pointer = Some(position);
            return;
        }
        let delta = position - last;
        self.last_pointer = Some(position);
        match self.drag {
            Drag::Rotate => self.rotate_by_pixels(delta),
            Drag::Dolly => {
                if delta.y > 0.0 {
                    self.dolly_out(self.zoom_scale());
                } else if delta.y < 0.0 {
                    self.dolly_in(self.zoom_scale());
                }
            }
            Drag::Pan => self.pan(delta),
            Drag::Idle => {}
        }
    }

    /// Track the cursor without a button held, so the next drag starts from
    /// the right place.
    pub fn on_pointer_hover(&mut self, position: Vec2) {
        if self.drag == Drag::Idle {
            self.last_pointer = Some(position);
        }
    }

    pub fn on_pointer_up(&mut self, button: PointerButton) {
        let released = match button {
            PointerButton::Primary => Drag::Rotate,
            PointerButton::Middle => Drag::Dolly,
            PointerButton::Secondary => Drag::Pan,
        };
        if self.drag == released {
            self.drag = Drag::Idle;
            tracing::trace!(?button, "drag ended");
        }
    }

    /// Wheel with browser sign convention: negative `delta_y` scrolls up and
    /// moves the camera closer.
    pub fn on_wheel(&mut self, delta_y: f32) {
        if !self.enabled {
            return;
        }
        if delta_y < 0.0 {
            self.dolly_in(self.zoom_scale());
        } else if delta_y > 0.0 {
            self.dolly_out(self.zoom_scale());
        }
    }

    // --- touch events ---

    /// One finger rotates; two fingers pinch to dolly and drag to pan.
    pub fn on_touch_start(&mut self, id: u64, position: Vec2) {
        if !self.enabled {
            return;
        }
        self.touches.insert(id, position);
    }

    pub fn on_touch_move(&mut self, id: u64, position: Vec2) {
        if !self.enabled {
            return;
        }
        let Some(previous) = self.touches.get(&id).copied() else {
            return;
        };
        match self.touches.len() {
            1 => {
                self.touches.insert(id, position);
                self.rotate_by_pixels(position - previous);
            }
            2 => {
                let (old_distance, old_center) = self.touch_pair();
                self.touches.insert(id, position);
                let (new_distance, new_center) = self.touch_pair();
                if old_distance > EPS && new_distance > EPS {
                    self.scale *= old_distance / new_distance;
                }
                self.pan(new_center - old_center);
            }
            _ => {
                self.touches.insert(id, position);
            }
        }
    }

    pub fn on_touch_end(&mut self, id: u64) {
        self.touches.remove(&id);
    }

    fn touch_pair(&self) -> (f32, Vec2) {
        let mut points = self.touches.values();
        match (points.next(), points.next()) {
            (Some(a), Some(b)) => (a.distance(*b), (*a + *b) * 0.5),
            _ => (0.0, Vec2::ZERO),
        }
    }

    // --- per-frame ---

    /// Advance the controller and move `camera`. Call once per frame before
    /// rendering. Returns `true` if the camera or target moved.
    pub fn update(&mut self, camera: &mut PerspectiveCamera) -> bool {
        let old_position = camera.position;
        let old_target = self.target;

        let offset = camera.position - self.target;
        let factor = if self.enable_damping {
            self.damping_factor
        } else {
            1.0
        };

        let mut spherical = Spherical::from_vec(offset);
        spherical.theta += self.spherical_delta.theta * factor;
        spherical.phi += self.spherical_delta.phi * factor;
        // inverted limits pin to the minimum
        spherical.phi = spherical
            .phi
            .min(self.max_polar_angle)
            .max(self.min_polar_angle);
        spherical.make_safe();

        self.resolve_pan(camera, offset.length());
        self.target += self.pan_offset * factor;

        spherical.radius = (spherical.radius * self.scale)
            .min(self.max_distance)
            .max(self.min_distance);

        camera.position = self.target + spherical.to_vec();
        camera.look_at(self.target);

        if self.enable_damping {
            let keep = 1.0 - self.damping_factor;
            self.spherical_delta.theta *= keep;
            self.spherical_delta.phi *= keep;
            self.pan_offset *= keep;
        } else {
            self.spherical_delta = Spherical::default();
            self.pan_offset = Vec3::ZERO;
        }
        self.scale = 1.0;

        camera.position.distance_squared(old_position) > EPS
            || self.target.distance_squared(old_target) > 0.0
    }

    /// Turn pending pixel pan into a world-space offset. One viewport height
    /// of drag moves the target by the visible height at the target depth.
    fn resolve_pan(&mut self, camera: &PerspectiveCamera, target_distance: f32) {
        if self.pending_pan == Vec2::ZERO {
            return;
        }
        let visible = target_distance * (camera.fov_degrees.to_radians() * 0.5).tan();
        let h = self.viewport.y;
        let left = 2.0 * self.pending_pan.x * visible / h;
        let up = 2.0 * self.pending_pan.y * visible / h;
        self.pan_offset += -camera.right() * left + camera.camera_up() * up;
        self.pending_pan = Vec2::ZERO;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera() -> PerspectiveCamera {
        let mut cam = PerspectiveCamera::new(75.0, 16.0 / 9.0, 0.1, 1000.0);
        cam.position = Vec3::new(0.0, 1.5, 3.0);
        cam.look_at(Vec3::ZERO);
        cam
    }

    fn damped() -> OrbitControls {
        OrbitControls {
            enable_damping: true,
            ..OrbitControls::default()
        }
    }

    fn azimuth(cam: &PerspectiveCamera) -> f32 {
        Spherical::from_vec(cam.position).theta
    }

    #[test]
    fn idle_update_keeps_camera() {
        let mut cam = camera();
        let start = cam.position;
        let mut controls = damped();
        assert!(!controls.update(&mut cam));
        assert!(cam.position.abs_diff_eq(start, 1e-5));
        assert_eq!(cam.target, Vec3::ZERO);
    }

    #[test]
    fn undamped_rotation_applies_at_once() {
        let mut cam = camera();
        let mut controls = OrbitControls::default();
        controls.rotate_left(-0.5);
        assert!(controls.update(&mut cam));
        assert!((azimuth(&cam) - 0.5).abs() < 1e-4);
        // nothing pending on the next frame
        assert!(!controls.update(&mut cam));
    }

    #[test]
    fn damped_rotation_eases_in() {
        let mut cam = camera();
        let mut controls = damped();
        controls.rotate_left(-0.5);
        controls.update(&mut cam);
        assert!((azimuth(&cam) - 0.5 * 0.05).abs() < 1e-4);
        for _ in 0..400 {
            controls.update(&mut cam);
        }
        assert!((azimuth(&cam) - 0.5).abs() < 1e-3);
    }

    #[test]
    fn distance_preserved_by_rotation() {
        let mut cam = camera();
        let radius = cam.position.length();
        let mut controls = OrbitControls::default();
        controls.on_pointer_down(PointerButton::Primary, Vec2::new(100.0, 100.0));
        controls.on_pointer_move(Vec2::new(180.0, 140.0));
        controls.on_pointer_up(PointerButton::Primary);
        assert!(!controls.is_dragging());
        controls.update(&mut cam);
        assert!((cam.position.length() - radius).abs() < 1e-4);
    }

    #[test]
    fn wheel_up_moves_closer() {
        let mut cam = camera();
        let radius = cam.position.length();
        let mut controls = damped();
        controls.on_wheel(-100.0);
        controls.update(&mut cam);
        assert!((cam.position.length() - radius * 0.95).abs() < 1e-4);
        controls.on_wheel(100.0);
        controls.update(&mut cam);
        assert!((cam.position.length() - radius).abs() < 1e-4);
    }

    #[test]
    fn distance_limits_clamp_radius() {
        let mut cam = camera();
        let mut controls = OrbitControls {
            min_distance: 2.0,
            max_distance: 4.0,
            ..OrbitControls::default()
        };
        for _ in 0..50 {
            controls.on_wheel(-1.0);
        }
        controls.update(&mut cam);
        assert!((cam.position.length() - 2.0).abs() < 1e-4);
        for _ in 0..50 {
            controls.on_wheel(1.0);
        }
        controls.update(&mut cam);
        assert!((cam.position.length() - 4.0).abs() < 1e-4);
    }

    #[test]
    fn polar_angle_never_reaches_pole() {
        let mut cam = camera();
        let mut controls = OrbitControls::default();
        controls.rotate_up(10.0);
        controls.update(&mut cam);
        // camera ends just off the +Y axis, not on it
        assert!(cam.position.z > 0.0);
        assert!(cam.view_matrix().is_finite());
    }

    #[test]
    fn pan_moves_target_and_camera_together() {
        let mut cam = camera();
        let offset = cam.position - Vec3::ZERO;
        let mut controls = OrbitControls::default();
        controls.on_pointer_down(PointerButton::Secondary, Vec2::ZERO);
        controls.on_pointer_move(Vec2::new(50.0, 0.0));
        assert!(controls.update(&mut cam));
        // dragging right moves the target to the camera's left
        assert!(controls.target.x < 0.0);
        assert!((cam.position - controls.target).abs_diff_eq(offset, 1e-4));
    }

    #[test]
    fn middle_drag_dollies() {
        let mut cam = camera();
        let radius = cam.position.length();
        let mut controls = OrbitControls::default();
        controls.on_pointer_down(PointerButton::Middle, Vec2::ZERO);
        controls.on_pointer_move(Vec2::new(0.0, 10.0));
        controls.update(&mut cam);
        assert!(cam.position.length() > radius);
    }

    #[test]
    fn disabled_ignores_input() {
        let mut cam = camera();
        let start = cam.position;
        let mut controls = OrbitControls {
            enabled: false,
            ..OrbitControls::default()
        };
        controls.on_wheel(-1.0);
        controls.on_pointer_down(PointerButton::Primary, Vec2::ZERO);
        controls.on_pointer_move(Vec2::new(100.0, 0.0));
        controls.update(&mut cam);
        assert!(cam.position.abs_diff_eq(start, 1e-5));
    }

    #[test]
    fn single_touch_rotates_and_pinch_dollies() {
        let mut cam = camera();
        let radius = cam.position.length();
        let mut controls = OrbitControls::default();
        controls.on_touch_start(1, Vec2::new(100.0, 100.0));
        controls.on_touch_move(1, Vec2::new(150.0, 100.0));
        controls.update(&mut cam);
        assert!(azimuth(&cam).abs() > 1e-3);

        controls.on_touch_start(2, Vec2::new(200.0, 100.0));
        // fingers spread apart: zoom in
        controls.on_touch_move(2, Vec2::new(250.0, 100.0));
        controls.on_touch_end(1);
        controls.on_touch_end(2);
        controls.update(&mut cam);
        assert!(cam.position.distance(controls.target) < radius);
    }

    #[test]
    fn inverted_limits_pin_to_minimum() {
        let mut cam = camera();
        let mut controls = OrbitControls {
            min_distance: 5.0,
            max_distance: 2.0,
            min_polar_angle: 1.0,
            max_polar_angle: 0.5,
            ..OrbitControls::default()
        };
        controls.update(&mut cam);
        assert!((cam.position.length() - 5.0).abs() < 1e-4);
        let polar = (cam.position.y / cam.position.length()).acos();
        assert!((polar - 1.0).abs() < 1e-4);
    }
}
