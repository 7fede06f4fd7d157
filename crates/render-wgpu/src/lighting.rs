use bytemuck::{Pod, Zeroable};
use duckview_scene::{Light, PerspectiveCamera, Scene};
use glam::{Mat4, Vec3};

/// Per-frame uniforms shared by the mesh and shadow shaders.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub(crate) struct Globals {
    pub view_proj: [[f32; 4]; 4],
    pub light_view_proj: [[f32; 4]; 4],
    pub sky_color: [f32; 4],
    pub ground_color: [f32; 4],
    pub ambient_color: [f32; 4],
    pub key_color: [f32; 4],
    pub key_direction: [f32; 4],
    pub shadow_params: [f32; 4],
}

fn scaled(rgb: [f32; 3], intensity: f32) -> [f32; 4] {
    [rgb[0] * intensity, rgb[1] * intensity, rgb[2] * intensity, 1.0]
}

impl Globals {
    /// Fold the scene's lights into uniform form. Lights of the same kind
    /// add up; only the first shadow-casting directional light gets a
    /// shadow map.
    pub fn collect(scene: &Scene, camera: &PerspectiveCamera) -> Self {
        let mut globals = Self {
            view_proj: camera.view_projection().to_cols_array_2d(),
            light_view_proj: Mat4::IDENTITY.to_cols_array_2d(),
            sky_color: [0.0; 4],
            ground_color: [0.0; 4],
            ambient_color: [0.0; 4],
            key_color: [0.0; 4],
            key_direction: [0.0, 1.0, 0.0, 0.0],
            shadow_params: [0.0; 4],
        };

        let mut key_seen = false;
        for light in scene.lights() {
            match light {
                Light::Hemisphere(h) => {
                    add(&mut globals.sky_color, scaled(h.sky.to_linear(), h.intensity));
                    add(
                        &mut globals.ground_color,
                        scaled(h.ground.to_linear(), h.intensity),
                    );
                }
                Light::Ambient(a) => {
                    add(&mut globals.ambient_color, scaled(a.color.to_linear(), a.intensity));
                }
                Light::Directional(d) if !key_seen => {
                    key_seen = true;
                    globals.key_color = scaled(d.color.to_linear(), d.intensity);
                    let toward = -d.direction();
                    let toward = if toward == Vec3::ZERO { Vec3::Y } else { toward };
                    globals.key_direction = toward.extend(0.0).to_array();
                }
                Light::Directional(_) => {
                    tracing::debug!("extra directional light ignored");
                }
            }
        }

        if let Some(caster) = scene.shadow_caster() {
            if let (Some(shadow), Some(matrix)) = (caster.shadow, caster.shadow_view_projection()) {
                globals.light_view_proj = matrix.to_cols_array_2d();
                globals.key_direction[3] = 1.0;
                globals.shadow_params = [
                    shadow.bias,
                    1.0 / shadow.map_size.max(1) as f32,
                    0.0,
                    0.0,
                ];
            }
        }

        globals
    }

    pub fn shadows_enabled(&self) -> bool {
        self.key_direction[3] > 0.5
    }
}

fn add(acc: &mut [f32; 4], value: [f32; 4]) {
    for (a, v) in acc.iter_mut().zip(value).take(3) {
        *a += v;
    }
    acc[3] = 1.0;
}
