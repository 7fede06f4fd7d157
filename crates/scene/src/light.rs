use duckview_common::Color;
use glam::{Mat4, Vec3};

/// Sky/ground gradient fill. Surfaces facing up receive `sky`, facing down `ground`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HemisphereLight {
    pub sky: Color,
    pub ground: Color,
    pub intensity: f32,
}

/// Orthographic shadow projection of a directional light.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalShadow {
    /// Square shadow map resolution in texels.
    pub map_size: u32,
    pub left: f32,
    pub right: f32,
    pub top: f32,
    pub bottom: f32,
    pub near: f32,
    pub far: f32,
    /// Added to the receiver depth before the comparison. Negative values
    /// pull receivers toward the light.
    pub bias: f32,
}

impl Default for DirectionalShadow {
    fn default() -> Self {
        Self {
            map_size: 1024,
            left: -10.0,
            right: 10.0,
            top: 10.0,
            bottom: -10.0,
            near: 0.5,
            far: 50.0,
            bias: -0.001,
        }
    }
}

impl DirectionalShadow {
    pub fn projection(&self) -> Mat4 {
        Mat4::orthographic_rh(
            self.left,
            self.right,
            self.bottom,
            self.top,
            self.near,
            self.far,
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirectionalLight {
    pub color: Color,
    pub intensity: f32,
    pub position: Vec3,
    pub target: Vec3,
    pub shadow: Option<DirectionalShadow>,
}

impl DirectionalLight {
    /// Unit vector the light travels along.
    pub fn direction(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, Vec3::Y)
    }

    /// Light-space matrix for the shadow pass, if the light casts shadows.
    pub fn shadow_view_projection(&self) -> Option<Mat4> {
        self.shadow
            .map(|shadow| shadow.projection() * self.view_matrix())
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AmbientLight {
    pub color: Color,
    pub intensity: f32,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Light {
    Hemisphere(HemisphereLight),
    Directional(DirectionalLight),
    Ambient(AmbientLight),
}

impl Light {
    pub fn kind(&self) -> &'static str {
        match self {
            Light::Hemisphere(_) => "hemisphere",
            Light::Directional(_) => "directional",
            Light::Ambient(_) => "ambient",
        }
    }
}

/// The three-light studio setup: hemisphere fill, one shadow-casting key
/// light, flat ambient.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LightRig {
    pub hemisphere: HemisphereLight,
    pub directional: DirectionalLight,
    pub ambient: AmbientLight,
}

impl Default for LightRig {
    fn default() -> Self {
        Self {
            hemisphere: HemisphereLight {
                sky: Color::from_hex(0xe0f2f7),
                ground: Color::from_hex(0xa0c0d0),
                intensity: 0.9,
            },
            directional: DirectionalLight {
                color: Color::WHITE,
                intensity: 1.5,
                position: Vec3::new(5.0, 10.0, 7.5),
                target: Vec3::ZERO,
                shadow: Some(DirectionalShadow::default()),
            },
            ambient: AmbientLight {
                color: Color::WHITE,
                intensity: 0.4,
            },
        }
    }
}

impl LightRig {
    /// Lights in installation order.
    pub fn lights(&self) -> [Light; 3] {
        [
            Light::Hemisphere(self.hemisphere),
            Light::Directional(self.directional),
            Light::Ambient(self.ambient),
        ]
    }
}
