use glam::Vec3;

/// Spherical coordinates around +Y: `theta` is the azimuth measured from +Z
/// toward +X, `phi` the polar angle from +Y.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Spherical {
    pub radius: f32,
    pub theta: f32,
    pub phi: f32,
}

impl Spherical {
    const EPS: f32 = 1e-6;

    pub fn from_vec(v: Vec3) -> Self {
        let radius = v.length();
        if radius == 0.0 {
            return Self::default();
        }
        Self {
            radius,
            theta: v.x.atan2(v.z),
            phi: (v.y / radius).clamp(-1.0, 1.0).acos(),
        }
    }

    pub fn to_vec(self) -> Vec3 {
        let sin_phi_radius = self.phi.sin() * self.radius;
        Vec3::new(
            sin_phi_radius * self.theta.sin(),
            self.phi.cos() * self.radius,
            sin_phi_radius * self.theta.cos(),
        )
    }

    /// Keep `phi` off the poles so the view basis stays defined.
    pub fn make_safe(&mut self) {
        self.phi = self.phi.clamp(Self::EPS, std::f32::consts::PI - Self::EPS);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_offset() {
        let v = Vec3::new(0.0, 1.5, 3.0);
        let back = Spherical::from_vec(v).to_vec();
        assert!(back.abs_diff_eq(v, 1e-5));
    }

    #[test]
    fn axes() {
        let s = Spherical::from_vec(Vec3::Z * 2.0);
        assert_eq!(s.radius, 2.0);
        assert!(s.theta.abs() < 1e-6);
        assert!((s.phi - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn make_safe_leaves_pole() {
        let mut s = Spherical::from_vec(Vec3::Y);
        assert_eq!(s.phi, 0.0);
        s.make_safe();
        assert!(s.phi > 0.0);
    }
}
