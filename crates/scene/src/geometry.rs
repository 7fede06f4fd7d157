use glam::{Vec2, Vec3};

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    /// Smallest box containing every point, or `None` for an empty iterator.
    pub fn from_points(points: impl IntoIterator<Item = Vec3>) -> Option<Self> {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut aabb = Self {
            min: first,
            max: first,
        };
        for p in iter {
            aabb.min = aabb.min.min(p);
            aabb.max = aabb.max.max(p);
        }
        Some(aabb)
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }
}

/// Indexed triangle geometry.
///
/// `normals` and `uvs` are either empty or one entry per position.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Geometry {
    pub positions: Vec<Vec3>,
    pub normals: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
}

impl Geometry {
    pub fn new(positions: Vec<Vec3>, indices: Vec<u32>) -> Self {
        Self {
            positions,
            indices,
            ..Default::default()
        }
    }

    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn bounding_box(&self) -> Option<Aabb> {
        Aabb::from_points(self.positions.iter().copied())
    }

    pub fn translate(&mut self, offset: Vec3) {
        for p in &mut self.positions {
            *p += offset;
        }
    }

    /// Move the geometry so its bounding-box center sits at the local origin.
    /// Returns the offset that was applied.
    pub fn center(&mut self) -> Vec3 {
        let Some(bounds) = self.bounding_box() else {
            return Vec3::ZERO;
        };
        let offset = -bounds.center();
        self.translate(offset);
        offset
    }

    /// Area-weighted smooth normals from the index buffer.
    pub fn compute_vertex_normals(&mut self) {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0] as usize, tri[1] as usize, tri[2] as usize];
            let (Some(pa), Some(pb), Some(pc)) = (
                self.positions.get(a),
                self.positions.get(b),
                self.positions.get(c),
            ) else {
                continue;
            };
            let face = (*pb - *pa).cross(*pc - *pa);
            normals[a] += face;
            normals[b] += face;
            normals[c] += face;
        }
        self.normals = normals
            .into_iter()
            .map(|n| n.try_normalize().unwrap_or(Vec3::Y))
            .collect();
    }

    /// Indices for non-indexed triangle lists.
    pub fn sequential_indices(vertex_count: usize) -> Vec<u32> {
        (0..vertex_count as u32).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn offset_triangle() -> Geometry {
        Geometry::new(
            vec![
                Vec3::new(2.0, 2.0, 2.0),
                Vec3::new(4.0, 2.0, 2.0),
                Vec3::new(2.0, 6.0, 2.0),
            ],
            vec![0, 1, 2],
        )
    }

    #[test]
    fn bounds_of_points() {
        let g = offset_triangle();
        let b = g.bounding_box().unwrap();
        assert_eq!(b.min, Vec3::new(2.0, 2.0, 2.0));
        assert_eq!(b.max, Vec3::new(4.0, 6.0, 2.0));
        assert_eq!(b.center(), Vec3::new(3.0, 4.0, 2.0));
    }

    #[test]
    fn center_moves_bbox_center_to_origin() {
        let mut g = offset_triangle();
        let offset = g.center();
        assert_eq!(offset, Vec3::new(-3.0, -4.0, -2.0));
        assert_eq!(g.bounding_box().unwrap().center(), Vec3::ZERO);
        // size is preserved
        assert_eq!(g.bounding_box().unwrap().size(), Vec3::new(2.0, 4.0, 0.0));
    }

    #[test]
    fn center_empty_is_noop() {
        let mut g = Geometry::default();
        assert_eq!(g.center(), Vec3::ZERO);
        assert!(g.bounding_box().is_none());
    }

    #[test]
    fn vertex_normals_face_up_for_flat_quad() {
        let mut g = Geometry::new(
            vec![
                Vec3::new(0.0, 0.0, 0.0),
                Vec3::new(0.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 1.0),
                Vec3::new(1.0, 0.0, 0.0),
            ],
            vec![0, 1, 2, 2, 3, 0],
        );
        g.compute_vertex_normals();
        assert_eq!(g.normals.len(), 4);
        for n in &g.normals {
            assert!(n.abs_diff_eq(Vec3::Y, 1e-6));
        }
    }

    #[test]
    fn union_covers_both() {
        let a = Aabb::from_points([Vec3::ZERO, Vec3::ONE]).unwrap();
        let b = Aabb::from_points([Vec3::splat(-1.0)]).unwrap();
        let u = a.union(&b);
        assert_eq!(u.min, Vec3::splat(-1.0));
        assert_eq!(u.max, Vec3::ONE);
    }
}
