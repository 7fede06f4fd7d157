use crate::geometry::{Aabb, Geometry};
use duckview_common::{NodeId, Transform};
use glam::Mat4;
use image::RgbaImage;

/// Surface parameters of a mesh.
#[derive(Debug, Clone)]
pub struct Material {
    pub name: Option<String>,
    /// Linear RGBA factor, multiplied with the texture when present.
    pub base_color: [f32; 4],
    /// Decoded sRGB base color texture.
    pub base_color_texture: Option<RgbaImage>,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            name: None,
            base_color: [1.0, 1.0, 1.0, 1.0],
            base_color_texture: None,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Mesh {
    pub geometry: Geometry,
    pub material: Material,
}

/// A node in a model hierarchy.
#[derive(Debug, Clone, Default)]
pub struct Node {
    pub id: NodeId,
    pub name: Option<String>,
    pub transform: Transform,
    pub mesh: Option<Mesh>,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn with_mesh(mut self, mesh: Mesh) -> Self {
        self.mesh = Some(mesh);
        self
    }

    pub fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    pub fn add_child(&mut self, child: Node) -> NodeId {
        let id = child.id;
        self.children.push(child);
        id
    }

    pub fn display_name(&self) -> String {
        self.name.clone().unwrap_or_else(|| self.id.short())
    }

    /// Depth-first, parent before children.
    pub fn traverse(&self, f: &mut impl FnMut(&Node)) {
        f(self);
        for child in &self.children {
            child.traverse(f);
        }
    }

    pub fn traverse_mut(&mut self, f: &mut impl FnMut(&mut Node)) {
        f(self);
        for child in &mut self.children {
            child.traverse_mut(f);
        }
    }

    /// Visit every mesh with its world matrix, given the parent's world matrix.
    pub fn visit_meshes(&self, parent: Mat4, f: &mut impl FnMut(&Node, &Mesh, Mat4)) {
        let world = parent * self.transform.matrix();
        if let Some(mesh) = &self.mesh {
            f(self, mesh, world);
        }
        for child in &self.children {
            child.visit_meshes(world, f);
        }
    }

    pub fn mesh_count(&self) -> usize {
        let mut count = 0;
        self.traverse(&mut |n| {
            if n.mesh.is_some() {
                count += 1;
            }
        });
        count
    }

    /// Recenter every mesh's geometry on its own bounding box.
    /// Returns the number of meshes touched.
    pub fn center_meshes(&mut self) -> usize {
        let mut count = 0;
        self.traverse_mut(&mut |n| {
            if let Some(mesh) = &mut n.mesh {
                let offset = mesh.geometry.center();
                tracing::trace!(node = %n.id.short(), ?offset, "recentered mesh");
                count += 1;
            }
        });
        count
    }

    /// World-space bounds of all meshes under this node.
    pub fn world_bounds(&self) -> Option<Aabb> {
        let mut bounds: Option<Aabb> = None;
        self.visit_meshes(Mat4::IDENTITY, &mut |_, mesh, world| {
            let local = Aabb::from_points(
                mesh.geometry
                    .positions
                    .iter()
                    .map(|p| world.transform_point3(*p)),
            );
            bounds = match (bounds, local) {
                (Some(a), Some(b)) => Some(a.union(&b)),
                (a, b) => a.or(b),
            };
        });
        bounds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec3;

    fn mesh_at(offset: Vec3) -> Mesh {
        Mesh {
            geometry: Geometry::new(
                vec![offset, offset + Vec3::X, offset + Vec3::Y],
                vec![0, 1, 2],
            ),
            material: Material::default(),
        }
    }

    fn two_mesh_model() -> Node {
        let mut root = Node::named("root");
        let mut body = Node::named("body").with_mesh(mesh_at(Vec3::new(5.0, 0.0, 0.0)));
        body.add_child(Node::named("eye").with_mesh(mesh_at(Vec3::new(0.0, 3.0, -2.0))));
        root.add_child(body);
        root.add_child(Node::named("empty"));
        root
    }

    #[test]
    fn traverse_visits_parent_first() {
        let root = two_mesh_model();
        let mut names = Vec::new();
        root.traverse(&mut |n| names.push(n.display_name()));
        assert_eq!(names, vec!["root", "body", "eye", "empty"]);
    }

    #[test]
    fn mesh_count_counts_nested() {
        assert_eq!(two_mesh_model().mesh_count(), 2);
    }

    #[test]
    fn center_meshes_is_per_mesh() {
        let mut root = two_mesh_model();
        assert_eq!(root.center_meshes(), 2);
        root.traverse(&mut |n| {
            if let Some(mesh) = &n.mesh {
                let c = mesh.geometry.bounding_box().unwrap().center();
                assert!(c.abs_diff_eq(Vec3::ZERO, 1e-6), "{} not centered", n.display_name());
            }
        });
    }

    #[test]
    fn visit_meshes_composes_transforms() {
        let mut root = Node::new().with_transform(Transform::from_position(Vec3::X));
        root.add_child(
            Node::new()
                .with_transform(Transform::from_position(Vec3::Y))
                .with_mesh(mesh_at(Vec3::ZERO)),
        );
        let mut seen = Vec::new();
        root.visit_meshes(Mat4::IDENTITY, &mut |_, _, world| {
            seen.push(world.transform_point3(Vec3::ZERO));
        });
        assert_eq!(seen, vec![Vec3::new(1.0, 1.0, 0.0)]);
    }

    #[test]
    fn world_bounds_spans_meshes() {
        let b = two_mesh_model().world_bounds().unwrap();
        assert_eq!(b.min, Vec3::new(0.0, 0.0, -2.0));
        assert_eq!(b.max, Vec3::new(6.0, 4.0, 0.0));
    }
}
