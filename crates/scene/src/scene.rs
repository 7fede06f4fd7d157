use crate::background::Background;
use crate::light::{DirectionalLight, Light};
use crate::node::Node;
use duckview_common::NodeId;

/// A top-level object owned by the scene.
#[derive(Debug, Clone)]
pub enum SceneObject {
    Light(Light),
    Model(Node),
}

/// Container for everything a frame is drawn from.
///
/// Objects keep their insertion order; ids are stable until removal.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    objects: Vec<(NodeId, SceneObject)>,
    pub background: Option<Background>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an object and return its id. Model roots keep their own node id.
    pub fn add(&mut self, object: SceneObject) -> NodeId {
        let id = match &object {
            SceneObject::Model(node) => node.id,
            SceneObject::Light(_) => NodeId::new(),
        };
        match &object {
            SceneObject::Light(light) => {
                tracing::debug!(id = %id.short(), kind = light.kind(), "light added")
            }
            SceneObject::Model(node) => tracing::debug!(
                id = %id.short(),
                meshes = node.mesh_count(),
                "model added"
            ),
        }
        self.objects.push((id, object));
        id
    }

    pub fn add_light(&mut self, light: Light) -> NodeId {
        self.add(SceneObject::Light(light))
    }

    pub fn add_model(&mut self, root: Node) -> NodeId {
        self.add(SceneObject::Model(root))
    }

    pub fn remove(&mut self, id: NodeId) -> Option<SceneObject> {
        let index = self.objects.iter().position(|(oid, _)| *oid == id)?;
        Some(self.objects.remove(index).1)
    }

    pub fn get(&self, id: NodeId) -> Option<&SceneObject> {
        self.objects
            .iter()
            .find(|(oid, _)| *oid == id)
            .map(|(_, obj)| obj)
    }

    /// Number of top-level objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn objects(&self) -> impl Iterator<Item = (NodeId, &SceneObject)> {
        self.objects.iter().map(|(id, obj)| (*id, obj))
    }

    pub fn lights(&self) -> impl Iterator<Item = &Light> {
        self.objects.iter().filter_map(|(_, obj)| match obj {
            SceneObject::Light(light) => Some(light),
            SceneObject::Model(_) => None,
        })
    }

    pub fn models(&self) -> impl Iterator<Item = &Node> {
        self.objects.iter().filter_map(|(_, obj)| match obj {
            SceneObject::Model(node) => Some(node),
            SceneObject::Light(_) => None,
        })
    }

    /// First directional light that casts shadows.
    pub fn shadow_caster(&self) -> Option<&DirectionalLight> {
        self.lights().find_map(|light| match light {
            Light::Directional(d) if d.shadow.is_some() => Some(d),
            _ => None,
        })
    }
}
