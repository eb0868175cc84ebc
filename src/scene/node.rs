use nalgebra_glm as glm;

use super::camera::Projection;
use super::shape::Shape;

/// Handle of a node inside a [`Scene`](super::Scene). Nodes are never removed,
/// so a handle stays valid for the lifetime of the scene that issued it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) usize);

impl NodeId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Bit set of the 32 pick layers a node belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layers(u32);

impl Layers {
    pub fn only(layer: u8) -> Self {
        Self(1 << (layer & 31))
    }

    pub fn all() -> Self {
        Self(u32::MAX)
    }

    pub fn none() -> Self {
        Self(0)
    }

    pub fn enable(&mut self, layer: u8) {
        self.0 |= 1 << (layer & 31);
    }

    pub fn disable(&mut self, layer: u8) {
        self.0 &= !(1 << (layer & 31));
    }

    pub fn test(&self, other: &Layers) -> bool {
        self.0 & other.0 != 0
    }
}

impl Default for Layers {
    fn default() -> Self {
        Self::only(0)
    }
}

#[derive(Debug, Clone)]
pub struct Node {
    pub name: String,
    pub position: glm::Vec3,
    pub rotation: glm::Quat,
    pub scale: glm::Vec3,
    pub up: glm::Vec3,
    pub layers: Layers,
    pub shape: Option<Shape>,
    pub projection: Option<Projection>,
    pub(super) parent: Option<NodeId>,
    pub(super) children: Vec<NodeId>,
}

impl Node {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            position: glm::vec3(0.0, 0.0, 0.0),
            rotation: glm::quat_identity(),
            scale: glm::vec3(1.0, 1.0, 1.0),
            up: glm::vec3(0.0, 1.0, 0.0),
            layers: Layers::default(),
            shape: None,
            projection: None,
            parent: None,
            children: Vec::new(),
        }
    }

    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = glm::vec3(x, y, z);
        self
    }

    pub fn with_rotation(mut self, rotation: glm::Quat) -> Self {
        self.rotation = rotation;
        self
    }

    pub fn with_shape(mut self, shape: Shape) -> Self {
        self.shape = Some(shape);
        self
    }

    pub fn with_projection(mut self, projection: Projection) -> Self {
        self.projection = Some(projection);
        self
    }

    pub fn with_layers(mut self, layers: Layers) -> Self {
        self.layers = layers;
        self
    }

    pub fn parent(&self) -> Option<NodeId> {
        self.parent
    }

    pub fn children(&self) -> &[NodeId] {
        &self.children
    }

    pub fn is_camera(&self) -> bool {
        self.projection.is_some()
    }

    pub fn local_matrix(&self) -> glm::Mat4 {
        crate::math::compose(&self.position, &self.rotation, &self.scale)
    }
}
