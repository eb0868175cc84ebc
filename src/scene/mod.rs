//! Arena scene graph consumed by the picker and the view controller.
//!
//! Nodes hold a local translation/rotation/scale and link to one parent. The
//! root node is created with the scene and is the only node without a parent.

pub mod camera;
pub mod demo;
pub mod node;
pub mod ray;
pub mod shape;

pub use camera::Projection;
pub use node::{Layers, Node, NodeId};
pub use ray::{Intersection, Ray};
pub use shape::Shape;

use nalgebra_glm as glm;

use crate::error::SceneError;
use crate::math;

#[derive(Debug, Clone)]
pub struct Scene {
    nodes: Vec<Node>,
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}

impl Scene {
    pub fn new() -> Self {
        Self {
            nodes: vec![Node::new("scene")],
        }
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        id.0 < self.nodes.len()
    }

    pub fn node(&self, id: NodeId) -> Result<&Node, SceneError> {
        self.nodes.get(id.0).ok_or(SceneError::UnknownNode(id))
    }

    pub fn node_mut(&mut self, id: NodeId) -> Result<&mut Node, SceneError> {
        self.nodes.get_mut(id.0).ok_or(SceneError::UnknownNode(id))
    }

    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        self.nodes.iter().position(|n| n.name == name).map(NodeId)
    }

    pub fn add(&mut self, parent: NodeId, mut node: Node) -> Result<NodeId, SceneError> {
        if !self.contains(parent) {
            return Err(SceneError::UnknownNode(parent));
        }
        let id = NodeId(self.nodes.len());
        node.parent = Some(parent);
        node.children.clear();
        self.nodes.push(node);
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    pub fn add_to_root(&mut self, node: Node) -> NodeId {
        let id = NodeId(self.nodes.len());
        let mut node = node;
        node.parent = Some(self.root());
        node.children.clear();
        self.nodes.push(node);
        self.nodes[0].children.push(id);
        id
    }

    pub fn parent(&self, id: NodeId) -> Result<Option<NodeId>, SceneError> {
        Ok(self.node(id)?.parent)
    }

    pub fn children(&self, id: NodeId) -> Result<&[NodeId], SceneError> {
        Ok(&self.node(id)?.children)
    }

    /// True when `ancestor` is `id` itself or lies on the path from `id` to the root.
    pub fn is_ancestor(&self, ancestor: NodeId, id: NodeId) -> Result<bool, SceneError> {
        let mut cursor = Some(id);
        while let Some(current) = cursor {
            if current == ancestor {
                return Ok(true);
            }
            cursor = self.node(current)?.parent;
        }
        Ok(false)
    }

    pub fn world_matrix(&self, id: NodeId) -> Result<glm::Mat4, SceneError> {
        let node = self.node(id)?;
        let local = node.local_matrix();
        match node.parent {
            Some(parent) => Ok(self.world_matrix(parent)? * local),
            None => Ok(local),
        }
    }

    pub fn world_position(&self, id: NodeId) -> Result<glm::Vec3, SceneError> {
        let m = self.world_matrix(id)?;
        Ok(glm::vec3(m[(0, 3)], m[(1, 3)], m[(2, 3)]))
    }

    pub fn world_rotation(&self, id: NodeId) -> Result<glm::Quat, SceneError> {
        Ok(math::decompose(&self.world_matrix(id)?).1)
    }

    /// Re-parents `child` under `parent` keeping its world transform.
    ///
    /// The old link is removed and the new one added in a single call, so the
    /// child is never observable without a parent.
    pub fn attach(&mut self, parent: NodeId, child: NodeId) -> Result<(), SceneError> {
        if child == self.root() {
            return Err(SceneError::RootAttach);
        }
        self.node(child)?;
        if self.is_ancestor(child, parent)? {
            return Err(SceneError::Cycle { parent, child });
        }

        let parent_world = self.world_matrix(parent)?;
        let child_world = self.world_matrix(child)?;
        let (position, rotation, scale) =
            math::decompose(&(glm::inverse(&parent_world) * child_world));

        if let Some(old) = self.nodes[child.0].parent {
            self.nodes[old.0].children.retain(|c| *c != child);
        }
        self.nodes[parent.0].children.push(child);

        let node = &mut self.nodes[child.0];
        node.parent = Some(parent);
        node.position = position;
        node.rotation = rotation;
        node.scale = scale;
        Ok(())
    }

    /// Turns the node toward a world-space point.
    ///
    /// Cameras point their -Z axis at the target, other nodes their +Z axis.
    pub fn look_at(&mut self, id: NodeId, target: &glm::Vec3) -> Result<(), SceneError> {
        let eye = self.world_position(id)?;
        let node = self.node(id)?;
        let mut rotation = if node.is_camera() {
            math::look_at_quat(&eye, target, &node.up)
        } else {
            math::look_at_quat(target, &eye, &node.up)
        };
        if let Some(parent) = node.parent {
            let parent_rotation = self.world_rotation(parent)?;
            rotation = glm::quat_normalize(&(glm::quat_inverse(&parent_rotation) * rotation));
        }
        self.node_mut(id)?.rotation = rotation;
        Ok(())
    }

    /// Rotates around an axis expressed in the node's own frame.
    pub fn rotate_on_axis(
        &mut self,
        id: NodeId,
        axis: &glm::Vec3,
        angle: f32,
    ) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        let turn = glm::quat_angle_axis(angle, axis);
        node.rotation = glm::quat_normalize(&(node.rotation * turn));
        Ok(())
    }

    /// Rotates around an axis expressed in the parent's frame.
    pub fn rotate_on_world_axis(
        &mut self,
        id: NodeId,
        axis: &glm::Vec3,
        angle: f32,
    ) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        let turn = glm::quat_angle_axis(angle, axis);
        node.rotation = glm::quat_normalize(&(turn * node.rotation));
        Ok(())
    }

    /// Moves the node along one of its own axes.
    pub fn translate_on_axis(
        &mut self,
        id: NodeId,
        axis: &glm::Vec3,
        distance: f32,
    ) -> Result<(), SceneError> {
        let node = self.node_mut(id)?;
        let offset = glm::quat_rotate_vec3(&node.rotation, axis) * distance;
        node.position += offset;
        Ok(())
    }

    /// Collects every hit of `ray` against the shapes of `roots` and their
    /// descendants whose layers overlap `layers`. Results are appended unsorted.
    pub fn intersect(
        &self,
        ray: &Ray,
        roots: &[NodeId],
        layers: &Layers,
        out: &mut Vec<Intersection>,
    ) -> Result<(), SceneError> {
        for &root in roots {
            self.intersect_node(ray, root, layers, out)?;
        }
        Ok(())
    }

    fn intersect_node(
        &self,
        ray: &Ray,
        id: NodeId,
        layers: &Layers,
        out: &mut Vec<Intersection>,
    ) -> Result<(), SceneError> {
        let node = self.node(id)?;
        if let Some(shape) = node.shape.filter(|_| layers.test(&node.layers)) {
            let world = self.world_matrix(id)?;
            let inverse = glm::inverse(&world);
            let origin = math::transform_point(&inverse, &ray.origin);
            let direction = math::transform_vector(&inverse, &ray.direction);
            if let Some((t, local_normal)) = shape.intersect_local(&origin, &direction) {
                let normal_matrix = glm::transpose(&glm::mat4_to_mat3(&inverse));
                let normal = normal_matrix * local_normal;
                out.push(Intersection {
                    object: id,
                    point: ray.at(t),
                    distance: t,
                    normal: (glm::length2(&normal) > 0.0).then(|| glm::normalize(&normal)),
                });
            }
        }
        for &child in &node.children {
            self.intersect_node(ray, child, layers, out)?;
        }
        Ok(())
    }
}
