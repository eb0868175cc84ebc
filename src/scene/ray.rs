use nalgebra_glm as glm;

use super::NodeId;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: glm::Vec3,
    /// Unit length.
    pub direction: glm::Vec3,
}

impl Ray {
    pub fn new(origin: glm::Vec3, direction: glm::Vec3) -> Self {
        let direction = if glm::length2(&direction) > 0.0 {
            glm::normalize(&direction)
        } else {
            direction
        };
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> glm::Vec3 {
        self.origin + self.direction * t
    }
}

/// A ray hit. Ordered by `distance` when returned from a query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intersection {
    pub object: NodeId,
    pub point: glm::Vec3,
    pub distance: f32,
    pub normal: Option<glm::Vec3>,
}
