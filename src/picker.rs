//! Pointer picking: turns a pointer event into a world ray and ranks the
//! scene hits along it.

use nalgebra_glm as glm;

use crate::error::SceneError;
use crate::input::PointerEvent;
use crate::scene::{Intersection, Layers, NodeId, Ray, Scene};

pub struct Picker {
    /// Only nodes sharing one of these layers are tested.
    pub layers: Layers,
    /// Hits closer than this are dropped.
    pub near: f32,
    /// Hits farther than this are dropped.
    pub far: f32,
    pointer: glm::Vec2,
    intersects: Vec<Intersection>,
}

impl Default for Picker {
    fn default() -> Self {
        Self::new(0)
    }
}

impl Picker {
    pub fn new(layer: u8) -> Self {
        Self {
            layers: Layers::only(layer),
            near: 0.0,
            far: f32::INFINITY,
            pointer: glm::vec2(0.0, 0.0),
            intersects: Vec::new(),
        }
    }

    /// Normalized device coordinates of the last pointer passed to `compute_ray`.
    pub fn pointer_ndc(&self) -> glm::Vec2 {
        self.pointer
    }

    /// Ray through the pointer position. The origin lies on the camera's near
    /// plane, the direction points at the matching far-plane point.
    pub fn compute_ray(
        &mut self,
        event: &PointerEvent,
        scene: &Scene,
        camera: NodeId,
    ) -> Result<Ray, SceneError> {
        self.pointer = client_to_ndc(
            event.client_x,
            event.client_y,
            event.target_width,
            event.target_height,
        );
        self.ray_through(scene, camera)
    }

    /// Ray through the middle of the view.
    pub fn compute_center_ray(&mut self, scene: &Scene, camera: NodeId) -> Result<Ray, SceneError> {
        self.pointer = glm::vec2(0.0, 0.0);
        self.ray_through(scene, camera)
    }

    fn ray_through(&mut self, scene: &Scene, camera: NodeId) -> Result<Ray, SceneError> {
        let origin = scene.unproject(camera, &glm::vec3(self.pointer.x, self.pointer.y, -1.0))?;
        let far = scene.unproject(camera, &glm::vec3(self.pointer.x, self.pointer.y, 1.0))?;
        Ok(Ray::new(origin, far - origin))
    }

    /// All hits against `candidates` and their descendants, nearest first.
    ///
    /// The slice borrows the picker's scratch buffer and is overwritten by the
    /// next query.
    pub fn query_all(
        &mut self,
        ray: &Ray,
        scene: &Scene,
        candidates: &[NodeId],
    ) -> Result<&[Intersection], SceneError> {
        self.intersects.clear();
        scene.intersect(ray, candidates, &self.layers, &mut self.intersects)?;
        let (near, far) = (self.near, self.far);
        self.intersects
            .retain(|hit| hit.distance.is_finite() && hit.distance >= near && hit.distance <= far);
        self.intersects
            .sort_by(|a, b| a.distance.total_cmp(&b.distance));
        Ok(&self.intersects)
    }

    /// The nearest hit accepted by `accept`, or the nearest hit when no
    /// predicate is given.
    pub fn query_nearest(
        &mut self,
        ray: &Ray,
        scene: &Scene,
        candidates: &[NodeId],
        accept: Option<&dyn Fn(&Intersection) -> bool>,
    ) -> Result<Option<Intersection>, SceneError> {
        let hits = self.query_all(ray, scene, candidates)?;
        Ok(match accept {
            Some(accept) => hits.iter().find(|hit| accept(hit)).copied(),
            None => hits.first().copied(),
        })
    }
}

/// Client pixel position to normalized device coordinates. A zero-sized target
/// maps to the view centre instead of producing non-finite values.
fn client_to_ndc(x: f32, y: f32, width: f32, height: f32) -> glm::Vec2 {
    let nx = (x / width) * 2.0 - 1.0;
    let ny = -(y / height) * 2.0 + 1.0;
    glm::vec2(
        if nx.is_finite() { nx } else { 0.0 },
        if ny.is_finite() { ny } else { 0.0 },
    )
}
