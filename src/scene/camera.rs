use nalgebra_glm as glm;

use super::{NodeId, Scene};
use crate::error::SceneError;
use crate::math;

/// Projection carried by camera nodes. Angles are in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Projection {
    Perspective {
        fov_y: f32,
        aspect: f32,
        near: f32,
        far: f32,
    },
    Orthographic {
        left: f32,
        right: f32,
        top: f32,
        bottom: f32,
        near: f32,
        far: f32,
    },
}

impl Projection {
    pub fn perspective(fov_y: f32, aspect: f32, near: f32, far: f32) -> Self {
        Projection::Perspective {
            fov_y,
            aspect,
            near,
            far,
        }
    }

    pub fn orthographic(half_width: f32, half_height: f32, near: f32, far: f32) -> Self {
        Projection::Orthographic {
            left: -half_width,
            right: half_width,
            top: half_height,
            bottom: -half_height,
            near,
            far,
        }
    }

    pub fn near(&self) -> f32 {
        match *self {
            Projection::Perspective { near, .. } | Projection::Orthographic { near, .. } => near,
        }
    }

    pub fn far(&self) -> f32 {
        match *self {
            Projection::Perspective { far, .. } | Projection::Orthographic { far, .. } => far,
        }
    }

    /// Update the aspect ratio after the viewport changed size.
    pub fn set_aspect(&mut self, new_aspect: f32) {
        match self {
            Projection::Perspective { aspect, .. } => *aspect = new_aspect,
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
                ..
            } => {
                let half_height = (*top - *bottom) * 0.5;
                let center = (*left + *right) * 0.5;
                *left = center - half_height * new_aspect;
                *right = center + half_height * new_aspect;
            }
        }
    }

    pub fn matrix(&self) -> glm::Mat4 {
        match *self {
            Projection::Perspective {
                fov_y,
                aspect,
                near,
                far,
            } => glm::perspective(aspect, fov_y.to_radians(), near, far),
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
                near,
                far,
            } => glm::ortho(left, right, bottom, top, near, far),
        }
    }
}

impl Scene {
    pub fn projection(&self, camera: NodeId) -> Result<&Projection, SceneError> {
        self.node(camera)?
            .projection
            .as_ref()
            .ok_or(SceneError::NotACamera(camera))
    }

    pub fn view_matrix(&self, camera: NodeId) -> Result<glm::Mat4, SceneError> {
        Ok(glm::inverse(&self.world_matrix(camera)?))
    }

    /// World point to normalized device coordinates.
    pub fn project(&self, camera: NodeId, point: &glm::Vec3) -> Result<glm::Vec3, SceneError> {
        let clip = self.projection(camera)?.matrix() * self.view_matrix(camera)?;
        Ok(math::transform_point(&clip, point))
    }

    /// Normalized device coordinates to a world point.
    pub fn unproject(&self, camera: NodeId, ndc: &glm::Vec3) -> Result<glm::Vec3, SceneError> {
        let inverse_projection = glm::inverse(&self.projection(camera)?.matrix());
        let world = self.world_matrix(camera)?;
        Ok(math::transform_point(&(world * inverse_projection), ndc))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;

    fn scene_with_camera(projection: Projection) -> (Scene, NodeId) {
        let mut scene = Scene::new();
        let camera = scene.add_to_root(
            Node::new("camera")
                .with_position(0.0, 3.31, 8.25)
                .with_projection(projection),
        );
        scene.look_at(camera, &glm::vec3(0.0, 1.5, 0.0)).unwrap();
        (scene, camera)
    }

    #[test]
    fn project_inverts_unproject() {
        for projection in [
            Projection::perspective(65.0, 1.5, 0.01, 1000.0),
            Projection::orthographic(4.0, 3.0, 0.1, 100.0),
        ] {
            let (scene, camera) = scene_with_camera(projection);
            let ndc = glm::vec3(0.25, -0.4, 0.3);
            let world = scene.unproject(camera, &ndc).unwrap();
            let back = scene.project(camera, &world).unwrap();
            assert!(glm::distance(&ndc, &back) < 1e-3, "{projection:?}: {back:?}");
        }
    }

    #[test]
    fn look_target_projects_to_center() {
        let (scene, camera) = scene_with_camera(Projection::perspective(65.0, 1.0, 0.01, 1000.0));
        let ndc = scene.project(camera, &glm::vec3(0.0, 1.5, 0.0)).unwrap();
        assert!(ndc.x.abs() < 1e-4 && ndc.y.abs() < 1e-4);
    }

    #[test]
    fn non_camera_has_no_projection() {
        let mut scene = Scene::new();
        let plain = scene.add_to_root(Node::new("box"));
        assert_eq!(scene.projection(plain), Err(SceneError::NotACamera(plain)));
    }

    #[test]
    fn set_aspect_keeps_orthographic_height() {
        let mut projection = Projection::orthographic(2.0, 2.0, 0.1, 10.0);
        projection.set_aspect(2.0);
        match projection {
            Projection::Orthographic {
                left,
                right,
                top,
                bottom,
                ..
            } => {
                assert_eq!((left, right), (-4.0, 4.0));
                assert_eq!((top, bottom), (2.0, -2.0));
            }
            _ => unreachable!(),
        }
    }
}
