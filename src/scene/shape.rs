// Local-space ray tests for the primitive shapes a node can carry.
// Every test takes the ray in the node's local frame with an unnormalized
// direction and returns the ray parameter of the hit plus the local normal.

use nalgebra_glm as glm;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Shape {
    /// Axis-aligned box centred on the node origin.
    Cuboid { size: glm::Vec3 },
    /// Rectangle in the local XY plane facing +Z.
    Plane { width: f32, height: f32 },
    Sphere { radius: f32 },
}

impl Shape {
    pub fn cuboid(x: f32, y: f32, z: f32) -> Self {
        Shape::Cuboid {
            size: glm::vec3(x, y, z),
        }
    }

    pub fn plane(width: f32, height: f32) -> Self {
        Shape::Plane { width, height }
    }

    pub fn sphere(radius: f32) -> Self {
        Shape::Sphere { radius }
    }

    pub fn intersect_local(
        &self,
        origin: &glm::Vec3,
        direction: &glm::Vec3,
    ) -> Option<(f32, glm::Vec3)> {
        match *self {
            Shape::Cuboid { size } => {
                let half = size * 0.5;
                ray_aabb_hit(origin, direction, &-half, &half)
            }
            Shape::Plane { width, height } => {
                if direction.z == 0.0 {
                    return None;
                }
                let t = -origin.z / direction.z;
                if t < 0.0 {
                    return None;
                }
                let p = origin + direction * t;
                if p.x.abs() > width * 0.5 || p.y.abs() > height * 0.5 {
                    return None;
                }
                Some((t, glm::vec3(0.0, 0.0, 1.0)))
            }
            Shape::Sphere { radius } => {
                let a = glm::dot(direction, direction);
                if a == 0.0 {
                    return None;
                }
                let b = glm::dot(origin, direction);
                let c = glm::dot(origin, origin) - radius * radius;
                let disc = b * b - a * c;
                if disc < 0.0 {
                    return None;
                }
                let root = disc.sqrt();
                let near = (-b - root) / a;
                let far = (-b + root) / a;
                let t = if near >= 0.0 {
                    near
                } else if far >= 0.0 {
                    far
                } else {
                    return None;
                };
                let p = origin + direction * t;
                Some((t, glm::normalize(&p)))
            }
        }
    }
}

// Slab method. When the origin is inside the box the exit face is reported.
fn ray_aabb_hit(
    origin: &glm::Vec3,
    direction: &glm::Vec3,
    min: &glm::Vec3,
    max: &glm::Vec3,
) -> Option<(f32, glm::Vec3)> {
    let mut t_enter = f32::NEG_INFINITY;
    let mut t_exit = f32::INFINITY;
    let mut enter_axis = 0;
    let mut exit_axis = 0;

    for axis in 0..3 {
        if direction[axis] == 0.0 {
            if origin[axis] < min[axis] || origin[axis] > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / direction[axis];
        let mut t0 = (min[axis] - origin[axis]) * inv;
        let mut t1 = (max[axis] - origin[axis]) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        if t0 > t_enter {
            t_enter = t0;
            enter_axis = axis;
        }
        if t1 < t_exit {
            t_exit = t1;
            exit_axis = axis;
        }
        if t_enter > t_exit {
            return None;
        }
    }

    if t_exit < 0.0 {
        return None;
    }

    let (t, axis) = if t_enter >= 0.0 {
        (t_enter, enter_axis)
    } else {
        (t_exit, exit_axis)
    };
    let mut normal = glm::vec3(0.0, 0.0, 0.0);
    normal[axis] = if t_enter >= 0.0 {
        -direction[axis].signum()
    } else {
        direction[axis].signum()
    };
    Some((t, normal))
}
