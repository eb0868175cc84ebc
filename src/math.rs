// Transform helpers on top of nalgebra-glm.
// Orientation conventions follow the usual scene-graph rules: cameras look down -Z,
// everything else faces +Z, +Y is up.

use nalgebra_glm as glm;

const SLERP_EPSILON: f32 = f32::EPSILON;

pub fn x_axis() -> glm::Vec3 {
    glm::vec3(1.0, 0.0, 0.0)
}

pub fn y_axis() -> glm::Vec3 {
    glm::vec3(0.0, 1.0, 0.0)
}

pub fn z_axis() -> glm::Vec3 {
    glm::vec3(0.0, 0.0, 1.0)
}

/// Rotation whose +Z axis points from `target` to `eye`.
///
/// Used with `eye` = camera position this orients a camera (looking down -Z)
/// toward `target`. When `up` is parallel to the viewing axis the axis is nudged
/// so the basis stays well defined.
pub fn look_at_quat(eye: &glm::Vec3, target: &glm::Vec3, up: &glm::Vec3) -> glm::Quat {
    let mut z = eye - target;
    if glm::length2(&z) == 0.0 {
        z.z = 1.0;
    }
    z = glm::normalize(&z);
    if glm::length2(&glm::cross(up, &z)) == 0.0 {
        if (up.z.abs() - 1.0).abs() < f32::EPSILON {
            z.x += 0.0001;
        } else {
            z.z += 0.0001;
        }
    }
    // The left-handed view rotation is the inverse of the frame facing `z`.
    glm::quat_normalize(&glm::quat_conjugate(&glm::quat_look_at_lh(&z, up)))
}

/// Spherical interpolation along the shorter arc.
///
/// Falls back to normalized linear blending when the two orientations are
/// nearly identical, so it is safe to call while converging on a target.
pub fn quat_slerp(from: &glm::Quat, to: &glm::Quat, t: f32) -> glm::Quat {
    if t <= 0.0 {
        return *from;
    }
    if t >= 1.0 {
        return *to;
    }

    let mut cos_half = from.coords.dot(&to.coords);
    let end = if cos_half < 0.0 {
        cos_half = -cos_half;
        -to.coords
    } else {
        to.coords
    };

    if cos_half >= 1.0 {
        return *from;
    }

    let sqr_sin_half = 1.0 - cos_half * cos_half;
    if sqr_sin_half <= SLERP_EPSILON {
        let blended = from.coords * (1.0 - t) + end * t;
        return glm::quat_normalize(&glm::Quat::from(blended));
    }

    let sin_half = sqr_sin_half.sqrt();
    let half = sin_half.atan2(cos_half);
    let ratio_a = ((1.0 - t) * half).sin() / sin_half;
    let ratio_b = (t * half).sin() / sin_half;

    glm::Quat::from(from.coords * ratio_a + end * ratio_b)
}

pub fn lerp_vec3(from: &glm::Vec3, to: &glm::Vec3, t: f32) -> glm::Vec3 {
    glm::lerp(from, to, t)
}

/// Angle in radians of the rotation taking `a` to `b`.
///
/// Measured from the relative rotation with `atan2`, which keeps precision for
/// tiny angles where `acos` of the dot product bottoms out.
pub fn quat_angle_between(a: &glm::Quat, b: &glm::Quat) -> f32 {
    let relative = glm::quat_conjugate(a) * b;
    let sin_half = glm::length(&relative.imag());
    2.0 * sin_half.atan2(relative.coords.w.abs())
}

pub fn manhattan_distance(a: &glm::Vec3, b: &glm::Vec3) -> f32 {
    (a.x - b.x).abs() + (a.y - b.y).abs() + (a.z - b.z).abs()
}

pub fn compose(position: &glm::Vec3, rotation: &glm::Quat, scale: &glm::Vec3) -> glm::Mat4 {
    glm::translation(position) * glm::quat_to_mat4(rotation) * glm::scaling(scale)
}

/// Splits an affine matrix into translation, rotation and scale.
pub fn decompose(m: &glm::Mat4) -> (glm::Vec3, glm::Quat, glm::Vec3) {
    let position = glm::vec3(m[(0, 3)], m[(1, 3)], m[(2, 3)]);

    let cols = [
        glm::vec3(m[(0, 0)], m[(1, 0)], m[(2, 0)]),
        glm::vec3(m[(0, 1)], m[(1, 1)], m[(2, 1)]),
        glm::vec3(m[(0, 2)], m[(1, 2)], m[(2, 2)]),
    ];
    let mut scale = glm::vec3(
        glm::length(&cols[0]),
        glm::length(&cols[1]),
        glm::length(&cols[2]),
    );
    if glm::determinant(&glm::mat4_to_mat3(m)) < 0.0 {
        scale.x = -scale.x;
    }

    let safe = |c: &glm::Vec3, s: f32| if s != 0.0 { c / s } else { *c };
    let rotation = glm::Mat3::from_columns(&[
        safe(&cols[0], scale.x),
        safe(&cols[1], scale.y),
        safe(&cols[2], scale.z),
    ]);

    (
        position,
        glm::quat_normalize(&glm::mat3_to_quat(&rotation)),
        scale,
    )
}

pub fn transform_point(m: &glm::Mat4, p: &glm::Vec3) -> glm::Vec3 {
    let v = m * glm::vec4(p.x, p.y, p.z, 1.0);
    if v.w != 0.0 && v.w != 1.0 {
        glm::vec3(v.x / v.w, v.y / v.w, v.z / v.w)
    } else {
        v.xyz()
    }
}

pub fn transform_vector(m: &glm::Mat4, d: &glm::Vec3) -> glm::Vec3 {
    (m * glm::vec4(d.x, d.y, d.z, 0.0)).xyz()
}
