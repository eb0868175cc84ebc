// Demo playground: a grass floor, three boxes and five signposts around the
// origin, with the camera placed behind the first sign.

use nalgebra_glm as glm;

use super::{Node, NodeId, Projection, Scene, Shape};
use crate::error::SceneError;
use crate::math;

pub const CAMERA_POSITION: [f32; 3] = [0.2, 3.31, 8.25];
pub const CAMERA_TARGET: [f32; 3] = [0.0, 1.5, 0.0];

pub struct DemoScene {
    pub scene: Scene,
    pub camera: NodeId,
    pub floor: NodeId,
    pub boxes: Vec<NodeId>,
    pub signs: Vec<Sign>,
}

/// A post with a tilted board on top; the text panel lies on the board.
#[derive(Debug, Clone, Copy)]
pub struct Sign {
    pub post: NodeId,
    pub board: NodeId,
    pub panel: NodeId,
}

pub fn build(aspect: f32) -> Result<DemoScene, SceneError> {
    let mut scene = Scene::new();

    let camera = scene.add_to_root(
        Node::new("camera")
            .with_position(CAMERA_POSITION[0], CAMERA_POSITION[1], CAMERA_POSITION[2])
            .with_projection(Projection::perspective(65.0, aspect, 0.01, 100_000.0)),
    );
    scene.look_at(camera, &glm::make_vec3(&CAMERA_TARGET))?;

    let floor = scene.add_to_root(
        Node::new("floor")
            .with_rotation(glm::quat_angle_axis(
                -std::f32::consts::FRAC_PI_2,
                &math::x_axis(),
            ))
            .with_shape(Shape::plane(200.0, 200.0)),
    );

    let boxes = [(3.0, 1.0, 0.0), (-3.0, 1.0, 0.0), (0.0, 6.0, 0.0)]
        .into_iter()
        .enumerate()
        .map(|(i, (x, y, z))| {
            scene.add_to_root(
                Node::new(format!("box{}", i + 1))
                    .with_position(x, y, z)
                    .with_shape(Shape::cuboid(2.0, 2.0, 2.0)),
            )
        })
        .collect();

    let half_pi = std::f32::consts::FRAC_PI_2;
    let placements = [
        ("alt", [0.0, 1.0, 6.0], 0.0),
        ("altCtrl", [0.0, 1.0, -6.0], std::f32::consts::PI),
        ("lookUp", [6.0, 1.0, 0.0], half_pi),
        ("escape", [-6.0, 1.0, 0.0], -half_pi),
        ("haveYouSeen", [0.0, 6.0, 0.0], -half_pi),
    ];
    let mut signs = Vec::with_capacity(placements.len());
    for (name, [x, y, z], yaw) in placements {
        let sign = add_sign(&mut scene, name, glm::vec3(x, y, z), yaw)?;
        signs.push(sign);
    }

    // The sign on top of the third box sits flat and half size.
    if let Some(top) = signs.last() {
        let board = scene.node_mut(top.board)?;
        board.rotation = glm::quat_identity();
        board.scale = glm::vec3(0.5, 0.5, 0.5);
    }

    Ok(DemoScene {
        scene,
        camera,
        floor,
        boxes,
        signs,
    })
}

fn add_sign(
    scene: &mut Scene,
    name: &str,
    position: glm::Vec3,
    yaw: f32,
) -> Result<Sign, SceneError> {
    let post = scene.add_to_root(
        Node::new(format!("{name}-post"))
            .with_position(position.x, position.y, position.z)
            .with_rotation(glm::quat_angle_axis(yaw, &math::y_axis()))
            .with_shape(Shape::cuboid(0.1, 2.0, 0.1)),
    );
    let board = scene.add(
        post,
        Node::new(format!("{name}-board"))
            .with_position(0.0, 1.0, 0.0)
            .with_rotation(glm::quat_angle_axis(0.75, &math::x_axis()))
            .with_shape(Shape::cuboid(2.1, 0.1, 1.1)),
    )?;
    let panel = scene.add(
        board,
        Node::new(format!("{name}-panel"))
            .with_position(0.0, 0.07, 0.0)
            .with_rotation(glm::quat_angle_axis(-std::f32::consts::FRAC_PI_2, &math::x_axis()))
            .with_shape(Shape::plane(2.0, 1.0)),
    )?;
    Ok(Sign { post, board, panel })
}
