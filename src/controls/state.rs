use nalgebra_glm as glm;

use crate::input::PointerEvent;
use crate::math;
use crate::scene::{Intersection, NodeId};

/// Angular (x = pitch, y = yaw) and dolly (z) velocity fed by pointer motion.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Velocity {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Velocity {
    pub fn is_at_rest(&self) -> bool {
        self.x == 0.0 && self.y == 0.0 && self.z == 0.0
    }

    /// One tick of exponential decay; tiny remainders snap to zero.
    pub fn decay(&mut self, damper: f32, epsilon: f32) {
        for v in [&mut self.x, &mut self.y, &mut self.z] {
            *v *= damper;
            if v.abs() < epsilon {
                *v = 0.0;
            }
        }
    }
}

/// Camera pose to return to on exit, relative to `parent`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavedPose {
    pub position: glm::Vec3,
    pub rotation: glm::Quat,
    pub scale: glm::Vec3,
    pub parent: NodeId,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusTransition {
    pub start: glm::Quat,
    pub target: glm::Quat,
    pub progress: f32,
    pub iterations: u32,
    pub input: Option<PointerEvent>,
}

impl FocusTransition {
    pub fn new(start: glm::Quat, target: glm::Quat, input: Option<PointerEvent>) -> Self {
        Self {
            start,
            target,
            progress: 0.0,
            iterations: 0,
            input,
        }
    }

    /// Advances one tick. Returns the orientation for this tick and whether
    /// the transition is complete.
    pub fn advance(&mut self, speed: f32, max_iterations: u32) -> (glm::Quat, bool) {
        self.progress = (self.progress + speed).min(1.0);
        self.iterations += 1;
        if self.progress >= 1.0 || self.iterations >= max_iterations {
            self.progress = 1.0;
            (self.target, true)
        } else {
            (
                math::quat_slerp(&self.start, &self.target, self.progress),
                false,
            )
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResetTransition {
    pub iterations: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    Idle,
    /// Focused with the activation gesture still held.
    Orbiting,
    FocusTransition(FocusTransition),
    Focused,
    ResetTransition(ResetTransition),
}

impl Mode {
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Idle => "idle",
            Mode::Orbiting => "orbiting",
            Mode::FocusTransition(_) => "focus-transition",
            Mode::Focused => "focused",
            Mode::ResetTransition(_) => "reset-transition",
        }
    }

    /// Camera sits under the pivot and follows orbit input.
    pub fn is_focused(&self) -> bool {
        matches!(self, Mode::Focused | Mode::Orbiting)
    }

    pub fn is_transitioning(&self) -> bool {
        matches!(self, Mode::FocusTransition(_) | Mode::ResetTransition(_))
    }
}

#[derive(Debug, Clone)]
pub struct RigState {
    pub mode: Mode,
    pub velocity: Velocity,
    pub saved: SavedPose,
    /// Yaw node, placed on the focused point.
    pub pivot: NodeId,
    /// Pitch node under the pivot; the camera's parent while focused.
    pub holder: NodeId,
    pub focus: Option<Intersection>,
}
