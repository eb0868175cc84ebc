//! Focus/orbit/reset camera navigation.

pub mod controller;
pub mod state;

pub use controller::ViewController;
pub use state::{FocusTransition, Mode, ResetTransition, RigState, SavedPose, Velocity};

use nalgebra_glm as glm;

use crate::input::PointerEvent;
use crate::scene::{Intersection, NodeId};

/// What the host should do with an input event after the controller saw it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EventResponse {
    pub repaint: bool,
    /// The host must not run its default action (context menu, page scroll).
    pub prevent_default: bool,
}

impl EventResponse {
    pub fn ignored() -> Self {
        Self::default()
    }
}

/// A click that did not start a focus gesture. Emitted whether or not
/// something was hit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickEvent {
    pub input: Option<PointerEvent>,
    pub intersection: Option<Intersection>,
}

impl PickEvent {
    pub fn object(&self) -> Option<NodeId> {
        self.intersection.map(|hit| hit.object)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FocusEvent {
    pub input: Option<PointerEvent>,
    pub object: NodeId,
    pub point: glm::Vec3,
    pub intersection: Intersection,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewEvent {
    PrimaryPick(PickEvent),
    SecondaryPick(PickEvent),
    /// The focus transition finished and the camera now orbits `point`.
    Focused(FocusEvent),
}
