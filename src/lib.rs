//! Focus, orbit and reset camera navigation for a 3D scene graph.
//!
//! [`controls::ViewController`] turns pointer, wheel and key input from an
//! [`input::Surface`] into camera motion on a [`scene::Scene`], using a
//! [`picker::Picker`] to find what is under the pointer.

pub mod controls;
pub mod error;
pub mod input;
pub mod math;
pub mod picker;
pub mod scene;
pub mod settings;

pub const CONFY_APP_NAME: &str = "viewctl-rs";

pub use controls::{EventResponse, FocusEvent, Mode, PickEvent, ViewController, ViewEvent};
pub use error::{SceneError, ViewError};
pub use picker::Picker;
pub use scene::{Intersection, NodeId, Scene};
pub use settings::ViewSettings;
