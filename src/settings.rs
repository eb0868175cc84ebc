use serde::{Deserialize, Serialize};

use crate::CONFY_APP_NAME;
use crate::error::ViewError;
use crate::input::ModifierKey;

/// Tuning of the view controller. Every field has a default, so a partial
/// config file is enough.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewSettings {
    pub name: String,
    /// Modifier that turns a primary click into a focus/orbit gesture.
    pub activation_key: ModifierKey,
    /// Modifier that maps both pointer axes to rotation while orbiting.
    pub precision_key: ModifierKey,
    /// Escape returns the camera to its saved pose.
    pub auto_return: bool,
    pub rotation_speed: f32,
    pub acceleration_rate: f32,
    /// Velocity multiplier applied every tick.
    pub damper: f32,
    /// Velocity components below this snap to zero.
    pub velocity_epsilon: f32,
    /// Scale applied to the non-dominant pointer axis.
    pub suppressed_axis_factor: f32,
    pub dolly_speed: f32,
    /// Dolly steps smaller than this are dropped.
    pub min_dolly_speed: f32,
    pub max_dolly_speed: f32,
    pub wheel_dolly_speed: f32,
    /// Defaults to twice the camera's near plane when unset.
    pub min_camera_distance: Option<f32>,
    pub max_camera_distance: f32,
    pub max_focus_distance: f32,
    pub focus_speed: f32,
    pub max_focus_iterations: u32,
    /// The reset transition may run for `max_focus_iterations` times this.
    pub reset_iteration_factor: u32,
    pub reset_position_factor: f32,
    pub reset_rotation_factor: f32,
    pub distance_tolerance: f32,
    pub rotation_tolerance: f32,
    pub pick_layer: u8,
}

impl Default for ViewSettings {
    fn default() -> Self {
        Self {
            name: "viewControls".to_string(),
            activation_key: ModifierKey::Alt,
            precision_key: ModifierKey::Control,
            auto_return: true,
            rotation_speed: 0.02,
            acceleration_rate: 0.1,
            damper: 0.5,
            velocity_epsilon: 1e-6,
            suppressed_axis_factor: 0.001,
            dolly_speed: 0.02,
            min_dolly_speed: 1e-6,
            max_dolly_speed: f32::INFINITY,
            wheel_dolly_speed: 0.1,
            min_camera_distance: None,
            max_camera_distance: 10_000.0,
            max_focus_distance: f32::INFINITY,
            focus_speed: 0.06,
            max_focus_iterations: 20,
            reset_iteration_factor: 10,
            reset_position_factor: 0.11,
            reset_rotation_factor: 0.055,
            distance_tolerance: 0.002,
            rotation_tolerance: 0.001,
            pick_layer: 0,
        }
    }
}

impl ViewSettings {
    pub fn load() -> Self {
        confy::load(CONFY_APP_NAME, "controls").unwrap_or_else(|err| {
            log::warn!("falling back to default view settings: {err}");
            Self::default()
        })
    }

    pub fn save(&self) -> Result<(), ViewError> {
        confy::store(CONFY_APP_NAME, "controls", self)?;
        Ok(())
    }

    pub fn max_reset_iterations(&self) -> u32 {
        self.max_focus_iterations
            .saturating_mul(self.reset_iteration_factor)
    }

    /// Rejects values that would stall or invert the transitions.
    pub fn validate(&self) -> Result<(), ViewError> {
        let unit = |key: &'static str, v: f32| {
            if v > 0.0 && v <= 1.0 {
                Ok(())
            } else {
                Err(ViewError::new("invalid-setting")
                    .with_arg("field", key)
                    .with_arg("value", v))
            }
        };
        unit("focus_speed", self.focus_speed)?;
        unit("reset_position_factor", self.reset_position_factor)?;
        unit("reset_rotation_factor", self.reset_rotation_factor)?;
        if !(0.0..1.0).contains(&self.damper) {
            return Err(ViewError::new("invalid-setting")
                .with_arg("field", "damper")
                .with_arg("value", self.damper));
        }
        if !(self.max_dolly_speed > 0.0) {
            return Err(ViewError::new("invalid-setting")
                .with_arg("field", "max_dolly_speed")
                .with_arg("value", self.max_dolly_speed));
        }
        if self.max_focus_iterations == 0 {
            return Err(ViewError::new("invalid-setting")
                .with_arg("field", "max_focus_iterations")
                .with_arg("value", 0));
        }
        if let Some(min) = self.min_camera_distance {
            if min <= 0.0 || min > self.max_camera_distance {
                return Err(ViewError::new("invalid-setting")
                    .with_arg("field", "min_camera_distance")
                    .with_arg("value", min));
            }
        }
        Ok(())
    }
}
