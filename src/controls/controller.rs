use nalgebra_glm as glm;

use super::state::{FocusTransition, Mode, ResetTransition, RigState, SavedPose, Velocity};
use super::{EventResponse, FocusEvent, PickEvent, ViewEvent};
use crate::error::{SceneError, ViewError};
use crate::input::{
    InputEvent, InputKind, Key, KeyEvent, PointerButton, PointerEvent, Subscription, Surface,
    WheelEvent,
};
use crate::math;
use crate::picker::Picker;
use crate::scene::{Intersection, Layers, Node, NodeId, Scene};
use crate::settings::ViewSettings;

/// Listeners that only exist while a focus/orbit gesture is held.
#[derive(Debug, Clone, Copy)]
struct Gesture {
    pointer_move: Subscription,
    pointer_up: Subscription,
    key_up: Subscription,
}

/// Focus, orbit and reset camera navigation over a [`Scene`].
///
/// The controller owns two helper nodes it inserts under the scene root: a
/// pivot that yaws and a holder below it that pitches. While focused the camera
/// hangs under the holder, so turning those nodes orbits the camera around the
/// focused point without touching the camera's own local frame.
pub struct ViewController {
    settings: ViewSettings,
    camera: NodeId,
    surface: Surface,
    picker: Picker,
    state: RigState,
    enabled: bool,
    min_camera_distance: f32,
    pick_targets: Vec<NodeId>,
    pick_filter: Option<Box<dyn Fn(&Intersection) -> bool>>,
    listeners: Vec<Subscription>,
    gesture: Option<Gesture>,
    events: Vec<ViewEvent>,
}

impl ViewController {
    pub fn new(
        scene: &mut Scene,
        camera: NodeId,
        mut surface: Surface,
        settings: ViewSettings,
    ) -> Result<Self, ViewError> {
        settings.validate()?;

        let node = scene.node(camera).map_err(|e| {
            ViewError::new("camera-missing")
                .with_arg("node", camera.index())
                .push_std(e)
        })?;
        let near = match &node.projection {
            Some(projection) => projection.near(),
            None => {
                return Err(ViewError::new("not-a-camera")
                    .with_arg("node", camera.index())
                    .with_arg("name", &node.name));
            }
        };

        let min_camera_distance = settings.min_camera_distance.unwrap_or(near * 2.0);
        if min_camera_distance > settings.max_camera_distance {
            return Err(ViewError::new("invalid-setting")
                .with_arg("field", "max_camera_distance")
                .with_arg("value", settings.max_camera_distance)
                .with_arg("min_camera_distance", min_camera_distance));
        }

        let (width, height) = surface.size();
        if !(width > 0.0 && height > 0.0) {
            return Err(ViewError::new("surface-empty")
                .with_arg("width", width)
                .with_arg("height", height));
        }
        if !surface.is_focusable() {
            surface.set_tab_index(0);
        }

        let saved = capture_pose(scene, camera)?;
        let pivot = scene.add_to_root(Node::new(settings.name.clone()).with_layers(Layers::none()));
        let holder = scene.add(pivot, Node::new("cameraHolder").with_layers(Layers::none()))?;

        let listeners = [
            InputKind::PointerDown,
            InputKind::Wheel,
            InputKind::KeyDown,
            InputKind::ContextMenu,
        ]
        .into_iter()
        .map(|kind| surface.listen(kind))
        .collect();

        log::info!(
            "{}: controlling camera {:?} (min distance {min_camera_distance})",
            settings.name,
            camera
        );

        Ok(Self {
            picker: Picker::new(settings.pick_layer),
            settings,
            camera,
            surface,
            state: RigState {
                mode: Mode::Idle,
                velocity: Velocity::default(),
                saved,
                pivot,
                holder,
                focus: None,
            },
            enabled: true,
            min_camera_distance,
            pick_targets: vec![scene.root()],
            pick_filter: None,
            listeners,
            gesture: None,
            events: Vec::new(),
        })
    }

    pub fn settings(&self) -> &ViewSettings {
        &self.settings
    }

    pub fn camera(&self) -> NodeId {
        self.camera
    }

    pub fn pivot(&self) -> NodeId {
        self.state.pivot
    }

    pub fn holder(&self) -> NodeId {
        self.state.holder
    }

    pub fn mode(&self) -> &Mode {
        &self.state.mode
    }

    pub fn state(&self) -> &RigState {
        &self.state
    }

    pub fn velocity(&self) -> Velocity {
        self.state.velocity
    }

    pub fn saved_pose(&self) -> &SavedPose {
        &self.state.saved
    }

    pub fn focus(&self) -> Option<&Intersection> {
        self.state.focus.as_ref()
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn picker_mut(&mut self) -> &mut Picker {
        &mut self.picker
    }

    pub fn min_camera_distance(&self) -> f32 {
        self.min_camera_distance
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    pub fn is_gesture_active(&self) -> bool {
        self.gesture.is_some()
    }

    /// Restricts picking to these subtrees (the whole scene by default).
    pub fn set_pick_targets(&mut self, targets: Vec<NodeId>) {
        self.pick_targets = targets;
    }

    /// Hits rejected by `filter` are skipped when picking, e.g. the ground.
    pub fn set_pick_filter(&mut self, filter: impl Fn(&Intersection) -> bool + 'static) {
        self.pick_filter = Some(Box::new(filter));
    }

    pub fn clear_pick_filter(&mut self) {
        self.pick_filter = None;
    }

    /// Takes the notifications emitted since the last call.
    pub fn drain_events(&mut self) -> Vec<ViewEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn resize(&mut self, scene: &mut Scene, width: f32, height: f32) -> Result<(), SceneError> {
        self.surface.resize(width, height);
        let aspect = self.surface.aspect();
        if let Some(projection) = scene.node_mut(self.camera)?.projection.as_mut() {
            projection.set_aspect(aspect);
        }
        Ok(())
    }

    /// Re-captures the pose `exit` returns to. Calling it twice in a row is
    /// the same as calling it once.
    pub fn save_state(&mut self, scene: &Scene) -> Result<(), SceneError> {
        self.state.saved = capture_pose(scene, self.camera)?;
        log::debug!("{}: saved camera pose {:?}", self.settings.name, self.state.saved);
        Ok(())
    }

    /// Releases any held gesture and animates back to the saved pose.
    pub fn exit(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        self.release_gesture();
        scene.attach(self.state.saved.parent, self.camera)?;
        self.state.focus = None;
        self.set_mode(Mode::ResetTransition(ResetTransition::default()));
        Ok(())
    }

    /// Removes every listener this controller registered. Safe to call again.
    pub fn dispose(&mut self) {
        self.release_gesture();
        for subscription in self.listeners.drain(..) {
            self.surface.unlisten(subscription);
        }
    }

    pub fn handle_input(
        &mut self,
        scene: &mut Scene,
        event: &InputEvent,
    ) -> Result<EventResponse, SceneError> {
        if !self.surface.routes(event) || !self.owns(event.kind()) {
            log::trace!("{}: no listener for {:?}", self.settings.name, event.kind());
            return Ok(EventResponse::ignored());
        }

        match event {
            InputEvent::PointerDown(evt) => self.on_pointer_down(scene, evt),
            InputEvent::PointerMove(evt) => Ok(self.on_pointer_move(evt)),
            InputEvent::PointerUp(_) => {
                self.release_gesture();
                Ok(EventResponse::ignored())
            }
            InputEvent::Wheel(evt) => self.on_wheel(scene, evt),
            InputEvent::KeyDown(evt) => self.on_key_down(scene, evt),
            InputEvent::KeyUp(evt) => Ok(self.on_key_up(evt)),
            InputEvent::ContextMenu(_) => Ok(EventResponse {
                repaint: false,
                prevent_default: true,
            }),
        }
    }

    /// Per-frame step: advances the running transition, applies orbit velocity
    /// while focused and decays the velocity.
    pub fn update(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        if !self.enabled {
            return Ok(());
        }

        let mut focus_done = None;
        let mut reset_done = false;
        match &mut self.state.mode {
            Mode::FocusTransition(transition) => {
                let (rotation, done) = transition.advance(
                    self.settings.focus_speed,
                    self.settings.max_focus_iterations,
                );
                scene.node_mut(self.camera)?.rotation = rotation;
                if done {
                    focus_done = Some(transition.input);
                }
            }
            Mode::ResetTransition(transition) => {
                reset_done =
                    step_reset(scene, self.camera, &self.state.saved, transition, &self.settings)?;
            }
            _ => {}
        }

        if let Some(input) = focus_done {
            self.complete_focus(scene, input)?;
        }
        if reset_done {
            self.set_mode(Mode::Idle);
        }

        if self.state.mode.is_focused() {
            self.apply_orbit(scene)?;
        }
        self.state
            .velocity
            .decay(self.settings.damper, self.settings.velocity_epsilon);
        Ok(())
    }

    /// Moves the camera along its local Z axis by `delta` times its distance
    /// from the origin of its parent space, which is the pivot while focused.
    /// Returns whether the camera moved.
    pub fn dolly(&mut self, scene: &mut Scene, delta: f32) -> Result<bool, SceneError> {
        let position = scene.node(self.camera)?.position;
        let distance = glm::length(&position);
        if !(distance > 0.0) {
            return Ok(false);
        }

        let max_step = self.settings.max_dolly_speed;
        let step = (delta * distance).clamp(-max_step, max_step);
        if !(step.abs() >= self.settings.min_dolly_speed) || !step.is_finite() {
            return Ok(false);
        }

        scene.translate_on_axis(self.camera, &math::z_axis(), step)?;
        let node = scene.node_mut(self.camera)?;
        let moved_distance = glm::length(&node.position);
        if glm::dot(&node.position, &position) <= 0.0 {
            node.position = glm::normalize(&position) * self.min_camera_distance;
        } else if moved_distance < self.min_camera_distance {
            node.position *= self.min_camera_distance / moved_distance;
        } else if moved_distance > self.settings.max_camera_distance {
            node.position *= self.settings.max_camera_distance / moved_distance;
        }
        Ok(true)
    }

    fn owns(&self, kind: InputKind) -> bool {
        let gesture_owns = self.gesture.is_some_and(|g| {
            [g.pointer_move, g.pointer_up, g.key_up]
                .iter()
                .any(|s| s.kind() == kind && self.surface.is_listening(s))
        });
        gesture_owns
            || self
                .listeners
                .iter()
                .any(|s| s.kind() == kind && self.surface.is_listening(s))
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.state.mode.name() != mode.name() {
            log::debug!(
                "{}: {} -> {}",
                self.settings.name,
                self.state.mode.name(),
                mode.name()
            );
        }
        self.state.mode = mode;
    }

    fn on_pointer_down(
        &mut self,
        scene: &mut Scene,
        evt: &PointerEvent,
    ) -> Result<EventResponse, SceneError> {
        let ray = self.picker.compute_ray(evt, scene, self.camera)?;
        let hit = self.picker.query_nearest(
            &ray,
            scene,
            &self.pick_targets,
            self.pick_filter.as_deref(),
        )?;

        match evt.button {
            PointerButton::Primary => {
                if self.enabled && evt.modifiers.is_held(self.settings.activation_key) {
                    match hit.filter(|h| h.distance <= self.settings.max_focus_distance) {
                        Some(hit) => {
                            self.begin_gesture();
                            self.begin_focus(scene, hit, Some(*evt))?;
                            return Ok(EventResponse {
                                repaint: true,
                                prevent_default: true,
                            });
                        }
                        None => {
                            log::trace!("{}: nothing to focus under the pointer", self.settings.name)
                        }
                    }
                } else {
                    self.events.push(ViewEvent::PrimaryPick(PickEvent {
                        input: Some(*evt),
                        intersection: hit,
                    }));
                }
                Ok(EventResponse::ignored())
            }
            PointerButton::Secondary => {
                self.events.push(ViewEvent::SecondaryPick(PickEvent {
                    input: Some(*evt),
                    intersection: hit,
                }));
                Ok(EventResponse {
                    repaint: false,
                    prevent_default: true,
                })
            }
            _ => Ok(EventResponse::ignored()),
        }
    }

    fn on_pointer_move(&mut self, evt: &PointerEvent) -> EventResponse {
        if !self.enabled {
            return EventResponse::ignored();
        }
        let x = evt.movement_x;
        let y = evt.movement_y;
        let rate = self.settings.acceleration_rate;
        let damp = self.settings.suppressed_axis_factor;
        let v = &mut self.state.velocity;

        if evt.modifiers.is_held(self.settings.precision_key) {
            v.x += y * rate;
            v.y += x * rate;
        } else if y.abs() > x.abs() {
            // Mostly vertical: dolly, keep only a trace of the sideways drift.
            v.y += x * damp * rate;
            v.z += y * rate;
        } else {
            v.y += x * rate;
            v.z += y * damp * rate;
        }
        EventResponse {
            repaint: true,
            prevent_default: false,
        }
    }

    fn on_wheel(&mut self, scene: &mut Scene, evt: &WheelEvent) -> Result<EventResponse, SceneError> {
        if !self.enabled || self.state.mode.is_transitioning() {
            return Ok(EventResponse::ignored());
        }
        // Control-wheel belongs to the host unless it is also the activation key.
        if evt.modifiers.control && !evt.modifiers.is_held(self.settings.activation_key) {
            return Ok(EventResponse::ignored());
        }
        if evt.delta_y == 0.0 || !evt.delta_y.is_finite() {
            return Ok(EventResponse {
                repaint: false,
                prevent_default: true,
            });
        }

        let moved = self.dolly(scene, evt.delta_y.signum() * self.settings.wheel_dolly_speed)?;
        Ok(EventResponse {
            repaint: moved,
            prevent_default: true,
        })
    }

    fn on_key_down(&mut self, scene: &mut Scene, evt: &KeyEvent) -> Result<EventResponse, SceneError> {
        if self.enabled && evt.key == Key::Escape && self.settings.auto_return {
            self.exit(scene)?;
            return Ok(EventResponse {
                repaint: true,
                prevent_default: false,
            });
        }
        Ok(EventResponse::ignored())
    }

    fn on_key_up(&mut self, evt: &KeyEvent) -> EventResponse {
        if evt.key == Key::Modifier(self.settings.activation_key) {
            self.release_gesture();
        }
        EventResponse::ignored()
    }

    fn begin_gesture(&mut self) {
        if self.gesture.is_some() {
            return;
        }
        self.surface.request_pointer_lock();
        self.gesture = Some(Gesture {
            pointer_move: self.surface.listen(InputKind::PointerMove),
            pointer_up: self.surface.listen(InputKind::PointerUp),
            key_up: self.surface.listen(InputKind::KeyUp),
        });
    }

    fn release_gesture(&mut self) {
        let Some(gesture) = self.gesture.take() else {
            return;
        };
        self.surface.exit_pointer_lock();
        self.surface.unlisten(gesture.pointer_move);
        self.surface.unlisten(gesture.pointer_up);
        self.surface.unlisten(gesture.key_up);
        if self.state.mode == Mode::Orbiting {
            self.set_mode(Mode::Focused);
        }
    }

    fn begin_focus(
        &mut self,
        scene: &mut Scene,
        hit: Intersection,
        input: Option<PointerEvent>,
    ) -> Result<(), SceneError> {
        let root = scene.root();
        scene.attach(root, self.camera)?;

        let eye = scene.world_position(self.camera)?;
        let camera = scene.node(self.camera)?;
        let look = math::look_at_quat(&eye, &hit.point, &camera.up);
        let root_rotation = scene.world_rotation(root)?;
        let target = glm::quat_normalize(&(glm::quat_inverse(&root_rotation) * look));

        self.state.focus = Some(hit);
        self.set_mode(Mode::FocusTransition(FocusTransition::new(
            camera.rotation,
            target,
            input,
        )));
        log::debug!(
            "{}: focusing {:?} at {:?}",
            self.settings.name,
            hit.object,
            hit.point
        );
        Ok(())
    }

    fn complete_focus(
        &mut self,
        scene: &mut Scene,
        input: Option<PointerEvent>,
    ) -> Result<(), SceneError> {
        let Some(hit) = self.state.focus else {
            self.set_mode(Mode::Idle);
            return Ok(());
        };
        let pivot = self.state.pivot;
        let holder = self.state.holder;

        let root_inverse = glm::inverse(&scene.world_matrix(scene.root())?);
        {
            let node = scene.node_mut(pivot)?;
            node.position = math::transform_point(&root_inverse, &hit.point);
            node.rotation = glm::quat_identity();
        }
        let up = scene.node(self.camera)?.up;
        let eye = scene.world_position(self.camera)?;
        {
            let node = scene.node_mut(holder)?;
            node.position = glm::vec3(0.0, 0.0, 0.0);
            node.up = up;
        }
        scene.look_at(holder, &eye)?;
        scene.attach(holder, self.camera)?;

        let next = if self.gesture.is_some() {
            Mode::Orbiting
        } else {
            Mode::Focused
        };
        self.set_mode(next);
        self.events.push(ViewEvent::Focused(FocusEvent {
            input,
            object: hit.object,
            point: hit.point,
            intersection: hit,
        }));
        Ok(())
    }

    fn apply_orbit(&mut self, scene: &mut Scene) -> Result<(), SceneError> {
        let v = self.state.velocity;
        let speed = self.settings.rotation_speed;
        if v.y != 0.0 {
            let up = scene.node(self.camera)?.up;
            scene.rotate_on_world_axis(self.state.pivot, &up, -v.y * speed)?;
        }
        if v.x != 0.0 {
            scene.rotate_on_axis(self.state.holder, &math::x_axis(), -v.x * speed)?;
        }
        if v.z != 0.0 {
            self.dolly(scene, v.z * self.settings.dolly_speed)?;
        }
        Ok(())
    }
}

fn capture_pose(scene: &Scene, camera: NodeId) -> Result<SavedPose, SceneError> {
    let node = scene.node(camera)?;
    Ok(SavedPose {
        position: node.position,
        rotation: node.rotation,
        scale: node.scale,
        parent: node.parent().unwrap_or(scene.root()),
    })
}

/// One tick of the return animation. Returns true once the camera has been
/// snapped onto the saved pose.
fn step_reset(
    scene: &mut Scene,
    camera: NodeId,
    saved: &SavedPose,
    transition: &mut ResetTransition,
    settings: &ViewSettings,
) -> Result<bool, SceneError> {
    transition.iterations += 1;
    let node = scene.node_mut(camera)?;
    node.position = math::lerp_vec3(&node.position, &saved.position, settings.reset_position_factor);
    node.rotation = math::quat_slerp(&node.rotation, &saved.rotation, settings.reset_rotation_factor);

    let settled = math::manhattan_distance(&node.position, &saved.position)
        < settings.distance_tolerance
        && math::quat_angle_between(&node.rotation, &saved.rotation) < settings.rotation_tolerance;
    if settled || transition.iterations >= settings.max_reset_iterations() {
        node.position = saved.position;
        node.rotation = saved.rotation;
        node.scale = saved.scale;
        return Ok(true);
    }
    Ok(false)
}
