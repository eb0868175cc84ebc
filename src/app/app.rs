use std::sync::Arc;

use viewctl_rs::ViewError;
use viewctl_rs::controls::{EventResponse as ControlResponse, ViewController, ViewEvent};
use viewctl_rs::input::{
    InputEvent, Key, KeyEvent, ModifierKey, Modifiers, PointerButton, PointerEvent, WheelEvent,
};
use viewctl_rs::input::Surface;
use viewctl_rs::scene::{Scene, demo};
use viewctl_rs::settings::ViewSettings;
use winit::event::{DeviceEvent, ElementState, MouseButton, MouseScrollDelta, WindowEvent};
use winit::keyboard::NamedKey;
use winit::window::{CursorGrabMode, Window};

/// Pixels per wheel line, matching what browsers report for `deltaMode` 0.
const LINE_HEIGHT: f32 = 100.0;

pub struct AppResponse {
    pub repaint: bool,
    pub exit: bool,
}

impl From<ControlResponse> for AppResponse {
    fn from(response: ControlResponse) -> Self {
        Self {
            repaint: response.repaint,
            exit: false,
        }
    }
}

pub struct App {
    pub window: Arc<Window>,
    scene: Scene,
    controls: ViewController,
    modifiers: Modifiers,
    cursor: (f32, f32),
    cursor_grabbed: bool,
}

impl App {
    pub fn new(window: Arc<Window>, settings: ViewSettings) -> Result<Self, ViewError> {
        let size = window.inner_size();
        let (width, height) = (size.width.max(1) as f32, size.height.max(1) as f32);

        let demo = demo::build(width / height)?;
        let mut scene = demo.scene;
        let surface = Surface::new(width, height);
        let mut controls = ViewController::new(&mut scene, demo.camera, surface, settings)
            .map_err(|err| ViewError::new("demo-controls").push_view(err))?;

        // Clicking the ground should not fly the camera into it.
        let floor = demo.floor;
        controls.set_pick_filter(move |hit| hit.object != floor);

        log::info!(
            "demo scene ready: {} nodes, {} boxes, {} signs",
            scene.node_count(),
            demo.boxes.len(),
            demo.signs.len()
        );

        Ok(Self {
            window,
            scene,
            controls,
            modifiers: Modifiers::none(),
            cursor: (0.0, 0.0),
            cursor_grabbed: false,
        })
    }

    pub fn handle_event(&mut self, event: &WindowEvent) -> AppResponse {
        let input = match event {
            WindowEvent::CloseRequested => {
                self.controls.dispose();
                return AppResponse {
                    repaint: false,
                    exit: true,
                };
            }
            WindowEvent::Resized(size) => {
                let (width, height) = (size.width as f32, size.height as f32);
                if let Err(err) = self.controls.resize(&mut self.scene, width, height) {
                    log::error!("resize failed: {err}");
                }
                return AppResponse {
                    repaint: true,
                    exit: false,
                };
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                let state = modifiers.state();
                self.modifiers = Modifiers {
                    alt: state.alt_key(),
                    control: state.control_key(),
                    shift: state.shift_key(),
                    meta: state.super_key(),
                };
                return AppResponse {
                    repaint: false,
                    exit: false,
                };
            }
            WindowEvent::CursorMoved { position, .. } => {
                let (x, y) = (position.x as f32, position.y as f32);
                let (last_x, last_y) = self.cursor;
                self.cursor = (x, y);
                // Locked pointers report motion through device events instead.
                if self.controls.surface().pointer_locked() {
                    return AppResponse {
                        repaint: false,
                        exit: false,
                    };
                }
                vec![InputEvent::PointerMove(
                    self.pointer(PointerButton::Primary)
                        .with_movement(x - last_x, y - last_y),
                )]
            }
            WindowEvent::MouseInput { state, button, .. } => {
                let button = match button {
                    MouseButton::Left => PointerButton::Primary,
                    MouseButton::Middle => PointerButton::Auxiliary,
                    MouseButton::Right => PointerButton::Secondary,
                    MouseButton::Back => PointerButton::Other(3),
                    MouseButton::Forward => PointerButton::Other(4),
                    MouseButton::Other(n) => PointerButton::Other(*n),
                };
                let evt = self.pointer(button);
                match state {
                    ElementState::Pressed if button == PointerButton::Secondary => {
                        vec![InputEvent::PointerDown(evt), InputEvent::ContextMenu(evt)]
                    }
                    ElementState::Pressed => vec![InputEvent::PointerDown(evt)],
                    ElementState::Released => vec![InputEvent::PointerUp(evt)],
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                let (delta_x, delta_y) = match delta {
                    MouseScrollDelta::LineDelta(x, y) => (-x * LINE_HEIGHT, -y * LINE_HEIGHT),
                    MouseScrollDelta::PixelDelta(pos) => (-pos.x as f32, -pos.y as f32),
                };
                vec![InputEvent::Wheel(WheelEvent {
                    delta_x,
                    delta_y,
                    modifiers: self.modifiers,
                })]
            }
            WindowEvent::KeyboardInput { event, .. } => {
                let key = match &event.logical_key {
                    winit::keyboard::Key::Named(NamedKey::Escape) => Key::Escape,
                    winit::keyboard::Key::Named(NamedKey::Alt) => Key::Modifier(ModifierKey::Alt),
                    winit::keyboard::Key::Named(NamedKey::Control) => {
                        Key::Modifier(ModifierKey::Control)
                    }
                    winit::keyboard::Key::Named(NamedKey::Shift) => {
                        Key::Modifier(ModifierKey::Shift)
                    }
                    winit::keyboard::Key::Named(NamedKey::Super) => Key::Modifier(ModifierKey::Meta),
                    winit::keyboard::Key::Character(text) => Key::Character(text.to_string()),
                    _ => Key::Other,
                };
                let evt = KeyEvent {
                    key,
                    modifiers: self.modifiers,
                };
                match event.state {
                    ElementState::Pressed => vec![InputEvent::KeyDown(evt)],
                    ElementState::Released => vec![InputEvent::KeyUp(evt)],
                }
            }
            _ => Vec::new(),
        };

        let mut response = AppResponse {
            repaint: false,
            exit: false,
        };
        for evt in &input {
            match self.controls.handle_input(&mut self.scene, evt) {
                Ok(r) => response.repaint |= AppResponse::from(r).repaint,
                Err(err) => log::error!("input {:?} failed: {err}", evt.kind()),
            }
        }
        self.sync_cursor_grab();
        response
    }

    /// Relative motion while the cursor is grabbed.
    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        let DeviceEvent::MouseMotion { delta: (dx, dy) } = event else {
            return;
        };
        if !self.controls.surface().pointer_locked() {
            return;
        }
        let evt = self
            .pointer(PointerButton::Primary)
            .with_movement(*dx as f32, *dy as f32);
        if let Err(err) = self
            .controls
            .handle_input(&mut self.scene, &InputEvent::PointerMove(evt))
        {
            log::error!("pointer motion failed: {err}");
        }
    }

    /// Advances the camera one tick and reports what the controller emitted.
    pub fn update(&mut self) {
        if let Err(err) = self.controls.update(&mut self.scene) {
            log::error!("camera update failed: {err}");
        }
        for event in self.controls.drain_events() {
            match event {
                ViewEvent::PrimaryPick(pick) | ViewEvent::SecondaryPick(pick) => {
                    match pick.object().and_then(|id| self.scene.node(id).ok()) {
                        Some(node) => log::info!("picked {}", node.name),
                        None => log::info!("picked nothing"),
                    }
                }
                ViewEvent::Focused(focus) => {
                    let name = self
                        .scene
                        .node(focus.object)
                        .map(|n| n.name.as_str())
                        .unwrap_or("?");
                    log::info!("focused {name} at {:?}", focus.point);
                }
            }
        }
        if let Ok(position) = self.scene.world_position(self.controls.camera()) {
            log::trace!(
                "camera at {position:?}, mode {}",
                self.controls.mode().name()
            );
        }
    }

    fn pointer(&self, button: PointerButton) -> PointerEvent {
        let (x, y) = self.cursor;
        self.controls.surface().pointer(x, y, button, self.modifiers)
    }

    fn sync_cursor_grab(&mut self) {
        let locked = self.controls.surface().pointer_locked();
        if locked == self.cursor_grabbed {
            return;
        }
        let grab = if locked {
            self.window
                .set_cursor_grab(CursorGrabMode::Locked)
                .or_else(|_| self.window.set_cursor_grab(CursorGrabMode::Confined))
        } else {
            self.window.set_cursor_grab(CursorGrabMode::None)
        };
        if let Err(err) = grab {
            log::warn!("cursor grab change failed: {err}");
        }
        self.window.set_cursor_visible(!locked);
        self.cursor_grabbed = locked;
    }
}
