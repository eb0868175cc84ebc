use std::collections::HashMap;

use super::event::{InputEvent, InputKind, Modifiers, PointerButton, PointerEvent};

/// Token returned by [`Surface::listen`]; pass it back to [`Surface::unlisten`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Subscription {
    id: u64,
    kind: InputKind,
}

impl Subscription {
    pub fn kind(&self) -> InputKind {
        self.kind
    }
}

/// The element input arrives on: its size, the registered listeners and the
/// exclusive pointer-lock state.
#[derive(Debug, Clone)]
pub struct Surface {
    width: f32,
    height: f32,
    tab_index: i32,
    pointer_locked: bool,
    listeners: HashMap<u64, InputKind>,
    next_id: u64,
}

impl Surface {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            width,
            height,
            tab_index: -1,
            pointer_locked: false,
            listeners: HashMap::new(),
            next_id: 0,
        }
    }

    pub fn size(&self) -> (f32, f32) {
        (self.width, self.height)
    }

    pub fn resize(&mut self, width: f32, height: f32) {
        self.width = width;
        self.height = height;
    }

    pub fn aspect(&self) -> f32 {
        if self.height > 0.0 {
            self.width / self.height
        } else {
            1.0
        }
    }

    pub fn tab_index(&self) -> i32 {
        self.tab_index
    }

    pub fn set_tab_index(&mut self, tab_index: i32) {
        self.tab_index = tab_index;
    }

    /// Key events only reach elements with a non-negative tab index.
    pub fn is_focusable(&self) -> bool {
        self.tab_index >= 0
    }

    pub fn listen(&mut self, kind: InputKind) -> Subscription {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.insert(id, kind);
        Subscription { id, kind }
    }

    /// Removes a listener. Returns `false` when it was already removed.
    pub fn unlisten(&mut self, subscription: Subscription) -> bool {
        self.listeners.remove(&subscription.id).is_some()
    }

    pub fn is_listening(&self, subscription: &Subscription) -> bool {
        self.listeners.contains_key(&subscription.id)
    }

    pub fn listener_count(&self, kind: InputKind) -> usize {
        self.listeners.values().filter(|k| **k == kind).count()
    }

    /// True when at least one listener wants this kind of event.
    pub fn routes(&self, event: &InputEvent) -> bool {
        let kind = event.kind();
        if matches!(kind, InputKind::KeyDown | InputKind::KeyUp) && !self.is_focusable() {
            return false;
        }
        self.listeners.values().any(|k| *k == kind)
    }

    pub fn request_pointer_lock(&mut self) {
        self.pointer_locked = true;
    }

    pub fn exit_pointer_lock(&mut self) {
        self.pointer_locked = false;
    }

    pub fn pointer_locked(&self) -> bool {
        self.pointer_locked
    }

    /// Builds a pointer event targeted at this surface.
    pub fn pointer(
        &self,
        client_x: f32,
        client_y: f32,
        button: PointerButton,
        modifiers: Modifiers,
    ) -> PointerEvent {
        PointerEvent {
            client_x,
            client_y,
            movement_x: 0.0,
            movement_y: 0.0,
            button,
            modifiers,
            target_width: self.width,
            target_height: self.height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::event::{Key, KeyEvent};

    #[test]
    fn unlisten_is_idempotent() {
        let mut surface = Surface::new(800.0, 600.0);
        let sub = surface.listen(InputKind::PointerMove);
        assert!(surface.is_listening(&sub));
        assert!(surface.unlisten(sub));
        assert!(!surface.unlisten(sub));
        assert_eq!(surface.listener_count(InputKind::PointerMove), 0);
    }

    #[test]
    fn tokens_are_distinct_per_registration() {
        let mut surface = Surface::new(800.0, 600.0);
        let a = surface.listen(InputKind::Wheel);
        let b = surface.listen(InputKind::Wheel);
        assert_ne!(a, b);
        surface.unlisten(a);
        assert!(surface.is_listening(&b));
        assert_eq!(surface.listener_count(InputKind::Wheel), 1);
    }

    #[test]
    fn key_events_need_focusable_surface() {
        let mut surface = Surface::new(800.0, 600.0);
        surface.listen(InputKind::KeyDown);
        let key = InputEvent::KeyDown(KeyEvent {
            key: Key::Escape,
            modifiers: Modifiers::none(),
        });
        assert!(!surface.routes(&key));
        surface.set_tab_index(0);
        assert!(surface.routes(&key));
    }

    #[test]
    fn pointer_event_carries_target_size() {
        let surface = Surface::new(640.0, 480.0);
        let evt = surface.pointer(10.0, 20.0, PointerButton::Primary, Modifiers::none());
        assert_eq!((evt.target_width, evt.target_height), (640.0, 480.0));
        assert_eq!((evt.movement_x, evt.movement_y), (0.0, 0.0));
    }

    #[test]
    fn pointer_lock_toggles() {
        let mut surface = Surface::new(1.0, 1.0);
        surface.request_pointer_lock();
        assert!(surface.pointer_locked());
        surface.exit_pointer_lock();
        surface.exit_pointer_lock();
        assert!(!surface.pointer_locked());
    }
}
