use serde::{Deserialize, Serialize};

/// Keyboard modifiers that can gate a gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ModifierKey {
    Alt,
    Control,
    Shift,
    Meta,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub alt: bool,
    pub control: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn none() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: ModifierKey) -> Self {
        match key {
            ModifierKey::Alt => self.alt = true,
            ModifierKey::Control => self.control = true,
            ModifierKey::Shift => self.shift = true,
            ModifierKey::Meta => self.meta = true,
        }
        self
    }

    pub fn is_held(&self, key: ModifierKey) -> bool {
        match key {
            ModifierKey::Alt => self.alt,
            ModifierKey::Control => self.control,
            ModifierKey::Shift => self.shift,
            ModifierKey::Meta => self.meta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Auxiliary,
    Secondary,
    Other(u16),
}

/// Pointer sample in client coordinates of the target element.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub client_x: f32,
    pub client_y: f32,
    /// Relative motion since the previous sample; meaningful while pointer-locked.
    pub movement_x: f32,
    pub movement_y: f32,
    pub button: PointerButton,
    pub modifiers: Modifiers,
    pub target_width: f32,
    pub target_height: f32,
}

impl PointerEvent {
    pub fn with_movement(mut self, movement_x: f32, movement_y: f32) -> Self {
        self.movement_x = movement_x;
        self.movement_y = movement_y;
        self
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    pub delta_x: f32,
    pub delta_y: f32,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Key {
    Escape,
    Modifier(ModifierKey),
    Character(String),
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputKind {
    PointerDown,
    PointerMove,
    PointerUp,
    Wheel,
    KeyDown,
    KeyUp,
    ContextMenu,
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown(PointerEvent),
    PointerMove(PointerEvent),
    PointerUp(PointerEvent),
    Wheel(WheelEvent),
    KeyDown(KeyEvent),
    KeyUp(KeyEvent),
    ContextMenu(PointerEvent),
}

impl InputEvent {
    pub fn kind(&self) -> InputKind {
        match self {
            InputEvent::PointerDown(_) => InputKind::PointerDown,
            InputEvent::PointerMove(_) => InputKind::PointerMove,
            InputEvent::PointerUp(_) => InputKind::PointerUp,
            InputEvent::Wheel(_) => InputKind::Wheel,
            InputEvent::KeyDown(_) => InputKind::KeyDown,
            InputEvent::KeyUp(_) => InputKind::KeyUp,
            InputEvent::ContextMenu(_) => InputKind::ContextMenu,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn modifiers_report_held_keys() {
        let mods = Modifiers::none().with(ModifierKey::Alt).with(ModifierKey::Shift);
        assert!(mods.is_held(ModifierKey::Alt));
        assert!(mods.is_held(ModifierKey::Shift));
        assert!(!mods.is_held(ModifierKey::Control));
        assert!(!mods.is_held(ModifierKey::Meta));
    }

    #[test]
    fn modifier_key_names_round_trip_through_serde() {
        let json = serde_json::to_string(&ModifierKey::Control).unwrap();
        assert_eq!(json, "\"Control\"");
        let back: ModifierKey = serde_json::from_str("\"Alt\"").unwrap();
        assert_eq!(back, ModifierKey::Alt);
    }
}
