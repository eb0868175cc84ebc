//! Pointer, wheel and keyboard input as delivered by the host element.

pub mod event;
pub mod surface;

pub use event::{
    InputEvent, InputKind, Key, KeyEvent, ModifierKey, Modifiers, PointerButton, PointerEvent,
    WheelEvent,
};
pub use surface::{Subscription, Surface};
