//! Input abstraction layer.
//!
//! Normalizes pointer, wheel, keyboard and host lifecycle events into a
//! single `InputEvent` enum consumed by the editor. Pointer positions are
//! client coordinates as reported by the host, before surface scaling.

use dd_core::{Point, Rect, Size, Vec2};

/// Modifier keys held while an event fired.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub const SHIFT: Modifiers = Modifiers {
        shift: true,
        ..Modifiers::NONE
    };

    pub const CTRL: Modifiers = Modifiers {
        ctrl: true,
        ..Modifiers::NONE
    };

    /// The platform command key: ⌘ on macOS, Ctrl elsewhere.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    PointerDown { pos: Point, modifiers: Modifiers },
    PointerMove { pos: Point, modifiers: Modifiers },
    PointerUp { pos: Point, modifiers: Modifiers },

    /// Scroll wheel or trackpad. Positive `delta.y` scrolls down.
    Wheel {
        pos: Point,
        delta: Vec2,
        modifiers: Modifiers,
    },

    /// `key` is the `KeyboardEvent.key` value (e.g. `"z"`, `" "`, `"Delete"`).
    KeyDown {
        key: String,
        modifiers: Modifiers,
        repeat: bool,
    },
    KeyUp { key: String, modifiers: Modifiers },

    /// The surface was laid out again.
    Resize { client_rect: Rect, pixel_size: Size },

    /// A timer started through `Effect::StartTimer` elapsed.
    TimerElapsed { token: u64 },
}

impl InputEvent {
    pub fn pointer_down(x: f64, y: f64) -> Self {
        Self::PointerDown {
            pos: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_move(x: f64, y: f64) -> Self {
        Self::PointerMove {
            pos: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn pointer_up(x: f64, y: f64) -> Self {
        Self::PointerUp {
            pos: Point::new(x, y),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn key(key: &str, modifiers: Modifiers) -> Self {
        Self::KeyDown {
            key: key.to_string(),
            modifiers,
            repeat: false,
        }
    }

    pub fn key_up(key: &str) -> Self {
        Self::KeyUp {
            key: key.to_string(),
            modifiers: Modifiers::NONE,
        }
    }

    /// Pointer position, for pointer and wheel events.
    pub fn position(&self) -> Option<Point> {
        match self {
            Self::PointerDown { pos, .. }
            | Self::PointerMove { pos, .. }
            | Self::PointerUp { pos, .. }
            | Self::Wheel { pos, .. } => Some(*pos),
            _ => None,
        }
    }
}
