//! Host-agnostic input events and pointer tracking.
//!
//! Positions are screen coordinates relative to the viewport element.

use kurbo::{Point, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Mouse button identifiers. Touch and pen contacts arrive as `Left`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };

    pub fn shift() -> Self {
        Self {
            shift: true,
            ..Self::NONE
        }
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::NONE
        }
    }

    /// Ctrl on most platforms, Cmd on macOS.
    pub fn command(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer event in screen coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Move {
        position: Point,
        #[serde(default)]
        modifiers: Modifiers,
    },
    Up {
        position: Point,
        button: MouseButton,
        #[serde(default)]
        modifiers: Modifiers,
    },
}

impl PointerEvent {
    pub fn down(position: impl Into<Point>, button: MouseButton) -> Self {
        Self::Down {
            position: position.into(),
            button,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn moved(position: impl Into<Point>) -> Self {
        Self::Move {
            position: position.into(),
            modifiers: Modifiers::NONE,
        }
    }

    pub fn up(position: impl Into<Point>, button: MouseButton) -> Self {
        Self::Up {
            position: position.into(),
            button,
            modifiers: Modifiers::NONE,
        }
    }

    /// Same event with different modifiers.
    pub fn with_modifiers(self, mods: Modifiers) -> Self {
        match self {
            Self::Down { position, button, .. } => Self::Down {
                position,
                button,
                modifiers: mods,
            },
            Self::Move { position, .. } => Self::Move {
                position,
                modifiers: mods,
            },
            Self::Up { position, button, .. } => Self::Up {
                position,
                button,
                modifiers: mods,
            },
        }
    }

    pub fn position(&self) -> Point {
        match self {
            Self::Down { position, .. } | Self::Move { position, .. } | Self::Up { position, .. } => {
                *position
            }
        }
    }

    pub fn modifiers(&self) -> Modifiers {
        match self {
            Self::Down { modifiers, .. } | Self::Move { modifiers, .. } | Self::Up { modifiers, .. } => {
                *modifiers
            }
        }
    }
}

/// Wheel/trackpad scroll at a screen position.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct WheelEvent {
    pub position: Point,
    /// Scroll delta in screen pixels; positive `y` scrolls down.
    pub delta: Vec2,
    #[serde(default)]
    pub modifiers: Modifiers,
}

/// Keys the editor reacts to. Everything else arrives as `Character`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Key {
    Delete,
    Backspace,
    Escape,
    Character(String),
}

impl Key {
    /// Map a DOM `KeyboardEvent.key` value.
    pub fn from_dom(key: &str) -> Self {
        match key {
            "Delete" => Self::Delete,
            "Backspace" => Self::Backspace,
            "Escape" | "Esc" => Self::Escape,
            other => Self::Character(other.to_lowercase()),
        }
    }

    /// Whether this is the given (case-insensitive) character key.
    pub fn is_char(&self, c: &str) -> bool {
        matches!(self, Self::Character(s) if s.eq_ignore_ascii_case(c))
    }
}

/// A key press.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeyEvent {
    pub key: Key,
    #[serde(default)]
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }
}

/// Tracks pointer state between events.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Current pointer position in screen coordinates.
    pub pointer_position: Point,
    /// Previous pointer position for delta calculations.
    pub previous_pointer_position: Point,
    pressed_buttons: HashSet<MouseButton>,
    /// Modifiers carried by the latest event.
    pub modifiers: Modifiers,
    /// Start position of the current primary-button drag.
    pub drag_start: Option<Point>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process a pointer event.
    pub fn handle_pointer_event(&mut self, event: &PointerEvent) {
        self.previous_pointer_position = self.pointer_position;
        self.pointer_position = event.position();
        self.modifiers = event.modifiers();
        match *event {
            PointerEvent::Down { position, button, .. } => {
                self.pressed_buttons.insert(button);
                if button == MouseButton::Left {
                    self.drag_start = Some(position);
                }
            }
            PointerEvent::Up { button, .. } => {
                self.pressed_buttons.remove(&button);
                if button == MouseButton::Left {
                    self.drag_start = None;
                }
            }
            PointerEvent::Move { .. } => {}
        }
    }

    /// Check if a button is currently pressed.
    pub fn is_button_pressed(&self, button: MouseButton) -> bool {
        self.pressed_buttons.contains(&button)
    }

    /// Pointer movement since the previous event.
    pub fn pointer_delta(&self) -> Vec2 {
        self.pointer_position - self.previous_pointer_position
    }

    /// Get the drag delta from start position, if dragging.
    pub fn drag_delta(&self) -> Option<Vec2> {
        self.drag_start.map(|start| self.pointer_position - start)
    }

    /// Forget pressed buttons (pointer left the surface or was cancelled).
    pub fn reset_buttons(&mut self) {
        self.pressed_buttons.clear();
        self.drag_start = None;
    }
}
