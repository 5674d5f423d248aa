//! Host-neutral pointer and keyboard input types.

use crate::widget::WidgetId;
use kurbo::Point;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Key that turns any pointer-down on the canvas into a pan gesture.
pub const PAN_KEY: &str = "Space";

/// Pointer buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Modifier keys held during an event.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    /// Ctrl on most platforms, Cmd on macOS.
    pub fn multi_select(&self) -> bool {
        self.ctrl || self.meta
    }

    pub fn ctrl() -> Self {
        Self {
            ctrl: true,
            ..Self::default()
        }
    }
}

/// A pointer button event as delivered by the host.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    /// Position in screen pixels.
    pub position: Point,
    pub button: MouseButton,
    pub modifiers: Modifiers,
}

impl PointerEvent {
    /// Left-button event with no modifiers held.
    pub fn primary(position: Point) -> Self {
        Self {
            position,
            button: MouseButton::Left,
            modifiers: Modifiers::default(),
        }
    }

    pub fn with_modifiers(mut self, modifiers: Modifiers) -> Self {
        self.modifiers = modifiers;
        self
    }

    pub fn is_primary(&self) -> bool {
        self.button == MouseButton::Left
    }
}

/// What the host found under the pointer when a button went down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointerTarget {
    /// The body of a widget.
    Widget(WidgetId),
    /// The resize handle drawn on a widget.
    ResizeHandle(WidgetId),
    /// Empty canvas background.
    Canvas,
    /// Anything else (rulers, panels, overlays).
    Outside,
}

/// A key going down or up, named by its key code.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum KeyEvent {
    Pressed(String),
    Released(String),
}

/// Keys and modifiers currently held, as reported by the host.
#[derive(Debug, Clone, Default)]
pub struct InputState {
    /// Last known pointer position in screen pixels.
    pub pointer_position: Point,
    /// Modifiers held at the last event.
    pub modifiers: Modifiers,
    pressed_keys: HashSet<String>,
}

impl InputState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a key press or release.
    pub fn handle_key_event(&mut self, event: KeyEvent) {
        match event {
            KeyEvent::Pressed(key) => {
                self.pressed_keys.insert(key);
            }
            KeyEvent::Released(key) => {
                self.pressed_keys.remove(&key);
            }
        }
    }

    pub fn set_modifiers(&mut self, modifiers: Modifiers) {
        self.modifiers = modifiers;
    }

    pub fn is_key_pressed(&self, key: &str) -> bool {
        self.pressed_keys.contains(key)
    }

    /// Whether the pan activation key is held.
    pub fn is_panning_key_held(&self) -> bool {
        self.is_key_pressed(PAN_KEY)
    }

    /// Drop all held keys, e.g. when the window loses focus.
    pub fn release_all(&mut self) {
        self.pressed_keys.clear();
        self.modifiers = Modifiers::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_press() {
        let mut input = InputState::new();
        input.handle_key_event(KeyEvent::Pressed(PAN_KEY.to_string()));
        assert!(input.is_panning_key_held());
        input.handle_key_event(KeyEvent::Released(PAN_KEY.to_string()));
        assert!(!input.is_panning_key_held());
    }

    #[test]
    fn test_multi_select_modifier() {
        assert!(Modifiers::ctrl().multi_select());
        let meta = Modifiers {
            meta: true,
            ..Modifiers::default()
        };
        assert!(meta.multi_select());
        assert!(!Modifiers::default().multi_select());
    }

    #[test]
    fn test_pointer_event_builders() {
        let event = PointerEvent::primary(Point::new(3.0, 4.0)).with_modifiers(Modifiers::ctrl());
        assert!(event.is_primary());
        assert!(event.modifiers.multi_select());
        let right = PointerEvent {
            button: MouseButton::Right,
            ..event
        };
        assert!(!right.is_primary());
    }

    #[test]
    fn test_release_all() {
        let mut input = InputState::new();
        input.handle_key_event(KeyEvent::Pressed("a".to_string()));
        input.set_modifiers(Modifiers::ctrl());
        input.release_all();
        assert!(!input.is_key_pressed("a"));
        assert_eq!(input.modifiers, Modifiers::default());
    }
}
