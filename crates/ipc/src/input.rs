//! Mouse input events, in canvas pixels (origin top-left, Y down).

use serde::{Deserialize, Serialize};

/// Mouse input events.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum MouseEvent {
    Move { x: f32, y: f32 },
    ButtonDown { button: MouseButton, x: f32, y: f32 },
    ButtonUp { button: MouseButton, x: f32, y: f32 },
    /// Cursor left the canvas; ends a drag like a button release.
    Out { x: f32, y: f32 },
    DoubleClick { button: MouseButton, x: f32, y: f32 },
    Scroll { delta_x: f32, delta_y: f32, x: f32, y: f32 },
}

impl MouseEvent {
    /// Cursor position carried by the event.
    pub fn position(&self) -> [f32; 2] {
        match *self {
            MouseEvent::Move { x, y }
            | MouseEvent::ButtonDown { x, y, .. }
            | MouseEvent::ButtonUp { x, y, .. }
            | MouseEvent::Out { x, y }
            | MouseEvent::DoubleClick { x, y, .. }
            | MouseEvent::Scroll { x, y, .. } => [x, y],
        }
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}
