//! Shared configuration for the node gizmo
//!
//! This crate holds the canvas geometry the gizmo converts mouse positions
//! with, and the tuning constants of the interaction engine.

use serde::{Deserialize, Serialize};

#[cfg(feature = "bevy")]
use bevy::prelude::Resource;

/// Default canvas width in CSS pixels
pub const DEFAULT_WIDTH: u32 = 1920;

/// Default canvas height in CSS pixels
pub const DEFAULT_HEIGHT: u32 = 1080;

/// Default scale factor (1.0 = no scaling)
pub const DEFAULT_SCALE: f32 = 1.0;

/// Radians of rotation per canvas-size of mouse travel
pub const DEFAULT_ROTATE_SENSITIVITY: f32 = 4.0;

/// Gizmo size is the eye distance divided by this and the projection scale
pub const DEFAULT_SCREEN_SIZE_DIVISOR: f32 = 10.0;

/// Hovered handle colour (yellow)
pub const DEFAULT_HIGHLIGHT_COLOR: [f32; 4] = [1.0, 1.0, 0.0, 1.0];

/// Below this, a drag ray counts as parallel to the handle axis
pub const DEFAULT_PARALLEL_EPSILON: f32 = 1e-6;

/// Canvas display configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
pub struct DisplayConfig {
    /// Canvas client width in CSS pixels
    pub width: u32,
    /// Canvas client height in CSS pixels
    pub height: u32,
    /// Device pixel ratio of the drawing buffer
    pub scale: f32,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            scale: DEFAULT_SCALE,
        }
    }
}

impl DisplayConfig {
    /// Create a new display config with the given dimensions
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            scale: DEFAULT_SCALE,
        }
    }

    /// Get width as f32 for calculations
    pub fn width_f32(&self) -> f32 {
        self.width as f32
    }

    /// Get height as f32 for calculations
    pub fn height_f32(&self) -> f32 {
        self.height as f32
    }

    /// Drawing-buffer width in native pixels
    pub fn scaled_width(&self) -> u32 {
        (self.width as f32 * self.scale) as u32
    }

    /// Drawing-buffer height in native pixels
    pub fn scaled_height(&self) -> u32 {
        (self.height as f32 * self.scale) as u32
    }
}

/// Interaction tuning of the gizmo
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "bevy", derive(Resource))]
#[serde(default)]
pub struct GizmoConfig {
    /// Double-click attaches to the picked node itself, inserting a transform
    /// when it has no editable ancestor, instead of searching the hit path
    pub auto_insert_transform: bool,
    pub rotate_sensitivity: f32,
    pub screen_size_divisor: f32,
    /// RGBA colour of the hovered handle
    pub highlight_color: [f32; 4],
    pub parallel_epsilon: f32,
}

impl Default for GizmoConfig {
    fn default() -> Self {
        Self {
            auto_insert_transform: false,
            rotate_sensitivity: DEFAULT_ROTATE_SENSITIVITY,
            screen_size_divisor: DEFAULT_SCREEN_SIZE_DIVISOR,
            highlight_color: DEFAULT_HIGHLIGHT_COLOR,
            parallel_epsilon: DEFAULT_PARALLEL_EPSILON,
        }
    }
}
