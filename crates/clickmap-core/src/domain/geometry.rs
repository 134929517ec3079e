//! Canvas-local and virtual-desktop coordinates.
//!
//! Targets live on a canvas whose top-left corner sits at a fixed point of the
//! virtual desktop (the union of all monitors). Target positions are stored
//! relative to that corner and refer to the target's top-left; a click lands
//! on the target's visual centre:
//!
//! ```text
//! screen = canvas_origin + position + target_size / 2
//! ```

use serde::{Deserialize, Serialize};

/// Horizontal and vertical distance between cascaded spawn slots.
const CASCADE_STEP: f64 = 70.0;

/// Number of cascaded slots per row before wrapping.
const CASCADE_COLUMNS: usize = 5;

/// A point in canvas-local coordinates (may be fractional).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CanvasPoint {
    pub x: f64,
    pub y: f64,
}

impl CanvasPoint {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Returns the `index`-th slot of a five-column grid starting at `self`.
    ///
    /// Used to place new targets near the spawn point without stacking them.
    pub fn cascade(self, index: usize) -> CanvasPoint {
        let column = (index % CASCADE_COLUMNS) as f64;
        let row = (index / CASCADE_COLUMNS) as f64;
        CanvasPoint::new(self.x + column * CASCADE_STEP, self.y + row * CASCADE_STEP)
    }
}

/// An absolute pixel position on the virtual desktop.
///
/// Either coordinate may be negative when a monitor sits left of or above the
/// primary one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct ScreenPoint {
    pub x: i32,
    pub y: i32,
}

impl ScreenPoint {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

/// Placement of the canvas on the desktop and the visual size of a target.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasGeometry {
    /// Virtual-desktop position of the canvas' top-left corner.
    pub origin: ScreenPoint,
    /// Width of a target marker in pixels.
    pub target_width: f64,
    /// Height of a target marker in pixels.
    pub target_height: f64,
}

impl Default for CanvasGeometry {
    fn default() -> Self {
        Self {
            origin: ScreenPoint::default(),
            target_width: 40.0,
            target_height: 40.0,
        }
    }
}

impl CanvasGeometry {
    /// Resolves the screen point a target at `position` is clicked at.
    ///
    /// The result is rounded to the nearest pixel.
    pub fn click_point(&self, position: CanvasPoint) -> ScreenPoint {
        let x = f64::from(self.origin.x) + position.x + self.target_width / 2.0;
        let y = f64::from(self.origin.y) + position.y + self.target_height / 2.0;
        ScreenPoint::new(x.round() as i32, y.round() as i32)
    }
}
