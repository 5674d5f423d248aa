//! Viewport module for the screen to world coordinate pipeline.
//!
//! Pointer coordinates pass through three independent stages:
//!
//! ```text
//! screen_px  / ui_scale  - canvas_origin  - pan  / canvas_scale  = world
//! ```
//!
//! `ui_scale` is the zoom of the whole editor interface, `canvas_origin` is
//! where the canvas element sits inside that interface, and `pan` /
//! `canvas_scale` are the canvas's own scroll and zoom.

use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Canvas zoom limits.
pub const MIN_CANVAS_SCALE: f64 = 0.2;
pub const MAX_CANVAS_SCALE: f64 = 3.0;

/// Interface zoom limits.
pub const MIN_UI_SCALE: f64 = 0.5;
pub const MAX_UI_SCALE: f64 = 2.0;

/// Multiplier applied per wheel notch when zooming the canvas.
const WHEEL_ZOOM_IN: f64 = 1.1;
const WHEEL_ZOOM_OUT: f64 = 0.9;

/// Pan and zoom state of the design canvas.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    /// Interface zoom factor.
    pub ui_scale: f64,
    /// Top-left of the canvas element, in interface pixels.
    pub canvas_origin: Point,
    /// Canvas scroll offset, in interface pixels.
    pub pan: Vec2,
    /// Canvas zoom factor.
    pub canvas_scale: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            ui_scale: 1.0,
            canvas_origin: Point::ZERO,
            pan: Vec2::ZERO,
            canvas_scale: 1.0,
        }
    }
}

/// Zero or non-finite scales behave like 1.
fn effective(scale: f64) -> f64 {
    if scale.is_finite() && scale != 0.0 { scale } else { 1.0 }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Place the canvas element, given its top-left in raw screen pixels.
    pub fn set_canvas_origin_screen(&mut self, screen: Point) {
        let ui = effective(self.ui_scale);
        self.canvas_origin = Point::new(screen.x / ui, screen.y / ui);
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen: Point) -> Point {
        let ui = effective(self.ui_scale);
        let scale = effective(self.canvas_scale);
        let x = (screen.x / ui - self.canvas_origin.x - self.pan.x) / scale;
        let y = (screen.y / ui - self.canvas_origin.y - self.pan.y) / scale;
        Point::new(x, y)
    }

    /// Convert a world point back to screen pixels.
    pub fn world_to_screen(&self, world: Point) -> Point {
        self.transform() * world
    }

    /// World to screen transform for rendering.
    pub fn transform(&self) -> Affine {
        let ui = effective(self.ui_scale);
        let scale = effective(self.canvas_scale);
        Affine::scale(ui)
            * Affine::translate(self.canvas_origin.to_vec2() + self.pan)
            * Affine::scale(scale)
    }

    /// Zoom the canvas one wheel notch. Positive `delta_y` zooms out.
    pub fn wheel_zoom(&mut self, delta_y: f64) {
        let factor = if delta_y > 0.0 { WHEEL_ZOOM_OUT } else { WHEEL_ZOOM_IN };
        self.set_canvas_scale(self.canvas_scale * factor);
    }

    pub fn set_canvas_scale(&mut self, scale: f64) {
        self.canvas_scale = effective(scale).clamp(MIN_CANVAS_SCALE, MAX_CANVAS_SCALE);
    }

    pub fn set_ui_scale(&mut self, scale: f64) {
        self.ui_scale = effective(scale).clamp(MIN_UI_SCALE, MAX_UI_SCALE);
    }

    /// Reset pan and canvas zoom.
    pub fn reset(&mut self) {
        self.pan = Vec2::ZERO;
        self.canvas_scale = 1.0;
    }
}
