//! Resize handle geometry and pointer hit testing.

use crate::input::PointerTarget;
use crate::selection::Selection;
use crate::store::WidgetStore;
use crate::viewport::Viewport;
use crate::widget::{Widget, WidgetId};
use kurbo::Point;

/// Handle size in screen pixels.
pub const HANDLE_SIZE: f64 = 8.0;
/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 6.0;

/// The resize handle of a widget, at its bottom-right corner.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    pub widget: WidgetId,
    /// Position in world coordinates.
    pub position: Point,
}

impl Handle {
    pub fn for_widget(widget: &Widget) -> Self {
        Self {
            widget: widget.id,
            position: Point::new(widget.x + widget.w, widget.y + widget.h),
        }
    }

    /// Check if a point (in world coordinates) hits this handle.
    /// `tolerance` should already be divided by the canvas zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point.x - self.position.x).abs() <= tolerance
            && (point.y - self.position.y).abs() <= tolerance
    }
}

/// Handles shown for the current selection. Locked widgets get none.
pub fn selection_handles(store: &WidgetStore, selection: &Selection) -> Vec<Handle> {
    selection
        .ids()
        .iter()
        .filter_map(|&id| store.get(id))
        .filter(|w| !w.locked && w.visible)
        .map(Handle::for_widget)
        .collect()
}

/// Topmost visible widget containing `point` (world coordinates).
pub fn widget_at(store: &WidgetStore, point: Point) -> Option<WidgetId> {
    store
        .render_order()
        .into_iter()
        .rev()
        .find(|w| w.visible && w.bounds().contains(point))
        .map(|w| w.id)
}

/// Resolve what lies under a screen-space pointer position.
///
/// Handles win over widget bodies, widget bodies over empty canvas.
pub fn resolve_target(
    store: &WidgetStore,
    selection: &Selection,
    viewport: &Viewport,
    screen: Point,
) -> PointerTarget {
    let world = viewport.screen_to_world(screen);
    let scale = if viewport.canvas_scale > 0.0 { viewport.canvas_scale } else { 1.0 };
    let tolerance = HANDLE_HIT_TOLERANCE / scale;
    if let Some(handle) = selection_handles(store, selection)
        .into_iter()
        .rev()
        .find(|h| h.hit_test(world, tolerance))
    {
        return PointerTarget::ResizeHandle(handle.widget);
    }
    match widget_at(store, world) {
        Some(id) => PointerTarget::Widget(id),
        None => PointerTarget::Canvas,
    }
}
