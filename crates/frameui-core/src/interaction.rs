//! Canvas pointer gestures: pan, drag, resize and marquee selection.

use crate::input::{PointerEvent, PointerTarget};
use crate::scene::Scene;
use crate::snap::{Grid, snap_size, snap_to_grid};
use crate::viewport::Viewport;
use crate::widget::WidgetId;
use kurbo::{Point, Rect, Size, Vec2};

/// The gesture currently in progress on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    /// Waiting for a pointer-down.
    #[default]
    Idle,
    /// Scrolling the canvas.
    Panning {
        /// Pointer position in raw screen pixels.
        start_pointer: Point,
        start_pan: Vec2,
    },
    /// Moving a widget (and possibly the rest of the selection).
    Dragging {
        target: WidgetId,
        /// Pointer position minus widget origin, in world units.
        offset: Vec2,
    },
    /// Changing a widget's size from its bottom-right handle.
    Resizing {
        target: WidgetId,
        /// Pointer position in world units.
        start_pointer: Point,
        start_size: Size,
    },
    /// Rubber-band selection. Both corners are world points.
    Marquee { start: Point, current: Point },
}

impl Gesture {
    pub fn name(&self) -> &'static str {
        match self {
            Gesture::Idle => "idle",
            Gesture::Panning { .. } => "panning",
            Gesture::Dragging { .. } => "dragging",
            Gesture::Resizing { .. } => "resizing",
            Gesture::Marquee { .. } => "marquee",
        }
    }
}

/// Pointer-event state machine for the design canvas.
///
/// Exactly one gesture is open at a time. The controller owns no widget
/// state; each event receives the scene and viewport it acts on.
#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    gesture: Gesture,
    /// Latest marquee pointer position (screen pixels) not yet applied.
    pending_marquee: Option<Point>,
}

impl InteractionController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &Gesture {
        &self.gesture
    }

    pub fn is_idle(&self) -> bool {
        matches!(self.gesture, Gesture::Idle)
    }

    /// Current marquee rectangle in world coordinates, for the overlay.
    pub fn marquee_rect(&self) -> Option<Rect> {
        match self.gesture {
            Gesture::Marquee { start, current } => Some(Rect::from_points(start, current)),
            _ => None,
        }
    }

    fn enter(&mut self, gesture: Gesture) {
        log::debug!("gesture {} -> {}", self.gesture.name(), gesture.name());
        self.gesture = gesture;
    }

    /// Handle a pointer-down on the canvas surface.
    ///
    /// `target` is what the host hit-tested under the pointer (see
    /// [`crate::handles::resolve_target`]). Ignored while another gesture
    /// is open.
    pub fn pointer_down(
        &mut self,
        scene: &mut Scene,
        viewport: &Viewport,
        event: PointerEvent,
        target: PointerTarget,
        pan_key_held: bool,
    ) {
        if !self.is_idle() {
            log::debug!("pointer down ignored during {}", self.gesture.name());
            return;
        }
        if !event.is_primary() || target == PointerTarget::Outside {
            return;
        }

        if pan_key_held {
            self.enter(Gesture::Panning {
                start_pointer: event.position,
                start_pan: viewport.pan,
            });
            return;
        }

        let world = viewport.screen_to_world(event.position);
        match target {
            PointerTarget::ResizeHandle(id) => {
                let Some(widget) = scene.store.get(id) else {
                    return;
                };
                if widget.locked {
                    return;
                }
                let start_size = widget.size();
                scene.push_history();
                scene.selection.select_only(id);
                self.enter(Gesture::Resizing {
                    target: id,
                    start_pointer: world,
                    start_size,
                });
            }
            PointerTarget::Widget(id) => {
                let Some(widget) = scene.store.get(id) else {
                    return;
                };
                if event.modifiers.multi_select() {
                    scene.selection.toggle(id);
                    return;
                }
                let (locked, origin) = (widget.locked, widget.origin());
                if !scene.selection.contains(id) {
                    scene.selection.select_only(id);
                }
                if locked {
                    return;
                }
                scene.push_history();
                self.enter(Gesture::Dragging {
                    target: id,
                    offset: world - origin,
                });
            }
            PointerTarget::Canvas => {
                if event.modifiers.multi_select() {
                    return;
                }
                scene.selection.clear();
                self.pending_marquee = None;
                self.enter(Gesture::Marquee {
                    start: world,
                    current: world,
                });
            }
            PointerTarget::Outside => {}
        }
    }

    /// Handle pointer motion. `position` is in screen pixels.
    pub fn pointer_move(
        &mut self,
        scene: &mut Scene,
        viewport: &mut Viewport,
        grid: &Grid,
        position: Point,
    ) {
        match self.gesture {
            Gesture::Idle => {}
            Gesture::Panning {
                start_pointer,
                start_pan,
            } => {
                viewport.pan = start_pan + (position - start_pointer);
            }
            Gesture::Dragging { target, offset } => {
                let Some(widget) = scene.store.get(target) else {
                    return;
                };
                let mut next = viewport.screen_to_world(position) - offset;
                if let Some(step) = grid.active_step() {
                    next = snap_to_grid(next, step);
                }
                let delta = next - widget.origin();
                if delta == Vec2::ZERO {
                    return;
                }
                let roots = if scene.selection.len() > 1 && scene.selection.contains(target) {
                    scene.selection.roots(&scene.store)
                } else {
                    vec![target]
                };
                for root in roots {
                    scene.store.translate_subtree(root, delta.x, delta.y);
                }
            }
            Gesture::Resizing {
                target,
                start_pointer,
                start_size,
            } => {
                if !scene.store.contains(target) {
                    return;
                }
                let delta = viewport.screen_to_world(position) - start_pointer;
                let step = grid.active_step();
                let w = snap_size(start_size.width + delta.x, step);
                let h = snap_size(start_size.height + delta.y, step);
                scene.store.resize(target, w, h);
            }
            Gesture::Marquee { .. } => {
                self.pending_marquee = Some(position);
            }
        }
    }

    /// Apply the newest marquee position. Call once per rendered frame.
    pub fn on_frame(&mut self, viewport: &Viewport) {
        let Some(position) = self.pending_marquee.take() else {
            return;
        };
        if let Gesture::Marquee { current, .. } = &mut self.gesture {
            *current = viewport.screen_to_world(position);
        }
    }

    /// Finish the open gesture.
    pub fn pointer_up(&mut self, scene: &mut Scene) {
        self.pending_marquee = None;
        if let Gesture::Marquee { start, current } = self.gesture {
            let rect = Rect::from_points(start, current);
            let hits: Vec<WidgetId> = scene
                .store
                .iter()
                .filter(|w| w.overlaps(rect))
                .map(|w| w.id)
                .collect();
            log::debug!("marquee selected {} widgets", hits.len());
            scene.selection.replace_with(hits);
        }
        self.enter(Gesture::Idle);
    }

    /// Abandon the open gesture without further changes.
    pub fn cancel(&mut self) {
        self.pending_marquee = None;
        if !self.is_idle() {
            self.enter(Gesture::Idle);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;
    use crate::widget::WidgetKind;

    fn scene_with(bounds: &[(f64, f64, f64, f64)]) -> (Scene, Vec<WidgetId>) {
        let mut scene = Scene::new();
        let ids = bounds
            .iter()
            .map(|&(x, y, w, h)| {
                let id = scene.store.add(WidgetKind::Panel);
                scene.store.set_bounds(id, x, y, w, h);
                id
            })
            .collect();
        (scene, ids)
    }

    fn no_snap() -> Grid {
        Grid {
            snap_enabled: false,
            ..Grid::default()
        }
    }

    #[test]
    fn test_marquee_selects_overlapping() {
        let (mut scene, ids) = scene_with(&[
            (50.0, 50.0, 10.0, 10.0),
            (95.0, 95.0, 20.0, 20.0),
            (200.0, 200.0, 10.0, 10.0),
        ]);
        let mut vp = Viewport::new();
        let mut ctl = InteractionController::new();

        ctl.pointer_down(
            &mut scene,
            &vp,
            PointerEvent::primary(Point::ZERO),
            PointerTarget::Canvas,
            false,
        );
        assert!(matches!(ctl.state(), Gesture::Marquee { .. }));
        ctl.pointer_move(&mut scene, &mut vp, &no_snap(), Point::new(100.0, 100.0));
        ctl.on_frame(&vp);
        ctl.pointer_up(&mut scene);

        assert!(ctl.is_idle());
        assert_eq!(scene.selection.ids(), &[ids[0], ids[1]]);
    }

    #[test]
    fn test_marquee_coalesces_moves_per_frame() {
        let (mut scene, _) = scene_with(&[]);
        let mut vp = Viewport::new();
        let mut ctl = InteractionController::new();
        ctl.pointer_down(
            &mut scene,
            &vp,
            PointerEvent::primary(Point::ZERO),
            PointerTarget::Canvas,
            false,
        );

        ctl.pointer_move(&mut scene, &mut vp, &no_snap(), Point::new(10.0, 10.0));
        ctl.pointer_move(&mut scene, &mut vp, &no_snap(), Point::new(30.0, 40.0));
        assert_eq!(ctl.marquee_rect(), Some(Rect::ZERO));
        ctl.on_frame(&vp);
        assert_eq!(ctl.marquee_rect(), Some(Rect::new(0.0, 0.0, 30.0, 40.0)));
    }

    #[test]
    fn test_marquee_start_clears_selection() {
        let (mut scene, ids) = scene_with(&[(0.0, 0.0, 10.0, 10.0)]);
        scene.selection.select_only(ids[0]);
        let vp = Viewport::new();
        let mut ctl = InteractionController::new();
        ctl.pointer_down(
            &mut scene,
            &vp,
            PointerEvent::primary(Point::new(500.0, 500.0)),
            PointerTarget::Canvas,
            false,
        );
        assert!(scene.selection.is_empty());
    }

    #[test]
    fn test_drag_moves_widget_with_snap() {
        let (mut scene, ids) = scene_with(&[(100.0, 100.0, 50.0, 50.0)]);
        let mut vp = Viewport::new();
        let mut ctl = InteractionController::new();
        let grid = Grid::default();

        ctl.pointer_down(
            &mut scene,
            &vp,
            PointerEvent::primary(Point::new(110.0, 110.0)),
            PointerTarget::Widget(ids[0]),
            false,
        );
        assert_eq!(scene.selection.ids(), &[ids[0]]);
        assert_eq!(scene.history.undo_depth(), 1);

        ctl.pointer_move(&mut scene, &mut vp, &grid, Point::new(133.0, 146.0));
        let w = scene.store.get(ids[0]).unwrap();
        assert_eq!((w.x, w.y), (120.0, 140.0));
        ctl.pointer_up(&mut scene);
        assert!(ctl.is_idle());
    }

    #[test]
    fn test_drag_multi_selection_moves_roots() {
        let (mut scene, ids) = scene_with(&[
            (0.0, 0.0, 10.0, 10.0),
            (5.0, 5.0, 2.0, 2.0),
            (50.0, 0.0, 10.0, 10.0),
        ]);
        scene.store.set_parent(ids[1], Some(ids[0])).unwrap();
        scene.selection.replace_with([ids[0], ids[1], ids[2]]);
        let mut vp = Viewport::new();
        let mut ctl = InteractionController::new();

        ctl.pointer_down(
            &mut scene,
            &vp,
            PointerEvent::primary(Point::new(1.0, 1.0)),
            PointerTarget::Widget(ids[0]),
            false,
        );
        ctl.pointer_move(&mut scene, &mut vp, &no_snap(), Point::new(11.0, 6.0));

        let pos = |id| scene.store.get(id).map(|w| (w.x, w.y)).unwrap();
        assert_eq!(pos(ids[0]), (10.0, 5.0));
        // child moves once, with its parent
        assert_eq!(pos(ids[1]), (15.0, 10.0));
        assert_eq!(pos(ids[2]), (60.0, 5.0));
    }

    #[test]
    fn test_locked_widget_selects_but_does_not_drag() {
        let (mut scene, ids) = scene_with(&[(0.0, 0.0, 10.0, 10.0)]);
        scene.store.get_mut(ids[0]).unwrap().locked = true;
        let vp = Viewport::new();
        let mut ctl = InteractionController::new();
        ctl.pointer_down(
            &mut scene,
            &vp,
            PointerEvent::primary(Point::new(1.0, 1.0)),
            PointerTarget::Widget(ids[0]),
            false,
        );
        assert!(ctl.is_idle());
        assert_eq!(scene.selection.ids(), &[ids[0]]);
        assert!(!scene.history.can_undo());
    }

    #[test]
    fn test_modifier_click_toggles() {
        let (mut scene, ids) = scene_with(&[(0.0, 0.0, 10.0, 10.0), (20.0, 0.0, 10.0, 10.0)]);
        scene.selection.select_only(ids[0]);
        let vp = Viewport::new();
        let mut ctl = InteractionController::new();
        let click = PointerEvent::primary(Point::new(21.0, 1.0)).with_modifiers(Modifiers::ctrl());

        ctl.pointer_down(&mut scene, &vp, click, PointerTarget::Widget(ids[1]), false);
        assert!(ctl.is_idle());
        assert_eq!(scene.selection.ids(), &[ids[0], ids[1]]);
        ctl.pointer_down(&mut scene, &vp, click, PointerTarget::Widget(ids[1]), false);
        assert_eq!(scene.selection.ids(), &[ids[0]]);
    }

    #[test]
    fn test_resize_snaps_and_floors() {
        let (mut scene, ids) = scene_with(&[(0.0, 0.0, 50.0, 50.0)]);
        let mut vp = Viewport::new();
        let mut ctl = InteractionController::new();
        let grid = Grid::default();

        ctl.pointer_down(
            &mut scene,
            &vp,
            PointerEvent::primary(Point::new(50.0, 50.0)),
            PointerTarget::ResizeHandle(ids[0]),
            false,
        );
        assert!(matches!(ctl.state(), Gesture::Resizing { .. }));
        ctl.pointer_move(&mut scene, &mut vp, &grid, Point::new(57.0, 4.0));
        let w = scene.store.get(ids[0]).unwrap();
        assert_eq!((w.w, w.h), (60.0, 10.0));
    }

    #[test]
    fn test_resize_without_snap_clamps_to_one() {
        let (mut scene, ids) = scene_with(&[(0.0, 0.0, 50.0, 50.0)]);
        let mut vp = Viewport::new();
        let mut ctl = InteractionController::new();
        ctl.pointer_down(
            &mut scene,
            &vp,
            PointerEvent::primary(Point::new(50.0, 50.0)),
            PointerTarget::ResizeHandle(ids[0]),
            false,
        );
        ctl.pointer_move(&mut scene, &mut vp, &no_snap(), Point::new(-20.0, 53.5));
        let w = scene.store.get(ids[0]).unwrap();
        assert_eq!((w.w, w.h), (1.0, 53.5));
    }

    #[test]
    fn test_pan_key_wins_over_widget() {
        let (mut scene, ids) = scene_with(&[(0.0, 0.0, 100.0, 100.0)]);
        let mut vp = Viewport::new();
        vp.ui_scale = 2.0;
        let mut ctl = InteractionController::new();

        ctl.pointer_down(
            &mut scene,
            &vp,
            PointerEvent::primary(Point::new(10.0, 10.0)),
            PointerTarget::Widget(ids[0]),
            true,
        );
        assert!(matches!(ctl.state(), Gesture::Panning { .. }));
        ctl.pointer_move(&mut scene, &mut vp, &no_snap(), Point::new(40.0, 0.0));
        assert_eq!(vp.pan, Vec2::new(30.0, -10.0));
        assert!(scene.selection.is_empty());
    }

    #[test]
    fn test_pointer_down_ignored_mid_gesture() {
        let (mut scene, ids) = scene_with(&[(0.0, 0.0, 10.0, 10.0)]);
        let vp = Viewport::new();
        let mut ctl = InteractionController::new();
        ctl.pointer_down(
            &mut scene,
            &vp,
            PointerEvent::primary(Point::new(500.0, 0.0)),
            PointerTarget::Canvas,
            false,
        );
        ctl.pointer_down(
            &mut scene,
            &vp,
            PointerEvent::primary(Point::new(1.0, 1.0)),
            PointerTarget::Widget(ids[0]),
            false,
        );
        assert!(matches!(ctl.state(), Gesture::Marquee { .. }));
        assert!(scene.selection.is_empty());
    }

    #[test]
    fn test_vanished_drag_target_is_noop() {
        let (mut scene, ids) = scene_with(&[(0.0, 0.0, 10.0, 10.0)]);
        let mut vp = Viewport::new();
        let mut ctl = InteractionController::new();
        ctl.pointer_down(
            &mut scene,
            &vp,
            PointerEvent::primary(Point::new(1.0, 1.0)),
            PointerTarget::Widget(ids[0]),
            false,
        );
        scene.store.remove(&[ids[0]]);
        ctl.pointer_move(&mut scene, &mut vp, &no_snap(), Point::new(30.0, 30.0));
        assert!(scene.store.is_empty());
        ctl.cancel();
        assert!(ctl.is_idle());
    }

    #[test]
    fn test_drag_respects_canvas_zoom() {
        let (mut scene, ids) = scene_with(&[(0.0, 0.0, 10.0, 10.0)]);
        let mut vp = Viewport::new();
        vp.canvas_scale = 2.0;
        let mut ctl = InteractionController::new();
        ctl.pointer_down(
            &mut scene,
            &vp,
            PointerEvent::primary(Point::new(2.0, 2.0)),
            PointerTarget::Widget(ids[0]),
            false,
        );
        ctl.pointer_move(&mut scene, &mut vp, &no_snap(), Point::new(22.0, 12.0));
        let w = scene.store.get(ids[0]).unwrap();
        assert_eq!((w.x, w.y), (10.0, 5.0));
    }
}
