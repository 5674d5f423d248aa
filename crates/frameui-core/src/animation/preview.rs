//! Single-flight animation preview.
//!
//! A preview plays one animation once against the live widgets and then
//! puts everything back. Move previews write widget positions directly;
//! scale and alpha previews only produce [`RenderOverride`]s so stored
//! geometry never changes.

use super::{Animation, AnimationKind};
use crate::store::WidgetStore;
use crate::widget::WidgetId;
use kurbo::{Rect, Size};
use std::collections::HashMap;

/// Reference frame rate used to turn frame counts into milliseconds.
pub const PREVIEW_FPS: f64 = 60.0;

/// Default move offset and size growth of a preview.
pub const PREVIEW_DISTANCE: f64 = 40.0;

/// Milliseconds spanned by `frames` at the reference rate. Multiplies before
/// dividing so whole seconds come out exact.
fn frames_to_ms(frames: f64) -> f64 {
    frames * 1000.0 / PREVIEW_FPS
}

/// Identifies one started preview, for cancellation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PreviewHandle(u64);

/// Transient, render-only values the canvas should draw instead of the
/// stored ones while a preview runs.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct RenderOverride {
    pub size: Option<Size>,
    pub alpha: Option<f64>,
}

#[derive(Debug, Clone)]
struct ActivePreview {
    handle: PreviewHandle,
    kind: AnimationKind,
    root: WidgetId,
    /// Root first, then descendants, with their bounds at start.
    originals: Vec<(WidgetId, Rect)>,
    start_alpha: f64,
    /// Move offset at full progress.
    travel: (f64, f64),
    easing: super::Easing,
    /// Time the tween begins, delay included.
    start_ms: f64,
    duration_ms: f64,
}

/// Plays at most one preview at a time.
#[derive(Debug, Clone, Default)]
pub struct PreviewPlayer {
    active: Option<ActivePreview>,
    overrides: HashMap<WidgetId, RenderOverride>,
    next_handle: u64,
}

impl PreviewPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    /// Handle of the running preview, if any.
    pub fn current(&self) -> Option<PreviewHandle> {
        self.active.as_ref().map(|p| p.handle)
    }

    /// Start previewing `anim` at time `now_ms`.
    ///
    /// Any running preview is stopped and restored first, even when the new
    /// one cannot start because its widget is missing.
    pub fn start(
        &mut self,
        anim: &Animation,
        store: &mut WidgetStore,
        now_ms: f64,
    ) -> Option<PreviewHandle> {
        self.stop(store);

        let root = store.get(anim.widget_id)?;
        let start_alpha = self.overrides.get(&root.id).and_then(|o| o.alpha).unwrap_or(1.0);
        let root_origin = root.origin();

        let ids = match anim.kind {
            AnimationKind::Move => store.subtree(anim.widget_id),
            _ => vec![anim.widget_id],
        };
        let originals: Vec<(WidgetId, Rect)> = ids
            .into_iter()
            .filter_map(|id| store.bounds(id).map(|b| (id, b)))
            .collect();

        let params = &anim.params;
        let target_x = params
            .to_x
            .filter(|v| !v.is_nan())
            .unwrap_or(root_origin.x + PREVIEW_DISTANCE);
        let target_y = params.to_y.filter(|v| !v.is_nan()).unwrap_or(root_origin.y);

        let duration_frames = if anim.duration.is_finite() { anim.duration.max(1.0) } else { 1.0 };
        let delay_frames = if anim.delay.is_finite() { anim.delay.max(0.0) } else { 0.0 };

        self.next_handle += 1;
        let handle = PreviewHandle(self.next_handle);
        self.active = Some(ActivePreview {
            handle,
            kind: anim.kind.clone(),
            root: anim.widget_id,
            originals,
            start_alpha,
            travel: (target_x - root_origin.x, target_y - root_origin.y),
            easing: params.easing(),
            start_ms: now_ms + frames_to_ms(delay_frames),
            duration_ms: frames_to_ms(duration_frames),
        });
        log::debug!("preview {} started for widget {}", anim.id, anim.widget_id);
        Some(handle)
    }

    /// Advance the running preview to `now_ms`. Returns whether it is still
    /// running afterwards.
    pub fn tick(&mut self, store: &mut WidgetStore, now_ms: f64) -> bool {
        let Some(preview) = self.active.as_ref() else {
            return false;
        };
        if now_ms < preview.start_ms {
            return true;
        }
        let t = ((now_ms - preview.start_ms) / preview.duration_ms).clamp(0.0, 1.0);
        if t >= 1.0 {
            self.stop(store);
            return false;
        }
        let ease = preview.easing.ease(t);

        match preview.kind {
            AnimationKind::Move => {
                let (dx, dy) = preview.travel;
                for &(id, rect) in &preview.originals {
                    if let Some(widget) = store.get_mut(id) {
                        widget.x = rect.x0 + dx * ease;
                        widget.y = rect.y0 + dy * ease;
                    }
                }
            }
            AnimationKind::Scale => {
                if let Some(&(id, rect)) = preview.originals.first() {
                    let grow = PREVIEW_DISTANCE * ease;
                    self.overrides.entry(id).or_default().size =
                        Some(Size::new(rect.width() + grow, rect.height() + grow));
                }
            }
            AnimationKind::Alpha => {
                let alpha = preview.start_alpha * (1.0 - 0.5 * ease);
                self.overrides.entry(preview.root).or_default().alpha = Some(alpha);
            }
            AnimationKind::Other(_) => {}
        }
        true
    }

    /// Cancel the preview behind `handle`, restoring its widgets.
    ///
    /// Stale handles (finished or superseded previews) are ignored.
    pub fn cancel(&mut self, handle: PreviewHandle, store: &mut WidgetStore) -> bool {
        if self.current() != Some(handle) {
            return false;
        }
        self.stop(store);
        true
    }

    /// Stop whatever is running and restore it.
    pub fn stop(&mut self, store: &mut WidgetStore) {
        let Some(preview) = self.active.take() else {
            return;
        };
        for (id, rect) in preview.originals {
            if let Some(widget) = store.get_mut(id) {
                widget.x = rect.x0;
                widget.y = rect.y0;
                widget.set_size(rect.width(), rect.height());
            }
            self.overrides.remove(&id);
        }
        log::debug!("preview for widget {} restored", preview.root);
    }

    /// Transient values to draw for `id` instead of its stored ones.
    pub fn render_override(&self, id: WidgetId) -> Option<RenderOverride> {
        self.overrides.get(&id).copied()
    }

    /// Alpha to draw `id` with.
    pub fn alpha(&self, id: WidgetId) -> f64 {
        self.render_override(id).and_then(|o| o.alpha).unwrap_or(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::{AnimationList, AnimationParams};
    use crate::widget::WidgetKind;

    const EPSILON: f64 = 1e-9;

    fn setup() -> (WidgetStore, WidgetId, WidgetId) {
        let mut store = WidgetStore::new();
        let root = store.add(WidgetKind::Panel);
        let child = store.add(WidgetKind::Button);
        store.set_bounds(root, 100.0, 100.0, 50.0, 50.0);
        store.set_bounds(child, 110.0, 120.0, 10.0, 10.0);
        store.set_parent(child, Some(root)).unwrap();
        (store, root, child)
    }

    fn anim(
        list: &mut AnimationList,
        widget: WidgetId,
        kind: AnimationKind,
        frames: f64,
    ) -> Animation {
        let id = list.add_for(widget, kind);
        let a = list.get_mut(id).unwrap();
        a.duration = frames;
        a.clone()
    }

    fn pos(store: &WidgetStore, id: WidgetId) -> (f64, f64) {
        store.get(id).map(|w| (w.x, w.y)).unwrap()
    }

    #[test]
    fn test_move_preview_carries_children_and_restores() {
        let (mut store, root, child) = setup();
        let mut list = AnimationList::new();
        let a = anim(&mut list, root, AnimationKind::Move, 60.0);
        let mut player = PreviewPlayer::new();

        player.start(&a, &mut store, 0.0).unwrap();
        assert!(player.tick(&mut store, 500.0));
        assert!((pos(&store, root).0 - 120.0).abs() < EPSILON);
        assert!((pos(&store, child).0 - 130.0).abs() < EPSILON);
        assert_eq!(pos(&store, child).1, 120.0);

        assert!(!player.tick(&mut store, 1000.0));
        assert_eq!(pos(&store, root), (100.0, 100.0));
        assert_eq!(pos(&store, child), (110.0, 120.0));
        assert!(!player.is_playing());
    }

    #[test]
    fn test_move_to_explicit_target() {
        let (mut store, root, _) = setup();
        let mut a = Animation::new(1, root, AnimationKind::Move);
        a.duration = 10.0;
        a.params = AnimationParams {
            to_x: Some(0.0),
            to_y: Some(300.0),
            ..AnimationParams::default()
        };
        let mut player = PreviewPlayer::new();
        player.start(&a, &mut store, 0.0);
        player.tick(&mut store, frames_to_ms(5.0));
        let (x, y) = pos(&store, root);
        assert!((x - 50.0).abs() < EPSILON);
        assert!((y - 200.0).abs() < EPSILON);
    }

    #[test]
    fn test_scale_preview_is_render_only() {
        let (mut store, root, _) = setup();
        let a = Animation {
            duration: 60.0,
            ..Animation::new(1, root, AnimationKind::Scale)
        };
        let mut player = PreviewPlayer::new();
        player.start(&a, &mut store, 0.0);
        player.tick(&mut store, 500.0);

        let size = player.render_override(root).and_then(|o| o.size).unwrap();
        assert!((size.width - 70.0).abs() < EPSILON);
        assert_eq!(store.get(root).unwrap().w, 50.0);

        player.tick(&mut store, 2000.0);
        assert_eq!(player.render_override(root), None);
    }

    #[test]
    fn test_alpha_preview() {
        let (mut store, root, _) = setup();
        let a = Animation {
            duration: 60.0,
            ..Animation::new(1, root, AnimationKind::Alpha)
        };
        let mut player = PreviewPlayer::new();
        player.start(&a, &mut store, 0.0);
        player.tick(&mut store, 500.0);
        assert!((player.alpha(root) - 0.75).abs() < EPSILON);
        player.tick(&mut store, 1000.0);
        assert_eq!(player.alpha(root), 1.0);
    }

    #[test]
    fn test_delay_holds_widgets_still() {
        let (mut store, root, _) = setup();
        let a = Animation {
            duration: 60.0,
            delay: 30.0,
            ..Animation::new(1, root, AnimationKind::Move)
        };
        let mut player = PreviewPlayer::new();
        player.start(&a, &mut store, 0.0);
        assert!(player.tick(&mut store, 400.0));
        assert_eq!(pos(&store, root), (100.0, 100.0));
        player.tick(&mut store, 1000.0);
        assert!((pos(&store, root).0 - 120.0).abs() < EPSILON);
    }

    #[test]
    fn test_second_preview_restores_first() {
        let (mut store, root, child) = setup();
        let first = Animation {
            duration: 60.0,
            ..Animation::new(1, root, AnimationKind::Move)
        };
        let second = Animation {
            duration: 60.0,
            ..Animation::new(2, child, AnimationKind::Alpha)
        };
        let mut player = PreviewPlayer::new();
        let a = player.start(&first, &mut store, 0.0).unwrap();
        player.tick(&mut store, 500.0);
        assert_ne!(pos(&store, root), (100.0, 100.0));

        let b = player.start(&second, &mut store, 500.0).unwrap();
        assert_eq!(pos(&store, root), (100.0, 100.0));
        assert_eq!(pos(&store, child), (110.0, 120.0));

        // the superseded handle no longer cancels anything
        assert!(!player.cancel(a, &mut store));
        assert_eq!(player.current(), Some(b));
    }

    #[test]
    fn test_cancel_restores_immediately() {
        let (mut store, root, _) = setup();
        let a = Animation {
            duration: 60.0,
            ..Animation::new(1, root, AnimationKind::Move)
        };
        let mut player = PreviewPlayer::new();
        let handle = player.start(&a, &mut store, 0.0).unwrap();
        player.tick(&mut store, 250.0);
        assert!(player.cancel(handle, &mut store));
        assert_eq!(pos(&store, root), (100.0, 100.0));
        assert!(!player.tick(&mut store, 300.0));
        assert!(!player.cancel(handle, &mut store));
    }

    #[test]
    fn test_missing_widget_still_stops_previous() {
        let (mut store, root, _) = setup();
        let a = Animation {
            duration: 60.0,
            ..Animation::new(1, root, AnimationKind::Move)
        };
        let ghost = Animation::new(2, 999, AnimationKind::Move);
        let mut player = PreviewPlayer::new();
        player.start(&a, &mut store, 0.0);
        player.tick(&mut store, 500.0);
        assert!(player.start(&ghost, &mut store, 500.0).is_none());
        assert!(!player.is_playing());
        assert_eq!(pos(&store, root), (100.0, 100.0));
    }

    #[test]
    fn test_exact_end_tick_restores() {
        let (mut store, root, _) = setup();
        let mut player = PreviewPlayer::new();
        for frames in [30.0, 60.0, 90.0, 120.0, 600.0] {
            let a = Animation {
                duration: frames,
                delay: 15.0,
                ..Animation::new(1, root, AnimationKind::Alpha)
            };
            player.start(&a, &mut store, 100.0);
            let end = 100.0 + frames_to_ms(15.0) + frames_to_ms(frames);
            assert!(player.tick(&mut store, end - 1.0));
            assert!(player.alpha(root) < 1.0);
            assert!(!player.tick(&mut store, end), "{frames} frames");
            assert_eq!(player.alpha(root), 1.0);
        }
        assert_eq!(frames_to_ms(60.0), 1000.0);
        assert_eq!(frames_to_ms(30.0), 500.0);
    }

    #[test]
    fn test_zero_duration_counts_as_one_frame() {
        let (mut store, root, _) = setup();
        let a = Animation {
            duration: 0.0,
            ..Animation::new(1, root, AnimationKind::Move)
        };
        let mut player = PreviewPlayer::new();
        player.start(&a, &mut store, 0.0);
        assert!(player.tick(&mut store, frames_to_ms(0.5)));
        assert!((pos(&store, root).0 - 120.0).abs() < EPSILON);
        assert!(!player.tick(&mut store, frames_to_ms(1.0)));
    }
}
