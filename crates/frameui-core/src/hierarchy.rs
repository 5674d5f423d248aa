//! Widget tree panel: collapse state, flattening and drag-to-reparent.

use crate::input::{MouseButton, PointerEvent};
use crate::scene::Scene;
use crate::store::{ReparentError, ReparentResult, WidgetStore};
use crate::widget::{WidgetId, WidgetKind};
use kurbo::Point;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

/// Distance (per axis, strictly greater) before a row press becomes a drag.
pub const TREE_DRAG_THRESHOLD: f64 = 4.0;

/// One visible line of the tree panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TreeRow {
    pub id: WidgetId,
    pub name: String,
    pub kind: WidgetKind,
    pub parent_id: Option<WidgetId>,
    pub depth: usize,
    pub has_children: bool,
    pub expanded: bool,
}

/// Where a tree drag was released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeDrop {
    /// On the row of a widget.
    Row(WidgetId),
    /// On the empty area of the tree panel.
    Background,
    /// Anywhere outside the tree panel.
    Outside,
}

/// What a pointer release in the tree did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeOutcome {
    /// Nothing changed.
    None,
    /// The press never became a drag and was treated as a click.
    Clicked(WidgetId),
    /// The source row was moved under `parent` (`None` = root).
    Reparented { widget: WidgetId, parent: Option<WidgetId> },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct TreeDrag {
    source: WidgetId,
    start: Point,
    position: Point,
    dragging: bool,
    event: PointerEvent,
}

/// State of the hierarchy panel.
#[derive(Debug, Clone, Default)]
pub struct HierarchyController {
    /// Collapse flags. A missing entry means expanded.
    expanded: HashMap<WidgetId, bool>,
    drag: Option<TreeDrag>,
    renaming: Option<WidgetId>,
}

impl HierarchyController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_expanded(&self, id: WidgetId) -> bool {
        self.expanded.get(&id).copied().unwrap_or(true)
    }

    pub fn toggle(&mut self, id: WidgetId) {
        let next = !self.is_expanded(id);
        self.expanded.insert(id, next);
    }

    pub fn set_expanded(&mut self, id: WidgetId, expanded: bool) {
        self.expanded.insert(id, expanded);
    }

    /// Drop collapse flags of widgets that no longer exist.
    pub fn prune(&mut self, store: &WidgetStore) {
        self.expanded.retain(|id, _| store.contains(*id));
        if self.renaming.is_some_and(|id| !store.contains(id)) {
            self.renaming = None;
        }
    }

    /// Visible rows, depth-first.
    ///
    /// Roots are widgets without a parent plus widgets whose parent is
    /// missing. Children of collapsed rows are skipped.
    pub fn flatten(&self, store: &WidgetStore) -> Vec<TreeRow> {
        let mut rows = Vec::with_capacity(store.len());
        let mut seen = HashSet::new();
        let roots = store
            .iter()
            .filter(|w| w.parent_id.is_none_or(|p| !store.contains(p)))
            .map(|w| (w.id, 0usize));
        let mut stack: Vec<(WidgetId, usize)> = roots.collect();
        stack.reverse();

        while let Some((id, depth)) = stack.pop() {
            let Some(widget) = store.get(id) else {
                continue;
            };
            if !seen.insert(id) {
                continue;
            }
            let has_children = store.has_children(id);
            let expanded = self.is_expanded(id);
            rows.push(TreeRow {
                id,
                name: widget.name.clone(),
                kind: widget.kind.clone(),
                parent_id: widget.parent_id,
                depth,
                has_children,
                expanded,
            });
            if has_children && expanded {
                let kids: Vec<WidgetId> = store.children_of(id).map(|w| w.id).collect();
                stack.extend(kids.into_iter().rev().map(|kid| (kid, depth + 1)));
            }
        }
        rows
    }

    /// Press on a row. Records the drag source; nothing moves yet.
    pub fn row_pointer_down(&mut self, store: &WidgetStore, id: WidgetId, event: PointerEvent) {
        if event.button != MouseButton::Left || self.renaming.is_some() || !store.contains(id) {
            return;
        }
        self.drag = Some(TreeDrag {
            source: id,
            start: event.position,
            position: event.position,
            dragging: false,
            event,
        });
    }

    pub fn pointer_move(&mut self, position: Point) {
        let Some(drag) = self.drag.as_mut() else {
            return;
        };
        if !drag.dragging {
            let dx = (position.x - drag.start.x).abs();
            let dy = (position.y - drag.start.y).abs();
            if dx > TREE_DRAG_THRESHOLD || dy > TREE_DRAG_THRESHOLD {
                log::debug!("tree drag started for widget {}", drag.source);
                drag.dragging = true;
            }
        }
        if drag.dragging {
            drag.position = position;
        }
    }

    /// Source row and floating preview position of an active drag.
    pub fn drag_preview(&self) -> Option<(WidgetId, Point)> {
        self.drag.filter(|d| d.dragging).map(|d| (d.source, d.position))
    }

    pub fn is_dragging(&self) -> bool {
        self.drag_preview().is_some()
    }

    /// Release after a row press.
    ///
    /// A cycle-creating drop is refused with an error and leaves the scene
    /// untouched. Stale ids are ignored.
    pub fn pointer_up(&mut self, scene: &mut Scene, drop: TreeDrop) -> ReparentResult<TreeOutcome> {
        let Some(drag) = self.drag.take() else {
            return Ok(TreeOutcome::None);
        };
        let source = drag.source;
        if !scene.store.contains(source) {
            return Ok(TreeOutcome::None);
        }

        if !drag.dragging {
            if drag.event.modifiers.multi_select() {
                scene.selection.toggle(source);
            } else {
                scene.selection.select_only(source);
            }
            return Ok(TreeOutcome::Clicked(source));
        }

        let parent = match drop {
            TreeDrop::Row(target) if target == source => return Ok(TreeOutcome::None),
            TreeDrop::Row(target) if !scene.store.contains(target) => return Ok(TreeOutcome::None),
            TreeDrop::Row(target) => Some(target),
            TreeDrop::Background => None,
            TreeDrop::Outside => return Ok(TreeOutcome::None),
        };

        if let Err(err) = scene.store.check_parent(source, parent) {
            log::warn!("reparent refused: {err}");
            return Err(err);
        }
        scene.push_history();
        scene.store.set_parent(source, parent)?;
        log::debug!("widget {source} moved under {parent:?}");
        Ok(TreeOutcome::Reparented { widget: source, parent })
    }

    /// Abandon a pending row press or drag.
    pub fn cancel_drag(&mut self) {
        self.drag = None;
    }

    pub fn start_rename(&mut self, store: &WidgetStore, id: WidgetId) {
        if store.contains(id) {
            self.drag = None;
            self.renaming = Some(id);
        }
    }

    pub fn renaming(&self) -> Option<WidgetId> {
        self.renaming
    }

    /// Commit an inline rename. Blank names keep the previous one.
    ///
    /// Returns whether the widget's name changed.
    pub fn confirm_rename(&mut self, scene: &mut Scene, name: &str) -> bool {
        let Some(id) = self.renaming.take() else {
            return false;
        };
        let name = name.trim();
        let Some(current) = scene.store.get(id) else {
            return false;
        };
        if name.is_empty() || current.name == name {
            return false;
        }
        scene.push_history();
        if let Some(widget) = scene.store.get_mut(id) {
            widget.name = name.to_string();
        }
        true
    }

    pub fn cancel_rename(&mut self) {
        self.renaming = None;
    }

    /// Detach a widget from its parent.
    pub fn set_root(&mut self, scene: &mut Scene, id: WidgetId) -> bool {
        let Some(widget) = scene.store.get(id) else {
            return false;
        };
        if widget.parent_id.is_none() {
            return false;
        }
        scene.push_history();
        scene.store.set_parent(id, None).is_ok()
    }

    /// Delete a widget and its subtree from the tree's context menu.
    pub fn delete(&mut self, scene: &mut Scene, id: WidgetId) -> bool {
        if !scene.store.contains(id) {
            return false;
        }
        scene.selection.select_only(id);
        scene.push_history();
        scene.store.remove(&[id]);
        scene.selection.retain_existing(&scene.store);
        self.prune(&scene.store);
        true
    }
}

/// Whether a rejected reparent should be reported as a cycle to the user.
pub fn is_cycle_rejection(err: &ReparentError) -> bool {
    matches!(err, ReparentError::WouldCreateCycle { .. } | ReparentError::MalformedChain(_))
}
