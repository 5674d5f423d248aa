//! Widget collection and id allocation.
//!
//! The store is an arena: widgets live in one flat, insertion-ordered `Vec`
//! and refer to their parent by id. Insertion order is the default sibling
//! z-order; [`WidgetStore::render_order`] derives the actual paint order.
//!
//! Every operation is total over unknown ids. Pointer gestures race with
//! deletions, so a stale id simply turns the call into a no-op.

use crate::widget::{Widget, WidgetId, WidgetKind};
use kurbo::{Rect, Vec2};
use std::collections::{HashMap, HashSet};
use thiserror::Error;

/// Hop limit for ancestor walks. A malformed parent chain cannot make a
/// walk run longer than this.
pub const MAX_ANCESTOR_HOPS: usize = 1000;

/// Reasons a reparent request is refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ReparentError {
    #[error("widget {0} does not exist")]
    UnknownWidget(WidgetId),
    #[error("parent widget {0} does not exist")]
    UnknownParent(WidgetId),
    #[error("widget {0} cannot be its own parent")]
    SelfParent(WidgetId),
    #[error("cannot move widget {widget} under its own descendant {parent}")]
    WouldCreateCycle { widget: WidgetId, parent: WidgetId },
    #[error("parent chain above widget {0} is malformed")]
    MalformedChain(WidgetId),
}

/// Result type for reparent operations.
pub type ReparentResult<T> = Result<T, ReparentError>;

/// Outcome of walking up the parent chain from one widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AncestorWalk {
    /// The ancestor was found on the chain.
    Descendant,
    /// The chain ended at a root without meeting the ancestor.
    Unrelated,
    /// The hop limit was hit; the chain loops or is absurdly deep.
    Malformed,
}

/// Owns the ordered widget collection.
#[derive(Debug, Clone)]
pub struct WidgetStore {
    widgets: Vec<Widget>,
    next_id: WidgetId,
}

impl Default for WidgetStore {
    fn default() -> Self {
        Self::new()
    }
}

impl WidgetStore {
    /// Create an empty store. The first id handed out is 1.
    pub fn new() -> Self {
        Self {
            widgets: Vec::new(),
            next_id: 1,
        }
    }

    /// Append a widget of `kind` with default geometry and return its id.
    pub fn add(&mut self, kind: WidgetKind) -> WidgetId {
        let id = self.allocate_id();
        log::debug!("added {} widget {}", kind.as_str(), id);
        self.widgets.push(Widget::new(id, kind));
        id
    }

    /// Append a copy of `widget` under a freshly allocated id.
    ///
    /// The parent link is kept only if it still resolves.
    pub fn insert_copy(&mut self, mut widget: Widget) -> WidgetId {
        let id = self.allocate_id();
        widget.id = id;
        if widget.parent_id.is_some_and(|p| !self.contains(p)) {
            widget.parent_id = None;
        }
        widget.clamp_size();
        self.widgets.push(widget);
        id
    }

    fn allocate_id(&mut self) -> WidgetId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// The id the next added widget will receive.
    pub fn next_id(&self) -> WidgetId {
        self.next_id
    }

    /// Remove every widget in `ids` together with all of its descendants.
    pub fn remove(&mut self, ids: &[WidgetId]) {
        let mut doomed = HashSet::new();
        for &id in ids {
            if self.contains(id) {
                doomed.extend(self.subtree(id));
            }
        }
        if doomed.is_empty() {
            return;
        }
        self.widgets.retain(|w| !doomed.contains(&w.id));
        log::debug!("removed {} widgets", doomed.len());
    }

    /// Move `root` and every transitive descendant by `(dx, dy)`.
    pub fn translate_subtree(&mut self, root: WidgetId, dx: f64, dy: f64) {
        if dx.is_nan() || dy.is_nan() {
            return;
        }
        let delta = Vec2::new(dx, dy);
        let moved: HashSet<WidgetId> = self.subtree(root).into_iter().collect();
        for widget in self.widgets.iter_mut().filter(|w| moved.contains(&w.id)) {
            widget.translate(delta);
        }
    }

    /// `root` followed by all of its descendants, depth-first.
    ///
    /// Empty when `root` is unknown. Each widget appears at most once even
    /// if the stored parent links loop.
    pub fn subtree(&self, root: WidgetId) -> Vec<WidgetId> {
        if !self.contains(root) {
            return Vec::new();
        }
        let children = self.children_map();
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if !seen.insert(id) {
                continue;
            }
            out.push(id);
            if let Some(kids) = children.get(&id) {
                stack.extend(kids.iter().rev().map(|&i| self.widgets[i].id));
            }
        }
        out
    }

    /// All transitive descendants of `id`, not including `id` itself.
    pub fn descendants_of(&self, id: WidgetId) -> Vec<WidgetId> {
        let mut ids = self.subtree(id);
        if !ids.is_empty() {
            ids.remove(0);
        }
        ids
    }

    /// Direct children of `id` in insertion order.
    pub fn children_of(&self, id: WidgetId) -> impl Iterator<Item = &Widget> {
        self.widgets.iter().filter(move |w| w.parent_id == Some(id))
    }

    /// Whether `id` has at least one child.
    pub fn has_children(&self, id: WidgetId) -> bool {
        self.widgets.iter().any(|w| w.parent_id == Some(id))
    }

    /// Parent id -> indices of children, in insertion order.
    fn children_map(&self) -> HashMap<WidgetId, Vec<usize>> {
        let mut map: HashMap<WidgetId, Vec<usize>> = HashMap::new();
        for (i, w) in self.widgets.iter().enumerate() {
            if let Some(parent) = w.parent_id {
                map.entry(parent).or_default().push(i);
            }
        }
        map
    }

    /// Widgets in paint order: parents before children, depth-first from
    /// the roots, siblings in insertion order.
    ///
    /// A widget whose parent no longer exists is painted as a root after
    /// the regular forest. Computed fresh on every call.
    pub fn render_order(&self) -> Vec<&Widget> {
        let children = self.children_map();
        let mut out = Vec::with_capacity(self.widgets.len());
        let mut seen = HashSet::new();

        let roots = self.widgets.iter().enumerate().filter(|(_, w)| w.parent_id.is_none());
        let orphans = self
            .widgets
            .iter()
            .enumerate()
            .filter(|(_, w)| w.parent_id.is_some_and(|p| !self.contains(p)));
        let starts: Vec<usize> = roots.chain(orphans).map(|(i, _)| i).collect();

        for start in starts {
            let mut stack = vec![start];
            while let Some(i) = stack.pop() {
                let widget = &self.widgets[i];
                if !seen.insert(widget.id) {
                    continue;
                }
                out.push(widget);
                if let Some(kids) = children.get(&widget.id) {
                    stack.extend(kids.iter().rev());
                }
            }
        }

        // Anything left sits on a parent loop; paint it rather than lose it.
        for widget in &self.widgets {
            if !seen.contains(&widget.id) {
                out.push(widget);
            }
        }
        out
    }

    /// Ids in paint order.
    pub fn render_order_ids(&self) -> Vec<WidgetId> {
        self.render_order().into_iter().map(|w| w.id).collect()
    }

    /// Walk up from `id` looking for `ancestor`, at most
    /// [`MAX_ANCESTOR_HOPS`] steps.
    pub fn walk_ancestors(&self, ancestor: WidgetId, id: WidgetId) -> AncestorWalk {
        let mut current = self.get(id);
        let mut hops = 0;
        while let Some(widget) = current {
            let Some(parent) = widget.parent_id else {
                return AncestorWalk::Unrelated;
            };
            if hops >= MAX_ANCESTOR_HOPS {
                return AncestorWalk::Malformed;
            }
            hops += 1;
            if parent == ancestor {
                return AncestorWalk::Descendant;
            }
            current = self.get(parent);
        }
        AncestorWalk::Unrelated
    }

    /// Whether `id` sits somewhere below `ancestor`.
    pub fn is_descendant_of(&self, ancestor: WidgetId, id: WidgetId) -> bool {
        self.walk_ancestors(ancestor, id) == AncestorWalk::Descendant
    }

    /// Change the parent of `id`, validating the forest invariant first.
    ///
    /// `None` makes the widget a root. Nothing is mutated on error.
    pub fn set_parent(&mut self, id: WidgetId, parent: Option<WidgetId>) -> ReparentResult<()> {
        self.check_parent(id, parent)?;
        if let Some(widget) = self.get_mut(id) {
            widget.parent_id = parent;
        }
        Ok(())
    }

    /// Whether `set_parent(id, parent)` would be accepted.
    pub fn check_parent(&self, id: WidgetId, parent: Option<WidgetId>) -> ReparentResult<()> {
        if !self.contains(id) {
            return Err(ReparentError::UnknownWidget(id));
        }
        if let Some(parent) = parent {
            if parent == id {
                return Err(ReparentError::SelfParent(id));
            }
            if !self.contains(parent) {
                return Err(ReparentError::UnknownParent(parent));
            }
            match self.walk_ancestors(id, parent) {
                AncestorWalk::Descendant => {
                    return Err(ReparentError::WouldCreateCycle { widget: id, parent });
                }
                AncestorWalk::Malformed => return Err(ReparentError::MalformedChain(parent)),
                AncestorWalk::Unrelated => {}
            }
        }
        Ok(())
    }

    /// Widgets that `id` may legally be reparented under.
    pub fn parent_candidates(&self, id: WidgetId) -> Vec<&Widget> {
        let below: HashSet<WidgetId> = self.subtree(id).into_iter().collect();
        self.widgets.iter().filter(|w| !below.contains(&w.id)).collect()
    }

    /// Move a widget to the end of the collection so it paints above its
    /// siblings.
    pub fn bring_to_front(&mut self, id: WidgetId) {
        if let Some(pos) = self.index_of(id) {
            let widget = self.widgets.remove(pos);
            self.widgets.push(widget);
        }
    }

    /// Move a widget to the start of the collection so it paints below its
    /// siblings.
    pub fn send_to_back(&mut self, id: WidgetId) {
        if let Some(pos) = self.index_of(id) {
            let widget = self.widgets.remove(pos);
            self.widgets.insert(0, widget);
        }
    }

    /// Set the size of a single widget, clamped to the minimum.
    pub fn resize(&mut self, id: WidgetId, w: f64, h: f64) {
        if let Some(widget) = self.get_mut(id) {
            widget.set_size(w, h);
        }
    }

    /// Overwrite position and size of a single widget.
    pub fn set_bounds(&mut self, id: WidgetId, x: f64, y: f64, w: f64, h: f64) {
        if let Some(widget) = self.get_mut(id) {
            if !x.is_nan() {
                widget.x = x;
            }
            if !y.is_nan() {
                widget.y = y;
            }
            widget.set_size(w, h);
        }
    }

    /// Bounding box of a widget in world coordinates.
    pub fn bounds(&self, id: WidgetId) -> Option<Rect> {
        self.get(id).map(Widget::bounds)
    }

    /// Union of the bounds of every widget.
    pub fn total_bounds(&self) -> Option<Rect> {
        self.widgets
            .iter()
            .map(Widget::bounds)
            .reduce(|acc, b| acc.union(b))
    }

    fn index_of(&self, id: WidgetId) -> Option<usize> {
        self.widgets.iter().position(|w| w.id == id)
    }

    pub fn get(&self, id: WidgetId) -> Option<&Widget> {
        self.widgets.iter().find(|w| w.id == id)
    }

    pub fn get_mut(&mut self, id: WidgetId) -> Option<&mut Widget> {
        self.widgets.iter_mut().find(|w| w.id == id)
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.widgets.iter().any(|w| w.id == id)
    }

    /// Widgets in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &Widget> {
        self.widgets.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Widget> {
        self.widgets.iter_mut()
    }

    pub fn widgets(&self) -> &[Widget] {
        &self.widgets
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Copy of the full collection, for history snapshots.
    pub fn snapshot(&self) -> Vec<Widget> {
        self.widgets.clone()
    }

    /// Put back a collection previously taken with [`Self::snapshot`].
    ///
    /// The id counter is left alone so ids stay unique across undo.
    pub fn restore(&mut self, widgets: Vec<Widget>) {
        self.widgets = widgets;
        let floor = self.max_id() + 1;
        if self.next_id < floor {
            self.next_id = floor;
        }
    }

    /// Replace the whole collection with widgets from a loaded document.
    ///
    /// The id counter restarts just past the largest loaded id.
    pub fn replace_all(&mut self, mut widgets: Vec<Widget>) {
        for widget in &mut widgets {
            widget.clamp_size();
        }
        self.widgets = widgets;
        self.next_id = self.max_id() + 1;
    }

    /// Drop every widget and restart ids at 1.
    pub fn clear(&mut self) {
        self.widgets.clear();
        self.next_id = 1;
    }

    fn max_id(&self) -> WidgetId {
        self.widgets.iter().map(|w| w.id).max().unwrap_or(0)
    }
}
