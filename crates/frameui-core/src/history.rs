//! Linear undo/redo over full widget snapshots.

use crate::selection::Selection;
use crate::store::WidgetStore;
use crate::widget::Widget;

/// Maximum number of undo states to keep.
pub const MAX_UNDO_HISTORY: usize = 100;

/// A full copy of the widget collection at one instant.
#[derive(Debug, Clone, PartialEq)]
struct Snapshot {
    widgets: Vec<Widget>,
}

impl Snapshot {
    fn take(store: &WidgetStore) -> Self {
        Self {
            widgets: store.snapshot(),
        }
    }
}

/// Past and future snapshot stacks.
///
/// Any edit must call [`History::push`] *before* mutating. Pushing clears
/// the redo stack, so the history never branches.
#[derive(Debug, Clone, Default)]
pub struct History {
    undo_stack: Vec<Snapshot>,
    redo_stack: Vec<Snapshot>,
}

impl History {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the current state of `store` (call before making changes).
    pub fn push(&mut self, store: &WidgetStore) {
        self.undo_stack.push(Snapshot::take(store));
        self.redo_stack.clear();

        if self.undo_stack.len() > MAX_UNDO_HISTORY {
            self.undo_stack.remove(0);
        }
    }

    /// Undo the last change.
    /// Returns true if undo was performed, false if nothing to undo.
    pub fn undo(&mut self, store: &mut WidgetStore, selection: &mut Selection) -> bool {
        let Some(snapshot) = self.undo_stack.pop() else {
            return false;
        };
        self.redo_stack.push(Snapshot::take(store));
        store.restore(snapshot.widgets);
        selection.clear();
        log::debug!("undo ({} left)", self.undo_stack.len());
        true
    }

    /// Redo the last undone change.
    /// Returns true if redo was performed, false if nothing to redo.
    pub fn redo(&mut self, store: &mut WidgetStore, selection: &mut Selection) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push(Snapshot::take(store));
        store.restore(snapshot.widgets);
        selection.clear();
        log::debug!("redo ({} left)", self.redo_stack.len());
        true
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo_stack.len()
    }

    /// Drop both stacks.
    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::widget::WidgetKind;

    #[test]
    fn test_undo_redo_exact() {
        let mut store = WidgetStore::new();
        let mut sel = Selection::new();
        let mut history = History::new();
        let id = store.add(WidgetKind::Panel);
        let before = store.snapshot();

        history.push(&store);
        store.translate_subtree(id, 12.5, -3.0);
        store.add(WidgetKind::Text);
        let after = store.snapshot();
        sel.select_only(id);

        assert!(history.undo(&mut store, &mut sel));
        assert_eq!(store.snapshot(), before);
        assert!(sel.is_empty());

        assert!(history.redo(&mut store, &mut sel));
        assert_eq!(store.snapshot(), after);
    }

    #[test]
    fn test_push_clears_redo() {
        let mut store = WidgetStore::new();
        let mut sel = Selection::new();
        let mut history = History::new();

        history.push(&store);
        store.add(WidgetKind::Panel);
        assert!(history.undo(&mut store, &mut sel));
        assert!(history.can_redo());

        history.push(&store);
        store.add(WidgetKind::Button);
        assert!(!history.can_redo());

        let current = store.snapshot();
        assert!(!history.redo(&mut store, &mut sel));
        assert_eq!(store.snapshot(), current);
    }

    #[test]
    fn test_empty_stacks_are_noops() {
        let mut store = WidgetStore::new();
        let mut sel = Selection::new();
        let mut history = History::new();
        assert!(!history.undo(&mut store, &mut sel));
        assert!(!history.redo(&mut store, &mut sel));
    }

    #[test]
    fn test_depth_is_bounded() {
        let mut store = WidgetStore::new();
        let mut sel = Selection::new();
        let mut history = History::new();
        for _ in 0..(MAX_UNDO_HISTORY + 20) {
            history.push(&store);
            store.add(WidgetKind::Panel);
        }
        assert_eq!(history.undo_depth(), MAX_UNDO_HISTORY);

        while history.undo(&mut store, &mut sel) {}
        // The oldest 20 snapshots were evicted.
        assert_eq!(store.len(), 20);
    }

    #[test]
    fn test_undo_does_not_reuse_ids() {
        let mut store = WidgetStore::new();
        let mut sel = Selection::new();
        let mut history = History::new();
        history.push(&store);
        let first = store.add(WidgetKind::Panel);
        history.undo(&mut store, &mut sel);
        let second = store.add(WidgetKind::Panel);
        assert_ne!(first, second);
    }
}
