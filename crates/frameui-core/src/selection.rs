//! Selection bookkeeping.
//!
//! The selection is a set of widget ids kept in insertion order. Order does
//! not matter for membership, but the first id is the anchor: batch
//! operations such as alignment use it as their reference widget.

use crate::store::WidgetStore;
use crate::widget::WidgetId;
use std::collections::HashSet;

/// The set of currently selected widgets.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: Vec<WidgetId>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the selection with a single widget.
    pub fn select_only(&mut self, id: WidgetId) {
        self.ids.clear();
        self.ids.push(id);
    }

    /// Add `id` if absent, remove it if present.
    pub fn toggle(&mut self, id: WidgetId) {
        if let Some(pos) = self.ids.iter().position(|&s| s == id) {
            self.ids.remove(pos);
        } else {
            self.ids.push(id);
        }
    }

    /// Add `id` without disturbing the anchor.
    pub fn add(&mut self, id: WidgetId) {
        if !self.contains(id) {
            self.ids.push(id);
        }
    }

    /// Replace the selection with a batch of ids. Duplicates are dropped.
    pub fn replace_with(&mut self, ids: impl IntoIterator<Item = WidgetId>) {
        self.ids.clear();
        for id in ids {
            self.add(id);
        }
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    pub fn contains(&self, id: WidgetId) -> bool {
        self.ids.contains(&id)
    }

    /// The reference widget for alignment and other batch edits.
    pub fn anchor(&self) -> Option<WidgetId> {
        self.ids.first().copied()
    }

    pub fn ids(&self) -> &[WidgetId] {
        &self.ids
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Forget ids that no longer resolve in `store`.
    pub fn retain_existing(&mut self, store: &WidgetStore) {
        self.ids.retain(|&id| store.contains(id));
    }

    /// Selected widgets whose parent is not itself selected.
    ///
    /// Moving each of these together with its subtree moves every selected
    /// widget exactly once.
    pub fn roots(&self, store: &WidgetStore) -> Vec<WidgetId> {
        let set: HashSet<WidgetId> = self.ids.iter().copied().collect();
        self.ids
            .iter()
            .copied()
            .filter(|&id| {
                store
                    .get(id)
                    .is_some_and(|w| w.parent_id.is_none_or(|p| !set.contains(&p)))
            })
            .collect()
    }
}
