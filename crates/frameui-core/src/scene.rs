//! The single owned editing state shared by every controller.

use crate::history::History;
use crate::selection::Selection;
use crate::store::WidgetStore;

/// Widget collection, selection and history, owned together.
///
/// Controllers never keep copies of this state; they receive `&mut Scene`
/// for the duration of one event and mutate it through the component
/// operations.
#[derive(Debug, Clone, Default)]
pub struct Scene {
    pub store: WidgetStore,
    pub selection: Selection,
    pub history: History,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an undo point for the current widget collection.
    pub fn push_history(&mut self) {
        self.history.push(&self.store);
    }

    pub fn undo(&mut self) -> bool {
        self.history.undo(&mut self.store, &mut self.selection)
    }

    pub fn redo(&mut self) -> bool {
        self.history.redo(&mut self.store, &mut self.selection)
    }
}
