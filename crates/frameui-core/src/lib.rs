//! FrameUI Core Library
//!
//! Host-agnostic editing engine for the FrameUI layout editor: the widget
//! tree, canvas gestures, hierarchy drag-to-reparent, undo/redo and the
//! animation preview. Rendering, file dialogs and code export live in the
//! host and only use the query surface exposed here.

pub mod animation;
pub mod document;
pub mod editor;
pub mod handles;
pub mod hierarchy;
pub mod history;
pub mod input;
pub mod interaction;
pub mod scene;
pub mod selection;
pub mod settings;
pub mod snap;
pub mod store;
pub mod viewport;
pub mod widget;

pub use animation::{
    Animation, AnimationId, AnimationKind, AnimationList, AnimationParams, AnimationPatch, Easing,
    ExportedAnimation, PreviewHandle, PreviewPlayer, RenderOverride,
};
pub use document::{DocumentError, DocumentResult, ProjectDocument};
pub use editor::{Alignment, Editor};
pub use hierarchy::{HierarchyController, TreeDrop, TreeOutcome, TreeRow};
pub use history::{History, MAX_UNDO_HISTORY};
pub use input::{InputState, Modifiers, MouseButton, PointerEvent, PointerTarget};
pub use interaction::{Gesture, InteractionController};
pub use scene::Scene;
pub use selection::Selection;
pub use settings::{EditorSettings, SettingsError};
pub use snap::{Grid, GridMode, snap_size, snap_to_grid};
pub use store::{ReparentError, ReparentResult, WidgetStore};
pub use viewport::Viewport;
pub use widget::{Widget, WidgetId, WidgetKind};
