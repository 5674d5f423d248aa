//! The editor facade: one scene plus every controller that edits it.
//!
//! Hosts forward raw events here. The editor resolves hit targets, routes
//! events to the right controller and keeps the status message that the
//! UI shows after an action is refused.

use crate::animation::{
    AnimationId, AnimationKind, AnimationList, AnimationPatch, ExportedAnimation, PreviewHandle,
    PreviewPlayer,
};
use crate::document::{DocumentResult, ProjectDocument};
use crate::handles::resolve_target;
use crate::hierarchy::{HierarchyController, TreeDrop, TreeOutcome, is_cycle_rejection};
use crate::input::{InputState, Modifiers, PointerEvent};
use crate::interaction::InteractionController;
use crate::scene::Scene;
use crate::settings::EditorSettings;
use crate::snap::Grid;
use crate::store::{ReparentError, ReparentResult};
use crate::viewport::Viewport;
use crate::widget::{Widget, WidgetId, WidgetKind};
use kurbo::{Point, Vec2};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Offset applied to pasted widgets so they do not cover the original.
pub const PASTE_OFFSET: f64 = 20.0;

pub const MSG_ALIGN_NEEDS_TWO: &str = "至少选中两个控件才能对齐";
pub const MSG_SAME_WIDTH_NEEDS_TWO: &str = "至少选中两个控件才能等宽";
pub const MSG_SAME_HEIGHT_NEEDS_TWO: &str = "至少选中两个控件才能等高";
pub const MSG_PARENT_UNDER_CHILD: &str = "无法将父节点移动到其子节点下面";

/// Alignment and size-matching commands. The selection anchor is the
/// reference widget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    Left,
    Top,
    HorizontalCenter,
    VerticalCenter,
    SameWidth,
    SameHeight,
}

impl Alignment {
    fn refusal(self) -> &'static str {
        match self {
            Alignment::SameWidth => MSG_SAME_WIDTH_NEEDS_TWO,
            Alignment::SameHeight => MSG_SAME_HEIGHT_NEEDS_TWO,
            _ => MSG_ALIGN_NEEDS_TWO,
        }
    }
}

/// Complete editing session.
#[derive(Debug, Clone, Default)]
pub struct Editor {
    pub scene: Scene,
    pub viewport: Viewport,
    pub grid: Grid,
    pub input: InputState,
    pub interaction: InteractionController,
    pub hierarchy: HierarchyController,
    pub animations: AnimationList,
    pub preview: PreviewPlayer,
    pub settings: EditorSettings,
    clipboard: Option<Widget>,
    message: Option<String>,
    /// Document keys owned by other tools, written back on export.
    document_extra: Map<String, Value>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_settings(settings: EditorSettings) -> Self {
        let mut editor = Self::new();
        editor.apply_settings(settings);
        editor
    }

    pub fn apply_settings(&mut self, settings: EditorSettings) {
        settings.apply_to_grid(&mut self.grid);
        self.settings = settings;
    }

    /// Latest status message for the user.
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    pub fn take_message(&mut self) -> Option<String> {
        self.message.take()
    }

    fn set_message(&mut self, message: impl Into<String>) {
        let message = message.into();
        log::info!("{message}");
        self.message = Some(message);
    }

    pub fn selected_widget(&self) -> Option<&Widget> {
        self.scene.selection.anchor().and_then(|id| self.scene.store.get(id))
    }

    // --- widgets -------------------------------------------------------
    //
    // Every mutating command stops a running preview first, so the widgets
    // it moved are back at their stored positions before the edit.

    /// Add a widget with default geometry and select it.
    pub fn add_widget(&mut self, kind: WidgetKind) -> WidgetId {
        self.preview.stop(&mut self.scene.store);
        self.scene.push_history();
        let id = self.scene.store.add(kind);
        self.scene.selection.select_only(id);
        id
    }

    /// Delete the selection and everything below it.
    pub fn delete_selected(&mut self) -> bool {
        if self.scene.selection.is_empty() {
            return false;
        }
        self.preview.stop(&mut self.scene.store);
        self.scene.push_history();
        let ids = self.scene.selection.ids().to_vec();
        self.scene.store.remove(&ids);
        self.scene.selection.clear();
        self.forget_missing_widgets();
        true
    }

    /// Remove every widget and animation. Not undoable.
    pub fn clear_all(&mut self) {
        self.preview.stop(&mut self.scene.store);
        self.interaction.cancel();
        self.scene.store.clear();
        self.scene.selection.clear();
        self.scene.history.clear();
        self.animations.clear();
        self.hierarchy = HierarchyController::new();
    }

    /// Reparent from the property panel.
    pub fn set_parent(&mut self, id: WidgetId, parent: Option<WidgetId>) -> ReparentResult<()> {
        self.preview.stop(&mut self.scene.store);
        if let Err(err) = self.scene.store.check_parent(id, parent) {
            self.report_reparent_error(&err);
            return Err(err);
        }
        self.scene.push_history();
        self.scene.store.set_parent(id, parent)
    }

    fn report_reparent_error(&mut self, err: &ReparentError) {
        if is_cycle_rejection(err) {
            self.set_message(MSG_PARENT_UNDER_CHILD);
        } else {
            log::warn!("reparent refused: {err}");
        }
    }

    fn forget_missing_widgets(&mut self) {
        self.scene.selection.retain_existing(&self.scene.store);
        self.animations.retain_widgets(&self.scene.store);
        self.hierarchy.prune(&self.scene.store);
    }

    pub fn undo(&mut self) -> bool {
        self.preview.stop(&mut self.scene.store);
        self.interaction.cancel();
        let done = self.scene.undo();
        self.hierarchy.prune(&self.scene.store);
        done
    }

    pub fn redo(&mut self) -> bool {
        self.preview.stop(&mut self.scene.store);
        self.interaction.cancel();
        let done = self.scene.redo();
        self.hierarchy.prune(&self.scene.store);
        done
    }

    // --- alignment and batch edits ---------------------------------------

    /// Align or size-match the selection to its anchor.
    ///
    /// Needs at least two selected widgets; otherwise a message is set and
    /// nothing changes.
    pub fn align(&mut self, alignment: Alignment) -> bool {
        self.preview.stop(&mut self.scene.store);
        if self.scene.selection.len() < 2 {
            self.set_message(alignment.refusal());
            return false;
        }
        let Some(base) = self.selected_widget().map(Widget::bounds) else {
            return false;
        };
        self.scene.push_history();
        let others: Vec<WidgetId> = self.scene.selection.ids()[1..].to_vec();
        for id in others {
            let Some(widget) = self.scene.store.get_mut(id) else {
                continue;
            };
            match alignment {
                Alignment::Left => widget.x = base.x0,
                Alignment::Top => widget.y = base.y0,
                Alignment::HorizontalCenter => {
                    widget.x = (base.center().x - widget.w / 2.0).round();
                }
                Alignment::VerticalCenter => {
                    widget.y = (base.center().y - widget.h / 2.0).round();
                }
                Alignment::SameWidth => widget.set_size(base.width(), widget.h),
                Alignment::SameHeight => widget.set_size(widget.w, base.height()),
            }
        }
        true
    }

    /// Move every selected root subtree by the same offset.
    pub fn batch_move(&mut self, dx: f64, dy: f64) -> bool {
        self.preview.stop(&mut self.scene.store);
        let delta = Vec2::new(
            if dx.is_finite() { dx } else { 0.0 },
            if dy.is_finite() { dy } else { 0.0 },
        );
        if delta == Vec2::ZERO || self.scene.selection.is_empty() {
            return false;
        }
        self.scene.push_history();
        for root in self.scene.selection.roots(&self.scene.store) {
            self.scene.store.translate_subtree(root, delta.x, delta.y);
        }
        true
    }

    /// Set width and/or height of every selected widget.
    pub fn batch_size(&mut self, w: Option<f64>, h: Option<f64>) -> bool {
        self.preview.stop(&mut self.scene.store);
        let w = w.filter(|v| !v.is_nan());
        let h = h.filter(|v| !v.is_nan());
        if (w.is_none() && h.is_none()) || self.scene.selection.is_empty() {
            return false;
        }
        self.scene.push_history();
        for &id in self.scene.selection.ids() {
            if let Some(widget) = self.scene.store.get_mut(id) {
                let (cw, ch) = (widget.w, widget.h);
                widget.set_size(w.unwrap_or(cw), h.unwrap_or(ch));
            }
        }
        true
    }

    /// Set the text of every selected widget. Empty text means "leave as is".
    pub fn batch_text(&mut self, text: &str) -> bool {
        self.preview.stop(&mut self.scene.store);
        if text.is_empty() || self.scene.selection.is_empty() {
            return false;
        }
        self.scene.push_history();
        for &id in self.scene.selection.ids() {
            if let Some(widget) = self.scene.store.get_mut(id) {
                widget.text = text.to_string();
            }
        }
        true
    }

    /// Set the image of every selected widget whose kind shows one.
    pub fn batch_image(&mut self, image: &str) -> bool {
        self.preview.stop(&mut self.scene.store);
        if image.is_empty() || self.scene.selection.is_empty() {
            return false;
        }
        self.scene.push_history();
        for &id in self.scene.selection.ids() {
            if let Some(widget) = self.scene.store.get_mut(id) {
                if widget.kind.supports_image() {
                    widget.image = image.to_string();
                }
            }
        }
        true
    }

    // --- clipboard -------------------------------------------------------

    /// Copy the anchor widget.
    pub fn copy_selection(&mut self) -> bool {
        self.clipboard = self.selected_widget().cloned();
        self.clipboard.is_some()
    }

    /// Paste the copied widget offset by [`PASTE_OFFSET`] under a new id and
    /// select it.
    pub fn paste(&mut self) -> Option<WidgetId> {
        let mut widget = self.clipboard.clone()?;
        self.preview.stop(&mut self.scene.store);
        widget.translate(Vec2::new(PASTE_OFFSET, PASTE_OFFSET));
        self.scene.push_history();
        let id = self.scene.store.insert_copy(widget);
        self.scene.selection.select_only(id);
        Some(id)
    }

    pub fn has_clipboard(&self) -> bool {
        self.clipboard.is_some()
    }

    // --- canvas events ---------------------------------------------------

    pub fn canvas_pointer_down(&mut self, event: PointerEvent) {
        self.preview.stop(&mut self.scene.store);
        self.input.pointer_position = event.position;
        self.input.set_modifiers(event.modifiers);
        let target = resolve_target(
            &self.scene.store,
            &self.scene.selection,
            &self.viewport,
            event.position,
        );
        let pan = self.input.is_panning_key_held();
        self.interaction.pointer_down(&mut self.scene, &self.viewport, event, target, pan);
    }

    pub fn canvas_pointer_move(&mut self, position: Point) {
        self.input.pointer_position = position;
        self.interaction
            .pointer_move(&mut self.scene, &mut self.viewport, &self.grid, position);
    }

    pub fn canvas_pointer_up(&mut self) {
        self.interaction.pointer_up(&mut self.scene);
    }

    /// Wheel over the canvas. Zooms only while the multi-select modifier is
    /// held; plain wheel scrolling belongs to the host.
    pub fn canvas_wheel(&mut self, delta_y: f64, modifiers: Modifiers) -> bool {
        if !modifiers.multi_select() {
            return false;
        }
        self.viewport.wheel_zoom(delta_y);
        true
    }

    /// Per-frame callback: applies coalesced marquee motion and advances
    /// the animation preview. Returns whether a preview is still running.
    pub fn on_frame(&mut self, now_ms: f64) -> bool {
        self.interaction.on_frame(&self.viewport);
        self.preview.tick(&mut self.scene.store, now_ms)
    }

    // --- tree events -----------------------------------------------------

    pub fn tree_pointer_down(&mut self, id: WidgetId, event: PointerEvent) {
        self.hierarchy.row_pointer_down(&self.scene.store, id, event);
    }

    pub fn tree_pointer_move(&mut self, position: Point) {
        self.hierarchy.pointer_move(position);
    }

    pub fn tree_pointer_up(&mut self, drop: TreeDrop) -> TreeOutcome {
        self.preview.stop(&mut self.scene.store);
        match self.hierarchy.pointer_up(&mut self.scene, drop) {
            Ok(outcome) => outcome,
            Err(err) => {
                self.report_reparent_error(&err);
                TreeOutcome::None
            }
        }
    }

    /// Delete from the tree's context menu.
    pub fn tree_delete(&mut self, id: WidgetId) -> bool {
        self.preview.stop(&mut self.scene.store);
        let deleted = self.hierarchy.delete(&mut self.scene, id);
        if deleted {
            self.forget_missing_widgets();
        }
        deleted
    }

    // --- animations ------------------------------------------------------

    /// Add an animation to the anchor widget.
    pub fn add_animation(&mut self, kind: AnimationKind) -> Option<AnimationId> {
        let widget = self.scene.selection.anchor()?;
        self.scene.store.contains(widget).then(|| self.animations.add_for(widget, kind))
    }

    pub fn update_animation(&mut self, id: AnimationId, patch: AnimationPatch) -> bool {
        self.animations.update(id, patch)
    }

    pub fn remove_animation(&mut self, id: AnimationId) -> bool {
        self.animations.remove(id)
    }

    pub fn duplicate_animation(&mut self, id: AnimationId) -> Option<AnimationId> {
        self.animations.duplicate(id)
    }

    /// Start previewing an animation, replacing any running preview.
    pub fn preview_animation(&mut self, id: AnimationId, now_ms: f64) -> Option<PreviewHandle> {
        let Some(anim) = self.animations.get(id) else {
            self.preview.stop(&mut self.scene.store);
            return None;
        };
        self.preview.start(anim, &mut self.scene.store, now_ms)
    }

    pub fn cancel_preview(&mut self, handle: PreviewHandle) -> bool {
        self.preview.cancel(handle, &mut self.scene.store)
    }

    /// Animations for exporters, grouped by widget.
    pub fn export_animations(&self) -> BTreeMap<WidgetId, Vec<ExportedAnimation>> {
        self.animations.export_by_widget()
    }

    // --- documents -------------------------------------------------------

    /// Snapshot the project as a document.
    pub fn export_document(&self) -> ProjectDocument {
        ProjectDocument {
            widgets: self.scene.store.snapshot(),
            animations: self.animations.animations().to_vec(),
            next_anim_id: self.animations.next_id(),
            settings: self.settings.clone(),
            extra: self.document_extra.clone(),
        }
    }

    pub fn save_json(&self) -> DocumentResult<String> {
        self.export_document().to_json()
    }

    /// Replace the project with a parsed document. Undo brings back the
    /// previous widgets.
    pub fn load_document(&mut self, document: ProjectDocument) {
        self.preview.stop(&mut self.scene.store);
        self.interaction.cancel();
        self.hierarchy.cancel_drag();

        self.scene.push_history();
        let count = document.widgets.len();
        self.animations = document.animation_list();
        self.scene.store.replace_all(document.widgets);
        self.scene.selection.clear();
        self.apply_settings(document.settings);
        self.document_extra = document.extra;
        self.hierarchy.prune(&self.scene.store);
        log::info!("loaded project with {count} widgets and {} animations", self.animations.len());
    }

    /// Parse and load a project. On error nothing changes.
    pub fn load_json(&mut self, json: &str) -> DocumentResult<()> {
        match ProjectDocument::from_json(json) {
            Ok(document) => {
                self.load_document(document);
                Ok(())
            }
            Err(err) => {
                log::warn!("project not loaded: {err}");
                Err(err)
            }
        }
    }
}
