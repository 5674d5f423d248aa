//! Widget animations: the editable animation list, easing curves and the
//! in-editor preview player.
//!
//! Durations and delays are measured in frames. The editor never plays
//! animations for real; it only previews them (see [`PreviewPlayer`]) and
//! hands the list to exporters through [`AnimationList::export_by_widget`].

mod easing;
mod preview;

pub use easing::Easing;
pub use preview::{PREVIEW_DISTANCE, PREVIEW_FPS, PreviewHandle, PreviewPlayer, RenderOverride};

use crate::store::WidgetStore;
use crate::widget::WidgetId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub type AnimationId = u64;

/// What an animation changes.
///
/// Tags this editor does not preview are kept verbatim in `Other` so they
/// survive a load and save.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum AnimationKind {
    #[default]
    Move,
    Scale,
    Alpha,
    Other(String),
}

impl AnimationKind {
    pub fn as_str(&self) -> &str {
        match self {
            AnimationKind::Move => "move",
            AnimationKind::Scale => "scale",
            AnimationKind::Alpha => "alpha",
            AnimationKind::Other(tag) => tag,
        }
    }
}

impl From<String> for AnimationKind {
    fn from(tag: String) -> Self {
        match tag.as_str() {
            "move" => AnimationKind::Move,
            "scale" => AnimationKind::Scale,
            "alpha" => AnimationKind::Alpha,
            _ => AnimationKind::Other(tag),
        }
    }
}

impl From<AnimationKind> for String {
    fn from(kind: AnimationKind) -> Self {
        match kind {
            AnimationKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

/// Kind-specific animation parameters.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnimationParams {
    /// Move target x. `None` means "40 to the right" when previewing.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_x: Option<f64>,
    /// Move target y. `None` keeps the current y.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to_y: Option<f64>,
    /// Easing id, see [`Easing`].
    #[serde(default)]
    pub tween_type: i64,
    /// Keys this editor does not interpret, kept for exporters.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

impl AnimationParams {
    pub fn easing(&self) -> Easing {
        Easing::from_id(self.tween_type)
    }
}

fn default_duration() -> f64 {
    1.0
}

/// One animation bound to a widget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Animation {
    pub id: AnimationId,
    pub widget_id: WidgetId,
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: AnimationKind,
    /// Length in frames.
    #[serde(default = "default_duration")]
    pub duration: f64,
    /// Frames to wait before starting.
    #[serde(default)]
    pub delay: f64,
    #[serde(rename = "loop", default)]
    pub looping: bool,
    #[serde(default)]
    pub params: AnimationParams,
}

impl Animation {
    pub fn new(id: AnimationId, widget_id: WidgetId, kind: AnimationKind) -> Self {
        Self {
            id,
            widget_id,
            name: format!("动画_{id}"),
            kind,
            duration: default_duration(),
            delay: 0.0,
            looping: false,
            params: AnimationParams::default(),
        }
    }
}

/// Partial update for [`AnimationList::update`]. `None` fields are left
/// untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnimationPatch {
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<AnimationKind>,
    pub duration: Option<f64>,
    pub delay: Option<f64>,
    #[serde(rename = "loop")]
    pub looping: Option<bool>,
    pub params: Option<AnimationParams>,
}

/// An animation as handed to exporters: everything but the editor id.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedAnimation {
    pub widget_id: WidgetId,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: AnimationKind,
    pub duration: f64,
    pub delay: f64,
    #[serde(rename = "loop")]
    pub looping: bool,
    pub params: AnimationParams,
}

impl From<&Animation> for ExportedAnimation {
    fn from(anim: &Animation) -> Self {
        Self {
            widget_id: anim.widget_id,
            name: anim.name.clone(),
            kind: anim.kind.clone(),
            duration: anim.duration,
            delay: anim.delay,
            looping: anim.looping,
            params: anim.params.clone(),
        }
    }
}

/// All animations of a project, with their own id counter.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimationList {
    animations: Vec<Animation>,
    next_id: AnimationId,
}

impl Default for AnimationList {
    fn default() -> Self {
        Self::new()
    }
}

impl AnimationList {
    pub fn new() -> Self {
        Self {
            animations: Vec::new(),
            next_id: 1,
        }
    }

    /// Rebuild a list from stored data. The counter never falls behind the
    /// largest stored id.
    pub fn from_parts(animations: Vec<Animation>, next_id: AnimationId) -> Self {
        let floor = animations.iter().map(|a| a.id + 1).max().unwrap_or(1);
        Self {
            animations,
            next_id: next_id.max(floor),
        }
    }

    pub fn next_id(&self) -> AnimationId {
        self.next_id
    }

    fn allocate(&mut self) -> AnimationId {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Create an animation with default settings for `widget_id`.
    pub fn add_for(&mut self, widget_id: WidgetId, kind: AnimationKind) -> AnimationId {
        let id = self.allocate();
        log::debug!("added {} animation {id} for widget {widget_id}", kind.as_str());
        self.animations.push(Animation::new(id, widget_id, kind));
        id
    }

    pub fn remove(&mut self, id: AnimationId) -> bool {
        let before = self.animations.len();
        self.animations.retain(|a| a.id != id);
        self.animations.len() != before
    }

    /// Copy an animation under a fresh id, appending `_复制` to its name.
    pub fn duplicate(&mut self, id: AnimationId) -> Option<AnimationId> {
        let source = self.get(id)?.clone();
        let new_id = self.allocate();
        self.animations.push(Animation {
            id: new_id,
            name: format!("{}_复制", source.name),
            ..source
        });
        Some(new_id)
    }

    /// Apply a partial update. Returns false for an unknown id.
    pub fn update(&mut self, id: AnimationId, patch: AnimationPatch) -> bool {
        let Some(anim) = self.get_mut(id) else {
            return false;
        };
        if let Some(name) = patch.name {
            anim.name = name;
        }
        if let Some(kind) = patch.kind {
            anim.kind = kind;
        }
        if let Some(duration) = patch.duration {
            anim.duration = duration;
        }
        if let Some(delay) = patch.delay {
            anim.delay = delay;
        }
        if let Some(looping) = patch.looping {
            anim.looping = looping;
        }
        if let Some(params) = patch.params {
            anim.params = params;
        }
        true
    }

    pub fn get(&self, id: AnimationId) -> Option<&Animation> {
        self.animations.iter().find(|a| a.id == id)
    }

    pub fn get_mut(&mut self, id: AnimationId) -> Option<&mut Animation> {
        self.animations.iter_mut().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Animation> {
        self.animations.iter()
    }

    pub fn animations(&self) -> &[Animation] {
        &self.animations
    }

    pub fn len(&self) -> usize {
        self.animations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    pub fn for_widget(&self, widget_id: WidgetId) -> impl Iterator<Item = &Animation> {
        self.animations.iter().filter(move |a| a.widget_id == widget_id)
    }

    /// Drop animations whose widget is gone.
    pub fn retain_widgets(&mut self, store: &WidgetStore) {
        let before = self.animations.len();
        self.animations.retain(|a| store.contains(a.widget_id));
        let dropped = before - self.animations.len();
        if dropped > 0 {
            log::debug!("dropped {dropped} animations of deleted widgets");
        }
    }

    /// Animations grouped by widget id, without their editor ids.
    pub fn export_by_widget(&self) -> BTreeMap<WidgetId, Vec<ExportedAnimation>> {
        let mut grouped: BTreeMap<WidgetId, Vec<ExportedAnimation>> = BTreeMap::new();
        for anim in &self.animations {
            grouped.entry(anim.widget_id).or_default().push(anim.into());
        }
        grouped
    }

    pub fn clear(&mut self) {
        self.animations.clear();
        self.next_id = 1;
    }
}
