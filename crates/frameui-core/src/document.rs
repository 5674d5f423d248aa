//! The project document: widgets, animations and settings as one JSON file.
//!
//! Loading validates the shape before anything is handed to the editor, so
//! a bad file never leaves a half-loaded project behind.

use crate::animation::{Animation, AnimationList};
use crate::settings::EditorSettings;
use crate::widget::{Widget, WidgetId};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashSet;
use thiserror::Error;

/// Errors from reading a project document.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("invalid project JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("project document must be a JSON object")]
    NotAnObject,
    #[error("project document has no widget list")]
    MissingWidgets,
    #[error("project widgets must be a list")]
    WidgetsNotAList,
    #[error("widget #{index} is invalid: {source}")]
    InvalidWidget {
        index: usize,
        #[source]
        source: serde_json::Error,
    },
    #[error("widget id {0} appears more than once")]
    DuplicateWidgetId(WidgetId),
}

/// Result type for document operations.
pub type DocumentResult<T> = Result<T, DocumentError>;

/// A complete project as stored on disk.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectDocument {
    pub widgets: Vec<Widget>,
    pub animations: Vec<Animation>,
    pub next_anim_id: u64,
    pub settings: EditorSettings,
    /// Top-level keys owned by other tools (resources, export config),
    /// carried through untouched.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Default for ProjectDocument {
    fn default() -> Self {
        Self {
            widgets: Vec::new(),
            animations: Vec::new(),
            next_anim_id: 1,
            settings: EditorSettings::default(),
            extra: Map::new(),
        }
    }
}

impl ProjectDocument {
    pub fn to_json(&self) -> DocumentResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_json(json: &str) -> DocumentResult<Self> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Validate and decode a parsed document.
    ///
    /// `widgets` must be a list of widget records with distinct ids. Animations that fail to
    /// decode are skipped; a missing or malformed animation list loads as
    /// empty. Settings merge over the defaults.
    pub fn from_value(value: Value) -> DocumentResult<Self> {
        let Value::Object(mut root) = value else {
            return Err(DocumentError::NotAnObject);
        };

        let widgets = match root.remove("widgets") {
            Some(Value::Array(items)) => items
                .into_iter()
                .enumerate()
                .map(|(index, item)| {
                    serde_json::from_value::<Widget>(item)
                        .map_err(|source| DocumentError::InvalidWidget { index, source })
                })
                .collect::<DocumentResult<Vec<_>>>()?,
            Some(_) => return Err(DocumentError::WidgetsNotAList),
            None => return Err(DocumentError::MissingWidgets),
        };
        let mut seen = HashSet::with_capacity(widgets.len());
        if let Some(dup) = widgets.iter().find(|w| !seen.insert(w.id)) {
            return Err(DocumentError::DuplicateWidgetId(dup.id));
        }

        let animations = match root.remove("animations") {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match serde_json::from_value::<Animation>(item) {
                    Ok(anim) => Some(anim),
                    Err(err) => {
                        log::warn!("skipping invalid animation: {err}");
                        None
                    }
                })
                .collect(),
            _ => Vec::new(),
        };
        // The stored counter is informational; ids restart after the largest.
        root.remove("nextAnimId");
        let next_anim_id = animations.iter().map(|a| a.id + 1).max().unwrap_or(1);

        let settings = match root.remove("settings") {
            Some(value @ Value::Object(_)) => {
                EditorSettings::from_value(value).unwrap_or_else(|err| {
                    log::warn!("ignoring invalid settings: {err}");
                    EditorSettings::default()
                })
            }
            _ => EditorSettings::default(),
        };

        Ok(Self {
            widgets,
            animations,
            next_anim_id,
            settings,
            extra: root,
        })
    }

    /// Split the animation data into a ready-to-use list.
    pub fn animation_list(&self) -> AnimationList {
        AnimationList::from_parts(self.animations.clone(), self.next_anim_id)
    }
}
