//! Editor configuration.

use crate::snap::{DEFAULT_GRID_STEP, Grid};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from reading settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("invalid settings JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings must be a JSON object")]
    NotAnObject,
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// User-tunable editor settings.
///
/// Every field has a default, so partial JSON (older or hand-written files)
/// merges over the defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EditorSettings {
    /// Logical canvas size in world units.
    pub canvas_width: f64,
    pub canvas_height: f64,
    /// Ruler tick spacing.
    pub ruler_step: f64,
    /// Step used for drag/resize snapping when no grid is shown.
    pub grid_snap_step: f64,
    pub auto_save: bool,
    pub control_panel_width: f64,
    pub canvas_bg_color: String,
    pub canvas_bg_image: String,
}

impl Default for EditorSettings {
    fn default() -> Self {
        Self {
            canvas_width: 1920.0,
            canvas_height: 1080.0,
            ruler_step: 50.0,
            grid_snap_step: DEFAULT_GRID_STEP,
            auto_save: false,
            control_panel_width: 220.0,
            canvas_bg_color: "#1a1a1a".to_string(),
            canvas_bg_image: String::new(),
        }
    }
}

impl EditorSettings {
    /// Parse settings, filling missing fields with defaults.
    pub fn from_json(json: &str) -> SettingsResult<Self> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn from_value(value: serde_json::Value) -> SettingsResult<Self> {
        if !value.is_object() {
            return Err(SettingsError::NotAnObject);
        }
        Ok(serde_json::from_value::<Self>(value)?.sanitized())
    }

    pub fn to_json(&self) -> SettingsResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Replace unusable numbers with their defaults.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        let positive = |v: f64| v.is_finite() && v > 0.0;
        if !positive(self.canvas_width) {
            self.canvas_width = defaults.canvas_width;
        }
        if !positive(self.canvas_height) {
            self.canvas_height = defaults.canvas_height;
        }
        if !positive(self.ruler_step) {
            self.ruler_step = defaults.ruler_step;
        }
        if !positive(self.grid_snap_step) {
            self.grid_snap_step = defaults.grid_snap_step;
        }
        self
    }

    /// Push the snap step into a grid.
    pub fn apply_to_grid(&self, grid: &mut Grid) {
        grid.fallback_step = self.grid_snap_step;
    }
}
