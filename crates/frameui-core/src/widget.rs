//! Widget definitions for the layout designer.

use kurbo::{Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Unique identifier for widgets.
///
/// Ids are handed out by [`WidgetStore`](crate::store::WidgetStore) from a
/// monotonically increasing counter and are never reused.
pub type WidgetId = u64;

/// Smallest width or height a widget may have after any edit.
pub const MIN_WIDGET_SIZE: f64 = 1.0;

/// Position given to freshly added widgets (center of a 1920x1080 canvas).
pub const DEFAULT_POSITION: Point = Point::new(960.0, 540.0);

/// Size given to freshly added widgets.
pub const DEFAULT_SIZE: Size = Size::new(100.0, 100.0);

/// Widget type tag.
///
/// Tags written by a newer editor are kept verbatim in `Other` so a load
/// and save does not rewrite them.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum WidgetKind {
    #[default]
    Panel,
    Button,
    Text,
    Label,
    Input,
    Checkbox,
    Combobox,
    Image,
    Other(String),
}

impl WidgetKind {
    /// All kinds that can be created from the palette.
    pub const ALL: [WidgetKind; 8] = [
        WidgetKind::Panel,
        WidgetKind::Button,
        WidgetKind::Text,
        WidgetKind::Label,
        WidgetKind::Input,
        WidgetKind::Checkbox,
        WidgetKind::Combobox,
        WidgetKind::Image,
    ];

    /// The serialized tag, also used to build default names.
    pub fn as_str(&self) -> &str {
        match self {
            WidgetKind::Panel => "panel",
            WidgetKind::Button => "button",
            WidgetKind::Text => "text",
            WidgetKind::Label => "label",
            WidgetKind::Input => "input",
            WidgetKind::Checkbox => "checkbox",
            WidgetKind::Combobox => "combobox",
            WidgetKind::Image => "image",
            WidgetKind::Other(tag) => tag,
        }
    }

    /// Placeholder text for a new widget of this kind.
    pub fn default_text(&self) -> &'static str {
        match self {
            WidgetKind::Text => "文本",
            WidgetKind::Button => "按钮",
            _ => "",
        }
    }

    /// Whether an image path is meaningful for this kind.
    pub fn supports_image(&self) -> bool {
        matches!(
            self,
            WidgetKind::Panel | WidgetKind::Button | WidgetKind::Image | WidgetKind::Checkbox
        )
    }
}

impl From<String> for WidgetKind {
    fn from(tag: String) -> Self {
        WidgetKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == tag)
            .unwrap_or(WidgetKind::Other(tag))
    }
}

impl From<WidgetKind> for String {
    fn from(kind: WidgetKind) -> Self {
        match kind {
            WidgetKind::Other(tag) => tag,
            known => known.as_str().to_string(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_font_size() -> f64 {
    14.0
}

fn default_text_align() -> String {
    "top_left".to_string()
}

/// A rectangular node in the editable design tree.
///
/// Geometry is stored in world space. The field names follow the project
/// document format consumed by the export backends.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Widget {
    pub id: WidgetId,
    #[serde(default)]
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: WidgetKind,
    /// Parent widget, if any. This is a relational pointer only; the
    /// store owns every widget.
    #[serde(default)]
    pub parent_id: Option<WidgetId>,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default = "default_size_w")]
    pub w: f64,
    #[serde(default = "default_size_h")]
    pub h: f64,
    #[serde(default = "default_true")]
    pub enable: bool,
    #[serde(default = "default_true")]
    pub visible: bool,
    #[serde(default)]
    pub locked: bool,
    /// Font name or font file.
    #[serde(default)]
    pub font: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default)]
    pub outline_size: f64,
    #[serde(default = "default_text_align")]
    pub text_align: String,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub image: String,
    /// Button pressed-state image.
    #[serde(default)]
    pub click_image: String,
    /// Button hover-state image.
    #[serde(default)]
    pub hover_image: String,
    #[serde(default)]
    pub draggable: bool,
    #[serde(default)]
    pub checked: bool,
    #[serde(default)]
    pub selected_index: i64,
}

fn default_size_w() -> f64 {
    DEFAULT_SIZE.width
}

fn default_size_h() -> f64 {
    DEFAULT_SIZE.height
}

impl Widget {
    /// Create a widget of the given kind with default geometry and content.
    pub fn new(id: WidgetId, kind: WidgetKind) -> Self {
        Self {
            id,
            name: format!("{}_{}", kind.as_str(), id),
            text: kind.default_text().to_string(),
            kind,
            parent_id: None,
            x: DEFAULT_POSITION.x,
            y: DEFAULT_POSITION.y,
            w: DEFAULT_SIZE.width,
            h: DEFAULT_SIZE.height,
            enable: true,
            visible: true,
            locked: false,
            font: String::new(),
            font_size: default_font_size(),
            outline_size: 0.0,
            text_align: default_text_align(),
            image: String::new(),
            click_image: String::new(),
            hover_image: String::new(),
            draggable: false,
            checked: false,
            selected_index: 0,
        }
    }

    /// Builder-style geometry setter, mostly useful for tests and importers.
    pub fn with_bounds(mut self, x: f64, y: f64, w: f64, h: f64) -> Self {
        self.x = x;
        self.y = y;
        self.set_size(w, h);
        self
    }

    /// Top-left corner in world coordinates.
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn size(&self) -> Size {
        Size::new(self.w, self.h)
    }

    /// Axis-aligned bounding box in world coordinates.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.w, self.y + self.h)
    }

    /// Move the widget by `delta`. Non-finite deltas are ignored.
    pub fn translate(&mut self, delta: Vec2) {
        let nx = self.x + delta.x;
        let ny = self.y + delta.y;
        if nx.is_nan() || ny.is_nan() {
            return;
        }
        self.x = nx;
        self.y = ny;
    }

    /// Set the size, clamping both axes to [`MIN_WIDGET_SIZE`].
    pub fn set_size(&mut self, w: f64, h: f64) {
        if !w.is_nan() {
            self.w = w.max(MIN_WIDGET_SIZE);
        }
        if !h.is_nan() {
            self.h = h.max(MIN_WIDGET_SIZE);
        }
    }

    /// Re-apply the minimum size invariant (used after loading foreign data).
    pub fn clamp_size(&mut self) {
        let (w, h) = (self.w, self.h);
        self.set_size(w, h);
        if self.w.is_nan() {
            self.w = MIN_WIDGET_SIZE;
        }
        if self.h.is_nan() {
            self.h = MIN_WIDGET_SIZE;
        }
    }

    /// Inclusive AABB overlap test against an arbitrary rectangle.
    ///
    /// Touching edges count as overlapping, which is what marquee selection
    /// expects.
    pub fn overlaps(&self, rect: Rect) -> bool {
        let b = self.bounds();
        b.x0 <= rect.x1 && b.x1 >= rect.x0 && b.y0 <= rect.y1 && b.y1 >= rect.y0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_widget_defaults() {
        let w = Widget::new(3, WidgetKind::Button);
        assert_eq!(w.name, "button_3");
        assert_eq!(w.text, "按钮");
        assert_eq!(w.origin(), DEFAULT_POSITION);
        assert_eq!(w.size(), DEFAULT_SIZE);
        assert!(w.enable && w.visible && !w.locked);
        assert_eq!(w.parent_id, None);
    }

    #[test]
    fn test_set_size_clamps() {
        let mut w = Widget::new(1, WidgetKind::Panel);
        w.set_size(0.0, -20.0);
        assert_eq!(w.w, MIN_WIDGET_SIZE);
        assert_eq!(w.h, MIN_WIDGET_SIZE);
    }

    #[test]
    fn test_translate_ignores_nan() {
        let mut w = Widget::new(1, WidgetKind::Panel).with_bounds(10.0, 10.0, 5.0, 5.0);
        w.translate(Vec2::new(f64::NAN, 1.0));
        assert_eq!(w.origin(), Point::new(10.0, 10.0));
        w.translate(Vec2::new(2.0, -3.0));
        assert_eq!(w.origin(), Point::new(12.0, 7.0));
    }

    #[test]
    fn test_overlap_is_inclusive() {
        let w = Widget::new(1, WidgetKind::Panel).with_bounds(100.0, 0.0, 10.0, 10.0);
        assert!(w.overlaps(Rect::new(0.0, 0.0, 100.0, 100.0)));
        assert!(!w.overlaps(Rect::new(0.0, 0.0, 99.0, 100.0)));
    }

    #[test]
    fn test_serde_field_names() {
        let mut w = Widget::new(7, WidgetKind::Label);
        w.parent_id = Some(2);
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["type"], "label");
        assert_eq!(json["parentId"], 2);
        assert_eq!(json["fontSize"], 14.0);
        assert_eq!(json["textAlign"], "top_left");
    }

    #[test]
    fn test_unknown_kind_saved_verbatim() {
        let w: Widget = serde_json::from_str(r#"{"id": 4, "type": "slider"}"#).unwrap();
        let json = serde_json::to_value(&w).unwrap();
        assert_eq!(json["type"], "slider");
        assert!(!w.kind.supports_image());

        let known: Widget = serde_json::from_str(r#"{"id": 5, "type": "combobox"}"#).unwrap();
        assert_eq!(known.kind, WidgetKind::Combobox);
    }

    #[test]
    fn test_unknown_kind_and_missing_fields() {
        let json = r#"{"id": 4, "type": "slider", "x": 1, "y": 2}"#;
        let w: Widget = serde_json::from_str(json).unwrap();
        assert_eq!(w.kind, WidgetKind::Other("slider".to_string()));
        assert_eq!(w.w, DEFAULT_SIZE.width);
        assert!(w.visible);
        assert_eq!(w.text_align, "top_left");
    }
}
