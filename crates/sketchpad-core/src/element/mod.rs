//! Scene elements.

mod path;

pub use path::{ELLIPSE_KAPPA, PathData, PathPoint};

use crate::snap::normalize_degrees;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for elements.
pub type ElementId = Uuid;

/// Variant-specific element payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Ellipse,
    Text {
        #[serde(default)]
        content: String,
    },
    Image {
        #[serde(default)]
        href: Option<String>,
    },
    Frame,
    /// Children live in the scene's group side table; order is relative z-order.
    Group {
        #[serde(rename = "childIds", default)]
        child_ids: Vec<ElementId>,
    },
    /// Path anchors are kept in their creation-time coordinate space.
    Path { data: PathData },
}

impl ElementKind {
    /// Human-readable label, used as the default element name.
    pub fn label(&self) -> &'static str {
        match self {
            ElementKind::Rectangle => "Rectangle",
            ElementKind::Ellipse => "Ellipse",
            ElementKind::Text { .. } => "Text",
            ElementKind::Image { .. } => "Image",
            ElementKind::Frame => "Frame",
            ElementKind::Group { .. } => "Group",
            ElementKind::Path { .. } => "Path",
        }
    }

    /// Parse a palette kind name (`"rectangle"`, `"ellipse"`, ...).
    ///
    /// Groups cannot be created from a name; paths start as an ellipse
    /// outline filling the unit box.
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "rectangle" | "rect" => Some(ElementKind::Rectangle),
            "ellipse" | "circle" => Some(ElementKind::Ellipse),
            "text" => Some(ElementKind::Text {
                content: String::new(),
            }),
            "image" => Some(ElementKind::Image { href: None }),
            "frame" => Some(ElementKind::Frame),
            "path" => Some(ElementKind::Path {
                data: PathData::ellipse(0.5, 0.5, 0.5, 0.5),
            }),
            _ => None,
        }
    }
}

/// Style properties. Colors are opaque strings handed through to output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ElementStyle {
    pub fill: String,
    pub stroke: String,
    pub stroke_width: f64,
}

impl Default for ElementStyle {
    fn default() -> Self {
        Self {
            fill: "#ffffff".to_string(),
            stroke: "#000000".to_string(),
            stroke_width: 2.0,
        }
    }
}

/// The atomic scene object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    #[serde(flatten)]
    pub kind: ElementKind,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Degrees, clockwise, normalized to `[0, 360)`.
    #[serde(default)]
    pub rotation: f64,
    #[serde(default)]
    pub style: ElementStyle,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub locked: bool,
    #[serde(default = "default_visible")]
    pub visible: bool,
}

fn default_visible() -> bool {
    true
}

impl Element {
    /// Create an element occupying `rect` with a fresh id.
    pub fn new(kind: ElementKind, rect: Rect) -> Self {
        let rect = rect.abs();
        Self {
            id: Uuid::new_v4(),
            name: kind.label().to_string(),
            kind,
            x: rect.x0,
            y: rect.y0,
            width: rect.width(),
            height: rect.height(),
            rotation: 0.0,
            style: ElementStyle::default(),
            locked: false,
            visible: true,
        }
    }

    /// Create a path element sized to the path's own bounding box.
    pub fn from_path(data: PathData) -> Self {
        let bounds = data.bounding_box();
        Self::new(ElementKind::Path { data }, bounds)
    }

    /// Unrotated bounding box in canvas space.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height)
    }

    pub fn center(&self) -> Point {
        self.bounds().center()
    }

    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Replace position and size from a box.
    pub fn set_bounds(&mut self, rect: Rect) {
        let rect = rect.abs();
        self.x = rect.x0;
        self.y = rect.y0;
        self.width = rect.width();
        self.height = rect.height();
    }

    pub fn set_rotation(&mut self, degrees: f64) {
        self.rotation = normalize_degrees(degrees);
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
    }

    pub fn is_group(&self) -> bool {
        matches!(self.kind, ElementKind::Group { .. })
    }

    /// Child ids if this element is a group.
    pub fn child_ids(&self) -> &[ElementId] {
        match &self.kind {
            ElementKind::Group { child_ids } => child_ids,
            _ => &[],
        }
    }

    /// Assign a fresh unique identifier.
    pub fn regenerate_id(&mut self) {
        self.id = Uuid::new_v4();
    }

    /// Shallow-merge a patch into this element.
    pub fn apply_patch(&mut self, patch: &ElementPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width.max(0.0);
        }
        if let Some(height) = patch.height {
            self.height = height.max(0.0);
        }
        if let Some(rotation) = patch.rotation {
            self.set_rotation(rotation);
        }
        if let Some(fill) = &patch.fill {
            self.style.fill = fill.clone();
        }
        if let Some(stroke) = &patch.stroke {
            self.style.stroke = stroke.clone();
        }
        if let Some(stroke_width) = patch.stroke_width {
            self.style.stroke_width = stroke_width.max(0.0);
        }
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(locked) = patch.locked {
            self.locked = locked;
        }
        if let Some(visible) = patch.visible {
            self.visible = visible;
        }
        if let (Some(content), ElementKind::Text { content: current }) =
            (&patch.content, &mut self.kind)
        {
            *current = content.clone();
        }
    }
}

/// Field-wise update for [`Element::apply_patch`]. `None` leaves a field as is.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub rotation: Option<f64>,
    pub fill: Option<String>,
    pub stroke: Option<String>,
    pub stroke_width: Option<f64>,
    pub name: Option<String>,
    pub locked: Option<bool>,
    pub visible: Option<bool>,
    /// Text content (ignored for other kinds).
    pub content: Option<String>,
}

/// Union of the unrotated boxes of `elements`, or `None` when empty.
pub fn union_bounds<'a>(elements: impl IntoIterator<Item = &'a Element>) -> Option<Rect> {
    elements
        .into_iter()
        .map(Element::bounds)
        .reduce(|acc, b| acc.union(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_element_creation() {
        let el = Element::new(ElementKind::Rectangle, Rect::new(10.0, 20.0, 110.0, 70.0));
        assert!((el.x - 10.0).abs() < f64::EPSILON);
        assert!((el.width - 100.0).abs() < f64::EPSILON);
        assert!((el.height - 50.0).abs() < f64::EPSILON);
        assert_eq!(el.name, "Rectangle");
        assert!(el.visible);
        assert!(!el.locked);
    }

    #[test]
    fn test_inverted_rect_is_normalized() {
        let el = Element::new(ElementKind::Ellipse, Rect::new(50.0, 50.0, 0.0, 0.0));
        assert!((el.x).abs() < f64::EPSILON);
        assert!((el.width - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_apply_patch() {
        let mut el = Element::new(ElementKind::Text { content: "a".into() }, Rect::new(0.0, 0.0, 10.0, 10.0));
        el.apply_patch(&ElementPatch {
            x: Some(5.0),
            rotation: Some(-90.0),
            width: Some(-3.0),
            fill: Some("red".into()),
            content: Some("hello".into()),
            ..Default::default()
        });
        assert!((el.x - 5.0).abs() < f64::EPSILON);
        assert!((el.rotation - 270.0).abs() < 1e-9);
        assert!(el.width.abs() < f64::EPSILON);
        assert_eq!(el.style.fill, "red");
        assert_eq!(el.kind, ElementKind::Text { content: "hello".into() });
        // Untouched fields stay.
        assert!((el.y).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_path_uses_path_bounds() {
        let data = PathData::new(Point::new(10.0, 10.0)).line_to(Point::new(30.0, 50.0));
        let el = Element::from_path(data);
        assert_eq!(el.bounds(), Rect::new(10.0, 10.0, 30.0, 50.0));
    }

    #[test]
    fn test_union_bounds() {
        let a = Element::new(ElementKind::Rectangle, Rect::new(0.0, 0.0, 10.0, 10.0));
        let b = Element::new(ElementKind::Rectangle, Rect::new(20.0, -5.0, 30.0, 5.0));
        assert_eq!(union_bounds([&a, &b]), Some(Rect::new(0.0, -5.0, 30.0, 10.0)));
        assert_eq!(union_bounds(std::iter::empty()), None);
    }

    #[test]
    fn test_kind_from_name() {
        assert_eq!(ElementKind::from_name("Rectangle"), Some(ElementKind::Rectangle));
        assert!(matches!(ElementKind::from_name("path"), Some(ElementKind::Path { .. })));
        assert_eq!(ElementKind::from_name("group"), None);
    }

    #[test]
    fn test_interchange_json_shape() {
        let el = Element::new(ElementKind::Group { child_ids: vec![] }, Rect::new(0.0, 0.0, 1.0, 1.0));
        let json = serde_json::to_value(&el).unwrap();
        assert_eq!(json["kind"], "group");
        assert!(json.get("childIds").is_some());
        assert!(json["style"].get("strokeWidth").is_some());
        let back: Element = serde_json::from_value(json).unwrap();
        assert_eq!(back, el);
    }
}
