//! Deterministic SVG export.

use crate::element::{Element, ElementId, ElementKind, union_bounds};
use kurbo::Vec2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Default padding around exported documents.
pub const DEFAULT_EXPORT_PADDING: f64 = 20.0;

/// Document returned when nothing is exported.
pub const EMPTY_SVG: &str =
    r#"<svg xmlns="http://www.w3.org/2000/svg" width="100" height="100" viewBox="0 0 100 100"></svg>"#;

const CORNER_RADIUS: f64 = 4.0;
const TEXT_FONT_SIZE: f64 = 16.0;

/// Export settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    pub padding: f64,
    pub background_color: Option<String>,
    /// Export invisible elements too.
    pub include_hidden: bool,
    /// Export only these elements instead of the whole scene.
    pub selected_ids: Option<BTreeSet<ElementId>>,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            padding: DEFAULT_EXPORT_PADDING,
            background_color: None,
            include_hidden: false,
            selected_ids: None,
        }
    }
}

impl ExportOptions {
    fn includes(&self, element: &Element) -> bool {
        if !element.visible && !self.include_hidden {
            return false;
        }
        self.selected_ids
            .as_ref()
            .is_none_or(|ids| ids.contains(&element.id))
    }
}

/// Format a number for SVG output: at most three decimals, no trailing
/// zeros, no negative zero.
pub(crate) fn fmt_num(value: f64) -> String {
    if !value.is_finite() {
        return "0".to_string();
    }
    let rounded = (value * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

/// Escape text for use in attribute values and text nodes.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            _ => out.push(c),
        }
    }
    out
}

fn paint_attrs(element: &Element, stroke_width: f64) -> String {
    format!(
        r#"fill="{}" stroke="{}" stroke-width="{}""#,
        escape_xml(&element.style.fill),
        escape_xml(&element.style.stroke),
        fmt_num(stroke_width)
    )
}

/// ` transform="rotate(r cx cy)"` for rotated elements, empty otherwise.
fn rotate_attr(element: &Element, offset: Vec2) -> String {
    if element.rotation == 0.0 {
        return String::new();
    }
    let center = element.center() + offset;
    format!(
        r#" transform="rotate({} {} {})""#,
        fmt_num(element.rotation),
        fmt_num(center.x),
        fmt_num(center.y)
    )
}

/// Render one element as an SVG node, shifted by `offset`.
pub fn element_to_svg(element: &Element, offset: Vec2) -> String {
    let x = element.x + offset.x;
    let y = element.y + offset.y;
    let (w, h) = (element.width, element.height);
    let rotate = rotate_attr(element, offset);

    match &element.kind {
        ElementKind::Rectangle | ElementKind::Frame | ElementKind::Image { .. } => format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" rx="{}" {}{}/>"#,
            fmt_num(x),
            fmt_num(y),
            fmt_num(w),
            fmt_num(h),
            fmt_num(CORNER_RADIUS),
            paint_attrs(element, element.style.stroke_width),
            rotate
        ),
        ElementKind::Ellipse => format!(
            r#"<ellipse cx="{}" cy="{}" rx="{}" ry="{}" {}{}/>"#,
            fmt_num(x + w / 2.0),
            fmt_num(y + h / 2.0),
            fmt_num(w / 2.0),
            fmt_num(h / 2.0),
            paint_attrs(element, element.style.stroke_width),
            rotate
        ),
        ElementKind::Group { .. } => format!(
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="none" stroke="{}" stroke-width="{}" stroke-dasharray="4 4"{}/>"#,
            fmt_num(x),
            fmt_num(y),
            fmt_num(w),
            fmt_num(h),
            escape_xml(&element.style.stroke),
            fmt_num(element.style.stroke_width),
            rotate
        ),
        ElementKind::Text { content } => format!(
            r#"<text x="{}" y="{}" font-size="{}" dominant-baseline="hanging" fill="{}"{}>{}</text>"#,
            fmt_num(x),
            fmt_num(y),
            fmt_num(TEXT_FONT_SIZE),
            escape_xml(&element.style.stroke),
            rotate,
            escape_xml(content)
        ),
        ElementKind::Path { data } => path_to_svg(element, data, offset),
    }
}

/// Path anchors stay in creation-time coordinates, so the node carries the
/// full chain: rotate about the box center, move to the box, scale the
/// original bounds onto the box, re-origin the raw data.
fn path_to_svg(element: &Element, data: &crate::element::PathData, offset: Vec2) -> String {
    let original = data.bounding_box();
    let sx = if original.width() > 0.0 { element.width / original.width() } else { 1.0 };
    let sy = if original.height() > 0.0 { element.height / original.height() } else { 1.0 };
    let max_scale = sx.max(sy);
    let stroke_width = if max_scale > 0.0 {
        element.style.stroke_width / max_scale
    } else {
        element.style.stroke_width
    };

    let mut transform = Vec::with_capacity(4);
    if element.rotation != 0.0 {
        let center = element.center() + offset;
        transform.push(format!(
            "rotate({} {} {})",
            fmt_num(element.rotation),
            fmt_num(center.x),
            fmt_num(center.y)
        ));
    }
    transform.push(format!(
        "translate({} {})",
        fmt_num(element.x + offset.x),
        fmt_num(element.y + offset.y)
    ));
    transform.push(format!("scale({} {})", fmt_num(sx), fmt_num(sy)));
    transform.push(format!("translate({} {})", fmt_num(-original.x0), fmt_num(-original.y0)));

    format!(
        r#"<path d="{}" {} transform="{}"/>"#,
        data.to_path_string(),
        paint_attrs(element, stroke_width),
        transform.join(" ")
    )
}

/// Export elements as a self-contained SVG document.
///
/// The document is cropped to the union box of the exported elements plus
/// padding, and its viewBox starts at the origin. An empty export yields
/// [`EMPTY_SVG`].
pub fn elements_to_svg(elements: &[Element], options: &ExportOptions) -> String {
    let exported: Vec<&Element> = elements.iter().filter(|e| options.includes(e)).collect();
    let Some(bounds) = union_bounds(exported.iter().copied()) else {
        log::info!("SVG export: nothing to export");
        return EMPTY_SVG.to_string();
    };

    let padding = options.padding.max(0.0);
    let width = bounds.width() + padding * 2.0;
    let height = bounds.height() + padding * 2.0;
    let offset = Vec2::new(-bounds.x0 + padding, -bounds.y0 + padding);

    let mut lines = Vec::with_capacity(exported.len() + 3);
    lines.push(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="0 0 {w} {h}">"#,
        w = fmt_num(width),
        h = fmt_num(height)
    ));
    if let Some(color) = &options.background_color {
        lines.push(format!(
            r#"  <rect width="100%" height="100%" fill="{}"/>"#,
            escape_xml(color)
        ));
    }
    for element in &exported {
        lines.push(format!("  {}", element_to_svg(element, offset)));
    }
    lines.push("</svg>".to_string());

    log::info!(
        "SVG export: {} elements, {}x{}",
        exported.len(),
        fmt_num(width),
        fmt_num(height)
    );
    lines.join("\n")
}
