//! Vector path model (lines, cubic and quadratic Béziers).

use crate::svg::fmt_num;
use kurbo::{Affine, BezPath, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Control-point distance for approximating a quarter circle with a cubic
/// Bézier: 4/3 * (sqrt(2) - 1).
pub const ELLIPSE_KAPPA: f64 = 0.552_284_749_830_793_4;

/// A single path command.
///
/// Control points are optional so that imported data missing them still
/// renders; such segments degrade to straight lines.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum PathPoint {
    #[serde(rename = "M")]
    Move { to: Point },
    #[serde(rename = "L")]
    Line { to: Point },
    #[serde(rename = "C")]
    Cubic {
        #[serde(default)]
        cp1: Option<Point>,
        #[serde(default)]
        cp2: Option<Point>,
        to: Point,
    },
    #[serde(rename = "Q")]
    Quad {
        #[serde(default)]
        cp1: Option<Point>,
        to: Point,
    },
    #[serde(rename = "Z")]
    Close,
}

impl PathPoint {
    /// The anchor (segment end point); `None` for `Close`.
    pub fn anchor(&self) -> Option<Point> {
        match *self {
            PathPoint::Move { to }
            | PathPoint::Line { to }
            | PathPoint::Cubic { to, .. }
            | PathPoint::Quad { to, .. } => Some(to),
            PathPoint::Close => None,
        }
    }

    /// Control points carried by this command (may be empty).
    pub fn control_points(&self) -> impl Iterator<Item = Point> {
        let (a, b) = match *self {
            PathPoint::Cubic { cp1, cp2, .. } => (cp1, cp2),
            PathPoint::Quad { cp1, .. } => (cp1, None),
            _ => (None, None),
        };
        a.into_iter().chain(b)
    }

    /// Apply a transform to the anchor and every control point.
    pub fn transformed(&self, affine: Affine) -> PathPoint {
        match *self {
            PathPoint::Move { to } => PathPoint::Move { to: affine * to },
            PathPoint::Line { to } => PathPoint::Line { to: affine * to },
            PathPoint::Cubic { cp1, cp2, to } => PathPoint::Cubic {
                cp1: cp1.map(|p| affine * p),
                cp2: cp2.map(|p| affine * p),
                to: affine * to,
            },
            PathPoint::Quad { cp1, to } => PathPoint::Quad {
                cp1: cp1.map(|p| affine * p),
                to: affine * to,
            },
            PathPoint::Close => PathPoint::Close,
        }
    }

    /// SVG path mini-language for this command.
    fn to_command(self) -> String {
        match self {
            PathPoint::Move { to } => format!("M {} {}", fmt_num(to.x), fmt_num(to.y)),
            PathPoint::Line { to } => format!("L {} {}", fmt_num(to.x), fmt_num(to.y)),
            PathPoint::Cubic {
                cp1: Some(c1),
                cp2: Some(c2),
                to,
            } => format!(
                "C {} {} {} {} {} {}",
                fmt_num(c1.x),
                fmt_num(c1.y),
                fmt_num(c2.x),
                fmt_num(c2.y),
                fmt_num(to.x),
                fmt_num(to.y)
            ),
            PathPoint::Quad { cp1: Some(c), to } => format!(
                "Q {} {} {} {}",
                fmt_num(c.x),
                fmt_num(c.y),
                fmt_num(to.x),
                fmt_num(to.y)
            ),
            // Missing control points: straight line to the anchor.
            PathPoint::Cubic { to, .. } | PathPoint::Quad { to, .. } => {
                format!("L {} {}", fmt_num(to.x), fmt_num(to.y))
            }
            PathPoint::Close => "Z".to_string(),
        }
    }
}

/// An ordered sequence of path commands.
///
/// The first command is always a `Move` unless the path is empty; input
/// documents are repaired on load the same way [`PathData::from_points`] does.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawPathData")]
pub struct PathData {
    pub points: Vec<PathPoint>,
    pub closed: bool,
}

#[derive(Deserialize)]
struct RawPathData {
    points: Vec<PathPoint>,
    #[serde(default)]
    closed: bool,
}

impl From<RawPathData> for PathData {
    fn from(raw: RawPathData) -> Self {
        Self::from_points(raw.points, raw.closed)
    }
}

impl PathData {
    /// Start a new path at `start`.
    pub fn new(start: Point) -> Self {
        Self {
            points: vec![PathPoint::Move { to: start }],
            closed: false,
        }
    }

    /// Build a path from raw commands, repairing a missing leading `Move`.
    pub fn from_points(points: Vec<PathPoint>, closed: bool) -> Self {
        let mut path = Self::default();
        for point in points {
            path.push(point);
        }
        path.closed = closed || path.points.last() == Some(&PathPoint::Close);
        path
    }

    fn push(&mut self, point: PathPoint) {
        if self.points.is_empty() {
            if let Some(to) = point.anchor() {
                self.points.push(PathPoint::Move { to });
            }
            return;
        }
        self.points.push(point);
    }

    /// Append a straight segment.
    pub fn line_to(mut self, to: Point) -> Self {
        self.push(PathPoint::Line { to });
        self
    }

    /// Append a cubic Bézier segment.
    pub fn curve_to(mut self, cp1: Point, cp2: Point, to: Point) -> Self {
        self.push(PathPoint::Cubic {
            cp1: Some(cp1),
            cp2: Some(cp2),
            to,
        });
        self
    }

    /// Append a quadratic Bézier segment.
    pub fn quad_to(mut self, cp: Point, to: Point) -> Self {
        self.push(PathPoint::Quad { cp1: Some(cp), to });
        self
    }

    /// Close the current subpath.
    pub fn close(mut self) -> Self {
        if !self.points.is_empty() {
            self.points.push(PathPoint::Close);
            self.closed = true;
        }
        self
    }

    /// Approximate an ellipse with four cubic segments.
    pub fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64) -> Self {
        let kx = ELLIPSE_KAPPA * rx;
        let ky = ELLIPSE_KAPPA * ry;
        Self::new(Point::new(cx + rx, cy))
            .curve_to(
                Point::new(cx + rx, cy + ky),
                Point::new(cx + kx, cy + ry),
                Point::new(cx, cy + ry),
            )
            .curve_to(
                Point::new(cx - kx, cy + ry),
                Point::new(cx - rx, cy + ky),
                Point::new(cx - rx, cy),
            )
            .curve_to(
                Point::new(cx - rx, cy - ky),
                Point::new(cx - kx, cy - ry),
                Point::new(cx, cy - ry),
            )
            .curve_to(
                Point::new(cx + kx, cy - ry),
                Point::new(cx + rx, cy - ky),
                Point::new(cx + rx, cy),
            )
            .close()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Render to the SVG path mini-language.
    pub fn to_path_string(&self) -> String {
        self.points
            .iter()
            .map(|p| p.to_command())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Bounding box over anchors and control points.
    ///
    /// Control points are included so curved segments are never
    /// under-bounded. An empty path yields `Rect::ZERO`.
    pub fn bounding_box(&self) -> Rect {
        let mut all = self
            .points
            .iter()
            .flat_map(|p| p.anchor().into_iter().chain(p.control_points()));
        let Some(first) = all.next() else {
            return Rect::ZERO;
        };
        all.fold(Rect::from_points(first, first), |r, p| r.union_pt(p))
    }

    /// Apply an affine transform to every anchor and control point.
    pub fn transform(&self, affine: Affine) -> PathData {
        PathData {
            points: self.points.iter().map(|p| p.transformed(affine)).collect(),
            closed: self.closed,
        }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> PathData {
        self.transform(Affine::translate(Vec2::new(dx, dy)))
    }

    /// Scale about `origin`, or about (0, 0) when none is given.
    pub fn scale(&self, sx: f64, sy: f64, origin: Option<Point>) -> PathData {
        let origin = origin.unwrap_or(Point::ORIGIN).to_vec2();
        self.transform(
            Affine::translate(origin) * Affine::scale_non_uniform(sx, sy) * Affine::translate(-origin),
        )
    }

    /// Rotate by `degrees` (clockwise on a y-down canvas) about `origin`,
    /// or about (0, 0) when none is given.
    pub fn rotate(&self, degrees: f64, origin: Option<Point>) -> PathData {
        let origin = origin.unwrap_or(Point::ORIGIN);
        self.transform(Affine::rotate_about(degrees.to_radians(), origin))
    }

    /// First anchor, skipping `Close` commands.
    pub fn first_anchor(&self) -> Option<Point> {
        self.points.iter().find_map(PathPoint::anchor)
    }

    /// Last anchor, skipping `Close` commands.
    pub fn last_anchor(&self) -> Option<Point> {
        self.points.iter().rev().find_map(PathPoint::anchor)
    }

    /// Convert to a kurbo path for renderers.
    pub fn to_bez_path(&self) -> BezPath {
        let mut path = BezPath::new();
        for point in &self.points {
            match *point {
                PathPoint::Move { to } => path.move_to(to),
                PathPoint::Line { to } => path.line_to(to),
                PathPoint::Cubic {
                    cp1: Some(c1),
                    cp2: Some(c2),
                    to,
                } => path.curve_to(c1, c2, to),
                PathPoint::Quad { cp1: Some(c), to } => path.quad_to(c, to),
                PathPoint::Cubic { to, .. } | PathPoint::Quad { to, .. } => path.line_to(to),
                PathPoint::Close => path.close_path(),
            }
        }
        path
    }
}
