//! Straight lines and arrows.

use super::{Element, ElementId, ElementKind, SerializableColor};
use crate::hit_test;
use kurbo::{Affine, BezPath, Line as KurboLine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Whether a segment draws an arrow head at its end.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LineKind {
    #[default]
    Line,
    Arrow,
}

/// A straight segment. Zero-length segments are allowed and render as a point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineSegment {
    pub(crate) id: ElementId,
    pub start: Point,
    pub end: Point,
    #[serde(default)]
    pub kind: LineKind,
    pub color: SerializableColor,
    pub width: f64,
}

impl LineSegment {
    /// Length of the arrow head in logical units.
    pub const ARROW_HEAD_LENGTH: f64 = 12.0;

    /// Create a new segment.
    pub fn new(start: Point, end: Point, kind: LineKind, color: SerializableColor, width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            start,
            end,
            kind,
            color,
            width,
        }
    }

    /// Get the length of the line.
    pub fn length(&self) -> f64 {
        self.start.distance(self.end)
    }

    /// Get the midpoint of the line.
    pub fn midpoint(&self) -> Point {
        self.start.midpoint(self.end)
    }

    /// Get as a kurbo Line.
    pub fn as_kurbo(&self) -> KurboLine {
        KurboLine::new(self.start, self.end)
    }

    /// The two barbs of the arrow head, if this is a non-degenerate arrow.
    pub fn arrow_head(&self) -> Option<(Point, Point)> {
        if self.kind != LineKind::Arrow {
            return None;
        }
        let dir = self.end - self.start;
        let len = dir.hypot();
        if len < f64::EPSILON {
            return None;
        }
        let back = -dir / len * Self::ARROW_HEAD_LENGTH;
        let angle = std::f64::consts::FRAC_PI_6;
        let rotate = |v: Vec2, a: f64| Vec2::new(v.x * a.cos() - v.y * a.sin(), v.x * a.sin() + v.y * a.cos());
        Some((self.end + rotate(back, angle), self.end + rotate(back, -angle)))
    }

    /// Path for rendering, including the arrow head.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();
        path.move_to(self.start);
        path.line_to(self.end);
        if let Some((left, right)) = self.arrow_head() {
            path.move_to(left);
            path.line_to(self.end);
            path.line_to(right);
        }
        path
    }
}

impl Element for LineSegment {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Line
    }

    fn bounds(&self) -> Rect {
        Rect::from_points(self.start, self.end)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        hit_test::point_to_segment_dist(point, self.start, self.end) <= tolerance
    }

    fn transform(&mut self, affine: Affine) {
        self.start = affine * self.start;
        self.end = affine * self.end;
    }
}
