//! Freehand pencil strokes.

use super::{Element, ElementId, ElementKind, SerializableColor};
use crate::hit_test;
use kurbo::{Affine, BezPath, Point, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A freehand drawing (series of points in drawing order).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stroke {
    pub(crate) id: ElementId,
    /// Points in the order they were drawn.
    pub points: Vec<Point>,
    pub color: SerializableColor,
    pub width: f64,
}

impl Stroke {
    /// Minimum number of points for a stroke to be committed.
    pub const MIN_POINTS: usize = 2;

    /// Create a new empty stroke.
    pub fn new(color: SerializableColor, width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            points: Vec::new(),
            color,
            width,
        }
    }

    /// Create from existing points.
    pub fn from_points(points: Vec<Point>, color: SerializableColor, width: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            points,
            color,
            width,
        }
    }

    /// Add a point to the path.
    pub fn add_point(&mut self, point: Point) {
        self.points.push(point);
    }

    /// Get the number of points.
    pub fn len(&self) -> usize {
        self.points.len()
    }

    /// Check if the path is empty.
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Strokes with fewer than two points are degenerate and never committed.
    pub fn is_committable(&self) -> bool {
        self.points.len() >= Self::MIN_POINTS
    }

    /// Path geometry for rendering. Derived from `points` on every call.
    pub fn to_path(&self) -> BezPath {
        let mut path = BezPath::new();

        let Some(first) = self.points.first() else {
            return path;
        };

        path.move_to(*first);
        for point in self.points.iter().skip(1) {
            path.line_to(*point);
        }

        path
    }
}

impl Element for Stroke {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Stroke
    }

    fn bounds(&self) -> Rect {
        hit_test::points_bounds(&self.points).unwrap_or(Rect::ZERO)
    }

    /// Vertex-proximity test: long segments between sparse points can be missed.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        hit_test::point_near_points(point, &self.points, tolerance)
    }

    fn transform(&mut self, affine: Affine) {
        for point in &mut self.points {
            *point = affine * *point;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stroke_creation() {
        let stroke = Stroke::new(SerializableColor::black(), 2.0);
        assert!(stroke.is_empty());
        assert!(!stroke.is_committable());
    }

    #[test]
    fn test_add_points() {
        let mut stroke = Stroke::new(SerializableColor::black(), 2.0);
        stroke.add_point(Point::new(0.0, 0.0));
        assert!(!stroke.is_committable());
        stroke.add_point(Point::new(10.0, 10.0));
        assert_eq!(stroke.len(), 2);
        assert!(stroke.is_committable());
    }

    #[test]
    fn test_bounds() {
        let stroke = Stroke::from_points(
            vec![
                Point::new(0.0, 0.0),
                Point::new(100.0, 50.0),
                Point::new(50.0, 100.0),
            ],
            SerializableColor::black(),
            2.0,
        );

        let bounds = stroke.bounds();
        assert!((bounds.x0).abs() < f64::EPSILON);
        assert!((bounds.y0).abs() < f64::EPSILON);
        assert!((bounds.x1 - 100.0).abs() < f64::EPSILON);
        assert!((bounds.y1 - 100.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_hit_test_near_vertices_only() {
        let stroke = Stroke::from_points(
            vec![Point::new(0.0, 0.0), Point::new(100.0, 0.0)],
            SerializableColor::black(),
            2.0,
        );

        assert!(stroke.hit_test(Point::new(3.0, 3.0), 5.0));
        assert!(stroke.hit_test(Point::new(98.0, 0.0), 5.0));
        // Midpoint of the segment is far from both vertices.
        assert!(!stroke.hit_test(Point::new(50.0, 0.0), 5.0));
    }

    #[test]
    fn test_path_skips_cached_geometry_in_json() {
        let stroke = Stroke::from_points(
            vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0)],
            SerializableColor::black(),
            2.0,
        );
        assert_eq!(stroke.to_path().elements().len(), 2);
        let json = serde_json::to_value(&stroke).unwrap();
        assert!(json.get("path").is_none());
        assert_eq!(json["points"].as_array().map(Vec::len), Some(2));
    }
}
