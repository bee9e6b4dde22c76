//! Basic filled shapes: rectangles, circles, diamonds, sticky notes and text.

use super::{Element, ElementId, ElementKind, SerializableColor};
use crate::config::SizePreset;
use crate::hit_test;
use kurbo::{Affine, BezPath, Circle, Point, Rect, Shape as KurboShape, Size};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The kind of a basic shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ShapeKind {
    Rectangle,
    Circle,
    Diamond,
    StickyNote,
    Text,
}

impl ShapeKind {
    /// Medium-preset default size for stamped shapes.
    pub fn default_size(self) -> Size {
        match self {
            ShapeKind::Rectangle => Size::new(150.0, 60.0),
            ShapeKind::Circle => Size::new(100.0, 100.0),
            ShapeKind::Diamond => Size::new(120.0, 120.0),
            ShapeKind::StickyNote => Size::new(160.0, 160.0),
            ShapeKind::Text => Size::new(160.0, 40.0),
        }
    }

    /// Default size scaled by a preset.
    pub fn preset_size(self, preset: SizePreset) -> Size {
        let size = self.default_size();
        Size::new(size.width * preset.scale(), size.height * preset.scale())
    }

    /// Default fill color.
    pub fn default_fill(self) -> SerializableColor {
        match self {
            ShapeKind::StickyNote => SerializableColor::sticky_yellow(),
            ShapeKind::Text => SerializableColor::transparent(),
            _ => SerializableColor::new(0xa5, 0xd8, 0xff, 255),
        }
    }
}

/// A filled shape.
///
/// `position` is the top-left corner, except for circles where it is the
/// center and `width` is the diameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shape {
    pub(crate) id: ElementId,
    pub kind: ShapeKind,
    pub position: Point,
    pub width: f64,
    pub height: f64,
    pub fill: SerializableColor,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl Shape {
    /// Create a new shape. Negative sizes are clamped to zero.
    pub fn new(kind: ShapeKind, position: Point, width: f64, height: f64) -> Self {
        let (width, height) = match kind {
            // Circles keep width == height == diameter.
            ShapeKind::Circle => {
                let d = width.max(height).max(0.0);
                (d, d)
            }
            _ => (width.max(0.0), height.max(0.0)),
        };
        Self {
            id: Uuid::new_v4(),
            kind,
            position,
            width,
            height,
            fill: kind.default_fill(),
            label: None,
        }
    }

    /// Create a circle from its center and radius.
    pub fn circle(center: Point, radius: f64) -> Self {
        let d = radius.max(0.0) * 2.0;
        Self::new(ShapeKind::Circle, center, d, d)
    }

    /// Create a shape of the kind's preset size at `position`.
    pub fn stamp(kind: ShapeKind, position: Point, preset: SizePreset) -> Self {
        let size = kind.preset_size(preset);
        Self::new(kind, position, size.width, size.height)
    }

    /// Create a shape spanning two drag corners.
    ///
    /// Circles are centered on `start` with the drag distance as radius.
    pub fn from_drag(kind: ShapeKind, start: Point, end: Point) -> Self {
        match kind {
            ShapeKind::Circle => Self::circle(start, start.distance(end)),
            _ => {
                let rect = Rect::from_points(start, end);
                Self::new(kind, rect.origin(), rect.width(), rect.height())
            }
        }
    }

    /// Set the label (builder style).
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Set the fill (builder style).
    pub fn with_fill(mut self, fill: SerializableColor) -> Self {
        self.fill = fill;
        self
    }

    /// Circle radius (half the width).
    pub fn radius(&self) -> f64 {
        self.width / 2.0
    }

    /// Resize, keeping sizes non-negative.
    pub fn set_size(&mut self, width: f64, height: f64) {
        if self.kind == ShapeKind::Circle {
            let d = width.max(height).max(0.0);
            self.width = d;
            self.height = d;
        } else {
            self.width = width.max(0.0);
            self.height = height.max(0.0);
        }
    }

    /// Outline path for rendering.
    pub fn to_path(&self) -> BezPath {
        let bounds = self.bounds();
        match self.kind {
            ShapeKind::Circle => Circle::new(self.position, self.radius()).to_path(0.1),
            ShapeKind::Diamond => {
                let c = bounds.center();
                let mut path = BezPath::new();
                path.move_to((c.x, bounds.y0));
                path.line_to((bounds.x1, c.y));
                path.line_to((c.x, bounds.y1));
                path.line_to((bounds.x0, c.y));
                path.close_path();
                path
            }
            _ => bounds.to_path(0.1),
        }
    }
}

impl Element for Shape {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Shape
    }

    fn bounds(&self) -> Rect {
        match self.kind {
            ShapeKind::Circle => {
                let r = self.radius();
                Rect::new(
                    self.position.x - r,
                    self.position.y - r,
                    self.position.x + r,
                    self.position.y + r,
                )
            }
            _ => Rect::from_origin_size(self.position, (self.width, self.height)),
        }
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        match self.kind {
            ShapeKind::Circle => {
                hit_test::point_in_circle(point, self.position, self.radius(), tolerance)
            }
            // Diamonds are tested against their bounding box, not the rotated outline.
            ShapeKind::Rectangle
            | ShapeKind::Diamond
            | ShapeKind::StickyNote
            | ShapeKind::Text => hit_test::point_in_rect(point, self.bounds(), tolerance),
        }
    }

    fn transform(&mut self, affine: Affine) {
        let coeffs = affine.as_coeffs();
        let (sx, sy) = (coeffs[0].abs(), coeffs[3].abs());
        match self.kind {
            ShapeKind::Circle => {
                self.position = affine * self.position;
                let d = self.width * sx.max(sy);
                self.set_size(d, d);
            }
            _ => {
                // Transform both corners so scaling about any anchor works.
                let rect = self.bounds();
                let p0 = affine * Point::new(rect.x0, rect.y0);
                let p1 = affine * Point::new(rect.x1, rect.y1);
                let rect = Rect::from_points(p0, p1);
                self.position = rect.origin();
                self.set_size(rect.width(), rect.height());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Vec2;

    #[test]
    fn test_stamp_rectangle_default_size() {
        let shape = Shape::stamp(ShapeKind::Rectangle, Point::new(100.0, 100.0), SizePreset::Medium);
        assert_eq!(shape.kind, ShapeKind::Rectangle);
        assert_eq!(shape.position, Point::new(100.0, 100.0));
        assert!((shape.width - 150.0).abs() < f64::EPSILON);
        assert!((shape.height - 60.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_preset_scaling() {
        let small = Shape::stamp(ShapeKind::Rectangle, Point::ZERO, SizePreset::Small);
        let large = Shape::stamp(ShapeKind::Rectangle, Point::ZERO, SizePreset::Large);
        assert!((small.width - 75.0).abs() < f64::EPSILON);
        assert!((large.height - 90.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_negative_size_clamped() {
        let shape = Shape::new(ShapeKind::Rectangle, Point::ZERO, -10.0, 20.0);
        assert!(shape.width.abs() < f64::EPSILON);
        assert!((shape.height - 20.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_from_drag_normalizes_corners() {
        let shape = Shape::from_drag(
            ShapeKind::Rectangle,
            Point::new(100.0, 100.0),
            Point::new(50.0, 20.0),
        );
        assert_eq!(shape.position, Point::new(50.0, 20.0));
        assert!((shape.width - 50.0).abs() < f64::EPSILON);
        assert!((shape.height - 80.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_circle_from_drag() {
        let shape = Shape::from_drag(ShapeKind::Circle, Point::new(10.0, 10.0), Point::new(13.0, 14.0));
        assert_eq!(shape.position, Point::new(10.0, 10.0));
        assert!((shape.radius() - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_circle_hit_uses_distance() {
        let circle = Shape::circle(Point::new(0.0, 0.0), 10.0);
        assert!(circle.hit_test(Point::new(7.0, 7.0), 0.0));
        // Inside the bounding box corner but outside the circle.
        assert!(!circle.hit_test(Point::new(9.0, 9.0), 0.0));
    }

    #[test]
    fn test_diamond_hit_uses_bounding_box() {
        let diamond = Shape::new(ShapeKind::Diamond, Point::ZERO, 100.0, 100.0);
        // The corner lies outside the rotated outline but inside the box.
        assert!(diamond.hit_test(Point::new(2.0, 2.0), 0.0));
        assert!(!diamond.hit_test(Point::new(101.0, 50.0), 0.0));
    }

    #[test]
    fn test_translate_and_scale() {
        let mut shape = Shape::new(ShapeKind::Rectangle, Point::new(10.0, 10.0), 20.0, 10.0);
        shape.transform(Affine::translate(Vec2::new(5.0, -5.0)));
        assert_eq!(shape.position, Point::new(15.0, 5.0));

        let anchor = shape.position;
        shape.transform(
            Affine::translate(anchor.to_vec2()) * Affine::scale(2.0) * Affine::translate(-anchor.to_vec2()),
        );
        assert_eq!(shape.position, Point::new(15.0, 5.0));
        assert!((shape.width - 40.0).abs() < 1e-9);
        assert!((shape.height - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_serialized_kind_names() {
        let shape = Shape::new(ShapeKind::StickyNote, Point::ZERO, 1.0, 1.0).with_label("todo");
        let json = serde_json::to_value(&shape).unwrap();
        assert_eq!(json["kind"], "sticky-note");
        assert_eq!(json["label"], "todo");
        assert_eq!(json["fill"], "#fef08a");
    }
}
