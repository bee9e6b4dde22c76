//! Selection set and manipulation handles.
//!
//! Selection lives beside the document instead of inside it: elements are
//! pure data and the editor tracks which of them are selected.

use crate::document::Document;
use crate::shapes::{Element, ElementId, ElementKind, ElementRef, ShapeKind};
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Handle size in screen pixels.
pub const HANDLE_SIZE: f64 = 10.0;
/// Handle hit tolerance in screen pixels.
pub const HANDLE_HIT_TOLERANCE: f64 = 12.0;

/// The set of selected elements.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    items: HashSet<ElementRef>,
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn contains(&self, element: ElementRef) -> bool {
        self.items.contains(&element)
    }

    /// Whether an element with this id is selected, whatever its kind.
    pub fn is_selected(&self, id: ElementId) -> bool {
        self.items.iter().any(|r| r.id == id)
    }

    /// Replace the selection with a single element.
    pub fn select(&mut self, element: ElementRef) {
        self.items.clear();
        self.items.insert(element);
    }

    /// Add to the selection. Returns false if it was already selected.
    pub fn add(&mut self, element: ElementRef) -> bool {
        self.items.insert(element)
    }

    pub fn remove(&mut self, element: ElementRef) -> bool {
        self.items.remove(&element)
    }

    /// Flip membership of one element.
    pub fn toggle(&mut self, element: ElementRef) {
        if !self.items.remove(&element) {
            self.items.insert(element);
        }
    }

    pub fn extend(&mut self, elements: impl IntoIterator<Item = ElementRef>) {
        self.items.extend(elements);
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ElementRef> {
        self.items.iter()
    }

    /// The only selected element, if exactly one is selected.
    pub fn single(&self) -> Option<ElementRef> {
        if self.items.len() == 1 {
            self.items.iter().next().copied()
        } else {
            None
        }
    }

    /// Ids of the selected elements of one kind.
    pub fn ids_of(&self, kind: ElementKind) -> HashSet<ElementId> {
        self.items
            .iter()
            .filter(|r| r.kind == kind)
            .map(|r| r.id)
            .collect()
    }

    /// Drop entries whose element no longer exists (after undo, delete, load).
    pub fn retain_existing(&mut self, document: &Document) {
        self.items.retain(|r| document.contains(r.kind, r.id));
    }

    /// Union of the selected elements' bounding boxes.
    pub fn bounds(&self, document: &Document) -> Option<Rect> {
        self.items
            .iter()
            .filter_map(|r| document.element_bounds(r.kind, r.id))
            .reduce(|acc, r| acc.union(r))
    }
}

impl FromIterator<ElementRef> for Selection {
    fn from_iter<I: IntoIterator<Item = ElementRef>>(iter: I) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

/// Corner positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Type of selection handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HandleKind {
    /// Corner handle for shapes and nodes.
    Corner(Corner),
    /// Endpoint handle for lines (0 = start, 1 = end).
    Endpoint(usize),
}

/// A selection handle with its position and type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Handle {
    /// Position in logical coordinates.
    pub position: Point,
    pub kind: HandleKind,
}

impl Handle {
    pub fn new(position: Point, kind: HandleKind) -> Self {
        Self { position, kind }
    }

    /// Check if a point hits this handle. `tolerance` should be adjusted for zoom.
    pub fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        (point - self.position).hypot2() <= tolerance * tolerance
    }
}

fn corner_handles(bounds: Rect) -> Vec<Handle> {
    vec![
        Handle::new(Point::new(bounds.x0, bounds.y0), HandleKind::Corner(Corner::TopLeft)),
        Handle::new(Point::new(bounds.x1, bounds.y0), HandleKind::Corner(Corner::TopRight)),
        Handle::new(Point::new(bounds.x0, bounds.y1), HandleKind::Corner(Corner::BottomLeft)),
        Handle::new(Point::new(bounds.x1, bounds.y1), HandleKind::Corner(Corner::BottomRight)),
    ]
}

/// Handles for one element. Strokes and text have none.
pub fn handles_for(document: &Document, element: ElementRef) -> Vec<Handle> {
    match element.kind {
        ElementKind::Shape => document
            .shapes
            .get(element.id)
            .filter(|s| s.kind != ShapeKind::Text)
            .map(|s| corner_handles(s.bounds()))
            .unwrap_or_default(),
        ElementKind::Node => document
            .nodes
            .get(element.id)
            .map(|n| corner_handles(n.bounds()))
            .unwrap_or_default(),
        ElementKind::Line => document
            .lines
            .get(element.id)
            .map(|l| {
                vec![
                    Handle::new(l.start, HandleKind::Endpoint(0)),
                    Handle::new(l.end, HandleKind::Endpoint(1)),
                ]
            })
            .unwrap_or_default(),
        ElementKind::Stroke => Vec::new(),
    }
}

/// Find which handle of a single selected element (if any) is hit.
///
/// Handles are only offered when exactly one element is selected.
pub fn hit_test_handles(
    document: &Document,
    selection: &Selection,
    point: Point,
    tolerance: f64,
) -> Option<(ElementRef, HandleKind)> {
    let element = selection.single()?;
    handles_for(document, element)
        .into_iter()
        .find(|h| h.hit_test(point, tolerance))
        .map(|h| (element, h.kind))
}

/// Move one corner of `bounds` by `delta`, keeping the opposite corner fixed.
///
/// Dragging past the opposite corner flips the rectangle rather than
/// producing a negative size.
pub fn resize_rect(bounds: Rect, corner: Corner, delta: Vec2) -> Rect {
    let (moving, fixed) = match corner {
        Corner::TopLeft => (Point::new(bounds.x0, bounds.y0), Point::new(bounds.x1, bounds.y1)),
        Corner::TopRight => (Point::new(bounds.x1, bounds.y0), Point::new(bounds.x0, bounds.y1)),
        Corner::BottomLeft => (Point::new(bounds.x0, bounds.y1), Point::new(bounds.x1, bounds.y0)),
        Corner::BottomRight => (Point::new(bounds.x1, bounds.y1), Point::new(bounds.x0, bounds.y0)),
    };
    Rect::from_points(moving + delta, fixed)
}
