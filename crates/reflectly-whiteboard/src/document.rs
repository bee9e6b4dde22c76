//! Whiteboard document and its element collections.
//!
//! Collections are immutable sequences behind an `Arc`: every mutation builds
//! a new vector and swaps the pointer, so `ptr_eq` answers "did anything
//! change" and history snapshots share unchanged collections.

use crate::camera::ViewportState;
use crate::selection::Selection;
use crate::shapes::{
    Connection, Element, ElementId, ElementKind, ElementRef, LineSegment, Node,
    SerializableColor, Shape, ShapeKind, Stroke,
};
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Errors from document operations that reference elements by id.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("Unknown element: {0}")]
    UnknownElement(ElementId),
    #[error("Connection endpoint does not exist: {0}")]
    DanglingConnection(ElementId),
}

/// Anything stored in a [`Collection`] must expose its id.
pub trait Identified {
    fn element_id(&self) -> ElementId;
}

impl<T: Element> Identified for T {
    fn element_id(&self) -> ElementId {
        self.id()
    }
}

impl Identified for Connection {
    fn element_id(&self) -> ElementId {
        self.id()
    }
}

/// An ordered, copy-on-write collection of elements.
#[derive(Debug, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Collection<T> {
    items: Arc<Vec<T>>,
}

impl<T> Clone for Collection<T> {
    fn clone(&self) -> Self {
        Self {
            items: Arc::clone(&self.items),
        }
    }
}

impl<T> Default for Collection<T> {
    fn default() -> Self {
        Self {
            items: Arc::new(Vec::new()),
        }
    }
}

impl<T: PartialEq> PartialEq for Collection<T> {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other) || self.items == other.items
    }
}

impl<T> Collection<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether both collections are the same allocation (nothing changed).
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.items, &other.items)
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<T: Clone + Identified> Collection<T> {
    /// Build from a vector.
    pub fn from_vec(items: Vec<T>) -> Self {
        Self {
            items: Arc::new(items),
        }
    }

    fn replace(&mut self, items: Vec<T>) {
        self.items = Arc::new(items);
    }

    /// Append an element. Returns its id.
    pub fn add(&mut self, item: T) -> ElementId {
        let id = item.element_id();
        let mut items = Vec::with_capacity(self.items.len() + 1);
        items.extend(self.items.iter().cloned());
        items.push(item);
        self.replace(items);
        id
    }

    /// Get an element by id.
    pub fn get(&self, id: ElementId) -> Option<&T> {
        self.items.iter().find(|item| item.element_id() == id)
    }

    pub fn contains(&self, id: ElementId) -> bool {
        self.get(id).is_some()
    }

    /// Apply a partial update to one element. Returns false if `id` is unknown.
    pub fn update(&mut self, id: ElementId, patch: impl FnOnce(&mut T)) -> bool {
        let Some(index) = self.items.iter().position(|item| item.element_id() == id) else {
            return false;
        };
        let mut items = self.items.as_ref().clone();
        patch(&mut items[index]);
        self.replace(items);
        true
    }

    /// Apply the same patch to every element whose id is in `ids`.
    /// Returns how many elements were touched.
    pub fn update_many(&mut self, ids: &HashSet<ElementId>, mut patch: impl FnMut(&mut T)) -> usize {
        if !self.items.iter().any(|item| ids.contains(&item.element_id())) {
            return 0;
        }
        let mut items = self.items.as_ref().clone();
        let mut touched = 0;
        for item in items.iter_mut().filter(|item| ids.contains(&item.element_id())) {
            patch(item);
            touched += 1;
        }
        self.replace(items);
        touched
    }

    /// Remove an element by id.
    pub fn remove(&mut self, id: ElementId) -> Option<T> {
        let index = self.items.iter().position(|item| item.element_id() == id)?;
        let mut items = self.items.as_ref().clone();
        let removed = items.remove(index);
        self.replace(items);
        Some(removed)
    }

    /// Keep only elements matching `keep`. Returns the removed count.
    pub fn retain(&mut self, mut keep: impl FnMut(&T) -> bool) -> usize {
        let before = self.items.len();
        if self.items.iter().all(&mut keep) {
            return 0;
        }
        let items: Vec<T> = self.items.iter().filter(|item| keep(*item)).cloned().collect();
        let removed = before - items.len();
        self.replace(items);
        removed
    }
}

impl<'a, T> IntoIterator for &'a Collection<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// The five element collections, without viewport state.
///
/// This is the unit of undo/redo; cloning it only bumps reference counts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DocumentSnapshot {
    pub shapes: Collection<Shape>,
    pub strokes: Collection<Stroke>,
    pub lines: Collection<LineSegment>,
    pub nodes: Collection<Node>,
    pub connections: Collection<Connection>,
}

impl DocumentSnapshot {
    /// Whether every collection is pointer-identical to `other`'s.
    pub fn ptr_eq(&self, other: &Self) -> bool {
        self.shapes.ptr_eq(&other.shapes)
            && self.strokes.ptr_eq(&other.strokes)
            && self.lines.ptr_eq(&other.lines)
            && self.nodes.ptr_eq(&other.nodes)
            && self.connections.ptr_eq(&other.connections)
    }
}

/// A whiteboard document: the serialized aggregate root.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Document {
    pub shapes: Collection<Shape>,
    pub strokes: Collection<Stroke>,
    pub lines: Collection<LineSegment>,
    pub nodes: Collection<Node>,
    pub connections: Collection<Connection>,
    pub viewport: ViewportState,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self::default()
    }

    /// Capture the element collections.
    pub fn snapshot(&self) -> DocumentSnapshot {
        DocumentSnapshot {
            shapes: self.shapes.clone(),
            strokes: self.strokes.clone(),
            lines: self.lines.clone(),
            nodes: self.nodes.clone(),
            connections: self.connections.clone(),
        }
    }

    /// Replace the element collections, keeping the viewport.
    pub fn restore(&mut self, snapshot: &DocumentSnapshot) {
        self.shapes = snapshot.shapes.clone();
        self.strokes = snapshot.strokes.clone();
        self.lines = snapshot.lines.clone();
        self.nodes = snapshot.nodes.clone();
        self.connections = snapshot.connections.clone();
    }

    /// Check if the document has no elements.
    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty()
            && self.strokes.is_empty()
            && self.lines.is_empty()
            && self.nodes.is_empty()
            && self.connections.is_empty()
    }

    /// Total number of elements, connections included.
    pub fn len(&self) -> usize {
        self.shapes.len()
            + self.strokes.len()
            + self.lines.len()
            + self.nodes.len()
            + self.connections.len()
    }

    /// Whether an element of the given kind exists.
    pub fn contains(&self, kind: ElementKind, id: ElementId) -> bool {
        match kind {
            ElementKind::Shape => self.shapes.contains(id),
            ElementKind::Stroke => self.strokes.contains(id),
            ElementKind::Line => self.lines.contains(id),
            ElementKind::Node => self.nodes.contains(id),
        }
    }

    /// Bounding box of one element.
    pub fn element_bounds(&self, kind: ElementKind, id: ElementId) -> Option<Rect> {
        match kind {
            ElementKind::Shape => self.shapes.get(id).map(Element::bounds),
            ElementKind::Stroke => self.strokes.get(id).map(Element::bounds),
            ElementKind::Line => self.lines.get(id).map(Element::bounds),
            ElementKind::Node => self.nodes.get(id).map(Element::bounds),
        }
    }

    /// Get the bounding box of all elements.
    pub fn bounds(&self) -> Option<Rect> {
        let shapes = self.shapes.iter().map(Element::bounds);
        let strokes = self.strokes.iter().filter(|s| !s.is_empty()).map(Element::bounds);
        let lines = self.lines.iter().map(Element::bounds);
        let nodes = self.nodes.iter().map(Element::bounds);
        shapes
            .chain(strokes)
            .chain(lines)
            .chain(nodes)
            .reduce(|acc, r| acc.union(r))
    }

    /// Remove a node and every connection that references it.
    pub fn remove_node(&mut self, id: ElementId) -> Option<Node> {
        let node = self.nodes.remove(id)?;
        let dropped = self.connections.retain(|c| !c.references(id));
        if dropped > 0 {
            log::debug!("Removed {} connection(s) attached to node {}", dropped, id);
        }
        Some(node)
    }

    /// Connect two existing nodes.
    pub fn connect(
        &mut self,
        source: ElementId,
        target: ElementId,
        label: Option<String>,
    ) -> Result<ElementId, DocumentError> {
        for end in [source, target] {
            if !self.nodes.contains(end) {
                return Err(DocumentError::DanglingConnection(end));
            }
        }
        let mut connection = Connection::new(source, target);
        connection.label = label;
        Ok(self.connections.add(connection))
    }

    /// Connections whose endpoints both exist.
    pub fn valid_connections(&self) -> impl Iterator<Item = &Connection> {
        self.connections
            .iter()
            .filter(|c| self.nodes.contains(c.source) && self.nodes.contains(c.target))
    }

    /// Drop connections referencing missing nodes. Returns the removed count.
    pub fn prune_dangling_connections(&mut self) -> usize {
        let nodes: HashSet<ElementId> = self.nodes.iter().map(Element::id).collect();
        self.connections
            .retain(|c| nodes.contains(&c.source) && nodes.contains(&c.target))
    }

    /// Remove every selected element (and connections of removed nodes).
    /// Returns the number of elements removed, connections excluded.
    pub fn remove_elements(&mut self, selection: &Selection) -> usize {
        let shapes = selection.ids_of(ElementKind::Shape);
        let strokes = selection.ids_of(ElementKind::Stroke);
        let lines = selection.ids_of(ElementKind::Line);
        let nodes = selection.ids_of(ElementKind::Node);

        let mut removed = 0;
        removed += self.shapes.retain(|s| !shapes.contains(&s.id()));
        removed += self.strokes.retain(|s| !strokes.contains(&s.id()));
        removed += self.lines.retain(|l| !lines.contains(&l.id()));
        let removed_nodes = self.nodes.retain(|n| !nodes.contains(&n.id()));
        if removed_nodes > 0 {
            self.connections
                .retain(|c| !nodes.contains(&c.source) && !nodes.contains(&c.target));
        }
        removed + removed_nodes
    }

    /// Recolor every selected element: shape fills and stroke/line ink.
    /// Nodes carry no color and are skipped.
    pub fn set_color(&mut self, selection: &Selection, color: SerializableColor) -> usize {
        self.shapes
            .update_many(&selection.ids_of(ElementKind::Shape), |s| s.fill = color)
            + self
                .strokes
                .update_many(&selection.ids_of(ElementKind::Stroke), |s| s.color = color)
            + self
                .lines
                .update_many(&selection.ids_of(ElementKind::Line), |l| l.color = color)
    }

    /// Apply a transform to every selected element.
    pub fn transform_elements(&mut self, selection: &Selection, affine: Affine) -> usize {
        self.shapes
            .update_many(&selection.ids_of(ElementKind::Shape), |s| s.transform(affine))
            + self
                .strokes
                .update_many(&selection.ids_of(ElementKind::Stroke), |s| s.transform(affine))
            + self
                .lines
                .update_many(&selection.ids_of(ElementKind::Line), |l| l.transform(affine))
            + self
                .nodes
                .update_many(&selection.ids_of(ElementKind::Node), |n| n.transform(affine))
    }

    /// Move every selected element by `delta`.
    pub fn translate_elements(&mut self, selection: &Selection, delta: Vec2) -> usize {
        self.transform_elements(selection, Affine::translate(delta))
    }

    /// Scale every selected element about the top-left corner of its bounds
    /// (a line's start point for lines).
    pub fn resize_elements(&mut self, selection: &Selection, factor: f64) -> usize {
        if !(factor.is_finite() && factor > 0.0) {
            return 0;
        }
        let scale_about = |anchor: Point| {
            Affine::translate(anchor.to_vec2())
                * Affine::scale(factor)
                * Affine::translate(-anchor.to_vec2())
        };
        let scale_shape = |s: &mut Shape| {
            let anchor = s.bounds().origin();
            s.transform(scale_about(anchor));
        };
        let scale_stroke = |s: &mut Stroke| {
            let anchor = s.bounds().origin();
            s.transform(scale_about(anchor));
        };
        let scale_line = |l: &mut LineSegment| {
            let anchor = l.start;
            l.transform(scale_about(anchor));
        };
        let scale_node = |n: &mut Node| {
            let anchor = n.position;
            n.transform(scale_about(anchor));
        };
        self.shapes.update_many(&selection.ids_of(ElementKind::Shape), scale_shape)
            + self.strokes.update_many(&selection.ids_of(ElementKind::Stroke), scale_stroke)
            + self.lines.update_many(&selection.ids_of(ElementKind::Line), scale_line)
            + self.nodes.update_many(&selection.ids_of(ElementKind::Node), scale_node)
    }

    /// Fit a shape or node to `rect` (resize-handle drags).
    ///
    /// Circles keep their aspect and are centered in `rect`. Returns false for
    /// other kinds or unknown ids.
    pub fn set_element_bounds(&mut self, element: ElementRef, rect: Rect) -> bool {
        let rect = rect.abs();
        match element.kind {
            ElementKind::Shape => self.shapes.update(element.id, |s| {
                if s.kind == ShapeKind::Circle {
                    let d = rect.width().min(rect.height());
                    s.position = rect.center();
                    s.set_size(d, d);
                } else {
                    s.position = rect.origin();
                    s.set_size(rect.width(), rect.height());
                }
            }),
            ElementKind::Node => self.nodes.update(element.id, |n| {
                n.position = rect.origin();
                n.set_size(rect.size());
            }),
            ElementKind::Line | ElementKind::Stroke => false,
        }
    }

    /// Move one endpoint of a line (0 = start, anything else = end).
    pub fn set_line_endpoint(&mut self, id: ElementId, index: usize, point: Point) -> bool {
        self.lines.update(id, |l| {
            if index == 0 {
                l.start = point;
            } else {
                l.end = point;
            }
        })
    }

    /// Bring a node above every other node.
    pub fn bring_to_front(&mut self, id: ElementId) -> bool {
        let top = self.nodes.iter().map(|n| n.z_index).max().unwrap_or(0);
        self.nodes.update(id, |n| n.z_index = top + 1)
    }

    /// Send a node below every other node.
    pub fn send_to_back(&mut self, id: ElementId) -> bool {
        let bottom = self.nodes.iter().map(|n| n.z_index).min().unwrap_or(0);
        self.nodes.update(id, |n| n.z_index = bottom - 1)
    }

    /// Serialize the document to JSON.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Deserialize a document from JSON.
    ///
    /// Missing collections load empty; connections to missing nodes are dropped.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let mut document: Self = serde_json::from_str(json)?;
        let dropped = document.prune_dangling_connections();
        if dropped > 0 {
            log::warn!("Dropped {} dangling connection(s) while loading document", dropped);
        }
        document.ensure_unique_ids();
        Ok(document)
    }

    /// Re-key elements whose id collides with an earlier one.
    fn ensure_unique_ids(&mut self) {
        let mut seen = HashSet::new();
        let mut fix = |id: &mut ElementId| {
            if !seen.insert(*id) {
                let fresh = Uuid::new_v4();
                log::warn!("Duplicate element id {} re-keyed to {}", id, fresh);
                *id = fresh;
            }
        };

        fn rekey<T: Clone + Identified>(
            collection: &mut Collection<T>,
            fix: &mut impl FnMut(&mut ElementId),
            id_of: fn(&mut T) -> &mut ElementId,
        ) {
            let mut items = collection.as_slice().to_vec();
            let before: Vec<ElementId> = items.iter().map(Identified::element_id).collect();
            for item in items.iter_mut() {
                fix(id_of(item));
            }
            if items.iter().map(Identified::element_id).ne(before) {
                collection.replace(items);
            }
        }

        rekey(&mut self.shapes, &mut fix, |s| &mut s.id);
        rekey(&mut self.strokes, &mut fix, |s| &mut s.id);
        rekey(&mut self.lines, &mut fix, |l| &mut l.id);
        rekey(&mut self.nodes, &mut fix, |n| &mut n.id);
        rekey(&mut self.connections, &mut fix, |c| &mut c.id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shapes::{LineKind, NodeData};
    use kurbo::Size;

    fn rect_at(x: f64, y: f64) -> Shape {
        Shape::new(ShapeKind::Rectangle, Point::new(x, y), 100.0, 100.0)
    }

    fn node_at(x: f64, y: f64) -> Node {
        Node::new(Point::new(x, y), Size::new(50.0, 50.0), NodeData::default())
    }

    #[test]
    fn test_document_creation() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert!(doc.bounds().is_none());
    }

    #[test]
    fn test_add_shape() {
        let mut doc = Document::new();
        let rect = rect_at(0.0, 0.0);
        let id = doc.shapes.add(rect);

        assert_eq!(doc.len(), 1);
        assert!(doc.shapes.get(id).is_some());
    }

    #[test]
    fn test_mutations_replace_collection() {
        let mut doc = Document::new();
        let id = doc.shapes.add(rect_at(0.0, 0.0));
        let before = doc.snapshot();

        assert!(doc.shapes.update(id, |s| s.label = Some("hi".into())));
        assert!(!doc.shapes.ptr_eq(&before.shapes));
        assert!(doc.strokes.ptr_eq(&before.strokes));
        // The snapshot still sees the old value.
        assert_eq!(before.shapes.get(id).and_then(|s| s.label.clone()), None);
    }

    #[test]
    fn test_noop_mutations_keep_pointer() {
        let mut doc = Document::new();
        doc.shapes.add(rect_at(0.0, 0.0));
        let before = doc.snapshot();

        assert!(!doc.shapes.update(Uuid::new_v4(), |s| s.width = 1.0));
        assert!(doc.shapes.remove(Uuid::new_v4()).is_none());
        assert_eq!(doc.shapes.retain(|_| true), 0);
        assert!(doc.snapshot().ptr_eq(&before));
    }

    #[test]
    fn test_remove_shape() {
        let mut doc = Document::new();
        let id = doc.shapes.add(rect_at(0.0, 0.0));

        let removed = doc.shapes.remove(id);
        assert!(removed.is_some());
        assert!(doc.is_empty());
    }

    #[test]
    fn test_remove_node_cascades() {
        let mut doc = Document::new();
        let a = doc.nodes.add(node_at(0.0, 0.0));
        let b = doc.nodes.add(node_at(100.0, 0.0));
        let c = doc.nodes.add(node_at(200.0, 0.0));
        doc.connect(a, b, None).unwrap();
        let bc = doc.connect(b, c, Some("next".into())).unwrap();

        doc.remove_node(a);
        assert!(doc.nodes.contains(b));
        assert_eq!(doc.connections.len(), 1);
        assert_eq!(doc.connections.as_slice()[0].id(), bc);
    }

    #[test]
    fn test_connect_rejects_missing_nodes() {
        let mut doc = Document::new();
        let a = doc.nodes.add(node_at(0.0, 0.0));
        let ghost = Uuid::new_v4();
        assert_eq!(doc.connect(a, ghost, None), Err(DocumentError::DanglingConnection(ghost)));
        assert!(doc.connections.is_empty());
    }

    #[test]
    fn test_valid_connections_filters_dangling() {
        let mut doc = Document::new();
        let a = doc.nodes.add(node_at(0.0, 0.0));
        let b = doc.nodes.add(node_at(100.0, 0.0));
        doc.connect(a, b, None).unwrap();
        // Bypass the cascade to simulate a stale edge.
        doc.nodes.remove(b);

        assert_eq!(doc.connections.len(), 1);
        assert_eq!(doc.valid_connections().count(), 0);
        assert_eq!(doc.prune_dangling_connections(), 1);
        assert!(doc.connections.is_empty());
    }

    #[test]
    fn test_remove_elements_batch() {
        let mut doc = Document::new();
        let shape = doc.shapes.add(rect_at(0.0, 0.0));
        let keep = doc.shapes.add(rect_at(200.0, 0.0));
        let line = doc.lines.add(LineSegment::new(
            Point::ZERO,
            Point::new(1.0, 1.0),
            LineKind::Arrow,
            SerializableColor::black(),
            2.0,
        ));
        let a = doc.nodes.add(node_at(0.0, 0.0));
        let b = doc.nodes.add(node_at(100.0, 0.0));
        doc.connect(a, b, None).unwrap();

        let mut selection = Selection::new();
        selection.add(ElementRef::shape(shape));
        selection.add(ElementRef::line(line));
        selection.add(ElementRef::node(a));

        assert_eq!(doc.remove_elements(&selection), 3);
        assert!(doc.shapes.contains(keep));
        assert!(doc.lines.is_empty());
        assert!(doc.nodes.contains(b));
        assert!(doc.connections.is_empty());
    }

    #[test]
    fn test_set_color_on_selection() {
        let mut doc = Document::new();
        let a = doc.shapes.add(rect_at(0.0, 0.0));
        let b = doc.shapes.add(rect_at(200.0, 0.0));
        let red = SerializableColor::new(255, 0, 0, 255);

        let mut selection = Selection::new();
        selection.add(ElementRef::shape(a));
        assert_eq!(doc.set_color(&selection, red), 1);
        assert_eq!(doc.shapes.get(a).map(|s| s.fill), Some(red));
        assert_ne!(doc.shapes.get(b).map(|s| s.fill), Some(red));
    }

    #[test]
    fn test_resize_elements_keeps_origin() {
        let mut doc = Document::new();
        let a = doc.shapes.add(rect_at(10.0, 20.0));
        let n = doc.nodes.add(node_at(5.0, 5.0));
        let mut selection = Selection::new();
        selection.add(ElementRef::shape(a));
        selection.add(ElementRef::node(n));

        assert_eq!(doc.resize_elements(&selection, 0.5), 2);
        let shape = doc.shapes.get(a).unwrap();
        assert_eq!(shape.position, Point::new(10.0, 20.0));
        assert!((shape.width - 50.0).abs() < 1e-9);
        let node = doc.nodes.get(n).unwrap();
        assert!((node.size.width - 25.0).abs() < 1e-9);

        assert_eq!(doc.resize_elements(&selection, -1.0), 0);
    }

    #[test]
    fn test_resize_circle_keeps_bounds_origin() {
        let mut doc = Document::new();
        let c = doc.shapes.add(Shape::circle(Point::new(50.0, 50.0), 10.0));
        let mut selection = Selection::new();
        selection.add(ElementRef::shape(c));

        assert_eq!(doc.resize_elements(&selection, 2.0), 1);
        let circle = doc.shapes.get(c).unwrap();
        let bounds = circle.bounds();
        assert!((bounds.x0 - 40.0).abs() < 1e-9);
        assert!((bounds.y0 - 40.0).abs() < 1e-9);
        assert!((circle.width - 40.0).abs() < 1e-9);
        assert_eq!(circle.position, Point::new(60.0, 60.0));
    }

    #[test]
    fn test_set_element_bounds() {
        let mut doc = Document::new();
        let rect = doc.shapes.add(rect_at(0.0, 0.0));
        let circle = doc.shapes.add(Shape::circle(Point::new(50.0, 50.0), 50.0));

        assert!(doc.set_element_bounds(ElementRef::shape(rect), Rect::new(30.0, 40.0, 10.0, 20.0)));
        let shape = doc.shapes.get(rect).unwrap();
        assert_eq!(shape.position, Point::new(10.0, 20.0));
        assert!((shape.width - 20.0).abs() < 1e-9);

        assert!(doc.set_element_bounds(ElementRef::shape(circle), Rect::new(0.0, 0.0, 40.0, 20.0)));
        let shape = doc.shapes.get(circle).unwrap();
        assert_eq!(shape.position, Point::new(20.0, 10.0));
        assert!((shape.radius() - 10.0).abs() < 1e-9);

        assert!(!doc.set_element_bounds(ElementRef::stroke(rect), Rect::ZERO));
    }

    #[test]
    fn test_z_order() {
        let mut doc = Document::new();
        let a = doc.nodes.add(node_at(0.0, 0.0));
        let b = doc.nodes.add(node_at(0.0, 0.0));

        assert!(doc.bring_to_front(a));
        assert!(doc.nodes.get(a).unwrap().z_index > doc.nodes.get(b).unwrap().z_index);
        assert!(doc.send_to_back(a));
        assert!(doc.nodes.get(a).unwrap().z_index < doc.nodes.get(b).unwrap().z_index);
    }

    #[test]
    fn test_json_roundtrip_preserves_order() {
        let mut doc = Document::new();
        doc.shapes.add(rect_at(0.0, 0.0));
        doc.shapes.add(rect_at(50.0, 0.0).with_label("second"));
        doc.strokes.add(Stroke::from_points(
            vec![Point::new(0.0, 0.0), Point::new(5.0, 5.0), Point::new(10.0, 0.0)],
            SerializableColor::black(),
            3.0,
        ));
        let a = doc.nodes.add(node_at(0.0, 0.0));
        let b = doc.nodes.add(node_at(100.0, 0.0));
        doc.connect(a, b, Some("edge".into())).unwrap();
        doc.viewport = ViewportState {
            offset_x: 12.0,
            offset_y: -3.0,
            zoom: 1.5,
        };

        let json = doc.to_json().unwrap();
        let loaded = Document::from_json(&json).unwrap();
        assert_eq!(loaded, doc);
    }

    #[test]
    fn test_missing_collections_load_empty() {
        let doc = Document::from_json(r#"{ "shapes": [], "somethingElse": 4 }"#).unwrap();
        assert!(doc.is_empty());
        assert_eq!(doc.viewport, ViewportState::default());
    }

    #[test]
    fn test_dangling_connections_dropped_on_load() {
        let mut doc = Document::new();
        let a = doc.nodes.add(node_at(0.0, 0.0));
        let b = doc.nodes.add(node_at(100.0, 0.0));
        doc.connect(a, b, None).unwrap();
        doc.nodes.remove(b);

        let loaded = Document::from_json(&doc.to_json().unwrap()).unwrap();
        assert!(loaded.connections.is_empty());
        assert_eq!(loaded.nodes.len(), 1);
    }

    #[test]
    fn test_duplicate_ids_rekeyed_on_load() {
        let mut doc = Document::new();
        let shape = rect_at(0.0, 0.0);
        doc.shapes.add(shape.clone());
        doc.shapes.add(shape);

        let loaded = Document::from_json(&doc.to_json().unwrap()).unwrap();
        let ids: HashSet<ElementId> = loaded.shapes.iter().map(Element::id).collect();
        assert_eq!(ids.len(), 2);
    }
}
