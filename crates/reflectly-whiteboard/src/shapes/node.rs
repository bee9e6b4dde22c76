//! Diagram nodes and the connections between them.

use super::{Element, ElementId, ElementKind};
use crate::config::SizePreset;
use crate::hit_test;
use kurbo::{Affine, Point, Rect, Size};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use uuid::Uuid;

/// Free-form payload of a node. Pure data: no callbacks.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeData {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    pub properties: BTreeMap<String, String>,
}

impl NodeData {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// A diagram node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Node {
    pub(crate) id: ElementId,
    /// Top-left corner.
    pub position: Point,
    pub size: Size,
    #[serde(default)]
    pub data: NodeData,
    /// Stacking order; higher is drawn on top.
    #[serde(default)]
    pub z_index: i64,
}

impl Node {
    /// Default node size.
    pub const DEFAULT_SIZE: Size = Size::new(180.0, 80.0);

    /// Default size scaled by a preset.
    pub fn preset_size(preset: SizePreset) -> Size {
        Self::DEFAULT_SIZE * preset.scale()
    }

    /// Create a new node.
    pub fn new(position: Point, size: Size, data: NodeData) -> Self {
        Self {
            id: Uuid::new_v4(),
            position,
            size: Size::new(size.width.max(0.0), size.height.max(0.0)),
            data,
            z_index: 0,
        }
    }

    /// Resize, keeping sizes non-negative.
    pub fn set_size(&mut self, size: Size) {
        self.size = Size::new(size.width.max(0.0), size.height.max(0.0));
    }

    /// Center of the node, where connections attach.
    pub fn center(&self) -> Point {
        self.bounds().center()
    }
}

impl Element for Node {
    fn id(&self) -> ElementId {
        self.id
    }

    fn kind(&self) -> ElementKind {
        ElementKind::Node
    }

    fn bounds(&self) -> Rect {
        Rect::from_origin_size(self.position, self.size)
    }

    fn hit_test(&self, point: Point, tolerance: f64) -> bool {
        hit_test::point_in_rect(point, self.bounds(), tolerance)
    }

    fn transform(&mut self, affine: Affine) {
        let rect = self.bounds();
        let p0 = affine * Point::new(rect.x0, rect.y0);
        let p1 = affine * Point::new(rect.x1, rect.y1);
        let rect = Rect::from_points(p0, p1);
        self.position = rect.origin();
        self.set_size(rect.size());
    }
}

/// Visual style of a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStyle {
    #[default]
    Straight,
    Step,
    Dashed,
}

/// An edge from one node to another.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Connection {
    pub(crate) id: ElementId,
    pub source: ElementId,
    pub target: ElementId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub style: ConnectionStyle,
}

impl Connection {
    pub fn new(source: ElementId, target: ElementId) -> Self {
        Self {
            id: Uuid::new_v4(),
            source,
            target,
            label: None,
            style: ConnectionStyle::default(),
        }
    }

    pub fn id(&self) -> ElementId {
        self.id
    }

    /// Whether this connection touches the given node.
    pub fn references(&self, node: ElementId) -> bool {
        self.source == node || self.target == node
    }
}
