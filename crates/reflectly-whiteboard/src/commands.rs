//! Node and shape mutation commands.
//!
//! Node views never mutate the document themselves. They emit a
//! [`NodeEvent`] naming the node and a [`NodeCommand`]; the editor applies it
//! as one undoable change. In-place shape edits (label text, fill) go through
//! [`ShapeCommand`] the same way.

use crate::document::{Document, DocumentError};
use crate::shapes::{ElementId, Node, SerializableColor, Shape};
use kurbo::{Point, Size};
use serde::{Deserialize, Serialize};

/// A single edit to one node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NodeCommand {
    Rename { title: String },
    SetIcon { icon: Option<String> },
    SetProperty { key: String, value: String },
    RemoveProperty { key: String },
    Resize { size: Size },
    Move { position: Point },
}

impl NodeCommand {
    /// Apply to a node. Returns whether anything changed.
    pub fn apply(&self, node: &mut Node) -> bool {
        match self {
            NodeCommand::Rename { title } => replace(&mut node.data.title, title.clone()),
            NodeCommand::SetIcon { icon } => replace(&mut node.data.icon, icon.clone()),
            NodeCommand::SetProperty { key, value } => {
                node.data.properties.insert(key.clone(), value.clone()).as_ref() != Some(value)
            }
            NodeCommand::RemoveProperty { key } => node.data.properties.remove(key).is_some(),
            NodeCommand::Resize { size } => {
                let before = node.size;
                node.set_size(*size);
                node.size != before
            }
            NodeCommand::Move { position } => replace(&mut node.position, *position),
        }
    }
}

/// A single in-place edit to one shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeCommand {
    /// Set the label text. An empty label clears it.
    SetLabel { label: Option<String> },
    SetFill { fill: SerializableColor },
}

impl ShapeCommand {
    /// Apply to a shape. Returns whether anything changed.
    pub fn apply(&self, shape: &mut Shape) -> bool {
        match self {
            ShapeCommand::SetLabel { label } => {
                let label = label.clone().filter(|text| !text.is_empty());
                replace(&mut shape.label, label)
            }
            ShapeCommand::SetFill { fill } => replace(&mut shape.fill, *fill),
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// "Node mutated" event emitted by a node view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeEvent {
    pub node: ElementId,
    pub command: NodeCommand,
}

impl NodeEvent {
    pub fn new(node: ElementId, command: NodeCommand) -> Self {
        Self { node, command }
    }
}

/// Apply a command to a node in `document`.
///
/// Returns `Ok(false)` when the command is a no-op; the collection is left
/// untouched in that case, so no history entry is produced.
pub fn apply_node_command(
    document: &mut Document,
    node: ElementId,
    command: &NodeCommand,
) -> Result<bool, DocumentError> {
    let mut updated = document
        .nodes
        .get(node)
        .cloned()
        .ok_or(DocumentError::UnknownElement(node))?;
    if !command.apply(&mut updated) {
        return Ok(false);
    }
    document.nodes.update(node, |n| *n = updated);
    Ok(true)
}

/// Apply a command to a shape in `document`. Same no-op contract as
/// [`apply_node_command`].
pub fn apply_shape_command(
    document: &mut Document,
    shape: ElementId,
    command: &ShapeCommand,
) -> Result<bool, DocumentError> {
    let mut updated = document
        .shapes
        .get(shape)
        .cloned()
        .ok_or(DocumentError::UnknownElement(shape))?;
    if !command.apply(&mut updated) {
        return Ok(false);
    }
    document.shapes.update(shape, |s| *s = updated);
    Ok(true)
}
