//! Tool system for the whiteboard.
//!
//! [`ToolManager`] holds the active tool and the gesture in progress. The
//! editor drives transitions; this module only stores gesture data and
//! derives render-only drafts from it.

use crate::input::MouseButton;
use crate::selection::HandleKind;
use crate::shapes::{ElementRef, LineKind, LineSegment, SerializableColor, Shape, ShapeKind, Stroke};
use kurbo::{Point, Rect};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Select,
    Pan,
    Rectangle,
    Circle,
    Diamond,
    Sticky,
    Text,
    Line,
    Arrow,
    Pencil,
    Eraser,
    /// Stamps a diagram node.
    Node,
}

impl ToolKind {
    pub const ALL: [ToolKind; 12] = [
        ToolKind::Select,
        ToolKind::Pan,
        ToolKind::Rectangle,
        ToolKind::Circle,
        ToolKind::Diamond,
        ToolKind::Sticky,
        ToolKind::Text,
        ToolKind::Line,
        ToolKind::Arrow,
        ToolKind::Pencil,
        ToolKind::Eraser,
        ToolKind::Node,
    ];

    /// Host-facing identifier.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Select => "select",
            ToolKind::Pan => "pan",
            ToolKind::Rectangle => "rectangle",
            ToolKind::Circle => "circle",
            ToolKind::Diamond => "diamond",
            ToolKind::Sticky => "sticky",
            ToolKind::Text => "text",
            ToolKind::Line => "line",
            ToolKind::Arrow => "arrow",
            ToolKind::Pencil => "pencil",
            ToolKind::Eraser => "eraser",
            ToolKind::Node => "node",
        }
    }

    /// The shape kind a shape tool creates.
    pub fn shape_kind(self) -> Option<ShapeKind> {
        match self {
            ToolKind::Rectangle => Some(ShapeKind::Rectangle),
            ToolKind::Circle => Some(ShapeKind::Circle),
            ToolKind::Diamond => Some(ShapeKind::Diamond),
            ToolKind::Sticky => Some(ShapeKind::StickyNote),
            ToolKind::Text => Some(ShapeKind::Text),
            _ => None,
        }
    }

    /// The line kind a line tool creates.
    pub fn line_kind(self) -> Option<LineKind> {
        match self {
            ToolKind::Line => Some(LineKind::Line),
            ToolKind::Arrow => Some(LineKind::Arrow),
            _ => None,
        }
    }

    /// Whether the tool only supports stamping (no drag-to-size).
    pub fn stamp_only(self) -> bool {
        matches!(self, ToolKind::Sticky | ToolKind::Text | ToolKind::Node)
    }
}

impl fmt::Display for ToolKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("Unknown tool: {0}")]
pub struct UnknownTool(pub String);

impl FromStr for ToolKind {
    type Err = UnknownTool;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_ascii_lowercase();
        ToolKind::ALL
            .into_iter()
            .find(|tool| tool.name() == name)
            .ok_or_else(|| UnknownTool(s.to_string()))
    }
}

/// Marquee selection in logical coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionBox {
    pub start: Point,
    pub current: Point,
    /// Shift held at pointer-down: union with the existing selection.
    pub additive: bool,
}

impl SelectionBox {
    /// Get the selection rectangle as a normalized Rect.
    pub fn to_rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }

    /// Drag length in screen pixels at `zoom`.
    pub fn screen_distance(&self, zoom: f64) -> f64 {
        self.start.distance(self.current) * zoom
    }
}

/// State of a pointer gesture.
#[derive(Debug, Clone, Default)]
pub enum GestureState {
    #[default]
    Idle,
    /// Pencil: points accumulate into the draft stroke.
    DrawingStroke { stroke: Stroke },
    /// Drag-to-size shape placement.
    DrawingShape {
        kind: ShapeKind,
        start: Point,
        current: Point,
    },
    /// Line/arrow with a render-only end point.
    DrawingLine {
        kind: LineKind,
        start: Point,
        current: Point,
    },
    DraggingSelectionBox(SelectionBox),
    /// Moving the selection; the document is updated live.
    DraggingElement { start: Point, current: Point },
    /// Dragging a resize handle of one element.
    ResizingElement {
        target: ElementRef,
        handle: HandleKind,
        /// Element bounds at pointer-down.
        original: Rect,
        start: Point,
    },
    /// Camera pan, tracked in screen coordinates.
    Panning { last: Point, button: MouseButton },
    /// Eraser held down.
    Erasing { erased: usize },
}

impl GestureState {
    pub fn name(&self) -> &'static str {
        match self {
            GestureState::Idle => "idle",
            GestureState::DrawingStroke { .. } => "drawing-stroke",
            GestureState::DrawingShape { .. } => "drawing-shape",
            GestureState::DrawingLine { .. } => "drawing-line",
            GestureState::DraggingSelectionBox(_) => "dragging-selection-box",
            GestureState::DraggingElement { .. } => "dragging-element",
            GestureState::ResizingElement { .. } => "resizing-element",
            GestureState::Panning { .. } => "panning",
            GestureState::Erasing { .. } => "erasing",
        }
    }
}

/// Render-only draft of the gesture in progress.
#[derive(Debug, Clone, PartialEq)]
pub enum DraftPreview {
    Stroke(Stroke),
    Shape(Shape),
    Line(LineSegment),
    SelectionRect(Rect),
}

/// Manages the current tool and its gesture state.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Current gesture.
    pub state: GestureState,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the current tool. Any gesture in progress is dropped.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.current_tool = tool;
        self.state = GestureState::Idle;
    }

    pub fn begin(&mut self, state: GestureState) {
        log::trace!("Gesture {} -> {}", self.state.name(), state.name());
        self.state = state;
    }

    /// End the gesture and hand back its final state.
    pub fn finish(&mut self) -> GestureState {
        std::mem::take(&mut self.state)
    }

    /// Cancel the current interaction.
    pub fn cancel(&mut self) {
        self.state = GestureState::Idle;
    }

    /// Check if a gesture is in progress.
    pub fn is_active(&self) -> bool {
        !matches!(self.state, GestureState::Idle)
    }

    /// Draft geometry for the renderer. Nothing here is part of the document.
    pub fn preview(&self, ink: SerializableColor, width: f64) -> Option<DraftPreview> {
        match &self.state {
            GestureState::DrawingStroke { stroke } => Some(DraftPreview::Stroke(stroke.clone())),
            GestureState::DrawingShape { kind, start, current } => {
                Some(DraftPreview::Shape(Shape::from_drag(*kind, *start, *current)))
            }
            GestureState::DrawingLine { kind, start, current } => Some(DraftPreview::Line(
                LineSegment::new(*start, *current, *kind, ink, width),
            )),
            GestureState::DraggingSelectionBox(rect) => {
                Some(DraftPreview::SelectionRect(rect.to_rect()))
            }
            _ => None,
        }
    }
}
