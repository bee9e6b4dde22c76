//! Reflectly Whiteboard Core
//!
//! Platform-agnostic document model, gesture handling, history and
//! persistence for the Reflectly whiteboard. Rendering is left to the host:
//! it feeds input events to an [`Editor`] and draws the [`Document`] and
//! [`DraftPreview`] it exposes.

pub mod camera;
pub mod commands;
pub mod config;
pub mod document;
pub mod editor;
pub mod history;
pub mod input;
pub mod selection;
pub mod shapes;
pub mod storage;
pub mod theme;
pub mod tools;

pub use camera::{Camera, ViewportState};
pub use commands::{NodeCommand, NodeEvent, ShapeCommand};
pub use config::{ConfigError, EditorConfig, ShapePlacement, SizePreset};
pub use document::{Collection, Document, DocumentError, DocumentSnapshot};
pub use editor::Editor;
pub use history::History;
pub use input::{InputState, Key, KeyEvent, Modifiers, MouseButton, PointerEvent, WheelEvent};
pub use selection::{Corner, Handle, HandleKind, Selection};
pub use shapes::{
    Connection, Element, ElementId, ElementKind, ElementRef, LineKind, LineSegment, Node, NodeData,
    SerializableColor, Shape, ShapeKind, Stroke,
};
pub use storage::{MemoryStorage, PersistenceAdapter, Storage, StorageError, StorageResult};
pub use theme::{Theme, ThemeProvider};
pub use tools::{DraftPreview, GestureState, ToolKind, ToolManager};
