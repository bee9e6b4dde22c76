//! Editor session.
//!
//! [`Editor`] owns the document, camera, selection and history for one
//! mounted whiteboard and turns host input into committed mutations. Every
//! commit bumps a revision counter; the host polls [`Editor::take_changes`]
//! to drive debounced persistence.

use crate::camera::Camera;
use crate::commands::{self, NodeCommand, NodeEvent, ShapeCommand};
use crate::config::{EditorConfig, ShapePlacement, SizePreset};
use crate::document::{Document, DocumentError, DocumentSnapshot};
use crate::hit_test::{self, scaled_tolerance};
use crate::history::History;
use crate::input::{InputState, Key, KeyEvent, MouseButton, Modifiers, PointerEvent, WheelEvent};
use crate::selection::{self, HANDLE_HIT_TOLERANCE, HandleKind, Selection};
use crate::shapes::{
    Element, ElementId, ElementRef, LineSegment, Node, NodeData, SerializableColor, Shape,
    ShapeKind, Stroke,
};
use crate::theme::{Theme, ThemeProvider};
use crate::tools::{DraftPreview, GestureState, SelectionBox, ToolKind, ToolManager};
use kurbo::{Point, Rect, Vec2};

/// Zoom factor per ctrl/cmd + wheel notch.
pub const WHEEL_ZOOM_FACTOR: f64 = 1.1;

/// Padding around content for [`Editor::fit_to_content`], in screen pixels.
pub const FIT_PADDING: f64 = 40.0;

/// One mounted whiteboard.
pub struct Editor {
    document: Document,
    camera: Camera,
    tools: ToolManager,
    selection: Selection,
    history: History,
    input: InputState,
    config: EditorConfig,
    theme: Box<dyn ThemeProvider>,
    /// Ink picked by the user; `None` follows the theme.
    color: Option<SerializableColor>,
    revision: u64,
    reported_revision: u64,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default())
    }
}

impl Editor {
    /// Create an editor with an empty document.
    ///
    /// An invalid config is replaced by the defaults.
    pub fn new(config: EditorConfig) -> Self {
        let config = match config.validate() {
            Ok(()) => config,
            Err(e) => {
                log::warn!("Invalid editor config ({}), using defaults", e);
                EditorConfig::default()
            }
        };
        Self {
            document: Document::new(),
            camera: Camera::with_zoom_range(config.min_zoom, config.max_zoom),
            tools: ToolManager::new(),
            selection: Selection::new(),
            history: History::new(DocumentSnapshot::default(), config.max_history),
            input: InputState::new(),
            theme: Box::new(Theme::default()),
            color: None,
            revision: 0,
            reported_revision: 0,
            config,
        }
    }

    /// Use a host theme provider (builder style).
    pub fn with_theme(mut self, theme: impl ThemeProvider + 'static) -> Self {
        self.theme = Box::new(theme);
        self
    }

    pub fn set_theme_provider(&mut self, theme: impl ThemeProvider + 'static) {
        self.theme = Box::new(theme);
    }

    // --- state access -----------------------------------------------------

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tool(&self) -> ToolKind {
        self.tools.current_tool
    }

    pub fn gesture(&self) -> &GestureState {
        &self.tools.state
    }

    pub fn theme(&self) -> Theme {
        self.theme.theme()
    }

    /// Canvas background for the current theme.
    pub fn background(&self) -> SerializableColor {
        self.theme().background()
    }

    /// Color for new strokes and lines.
    pub fn ink(&self) -> SerializableColor {
        self.color.unwrap_or_else(|| self.theme().foreground())
    }

    /// Number of committed changes (plus viewport moves) since creation.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether anything persistable changed since the last call.
    pub fn take_changes(&mut self) -> bool {
        let changed = self.revision != self.reported_revision;
        self.reported_revision = self.revision;
        changed
    }

    /// Render-only draft of the gesture in progress.
    pub fn draft_preview(&self) -> Option<DraftPreview> {
        self.tools.preview(self.ink(), self.config.stroke_width)
    }

    /// The document with the current viewport, ready to persist.
    pub fn snapshot_for_save(&self) -> Document {
        let mut document = self.document.clone();
        document.viewport = self.camera.state();
        document
    }

    /// Replace the document (initial load). History restarts from it.
    pub fn hydrate(&mut self, document: Document) {
        self.tools.cancel();
        self.input.reset_buttons();
        self.selection.clear();
        self.camera.restore(document.viewport);
        self.history.reset(document.snapshot());
        self.document = document;
        self.reported_revision = self.revision;
        log::info!("Hydrated whiteboard with {} element(s)", self.document.len());
    }

    // --- history ----------------------------------------------------------

    /// Record the current document as a history entry.
    fn commit(&mut self, action: &str) -> bool {
        let snapshot = self.document.snapshot();
        if snapshot == *self.history.current() {
            // Equal content in fresh allocations: realign with the entry.
            let current = self.history.current().clone();
            self.document.restore(&current);
            return false;
        }
        self.history.commit(snapshot);
        self.revision += 1;
        log::debug!("Committed {} (revision {})", action, self.revision);
        true
    }

    fn touch_viewport(&mut self) {
        self.revision += 1;
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    pub fn undo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(snapshot) = self.history.undo().cloned() else {
            return false;
        };
        self.document.restore(&snapshot);
        self.selection.retain_existing(&self.document);
        self.revision += 1;
        true
    }

    pub fn redo(&mut self) -> bool {
        self.cancel_gesture();
        let Some(snapshot) = self.history.redo().cloned() else {
            return false;
        };
        self.document.restore(&snapshot);
        self.selection.retain_existing(&self.document);
        self.revision += 1;
        true
    }

    // --- tools and styling ------------------------------------------------

    /// Switch tools. A gesture in progress is cancelled.
    pub fn set_tool(&mut self, tool: ToolKind) {
        self.cancel_gesture();
        self.tools.set_tool(tool);
    }

    /// Pick the ink color and recolor the current selection.
    pub fn set_color(&mut self, color: SerializableColor) -> usize {
        self.color = Some(color);
        self.apply_color_to_selection(color)
    }

    /// Go back to the theme's ink color.
    pub fn reset_color(&mut self) {
        self.color = None;
    }

    pub fn set_size_preset(&mut self, preset: SizePreset) {
        self.config.size_preset = preset;
    }

    pub fn set_shape_placement(&mut self, placement: ShapePlacement) {
        self.config.shape_placement = placement;
    }

    /// Recolor every selected element as one history entry.
    pub fn apply_color_to_selection(&mut self, color: SerializableColor) -> usize {
        let changed = self.document.set_color(&self.selection, color);
        if changed > 0 {
            self.commit("recolor");
        }
        changed
    }

    /// Scale every selected element by `factor` as one history entry.
    pub fn resize_selection(&mut self, factor: f64) -> usize {
        let changed = self.document.resize_elements(&self.selection, factor);
        if changed > 0 {
            self.commit("resize");
        }
        changed
    }

    // --- selection --------------------------------------------------------

    pub fn select(&mut self, element: ElementRef) -> bool {
        if !self.document.contains(element.kind, element.id) {
            return false;
        }
        self.selection.select(element);
        true
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    pub fn select_all(&mut self) {
        let doc = &self.document;
        let all = doc
            .shapes
            .iter()
            .map(Element::element_ref)
            .chain(doc.strokes.iter().map(Element::element_ref))
            .chain(doc.lines.iter().map(Element::element_ref))
            .chain(doc.nodes.iter().map(Element::element_ref));
        self.selection.extend(all);
    }

    /// Delete the selection (and connections of deleted nodes).
    pub fn delete_selection(&mut self) -> usize {
        if self.tools.is_active() {
            return 0;
        }
        let removed = self.document.remove_elements(&self.selection);
        self.selection.clear();
        if removed > 0 {
            self.commit("delete");
        }
        removed
    }

    /// Remove one stroke. Erasing a stroke that is already gone is a no-op.
    pub fn erase_stroke(&mut self, id: ElementId) -> bool {
        if self.document.strokes.remove(id).is_none() {
            return false;
        }
        self.selection.remove(ElementRef::stroke(id));
        self.commit("erase")
    }

    // --- nodes ------------------------------------------------------------

    /// Add a node sized by the configured preset.
    pub fn add_node(&mut self, position: Point, data: NodeData) -> ElementId {
        let size = Node::preset_size(self.config.size_preset);
        let id = self.document.nodes.add(Node::new(position, size, data));
        self.commit("add node");
        id
    }

    /// Remove a node and its connections.
    pub fn remove_node(&mut self, id: ElementId) -> bool {
        if self.document.remove_node(id).is_none() {
            return false;
        }
        self.selection.remove(ElementRef::node(id));
        self.commit("remove node")
    }

    pub fn connect_nodes(
        &mut self,
        source: ElementId,
        target: ElementId,
        label: Option<String>,
    ) -> Result<ElementId, DocumentError> {
        let id = self.document.connect(source, target, label)?;
        self.commit("connect");
        Ok(id)
    }

    pub fn bring_to_front(&mut self, node: ElementId) -> bool {
        self.document.bring_to_front(node) && self.commit("bring to front")
    }

    pub fn send_to_back(&mut self, node: ElementId) -> bool {
        self.document.send_to_back(node) && self.commit("send to back")
    }

    /// Apply one node command as one history entry.
    pub fn apply_node_command(
        &mut self,
        node: ElementId,
        command: &NodeCommand,
    ) -> Result<bool, DocumentError> {
        let changed = commands::apply_node_command(&mut self.document, node, command)?;
        if changed {
            self.commit("node command");
        }
        Ok(changed)
    }

    // --- shape edits -----------------------------------------------------

    /// Apply an in-place edit to one shape as a single history entry.
    /// Returns `Ok(false)` without recording history when nothing changed.
    pub fn apply_shape_command(
        &mut self,
        shape: ElementId,
        command: &ShapeCommand,
    ) -> Result<bool, DocumentError> {
        let changed = commands::apply_shape_command(&mut self.document, shape, command)?;
        if changed {
            self.commit("shape command");
        }
        Ok(changed)
    }

    /// Set or clear the label of a shape (text, sticky note and friends).
    pub fn set_shape_label(
        &mut self,
        shape: ElementId,
        label: Option<String>,
    ) -> Result<bool, DocumentError> {
        self.apply_shape_command(shape, &ShapeCommand::SetLabel { label })
    }

    /// Apply queued node events in order. Events for missing nodes are
    /// logged and skipped. Returns how many changed the document.
    pub fn dispatch_node_events(&mut self, events: impl IntoIterator<Item = NodeEvent>) -> usize {
        let mut applied = 0;
        for event in events {
            match self.apply_node_command(event.node, &event.command) {
                Ok(true) => applied += 1,
                Ok(false) => {}
                Err(e) => log::warn!("Dropping node event: {}", e),
            }
        }
        applied
    }

    // --- viewport ---------------------------------------------------------

    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.camera.set_viewport_size(width, height);
    }

    pub fn pan(&mut self, delta: Vec2) {
        self.camera.pan(delta);
        self.touch_viewport();
    }

    /// Zoom by `factor` keeping `anchor` (screen) fixed. Out-of-range zooms
    /// are rejected.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> bool {
        let changed = self.camera.zoom_at(anchor, factor);
        if changed {
            self.touch_viewport();
        }
        changed
    }

    pub fn set_zoom(&mut self, zoom: f64, anchor: Point) -> bool {
        let changed = self.camera.set_zoom(zoom, anchor);
        if changed {
            self.touch_viewport();
        }
        changed
    }

    pub fn zoom_in(&mut self) -> bool {
        let changed = self.camera.zoom_in();
        if changed {
            self.touch_viewport();
        }
        changed
    }

    pub fn zoom_out(&mut self) -> bool {
        let changed = self.camera.zoom_out();
        if changed {
            self.touch_viewport();
        }
        changed
    }

    pub fn reset_view(&mut self) {
        self.camera.reset();
        self.touch_viewport();
    }

    /// Frame every element, or reset the view for an empty document.
    pub fn fit_to_content(&mut self) {
        match self.document.bounds() {
            Some(bounds) => self.camera.fit_to_bounds(bounds, FIT_PADDING),
            None => self.camera.reset(),
        }
        self.touch_viewport();
    }

    // --- input ------------------------------------------------------------

    /// Route a pointer event through the active tool.
    pub fn handle_pointer(&mut self, event: PointerEvent) {
        self.input.handle_pointer_event(&event);
        match event {
            PointerEvent::Down {
                position,
                button,
                modifiers,
            } => self.pointer_down(position, button, modifiers),
            PointerEvent::Move { position, .. } => self.pointer_move(position),
            PointerEvent::Up {
                position, button, ..
            } => self.pointer_up(position, button),
        }
    }

    /// Pointer left the surface or the host cancelled it.
    pub fn pointer_cancel(&mut self) {
        self.cancel_gesture();
        self.input.reset_buttons();
    }

    /// Keyboard shortcuts. Returns whether the key was handled.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        let command = event.modifiers.command();
        match &event.key {
            Key::Escape => {
                if self.tools.is_active() {
                    self.cancel_gesture();
                } else {
                    self.selection.clear();
                }
                true
            }
            Key::Delete | Key::Backspace => self.delete_selection() > 0,
            key if command && key.is_char("z") => {
                if event.modifiers.shift {
                    self.redo()
                } else {
                    self.undo()
                }
            }
            key if command && key.is_char("y") => self.redo(),
            key if command && key.is_char("a") => {
                self.select_all();
                true
            }
            _ => false,
        }
    }

    /// Ctrl/cmd + wheel zooms at the cursor; a plain wheel pans.
    pub fn handle_wheel(&mut self, event: &WheelEvent) -> bool {
        if event.modifiers.command() {
            if event.delta.y == 0.0 {
                return false;
            }
            let factor = if event.delta.y < 0.0 {
                WHEEL_ZOOM_FACTOR
            } else {
                1.0 / WHEEL_ZOOM_FACTOR
            };
            self.zoom_at(event.position, factor)
        } else {
            self.pan(-event.delta);
            true
        }
    }

    /// Drop the gesture in progress without committing. Live element drags
    /// are rolled back to the last history entry.
    pub fn cancel_gesture(&mut self) {
        match self.tools.finish() {
            GestureState::DraggingElement { .. } | GestureState::ResizingElement { .. } => {
                let committed = self.history.current().clone();
                self.document.restore(&committed);
            }
            GestureState::Panning { .. } => self.touch_viewport(),
            _ => {}
        }
    }

    fn element_at(&self, point: Point) -> Option<ElementRef> {
        let tolerance = scaled_tolerance(self.config.hit_tolerance, self.camera.zoom);
        hit_test::element_at(&self.document, point, tolerance)
    }

    fn pointer_down(&mut self, screen: Point, button: MouseButton, modifiers: Modifiers) {
        if self.tools.is_active() {
            return;
        }
        let tool = self.tools.current_tool;
        if button == MouseButton::Middle || (button == MouseButton::Left && tool == ToolKind::Pan) {
            self.tools.begin(GestureState::Panning {
                last: screen,
                button,
            });
            return;
        }
        if button != MouseButton::Left {
            return;
        }

        let point = self.camera.screen_to_logical(screen);
        match tool {
            ToolKind::Select => self.begin_select(point, modifiers.shift),
            ToolKind::Pan => {}
            ToolKind::Pencil => {
                let mut stroke = Stroke::new(self.ink(), self.config.stroke_width);
                stroke.add_point(point);
                self.tools.begin(GestureState::DrawingStroke { stroke });
            }
            ToolKind::Eraser => self.tools.begin(GestureState::Erasing { erased: 0 }),
            ToolKind::Line | ToolKind::Arrow => {
                let Some(kind) = tool.line_kind() else {
                    return;
                };
                self.tools.begin(GestureState::DrawingLine {
                    kind,
                    start: point,
                    current: point,
                });
            }
            ToolKind::Node => {
                if let Some(hit) = self.element_at(point) {
                    self.selection.select(hit);
                    return;
                }
                let id = self.add_node(point, NodeData::default());
                self.selection.select(ElementRef::node(id));
            }
            ToolKind::Rectangle
            | ToolKind::Circle
            | ToolKind::Diamond
            | ToolKind::Sticky
            | ToolKind::Text => {
                let Some(kind) = tool.shape_kind() else {
                    return;
                };
                // Shape tools only create on empty canvas.
                if let Some(hit) = self.element_at(point) {
                    self.selection.select(hit);
                    return;
                }
                let drag = self.config.shape_placement == ShapePlacement::DragToSize
                    && !tool.stamp_only();
                if drag {
                    self.tools.begin(GestureState::DrawingShape {
                        kind,
                        start: point,
                        current: point,
                    });
                } else {
                    self.place_shape(Shape::stamp(kind, point, self.config.size_preset));
                }
            }
        }
    }

    fn begin_select(&mut self, point: Point, additive: bool) {
        let zoom = self.camera.zoom;
        if !additive {
            let tolerance = scaled_tolerance(HANDLE_HIT_TOLERANCE, zoom);
            if let Some((target, handle)) =
                selection::hit_test_handles(&self.document, &self.selection, point, tolerance)
            {
                let original = self
                    .document
                    .element_bounds(target.kind, target.id)
                    .unwrap_or(Rect::ZERO);
                self.tools.begin(GestureState::ResizingElement {
                    target,
                    handle,
                    original,
                    start: point,
                });
                return;
            }
        }

        match self.element_at(point) {
            Some(hit) if additive => self.selection.toggle(hit),
            Some(hit) => {
                if !self.selection.contains(hit) {
                    self.selection.select(hit);
                }
                self.tools.begin(GestureState::DraggingElement {
                    start: point,
                    current: point,
                });
            }
            None => {
                if !additive {
                    self.selection.clear();
                }
                self.tools.begin(GestureState::DraggingSelectionBox(SelectionBox {
                    start: point,
                    current: point,
                    additive,
                }));
            }
        }
    }

    fn pointer_move(&mut self, screen: Point) {
        let point = self.camera.screen_to_logical(screen);
        let mut state = self.tools.finish();
        match &mut state {
            GestureState::Idle => {}
            GestureState::Panning { last, .. } => {
                self.camera.pan(screen - *last);
                *last = screen;
            }
            GestureState::DrawingStroke { stroke } => stroke.add_point(point),
            GestureState::DrawingShape { current, .. } | GestureState::DrawingLine { current, .. } => {
                *current = point;
            }
            GestureState::DraggingSelectionBox(rect) => rect.current = point,
            GestureState::DraggingElement { current, .. } => {
                let delta = point - *current;
                if delta != Vec2::ZERO {
                    self.document.translate_elements(&self.selection, delta);
                }
                *current = point;
            }
            GestureState::ResizingElement {
                target,
                handle,
                original,
                start,
            } => self.apply_resize(*target, *handle, *original, point - *start, point),
            GestureState::Erasing { erased } => {
                if self.input.is_button_pressed(MouseButton::Left) && self.erase_at(point) {
                    *erased += 1;
                }
            }
        }
        self.tools.state = state;
    }

    fn pointer_up(&mut self, screen: Point, button: MouseButton) {
        let ends_gesture = match &self.tools.state {
            GestureState::Idle => false,
            GestureState::Panning { button: pan_button, .. } => *pan_button == button,
            _ => button == MouseButton::Left,
        };
        if !ends_gesture {
            return;
        }

        let point = self.camera.screen_to_logical(screen);
        let zoom = self.camera.zoom;
        let threshold = self.config.selection_click_threshold;
        match self.tools.finish() {
            GestureState::Idle => {}
            GestureState::Panning { .. } => self.touch_viewport(),
            GestureState::DrawingStroke { stroke } => {
                if stroke.is_committable() {
                    self.document.strokes.add(stroke);
                    self.commit("stroke");
                } else {
                    log::debug!("Discarded stroke with {} point(s)", stroke.len());
                }
            }
            GestureState::DrawingShape { kind, start, .. } => {
                let shape = if start.distance(point) * zoom < threshold {
                    Shape::stamp(kind, start, self.config.size_preset)
                } else {
                    Shape::from_drag(kind, start, point)
                };
                self.place_shape(shape);
            }
            GestureState::DrawingLine { kind, start, .. } => {
                let line = LineSegment::new(start, point, kind, self.ink(), self.config.stroke_width);
                self.document.lines.add(line);
                self.commit("line");
            }
            GestureState::DraggingSelectionBox(mut rect) => {
                rect.current = point;
                if rect.screen_distance(zoom) < threshold {
                    return;
                }
                let hits = hit_test::elements_in_rect(&self.document, rect.to_rect());
                self.selection.extend(hits);
            }
            GestureState::DraggingElement { current, .. } => {
                let delta = point - current;
                if delta != Vec2::ZERO {
                    self.document.translate_elements(&self.selection, delta);
                }
                self.commit("move");
            }
            GestureState::ResizingElement {
                target,
                handle,
                original,
                start,
            } => {
                self.apply_resize(target, handle, original, point - start, point);
                self.commit("resize");
            }
            GestureState::Erasing { erased } => {
                log::debug!("Eraser gesture removed {} stroke(s)", erased);
            }
        }
    }

    fn place_shape(&mut self, shape: Shape) {
        let element = shape.element_ref();
        let kind = shape.kind;
        self.document.shapes.add(shape);
        self.selection.select(element);
        self.commit(match kind {
            ShapeKind::Text => "text",
            ShapeKind::StickyNote => "sticky note",
            _ => "shape",
        });
    }

    fn apply_resize(
        &mut self,
        target: ElementRef,
        handle: HandleKind,
        original: Rect,
        delta: Vec2,
        point: Point,
    ) {
        match handle {
            HandleKind::Corner(corner) => {
                let rect = selection::resize_rect(original, corner, delta);
                self.document.set_element_bounds(target, rect);
            }
            HandleKind::Endpoint(index) => {
                self.document.set_line_endpoint(target.id, index, point);
            }
        }
    }

    fn erase_at(&mut self, point: Point) -> bool {
        let tolerance = scaled_tolerance(self.config.eraser_radius, self.camera.zoom);
        match hit_test::stroke_at(&self.document, point, tolerance) {
            Some(id) => self.erase_stroke(id),
            None => false,
        }
    }
}
