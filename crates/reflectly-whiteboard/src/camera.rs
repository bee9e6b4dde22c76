//! Camera module for pan/zoom transforms.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom level that corresponds to "100%".
pub const BASE_ZOOM: f64 = 1.0;

/// Multiplicative step used by `zoom_in` / `zoom_out`.
pub const ZOOM_STEP: f64 = 1.2;

/// Persisted viewport state (pan offset and zoom).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewportState {
    #[serde(default)]
    pub offset_x: f64,
    #[serde(default)]
    pub offset_y: f64,
    #[serde(default = "default_zoom")]
    pub zoom: f64,
}

fn default_zoom() -> f64 {
    BASE_ZOOM
}

impl Default for ViewportState {
    fn default() -> Self {
        Self {
            offset_x: 0.0,
            offset_y: 0.0,
            zoom: BASE_ZOOM,
        }
    }
}

/// Camera manages the view transform for the canvas.
///
/// It converts between screen coordinates (pixels relative to the viewport
/// element) and logical canvas coordinates: `screen = logical * zoom + offset`.
#[derive(Debug, Clone, PartialEq)]
pub struct Camera {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    /// Current zoom level.
    pub zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
    /// Size of the host viewport in screen pixels.
    pub viewport: Size,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: BASE_ZOOM,
            min_zoom: 0.1,
            max_zoom: 10.0,
            viewport: Size::new(800.0, 600.0),
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with a custom zoom range.
    pub fn with_zoom_range(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            min_zoom,
            max_zoom,
            zoom: BASE_ZOOM.clamp(min_zoom, max_zoom),
            ..Self::default()
        }
    }

    /// Get the affine transform for rendering (logical -> screen).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.offset) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling (screen -> logical).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-self.offset)
    }

    /// Convert a screen point to logical coordinates.
    pub fn screen_to_logical(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a logical point to screen coordinates.
    pub fn logical_to_screen(&self, logical_point: Point) -> Point {
        self.transform() * logical_point
    }

    /// Pan the camera by a delta in screen coordinates. Panning is unbounded.
    pub fn pan(&mut self, delta: Vec2) {
        self.offset += delta;
    }

    /// Whether `zoom` lies inside the configured range.
    pub fn accepts_zoom(&self, zoom: f64) -> bool {
        zoom.is_finite() && zoom >= self.min_zoom && zoom <= self.max_zoom
    }

    /// Set the zoom level, keeping the logical point under `anchor` fixed.
    ///
    /// Out-of-range values are ignored. Returns whether the zoom changed.
    pub fn set_zoom(&mut self, new_zoom: f64, anchor: Point) -> bool {
        if !self.accepts_zoom(new_zoom) {
            log::debug!("Ignoring zoom {} outside [{}, {}]", new_zoom, self.min_zoom, self.max_zoom);
            return false;
        }
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return false;
        }

        let logical = self.screen_to_logical(anchor);
        self.zoom = new_zoom;

        // Move the offset so `logical` lands back on `anchor`.
        let new_screen = self.logical_to_screen(logical);
        self.offset += Vec2::new(anchor.x - new_screen.x, anchor.y - new_screen.y);
        true
    }

    /// Zoom by a multiplicative factor, keeping the given screen point fixed.
    pub fn zoom_at(&mut self, anchor: Point, factor: f64) -> bool {
        self.set_zoom(self.zoom * factor, anchor)
    }

    /// Zoom in one step around the viewport center.
    pub fn zoom_in(&mut self) -> bool {
        self.zoom_at(self.viewport_center(), ZOOM_STEP)
    }

    /// Zoom out one step around the viewport center.
    pub fn zoom_out(&mut self) -> bool {
        self.zoom_at(self.viewport_center(), 1.0 / ZOOM_STEP)
    }

    /// Reset camera to default position and zoom.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = BASE_ZOOM.clamp(self.min_zoom, self.max_zoom);
    }

    /// Update the viewport size after the host container resized.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport = Size::new(width.max(0.0), height.max(0.0));
    }

    /// Center of the viewport in screen coordinates.
    pub fn viewport_center(&self) -> Point {
        Point::new(self.viewport.width / 2.0, self.viewport.height / 2.0)
    }

    /// The region of the canvas currently visible, in logical coordinates.
    pub fn visible_rect(&self) -> Rect {
        let top_left = self.screen_to_logical(Point::ZERO);
        let bottom_right =
            self.screen_to_logical(Point::new(self.viewport.width, self.viewport.height));
        Rect::from_points(top_left, bottom_right)
    }

    /// Fit the camera to show the given bounding box.
    pub fn fit_to_bounds(&mut self, bounds: Rect, padding: f64) {
        if bounds.is_zero_area() {
            self.reset();
            return;
        }

        let padded = Size::new(
            (self.viewport.width - padding * 2.0).max(1.0),
            (self.viewport.height - padding * 2.0).max(1.0),
        );

        let scale_x = padded.width / bounds.width();
        let scale_y = padded.height / bounds.height();
        self.zoom = scale_x.min(scale_y).clamp(self.min_zoom, self.max_zoom);

        let bounds_center = bounds.center();
        let viewport_center = self.viewport_center();
        self.offset = Vec2::new(
            viewport_center.x - bounds_center.x * self.zoom,
            viewport_center.y - bounds_center.y * self.zoom,
        );
    }

    /// Snapshot the persisted part of the camera.
    pub fn state(&self) -> ViewportState {
        ViewportState {
            offset_x: self.offset.x,
            offset_y: self.offset.y,
            zoom: self.zoom,
        }
    }

    /// Restore a persisted viewport. A stored zoom outside the range is clamped.
    pub fn restore(&mut self, state: ViewportState) {
        self.offset = Vec2::new(state.offset_x, state.offset_y);
        self.zoom = if state.zoom.is_finite() {
            state.zoom.clamp(self.min_zoom, self.max_zoom)
        } else {
            BASE_ZOOM.clamp(self.min_zoom, self.max_zoom)
        };
    }
}
