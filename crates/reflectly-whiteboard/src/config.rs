//! Editor configuration.

use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    Io(String),
    #[error("Failed to parse config: {0}")]
    Parse(String),
    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// How shape tools create a shape on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShapePlacement {
    /// Click places a shape of the preset size at the pointer.
    #[default]
    Stamp,
    /// Press-drag-release sizes the shape from the down point to the pointer.
    DragToSize,
}

/// Default size preset for stamped shapes and nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SizePreset {
    Small,
    #[default]
    Medium,
    Large,
}

impl SizePreset {
    /// Multiplier applied to the medium dimensions.
    pub fn scale(self) -> f64 {
        match self {
            SizePreset::Small => 0.5,
            SizePreset::Medium => 1.0,
            SizePreset::Large => 1.5,
        }
    }
}

/// Tunables for an editor surface.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Minimum zoom level accepted by the viewport.
    pub min_zoom: f64,
    /// Maximum zoom level accepted by the viewport.
    pub max_zoom: f64,
    /// Hit-test tolerance in logical units at zoom 1.
    pub hit_tolerance: f64,
    /// Eraser radius in logical units at zoom 1.
    pub eraser_radius: f64,
    /// Selection drags shorter than this (screen px) count as clicks.
    pub selection_click_threshold: f64,
    /// Maximum number of history entries kept.
    pub max_history: usize,
    /// Quiet period before a debounced save runs.
    pub autosave_debounce_ms: u64,
    pub shape_placement: ShapePlacement,
    pub size_preset: SizePreset,
    /// Width of new strokes and lines.
    pub stroke_width: f64,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            min_zoom: 0.1,
            max_zoom: 10.0,
            hit_tolerance: 8.0,
            eraser_radius: 10.0,
            selection_click_threshold: 5.0,
            max_history: 100,
            autosave_debounce_ms: 800,
            shape_placement: ShapePlacement::default(),
            size_preset: SizePreset::default(),
            stroke_width: 2.0,
        }
    }
}

impl EditorConfig {
    /// Parse a config from JSON. Missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load a config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(format!("{}: {}", path.display(), e)))?;
        Self::from_json(&json)
    }

    /// Check the invariants the editor relies on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.min_zoom.is_finite() && self.min_zoom > 0.0) {
            return Err(ConfigError::Invalid(format!(
                "min_zoom must be positive, got {}",
                self.min_zoom
            )));
        }
        if !self.max_zoom.is_finite() || self.min_zoom > self.max_zoom {
            return Err(ConfigError::Invalid(format!(
                "zoom range [{}, {}] is empty",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.hit_tolerance < 0.0 || self.eraser_radius < 0.0 {
            return Err(ConfigError::Invalid("tolerances must be non-negative".into()));
        }
        if self.selection_click_threshold < 0.0 {
            return Err(ConfigError::Invalid(
                "selection_click_threshold must be non-negative".into(),
            ));
        }
        if self.max_history == 0 {
            return Err(ConfigError::Invalid("max_history must be at least 1".into()));
        }
        if self.stroke_width <= 0.0 {
            return Err(ConfigError::Invalid("stroke_width must be positive".into()));
        }
        Ok(())
    }

    /// Debounce interval for persistence.
    pub fn autosave_debounce(&self) -> crate::storage::Duration {
        crate::storage::Duration::from_millis(self.autosave_debounce_ms)
    }
}
