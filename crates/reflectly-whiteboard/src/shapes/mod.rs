//! Element definitions for the whiteboard document.

mod line;
mod node;
mod shape;
mod stroke;

pub use line::{LineKind, LineSegment};
pub use node::{Connection, ConnectionStyle, Node, NodeData};
pub use shape::{Shape, ShapeKind};
pub use stroke::Stroke;

use kurbo::{Affine, Point, Rect};
use peniko::Color;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

/// Unique identifier for document elements.
pub type ElementId = Uuid;

/// Serializable color representation (RGBA8), stored as a hex string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SerializableColor {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl SerializableColor {
    pub fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn black() -> Self {
        Self::new(0, 0, 0, 255)
    }

    pub fn white() -> Self {
        Self::new(255, 255, 255, 255)
    }

    pub fn transparent() -> Self {
        Self::new(0, 0, 0, 0)
    }

    /// Default fill for sticky notes.
    pub fn sticky_yellow() -> Self {
        Self::new(0xfe, 0xf0, 0x8a, 255)
    }

    /// Parse `#rgb`, `#rrggbb`, `#rrggbbaa` or `transparent`.
    pub fn from_hex(color: &str) -> Option<Self> {
        let color = color.trim();
        if color.eq_ignore_ascii_case("transparent") {
            return Some(Self::transparent());
        }

        let hex = color.strip_prefix('#')?;
        // from_str_radix tolerates a leading sign, so check every digit up front.
        if !hex.bytes().all(|b| b.is_ascii_hexdigit()) {
            return None;
        }
        let channel = |range: std::ops::Range<usize>| u8::from_str_radix(&hex[range], 16).ok();
        match hex.len() {
            3 => {
                // #rgb -> #rrggbb
                let r = u8::from_str_radix(&hex[0..1], 16).ok()? * 17;
                let g = u8::from_str_radix(&hex[1..2], 16).ok()? * 17;
                let b = u8::from_str_radix(&hex[2..3], 16).ok()? * 17;
                Some(Self::new(r, g, b, 255))
            }
            6 => Some(Self::new(channel(0..2)?, channel(2..4)?, channel(4..6)?, 255)),
            8 => Some(Self::new(
                channel(0..2)?,
                channel(2..4)?,
                channel(4..6)?,
                channel(6..8)?,
            )),
            _ => None,
        }
    }

    /// Format as `#rrggbb`, or `#rrggbbaa` when not fully opaque.
    pub fn to_hex(&self) -> String {
        if self.a == 255 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("#{:02x}{:02x}{:02x}{:02x}", self.r, self.g, self.b, self.a)
        }
    }
}

impl fmt::Display for SerializableColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Serialize for SerializableColor {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for SerializableColor {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_hex(&text)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid color `{}`", text)))
    }
}

impl From<Color> for SerializableColor {
    fn from(color: Color) -> Self {
        let rgba = color.to_rgba8();
        Self {
            r: rgba.r,
            g: rgba.g,
            b: rgba.b,
            a: rgba.a,
        }
    }
}

impl From<SerializableColor> for Color {
    fn from(color: SerializableColor) -> Self {
        Color::from_rgba8(color.r, color.g, color.b, color.a)
    }
}

/// The collection an element lives in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Shape,
    Stroke,
    Line,
    Node,
}

/// A typed reference to a document element.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementRef {
    pub kind: ElementKind,
    pub id: ElementId,
}

impl ElementRef {
    pub fn new(kind: ElementKind, id: ElementId) -> Self {
        Self { kind, id }
    }

    pub fn shape(id: ElementId) -> Self {
        Self::new(ElementKind::Shape, id)
    }

    pub fn stroke(id: ElementId) -> Self {
        Self::new(ElementKind::Stroke, id)
    }

    pub fn line(id: ElementId) -> Self {
        Self::new(ElementKind::Line, id)
    }

    pub fn node(id: ElementId) -> Self {
        Self::new(ElementKind::Node, id)
    }
}

/// Common behaviour of every selectable document element.
pub trait Element {
    /// Get the unique identifier.
    fn id(&self) -> ElementId;

    /// Which collection the element belongs to.
    fn kind(&self) -> ElementKind;

    /// Get the bounding box in logical coordinates.
    fn bounds(&self) -> Rect;

    /// Check if a point (in logical coordinates) hits this element.
    fn hit_test(&self, point: Point, tolerance: f64) -> bool;

    /// Apply a transform to this element.
    fn transform(&mut self, affine: Affine);

    /// Typed reference to this element.
    fn element_ref(&self) -> ElementRef {
        ElementRef::new(self.kind(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hex_parsing() {
        assert_eq!(SerializableColor::from_hex("#fff"), Some(SerializableColor::white()));
        assert_eq!(
            SerializableColor::from_hex("#12ab34"),
            Some(SerializableColor::new(0x12, 0xab, 0x34, 255))
        );
        assert_eq!(
            SerializableColor::from_hex("#12ab3480"),
            Some(SerializableColor::new(0x12, 0xab, 0x34, 0x80))
        );
        assert_eq!(
            SerializableColor::from_hex("transparent"),
            Some(SerializableColor::transparent())
        );
        assert_eq!(SerializableColor::from_hex("red"), None);
        assert_eq!(SerializableColor::from_hex("#12345"), None);
        assert_eq!(SerializableColor::from_hex("#zzzzzz"), None);
    }

    #[test]
    fn test_hex_rejects_signs() {
        assert_eq!(SerializableColor::from_hex("#+f+f+f"), None);
        assert_eq!(SerializableColor::from_hex("#+fffff"), None);
        assert_eq!(SerializableColor::from_hex("#12ab3+80"), None);
        assert_eq!(SerializableColor::from_hex("#-ff"), None);
    }

    #[test]
    fn test_color_serializes_as_hex() {
        let json = serde_json::to_string(&SerializableColor::new(255, 0, 16, 255)).unwrap();
        assert_eq!(json, "\"#ff0010\"");
        let back: SerializableColor = serde_json::from_str("\"#FF0010\"").unwrap();
        assert_eq!(back, SerializableColor::new(255, 0, 16, 255));
        assert!(serde_json::from_str::<SerializableColor>("\"nope\"").is_err());
    }

    #[test]
    fn test_peniko_conversion() {
        let color = SerializableColor::new(10, 20, 30, 255);
        let peniko: Color = color.into();
        assert_eq!(SerializableColor::from(peniko), color);
    }
}
