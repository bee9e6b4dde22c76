//! Host theme provider.
//!
//! The host shell owns the light/dark theme; the editor only queries it to
//! pick default background and ink colors.

use crate::shapes::SerializableColor;
use serde::{Deserialize, Serialize};

/// Color theme of the host application.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Canvas background color.
    pub fn background(self) -> SerializableColor {
        match self {
            Theme::Light => SerializableColor::white(),
            Theme::Dark => SerializableColor::new(0x1e, 0x1e, 0x1e, 255),
        }
    }

    /// Default ink color for strokes and lines.
    pub fn foreground(self) -> SerializableColor {
        match self {
            Theme::Light => SerializableColor::black(),
            Theme::Dark => SerializableColor::new(0xe5, 0xe5, 0xe5, 255),
        }
    }
}

/// Supplies the active theme to the editor.
pub trait ThemeProvider {
    fn theme(&self) -> Theme;
}

impl ThemeProvider for Theme {
    fn theme(&self) -> Theme {
        *self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_theme_colors_contrast() {
        for theme in [Theme::Light, Theme::Dark] {
            assert_ne!(theme.background(), theme.foreground());
        }
        assert_eq!(Theme::Light.foreground(), SerializableColor::black());
    }

    #[test]
    fn test_fixed_theme_provider() {
        let provider: &dyn ThemeProvider = &Theme::Dark;
        assert_eq!(provider.theme(), Theme::Dark);
    }
}
