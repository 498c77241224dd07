//! Cell style specifications.
//!
//! A [`CellStyleSpec`] is a plain value type: two structurally equal
//! specs must resolve to one underlying style object in the writer's
//! style cache, which is what keeps a document under the platform's
//! distinct-style ceiling.

use serde::{Deserialize, Serialize};

/// Horizontal cell alignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Alignment {
    Left,
    Center,
    Right,
}

/// Structural style description used as a cache key.
///
/// Constructed via named-field literal or the `with_*` builders;
/// `default()` is the unstyled body style.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellStyleSpec {
    pub bold: bool,
    pub italic: bool,
    /// Font size in points.
    pub font_size: Option<u16>,
    /// Font color as `#RRGGBB`.
    pub font_color: Option<String>,
    /// Fill color as `#RRGGBB`.
    pub bg_color: Option<String>,
    pub alignment: Option<Alignment>,
}

impl CellStyleSpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Default header style: bold, light-grey fill, centered.
    pub fn header_default() -> Self {
        Self {
            bold: true,
            bg_color: Some("#D9D9D9".to_string()),
            alignment: Some(Alignment::Center),
            ..Self::default()
        }
    }

    pub fn with_bold(mut self, bold: bool) -> Self {
        self.bold = bold;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }

    pub fn with_font_size(mut self, points: u16) -> Self {
        self.font_size = Some(points);
        self
    }

    pub fn with_font_color(mut self, color: impl Into<String>) -> Self {
        self.font_color = Some(color.into());
        self
    }

    pub fn with_bg_color(mut self, color: impl Into<String>) -> Self {
        self.bg_color = Some(color.into());
        self
    }

    pub fn with_alignment(mut self, alignment: Alignment) -> Self {
        self.alignment = Some(alignment);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn equal_specs_compare_equal() {
        let left = CellStyleSpec::new().with_bold(true).with_font_size(11);
        let right = CellStyleSpec::new().with_bold(true).with_font_size(11);
        assert_eq!(left, right);
    }

    #[test]
    fn header_default_is_bold_grey_centered() {
        let header = CellStyleSpec::header_default();
        assert!(header.bold);
        assert_eq!(header.bg_color.as_deref(), Some("#D9D9D9"));
        assert_eq!(header.alignment, Some(Alignment::Center));
    }
}
