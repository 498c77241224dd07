//! Deduplicating style cache for spreadsheet output.
//!
//! Styles are keyed by the structural content of a [`CellStyleSpec`]
//! plus the cell's number format; fonts are interned separately by
//! their own key. Equal keys always resolve to the same handle, which
//! keeps the document under the platform's distinct-style ceiling.

use std::collections::HashMap;

use gridport_model::{Alignment, CellStyleSpec};
use rust_xlsxwriter::{Format, FormatAlign};

/// Platform ceiling on distinct styles in a single document. The cache
/// does not subdivide further; callers bound style diversity.
pub const MAX_STYLES: usize = 64_000;

/// Handle to a cached style.
pub type StyleId = usize;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct StyleKey {
    spec: CellStyleSpec,
    number_format: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct FontKey {
    bold: bool,
    italic: bool,
    font_size: Option<u16>,
    font_color: Option<String>,
}

impl FontKey {
    fn of(spec: &CellStyleSpec) -> Self {
        Self {
            bold: spec.bold,
            italic: spec.italic,
            font_size: spec.font_size,
            font_color: spec.font_color.clone(),
        }
    }
}

/// Style-by-key and font-by-key maps over a format table.
#[derive(Default)]
pub struct StyleCache {
    styles: HashMap<StyleKey, StyleId>,
    fonts: HashMap<FontKey, usize>,
    formats: Vec<Format>,
}

impl StyleCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Return the handle for a spec/format pair, creating and caching
    /// the underlying style object on first use.
    pub fn style_for(&mut self, spec: &CellStyleSpec, number_format: &str) -> StyleId {
        let key = StyleKey {
            spec: spec.clone(),
            number_format: number_format.to_string(),
        };
        if let Some(&id) = self.styles.get(&key) {
            return id;
        }

        let font_key = FontKey::of(spec);
        let next_font = self.fonts.len();
        self.fonts.entry(font_key).or_insert(next_font);

        let id = self.formats.len();
        self.formats.push(build_format(spec, number_format));
        self.styles.insert(key, id);
        id
    }

    /// The cached style object for a handle.
    pub fn format(&self, id: StyleId) -> &Format {
        &self.formats[id]
    }

    /// Number of distinct styles created so far.
    pub fn len(&self) -> usize {
        self.formats.len()
    }

    pub fn is_empty(&self) -> bool {
        self.formats.is_empty()
    }

    /// Number of distinct fonts interned so far.
    pub fn font_count(&self) -> usize {
        self.fonts.len()
    }
}

fn build_format(spec: &CellStyleSpec, number_format: &str) -> Format {
    let mut format = Format::new();

    if spec.bold {
        format = format.set_bold();
    }
    if spec.italic {
        format = format.set_italic();
    }
    if let Some(points) = spec.font_size {
        format = format.set_font_size(f64::from(points));
    }
    if let Some(color) = &spec.font_color {
        format = format.set_font_color(color.as_str());
    }
    if let Some(color) = &spec.bg_color {
        format = format.set_background_color(color.as_str());
    }
    if let Some(alignment) = spec.alignment {
        format = format.set_align(match alignment {
            Alignment::Left => FormatAlign::Left,
            Alignment::Center => FormatAlign::Center,
            Alignment::Right => FormatAlign::Right,
        });
    }
    if !number_format.is_empty() {
        format = format.set_num_format(number_format);
    }

    format
}
