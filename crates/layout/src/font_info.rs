//! Font measurement feeding the layout engine.

use cosmic_text::{Attrs, Buffer, FontSystem, Metrics, Shaping};

/// The font numbers the layout engine consumes.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FontInfo {
    /// Editor line height in logical pixels.
    pub line_height: u32,
    /// Width of a typical halfwidth character ("n") in logical pixels.
    pub typical_halfwidth_character_width: f32,
    /// Widest digit width in logical pixels, sizes the line-number column.
    pub max_digit_width: f32,
}

impl Default for FontInfo {
    fn default() -> Self {
        Self {
            line_height: 17,
            typical_halfwidth_character_width: 8.4,
            max_digit_width: 8.4,
        }
    }
}

/// Measures probe characters to produce a [`FontInfo`].
pub struct FontMeasure {
    font_system: FontSystem,
    font_size: f32,
}

impl std::fmt::Debug for FontMeasure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontMeasure")
            .field("font_size", &self.font_size)
            .finish()
    }
}

impl FontMeasure {
    pub fn new(font_size: f32) -> Self {
        Self {
            font_system: FontSystem::new(),
            font_size,
        }
    }

    pub fn set_font_size(&mut self, font_size: f32) {
        self.font_size = font_size;
    }

    /// Measure the current font. When shaping yields no glyphs (headless
    /// host without system fonts) widths fall back to an approximation
    /// proportional to the font size.
    pub fn measure(&mut self) -> FontInfo {
        let line_height = (self.font_size * 1.2).round() as u32;
        let typical = self.char_width('n');
        let max_digit = ('0'..='9')
            .map(|digit| self.char_width(digit))
            .fold(0.0f32, f32::max);
        let approx = self.font_size * 0.6;
        FontInfo {
            line_height,
            typical_halfwidth_character_width: width_or_fallback(typical, approx),
            max_digit_width: width_or_fallback(max_digit, approx),
        }
    }

    fn char_width(&mut self, ch: char) -> f32 {
        let metrics = Metrics::new(self.font_size, self.font_size * 1.2);
        let mut buffer = Buffer::new(&mut self.font_system, metrics);
        buffer.set_size(&mut self.font_system, None, None);
        let text = ch.to_string();
        buffer.set_text(&mut self.font_system, &text, Attrs::new(), Shaping::Advanced);
        buffer.shape_until_scroll(&mut self.font_system, false);

        let mut current_x = 0.0f32;
        for run in buffer.layout_runs() {
            for glyph in run.glyphs.iter() {
                current_x = current_x + glyph.x_offset + glyph.w;
            }
        }
        current_x
    }
}

fn width_or_fallback(measured: f32, approx: f32) -> f32 {
    if measured > 0.0 {
        measured
    } else {
        approx
    }
}
