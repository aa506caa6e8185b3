use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("parse error: {0}")]
    Parse(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type Result<T> = std::result::Result<T, CoreError>;

/// Which side of the editor the minimap is rendered on.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MinimapSide {
    Left,
    Right,
}

/// Minimap sizing policy.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MinimapSize {
    /// Fixed row height; the minimap scrolls independently of the editor.
    Proportional,
    /// The whole document is stretched to fill the editor height.
    Fill,
    /// Like `Fill`, but only shrinks when the document would not fit.
    Fit,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MinimapShowSlider {
    Always,
    Mouseover,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum MinimapAutohide {
    None,
    Mouseover,
    Scroll,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum RenderLineNumbers {
    Off,
    On,
    Relative,
    Interval,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ShowFoldingControls {
    Always,
    Never,
    Mouseover,
}

#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum WordWrap {
    Off,
    On,
    /// Wrap at the fixed `word_wrap_column`.
    WordWrapColumn,
    /// Wrap at the viewport width, clamped to `word_wrap_column`.
    Bounded,
}

/// One link of the word-wrap override chain; `Inherit` defers to the next.
#[derive(Debug, Copy, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum WordWrapOverride {
    Inherit,
    Off,
    On,
}

/// Minimap configuration. Geometry only depends on the first six fields;
/// the slider/autohide knobs are carried along for the renderer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct MinimapOptions {
    pub enabled: bool,
    pub side: MinimapSide,
    pub size: MinimapSize,
    /// Configured glyph scale, 1-3 (pre-clamped upstream).
    pub scale: u32,
    pub max_column: u32,
    pub render_characters: bool,
    pub show_slider: MinimapShowSlider,
    pub autohide: MinimapAutohide,
}

impl Default for MinimapOptions {
    fn default() -> Self {
        Self {
            enabled: true,
            side: MinimapSide::Right,
            size: MinimapSize::Proportional,
            scale: 1,
            max_column: 120,
            render_characters: true,
            show_slider: MinimapShowSlider::Mouseover,
            autohide: MinimapAutohide::None,
        }
    }
}

impl MinimapOptions {
    /// Effective glyph scale for a device pixel ratio. High-dpi displays
    /// double the configured scale so glyphs stay legible.
    pub fn effective_scale(&self, pixel_ratio: f32) -> u32 {
        if pixel_ratio >= 2.0 {
            (self.scale as f32 * 2.0).round() as u32
        } else {
            self.scale
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScrollbarOptions {
    pub vertical_scrollbar_size: u32,
    pub horizontal_scrollbar_size: u32,
    pub vertical_has_arrows: bool,
    pub arrow_size: u32,
}

impl Default for ScrollbarOptions {
    fn default() -> Self {
        Self {
            vertical_scrollbar_size: 14,
            horizontal_scrollbar_size: 12,
            vertical_has_arrows: false,
            arrow_size: 11,
        }
    }
}

impl ScrollbarOptions {
    /// Vertical pixels reserved for a scrollbar arrow, 0 when arrows are off.
    pub fn vertical_arrow_reservation(&self) -> u32 {
        if self.vertical_has_arrows {
            self.arrow_size
        } else {
            0
        }
    }
}

#[derive(Debug, Copy, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct PaddingOptions {
    pub top: u32,
    pub bottom: u32,
}

/// The validated configuration snapshot the layout engine reads.
///
/// Values are assumed to be already clamped and typed by the external
/// options registry; nothing here re-validates them.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct EditorOptions {
    pub glyph_margin: bool,
    pub line_numbers: RenderLineNumbers,
    pub line_numbers_min_chars: usize,
    pub line_decorations_width: u32,
    pub folding: bool,
    pub show_folding_controls: ShowFoldingControls,
    pub padding: PaddingOptions,
    pub scroll_beyond_last_line: bool,
    pub scrollbar: ScrollbarOptions,
    pub minimap: MinimapOptions,
    pub word_wrap: WordWrap,
    pub word_wrap_override1: WordWrapOverride,
    pub word_wrap_override2: WordWrapOverride,
    pub word_wrap_column: u32,
}

impl Default for EditorOptions {
    fn default() -> Self {
        Self {
            glyph_margin: true,
            line_numbers: RenderLineNumbers::On,
            line_numbers_min_chars: 5,
            line_decorations_width: 10,
            folding: true,
            show_folding_controls: ShowFoldingControls::Mouseover,
            padding: PaddingOptions::default(),
            scroll_beyond_last_line: true,
            scrollbar: ScrollbarOptions::default(),
            minimap: MinimapOptions::default(),
            word_wrap: WordWrap::Off,
            word_wrap_override1: WordWrapOverride::Inherit,
            word_wrap_override2: WordWrapOverride::Inherit,
            word_wrap_column: 80,
        }
    }
}

impl EditorOptions {
    /// Deserialize a snapshot from JSON. Missing fields take their defaults.
    pub fn from_json_str(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| CoreError::Parse(e.to_string()))
    }

    /// Serialize the snapshot to JSON.
    pub fn to_json_string(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| CoreError::Internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_options_json_round_trip() {
        let mut options = EditorOptions::default();
        options.minimap.size = MinimapSize::Fit;
        options.minimap.side = MinimapSide::Left;
        options.word_wrap = WordWrap::Bounded;
        options.word_wrap_column = 100;

        let json = options.to_json_string().unwrap();
        let parsed = EditorOptions::from_json_str(&json).unwrap();
        assert_eq!(parsed, options);
    }

    #[test]
    fn test_options_missing_fields_take_defaults() {
        let parsed = EditorOptions::from_json_str("{\"glyph_margin\": false}").unwrap();
        assert!(!parsed.glyph_margin);
        assert_eq!(parsed.minimap, MinimapOptions::default());
        assert_eq!(parsed.word_wrap_column, 80);
    }

    #[test]
    fn test_effective_scale_doubles_on_hidpi() {
        let minimap = MinimapOptions { scale: 1, ..Default::default() };
        assert_eq!(minimap.effective_scale(1.0), 1);
        assert_eq!(minimap.effective_scale(1.5), 1);
        assert_eq!(minimap.effective_scale(2.0), 2);

        let minimap = MinimapOptions { scale: 3, ..Default::default() };
        assert_eq!(minimap.effective_scale(2.0), 6);
    }

    #[test]
    fn test_arrow_reservation() {
        let mut scrollbar = ScrollbarOptions::default();
        assert_eq!(scrollbar.vertical_arrow_reservation(), 0);
        scrollbar.vertical_has_arrows = true;
        assert_eq!(scrollbar.vertical_arrow_reservation(), 11);
    }
}
