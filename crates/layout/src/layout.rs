//! The viewport layout engine.
//!
//! Turns a validated configuration snapshot plus live viewport/font metrics
//! into the pixel geometry of every structural region of the editor and the
//! effective word-wrap column. Pure except for the [`LayoutMemory`] passed
//! in; cheap enough to run synchronously on every resize/font/configuration
//! change.

use log::trace;

use crate::minimap::{plan_minimap_layout, LayoutMemory, MinimapLayout, MinimapLayoutInput};
use editor_core::{
    EditorOptions, MinimapSide, RenderLineNumbers, ShowFoldingControls, WordWrap, WordWrapOverride,
};

/// Extra decoration width reserved for the folding control.
const FOLDING_DECORATION_WIDTH: u32 = 16;

/// Per-call snapshot of everything the layout engine reads: live
/// viewport/font metrics plus the validated configuration subset.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorLayoutInput {
    pub outer_width: u32,
    pub outer_height: u32,
    pub line_height: u32,
    /// Digits needed for the largest line number.
    pub line_numbers_digit_count: usize,
    pub typical_halfwidth_character_width: f32,
    pub max_digit_width: f32,
    pub pixel_ratio: f32,
    /// Current number of rendered (wrapped) lines.
    pub view_line_count: usize,
    pub is_dominated_by_long_lines: bool,
    pub accessibility_support_enabled: bool,
    pub glyph_margin_decoration_lane_count: u32,
    pub options: EditorOptions,
}

impl Default for EditorLayoutInput {
    fn default() -> Self {
        Self {
            outer_width: 800,
            outer_height: 600,
            line_height: 18,
            line_numbers_digit_count: 3,
            typical_halfwidth_character_width: 7.0,
            max_digit_width: 7.0,
            pixel_ratio: 1.0,
            view_line_count: 100,
            is_dominated_by_long_lines: false,
            accessibility_support_enabled: false,
            glyph_margin_decoration_lane_count: 1,
            options: EditorOptions::default(),
        }
    }
}

/// Outcome of resolving the word-wrap override chain.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct WrappingResolution {
    pub effective_word_wrap: WordWrap,
    pub is_word_wrap_minified: bool,
    pub is_viewport_wrapping: bool,
    /// Fixed column for `WordWrapColumn` mode.
    pub fixed_wrapping_column: Option<u32>,
}

/// Resolve the effective word-wrap behavior.
///
/// `override2` wins unless `Inherit`, then `override1`, then the base
/// setting. When accessibility support is enabled, the chain is fully
/// inherited and the model is dominated by long lines, viewport wrapping is
/// forced on regardless of the configured mode: accessibility takes
/// precedence over the long-line performance heuristic.
pub fn resolve_word_wrap(
    word_wrap: WordWrap,
    override1: WordWrapOverride,
    override2: WordWrapOverride,
    word_wrap_column: u32,
    accessibility_support_enabled: bool,
    is_dominated_by_long_lines: bool,
) -> WrappingResolution {
    let chain = if override2 != WordWrapOverride::Inherit {
        override2
    } else {
        override1
    };
    let effective_word_wrap = match chain {
        WordWrapOverride::Inherit => word_wrap,
        WordWrapOverride::Off => WordWrap::Off,
        WordWrapOverride::On => WordWrap::On,
    };

    if accessibility_support_enabled
        && chain == WordWrapOverride::Inherit
        && is_dominated_by_long_lines
    {
        return WrappingResolution {
            effective_word_wrap,
            is_word_wrap_minified: true,
            is_viewport_wrapping: true,
            fixed_wrapping_column: None,
        };
    }

    match effective_word_wrap {
        WordWrap::On | WordWrap::Bounded => WrappingResolution {
            effective_word_wrap,
            is_word_wrap_minified: false,
            is_viewport_wrapping: true,
            fixed_wrapping_column: None,
        },
        WordWrap::WordWrapColumn => WrappingResolution {
            effective_word_wrap,
            is_word_wrap_minified: false,
            is_viewport_wrapping: false,
            fixed_wrapping_column: Some(word_wrap_column),
        },
        WordWrap::Off => WrappingResolution {
            effective_word_wrap,
            is_word_wrap_minified: false,
            is_viewport_wrapping: false,
            fixed_wrapping_column: None,
        },
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OverviewRulerPosition {
    /// Top offset, accounting for the scrollbar arrow reservation.
    pub top: u32,
    pub width: u32,
    pub height: u32,
    pub right: u32,
}

/// The complete layout record, recomputed on every call and consumed by the
/// rendering layer.
#[derive(Debug, Clone, PartialEq)]
pub struct EditorLayoutInfo {
    pub width: u32,
    pub height: u32,

    pub glyph_margin_left: u32,
    pub glyph_margin_width: u32,
    pub glyph_margin_decoration_lane_count: u32,

    pub line_numbers_left: u32,
    pub line_numbers_width: u32,

    pub decorations_left: u32,
    pub decorations_width: u32,

    pub content_left: u32,
    pub content_width: u32,

    pub minimap: MinimapLayout,

    /// Logical viewport width in typical halfwidth characters.
    pub viewport_column: u32,

    pub is_word_wrap_minified: bool,
    pub is_viewport_wrapping: bool,
    /// Effective wrap column; `None` when wrapping is off.
    pub wrapping_column: Option<u32>,

    pub vertical_scrollbar_width: u32,
    pub horizontal_scrollbar_height: u32,

    pub overview_ruler: OverviewRulerPosition,
}

/// Compute the complete layout for one configuration/viewport snapshot.
///
/// Never fails under well-formed input; malformed input (negative metrics,
/// NaN) propagates as garbage output rather than an error, validation being
/// the external options registry's responsibility.
pub fn compute_layout(input: &EditorLayoutInput, memory: &mut LayoutMemory) -> EditorLayoutInfo {
    let options = &input.options;
    let outer_width = input.outer_width;
    let outer_height = input.outer_height;

    let wrapping = resolve_word_wrap(
        options.word_wrap,
        options.word_wrap_override1,
        options.word_wrap_override2,
        options.word_wrap_column,
        input.accessibility_support_enabled,
        input.is_dominated_by_long_lines,
    );

    let show_folding_decoration =
        options.folding && options.show_folding_controls != ShowFoldingControls::Never;
    let mut line_decorations_width = options.line_decorations_width;
    if show_folding_decoration {
        line_decorations_width += FOLDING_DECORATION_WIDTH;
    }

    let mut line_numbers_width = 0u32;
    if options.line_numbers != RenderLineNumbers::Off {
        let digit_count = input
            .line_numbers_digit_count
            .max(options.line_numbers_min_chars);
        line_numbers_width = (digit_count as f32 * input.max_digit_width).round() as u32;
    }

    let mut glyph_margin_width = 0u32;
    if options.glyph_margin {
        glyph_margin_width = input.line_height * input.glyph_margin_decoration_lane_count;
    }

    let mut glyph_margin_left = 0u32;
    let mut line_numbers_left = glyph_margin_left + glyph_margin_width;
    let mut decorations_left = line_numbers_left + line_numbers_width;
    let mut content_left = decorations_left + line_decorations_width;

    let remaining_width = outer_width as i32
        - glyph_margin_width as i32
        - line_numbers_width as i32
        - line_decorations_width as i32;

    let minimap = plan_minimap_layout(
        &MinimapLayoutInput {
            outer_width,
            outer_height,
            line_height: input.line_height,
            typical_halfwidth_character_width: input.typical_halfwidth_character_width,
            pixel_ratio: input.pixel_ratio,
            scroll_beyond_last_line: options.scroll_beyond_last_line,
            padding_top: options.padding.top,
            padding_bottom: options.padding.bottom,
            minimap: options.minimap.clone(),
            vertical_scrollbar_width: options.scrollbar.vertical_scrollbar_size,
            view_line_count: input.view_line_count,
            remaining_width,
            is_viewport_wrapping: wrapping.is_viewport_wrapping,
        },
        memory,
    );

    if options.minimap.enabled && options.minimap.side == MinimapSide::Left {
        // The minimap takes the outermost edge; shift the gutter stack and
        // the content right past it.
        glyph_margin_left += minimap.width;
        line_numbers_left += minimap.width;
        decorations_left += minimap.width;
        content_left += minimap.width;
    }

    let content_width = (remaining_width - minimap.width as i32).max(0) as u32;
    let vertical_scrollbar_width = options.scrollbar.vertical_scrollbar_size;

    // 2px of cursor breathing room after the last character
    let viewport_column = (((content_width as f32 - vertical_scrollbar_width as f32 - 2.0)
        / input.typical_halfwidth_character_width)
        .floor() as i64)
        .max(1) as u32;

    let mut wrapping_column = wrapping.fixed_wrapping_column;
    if wrapping.is_viewport_wrapping {
        let mut column = viewport_column.max(1);
        if wrapping.effective_word_wrap == WordWrap::Bounded {
            column = column.min(options.word_wrap_column);
        }
        wrapping_column = Some(column);
    }

    let overview_ruler_top = options.scrollbar.vertical_arrow_reservation();
    let overview_ruler = OverviewRulerPosition {
        top: overview_ruler_top,
        width: vertical_scrollbar_width,
        height: outer_height.saturating_sub(2 * overview_ruler_top),
        right: 0,
    };

    trace!(
        "layout {}x{}: content {}px at {}, minimap {}px, wrap column {:?}",
        outer_width,
        outer_height,
        content_width,
        content_left,
        minimap.width,
        wrapping_column
    );

    EditorLayoutInfo {
        width: outer_width,
        height: outer_height,
        glyph_margin_left,
        glyph_margin_width,
        glyph_margin_decoration_lane_count: input.glyph_margin_decoration_lane_count,
        line_numbers_left,
        line_numbers_width,
        decorations_left,
        decorations_width: line_decorations_width,
        content_left,
        content_width,
        minimap,
        viewport_column,
        is_word_wrap_minified: wrapping.is_word_wrap_minified,
        is_viewport_wrapping: wrapping.is_viewport_wrapping,
        wrapping_column,
        vertical_scrollbar_width,
        horizontal_scrollbar_height: options.scrollbar.horizontal_scrollbar_size,
        overview_ruler,
    }
}
