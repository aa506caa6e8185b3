//! Minimap geometry planning.
//!
//! Decides the minimap's pixel geometry (width, scale, canvas buffer sizes,
//! sampling mode) from font/viewport metrics and the minimap configuration.
//! When the minimap participates in a circular layout with viewport
//! wrapping, a small memory object breaks the render/measure oscillation.

use editor_core::{MinimapOptions, MinimapSide, MinimapSize};

/// Fixed minimap gutter width in logical pixels.
pub const MINIMAP_GUTTER_WIDTH: u32 = 8;

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RenderMinimap {
    None,
    Text,
    Blocks,
}

/// Per-call planner input, assembled by the layout engine.
///
/// All numbers are assumed pre-validated (finite, non-negative) by the
/// external options registry; violating that yields garbage output, not an
/// error.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimapLayoutInput {
    pub outer_width: u32,
    pub outer_height: u32,
    pub line_height: u32,
    pub typical_halfwidth_character_width: f32,
    pub pixel_ratio: f32,
    pub scroll_beyond_last_line: bool,
    pub padding_top: u32,
    pub padding_bottom: u32,
    pub minimap: MinimapOptions,
    pub vertical_scrollbar_width: u32,
    pub view_line_count: usize,
    /// Width left of the editor after the gutter columns, may be negative
    /// for degenerate viewports.
    pub remaining_width: i32,
    pub is_viewport_wrapping: bool,
}

impl MinimapLayoutInput {
    /// Whether a remembered stabilization decision still applies to this
    /// input. Outer width, view line count and remaining width are allowed
    /// to differ: those are exactly the values the wrap feedback loop
    /// changes.
    fn reusable_with(&self, other: &MinimapLayoutInput) -> bool {
        self.outer_height == other.outer_height
            && self.line_height == other.line_height
            && self.typical_halfwidth_character_width == other.typical_halfwidth_character_width
            && self.pixel_ratio == other.pixel_ratio
            && self.scroll_beyond_last_line == other.scroll_beyond_last_line
            && self.padding_top == other.padding_top
            && self.padding_bottom == other.padding_bottom
            && self.minimap == other.minimap
            && self.vertical_scrollbar_width == other.vertical_scrollbar_width
            && self.is_viewport_wrapping == other.is_viewport_wrapping
    }
}

/// Stabilization memory, exclusively owned by one editor instance.
///
/// The three fields are written and cleared only as a group, only by the
/// planner, and only while viewport wrapping is active.
#[derive(Debug, Clone, Default)]
pub struct LayoutMemory {
    stable_minimap_layout_input: Option<MinimapLayoutInput>,
    stable_fit_remaining_width: i32,
    stable_fit_max_minimap_scale: u32,
}

impl LayoutMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// The remembered scale ceiling, if the stabilized regime applies to
    /// `input`: same stable snapshot, viewport wrapping active, and the
    /// remaining width has not grown past the recorded value.
    fn stable_scale_ceiling(&self, input: &MinimapLayoutInput) -> Option<u32> {
        let stable = self.stable_minimap_layout_input.as_ref()?;
        if input.is_viewport_wrapping
            && stable.reusable_with(input)
            && input.remaining_width <= self.stable_fit_remaining_width
        {
            Some(self.stable_fit_max_minimap_scale)
        } else {
            None
        }
    }

    fn record(&mut self, input: &MinimapLayoutInput, scale: u32) {
        self.stable_minimap_layout_input = Some(input.clone());
        self.stable_fit_remaining_width = input.remaining_width;
        self.stable_fit_max_minimap_scale = scale;
    }

    fn clear(&mut self) {
        self.stable_minimap_layout_input = None;
        self.stable_fit_remaining_width = 0;
        self.stable_fit_max_minimap_scale = 0;
    }

    #[cfg(test)]
    fn is_stabilized(&self) -> bool {
        self.stable_minimap_layout_input.is_some()
    }
}

/// Minimap pixel geometry, recomputed on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct MinimapLayout {
    pub render_mode: RenderMinimap,
    pub left_offset: u32,
    pub width: u32,
    pub height_matches_editor_height: bool,
    /// True when one minimap row represents a sampled subset of text lines.
    pub is_sampling: bool,
    /// Effective glyph scale, post-policy.
    pub scale: u32,
    /// Device pixels per minimap row.
    pub line_height: f32,
    /// Canvas raster buffer width in device pixels.
    pub canvas_inner_width: u32,
    /// Canvas raster buffer height in device pixels.
    pub canvas_inner_height: u32,
    /// Canvas element width in logical pixels.
    pub canvas_outer_width: f32,
    /// Canvas element height in logical pixels.
    pub canvas_outer_height: f32,
}

struct ContainedLineCount {
    typical_viewport_line_count: f32,
    extra_lines_before: f32,
    extra_lines_beyond: f32,
    desired_ratio: f32,
    minimap_line_count: f32,
}

fn contained_minimap_line_count(input: &MinimapLayoutInput) -> ContainedLineCount {
    let line_height = input.line_height as f32;
    let typical_viewport_line_count = input.outer_height as f32 / line_height;
    let extra_lines_before = (input.padding_top as f32 / line_height).floor();
    let mut extra_lines_beyond = (input.padding_bottom as f32 / line_height).floor();
    if input.scroll_beyond_last_line {
        extra_lines_beyond = extra_lines_beyond.max(typical_viewport_line_count - 1.0);
    }
    let desired_ratio = (extra_lines_before + input.view_line_count as f32 + extra_lines_beyond)
        / (input.pixel_ratio * input.outer_height as f32);
    let minimap_line_count = (input.view_line_count as f32 / desired_ratio).floor();
    ContainedLineCount {
        typical_viewport_line_count,
        extra_lines_before,
        extra_lines_beyond,
        desired_ratio,
        minimap_line_count,
    }
}

/// Plan the minimap geometry for one layout pass.
///
/// The only side effects are the three [`LayoutMemory`] fields, touched
/// exclusively from the fill path.
pub fn plan_minimap_layout(input: &MinimapLayoutInput, memory: &mut LayoutMemory) -> MinimapLayout {
    let outer_width = input.outer_width;
    let outer_height = input.outer_height;
    let pixel_ratio = input.pixel_ratio;
    let vertical_scrollbar_width = input.vertical_scrollbar_width;

    if !input.minimap.enabled {
        // The canvas keeps its vertical extent so enabling the minimap later
        // needs no full relayout, but it occupies no horizontal space.
        return MinimapLayout {
            render_mode: RenderMinimap::None,
            left_offset: match input.minimap.side {
                MinimapSide::Left => 0,
                MinimapSide::Right => outer_width.saturating_sub(vertical_scrollbar_width),
            },
            width: 0,
            height_matches_editor_height: false,
            is_sampling: false,
            scale: 1,
            line_height: 1.0,
            canvas_inner_width: 0,
            canvas_inner_height: (pixel_ratio * outer_height as f32).ceil() as u32,
            canvas_outer_width: 0.0,
            canvas_outer_height: outer_height as f32,
        };
    }

    let stable_scale_ceiling = memory.stable_scale_ceiling(input);

    let render_characters = input.minimap.render_characters;
    let configured_scale = input.minimap.scale;
    let effective_scale = input.minimap.effective_scale(pixel_ratio);
    let view_line_count = input.view_line_count;
    let remaining_width = input.remaining_width;

    // Block mode needs a taller cell per scale unit to stay legible.
    let base_char_height: u32 = if render_characters { 2 } else { 3 };

    let mut scale = effective_scale;
    let mut canvas_inner_height = (pixel_ratio * outer_height as f32).floor() as u32;
    let canvas_outer_height = canvas_inner_height as f32 / pixel_ratio;
    let mut height_matches_editor_height = false;
    let mut is_sampling = false;
    let mut minimap_line_height = (base_char_height * scale) as f32;
    let mut char_width = scale as f32 / pixel_ratio;
    let mut width_multiplier = 1.0f32;

    if matches!(input.minimap.size, MinimapSize::Fill | MinimapSize::Fit) {
        let contained = contained_minimap_line_count(input);
        // The ratio is intentionally computed from the line count measured
        // before the new wrap column applies (one-pass lag): recomputing it
        // mid-pass would reintroduce the oscillation this is damping.
        let ratio = view_line_count as f32 / contained.minimap_line_count;

        if ratio > 1.0 {
            // Not enough vertical resolution for one row per line even at
            // scale 1: sample.
            height_matches_editor_height = true;
            is_sampling = true;
            scale = 1;
            minimap_line_height = 1.0;
            char_width = scale as f32 / pixel_ratio;
        } else {
            let mut fit_becomes_fill = false;
            let mut max_scale = effective_scale + 1;

            if input.minimap.size == MinimapSize::Fit {
                if stable_scale_ceiling.is_some() {
                    // Feedback loop: view line count -> minimap layout ->
                    // viewport width -> view line count. Once a smaller
                    // scale was chosen, stick with it while the remaining
                    // width has not grown.
                    fit_becomes_fill = true;
                } else {
                    let natural_height = ((contained.extra_lines_before
                        + view_line_count as f32
                        + contained.extra_lines_beyond)
                        * minimap_line_height)
                        .ceil();
                    fit_becomes_fill = natural_height > canvas_inner_height as f32;
                }
            }

            if input.minimap.size == MinimapSize::Fill || fit_becomes_fill {
                height_matches_editor_height = true;
                minimap_line_height = (input.line_height as f32 * pixel_ratio)
                    .min((1.0 / contained.desired_ratio).floor().max(1.0));
                if let Some(ceiling) = stable_scale_ceiling {
                    max_scale = ceiling;
                }
                scale = max_scale
                    .min(((minimap_line_height / base_char_height as f32).floor() as u32).max(1));
                if scale > configured_scale {
                    // Glyph width must not grow faster than the row height
                    // allows; the configured (pre-hidpi) scale is the
                    // baseline.
                    width_multiplier = (scale as f32 / configured_scale as f32).min(2.0);
                }
                char_width = scale as f32 / pixel_ratio / width_multiplier;
                canvas_inner_height = (contained
                    .typical_viewport_line_count
                    .max(
                        contained.extra_lines_before
                            + view_line_count as f32
                            + contained.extra_lines_beyond,
                    )
                    * minimap_line_height)
                    .ceil() as u32;
                if input.is_viewport_wrapping {
                    memory.record(input, scale);
                } else {
                    memory.clear();
                }
            }
        }
    }

    // Closed form of: content width + minimap width = remaining width,
    // where minimap columns follow the content's character-based viewport
    // column count (2px of cursor breathing room after the last character).
    let max_width = (input.minimap.max_column as f32 * char_width).floor() as i64;
    let derived_width = (((remaining_width - vertical_scrollbar_width as i32 - 2) as f32
        * char_width)
        / (input.typical_halfwidth_character_width + char_width))
        .floor() as i64;
    let width = max_width
        .min(derived_width.max(0) + MINIMAP_GUTTER_WIDTH as i64)
        .max(0) as u32;

    let mut canvas_inner_width = (pixel_ratio * width as f32).floor() as u32;
    let canvas_outer_width = canvas_inner_width as f32 / pixel_ratio;
    canvas_inner_width = (canvas_inner_width as f32 * width_multiplier).floor() as u32;

    let render_mode = if render_characters {
        RenderMinimap::Text
    } else {
        RenderMinimap::Blocks
    };
    let left_offset = match input.minimap.side {
        MinimapSide::Left => 0,
        MinimapSide::Right => {
            (outer_width as i64 - width as i64 - vertical_scrollbar_width as i64).max(0) as u32
        }
    };

    MinimapLayout {
        render_mode,
        left_offset,
        width,
        height_matches_editor_height,
        is_sampling,
        scale,
        line_height: minimap_line_height,
        canvas_inner_width,
        canvas_inner_height,
        canvas_outer_width,
        canvas_outer_height,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn proportional_input() -> MinimapLayoutInput {
        MinimapLayoutInput {
            outer_width: 800,
            outer_height: 600,
            line_height: 18,
            typical_halfwidth_character_width: 7.0,
            pixel_ratio: 1.0,
            scroll_beyond_last_line: false,
            padding_top: 0,
            padding_bottom: 0,
            minimap: MinimapOptions::default(),
            vertical_scrollbar_width: 14,
            view_line_count: 100,
            remaining_width: 800,
            is_viewport_wrapping: false,
        }
    }

    #[test]
    fn test_disabled_minimap_occupies_no_space() {
        let mut memory = LayoutMemory::new();
        let mut input = proportional_input();
        input.minimap.enabled = false;

        let layout = plan_minimap_layout(&input, &mut memory);
        assert_eq!(layout.render_mode, RenderMinimap::None);
        assert_eq!(layout.width, 0);
        assert_eq!(layout.left_offset, 800 - 14);
        assert_eq!(layout.canvas_inner_width, 0);
        assert_eq!(layout.canvas_inner_height, 600);
        assert_eq!(layout.canvas_outer_height, 600.0);
        assert!(!layout.is_sampling);

        input.minimap.side = MinimapSide::Left;
        let layout = plan_minimap_layout(&input, &mut memory);
        assert_eq!(layout.left_offset, 0);
        assert_eq!(layout.width, 0);
    }

    #[test]
    fn test_proportional_geometry() {
        let mut memory = LayoutMemory::new();
        let input = proportional_input();

        let layout = plan_minimap_layout(&input, &mut memory);
        assert_eq!(layout.render_mode, RenderMinimap::Text);
        assert_eq!(layout.scale, 1);
        assert_eq!(layout.line_height, 2.0);
        // min(floor(120 * 1), floor((800 - 14 - 2) * 1 / (7 + 1)) + 8)
        assert_eq!(layout.width, 106);
        assert_eq!(layout.left_offset, 800 - 106 - 14);
        assert_eq!(layout.canvas_inner_width, 106);
        assert_eq!(layout.canvas_inner_height, 600);
        assert_eq!(layout.canvas_outer_width, 106.0);
        assert!(!layout.height_matches_editor_height);
        assert!(!layout.is_sampling);
        // proportional mode never touches the memory
        assert!(!memory.is_stabilized());
    }

    #[test]
    fn test_block_mode_uses_taller_rows() {
        let mut memory = LayoutMemory::new();
        let mut input = proportional_input();
        input.minimap.render_characters = false;

        let layout = plan_minimap_layout(&input, &mut memory);
        assert_eq!(layout.render_mode, RenderMinimap::Blocks);
        assert_eq!(layout.line_height, 3.0);
    }

    #[test]
    fn test_hidpi_doubles_scale() {
        let mut memory = LayoutMemory::new();
        let mut input = proportional_input();
        input.pixel_ratio = 2.0;

        let layout = plan_minimap_layout(&input, &mut memory);
        assert_eq!(layout.scale, 2);
        assert_eq!(layout.line_height, 4.0);
    }

    #[test]
    fn test_sampling_threshold() {
        let mut memory = LayoutMemory::new();
        let mut input = proportional_input();
        input.minimap.size = MinimapSize::Fill;
        input.view_line_count = 100_000;

        let layout = plan_minimap_layout(&input, &mut memory);
        assert!(layout.is_sampling);
        assert!(layout.height_matches_editor_height);
        assert_eq!(layout.scale, 1);
        assert_eq!(layout.line_height, 1.0);
    }

    #[test]
    fn test_fill_grows_scale_with_width_multiplier() {
        let mut memory = LayoutMemory::new();
        let mut input = proportional_input();
        input.minimap.size = MinimapSize::Fill;
        input.outer_height = 800;
        input.line_height = 20;
        input.view_line_count = 50;
        input.remaining_width = 700;

        let layout = plan_minimap_layout(&input, &mut memory);
        // desired_ratio = 50 / 800, row height = min(20, floor(800 / 50)) = 16,
        // scale capped by the effective-scale + 1 ceiling
        assert_eq!(layout.line_height, 16.0);
        assert_eq!(layout.scale, 2);
        assert!(layout.height_matches_editor_height);
        assert!(!layout.is_sampling);
        // char width 2/1/2 = 1: width = min(120, floor(684 / 8) + 8) = 93
        assert_eq!(layout.width, 93);
        assert_eq!(layout.canvas_outer_width, 93.0);
        // inner width doubled by the width multiplier
        assert_eq!(layout.canvas_inner_width, 186);
        assert_eq!(layout.canvas_inner_height, 800);
        // not wrapping: fill clears the memory
        assert!(!memory.is_stabilized());
    }

    #[test]
    fn test_hidpi_fill_multiplier_uses_configured_scale() {
        let mut memory = LayoutMemory::new();
        let mut input = proportional_input();
        input.minimap.size = MinimapSize::Fill;
        input.pixel_ratio = 2.0;
        input.outer_height = 500;
        input.line_height = 10;
        input.view_line_count = 50;
        input.remaining_width = 500;

        let layout = plan_minimap_layout(&input, &mut memory);
        // effective scale 2 (hidpi), row height min(10 * 2, floor(1 / 0.05))
        // = 20, scale min(2 + 1, floor(20 / 2)) = 3; the width multiplier is
        // measured against the configured scale 1 and caps at 2, so
        // char width = 3 / 2 / 2 = 0.75
        assert_eq!(layout.scale, 3);
        assert_eq!(layout.line_height, 20.0);
        // width = min(floor(120 * 0.75), floor((500 - 14 - 2) * 0.75 / 7.75) + 8)
        assert_eq!(layout.width, 54);
        assert_eq!(layout.canvas_outer_width, 54.0);
        assert_eq!(layout.canvas_inner_width, 216);
        assert_eq!(layout.canvas_inner_height, 1000);
    }

    fn fit_wrapping_input() -> MinimapLayoutInput {
        MinimapLayoutInput {
            outer_width: 520,
            outer_height: 500,
            line_height: 10,
            typical_halfwidth_character_width: 7.0,
            pixel_ratio: 1.0,
            scroll_beyond_last_line: false,
            padding_top: 0,
            padding_bottom: 0,
            minimap: MinimapOptions {
                size: MinimapSize::Fit,
                scale: 2,
                ..Default::default()
            },
            vertical_scrollbar_width: 14,
            view_line_count: 400,
            remaining_width: 500,
            is_viewport_wrapping: true,
        }
    }

    #[test]
    fn test_fit_becomes_fill_when_too_tall() {
        let mut memory = LayoutMemory::new();
        let input = fit_wrapping_input();

        // natural fit height ceil(400 * 4) = 1600 > canvas 500: becomes fill
        let layout = plan_minimap_layout(&input, &mut memory);
        assert!(layout.height_matches_editor_height);
        assert!(!layout.is_sampling);
        assert_eq!(layout.line_height, 1.0);
        assert_eq!(layout.scale, 1);
        assert!(memory.is_stabilized());
    }

    #[test]
    fn test_stabilized_scale_is_monotonic() {
        let mut memory = LayoutMemory::new();
        let mut input = fit_wrapping_input();

        let first = plan_minimap_layout(&input, &mut memory);
        let ceiling = first.scale;
        assert!(memory.is_stabilized());

        // shrinking remaining width keeps the scale at or below the ceiling
        for remaining in [480, 440, 400] {
            input.remaining_width = remaining;
            let next = plan_minimap_layout(&input, &mut memory);
            assert!(next.scale <= ceiling);
        }
    }

    #[test]
    fn test_grown_remaining_width_leaves_stabilized_regime() {
        let mut memory = LayoutMemory::new();
        let mut input = fit_wrapping_input();
        // shrink the document so fit would naturally keep its scale
        input.view_line_count = 100;

        plan_minimap_layout(&input, &mut memory);
        // fit at 100 lines: ceil(100 * 4) = 400 <= 500, no fill, no memory
        assert!(!memory.is_stabilized());

        input.view_line_count = 400;
        plan_minimap_layout(&input, &mut memory);
        assert!(memory.is_stabilized());

        // a larger remaining width falls back to the natural fit decision
        input.remaining_width = 600;
        let layout = plan_minimap_layout(&input, &mut memory);
        assert!(layout.height_matches_editor_height);
    }

    #[test]
    fn test_memory_cleared_without_viewport_wrapping() {
        let mut memory = LayoutMemory::new();
        let mut input = fit_wrapping_input();

        plan_minimap_layout(&input, &mut memory);
        assert!(memory.is_stabilized());

        input.is_viewport_wrapping = false;
        plan_minimap_layout(&input, &mut memory);
        assert!(!memory.is_stabilized());
        assert_eq!(memory.stable_fit_remaining_width, 0);
        assert_eq!(memory.stable_fit_max_minimap_scale, 0);
    }

    #[test]
    fn test_planner_is_deterministic() {
        let input = fit_wrapping_input();
        let mut memory_a = LayoutMemory::new();
        let mut memory_b = LayoutMemory::new();

        let a = plan_minimap_layout(&input, &mut memory_a);
        let b = plan_minimap_layout(&input, &mut memory_b);
        assert_eq!(a, b);

        // same memory state, same input, same output
        let a2 = plan_minimap_layout(&input, &mut memory_a.clone());
        let b2 = plan_minimap_layout(&input, &mut memory_a);
        assert_eq!(a2, b2);
    }

    #[test]
    fn test_width_never_negative_on_tiny_viewport() {
        let mut memory = LayoutMemory::new();
        let mut input = proportional_input();
        input.outer_width = 10;
        input.remaining_width = -40;

        let layout = plan_minimap_layout(&input, &mut memory);
        assert_eq!(layout.width, MINIMAP_GUTTER_WIDTH);
        assert_eq!(layout.left_offset, 0);
    }
}
