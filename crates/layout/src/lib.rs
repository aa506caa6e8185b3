mod font_info;
mod layout;
mod minimap;

pub use font_info::{FontInfo, FontMeasure};
pub use layout::{
    compute_layout, resolve_word_wrap, EditorLayoutInfo, EditorLayoutInput, OverviewRulerPosition,
    WrappingResolution,
};
pub use minimap::{
    plan_minimap_layout, LayoutMemory, MinimapLayout, MinimapLayoutInput, RenderMinimap,
    MINIMAP_GUTTER_WIDTH,
};

pub use editor_core::{
    CoreError, EditorOptions, MinimapAutohide, MinimapOptions, MinimapShowSlider, MinimapSide,
    MinimapSize, PaddingOptions, RenderLineNumbers, ScrollbarOptions, ShowFoldingControls,
    WordWrap, WordWrapOverride,
};
