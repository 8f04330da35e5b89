// Text-fitting and layout engine.
// Pure computation: font resolution, measurement, wrapping and placement.
// No pixels are written here; see `crate::render` for rasterization.

pub mod builtin_font;
pub mod fit;
pub mod font_metrics;
pub mod font_resolver;
pub mod wrap;

// Re-export the public API consumed by the renderer and the pipeline.
pub use fit::{Anchor, FitPolicy, FitSpec, HAlign, LayoutRegion, LineSet, Pitch, SizeLadder};
pub use font_metrics::FontStyle;
pub use font_resolver::FontResolver;
