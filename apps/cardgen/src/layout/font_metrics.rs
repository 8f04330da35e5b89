//! Font handles and text measurement.
//!
//! A `FontHandle` pairs a loaded face with a pixel size. Outline faces are
//! measured from their own glyph advances and vertical metrics via `rusttype`;
//! the built-in bitmap face uses its fixed cell metrics. Both paths are pure
//! functions of (face, size, text), so measurements are deterministic within
//! a process.

use std::fmt;
use std::sync::Arc;

use rusttype::{point, Font, Scale};
use serde::{Deserialize, Serialize};

use crate::layout::builtin_font;

// ────────────────────────────────────────────────────────────────────────────
// Styles and faces
// ────────────────────────────────────────────────────────────────────────────

/// Requested typeface style.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FontStyle {
    Bold,
    Regular,
    Mono,
}

impl FontStyle {
    pub const ALL: [FontStyle; 3] = [FontStyle::Bold, FontStyle::Regular, FontStyle::Mono];
}

/// A loaded typeface, independent of size.
#[derive(Clone)]
pub enum FontFace {
    /// A TrueType/OpenType file parsed by `rusttype`.
    Outline {
        font: Arc<Font<'static>>,
        /// File the face was loaded from, for logging.
        source: String,
    },
    /// The built-in bitmap face. Always available.
    Builtin,
}

impl FontFace {
    #[cfg(test)]
    pub fn is_builtin(&self) -> bool {
        matches!(self, FontFace::Builtin)
    }
}

impl fmt::Debug for FontFace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FontFace::Outline { source, .. } => f.debug_tuple("Outline").field(source).finish(),
            FontFace::Builtin => f.write_str("Builtin"),
        }
    }
}

/// A face at a specific pixel size. Cheap to clone.
#[derive(Debug, Clone)]
pub struct FontHandle {
    pub face: FontFace,
    pub style: FontStyle,
    pub px: u32,
}

impl FontHandle {
    #[cfg(test)]
    pub fn builtin(px: u32, style: FontStyle) -> Self {
        FontHandle {
            face: FontFace::Builtin,
            style,
            px,
        }
    }

    pub fn scale(&self) -> Scale {
        Scale::uniform(self.px as f32)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Measurement
// ────────────────────────────────────────────────────────────────────────────

/// Measures the rendered `(width, height)` of a single line in pixels.
///
/// Width is the caret advance after the last glyph; height is the line box
/// (ascent to descent). An empty string has zero width and the line-box height.
pub fn measure(handle: &FontHandle, text: &str) -> (f32, f32) {
    (text_width(handle, text), line_box_height(handle))
}

/// Advance width of `text` in pixels.
pub fn text_width(handle: &FontHandle, text: &str) -> f32 {
    if text.is_empty() {
        return 0.0;
    }
    match &handle.face {
        FontFace::Outline { font, .. } => {
            let scale = handle.scale();
            font.layout(text, scale, point(0.0, 0.0))
                .last()
                .map(|g| g.position().x + g.unpositioned().h_metrics().advance_width)
                .unwrap_or(0.0)
        }
        FontFace::Builtin => {
            let glyphs = text.chars().count() as f32;
            glyphs * builtin_font::ADVANCE_UNITS * builtin_font::unit(handle.px as f32)
        }
    }
}

/// Height of one line box (ascent minus descent) in pixels.
pub fn line_box_height(handle: &FontHandle) -> f32 {
    match &handle.face {
        FontFace::Outline { font, .. } => {
            let vm = font.v_metrics(handle.scale());
            (vm.ascent - vm.descent).max(1.0)
        }
        FontFace::Builtin => handle.px as f32,
    }
}

/// Distance from the top of the line box to the baseline.
pub fn ascent(handle: &FontHandle) -> f32 {
    match &handle.face {
        FontFace::Outline { font, .. } => font.v_metrics(handle.scale()).ascent,
        FontFace::Builtin => {
            (builtin_font::TOP_OFFSET_UNITS + 7.0) * builtin_font::unit(handle.px as f32)
        }
    }
}

/// Whole-pixel line height used for pitch computations.
pub fn line_height(handle: &FontHandle) -> i32 {
    line_box_height(handle).ceil() as i32
}

/// Well-known locations of a TrueType file on common systems.
#[cfg(test)]
const SYSTEM_TEST_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/TTF/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

/// First system font file that parses, if any. Tests needing a real outline
/// face skip when this is `None`.
#[cfg(test)]
pub(crate) fn system_test_font() -> Option<std::path::PathBuf> {
    SYSTEM_TEST_FONTS
        .iter()
        .map(std::path::PathBuf::from)
        .find(|p| {
            std::fs::read(p)
                .ok()
                .and_then(Font::try_from_vec)
                .is_some()
        })
}

#[cfg(test)]
pub(crate) fn outline_test_handle(px: u32, style: FontStyle) -> Option<FontHandle> {
    let path = system_test_font()?;
    let font = Font::try_from_vec(std::fs::read(&path).ok()?)?;
    Some(FontHandle {
        face: FontFace::Outline {
            font: Arc::new(font),
            source: path.display().to_string(),
        },
        style,
        px,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_measure_empty_has_zero_width() {
        let handle = FontHandle::builtin(40, FontStyle::Regular);
        let (w, h) = measure(&handle, "");
        assert_eq!(w, 0.0);
        assert!(h > 0.0, "empty text still has a line box");
    }

    #[test]
    fn test_builtin_width_is_advance_times_chars() {
        let handle = FontHandle::builtin(40, FontStyle::Regular);
        // 40px → 4px unit → 24px advance
        let w = text_width(&handle, "Rust");
        assert!((w - 96.0).abs() < 1e-3, "expected 96px, got {w}");
    }

    #[test]
    fn test_builtin_width_scales_with_size() {
        let small = FontHandle::builtin(20, FontStyle::Bold);
        let large = FontHandle::builtin(60, FontStyle::Bold);
        let text = "Cardiac output";
        assert!(
            (text_width(&large, text) - 3.0 * text_width(&small, text)).abs() < 1e-3,
            "width must scale linearly with pixel size"
        );
    }

    #[test]
    fn test_measure_is_deterministic() {
        let handle = FontHandle::builtin(38, FontStyle::Regular);
        let text = "Mitral stenosis presents with a diastolic murmur";
        assert_eq!(measure(&handle, text), measure(&handle, text));
    }

    #[test]
    fn test_builtin_line_height_matches_px() {
        let handle = FontHandle::builtin(54, FontStyle::Bold);
        assert_eq!(line_height(&handle), 54);
        assert!(ascent(&handle) < line_box_height(&handle));
    }

    #[test]
    fn test_style_list_covers_all_variants() {
        assert_eq!(FontStyle::ALL.len(), 3);
    }

    #[test]
    fn test_outline_widths_follow_glyph_advances() {
        let Some(handle) = outline_test_handle(40, FontStyle::Bold) else {
            eprintln!("no system TrueType font found; skipping outline metrics test");
            return;
        };
        let narrow = text_width(&handle, "iiii");
        let wide = text_width(&handle, "MMMM");
        assert!(narrow > 0.0);
        assert!(narrow < wide, "outline face must not be fixed-width: {narrow} vs {wide}");
        assert_eq!(text_width(&handle, ""), 0.0);
    }

    #[test]
    fn test_outline_vertical_metrics_are_consistent() {
        let Some(handle) = outline_test_handle(54, FontStyle::Regular) else {
            eprintln!("no system TrueType font found; skipping outline metrics test");
            return;
        };
        let h = line_box_height(&handle);
        let a = ascent(&handle);
        assert!(a > 0.0 && a < h, "ascent {a} must sit inside the line box {h}");
        assert!(h > 40.0 && h < 80.0, "line box {h} should be close to 54px");
        assert_eq!(line_height(&handle), h.ceil() as i32);
        assert_eq!(measure(&handle, "Vagus"), measure(&handle, "Vagus"));
    }
}
