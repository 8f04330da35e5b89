//! Font resolution with ranked fallback chains.
//!
//! Each style has an ordered list of candidate file names (display font, web
//! fonts, platform default). For each candidate, every search directory is
//! probed in order; the first file that parses wins. When nothing parses, the
//! style resolves to the built-in bitmap face. Resolution never fails.
//!
//! Faces are probed once when the resolver is built, so `resolve` is a cheap
//! clone of an `Arc` plus the requested size.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use rusttype::Font;
use tracing::{debug, warn};

use crate::layout::font_metrics::{FontFace, FontHandle, FontStyle};

/// Candidate file names per style, most preferred first.
pub fn candidates(style: FontStyle) -> &'static [&'static str] {
    match style {
        FontStyle::Bold => &[
            "Outfit-Bold.ttf",
            "Inter-Bold.ttf",
            "Roboto-Bold.ttf",
            "arialbd.ttf",
            "DejaVuSans-Bold.ttf",
        ],
        FontStyle::Regular => &[
            "Outfit-Regular.ttf",
            "Inter-Regular.ttf",
            "Roboto-Regular.ttf",
            "arial.ttf",
            "DejaVuSans.ttf",
        ],
        FontStyle::Mono => &[
            "JetBrainsMono-Bold.ttf",
            "Consolas.ttf",
            "courbd.ttf",
            "DejaVuSansMono-Bold.ttf",
        ],
    }
}

/// Outcome of probing one style's chain. Kept for diagnostics.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Loaded(PathBuf),
    /// No candidate parsed; the built-in face is used.
    Builtin,
}

pub struct FontResolver {
    faces: HashMap<FontStyle, FontFace>,
    resolutions: HashMap<FontStyle, Resolution>,
}

impl FontResolver {
    /// Probes every style against `search_dirs` (in order).
    pub fn new(search_dirs: &[PathBuf]) -> Self {
        let mut faces = HashMap::new();
        let mut resolutions = HashMap::new();

        for style in FontStyle::ALL {
            let (face, resolution) = probe_style(style, search_dirs);
            if resolution == Resolution::Builtin {
                warn!(
                    style = ?style,
                    "No usable font file found; falling back to built-in bitmap face"
                );
            }
            faces.insert(style, face);
            resolutions.insert(style, resolution);
        }

        FontResolver { faces, resolutions }
    }

    /// A resolver that only knows the built-in face.
    #[cfg(test)]
    pub fn builtin_only() -> Self {
        FontResolver::new(&[])
    }

    /// Returns a handle for `style` at `px` pixels.
    pub fn resolve(&self, px: u32, style: FontStyle) -> FontHandle {
        let face = self
            .faces
            .get(&style)
            .cloned()
            .unwrap_or(FontFace::Builtin);
        FontHandle { face, style, px }
    }

    pub fn resolution(&self, style: FontStyle) -> &Resolution {
        self.resolutions.get(&style).unwrap_or(&Resolution::Builtin)
    }
}

fn probe_style(style: FontStyle, search_dirs: &[PathBuf]) -> (FontFace, Resolution) {
    for name in candidates(style) {
        for dir in search_dirs {
            let path = dir.join(name);
            if !path.is_file() {
                continue;
            }
            match load_font_file(&path) {
                Some(font) => {
                    debug!(style = ?style, path = %path.display(), "Font resolved");
                    let face = FontFace::Outline {
                        font: Arc::new(font),
                        source: path.display().to_string(),
                    };
                    return (face, Resolution::Loaded(path));
                }
                None => {
                    warn!(path = %path.display(), "Font file exists but could not be parsed; skipping");
                }
            }
        }
    }
    (FontFace::Builtin, Resolution::Builtin)
}

fn load_font_file(path: &Path) -> Option<Font<'static>> {
    let bytes = std::fs::read(path).ok()?;
    Font::try_from_vec(bytes)
}
