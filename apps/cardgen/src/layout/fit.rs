//! Fit policy: choose a font size, wrap, and place a text block inside a region.
//!
//! # Steps
//! 1. Normalize the text (drop markdown emphasis markers, collapse whitespace).
//! 2. Pick a size from the region's descending ladder by normalized length,
//!    clamped to the configured floor.
//! 3. Wrap at that size against the region width minus its inner margin.
//! 4. Apply the optional line cap, then place the block vertically.
//!
//! # Vertical placement
//! A region holds `floor((height - bottom_margin) / pitch)` lines. A block that
//! fits is centered (or top-anchored when requested). A block that does not fit
//! starts at the region top and its trailing lines are dropped. There is no
//! shrink-and-retry loop.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::layout::font_metrics::{line_height, text_width, FontHandle, FontStyle};
use crate::layout::font_resolver::FontResolver;
use crate::layout::wrap::wrap_measured;

// ────────────────────────────────────────────────────────────────────────────
// Regions
// ────────────────────────────────────────────────────────────────────────────

/// Axis-aligned rectangle on the canvas, `x2`/`y2` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutRegion {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
}

impl LayoutRegion {
    pub const fn new(x1: i32, y1: i32, x2: i32, y2: i32) -> Self {
        LayoutRegion { x1, y1, x2, y2 }
    }

    pub fn width(&self) -> i32 {
        (self.x2 - self.x1).max(0)
    }

    pub fn height(&self) -> i32 {
        (self.y2 - self.y1).max(0)
    }

    #[cfg(test)]
    pub fn overlaps(&self, other: &LayoutRegion) -> bool {
        self.x1 < other.x2 && other.x1 < self.x2 && self.y1 < other.y2 && other.y1 < self.y2
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Normalization
// ────────────────────────────────────────────────────────────────────────────

/// Strips `*`, `_` and backticks, collapses whitespace runs to one space, trims.
///
/// Idempotent: `normalize(&normalize(t)) == normalize(t)`.
pub fn normalize(text: &str) -> String {
    let stripped: String = text
        .chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .collect();
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

// ────────────────────────────────────────────────────────────────────────────
// Size ladder
// ────────────────────────────────────────────────────────────────────────────

/// Descending font-size ladder keyed by normalized text length.
///
/// `steps` are `(threshold, px)` pairs in ascending threshold order; the last
/// step whose threshold is strictly below the length wins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeLadder {
    pub base_px: u32,
    pub steps: &'static [(usize, u32)],
}

impl SizeLadder {
    pub const fn fixed(px: u32) -> Self {
        SizeLadder {
            base_px: px,
            steps: &[],
        }
    }

    /// Font size for a text of `len` characters, never below `floor_px`.
    pub fn size_for(&self, len: usize, floor_px: u32) -> u32 {
        let px = self
            .steps
            .iter()
            .filter(|(threshold, _)| len > *threshold)
            .map(|(_, px)| *px)
            .last()
            .unwrap_or(self.base_px);
        px.max(floor_px)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Fit spec and output
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Anchor {
    /// Center the block when it fits.
    Center,
    /// Start at the region top.
    Top,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Center,
    Left,
}

/// Distance between consecutive line tops.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pitch {
    /// Font line height plus extra leading.
    Leading(i32),
    Fixed(i32),
}

/// Everything the policy needs to know about one labeled region.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitSpec {
    pub ladder: SizeLadder,
    pub style: FontStyle,
    /// Total horizontal inner margin (split evenly left and right).
    pub inner_margin: i32,
    pub pitch: Pitch,
    pub anchor: Anchor,
    pub align: HAlign,
    /// Lines whose bottom would pass `y2 - bottom_margin` are not drawn.
    pub bottom_margin: i32,
    pub max_lines: Option<usize>,
}

/// Wrapped and positioned lines for one region. Produced fresh per render.
#[derive(Debug, Clone)]
pub struct LineSet {
    pub lines: Vec<String>,
    pub font: FontHandle,
    pub pitch: i32,
    /// Top of the first line.
    pub start_y: i32,
    /// Lines removed by the line cap or by truncation at the region bottom.
    pub dropped: usize,
    /// Kept lines that measure wider than the usable width.
    pub overflowing: usize,
}

/// A line ready to draw at `(x, y)` (top-left of its line box).
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine<'a> {
    pub text: &'a str,
    pub x: i32,
    pub y: i32,
}

impl LineSet {
    /// Top-left positions for every kept line inside `region`.
    pub fn placements(&self, region: &LayoutRegion, spec: &FitSpec) -> Vec<PlacedLine<'_>> {
        let left = region.x1 + spec.inner_margin / 2;
        self.lines
            .iter()
            .enumerate()
            .map(|(i, line)| {
                let x = match spec.align {
                    HAlign::Left => left,
                    HAlign::Center => {
                        let w = text_width(&self.font, line);
                        region.x1 + ((region.width() as f32 - w) / 2.0).round() as i32
                    }
                };
                PlacedLine {
                    text: line,
                    x,
                    y: self.start_y + i as i32 * self.pitch,
                }
            })
            .collect()
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Policy
// ────────────────────────────────────────────────────────────────────────────

pub struct FitPolicy<'a> {
    resolver: &'a FontResolver,
    min_font_px: u32,
}

impl<'a> FitPolicy<'a> {
    pub fn new(resolver: &'a FontResolver, min_font_px: u32) -> Self {
        FitPolicy {
            resolver,
            min_font_px,
        }
    }

    /// Fits `text` into `region` following `spec`.
    pub fn fit(&self, text: &str, region: &LayoutRegion, spec: &FitSpec) -> LineSet {
        let normalized = normalize(text);
        let px = spec
            .ladder
            .size_for(normalized.chars().count(), self.min_font_px);
        let font = self.resolver.resolve(px, spec.style);

        let usable_width = (region.width() - spec.inner_margin).max(1);
        let wrapped = wrap_measured(&normalized, &font, usable_width);
        let mut lines = wrapped.lines;
        let mut dropped = 0usize;

        if let Some(cap) = spec.max_lines {
            if lines.len() > cap {
                dropped += lines.len() - cap;
                lines.truncate(cap);
            }
        }

        let pitch = match spec.pitch {
            Pitch::Leading(extra) => line_height(&font) + extra,
            Pitch::Fixed(p) => p,
        }
        .max(1);

        let capacity = line_capacity(region.height(), spec.bottom_margin, pitch);
        let start_y = if lines.len() <= capacity {
            match spec.anchor {
                Anchor::Top => region.y1,
                Anchor::Center => {
                    let block = lines.len() as i32 * pitch;
                    region.y1 + (region.height() - block) / 2
                }
            }
        } else {
            dropped += lines.len() - capacity;
            lines.truncate(capacity);
            region.y1
        };

        if dropped > 0 {
            debug!(
                dropped,
                kept = lines.len(),
                px,
                "Text block truncated to fit its region"
            );
        }

        // Re-count overflow on the kept lines only.
        let overflowing = lines
            .iter()
            .filter(|l| text_width(&font, l) > usable_width as f32)
            .count();

        LineSet {
            lines,
            font,
            pitch,
            start_y,
            dropped,
            overflowing,
        }
    }
}

/// Number of whole lines of `pitch` that fit in `height - bottom_margin`.
pub fn line_capacity(height: i32, bottom_margin: i32, pitch: i32) -> usize {
    let usable = height - bottom_margin;
    if usable <= 0 || pitch <= 0 {
        return 0;
    }
    (usable / pitch) as usize
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
