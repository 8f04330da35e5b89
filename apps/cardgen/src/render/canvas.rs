//! Raster primitives: gradient fill, rounded panels, alpha blending, image overlay.
//!
//! All drawing clips to the image bounds; nothing here can fail.

use image::{Rgba, RgbaImage};

use crate::config::Rgb;
use crate::layout::LayoutRegion;

pub fn rgba(c: Rgb, alpha: u8) -> Rgba<u8> {
    Rgba([c[0], c[1], c[2], alpha])
}

/// Vertical linear gradient from `top` (row 0) towards `bottom`.
pub fn gradient(width: u32, height: u32, top: Rgb, bottom: Rgb) -> RgbaImage {
    let mut img = RgbaImage::new(width, height);
    for y in 0..height {
        let t = y as f32 / height.max(1) as f32;
        let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
        let px = Rgba([mix(top[0], bottom[0]), mix(top[1], bottom[1]), mix(top[2], bottom[2]), 255]);
        for x in 0..width {
            img.put_pixel(x, y, px);
        }
    }
    img
}

/// Source-over blend of `src` onto `dst`, with `coverage` scaling the source alpha.
pub fn blend(dst: &mut Rgba<u8>, src: Rgba<u8>, coverage: f32) {
    let sa = (src.0[3] as f32 / 255.0) * coverage.clamp(0.0, 1.0);
    if sa <= 0.0 {
        return;
    }
    let inv = 1.0 - sa;
    for i in 0..3 {
        dst.0[i] = (src.0[i] as f32 * sa + dst.0[i] as f32 * inv).round() as u8;
    }
    dst.0[3] = (255.0 * sa + dst.0[3] as f32 * inv).round().min(255.0) as u8;
}

/// Blends one pixel, ignoring coordinates outside the image.
pub fn blend_at(img: &mut RgbaImage, x: i32, y: i32, src: Rgba<u8>, coverage: f32) {
    if x < 0 || y < 0 || x as u32 >= img.width() || y as u32 >= img.height() {
        return;
    }
    blend(img.get_pixel_mut(x as u32, y as u32), src, coverage);
}

/// Which corners of a rectangle are rounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Corners {
    pub top_left: bool,
    pub top_right: bool,
    pub bottom_right: bool,
    pub bottom_left: bool,
}

impl Corners {
    pub const ALL: Corners = Corners {
        top_left: true,
        top_right: true,
        bottom_right: true,
        bottom_left: true,
    };
    pub const TOP: Corners = Corners {
        top_left: true,
        top_right: true,
        bottom_right: false,
        bottom_left: false,
    };
}

/// Whether local point `(x, y)` lies inside a `w × h` rectangle with radius `r`.
pub fn rounded_rect_contains(x: i32, y: i32, w: i32, h: i32, r: i32, corners: Corners) -> bool {
    if x < 0 || y < 0 || x >= w || y >= h {
        return false;
    }
    let r = r.min(w / 2).min(h / 2).max(0);
    let cx = if x < r {
        r - 1
    } else if x >= w - r {
        w - r
    } else {
        return true;
    };
    let cy = if y < r {
        r - 1
    } else if y >= h - r {
        h - r
    } else {
        return true;
    };
    let rounded = match (x < r, y < r) {
        (true, true) => corners.top_left,
        (false, true) => corners.top_right,
        (true, false) => corners.bottom_left,
        (false, false) => corners.bottom_right,
    };
    if !rounded {
        return true;
    }
    let dx = x - cx;
    let dy = y - cy;
    dx * dx + dy * dy <= r * r
}

pub fn fill_rounded_rect(
    img: &mut RgbaImage,
    rect: &LayoutRegion,
    radius: i32,
    corners: Corners,
    color: Rgba<u8>,
) {
    let (w, h) = (rect.width(), rect.height());
    for (x, y) in clipped(img, rect) {
        if rounded_rect_contains(x - rect.x1, y - rect.y1, w, h, radius, corners) {
            blend(img.get_pixel_mut(x as u32, y as u32), color, 1.0);
        }
    }
}

/// Draws a `stroke`-pixel outline just inside `rect`.
pub fn stroke_rounded_rect(
    img: &mut RgbaImage,
    rect: &LayoutRegion,
    radius: i32,
    stroke: i32,
    color: Rgba<u8>,
) {
    let (w, h) = (rect.width(), rect.height());
    let (iw, ih) = (w - 2 * stroke, h - 2 * stroke);
    let inner_radius = (radius - stroke).max(0);
    for (x, y) in clipped(img, rect) {
        let (lx, ly) = (x - rect.x1, y - rect.y1);
        if !rounded_rect_contains(lx, ly, w, h, radius, Corners::ALL) {
            continue;
        }
        if rounded_rect_contains(lx - stroke, ly - stroke, iw, ih, inner_radius, Corners::ALL) {
            continue;
        }
        blend(img.get_pixel_mut(x as u32, y as u32), color, 1.0);
    }
}

/// Alpha-composites `over` onto `base` with its top-left corner at `(x, y)`.
pub fn overlay(base: &mut RgbaImage, over: &RgbaImage, x: i32, y: i32) {
    for oy in 0..over.height() {
        for ox in 0..over.width() {
            let p = *over.get_pixel(ox, oy);
            if p.0[3] == 0 {
                continue;
            }
            blend_at(base, x + ox as i32, y + oy as i32, p, 1.0);
        }
    }
}

/// Pixel coordinates of `rect` that fall inside the image.
fn clipped(img: &RgbaImage, rect: &LayoutRegion) -> impl Iterator<Item = (i32, i32)> {
    let x1 = rect.x1.max(0);
    let y1 = rect.y1.max(0);
    let x2 = rect.x2.min(img.width() as i32);
    let y2 = rect.y2.min(img.height() as i32);
    (y1..y2.max(y1)).flat_map(move |y| (x1..x2.max(x1)).map(move |x| (x, y)))
}
