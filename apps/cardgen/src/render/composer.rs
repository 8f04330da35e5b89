//! Card composition: shared base layers plus face-specific text regions.
//!
//! Both faces start from the same base (gradient, header with logo, brand name
//! and subject badge, translucent panel, footer). The front adds the question
//! and a call-to-action; the back adds the answer banner, answer, explanation
//! label and explanation. Only in-memory pixels are written here.

use std::path::Path;

use image::imageops::FilterType;
use image::{Rgba, RgbaImage};
use tracing::{debug, info, warn};

use crate::config::{Branding, CanvasConfig, Config, Theme};
use crate::layout::font_metrics::{measure, text_width};
use crate::layout::{
    Anchor, FitPolicy, FitSpec, FontResolver, FontStyle, HAlign, LayoutRegion, LineSet, Pitch,
    SizeLadder,
};
use crate::models::Record;
use crate::render::canvas::{
    fill_rounded_rect, gradient, overlay, rgba, stroke_rounded_rect, Corners,
};
use crate::render::regions::CardGeometry;
use crate::render::text::draw_text;

// ────────────────────────────────────────────────────────────────────────────
// Region specs
// ────────────────────────────────────────────────────────────────────────────

pub const QUESTION_SPEC: FitSpec = FitSpec {
    ladder: SizeLadder {
        base_px: 68,
        steps: &[(100, 58), (200, 48)],
    },
    style: FontStyle::Bold,
    inner_margin: 140,
    pitch: Pitch::Leading(15),
    anchor: Anchor::Center,
    align: HAlign::Center,
    bottom_margin: 40,
    max_lines: None,
};

// Answers are capped at three lines; the rest is dropped.
pub const ANSWER_SPEC: FitSpec = FitSpec {
    ladder: SizeLadder::fixed(54),
    style: FontStyle::Bold,
    inner_margin: 120,
    pitch: Pitch::Fixed(60),
    anchor: Anchor::Top,
    align: HAlign::Left,
    bottom_margin: 0,
    max_lines: Some(3),
};

pub const EXPLANATION_SPEC: FitSpec = FitSpec {
    ladder: SizeLadder {
        base_px: 38,
        steps: &[(200, 32), (400, 28)],
    },
    style: FontStyle::Regular,
    inner_margin: 120,
    pitch: Pitch::Leading(12),
    anchor: Anchor::Top,
    align: HAlign::Left,
    bottom_margin: 40,
    max_lines: None,
};

const LOGO_HEIGHT: u32 = 80;
const BRAND_PX: u32 = 24;
const BADGE_PX: u32 = 22;
const BADGE_PAD_X: i32 = 30;
const BADGE_PAD_Y: i32 = 15;
const BADGE_RADIUS: i32 = 25;
const FOOTER_PX: u32 = 22;
const CALL_TO_ACTION_PX: u32 = 24;
const ANSWER_LABEL_PX: u32 = 20;
const EXPLANATION_LABEL_PX: u32 = 24;
const PANEL_STROKE: i32 = 2;

/// Line sets produced for one face, kept for logging and tests.
#[derive(Debug, Clone)]
pub struct FaceLayout {
    pub regions: Vec<(LayoutRegion, LineSet)>,
}

impl FaceLayout {
    pub fn dropped(&self) -> usize {
        self.regions.iter().map(|(_, s)| s.dropped).sum()
    }

    pub fn overflowing(&self) -> usize {
        self.regions.iter().map(|(_, s)| s.overflowing).sum()
    }
}

pub struct CardComposer {
    canvas: CanvasConfig,
    theme: Theme,
    branding: Branding,
    min_font_px: u32,
    geometry: CardGeometry,
    resolver: FontResolver,
    logo: Option<RgbaImage>,
}

impl CardComposer {
    pub fn new(config: &Config) -> Self {
        let resolver = FontResolver::new(&config.paths.font_dirs);
        for style in FontStyle::ALL {
            info!(style = ?style, resolution = ?resolver.resolution(style), "Font resolved");
        }
        let logo = load_logo(&config.paths.logo, LOGO_HEIGHT);
        Self::with_parts(config, resolver, logo)
    }

    pub fn with_parts(config: &Config, resolver: FontResolver, logo: Option<RgbaImage>) -> Self {
        CardComposer {
            canvas: config.canvas.clone(),
            theme: config.theme.clone(),
            branding: config.branding.clone(),
            min_font_px: config.min_font_px,
            geometry: CardGeometry::new(&config.canvas),
            resolver,
            logo,
        }
    }

    #[cfg(test)]
    pub fn geometry(&self) -> &CardGeometry {
        &self.geometry
    }

    pub fn compose_front(&self, record: &Record) -> RgbaImage {
        self.compose_front_with_layout(record).0
    }

    pub fn compose_back(&self, record: &Record) -> RgbaImage {
        self.compose_back_with_layout(record).0
    }

    pub fn compose_front_with_layout(&self, record: &Record) -> (RgbaImage, FaceLayout) {
        let mut img = self.base_layer(&record.subject);
        let policy = FitPolicy::new(&self.resolver, self.min_font_px);
        let g = &self.geometry;

        let question = policy.fit(&record.question, &g.question, &QUESTION_SPEC);
        draw_line_set(&mut img, &question, &g.question, &QUESTION_SPEC, Rgba([255, 255, 255, 255]));

        let hint_font = self.resolver.resolve(CALL_TO_ACTION_PX, FontStyle::Bold);
        let hint = &self.branding.call_to_action;
        let x = centered_x(&g.canvas, text_width(&hint_font, hint));
        draw_text(
            &mut img,
            &hint_font,
            x,
            g.call_to_action.y1,
            rgba(self.theme.accent_gold, 255),
            hint,
        );

        let layout = FaceLayout {
            regions: vec![(g.question, question)],
        };
        log_layout(&record.id, "front", &layout);
        (img, layout)
    }

    pub fn compose_back_with_layout(&self, record: &Record) -> (RgbaImage, FaceLayout) {
        let mut img = self.base_layer(&record.subject);
        let policy = FitPolicy::new(&self.resolver, self.min_font_px);
        let g = &self.geometry;
        let green = self.theme.accent_green;

        fill_rounded_rect(
            &mut img,
            &g.answer_banner,
            self.canvas.panel_radius,
            Corners::TOP,
            rgba(green, 230),
        );

        let label_font = self.resolver.resolve(ANSWER_LABEL_PX, FontStyle::Bold);
        draw_text(
            &mut img,
            &label_font,
            g.answer_label.x1 + ANSWER_SPEC.inner_margin / 2,
            g.answer_label.y1,
            Rgba([0, 50, 20, 180]),
            &self.branding.answer_label,
        );

        let answer = policy.fit(&record.answer, &g.answer, &ANSWER_SPEC);
        draw_line_set(&mut img, &answer, &g.answer, &ANSWER_SPEC, Rgba([255, 255, 255, 255]));

        let caption_font = self.resolver.resolve(EXPLANATION_LABEL_PX, FontStyle::Bold);
        draw_text(
            &mut img,
            &caption_font,
            g.explanation_label.x1 + EXPLANATION_SPEC.inner_margin / 2,
            g.explanation_label.y1,
            rgba(self.theme.accent_gold, 255),
            &self.branding.explanation_label,
        );

        let explanation = policy.fit(&record.explanation, &g.explanation, &EXPLANATION_SPEC);
        draw_line_set(
            &mut img,
            &explanation,
            &g.explanation,
            &EXPLANATION_SPEC,
            rgba(self.theme.text_main, 255),
        );

        let layout = FaceLayout {
            regions: vec![(g.answer, answer), (g.explanation, explanation)],
        };
        log_layout(&record.id, "back", &layout);
        (img, layout)
    }

    // ── shared layers ───────────────────────────────────────────────────────

    fn base_layer(&self, subject: &str) -> RgbaImage {
        let mut img = gradient(
            self.canvas.width,
            self.canvas.height,
            self.theme.bg_top,
            self.theme.bg_bottom,
        );
        self.draw_header(&mut img, subject);
        self.draw_panel(&mut img);
        self.draw_footer(&mut img);
        img
    }

    fn draw_header(&self, img: &mut RgbaImage, subject: &str) {
        let pad = self.canvas.padding;

        if let Some(logo) = &self.logo {
            overlay(img, logo, pad, pad - 10);
        }

        let brand_font = self.resolver.resolve(BRAND_PX, FontStyle::Bold);
        draw_text(
            img,
            &brand_font,
            pad + 100,
            pad + 15,
            Rgba([255, 255, 255, 200]),
            &self.branding.brand_name,
        );

        let badge_font = self.resolver.resolve(BADGE_PX, FontStyle::Mono);
        let badge_text = subject.to_uppercase();
        let (text_w, text_h) = measure(&badge_font, &badge_text);
        let badge_w = text_w.ceil() as i32 + BADGE_PAD_X * 2;
        let badge_h = text_h.ceil() as i32 + BADGE_PAD_Y * 2 + 10;
        let x2 = self.canvas.width as i32 - pad;
        let badge = LayoutRegion::new(x2 - badge_w, pad, x2, pad + badge_h);

        let cyan = self.theme.accent_cyan;
        fill_rounded_rect(img, &badge, BADGE_RADIUS, Corners::ALL, rgba(cyan, 30));
        stroke_rounded_rect(img, &badge, BADGE_RADIUS, 2, rgba(cyan, 120));
        draw_text(
            img,
            &badge_font,
            badge.x1 + BADGE_PAD_X,
            badge.y1 + BADGE_PAD_Y,
            rgba(cyan, 255),
            &badge_text,
        );
    }

    fn draw_panel(&self, img: &mut RgbaImage) {
        let panel = self.geometry.panel;
        let radius = self.canvas.panel_radius;
        fill_rounded_rect(img, &panel, radius, Corners::ALL, Rgba([255, 255, 255, 12]));
        stroke_rounded_rect(img, &panel, radius, PANEL_STROKE, Rgba([255, 255, 255, 25]));
    }

    fn draw_footer(&self, img: &mut RgbaImage) {
        let font = self.resolver.resolve(FOOTER_PX, FontStyle::Regular);
        let caption = &self.branding.footer_caption;
        let x = centered_x(&self.geometry.canvas, text_width(&font, caption));
        draw_text(
            img,
            &font,
            x,
            self.geometry.footer_y,
            Rgba([255, 255, 255, 80]),
            caption,
        );
    }
}

fn draw_line_set(
    img: &mut RgbaImage,
    set: &LineSet,
    region: &LayoutRegion,
    spec: &FitSpec,
    color: Rgba<u8>,
) {
    for line in set.placements(region, spec) {
        draw_text(img, &set.font, line.x, line.y, color, line.text);
    }
}

fn centered_x(region: &LayoutRegion, width: f32) -> i32 {
    region.x1 + ((region.width() as f32 - width) / 2.0).round() as i32
}

fn log_layout(id: &str, face: &str, layout: &FaceLayout) {
    let (dropped, overflowing) = (layout.dropped(), layout.overflowing());
    if dropped > 0 || overflowing > 0 {
        debug!(
            id,
            face,
            dropped,
            overflowing,
            "Card text degraded to fit its regions"
        );
    }
}

/// Loads the optional header logo scaled to `height`, keeping its aspect ratio.
///
/// A missing file is silent; an unreadable one is logged. Neither is an error.
pub fn load_logo(path: &Path, height: u32) -> Option<RgbaImage> {
    if !path.is_file() {
        debug!(path = %path.display(), "No logo found; header renders without it");
        return None;
    }
    let logo = match image::open(path) {
        Ok(img) => img.to_rgba8(),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "Logo could not be decoded; skipping");
            return None;
        }
    };
    if logo.height() == 0 {
        return None;
    }
    let width = ((height as f32) * logo.width() as f32 / logo.height() as f32).round() as u32;
    Some(image::imageops::resize(
        &logo,
        width.max(1),
        height,
        FilterType::Lanczos3,
    ))
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;
    use crate::config::Paths;

    fn composer() -> CardComposer {
        let config = Config::with_paths(Paths::new(
            PathBuf::from("bank.json"),
            PathBuf::from("out"),
            PathBuf::from("assets"),
        ));
        CardComposer::with_parts(&config, FontResolver::builtin_only(), None)
    }

    fn record(question: &str, answer: &str, explanation: &str) -> Record {
        Record {
            id: "q-1".to_string(),
            subject: "Pharmacology".to_string(),
            question: question.to_string(),
            answer: answer.to_string(),
            explanation: explanation.to_string(),
            image: None,
        }
    }

    #[test]
    fn test_faces_have_canvas_size() {
        let c = composer();
        let r = record("Drug of choice for absence seizures?", "Ethosuximide", "T-type calcium channel blocker.");
        let front = c.compose_front(&r);
        let back = c.compose_back(&r);
        assert_eq!(front.dimensions(), (1080, 1350));
        assert_eq!(back.dimensions(), (1080, 1350));
    }

    #[test]
    fn test_faces_share_identical_header() {
        let c = composer();
        let r = record("Question text", "Answer text", "Explanation text");
        let front = c.compose_front(&r);
        let back = c.compose_back(&r);
        let panel_top = c.geometry().panel.y1 as u32;
        for y in 0..panel_top {
            for x in 0..front.width() {
                assert_eq!(
                    front.get_pixel(x, y),
                    back.get_pixel(x, y),
                    "header pixel ({x},{y}) differs between faces"
                );
            }
        }
    }

    #[test]
    fn test_background_gradient_top_left() {
        let c = composer();
        let front = c.compose_front(&record("q", "a", "e"));
        assert_eq!(front.get_pixel(0, 0).0, [13, 13, 22, 255]);
    }

    #[test]
    fn test_back_banner_is_green() {
        let c = composer();
        let back = c.compose_back(&record("q", "a", "e"));
        let banner = c.geometry().answer_banner;
        let p = back.get_pixel((banner.x2 - 30) as u32, (banner.y2 - 10) as u32).0;
        assert!(p[1] > p[0] && p[1] > 100, "banner pixel should be green, got {p:?}");
    }

    #[test]
    fn test_answer_capped_at_three_lines() {
        let c = composer();
        let long_answer = "Inhibition of the sodium potassium chloride cotransporter in the thick \
                           ascending limb of the loop of Henle with secondary calcium wasting";
        let (_, layout) = c.compose_back_with_layout(&record("q", long_answer, "e"));
        let (_, answer) = &layout.regions[0];
        assert!(answer.lines.len() <= 3);
        assert!(answer.dropped > 0);
    }

    #[test]
    fn test_long_explanation_clipped_to_panel() {
        let c = composer();
        let explanation = "Beta blockers reduce myocardial oxygen demand. ".repeat(40);
        let (_, layout) = c.compose_back_with_layout(&record("q", "a", &explanation));
        let (region, set) = &layout.regions[1];
        assert_eq!(set.font.px, 28, "longest tier uses the smallest size");
        let bottom = set.start_y + set.lines.len() as i32 * set.pitch;
        assert!(bottom <= region.y2 - EXPLANATION_SPEC.bottom_margin);
        assert!(set.dropped > 0);
    }

    #[test]
    fn test_question_ladder_tiers() {
        let c = composer();
        let (_, short) = c.compose_front_with_layout(&record("Short?", "a", "e"));
        let (_, long) = c.compose_front_with_layout(&record(&"word ".repeat(50), "a", "e"));
        assert_eq!(short.regions[0].1.font.px, 68);
        assert_eq!(long.regions[0].1.font.px, 48);
    }

    #[test]
    fn test_missing_logo_is_none() {
        assert!(load_logo(Path::new("/no/such/logo.png"), 80).is_none());
    }

    #[test]
    fn test_logo_scaled_to_height() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("logo.png");
        RgbaImage::from_pixel(40, 20, Rgba([255, 0, 0, 255]))
            .save(&path)
            .expect("save logo");
        let logo = load_logo(&path, 80).expect("logo loads");
        assert_eq!(logo.dimensions(), (160, 80));
    }
}
