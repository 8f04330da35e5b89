//! Fixed card geometry derived from the canvas configuration.
//!
//! Text regions on one face never overlap. Captions that are drawn at a fixed
//! point still get a region so the overlap check covers them.

use crate::config::CanvasConfig;
use crate::layout::LayoutRegion;

const ANSWER_BANNER_HEIGHT: i32 = 240;
const ANSWER_LABEL_OFFSET: i32 = 50;
const ANSWER_TEXT_OFFSET: i32 = 90;
/// Answer text may run 40px past the banner so three 60px lines fit.
const ANSWER_TEXT_BOTTOM: i32 = 280;
const EXPLANATION_LABEL_GAP: i32 = 50;
const EXPLANATION_TEXT_GAP: i32 = 100;
const CAPTION_HEIGHT: i32 = 40;
const CALL_TO_ACTION_GAP: i32 = 60;
const FOOTER_OFFSET: i32 = 60;

#[derive(Debug, Clone, PartialEq)]
pub struct CardGeometry {
    pub canvas: LayoutRegion,
    /// Translucent card panel shared by both faces.
    pub panel: LayoutRegion,
    /// Front: question text.
    pub question: LayoutRegion,
    /// Front: call-to-action caption below the panel.
    pub call_to_action: LayoutRegion,
    /// Back: colored banner behind the answer label and answer text.
    pub answer_banner: LayoutRegion,
    pub answer_label: LayoutRegion,
    pub answer: LayoutRegion,
    pub explanation_label: LayoutRegion,
    pub explanation: LayoutRegion,
    /// Top of the footer caption.
    pub footer_y: i32,
}

impl CardGeometry {
    pub fn new(canvas: &CanvasConfig) -> Self {
        let (w, h) = (canvas.width as i32, canvas.height as i32);
        let panel = LayoutRegion::new(
            canvas.panel_margin_x,
            canvas.panel_margin_top,
            w - canvas.panel_margin_x,
            h - canvas.panel_margin_bottom,
        );

        let answer_banner =
            LayoutRegion::new(panel.x1, panel.y1, panel.x2, panel.y1 + ANSWER_BANNER_HEIGHT);
        let label_top = panel.y1 + ANSWER_LABEL_OFFSET;
        let explanation_label_top = answer_banner.y2 + EXPLANATION_LABEL_GAP;

        CardGeometry {
            canvas: LayoutRegion::new(0, 0, w, h),
            panel,
            question: panel,
            call_to_action: LayoutRegion::new(
                0,
                panel.y2 + CALL_TO_ACTION_GAP,
                w,
                panel.y2 + CALL_TO_ACTION_GAP + CAPTION_HEIGHT,
            ),
            answer_banner,
            answer_label: LayoutRegion::new(panel.x1, label_top, panel.x2, label_top + 30),
            answer: LayoutRegion::new(
                panel.x1,
                panel.y1 + ANSWER_TEXT_OFFSET,
                panel.x2,
                panel.y1 + ANSWER_TEXT_BOTTOM,
            ),
            explanation_label: LayoutRegion::new(
                panel.x1,
                explanation_label_top,
                panel.x2,
                explanation_label_top + CAPTION_HEIGHT,
            ),
            explanation: LayoutRegion::new(
                panel.x1,
                answer_banner.y2 + EXPLANATION_TEXT_GAP,
                panel.x2,
                panel.y2,
            ),
            footer_y: h - FOOTER_OFFSET,
        }
    }

    #[cfg(test)]
    pub fn front_text_regions(&self) -> [LayoutRegion; 2] {
        [self.question, self.call_to_action]
    }

    #[cfg(test)]
    pub fn back_text_regions(&self) -> [LayoutRegion; 4] {
        [
            self.answer_label,
            self.answer,
            self.explanation_label,
            self.explanation,
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn no_overlaps(regions: &[LayoutRegion]) -> bool {
        regions.iter().enumerate().all(|(i, a)| {
            regions
                .iter()
                .skip(i + 1)
                .all(|b| !a.overlaps(b))
        })
    }

    #[test]
    fn test_default_panel_geometry() {
        let g = CardGeometry::new(&CanvasConfig::default());
        assert_eq!(g.panel, LayoutRegion::new(60, 220, 1020, 1170));
        assert_eq!(g.answer_banner.height(), 240);
        assert_eq!(g.footer_y, 1290);
    }

    #[test]
    fn test_front_regions_do_not_overlap() {
        let g = CardGeometry::new(&CanvasConfig::default());
        assert!(no_overlaps(&g.front_text_regions()));
    }

    #[test]
    fn test_back_regions_do_not_overlap() {
        let g = CardGeometry::new(&CanvasConfig::default());
        assert!(no_overlaps(&g.back_text_regions()));
    }

    #[test]
    fn test_back_regions_ordered_top_to_bottom() {
        let g = CardGeometry::new(&CanvasConfig::default());
        let tops: Vec<i32> = g.back_text_regions().iter().map(|r| r.y1).collect();
        let mut sorted = tops.clone();
        sorted.sort();
        assert_eq!(tops, sorted);
    }

    #[test]
    fn test_text_regions_inside_canvas() {
        let g = CardGeometry::new(&CanvasConfig::default());
        for r in g.front_text_regions().iter().chain(g.back_text_regions().iter()) {
            assert!(r.x1 >= 0 && r.y1 >= 0 && r.x2 <= g.canvas.x2 && r.y2 <= g.canvas.y2);
        }
    }

    #[test]
    fn test_answer_region_holds_three_fixed_pitch_lines() {
        let g = CardGeometry::new(&CanvasConfig::default());
        assert!(g.answer.height() / 60 >= 3);
    }
}
