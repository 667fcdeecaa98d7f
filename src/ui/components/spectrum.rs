//! Spectrum bar visualization for the live capture.

use crate::ui::theme::Theme;
use egui::{self, Pos2, Rect, Vec2};

/// Bar-graph view of the analyzer output.
pub struct SpectrumBars<'a> {
    bars: &'a [f32],
    theme: &'a Theme,
    height: f32,
}

impl<'a> SpectrumBars<'a> {
    pub fn new(bars: &'a [f32], theme: &'a Theme) -> Self {
        Self {
            bars,
            theme,
            height: 72.0,
        }
    }

    pub fn height(mut self, height: f32) -> Self {
        self.height = height;
        self
    }

    pub fn show(self, ui: &mut egui::Ui) -> egui::Response {
        let desired_size = Vec2::new(ui.available_width(), self.height);
        let (rect, response) = ui.allocate_exact_size(desired_size, egui::Sense::hover());
        let painter = ui.painter();

        painter.rect_filled(rect, self.theme.card_rounding, self.theme.bg_secondary);

        let padding = 8.0;
        let draw_rect = rect.shrink(padding);
        let count = self.bars.len();
        if count == 0 {
            return response;
        }

        let bar_width = draw_rect.width() / count as f32;
        let gap = 2.0;
        for (i, &level) in self.bars.iter().enumerate() {
            let level = level.clamp(0.0, 1.0);
            let bar_height = (level * draw_rect.height()).max(2.0);
            let x = draw_rect.left() + i as f32 * bar_width;

            let bar_rect = Rect::from_min_max(
                Pos2::new(x + gap / 2.0, draw_rect.bottom() - bar_height),
                Pos2::new(x + bar_width - gap / 2.0, draw_rect.bottom()),
            );

            // Brighter bars carry more energy
            let color = self.theme.recording.gamma_multiply(0.55 + 0.45 * level);
            painter.rect_filled(bar_rect, 1.0, color);
        }

        ui.ctx().request_repaint();
        response
    }
}
