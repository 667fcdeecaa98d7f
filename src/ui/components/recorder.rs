//! Capture screen: name entry, recorder controls, submission and outcome.

use crate::ui::components::SpectrumBars;
use crate::ui::theme::Theme;
use crate::workflow::{Phase, WorkflowController};
use egui::{self, RichText};

/// Actions the capture screen hands back to the application shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecorderAction {
    None,
    /// The operator finished a settled interview; return to the list.
    Finished,
}

pub struct RecorderPanel<'a> {
    workflow: &'a mut WorkflowController,
    theme: &'a Theme,
}

impl<'a> RecorderPanel<'a> {
    pub fn new(workflow: &'a mut WorkflowController, theme: &'a Theme) -> Self {
        Self { workflow, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) -> RecorderAction {
        let mut action = RecorderAction::None;
        let theme = self.theme;

        ui.horizontal(|ui| {
            ui.label(
                RichText::new("add interview")
                    .size(22.0)
                    .strong()
                    .color(theme.text_primary),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                let status_color = match self.workflow.state().phase {
                    Phase::Recording => theme.recording,
                    Phase::AnalyzedSuccess => theme.success,
                    Phase::AnalyzedError => theme.warning,
                    _ => theme.text_muted,
                };
                ui.label(
                    RichText::new(self.workflow.state().status_line())
                        .size(12.0)
                        .family(egui::FontFamily::Monospace)
                        .color(status_color),
                );
                ui.label(RichText::new("●").size(12.0).color(status_color));
            });
        });
        ui.label(
            RichText::new("Same name will overwrite the existing interview.")
                .size(12.0)
                .color(theme.text_muted),
        );
        ui.add_space(theme.spacing_sm);

        let in_flight = self.workflow.state().phase.is_in_flight();
        ui.label(RichText::new("Interview name").color(theme.text_secondary));
        ui.add_enabled(
            !in_flight,
            egui::TextEdit::singleline(self.workflow.name_mut())
                .hint_text("e.g. suspect #12")
                .desired_width(320.0),
        );

        ui.add_space(theme.spacing_sm);
        ui.horizontal(|ui| {
            let can_start = self.workflow.state().can_start_recording();
            if ui
                .add_enabled(
                    can_start,
                    egui::Button::new(RichText::new("start").color(theme.recording)),
                )
                .clicked()
            {
                self.workflow.start_recording();
            }

            let recording = self.workflow.is_recording();
            if ui
                .add_enabled(recording, egui::Button::new("stop"))
                .clicked()
            {
                self.workflow.stop_recording();
            }

            ui.label(
                RichText::new("drop an audio file anywhere to attach it")
                    .size(11.0)
                    .color(theme.text_muted),
            );
        });

        if let Some(bars) = self.workflow.spectrum_bars() {
            ui.add_space(theme.spacing_sm);
            SpectrumBars::new(&bars, theme).show(ui);
        }

        if let Some(artifact) = &self.workflow.state().artifact {
            ui.add_space(theme.spacing_sm);
            ui.label(
                RichText::new(format!(
                    "attached: {} ({} bytes)",
                    artifact.file_name(),
                    artifact.bytes.len()
                ))
                .size(12.0)
                .color(theme.text_secondary),
            );
        }

        if let Some(error) = self.workflow.state().error_message.clone() {
            ui.add_space(theme.spacing_sm);
            ui.label(RichText::new(error).color(theme.error));
        }

        ui.add_space(theme.spacing);
        ui.horizontal(|ui| {
            let can_submit = self.workflow.state().can_submit();
            let saving = self.workflow.state().phase.is_in_flight();
            let submit_text = if saving { "saving..." } else { "save interview" };
            if ui
                .add_enabled(can_submit, egui::Button::new(RichText::new(submit_text).strong()))
                .clicked()
            {
                self.workflow.submit();
            }

            let can_finish = self.workflow.state().can_finish();
            if ui
                .add_enabled(can_finish, egui::Button::new("finish"))
                .clicked()
                && self.workflow.finish()
            {
                action = RecorderAction::Finished;
            }
        });

        if let Some(transcript) = self.workflow.state().transcript.clone() {
            ui.add_space(theme.spacing);
            ui.label(RichText::new("Transcript").color(theme.text_secondary));
            egui::Frame::none()
                .fill(theme.bg_secondary)
                .rounding(theme.card_rounding)
                .inner_margin(12.0)
                .show(ui, |ui| {
                    ui.label(RichText::new(transcript).color(theme.text_primary));
                });
        }

        if let Some(guilt) = self.workflow.state().guilt_level {
            ui.add_space(theme.spacing_sm);
            ui.label(
                RichText::new(format!("Guilt level: {guilt:.0}"))
                    .strong()
                    .color(theme.warning),
            );
        }

        action
    }
}
