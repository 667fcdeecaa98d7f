//! Stored-interview list screen.

use crate::ui::theme::Theme;
use crate::workflow::ListingController;
use egui::{self, RichText};

/// Actions the list screen hands back to the application shell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListAction {
    None,
    /// Open the capture screen for a new interview.
    AddInterview,
}

pub struct InterviewList<'a> {
    listing: &'a mut ListingController,
    theme: &'a Theme,
}

impl<'a> InterviewList<'a> {
    pub fn new(listing: &'a mut ListingController, theme: &'a Theme) -> Self {
        Self { listing, theme }
    }

    pub fn show(self, ui: &mut egui::Ui) -> ListAction {
        let mut action = ListAction::None;
        let theme = self.theme;

        ui.horizontal(|ui| {
            ui.label(
                RichText::new("interviews")
                    .size(22.0)
                    .strong()
                    .color(theme.text_primary),
            );
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui
                    .add_enabled(!self.listing.is_busy(), egui::Button::new("refresh"))
                    .clicked()
                {
                    self.listing.refresh();
                }
                if self.listing.is_busy() {
                    ui.spinner();
                }
            });
        });

        let summary = match self.listing.guilt_summary() {
            Some((average, count)) => {
                format!("Average guilt: {average:.2} across {count} analyzed interviews.")
            }
            None => "No guilt scores yet.".to_string(),
        };
        ui.label(RichText::new(summary).size(12.0).color(theme.text_muted));

        if let Some(error) = self.listing.error().map(str::to_string) {
            ui.add_space(theme.spacing_sm);
            ui.label(RichText::new(error).color(theme.error));
        }

        ui.add_space(theme.spacing_sm);
        egui::ScrollArea::vertical().show(ui, |ui| {
            for record in self.listing.records() {
                egui::Frame::none()
                    .fill(theme.bg_secondary)
                    .rounding(theme.card_rounding)
                    .inner_margin(12.0)
                    .show(ui, |ui| {
                        ui.label(
                            RichText::new(record.name.as_str())
                                .strong()
                                .color(theme.text_primary),
                        );
                        ui.label(
                            RichText::new(format!("Guilt level: {}", record.guilt_label()))
                                .size(12.0)
                                .color(theme.text_secondary),
                        );
                        if let Some(transcript) = record.transcript.as_deref() {
                            let preview: String = transcript.chars().take(120).collect();
                            let suffix = if transcript.chars().count() > 120 { "…" } else { "" };
                            ui.label(
                                RichText::new(format!("{preview}{suffix}"))
                                    .size(12.0)
                                    .color(theme.text_muted),
                            );
                        }
                    });
                ui.add_space(theme.spacing_sm);
            }
        });

        ui.add_space(theme.spacing);
        ui.horizontal(|ui| {
            if ui
                .button(RichText::new("add interview").strong())
                .clicked()
            {
                action = ListAction::AddInterview;
            }

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if self.listing.confirm_reset {
                    if ui.button("cancel").clicked() {
                        self.listing.confirm_reset = false;
                    }
                    if ui
                        .button(RichText::new("confirm delete").color(theme.error))
                        .clicked()
                    {
                        self.listing.reset_all();
                    }
                    ui.label(
                        RichText::new("Delete every stored interview?")
                            .size(12.0)
                            .color(theme.error),
                    );
                } else if ui
                    .add_enabled(
                        !self.listing.is_busy() && !self.listing.records().is_empty(),
                        egui::Button::new(RichText::new("reset all").color(theme.error)),
                    )
                    .clicked()
                {
                    self.listing.confirm_reset = true;
                }
            });
        });

        action
    }
}
