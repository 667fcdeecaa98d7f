//! Main application struct and eframe integration.

use crate::ui::components::{InterviewList, ListAction, RecorderAction, RecorderPanel};
use crate::ui::theme::Theme;
use crate::workflow::{ListingController, WorkflowController};
use egui::{self, CentralPanel, RichText, TopBottomPanel};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Screen {
    Interviews,
    Capture,
}

/// Main console application.
pub struct InquestApp {
    workflow: WorkflowController,
    listing: ListingController,
    theme: Theme,
    screen: Screen,
}

impl InquestApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        workflow: WorkflowController,
        mut listing: ListingController,
    ) -> Self {
        let theme = Theme::dark();
        theme.apply(&cc.egui_ctx);
        listing.refresh();

        Self {
            workflow,
            listing,
            theme,
            screen: Screen::Interviews,
        }
    }

    fn show_header(&mut self, ctx: &egui::Context) {
        TopBottomPanel::top("header")
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_secondary)
                    .inner_margin(12.0),
            )
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.label(
                        RichText::new("Inquest")
                            .size(20.0)
                            .strong()
                            .color(self.theme.text_primary),
                    );
                    ui.label(
                        RichText::new("Interview Console")
                            .size(14.0)
                            .color(self.theme.text_muted),
                    );

                    ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                        if ui
                            .selectable_label(self.screen == Screen::Capture, "capture")
                            .clicked()
                        {
                            self.screen = Screen::Capture;
                        }
                        if ui
                            .selectable_label(self.screen == Screen::Interviews, "interviews")
                            .clicked()
                            && self.screen != Screen::Interviews
                        {
                            self.screen = Screen::Interviews;
                            self.listing.refresh();
                        }
                    });
                });
            });
    }

    /// Files dropped onto the window become the pending artifact.
    fn handle_dropped_files(&mut self, ctx: &egui::Context) {
        let dropped = ctx.input(|i| i.raw.dropped_files.clone());
        for file in dropped {
            if let Some(path) = file.path {
                self.workflow.pick_file(&path);
                self.screen = Screen::Capture;
            }
        }
    }
}

impl eframe::App for InquestApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.workflow.poll_events();
        self.listing.poll_events();
        self.handle_dropped_files(ctx);

        self.show_header(ctx);

        CentralPanel::default()
            .frame(
                egui::Frame::none()
                    .fill(self.theme.bg_primary)
                    .inner_margin(self.theme.spacing),
            )
            .show(ctx, |ui| match self.screen {
                Screen::Capture => {
                    if RecorderPanel::new(&mut self.workflow, &self.theme).show(ui)
                        == RecorderAction::Finished
                    {
                        self.screen = Screen::Interviews;
                        self.listing.refresh();
                    }
                }
                Screen::Interviews => {
                    if InterviewList::new(&mut self.listing, &self.theme).show(ui)
                        == ListAction::AddInterview
                    {
                        self.screen = Screen::Capture;
                    }
                }
            });

        // Keep polling while background work is outstanding
        if self.workflow.is_recording()
            || self.workflow.state().phase.is_in_flight()
            || self.listing.is_busy()
        {
            ctx.request_repaint();
        }
    }
}
