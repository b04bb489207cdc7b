use eframe::egui::{self, Align, Context, Layout};

use crate::util::format_age;

use super::super::{ShellRequests, ShellStatus, ViewModel};

impl ViewModel {
    pub(in crate::app) fn show(
        &mut self,
        ctx: &Context,
        status: &ShellStatus<'_>,
        requests: &mut ShellRequests,
    ) {
        egui::TopBottomPanel::top("top_bar")
            .resizable(false)
            .show(ctx, |ui| {
                ui.horizontal(|ui| {
                    ui.heading("link-radar");
                    ui.separator();
                    ui.label(status.source);
                    ui.label(format!("window: {}m", status.query.window.minutes()));
                    ui.label(status.query.aggregation.label());

                    let refresh_text = if status.is_loading {
                        "Refreshing..."
                    } else {
                        "Refresh"
                    };
                    let refresh =
                        ui.add_enabled(!status.is_loading, egui::Button::new(refresh_text));
                    if refresh.clicked() {
                        requests.reload = true;
                    }
                    if ui.button("Reset view").clicked() {
                        self.engine.reset_view();
                    }

                    ui.with_layout(Layout::right_to_left(Align::Center), |ui| {
                        if status.is_loading {
                            ui.spinner();
                        }
                        ui.label(format!("updated {}", format_age(self.loaded_at.elapsed())));
                        ui.separator();
                        ui.label(format!("zoom {:.0}%", self.engine.transform().scale * 100.0));
                    });
                });
            });

        egui::SidePanel::right("details")
            .resizable(true)
            .default_width(320.0)
            .show(ctx, |ui| {
                egui::ScrollArea::vertical()
                    .auto_shrink([false, false])
                    .show(ui, |ui| {
                        self.draw_status(ui, status);
                        ui.separator();
                        self.draw_query_controls(ui, status, requests);
                        ui.separator();
                        self.draw_search(ui);
                        ui.separator();
                        self.draw_details(ui);
                        ui.separator();
                        Self::draw_instructions(ui);
                    });
            });

        egui::CentralPanel::default().show(ctx, |ui| self.draw_graph(ui));
    }
}
