use eframe::egui::{self, Key, RichText, Ui};

use crate::topology::{StatusQuery, TimeWindow};

use super::super::{ShellRequests, ShellStatus, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_query_controls(
        &mut self,
        ui: &mut Ui,
        status: &ShellStatus<'_>,
        requests: &mut ShellRequests,
    ) {
        ui.label(RichText::new("Settings").strong());
        ui.add_space(4.0);

        let current = requests.query.unwrap_or(status.query);

        ui.label("Time window");
        ui.add_enabled_ui(!status.is_loading, |ui| {
            ui.horizontal(|ui| {
                for minutes in TimeWindow::PRESETS {
                    let selected = current.window.minutes() == minutes;
                    if ui.selectable_label(selected, format!("{minutes}m")).clicked()
                        && !selected
                        && let Ok(window) = TimeWindow::new(minutes)
                    {
                        requests.query = Some(StatusQuery { window, ..current });
                    }
                }
            });
        });

        ui.add_space(4.0);
        ui.label("Aggregation");
        let toggle = ui
            .add_enabled(
                !status.is_loading,
                egui::Button::new(current.aggregation.label()),
            )
            .on_hover_text("Toggle between the average and the worst sample in the window");
        if toggle.clicked() {
            requests.query = Some(StatusQuery {
                aggregation: current.aggregation.toggled(),
                ..current
            });
        }

        if let Some(interval) = status.refresh_interval {
            ui.small(format!("Auto-refresh every {}s", interval.as_secs()));
        } else {
            ui.small("Auto-refresh disabled");
        }
    }

    pub(in crate::app) fn draw_search(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Search").strong());

        let response = ui.add(
            egui::TextEdit::singleline(&mut self.search)
                .hint_text("node name")
                .desired_width(f32::INFINITY),
        );

        if response.lost_focus()
            && ui.input(|input| input.key_pressed(Key::Enter))
            && let Some(id) = self.best_search_match()
        {
            self.engine.select(&id);
        }

        if let Some(matches) = self.search_matches() {
            ui.small(format!("{} matching nodes (Enter selects the best)", matches.len()));
        }
    }
}
