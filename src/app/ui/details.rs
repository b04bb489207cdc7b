use eframe::egui::{self, Color32, CornerRadius, RichText, Ui};

use crate::engine::encode::strength_to_color;

use super::super::render_utils::with_alpha;
use super::super::{ShellStatus, ViewModel};

impl ViewModel {
    pub(in crate::app) fn draw_status(&mut self, ui: &mut Ui, status: &ShellStatus<'_>) {
        ui.heading("Network Status");
        ui.add_space(6.0);

        let summary = *self.engine.summary();
        egui::Grid::new("status_counts")
            .num_columns(2)
            .spacing([24.0, 4.0])
            .show(ui, |ui| {
                ui.label("Nodes");
                ui.label(RichText::new(summary.nodes.to_string()).strong());
                ui.end_row();
                ui.label("Connections");
                ui.label(RichText::new(summary.connections.to_string()).strong());
                ui.end_row();
                ui.label("Ok");
                ui.label(RichText::new(summary.ok.to_string()).strong());
                ui.end_row();
                ui.label("Errors");
                ui.label(RichText::new(summary.errors.to_string()).strong());
                ui.end_row();
            });

        ui.add_space(8.0);
        let tier_color = summary.tier().color();
        egui::Frame::new()
            .fill(with_alpha(tier_color, 0.2))
            .stroke(egui::Stroke::new(1.0, tier_color))
            .corner_radius(CornerRadius::same(8))
            .inner_margin(egui::Margin::same(10))
            .show(ui, |ui| {
                ui.set_width(ui.available_width());
                ui.label(RichText::new("Overall Success").color(Color32::from_gray(200)));
                ui.label(
                    RichText::new(summary.rate_label())
                        .size(24.0)
                        .strong()
                        .color(Color32::WHITE),
                );
            });

        let simulation = self.engine.simulation();
        if simulation.is_running() {
            ui.small(format!("Layout settling (alpha {:.3})", simulation.alpha()));
        } else if summary.nodes > 0 {
            ui.small(format!("Layout settled after {} ticks", simulation.ticks()));
        }

        if !status.is_loading && summary.nodes == 0 {
            ui.small("Nothing to show for this window.");
        }
    }

    pub(in crate::app) fn draw_details(&mut self, ui: &mut Ui) {
        ui.label(RichText::new("Selected Node").strong());

        let Some(node) = self.engine.selected() else {
            ui.label("Click a node to select it.");
            return;
        };

        ui.label(RichText::new(node.name.as_str()).strong().color(Color32::from_rgb(252, 211, 77)));
        ui.small(format!("id {}", node.id));
        ui.label(format!("Links: {}", node.degree));
        if node.is_pinned() {
            ui.small("pinned while dragging");
        }

        let arena = self.engine.arena();
        let Some(index) = arena.index_of(&node.id) else {
            return;
        };

        let mut rows = arena
            .links()
            .iter()
            .filter(|link| link.source == index || link.target == index)
            .map(|link| {
                let (arrow, other) = if link.source == index {
                    ("→", link.target)
                } else {
                    ("←", link.source)
                };
                (arrow, arena.nodes()[other].name.as_str(), link.strength)
            })
            .collect::<Vec<_>>();
        rows.sort_by(|a, b| a.2.total_cmp(&b.2));

        if rows.is_empty() {
            return;
        }

        ui.add_space(4.0);
        egui::ScrollArea::vertical()
            .id_salt("selected_links_scroll")
            .max_height(220.0)
            .show(ui, |ui| {
                for (arrow, name, strength) in rows {
                    ui.horizontal(|ui| {
                        ui.label(arrow);
                        ui.label(name);
                        ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                            ui.colored_label(
                                strength_to_color(strength),
                                format!("{:.1}%", strength * 100.0),
                            );
                        });
                    });
                }
            });
    }

    pub(in crate::app) fn draw_instructions(ui: &mut Ui) {
        ui.label(RichText::new("Instructions").strong());
        for line in [
            "Drag nodes to reposition them",
            "Click nodes to select/deselect",
            "Use mouse wheel to zoom",
            "Drag background to pan",
            "Click refresh to reload from the backend",
        ] {
            ui.label(format!("• {line}"));
        }
    }
}
