use eframe::egui::{self, PointerButton, Ui};

use crate::engine::Engine;

use super::super::ViewModel;
use super::super::render_utils::ViewportFit;

impl ViewModel {
    /// Feeds this frame's pointer activity on the graph area to the engine,
    /// in logical viewport coordinates.
    pub(in crate::app) fn handle_graph_input(
        &mut self,
        ui: &Ui,
        fit: &ViewportFit,
        response: &egui::Response,
    ) {
        let pointer = ui
            .input(|input| input.pointer.hover_pos())
            .filter(|position| response.rect.contains(*position))
            .map(|position| fit.to_logical(position));

        if !self.engine.is_dragging() {
            self.engine.hover(pointer);
        }

        self.handle_graph_zoom(ui, pointer, response);

        if response.drag_started_by(PointerButton::Primary)
            && let Some(origin) = ui.input(|input| input.pointer.press_origin())
        {
            self.engine.press(fit.to_logical(origin));
        }

        if response.dragged_by(PointerButton::Primary)
            && let Some(position) = response.interact_pointer_pos()
        {
            self.engine.drag_to(fit.to_logical(position));
        }

        if response.drag_stopped() {
            self.engine.release();
        }

        if response.clicked_by(PointerButton::Primary)
            && let Some(position) = response.interact_pointer_pos()
        {
            self.engine.click(fit.to_logical(position));
        }
    }

    fn handle_graph_zoom(
        &mut self,
        ui: &Ui,
        pointer: Option<egui::Pos2>,
        response: &egui::Response,
    ) {
        if !response.hovered() {
            return;
        }

        let scroll = ui.input(|input| input.raw_scroll_delta.y);
        if scroll.abs() <= f32::EPSILON {
            return;
        }

        self.engine
            .zoom(pointer.unwrap_or_else(Engine::center), scroll);
    }
}
