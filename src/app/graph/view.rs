use std::collections::HashSet;
use std::sync::Arc;

use eframe::egui::{self, Align2, Color32, FontId, Pos2, Sense, Stroke, Ui, pos2, vec2};
use fuzzy_matcher::FuzzyMatcher;
use fuzzy_matcher::skim::SkimMatcherV2;

use crate::engine::VIEWPORT;

use super::super::render_utils::{
    ViewportFit, circle_visible, draw_background, edge_visible, radial_disk, with_alpha,
};
use super::super::{SearchMatchCache, ViewModel};

const SEARCH_RING: Color32 = Color32::from_rgb(34, 211, 238);
const NODE_OUTLINE: Color32 = Color32::from_rgb(0x1E, 0x29, 0x3B);
const EDGE_OPACITY: f32 = 0.6;
const LABEL_OFFSET: f32 = 40.0;

fn fuzzy_match_score(matcher: &SkimMatcherV2, text: &str, query: &str) -> Option<i64> {
    matcher
        .fuzzy_match(text, query)
        .or_else(|| matcher.fuzzy_match(&text.to_ascii_lowercase(), &query.to_ascii_lowercase()))
}

impl ViewModel {
    /// Glyph indices whose names fuzzily match the search box.
    pub(in crate::app) fn search_matches(&mut self) -> Option<Arc<HashSet<usize>>> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let generation = self.engine.scene().generation();
        if let Some(cached) = &self.search_match_cache
            && cached.generation == generation
            && cached.query == query
        {
            return Some(Arc::clone(&cached.matches));
        }

        let matcher = SkimMatcherV2::default();
        let matches = self
            .engine
            .scene()
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, glyph)| fuzzy_match_score(&matcher, &glyph.name, query).is_some())
            .map(|(index, _)| index)
            .collect::<HashSet<_>>();
        let matches = Arc::new(matches);

        self.search_match_cache = Some(SearchMatchCache {
            query: query.to_owned(),
            generation,
            matches: Arc::clone(&matches),
        });
        Some(matches)
    }

    /// Id of the best-scoring node for the current search text.
    pub(in crate::app) fn best_search_match(&self) -> Option<String> {
        let query = self.search.trim();
        if query.is_empty() {
            return None;
        }

        let matcher = SkimMatcherV2::default();
        self.engine
            .scene()
            .nodes()
            .iter()
            .filter_map(|glyph| {
                fuzzy_match_score(&matcher, &glyph.name, query).map(|score| (score, &glyph.id))
            })
            .max_by_key(|(score, _)| *score)
            .map(|(_, id)| id.clone())
    }

    pub(in crate::app) fn draw_graph(&mut self, ui: &mut Ui) {
        let (rect, response) = ui.allocate_exact_size(ui.available_size(), Sense::click_and_drag());
        let painter = ui.painter_at(rect);
        let fit = ViewportFit::new(rect, VIEWPORT);

        self.handle_graph_input(ui, &fit, &response);
        self.engine.frame();

        let matches = self.search_matches();
        let scene = self.engine.scene();
        let transform = scene.transform();
        let zoom = fit.scale() * transform.scale;
        let to_screen = |world: Pos2| fit.to_screen(transform.apply(world));

        draw_background(&painter, rect, to_screen(pos2(0.0, 0.0)), zoom);

        if scene.nodes().is_empty() {
            painter.text(
                rect.center(),
                Align2::CENTER_CENTER,
                "The monitoring backend reported no nodes.",
                FontId::proportional(15.0),
                Color32::from_gray(200),
            );
            return;
        }

        let edge_width = (1.5 * zoom).clamp(0.75, 4.0);
        for edge in scene.edges() {
            let start = to_screen(edge.from);
            let end = to_screen(edge.to);
            if !edge_visible(rect, start, end, edge_width) {
                continue;
            }
            painter.line_segment(
                [start, end],
                Stroke::new(edge_width, with_alpha(edge.color, EDGE_OPACITY)),
            );
        }

        let label_font = FontId::proportional((12.0 * zoom).clamp(8.0, 22.0));
        let mut hovered = None;
        for (index, glyph) in scene.nodes().iter().enumerate() {
            let center = to_screen(glyph.center);
            let radius = glyph.radius * zoom;
            if !circle_visible(rect, center, radius + LABEL_OFFSET * zoom) {
                continue;
            }

            let is_hovered = glyph.hovered;
            if is_hovered {
                hovered = Some(glyph);
            }

            let shadow_offset = if is_hovered { 6.0 } else { 4.0 } * zoom;
            painter.circle_filled(
                center + vec2(0.0, shadow_offset),
                radius,
                Color32::from_black_alpha(if is_hovered { 76 } else { 51 }),
            );

            let (inner, outer) = glyph.fill.gradient();
            radial_disk(&painter, center, radius, inner, outer);
            painter.circle_stroke(center, radius, Stroke::new(2.0 * zoom.sqrt(), NODE_OUTLINE));

            if matches.as_ref().is_some_and(|matches| matches.contains(&index)) {
                painter.circle_stroke(
                    center,
                    radius + 5.0 * zoom,
                    Stroke::new((2.5 * zoom.sqrt()).max(1.5), SEARCH_RING),
                );
            }

            painter.text(
                center + vec2(0.0, LABEL_OFFSET * zoom),
                Align2::CENTER_CENTER,
                &glyph.label,
                label_font.clone(),
                Color32::from_gray(241),
            );
        }

        if let Some(glyph) = hovered {
            let degree = self
                .engine
                .arena()
                .node(&glyph.id)
                .map_or(0, |node| node.degree);
            painter.text(
                rect.left_top() + vec2(10.0, 10.0),
                Align2::LEFT_TOP,
                format!("{}  |  id {}  |  links {}", glyph.name, glyph.id, degree),
                FontId::proportional(13.0),
                Color32::from_gray(240),
            );
        }

        if self.engine.is_dragging() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::Grabbing);
        } else if hovered.is_some() {
            ui.output_mut(|output| output.cursor_icon = egui::CursorIcon::PointingHand);
        }

        if self.engine.is_animating() || response.dragged() {
            ui.ctx().request_repaint();
        }
    }
}
