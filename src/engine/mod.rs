pub mod arena;
pub mod encode;
pub mod interaction;
pub mod physics;
pub mod scene;

#[cfg(test)]
mod fixtures;

use eframe::egui::{Pos2, Vec2, vec2};
use tracing::info;

use crate::topology::Topology;
use arena::{BuildReport, GraphArena, SimNode};
use encode::HealthSummary;
use interaction::{InteractionController, ViewTransform, ZoomLimits};
use physics::{ForceParams, Simulation};
use scene::Scene;

/// Logical drawing surface the layout is centered in.
pub const VIEWPORT: Vec2 = vec2(800.0, 600.0);

/// Ties one arena generation to its simulation, gestures and scene.
pub struct Engine {
    params: ForceParams,
    generation: u64,
    arena: GraphArena,
    simulation: Simulation,
    controller: InteractionController,
    scene: Scene,
    summary: HealthSummary,
}

impl Engine {
    pub fn new(params: ForceParams, limits: ZoomLimits) -> Self {
        let mut engine = Self {
            params,
            generation: 0,
            arena: GraphArena::default(),
            simulation: Simulation::idle(params, Self::center()),
            controller: InteractionController::new(limits),
            scene: Scene::default(),
            summary: HealthSummary::default(),
        };
        engine.rebind();
        engine
    }

    pub fn center() -> Pos2 {
        (VIEWPORT / 2.0).to_pos2()
    }

    /// Replaces the whole graph. The previous simulation is dropped, pending
    /// gestures are cancelled and selection starts empty.
    pub fn load(&mut self, topology: &Topology) -> BuildReport {
        self.controller.cancel();

        self.generation += 1;
        let (arena, report) = GraphArena::build(topology, Self::center(), self.generation);
        self.arena = arena;
        self.simulation = Simulation::new(self.params, Self::center(), self.arena.len());
        self.summary = HealthSummary::new(self.arena.len(), &topology.connections);
        self.rebind();

        info!(
            generation = self.generation,
            nodes = report.nodes,
            links = report.links,
            dropped = report.dropped_links,
            replaced = report.replaced_nodes,
            "topology loaded"
        );
        report
    }

    /// One display frame: at most one physics tick, then one bind.
    pub fn frame(&mut self) -> bool {
        let stepped = self.simulation.step(&mut self.arena);
        self.rebind();
        stepped
    }

    pub fn is_animating(&self) -> bool {
        self.simulation.is_running()
    }

    /// Pointer went down and started moving. A node under the pointer is
    /// grabbed; anywhere else starts a pan. Returns whether a node was hit.
    pub fn press(&mut self, logical: Pos2) -> bool {
        match self.scene.hit_test(logical) {
            Some(handle) => self
                .controller
                .drag_start(&mut self.arena, &mut self.simulation, handle),
            None => {
                self.controller.begin_pan(logical);
                false
            }
        }
    }

    pub fn drag_to(&mut self, logical: Pos2) {
        if self.controller.dragging().is_some() {
            self.controller.drag_move(&mut self.arena, logical);
        } else if self.controller.pan_to(logical) {
            self.rebind();
        }
    }

    pub fn release(&mut self) {
        self.controller.drag_end(&mut self.arena, &mut self.simulation);
        self.controller.end_pan();
    }

    /// Click without drag. Selection changes only restyle the scene.
    pub fn click(&mut self, logical: Pos2) -> bool {
        let changed = match self.scene.hit_test(logical) {
            Some(handle) => self.controller.click_node(&mut self.arena, handle),
            None => self.controller.click_background(&mut self.arena),
        };
        if changed {
            self.rebind();
        }
        changed
    }

    /// Selects the node with `id` unless it already is selected.
    pub fn select(&mut self, id: &str) -> bool {
        let Some(handle) = self.arena.handle_for(id) else {
            return false;
        };
        if self.arena.resolve(handle).is_some_and(|node| node.selected) {
            return false;
        }
        let changed = self.controller.click_node(&mut self.arena, handle);
        self.rebind();
        changed
    }

    pub fn hover(&mut self, logical: Option<Pos2>) -> bool {
        let handle = logical.and_then(|pointer| self.scene.hit_test(pointer));
        let changed = self.controller.hover(handle);
        if changed {
            self.rebind();
        }
        changed
    }

    pub fn zoom(&mut self, logical: Pos2, wheel_delta: f32) -> bool {
        self.zoom_by(logical, InteractionController::wheel_factor(wheel_delta))
    }

    pub fn zoom_by(&mut self, logical: Pos2, factor: f32) -> bool {
        let changed = self.controller.zoom_at(logical, factor);
        if changed {
            self.rebind();
        }
        changed
    }

    pub fn reset_view(&mut self) {
        self.controller.reset_view();
        self.rebind();
    }

    fn rebind(&mut self) {
        self.scene.bind(
            &self.arena,
            self.controller.transform(),
            self.controller.hovered(),
        );
    }

    pub fn arena(&self) -> &GraphArena {
        &self.arena
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn transform(&self) -> ViewTransform {
        self.controller.transform()
    }

    pub fn is_dragging(&self) -> bool {
        self.controller.dragging().is_some()
    }

    pub fn summary(&self) -> &HealthSummary {
        &self.summary
    }

    pub fn selected(&self) -> Option<&SimNode> {
        self.arena.selected()
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::fixtures::topology;
    use super::*;

    fn engine_with(nodes: &[&str], links: &[(&str, &str, f32)]) -> Engine {
        let mut engine = Engine::new(ForceParams::default(), ZoomLimits::default());
        engine.load(&topology(nodes, links));
        engine
    }

    fn logical_of(engine: &Engine, id: &str) -> Pos2 {
        let glyph = engine.scene().node(id).unwrap();
        engine.transform().apply(glyph.center)
    }

    fn run_until_settled(engine: &mut Engine) -> usize {
        let mut frames = 0;
        while engine.frame() {
            frames += 1;
            assert!(frames < 10_000);
        }
        frames
    }

    #[test]
    fn every_frame_rebinds_after_a_tick() {
        let mut engine = engine_with(&["a", "b"], &[("a", "b", 1.0)]);
        for _ in 0..10 {
            assert!(engine.frame());
            let node = engine.arena().node("a").unwrap();
            assert_eq!(engine.scene().node("a").unwrap().center, node.pos.to_pos2());
        }
        assert_eq!(engine.simulation().ticks(), 10);
    }

    #[test]
    fn empty_topology_renders_nothing_and_never_ticks() {
        let mut engine = engine_with(&[], &[]);
        assert!(!engine.frame());
        assert!(engine.scene().nodes().is_empty());
        assert!(engine.summary().success_rate.is_none());
    }

    #[test]
    fn selection_does_not_restart_the_simulation() {
        let mut engine = engine_with(&["a", "b"], &[("a", "b", 1.0)]);
        run_until_settled(&mut engine);
        let ticks = engine.simulation().ticks();
        let alpha = engine.simulation().alpha();
        let before: Vec<_> = engine.arena().nodes().iter().map(|node| node.pos).collect();

        assert!(engine.click(logical_of(&engine, "a")));
        assert_eq!(engine.scene().node("a").unwrap().fill, scene::NodeFill::Selected);
        assert!(!engine.frame());

        assert_eq!(engine.simulation().ticks(), ticks);
        assert_eq!(engine.simulation().alpha(), alpha);
        let after: Vec<_> = engine.arena().nodes().iter().map(|node| node.pos).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn dragging_pins_reheats_and_releases() {
        let mut engine = engine_with(&["a", "b", "c"], &[("a", "b", 1.0), ("b", "c", 1.0)]);
        run_until_settled(&mut engine);

        let target = logical_of(&engine, "b") + vec2(60.0, 40.0);
        assert!(engine.press(logical_of(&engine, "b")));
        assert!(engine.is_animating());
        engine.drag_to(target);
        for _ in 0..20 {
            engine.frame();
            assert_eq!(engine.arena().node("b").unwrap().pos.to_pos2(), target);
        }

        engine.release();
        assert!(!engine.is_dragging());
        assert!(!engine.arena().node("b").unwrap().is_pinned());
        assert_eq!(engine.simulation().alpha_target(), 0.0);
        assert!(run_until_settled(&mut engine) > 0);
    }

    #[test]
    fn reload_resets_selection_and_cancels_drag() {
        let mut engine = engine_with(&["a", "b"], &[("a", "b", 1.0)]);
        engine.select("a");
        engine.press(logical_of(&engine, "b"));

        engine.load(&topology(&["a", "b"], &[("a", "b", 0.5)]));
        assert!(engine.selected().is_none());
        assert!(!engine.is_dragging());
        assert!(engine.arena().nodes().iter().all(|node| !node.is_pinned()));

        engine.drag_to(pos2(100.0, 100.0));
        engine.release();
        assert!(engine.arena().nodes().iter().all(|node| !node.is_pinned()));
        assert_eq!(engine.simulation().ticks(), 0);
    }

    #[test]
    fn background_drag_pans_the_view() {
        let mut engine = engine_with(&["a"], &[]);
        let corner = pos2(5.0, 5.0);
        assert!(!engine.press(corner));
        engine.drag_to(corner + vec2(30.0, -10.0));
        engine.release();

        assert_eq!(engine.transform().translate, vec2(30.0, -10.0));
        assert_eq!(engine.simulation().alpha_target(), 0.0);
    }

    #[test]
    fn summary_counts_connections() {
        let engine = engine_with(
            &["a", "b", "c"],
            &[("a", "b", 1.0), ("b", "c", 1.0), ("a", "c", 0.5)],
        );
        let summary = engine.summary();
        assert_eq!(summary.nodes, 3);
        assert_eq!(summary.connections, 3);
        assert_eq!(summary.ok, 2);
        assert_eq!(summary.errors, 1);
    }

    #[test]
    fn wheel_zoom_restyles_without_ticking() {
        let mut engine = engine_with(&["a"], &[]);
        run_until_settled(&mut engine);
        let ticks = engine.simulation().ticks();

        assert!(engine.zoom(Engine::center(), 240.0));
        assert!(engine.transform().scale > 1.0);
        assert_eq!(engine.scene().transform(), engine.transform());
        assert!(!engine.frame());
        assert_eq!(engine.simulation().ticks(), ticks);
    }
}
