mod forces;

use eframe::egui::Pos2;
use tracing::debug;

use super::arena::GraphArena;
use forces::{apply_centering, apply_links, apply_many_body, integrate, resolve_collisions};

/// Tuning for the layout solver.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ForceParams {
    pub link_distance: f32,
    /// Negative values repel.
    pub charge: f32,
    pub collision_radius: f32,
    pub collision_iterations: usize,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f32,
    pub alpha_min: f32,
    pub alpha_decay: f32,
    pub reheat_target: f32,
    /// Floor applied to pair distances before dividing by them.
    pub distance_min: f32,
}

impl ForceParams {
    /// Decay that takes alpha from 1 down to `alpha_min` in `ticks` steps.
    pub fn decay_for(alpha_min: f32, ticks: u32) -> f32 {
        1.0 - alpha_min.powf(1.0 / ticks.max(1) as f32)
    }
}

impl Default for ForceParams {
    fn default() -> Self {
        let alpha_min = 0.001;
        Self {
            link_distance: 120.0,
            charge: -400.0,
            collision_radius: 40.0,
            collision_iterations: 1,
            velocity_decay: 0.4,
            alpha_min,
            alpha_decay: Self::decay_for(alpha_min, 300),
            reheat_target: 0.3,
            distance_min: 1.0,
        }
    }
}

pub struct Simulation {
    params: ForceParams,
    center: Pos2,
    alpha: f32,
    alpha_target: f32,
    running: bool,
    ticks: u64,
}

impl Simulation {
    pub fn new(params: ForceParams, center: Pos2, node_count: usize) -> Self {
        Self {
            params,
            center,
            alpha: 1.0,
            alpha_target: 0.0,
            running: node_count > 0,
            ticks: 0,
        }
    }

    /// A simulation with nothing to lay out. Never ticks.
    pub fn idle(params: ForceParams, center: Pos2) -> Self {
        Self::new(params, center, 0)
    }

    pub fn alpha(&self) -> f32 {
        self.alpha
    }

    #[cfg(test)]
    pub fn alpha_target(&self) -> f32 {
        self.alpha_target
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    #[cfg(test)]
    pub fn params(&self) -> &ForceParams {
        &self.params
    }

    /// Holds alpha up at the reheat target and resumes ticking if the layout
    /// had settled. Calling it again changes nothing.
    pub fn reheat(&mut self) {
        self.alpha_target = self.params.reheat_target;
        self.running = true;
    }

    /// Lets alpha decay naturally again.
    pub fn release(&mut self) {
        self.alpha_target = 0.0;
    }

    /// Advances the layout by one tick. Returns `false` without touching the
    /// arena when there is nothing to do.
    pub fn step(&mut self, arena: &mut GraphArena) -> bool {
        if !self.running {
            return false;
        }
        if arena.is_empty() {
            self.running = false;
            return false;
        }

        self.alpha += (self.alpha_target - self.alpha) * self.params.alpha_decay;
        let alpha = self.alpha;
        let params = self.params;

        let (nodes, links) = arena.parts_mut();
        apply_links(
            nodes,
            links,
            params.link_distance,
            params.distance_min,
            alpha,
        );
        apply_many_body(nodes, params.charge, params.distance_min, alpha);
        apply_centering(nodes, self.center);
        integrate(nodes, params.velocity_decay);
        resolve_collisions(nodes, params.collision_radius, params.collision_iterations);

        self.ticks += 1;
        if self.alpha < params.alpha_min {
            self.running = false;
            debug!(ticks = self.ticks, nodes = nodes.len(), "layout settled");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::engine::fixtures::topology;

    const CENTER: Pos2 = pos2(400.0, 300.0);

    fn build(nodes: &[&str], links: &[(&str, &str, f32)]) -> (GraphArena, Simulation) {
        let (arena, _) = GraphArena::build(&topology(nodes, links), CENTER, 1);
        let simulation = Simulation::new(ForceParams::default(), CENTER, arena.len());
        (arena, simulation)
    }

    fn settle(arena: &mut GraphArena, simulation: &mut Simulation) -> u64 {
        let mut ticks = 0;
        while simulation.step(arena) {
            ticks += 1;
            assert!(ticks < 10_000, "simulation never settled");
        }
        ticks
    }

    fn distance(arena: &GraphArena, a: &str, b: &str) -> f32 {
        (arena.node(a).unwrap().pos - arena.node(b).unwrap().pos).length()
    }

    #[test]
    fn empty_simulation_stays_idle() {
        let (mut arena, mut simulation) = build(&[], &[]);
        assert!(!simulation.is_running());
        assert!(!simulation.step(&mut arena));
        assert_eq!(simulation.ticks(), 0);
    }

    #[test]
    fn static_input_settles_within_bounded_ticks() {
        let (mut arena, mut simulation) =
            build(&["a", "b", "c", "d"], &[("a", "b", 1.0), ("c", "d", 0.5)]);
        let ticks = settle(&mut arena, &mut simulation);

        assert!(ticks <= 310, "took {ticks} ticks");
        assert!(simulation.alpha() < simulation.params().alpha_min);
    }

    #[test]
    fn chain_converges_to_link_distance_without_overlap() {
        let (mut arena, mut simulation) =
            build(&["A", "B", "C"], &[("A", "B", 0.9), ("B", "C", 1.0)]);
        settle(&mut arena, &mut simulation);

        let ab = distance(&arena, "A", "B");
        let bc = distance(&arena, "B", "C");
        assert!((108.0..=132.0).contains(&ab), "A-B settled at {ab}");
        assert!((108.0..=132.0).contains(&bc), "B-C settled at {bc}");

        let min_gap = 2.0 * simulation.params().collision_radius;
        for (a, b) in [("A", "B"), ("B", "C"), ("A", "C")] {
            assert!(distance(&arena, a, b) >= min_gap - 1e-3);
        }
    }

    #[test]
    fn layout_stays_centered() {
        let (mut arena, mut simulation) =
            build(&["a", "b", "c"], &[("a", "b", 1.0), ("b", "c", 1.0)]);
        settle(&mut arena, &mut simulation);

        let centroid = arena
            .nodes()
            .iter()
            .fold(vec2(0.0, 0.0), |sum, node| sum + node.pos)
            / arena.len() as f32;
        assert!((centroid - CENTER.to_vec2()).length() < 5.0);
    }

    #[test]
    fn isolated_nodes_settle_without_stalling() {
        let (mut arena, mut simulation) = build(&["lonely", "a", "b"], &[("a", "b", 1.0)]);
        settle(&mut arena, &mut simulation);

        for node in arena.nodes() {
            assert!(node.pos.x.is_finite() && node.pos.y.is_finite());
        }
        assert!(distance(&arena, "lonely", "a") >= 80.0 - 1e-3);
    }

    #[test]
    fn pinned_node_holds_exact_position() {
        let (mut arena, mut simulation) =
            build(&["a", "b", "c"], &[("a", "b", 1.0), ("b", "c", 0.3)]);
        arena.node_mut("b").unwrap().pin(pos2(123.5, 456.25));

        for _ in 0..75 {
            simulation.step(&mut arena);
            assert_eq!(arena.node("b").unwrap().pos, vec2(123.5, 456.25));
        }
    }

    #[test]
    fn unpinned_node_moves_on_next_tick() {
        let (mut arena, mut simulation) = build(&["a", "b"], &[("a", "b", 1.0)]);
        arena.node_mut("a").unwrap().pin(pos2(300.0, 300.0));
        arena.node_mut("b").unwrap().pin(pos2(500.0, 300.0));
        for _ in 0..5 {
            simulation.step(&mut arena);
        }

        let before = arena.node("a").unwrap().pos;
        arena.node_mut("a").unwrap().unpin();
        assert!(simulation.step(&mut arena));
        assert_ne!(arena.node("a").unwrap().pos, before);
    }

    #[test]
    fn reheat_resumes_settled_simulation_and_is_idempotent() {
        let (mut arena, mut simulation) = build(&["a", "b"], &[("a", "b", 1.0)]);
        settle(&mut arena, &mut simulation);
        assert!(!simulation.is_running());

        simulation.reheat();
        let alpha = simulation.alpha();
        simulation.reheat();
        assert!(simulation.is_running());
        assert_eq!(simulation.alpha(), alpha);
        assert_eq!(simulation.alpha_target(), 0.3);

        for _ in 0..50 {
            assert!(simulation.step(&mut arena));
        }
        assert!(simulation.alpha() > alpha);

        simulation.release();
        settle(&mut arena, &mut simulation);
        assert!(!simulation.is_running());
    }
}
