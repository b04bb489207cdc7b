use std::collections::HashMap;

use eframe::egui::{Color32, Pos2};

use super::arena::{GraphArena, NodeHandle};
use super::encode::strength_to_color;
use super::interaction::ViewTransform;
use crate::util::truncate_label;

pub const NODE_RADIUS: f32 = 25.0;
pub const HOVER_RADIUS: f32 = 30.0;
pub const LABEL_MAX_CHARS: usize = 25;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeFill {
    Normal,
    Selected,
}

impl NodeFill {
    /// Inner and outer stops of the radial fill.
    pub fn gradient(self) -> (Color32, Color32) {
        match self {
            Self::Normal => (
                Color32::from_rgb(0x60, 0xA5, 0xFA),
                Color32::from_rgb(0x1E, 0x40, 0xAF),
            ),
            Self::Selected => (
                Color32::from_rgb(0xFC, 0xD3, 0x4D),
                Color32::from_rgb(0xF5, 0x9E, 0x0B),
            ),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct NodeGlyph {
    pub id: String,
    pub label: String,
    pub name: String,
    /// World position.
    pub center: Pos2,
    pub radius: f32,
    pub hovered: bool,
    pub fill: NodeFill,
}

#[derive(Clone, Debug, PartialEq)]
pub struct EdgeGlyph {
    pub source: usize,
    pub target: usize,
    pub from: Pos2,
    pub to: Pos2,
    pub color: Color32,
}

/// Drawable mirror of one arena generation. Glyphs are keyed by entity id and
/// rebuilt wholesale whenever the arena generation changes.
#[derive(Debug, Default)]
pub struct Scene {
    generation: Option<u64>,
    nodes: Vec<NodeGlyph>,
    edges: Vec<EdgeGlyph>,
    index_by_id: HashMap<String, usize>,
    transform: ViewTransform,
}

impl Scene {
    pub fn bind(&mut self, arena: &GraphArena, transform: ViewTransform, hovered: Option<NodeHandle>) {
        if self.generation != Some(arena.generation()) {
            self.rebuild(arena);
        }

        let hovered = hovered
            .filter(|handle| handle.generation == arena.generation())
            .map(|handle| handle.index);

        for (index, (glyph, node)) in self.nodes.iter_mut().zip(arena.nodes()).enumerate() {
            glyph.center = node.pos.to_pos2();
            glyph.fill = if node.selected {
                NodeFill::Selected
            } else {
                NodeFill::Normal
            };
            glyph.hovered = hovered == Some(index);
            glyph.radius = if glyph.hovered {
                HOVER_RADIUS
            } else {
                NODE_RADIUS
            };
        }

        let nodes = arena.nodes();
        for edge in &mut self.edges {
            edge.from = nodes[edge.source].pos.to_pos2();
            edge.to = nodes[edge.target].pos.to_pos2();
        }

        self.transform = transform;
    }

    fn rebuild(&mut self, arena: &GraphArena) {
        self.nodes.clear();
        self.edges.clear();
        self.index_by_id.clear();

        for (index, node) in arena.nodes().iter().enumerate() {
            self.index_by_id.insert(node.id.clone(), index);
            self.nodes.push(NodeGlyph {
                id: node.id.clone(),
                label: truncate_label(&node.name, LABEL_MAX_CHARS),
                name: node.name.clone(),
                center: node.pos.to_pos2(),
                radius: NODE_RADIUS,
                hovered: false,
                fill: NodeFill::Normal,
            });
        }

        let nodes = arena.nodes();
        self.edges.extend(arena.links().iter().map(|link| EdgeGlyph {
            source: link.source,
            target: link.target,
            from: nodes[link.source].pos.to_pos2(),
            to: nodes[link.target].pos.to_pos2(),
            color: strength_to_color(link.strength),
        }));

        self.generation = Some(arena.generation());
    }

    pub fn generation(&self) -> Option<u64> {
        self.generation
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn nodes(&self) -> &[NodeGlyph] {
        &self.nodes
    }

    pub fn edges(&self) -> &[EdgeGlyph] {
        &self.edges
    }

    pub fn node(&self, id: &str) -> Option<&NodeGlyph> {
        self.index_by_id.get(id).map(|&index| &self.nodes[index])
    }

    /// Topmost node under a logical viewport point. Later glyphs paint over
    /// earlier ones, so the search runs back to front.
    pub fn hit_test(&self, logical: Pos2) -> Option<NodeHandle> {
        let generation = self.generation?;
        let world = self.transform.invert(logical);

        self.nodes
            .iter()
            .enumerate()
            .rev()
            .find(|(_, glyph)| glyph.center.distance(world) <= glyph.radius)
            .map(|(index, _)| NodeHandle { index, generation })
    }
}

#[cfg(test)]
mod tests {
    use eframe::egui::{pos2, vec2};

    use super::*;
    use crate::engine::encode::{GREEN, RED};
    use crate::engine::fixtures::topology;

    fn arena(nodes: &[&str], links: &[(&str, &str, f32)], generation: u64) -> GraphArena {
        GraphArena::build(&topology(nodes, links), pos2(400.0, 300.0), generation).0
    }

    #[test]
    fn disjoint_reload_replaces_every_glyph() {
        let mut scene = Scene::default();
        scene.bind(
            &arena(&["a", "b"], &[("a", "b", 1.0)], 1),
            ViewTransform::default(),
            None,
        );
        scene.bind(
            &arena(&["x", "y", "z"], &[("x", "z", 0.0)], 2),
            ViewTransform::default(),
            None,
        );

        assert!(scene.node("a").is_none());
        assert!(scene.node("b").is_none());
        assert_eq!(scene.nodes().len(), 3);
        assert_eq!(scene.edges().len(), 1);
        assert_eq!(scene.edges()[0].color, RED);
        assert_eq!(scene.generation(), Some(2));
    }

    #[test]
    fn smaller_reload_leaves_no_orphans() {
        let mut scene = Scene::default();
        scene.bind(
            &arena(&["a", "b", "c"], &[("a", "b", 1.0), ("b", "c", 1.0)], 1),
            ViewTransform::default(),
            None,
        );
        scene.bind(&arena(&["a"], &[], 2), ViewTransform::default(), None);

        assert_eq!(scene.nodes().len(), 1);
        assert!(scene.edges().is_empty());
        assert!(scene.node("c").is_none());
    }

    #[test]
    fn selection_recolors_without_rebuilding() {
        let mut arena = arena(&["a", "b"], &[("a", "b", 1.0)], 1);
        let mut scene = Scene::default();
        scene.bind(&arena, ViewTransform::default(), None);
        assert_eq!(scene.edges()[0].color, GREEN);

        arena.toggle_selection(1);
        arena.nodes_mut()[0].pos += vec2(5.0, 0.0);
        scene.bind(&arena, ViewTransform::default(), None);

        assert_eq!(scene.node("b").unwrap().fill, NodeFill::Selected);
        assert_eq!(scene.node("a").unwrap().fill, NodeFill::Normal);
        assert_eq!(scene.node("a").unwrap().center, arena.nodes()[0].pos.to_pos2());
        assert_eq!(scene.edges()[0].from, arena.nodes()[0].pos.to_pos2());
    }

    #[test]
    fn long_names_are_truncated_on_the_label_only() {
        let mut input = topology(&["a"], &[]);
        input.nodes[0].name = "a-very-long-hostname-for-the-probe-target".to_owned();
        let (arena, _) = GraphArena::build(&input, pos2(0.0, 0.0), 1);

        let mut scene = Scene::default();
        scene.bind(&arena, ViewTransform::default(), None);
        let glyph = scene.node("a").unwrap();
        assert_eq!(glyph.label.chars().count(), LABEL_MAX_CHARS);
        assert!(glyph.label.ends_with('…'));
        assert_eq!(glyph.name, input.nodes[0].name);
    }

    #[test]
    fn hit_test_follows_transform_and_hover() {
        let arena = arena(&["a"], &[], 7);
        let world = arena.nodes()[0].pos.to_pos2();
        let transform = ViewTransform {
            translate: vec2(10.0, 20.0),
            scale: 2.0,
        };
        let handle = arena.handle(0);

        let mut scene = Scene::default();
        scene.bind(&arena, transform, None);
        let logical = transform.apply(world);
        assert_eq!(scene.hit_test(logical), handle);
        assert_eq!(scene.hit_test(logical + vec2(2.0 * 28.0, 0.0)), None);

        scene.bind(&arena, transform, handle);
        assert!(scene.node("a").unwrap().hovered);
        assert_eq!(scene.node("a").unwrap().radius, HOVER_RADIUS);
        assert_eq!(scene.hit_test(logical + vec2(2.0 * 28.0, 0.0)), handle);
    }
}
