use std::collections::HashMap;
use std::f32::consts::PI;

use eframe::egui::{Pos2, Vec2, vec2};
use tracing::warn;

use crate::topology::Topology;

const INITIAL_RADIUS: f32 = 10.0;

/// One entity as the engine sees it: identity, layout state, pin and
/// selection all live on the same record.
#[derive(Clone, Debug)]
pub struct SimNode {
    pub id: String,
    pub name: String,
    pub pos: Vec2,
    pub velocity: Vec2,
    pub fx: Option<f32>,
    pub fy: Option<f32>,
    pub selected: bool,
    pub degree: usize,
}

impl SimNode {
    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }

    pub fn pin(&mut self, at: Pos2) {
        self.fx = Some(at.x);
        self.fy = Some(at.y);
    }

    pub fn unpin(&mut self) {
        self.fx = None;
        self.fy = None;
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SimLink {
    pub source: usize,
    pub target: usize,
    pub strength: f32,
}

impl SimLink {
    pub fn is_self_loop(&self) -> bool {
        self.source == self.target
    }
}

/// Stable reference to an arena slot. Stale once the arena is rebuilt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeHandle {
    pub index: usize,
    pub generation: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildReport {
    pub nodes: usize,
    pub links: usize,
    pub dropped_links: usize,
    pub replaced_nodes: usize,
}

#[derive(Clone, Debug, Default)]
pub struct GraphArena {
    generation: u64,
    nodes: Vec<SimNode>,
    links: Vec<SimLink>,
    index_by_id: HashMap<String, usize>,
}

impl GraphArena {
    pub fn build(topology: &Topology, center: Pos2, generation: u64) -> (Self, BuildReport) {
        let mut report = BuildReport::default();
        let mut nodes: Vec<SimNode> = Vec::with_capacity(topology.nodes.len());
        let mut index_by_id: HashMap<String, usize> = HashMap::with_capacity(topology.nodes.len());

        for node in &topology.nodes {
            if let Some(&index) = index_by_id.get(&node.id) {
                nodes[index].name = node.name.clone();
                report.replaced_nodes += 1;
                continue;
            }

            let index = nodes.len();
            index_by_id.insert(node.id.clone(), index);
            nodes.push(SimNode {
                id: node.id.clone(),
                name: node.name.clone(),
                pos: center.to_vec2() + phyllotaxis(index),
                velocity: Vec2::ZERO,
                fx: None,
                fy: None,
                selected: false,
                degree: 0,
            });
        }

        let mut links = Vec::with_capacity(topology.connections.len());
        let mut first_dropped = None;
        for connection in &topology.connections {
            let (Some(&source), Some(&target)) = (
                index_by_id.get(&connection.source),
                index_by_id.get(&connection.target),
            ) else {
                report.dropped_links += 1;
                first_dropped
                    .get_or_insert_with(|| (connection.source.clone(), connection.target.clone()));
                continue;
            };

            nodes[source].degree += 1;
            nodes[target].degree += 1;
            links.push(SimLink {
                source,
                target,
                strength: connection.strength,
            });
        }

        if let Some((source, target)) = first_dropped {
            warn!(
                dropped = report.dropped_links,
                first_source = %source,
                first_target = %target,
                "dropping connections that reference unknown nodes"
            );
        }

        report.nodes = nodes.len();
        report.links = links.len();

        (
            Self {
                generation,
                nodes,
                links,
                index_by_id,
            },
            report,
        )
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    #[cfg(test)]
    pub fn nodes_mut(&mut self) -> &mut [SimNode] {
        &mut self.nodes
    }

    pub fn links(&self) -> &[SimLink] {
        &self.links
    }

    pub fn parts_mut(&mut self) -> (&mut [SimNode], &[SimLink]) {
        (&mut self.nodes, &self.links)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_by_id.get(id).copied()
    }

    pub fn handle(&self, index: usize) -> Option<NodeHandle> {
        (index < self.nodes.len()).then_some(NodeHandle {
            index,
            generation: self.generation,
        })
    }

    pub fn handle_for(&self, id: &str) -> Option<NodeHandle> {
        self.index_of(id).and_then(|index| self.handle(index))
    }

    pub fn resolve(&self, handle: NodeHandle) -> Option<&SimNode> {
        if handle.generation != self.generation {
            return None;
        }
        self.nodes.get(handle.index)
    }

    pub fn resolve_mut(&mut self, handle: NodeHandle) -> Option<&mut SimNode> {
        if handle.generation != self.generation {
            return None;
        }
        self.nodes.get_mut(handle.index)
    }

    pub fn node(&self, id: &str) -> Option<&SimNode> {
        self.index_of(id).map(|index| &self.nodes[index])
    }

    #[cfg(test)]
    pub fn node_mut(&mut self, id: &str) -> Option<&mut SimNode> {
        self.index_of(id).map(|index| &mut self.nodes[index])
    }

    pub fn selected(&self) -> Option<&SimNode> {
        self.nodes.iter().find(|node| node.selected)
    }

    /// Selects `index` (clearing any other selection) or deselects it if it
    /// was already the selected node. Returns whether anything changed.
    pub fn toggle_selection(&mut self, index: usize) -> bool {
        let Some(was_selected) = self.nodes.get(index).map(|node| node.selected) else {
            return false;
        };

        for node in &mut self.nodes {
            node.selected = false;
        }
        if !was_selected {
            self.nodes[index].selected = true;
        }
        true
    }

    pub fn clear_selection(&mut self) -> bool {
        let mut changed = false;
        for node in &mut self.nodes {
            changed |= node.selected;
            node.selected = false;
        }
        changed
    }
}

// Sunflower seeding: deterministic, evenly spread, no two starts coincide.
fn phyllotaxis(index: usize) -> Vec2 {
    let golden_angle = PI * (3.0 - 5.0_f32.sqrt());
    let radius = INITIAL_RADIUS * (0.5 + index as f32).sqrt();
    let angle = index as f32 * golden_angle;
    vec2(radius * angle.cos(), radius * angle.sin())
}

#[cfg(test)]
mod tests {
    use eframe::egui::pos2;

    use super::*;
    use crate::engine::fixtures::topology;
    use crate::topology::Node;

    #[test]
    fn unknown_endpoints_are_dropped_not_fatal() {
        let (arena, report) = GraphArena::build(
            &topology(&["a", "b"], &[("a", "b", 1.0), ("a", "ghost", 1.0)]),
            pos2(400.0, 300.0),
            1,
        );

        assert_eq!(arena.links().len(), 1);
        assert_eq!(report.dropped_links, 1);
        assert_eq!(arena.nodes()[0].degree, 1);
    }

    #[test]
    fn later_duplicate_id_replaces_earlier_record() {
        let mut input = topology(&["a", "b"], &[]);
        input.nodes.push(Node {
            id: "a".to_owned(),
            name: "renamed".to_owned(),
        });

        let (arena, report) = GraphArena::build(&input, pos2(0.0, 0.0), 1);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.node("a").unwrap().name, "renamed");
        assert_eq!(report.replaced_nodes, 1);
    }

    #[test]
    fn seeded_positions_are_distinct() {
        let (arena, _) = GraphArena::build(
            &topology(&["a", "b", "c", "d"], &[]),
            pos2(400.0, 300.0),
            1,
        );
        let nodes = arena.nodes();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                assert!((nodes[i].pos - nodes[j].pos).length() > 1.0);
            }
        }
    }

    #[test]
    fn selecting_second_node_deselects_first() {
        let (mut arena, _) = GraphArena::build(&topology(&["a", "b"], &[]), pos2(0.0, 0.0), 1);

        assert!(arena.toggle_selection(0));
        assert!(arena.toggle_selection(1));

        assert!(!arena.nodes()[0].selected);
        assert!(arena.nodes()[1].selected);
        assert_eq!(arena.selected().map(|node| node.id.as_str()), Some("b"));

        assert!(arena.toggle_selection(1));
        assert!(arena.selected().is_none());
    }

    #[test]
    fn handles_from_older_generation_do_not_resolve() {
        let input = topology(&["a"], &[]);
        let (old, _) = GraphArena::build(&input, pos2(0.0, 0.0), 1);
        let handle = old.handle_for("a").unwrap();

        let (new, _) = GraphArena::build(&input, pos2(0.0, 0.0), 2);
        assert!(old.resolve(handle).is_some());
        assert!(new.resolve(handle).is_none());
    }
}
