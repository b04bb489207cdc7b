use eframe::egui::{Pos2, Vec2, vec2};

use super::super::arena::{SimLink, SimNode};

/// Unit vector and length of `delta`; coincident points get a fixed
/// per-pair direction and length zero.
fn separation(delta: Vec2, a: usize, b: usize) -> (Vec2, f32) {
    let length = delta.length();
    if length > 1e-4 {
        (delta / length, length)
    } else {
        let angle = ((a as f32) * 0.618_034 + (b as f32) * 0.414_214) * std::f32::consts::TAU;
        (vec2(angle.cos(), angle.sin()), 0.0)
    }
}

/// Springs toward `distance`, measured on the positions each node is about
/// to reach. The endpoint with fewer links absorbs more of the correction.
pub(super) fn apply_links(
    nodes: &mut [SimNode],
    links: &[SimLink],
    distance: f32,
    distance_min: f32,
    alpha: f32,
) {
    for link in links {
        if link.is_self_loop() || link.source >= nodes.len() || link.target >= nodes.len() {
            continue;
        }
        let (source, target) = (link.source, link.target);

        let delta = (nodes[target].pos + nodes[target].velocity)
            - (nodes[source].pos + nodes[source].velocity);
        let (direction, length) = separation(delta, source, target);
        let length = length.max(distance_min);

        let correction = direction * ((length - distance) * alpha * link.strength);

        let source_degree = nodes[source].degree.max(1) as f32;
        let target_degree = nodes[target].degree.max(1) as f32;
        let bias = source_degree / (source_degree + target_degree);

        nodes[target].velocity -= correction * bias;
        nodes[source].velocity += correction * (1.0 - bias);
    }
}

/// Pairwise inverse-distance repulsion for negative `strength`.
pub(super) fn apply_many_body(nodes: &mut [SimNode], strength: f32, distance_min: f32, alpha: f32) {
    let node_count = nodes.len();
    for i in 0..node_count {
        for j in (i + 1)..node_count {
            let (direction, distance) = separation(nodes[j].pos - nodes[i].pos, i, j);
            let impulse = direction * (strength * alpha / distance.max(distance_min));

            nodes[i].velocity += impulse;
            nodes[j].velocity -= impulse;
        }
    }
}

/// Translates every node so the centroid lands on `center`.
pub(super) fn apply_centering(nodes: &mut [SimNode], center: Pos2) {
    if nodes.is_empty() {
        return;
    }

    let mut centroid = Vec2::ZERO;
    for node in nodes.iter() {
        centroid += node.pos;
    }
    centroid /= nodes.len() as f32;

    let shift = center.to_vec2() - centroid;
    if shift.length_sq() <= f32::EPSILON {
        return;
    }
    for node in nodes.iter_mut() {
        node.pos += shift;
    }
}

/// Pushes overlapping disks apart along their center line. Pinned axes are
/// never moved; a pinned node hands the whole correction to its partner.
pub(super) fn resolve_collisions(nodes: &mut [SimNode], radius: f32, iterations: usize) {
    let min_separation = radius * 2.0;
    let node_count = nodes.len();

    for _ in 0..iterations {
        for i in 0..node_count {
            for j in (i + 1)..node_count {
                let (direction, distance) = separation(nodes[j].pos - nodes[i].pos, i, j);
                if distance >= min_separation {
                    continue;
                }

                let weight_i = if nodes[i].is_pinned() { 0.0 } else { 1.0 };
                let weight_j = if nodes[j].is_pinned() { 0.0 } else { 1.0 };
                let total = weight_i + weight_j;
                if total == 0.0 {
                    continue;
                }

                let push = direction * (min_separation - distance);
                nudge(&mut nodes[i], -push * (weight_i / total));
                nudge(&mut nodes[j], push * (weight_j / total));
            }
        }
    }
}

fn nudge(node: &mut SimNode, offset: Vec2) {
    if node.fx.is_none() {
        node.pos.x += offset.x;
    }
    if node.fy.is_none() {
        node.pos.y += offset.y;
    }
}

/// Velocity step: pinned axes snap to the pin and lose their velocity.
pub(super) fn integrate(nodes: &mut [SimNode], velocity_decay: f32) {
    let retain = 1.0 - velocity_decay;
    for node in nodes.iter_mut() {
        match node.fx {
            Some(fx) => {
                node.pos.x = fx;
                node.velocity.x = 0.0;
            }
            None => {
                node.velocity.x *= retain;
                node.pos.x += node.velocity.x;
            }
        }
        match node.fy {
            Some(fy) => {
                node.pos.y = fy;
                node.velocity.y = 0.0;
            }
            None => {
                node.velocity.y *= retain;
                node.pos.y += node.velocity.y;
            }
        }
    }
}
