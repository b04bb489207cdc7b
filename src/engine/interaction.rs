use eframe::egui::{Pos2, Vec2};
use tracing::debug;

use super::arena::{GraphArena, NodeHandle};
use super::physics::Simulation;

/// World-to-viewport mapping: `logical = translate + scale * world`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewTransform {
    pub translate: Vec2,
    pub scale: f32,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            translate: Vec2::ZERO,
            scale: 1.0,
        }
    }
}

impl ViewTransform {
    pub fn apply(&self, world: Pos2) -> Pos2 {
        (self.translate + world.to_vec2() * self.scale).to_pos2()
    }

    pub fn invert(&self, logical: Pos2) -> Pos2 {
        ((logical.to_vec2() - self.translate) / self.scale).to_pos2()
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ZoomLimits {
    pub min: f32,
    pub max: f32,
}

impl Default for ZoomLimits {
    fn default() -> Self {
        Self { min: 0.3, max: 3.0 }
    }
}

#[derive(Clone, Copy, Debug)]
struct PanAnchor {
    pointer: Pos2,
    translate: Vec2,
}

/// Turns pointer gestures into pins, reheats, selection flips and view
/// changes. Holds no layout state of its own.
#[derive(Debug, Default)]
pub struct InteractionController {
    transform: ViewTransform,
    limits: ZoomLimits,
    drag: Option<NodeHandle>,
    pan: Option<PanAnchor>,
    hovered: Option<NodeHandle>,
}

impl InteractionController {
    pub fn new(limits: ZoomLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    pub fn dragging(&self) -> Option<NodeHandle> {
        self.drag
    }

    pub fn hovered(&self) -> Option<NodeHandle> {
        self.hovered
    }

    /// Scale multiplier for a wheel delta in points; scrolling up zooms in.
    pub fn wheel_factor(delta_y: f32) -> f32 {
        2.0_f32.powf(delta_y * 0.002)
    }

    /// Zooms around `pointer`, keeping the world point under it fixed.
    pub fn zoom_at(&mut self, pointer: Pos2, factor: f32) -> bool {
        if !factor.is_finite() || factor <= 0.0 {
            return false;
        }

        let scale = (self.transform.scale * factor).clamp(self.limits.min, self.limits.max);
        if scale == self.transform.scale {
            return false;
        }

        let anchor = self.transform.invert(pointer);
        self.transform.scale = scale;
        self.transform.translate = pointer.to_vec2() - anchor.to_vec2() * scale;
        true
    }

    pub fn begin_pan(&mut self, pointer: Pos2) {
        self.pan = Some(PanAnchor {
            pointer,
            translate: self.transform.translate,
        });
    }

    pub fn pan_to(&mut self, pointer: Pos2) -> bool {
        let Some(anchor) = self.pan else {
            return false;
        };
        self.transform.translate = anchor.translate + (pointer - anchor.pointer);
        true
    }

    pub fn end_pan(&mut self) {
        self.pan = None;
    }

    pub fn reset_view(&mut self) {
        self.transform = ViewTransform::default();
        self.pan = None;
    }

    /// Pins the node where it currently sits and wakes the layout so the
    /// rest of the graph follows the drag.
    pub fn drag_start(
        &mut self,
        arena: &mut GraphArena,
        simulation: &mut Simulation,
        handle: NodeHandle,
    ) -> bool {
        let Some(node) = arena.resolve_mut(handle) else {
            self.drag = None;
            return false;
        };

        let at = node.pos.to_pos2();
        node.pin(at);
        simulation.reheat();
        self.drag = Some(handle);
        true
    }

    pub fn drag_move(&mut self, arena: &mut GraphArena, pointer: Pos2) -> bool {
        let Some(handle) = self.drag else {
            return false;
        };

        let world = self.transform.invert(pointer);
        match arena.resolve_mut(handle) {
            Some(node) => {
                node.pin(world);
                true
            }
            None => {
                debug!(?handle, "drag target vanished");
                self.drag = None;
                false
            }
        }
    }

    /// Unpins and lets alpha decay again; no extra reheat.
    pub fn drag_end(&mut self, arena: &mut GraphArena, simulation: &mut Simulation) -> bool {
        let Some(handle) = self.drag.take() else {
            return false;
        };

        simulation.release();
        match arena.resolve_mut(handle) {
            Some(node) => {
                node.unpin();
                true
            }
            None => {
                debug!(?handle, "drag ended after its node was replaced");
                false
            }
        }
    }

    pub fn click_node(&mut self, arena: &mut GraphArena, handle: NodeHandle) -> bool {
        if arena.resolve(handle).is_none() {
            return false;
        }
        arena.toggle_selection(handle.index)
    }

    pub fn click_background(&mut self, arena: &mut GraphArena) -> bool {
        arena.clear_selection()
    }

    pub fn hover(&mut self, handle: Option<NodeHandle>) -> bool {
        let changed = self.hovered != handle;
        self.hovered = handle;
        changed
    }

    /// Forgets every gesture in flight. The view transform survives.
    pub fn cancel(&mut self) {
        self.drag = None;
        self.pan = None;
        self.hovered = None;
    }
}
