use eframe::egui::Color32;

use crate::topology::Connection;

pub const RED: Color32 = Color32::from_rgb(0xFF, 0x00, 0x00);
pub const ORANGE: Color32 = Color32::from_rgb(0xFF, 0xA5, 0x00);
pub const GREEN: Color32 = Color32::from_rgb(0x00, 0xFF, 0x00);

/// Strength at which the ramp switches from red→orange to orange→green.
pub const ORANGE_BREAK: f32 = 0.95;

fn lerp_channel(from: u8, to: u8, t: f32) -> u8 {
    (from as f32 + (to as f32 - from as f32) * t).round() as u8
}

fn lerp_rgb(from: Color32, to: Color32, t: f32) -> Color32 {
    Color32::from_rgb(
        lerp_channel(from.r(), to.r(), t),
        lerp_channel(from.g(), to.g(), t),
        lerp_channel(from.b(), to.b(), t),
    )
}

/// Edge color for a link strength.
///
/// Expects `strength` in `[0, 1]`; values outside that range are not
/// checked and extrapolate along the nearest segment (channels saturate).
pub fn strength_to_color(strength: f32) -> Color32 {
    if strength <= ORANGE_BREAK {
        lerp_rgb(RED, ORANGE, strength / ORANGE_BREAK)
    } else {
        lerp_rgb(ORANGE, GREEN, (strength - ORANGE_BREAK) / (1.0 - ORANGE_BREAK))
    }
}

/// Only a perfect score counts as healthy.
pub fn is_ok(strength: f32) -> bool {
    strength == 1.0
}

pub fn count_by(connections: &[Connection], predicate: impl Fn(&Connection) -> bool) -> usize {
    connections.iter().filter(|connection| predicate(connection)).count()
}

/// Mean strength as a percentage, `None` when there is nothing to average.
pub fn success_rate(connections: &[Connection]) -> Option<f32> {
    if connections.is_empty() {
        return None;
    }
    let sum = connections
        .iter()
        .map(|connection| connection.strength)
        .sum::<f32>();
    Some(sum / connections.len() as f32 * 100.0)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HealthTier {
    Healthy,
    Degraded,
    Failing,
}

impl HealthTier {
    pub fn for_rate(rate: Option<f32>) -> Self {
        match rate {
            Some(rate) if rate == 100.0 => Self::Healthy,
            Some(rate) if (95.0..100.0).contains(&rate) => Self::Degraded,
            _ => Self::Failing,
        }
    }

    pub fn color(self) -> Color32 {
        match self {
            Self::Healthy => Color32::from_rgb(34, 197, 94),
            Self::Degraded => Color32::from_rgb(249, 115, 22),
            Self::Failing => Color32::from_rgb(239, 68, 68),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HealthSummary {
    pub nodes: usize,
    pub connections: usize,
    pub ok: usize,
    pub errors: usize,
    pub success_rate: Option<f32>,
}

impl HealthSummary {
    pub fn new(node_count: usize, connections: &[Connection]) -> Self {
        Self {
            nodes: node_count,
            connections: connections.len(),
            ok: count_by(connections, |connection| is_ok(connection.strength)),
            errors: count_by(connections, |connection| !is_ok(connection.strength)),
            success_rate: success_rate(connections),
        }
    }

    pub fn tier(&self) -> HealthTier {
        HealthTier::for_rate(self.success_rate)
    }

    pub fn rate_label(&self) -> String {
        match self.success_rate {
            Some(rate) => format!("{rate:.1}%"),
            None => "N/A".to_owned(),
        }
    }
}
