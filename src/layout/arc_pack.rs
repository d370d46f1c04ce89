// Arc-length packing: place a row of same-level boxes around an arc so that
// their summed widths plus gaps fit a bounded angular budget. Arc length is
// r * angle, so the smallest radius that fits is (sum(widths) + gaps) / budget.

use crate::config::{JitterConfig, RadialConfig};

use super::Size;
use super::jitter::Jitter;

/// Where a packed child goes, in polar coordinates around the origin.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackedSlot {
    pub angle: f32,
    pub radius: f32,
    /// Angular interval this child owns for its own children.
    pub span: f32,
}

/// Anchor for one row of children.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PackRequest {
    /// Angle the row is centered on (the parent's placement angle).
    pub anchor_angle: f32,
    /// Angular interval available to the row.
    pub span: f32,
    /// Smallest radius the row may sit at.
    pub clearance: f32,
}

/// Fraction of the available span a row of `count` children may use.
pub fn utilization(count: usize, config: &RadialConfig) -> f32 {
    let lo = config.min_utilization.min(config.max_utilization);
    let hi = config.max_utilization.max(config.min_utilization);
    (config.base_utilization + config.utilization_per_child * count as f32).clamp(lo, hi)
}

/// Smallest radius at which `sizes`, separated by `gap`, span `budget` radians.
pub fn required_radius(sizes: &[Size], gap: f32, budget: f32) -> f32 {
    if sizes.is_empty() || budget <= 0.0 {
        return 0.0;
    }
    let total: f32 = sizes.iter().map(|size| size.width).sum::<f32>()
        + gap * (sizes.len() as f32 - 1.0);
    total / budget
}

/// How far a box reaches from its center along the ray at `angle`.
pub fn radial_half_extent(size: Size, angle: f32) -> f32 {
    (angle.cos().abs() * size.width + angle.sin().abs() * size.height) / 2.0
}

/// Clearance radius for the children of a parent sitting at `parent_distance`
/// along `angle`.
pub fn clearance_radius(
    parent_distance: f32,
    parent: Size,
    children: &[Size],
    angle: f32,
    config: &RadialConfig,
) -> f32 {
    let child_reach = children
        .iter()
        .map(|size| radial_half_extent(*size, angle))
        .fold(0.0_f32, f32::max);
    parent_distance + radial_half_extent(parent, angle) + config.ring_margin + child_reach
}

pub fn pack(
    request: PackRequest,
    sizes: &[Size],
    config: &RadialConfig,
    jitter: &JitterConfig,
    rng: &mut Jitter,
) -> Vec<PackedSlot> {
    if sizes.is_empty() {
        return Vec::new();
    }
    let budget = request.span * utilization(sizes.len(), config);
    let max_radius = request.clearance + config.max_ring_growth.max(0.0);
    let radius = required_radius(sizes, config.child_gap, budget).clamp(request.clearance, max_radius);

    let angular_gap = config.child_gap / radius;
    let widths: Vec<f32> = sizes.iter().map(|size| size.width / radius).collect();
    let occupied: f32 = widths.iter().sum::<f32>() + angular_gap * (widths.len() as f32 - 1.0);

    let mut cursor = request.anchor_angle - occupied / 2.0;
    let mut slots = Vec::with_capacity(sizes.len());
    for width in widths {
        let angle = cursor + width / 2.0;
        cursor += width + angular_gap;
        // Children split the parent's interval in proportion to their footprint.
        let share = request.span * (width + angular_gap) / (occupied + angular_gap);
        slots.push(PackedSlot {
            angle: angle + rng.next_signed() * jitter.angular,
            radius: radius + rng.next_f32() * jitter.radial,
            span: share.max(config.min_sector_span.min(request.span)),
        });
    }
    slots
}
