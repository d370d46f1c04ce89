use std::collections::BTreeMap;

use crate::config::CollisionConfig;

use super::sectors::normalize_angle;
use super::{LayoutNode, LayoutWarning};

/// Below this distance a node has no usable direction and is pushed along +x.
const MIN_PUSH_RADIUS: f32 = 1e-3;

/// Whether two boxes intersect once each is inflated by half of `margin` on
/// every side.
pub fn boxes_overlap(a: &LayoutNode, b: &LayoutNode, margin: f32) -> bool {
    let half = margin / 2.0;
    a.rect().inflate(half).overlaps(&b.rect().inflate(half))
}

/// Pushes overlapping same-level nodes radially outward until a full pass
/// finds nothing to fix or the iteration cap is hit. The root (level 0) is
/// never moved. Pairs are visited in id order, so the result depends only on
/// the input.
pub fn resolve(nodes: &mut [LayoutNode], config: &CollisionConfig) -> Vec<LayoutWarning> {
    let mut by_level: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (idx, node) in nodes.iter().enumerate() {
        if node.level > 0 {
            by_level.entry(node.level).or_default().push(idx);
        }
    }

    let mut warnings = Vec::new();
    for (level, mut members) in by_level {
        members.sort_by(|&a, &b| nodes[a].id.cmp(&nodes[b].id));
        let mut resolved = false;
        let mut passes = 0;
        while passes < config.max_iterations {
            passes += 1;
            let mut remaining = 0;
            for i in 0..members.len() {
                for j in (i + 1)..members.len() {
                    let (a, b) = (members[i], members[j]);
                    if !boxes_overlap(&nodes[a], &nodes[b], config.margin) {
                        continue;
                    }
                    remaining += 1;
                    let later = if is_later(&nodes[a], &nodes[b]) { a } else { b };
                    push_outward(&mut nodes[later], config.step);
                }
            }
            if remaining == 0 {
                resolved = true;
                break;
            }
        }
        if !resolved {
            let overlaps = count_overlaps(nodes, &members, config.margin);
            if overlaps > 0 {
                tracing::warn!(level, overlaps, passes, "collision budget exhausted");
                warnings.push(LayoutWarning::CollisionBudgetExhausted { level, overlaps });
            }
        } else {
            tracing::debug!(level, passes, nodes = members.len(), "level resolved");
        }
    }
    warnings
}

pub fn count_overlaps(nodes: &[LayoutNode], members: &[usize], margin: f32) -> usize {
    let mut count = 0;
    for i in 0..members.len() {
        for j in (i + 1)..members.len() {
            if boxes_overlap(&nodes[members[i]], &nodes[members[j]], margin) {
                count += 1;
            }
        }
    }
    count
}

/// True when `a` sits at a larger polar angle than `b` (ties go to the larger id).
fn is_later(a: &LayoutNode, b: &LayoutNode) -> bool {
    let angle_a = polar_angle(a);
    let angle_b = polar_angle(b);
    if angle_a != angle_b {
        return angle_a > angle_b;
    }
    a.id > b.id
}

fn polar_angle(node: &LayoutNode) -> f32 {
    normalize_angle(node.y.atan2(node.x))
}

/// Moves `node` `step` further from the origin along its current ray.
fn push_outward(node: &mut LayoutNode, step: f32) {
    let radius = node.distance_from_origin();
    if radius < MIN_PUSH_RADIUS {
        node.x += step;
        return;
    }
    let scale = (radius + step) / radius;
    node.x *= scale;
    node.y *= scale;
}
