use std::collections::BTreeMap;

use crate::config::RoutingConfig;

use super::{EdgeLayout, LayoutNode, Rect};

// ── Obstacle escape ─────────────────────────────────────────────────
/// Extra distance past an obstacle edge so the moved point is strictly outside.
const EXIT_NUDGE: f32 = 1.0;
/// Edges shorter than this have no usable normal and are left straight.
const MIN_EDGE_LENGTH: f32 = 1e-3;

/// Bends edges that cross unrelated nodes. Each edge is sampled at
/// `config.samples` evenly spaced interior points; any sample that falls
/// inside another node's box (grown by `config.clearance`) is pushed along the
/// edge normal, away from that node, until it clears. Edges that needed no
/// push keep empty waypoints and render straight. Returns how many edges were
/// bent.
pub fn route_edges(
    edges: &mut [EdgeLayout],
    nodes: &BTreeMap<String, LayoutNode>,
    config: &RoutingConfig,
) -> usize {
    let mut bent = 0;
    for edge in edges.iter_mut() {
        let (Some(from), Some(to)) = (nodes.get(&edge.from), nodes.get(&edge.to)) else {
            continue;
        };
        let obstacles: Vec<Rect> = nodes
            .values()
            .filter(|node| node.id != from.id && node.id != to.id)
            .map(|node| node.rect().inflate(config.clearance))
            .collect();
        match route_segment((from.x, from.y), (to.x, to.y), &obstacles, config) {
            Some(waypoints) => {
                edge.waypoints = waypoints;
                bent += 1;
            }
            None => edge.waypoints.clear(),
        }
    }
    if bent > 0 {
        tracing::debug!(bent, total = edges.len(), "edges routed around obstacles");
    }
    bent
}

/// Waypoints for the segment `start -> end`, or `None` when the straight line
/// already clears every obstacle.
pub fn route_segment(
    start: (f32, f32),
    end: (f32, f32),
    obstacles: &[Rect],
    config: &RoutingConfig,
) -> Option<Vec<(f32, f32)>> {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let length = dx.hypot(dy);
    if length < MIN_EDGE_LENGTH || config.samples == 0 {
        return None;
    }
    let normal = (-dy / length, dx / length);

    let mut moved = false;
    let mut points = Vec::with_capacity(config.samples);
    for k in 1..=config.samples {
        let t = k as f32 / (config.samples + 1) as f32;
        let mut point = (start.0 + dx * t, start.1 + dy * t);
        for _ in 0..config.max_push_steps {
            let Some(rect) = obstacles.iter().find(|rect| rect.contains(point)) else {
                break;
            };
            let center = rect.center();
            let side = (point.0 - center.0) * normal.0 + (point.1 - center.1) * normal.1;
            let sign = if side < 0.0 { -1.0 } else { 1.0 };
            let dir = (normal.0 * sign, normal.1 * sign);
            let exit = exit_distance(rect, point, dir) + EXIT_NUDGE;
            point = (point.0 + dir.0 * exit, point.1 + dir.1 * exit);
            moved = true;
        }
        points.push(point);
    }
    moved.then_some(points)
}

/// Distance from `point` (inside `rect`) to the rect boundary along unit `dir`.
fn exit_distance(rect: &Rect, point: (f32, f32), dir: (f32, f32)) -> f32 {
    let along = |p: f32, d: f32, lo: f32, hi: f32| {
        if d > 0.0 {
            (hi - p) / d
        } else if d < 0.0 {
            (lo - p) / d
        } else {
            f32::INFINITY
        }
    };
    let tx = along(point.0, dir.0, rect.min_x, rect.max_x);
    let ty = along(point.1, dir.1, rect.min_y, rect.max_y);
    tx.min(ty).max(0.0)
}
