use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::ir::{ContentArena, CrossLink};

use super::arc_pack::{self, PackRequest};
use super::jitter::Jitter;
use super::sectors::{self, Branch};
use super::{
    EdgeKind, EdgeLayout, LayoutNode, LayoutWarning, NodeOrigin, Placement, Size, collision,
    dimensions,
};

/// A placed node whose children still need a ring.
struct Pending {
    /// Index into the output node list.
    node: usize,
    /// Angular interval the node's children may use.
    span: f32,
    /// Arena indices of the children, in input order.
    children: Vec<usize>,
}

pub(super) fn layout(arena: &ContentArena<'_>, links: &[CrossLink], config: &LayoutConfig) -> Placement {
    let radial = &config.radial;
    let root = arena.root();
    let root_size = dimensions::estimate_label(0, &root.node.text, &config.dimensions);
    let mut nodes = vec![super::content_layout_node(root.node, 0.0, 0.0, root_size, None)];
    let mut edges = Vec::new();
    let mut warnings = Vec::new();

    let branches = sectors::balance_branches(arena, radial.max_children_per_branch);
    let sector_list = sectors::allocate(&branches, arena, config);
    tracing::debug!(
        branches = branches.len(),
        themes = root.children.len(),
        radius = radial.theme_radius,
        "sectors allocated"
    );

    let mut frontier = Vec::with_capacity(branches.len());
    for (section, (branch, sector)) in branches.iter().zip(&sector_list).enumerate() {
        let x = radial.theme_radius * sector.mid.cos();
        let y = radial.theme_radius * sector.mid.sin();
        nodes.push(branch_node(arena, branch, x, y, section, config));
        edges.push(structural(&root.node.id, &branch.id));
        if branch.children.is_empty() {
            tracing::warn!(branch = %branch.id, "branch has no children");
            warnings.push(LayoutWarning::EmptyBranch {
                id: branch.id.clone(),
            });
        }
        frontier.push(Pending {
            node: nodes.len() - 1,
            span: sector.span,
            children: branch.children.clone(),
        });
    }
    warnings.extend(collision::resolve(&mut nodes[1..], &config.collision));

    let mut level = 1;
    let mut level_start = 1;
    while frontier.iter().any(|pending| !pending.children.is_empty()) {
        level += 1;
        let floor = nodes[level_start..]
            .iter()
            .map(LayoutNode::distance_from_origin)
            .fold(0.0_f32, f32::max);
        level_start = nodes.len();

        let mut next = Vec::new();
        for pending in &frontier {
            if pending.children.is_empty() {
                continue;
            }
            let parent = &nodes[pending.node];
            let (parent_id, section) = (parent.id.clone(), parent.section);
            let parent_size = Size {
                width: parent.width,
                height: parent.height,
            };
            let anchor = parent.y.atan2(parent.x);
            let distance = parent.distance_from_origin();

            let sizes: Vec<Size> = pending
                .children
                .iter()
                .map(|&child| dimensions::estimate_label(level, &arena.get(child).node.text, &config.dimensions))
                .collect();
            let request = PackRequest {
                anchor_angle: anchor,
                span: pending.span,
                clearance: arc_pack::clearance_radius(distance, parent_size, &sizes, anchor, radial),
            };
            let mut rng = Jitter::seed(&parent_id);
            let slots = arc_pack::pack(request, &sizes, radial, &config.jitter, &mut rng);

            for ((&child, size), slot) in pending.children.iter().zip(sizes).zip(slots) {
                let entry = arena.get(child);
                let x = slot.radius * slot.angle.cos();
                let y = slot.radius * slot.angle.sin();
                nodes.push(super::content_layout_node(entry.node, x, y, size, section));
                edges.push(structural(&parent_id, &entry.node.id));
                next.push(Pending {
                    node: nodes.len() - 1,
                    span: slot.span,
                    children: entry.children.clone(),
                });
            }
        }

        enforce_ring_floor(&mut nodes[level_start..], floor);
        warnings.extend(collision::resolve(&mut nodes[level_start..], &config.collision));
        tracing::debug!(
            level,
            nodes = nodes.len() - level_start,
            floor,
            "ring packed"
        );
        frontier = next;
    }

    edges.extend(super::cross_link_edges(links));
    let nodes: BTreeMap<String, LayoutNode> = nodes.into_iter().map(|node| (node.id.clone(), node)).collect();
    Placement {
        nodes,
        edges,
        warnings,
        convergence: None,
    }
}

fn branch_node(
    arena: &ContentArena<'_>,
    branch: &Branch,
    x: f32,
    y: f32,
    section: usize,
    config: &LayoutConfig,
) -> LayoutNode {
    let theme = arena.get(branch.source).node;
    let label = match branch.origin {
        NodeOrigin::Content => theme.text.clone(),
        NodeOrigin::SplitBranch { .. } => branch.label.clone(),
    };
    let size = dimensions::estimate_label(1, &label, &config.dimensions);
    LayoutNode {
        id: branch.id.clone(),
        source_id: theme.id.clone(),
        label,
        x,
        y,
        width: size.width,
        height: size.height,
        level: 1,
        section: Some(section),
        origin: branch.origin,
        metadata: theme.metadata.clone(),
    }
}

/// Moves any node closer to the origin than `floor` out to `floor`, keeping
/// its angle.
fn enforce_ring_floor(nodes: &mut [LayoutNode], floor: f32) {
    for node in nodes {
        let distance = node.distance_from_origin();
        if distance >= floor {
            continue;
        }
        if distance > 0.0 {
            let scale = floor / distance;
            node.x *= scale;
            node.y *= scale;
        } else {
            node.x = floor;
        }
    }
}

fn structural(from: &str, to: &str) -> EdgeLayout {
    EdgeLayout {
        from: from.to_string(),
        to: to.to_string(),
        kind: EdgeKind::Structural,
        waypoints: Vec::new(),
    }
}
