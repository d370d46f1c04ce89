// Force-directed placement: repulsion between all nodes, springs along tree
// edges and cross-links, a hierarchy force holding each level near its ring,
// and weak centering. The root is pinned at the origin.

use std::collections::{BTreeMap, BTreeSet};
use std::f32::consts::PI;

use crate::config::{ForceConfig, LayoutConfig};
use crate::ir::{ContentArena, CrossLink};

use super::jitter::Jitter;
use super::{Convergence, EdgeKind, EdgeLayout, LayoutNode, Placement, collision, dimensions, routing};

/// Distances below this are treated as coincident when picking a direction.
const COINCIDENT: f32 = 1e-4;
/// Golden angle, used to fan out coincident pairs deterministically.
const GOLDEN_ANGLE: f32 = 2.399_963;
/// Fractional radius jitter applied on initialization.
const INITIAL_RADIUS_JITTER: f32 = 0.05;

#[derive(Debug, Clone, PartialEq)]
pub struct ForceNode {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub mass: f32,
    pub fixed: bool,
    pub level: usize,
}

/// Simulation state for one content tree. Node `i` corresponds to arena index `i`.
#[derive(Debug, Clone)]
pub struct ForceGraph {
    pub nodes: Vec<ForceNode>,
    /// Undirected neighbor pairs `(low, high)`; tree edges and cross-links.
    pub adjacency: BTreeSet<(usize, usize)>,
}

impl ForceGraph {
    pub fn build(arena: &ContentArena<'_>, links: &[CrossLink], config: &ForceConfig) -> Self {
        let mut nodes = Vec::with_capacity(arena.len());
        let mut adjacency = BTreeSet::new();
        for (idx, entry) in arena.iter() {
            let fixed = entry.parent.is_none();
            nodes.push(ForceNode {
                x: 0.0,
                y: 0.0,
                vx: 0.0,
                vy: 0.0,
                mass: 1.0 + entry.children.len() as f32 * config.mass_per_child,
                fixed,
                level: entry.node.level,
            });
            if let Some(parent) = entry.parent {
                adjacency.insert((parent.min(idx), parent.max(idx)));
            }
        }
        for link in links {
            if let (Some(a), Some(b)) = (arena.lookup(&link.source), arena.lookup(&link.target))
                && a != b
            {
                adjacency.insert((a.min(b), a.max(b)));
            }
        }
        let mut graph = Self { nodes, adjacency };
        graph.initialize(arena, config);
        graph
    }

    /// Places each level on its own ring with seeded angular and radial jitter.
    fn initialize(&mut self, arena: &ContentArena<'_>, config: &ForceConfig) {
        let mut levels: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (idx, entry) in arena.iter() {
            levels.entry(entry.node.level).or_default().push(idx);
        }
        for (level, members) in levels {
            if level == 0 {
                continue;
            }
            let slot = 2.0 * PI / members.len() as f32;
            let ring = level as f32 * config.level_spacing;
            for (i, &idx) in members.iter().enumerate() {
                let mut rng = Jitter::seed(&arena.get(idx).node.id);
                let angle = slot * (i as f32 + 0.5) + rng.next_signed() * slot * config.initial_jitter / 2.0;
                let radius = ring * (1.0 + rng.next_signed() * INITIAL_RADIUS_JITTER);
                let node = &mut self.nodes[idx];
                node.x = radius * angle.cos();
                node.y = radius * angle.sin();
            }
        }
    }

    fn forces(&self, config: &ForceConfig) -> Vec<(f32, f32)> {
        let count = self.nodes.len();
        let mut forces = vec![(0.0_f32, 0.0_f32); count];

        for i in 0..count {
            for j in (i + 1)..count {
                let (a, b) = (&self.nodes[i], &self.nodes[j]);
                let (ux, uy, dist) = direction(a.x - b.x, a.y - b.y, i + j);
                let dist = dist.max(config.min_distance);
                let push = config.repulsion / (dist * dist);
                forces[i].0 += ux * push;
                forces[i].1 += uy * push;
                forces[j].0 -= ux * push;
                forces[j].1 -= uy * push;
            }
        }

        for &(i, j) in &self.adjacency {
            let (a, b) = (&self.nodes[i], &self.nodes[j]);
            let (ux, uy, dist) = direction(b.x - a.x, b.y - a.y, i + j);
            let pull = config.spring * (dist - config.ideal_link_length);
            forces[i].0 += ux * pull;
            forces[i].1 += uy * pull;
            forces[j].0 -= ux * pull;
            forces[j].1 -= uy * pull;
        }

        for (node, force) in self.nodes.iter().zip(forces.iter_mut()) {
            let radius = node.x.hypot(node.y);
            if radius > COINCIDENT {
                let target = node.level as f32 * config.level_spacing;
                let pull = config.hierarchy * (target - radius);
                force.0 += node.x / radius * pull;
                force.1 += node.y / radius * pull;
            }
            force.0 -= config.centering * node.x;
            force.1 -= config.centering * node.y;
        }
        forces
    }

    /// Runs until the largest force on a free node drops below the threshold
    /// or the iteration budget runs out. Positions are left at the last step
    /// either way.
    pub fn simulate(&mut self, config: &ForceConfig) -> Convergence {
        if self.nodes.iter().all(|node| node.fixed) {
            return Convergence {
                converged: true,
                max_force: 0.0,
                iterations: 0,
            };
        }

        let mut max_force = 0.0;
        for iteration in 1..=config.max_iterations {
            let forces = self.forces(config);
            max_force = self.max_free_force(&forces);
            if max_force < config.convergence_threshold {
                tracing::debug!(iteration, max_force, "force simulation converged");
                return Convergence {
                    converged: true,
                    max_force,
                    iterations: iteration,
                };
            }
            self.integrate(&forces, config);
        }

        if config.max_iterations == 0 {
            max_force = self.max_free_force(&self.forces(config));
        }
        tracing::warn!(
            iterations = config.max_iterations,
            max_force,
            threshold = config.convergence_threshold,
            "force simulation did not converge"
        );
        Convergence {
            converged: false,
            max_force,
            iterations: config.max_iterations,
        }
    }

    fn max_free_force(&self, forces: &[(f32, f32)]) -> f32 {
        self.nodes
            .iter()
            .zip(forces)
            .filter(|(node, _)| !node.fixed)
            .map(|(_, force)| force.0.hypot(force.1))
            .fold(0.0_f32, f32::max)
    }

    fn integrate(&mut self, forces: &[(f32, f32)], config: &ForceConfig) {
        for (node, force) in self.nodes.iter_mut().zip(forces) {
            if node.fixed {
                node.x = 0.0;
                node.y = 0.0;
                node.vx = 0.0;
                node.vy = 0.0;
                continue;
            }
            node.vx = (node.vx + force.0 / node.mass * config.time_step) * config.damping;
            node.vy = (node.vy + force.1 / node.mass * config.time_step) * config.damping;
            let mut dx = node.vx * config.time_step;
            let mut dy = node.vy * config.time_step;
            let step = dx.hypot(dy);
            if step > config.max_displacement && step > 0.0 {
                let scale = config.max_displacement / step;
                dx *= scale;
                dy *= scale;
            }
            node.x += dx;
            node.y += dy;
        }
    }
}

/// Unit vector and length of `(dx, dy)`. Coincident points get a direction
/// derived from `salt` so they separate the same way on every run.
fn direction(dx: f32, dy: f32, salt: usize) -> (f32, f32, f32) {
    let dist = dx.hypot(dy);
    if dist < COINCIDENT {
        let angle = salt as f32 * GOLDEN_ANGLE;
        return (angle.cos(), angle.sin(), 0.0);
    }
    (dx / dist, dy / dist, dist)
}

pub(super) fn layout(arena: &ContentArena<'_>, links: &[CrossLink], config: &LayoutConfig) -> Placement {
    let mut graph = ForceGraph::build(arena, links, &config.force);
    tracing::debug!(
        nodes = graph.nodes.len(),
        springs = graph.adjacency.len(),
        "force graph built"
    );
    let convergence = graph.simulate(&config.force);

    let sections = level_one_sections(arena);
    let mut nodes: Vec<LayoutNode> = arena
        .iter()
        .map(|(idx, entry)| {
            let size = dimensions::estimate_label(entry.node.level, &entry.node.text, &config.dimensions);
            let state = &graph.nodes[idx];
            super::content_layout_node(entry.node, state.x, state.y, size, sections[idx])
        })
        .collect();

    let mut warnings = Vec::new();
    if config.force.resolve_collisions {
        warnings.extend(collision::resolve(&mut nodes, &config.collision));
    }

    let mut edges: Vec<EdgeLayout> = arena
        .iter()
        .filter_map(|(_, entry)| {
            let parent = arena.get(entry.parent?);
            Some(EdgeLayout {
                from: parent.node.id.clone(),
                to: entry.node.id.clone(),
                kind: EdgeKind::Structural,
                waypoints: Vec::new(),
            })
        })
        .collect();
    edges.extend(super::cross_link_edges(links));

    let nodes: BTreeMap<String, LayoutNode> = nodes.into_iter().map(|node| (node.id.clone(), node)).collect();
    if config.force.route_edges {
        routing::route_edges(&mut edges, &nodes, &config.routing);
    }

    Placement {
        nodes,
        edges,
        warnings,
        convergence: Some(convergence),
    }
}

/// Index of each node's level-1 ancestor among the root's children.
fn level_one_sections(arena: &ContentArena<'_>) -> Vec<Option<usize>> {
    let mut sections = vec![None; arena.len()];
    for (section, &theme) in arena.root().children.iter().enumerate() {
        sections[theme] = Some(section);
    }
    // Parents precede children in the arena, so one forward pass suffices.
    for (idx, entry) in arena.iter() {
        if let Some(parent) = entry.parent
            && sections[idx].is_none()
        {
            sections[idx] = sections[parent];
        }
    }
    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ir::ContentNode;

    fn pair() -> ContentNode {
        ContentNode::new("root", "Root", 0).with_child("child", "Only child")
    }

    #[test]
    fn two_nodes_settle_near_ideal_length() {
        let root = pair();
        let arena = ContentArena::build(&root).unwrap();
        let config = ForceConfig {
            convergence_threshold: 0.05,
            ..ForceConfig::default()
        };
        let mut graph = ForceGraph::build(&arena, &[], &config);
        let convergence = graph.simulate(&config);
        assert!(convergence.converged, "{convergence:?}");
        assert!(convergence.iterations <= 200);
        assert!(convergence.max_force < config.convergence_threshold);
        let child = &graph.nodes[1];
        let distance = child.x.hypot(child.y);
        let ideal = config.ideal_link_length;
        assert!((distance - ideal).abs() < ideal * 0.1, "distance {distance}");
        assert_eq!((graph.nodes[0].x, graph.nodes[0].y), (0.0, 0.0));
    }

    #[test]
    fn mid_sized_tree_converges_with_defaults() {
        let mut root = ContentNode::new("root", "Root", 0);
        for t in 0..6 {
            let mut theme = ContentNode::new(format!("t{t}"), "Theme", 1);
            for f in 0..8 {
                theme.push_child(
                    ContentNode::new(format!("t{t}f{f}"), "Finding", 2)
                        .with_child(format!("t{t}f{f}a"), "Leaf")
                        .with_child(format!("t{t}f{f}b"), "Leaf"),
                );
            }
            root.push_child(theme);
        }
        let arena = ContentArena::build(&root).unwrap();
        let config = ForceConfig::default();
        let mut graph = ForceGraph::build(&arena, &[], &config);
        let convergence = graph.simulate(&config);
        assert!(convergence.converged, "{convergence:?}");
        assert!(convergence.max_force < config.convergence_threshold);
    }

    #[test]
    fn root_only_graph_is_trivially_converged() {
        let root = ContentNode::new("root", "Root", 0);
        let arena = ContentArena::build(&root).unwrap();
        let mut graph = ForceGraph::build(&arena, &[], &ForceConfig::default());
        let convergence = graph.simulate(&ForceConfig::default());
        assert!(convergence.converged);
        assert_eq!(convergence.iterations, 0);
    }

    #[test]
    fn exhausted_budget_reports_non_convergence() {
        let mut root = ContentNode::new("root", "Root", 0);
        for t in 0..4 {
            root.push_child(ContentNode::new(format!("t{t}"), "Theme", 1).with_child(format!("t{t}-a"), "Leaf"));
        }
        let arena = ContentArena::build(&root).unwrap();
        let config = ForceConfig {
            max_iterations: 2,
            convergence_threshold: 0.0,
            ..ForceConfig::default()
        };
        let mut graph = ForceGraph::build(&arena, &[], &config);
        let convergence = graph.simulate(&config);
        assert!(!convergence.converged);
        assert_eq!(convergence.iterations, 2);
        assert!(convergence.max_force.is_finite());
    }

    #[test]
    fn initialization_is_seeded() {
        let mut root = ContentNode::new("root", "Root", 0);
        root.push_child(ContentNode::new("a", "A", 1));
        root.push_child(ContentNode::new("b", "B", 1));
        let arena = ContentArena::build(&root).unwrap();
        let config = ForceConfig::default();
        let first = ForceGraph::build(&arena, &[], &config);
        let second = ForceGraph::build(&arena, &[], &config);
        assert_eq!(first.nodes, second.nodes);
        for node in &first.nodes[1..] {
            let r = node.x.hypot(node.y);
            assert!((r - config.level_spacing).abs() <= config.level_spacing * INITIAL_RADIUS_JITTER + 1e-3);
        }
    }

    #[test]
    fn cross_links_join_the_adjacency() {
        let mut root = ContentNode::new("root", "Root", 0);
        root.push_child(ContentNode::new("a", "A", 1));
        root.push_child(ContentNode::new("b", "B", 1));
        let arena = ContentArena::build(&root).unwrap();
        let links = [CrossLink {
            source: "b".into(),
            target: "a".into(),
        }];
        let graph = ForceGraph::build(&arena, &links, &ForceConfig::default());
        assert!(graph.adjacency.contains(&(1, 2)));
        assert_eq!(graph.adjacency.len(), 3);
    }

    #[test]
    fn sections_follow_level_one_ancestor() {
        let mut root = ContentNode::new("root", "Root", 0);
        root.push_child(ContentNode::new("a", "A", 1).with_child("a1", "x"));
        root.push_child(ContentNode::new("b", "B", 1).with_child("b1", "y"));
        let arena = ContentArena::build(&root).unwrap();
        let sections = level_one_sections(&arena);
        assert_eq!(sections, vec![None, Some(0), Some(1), Some(0), Some(1)]);
    }
}
