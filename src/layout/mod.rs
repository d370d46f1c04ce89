pub mod arc_pack;
mod bounds;
pub mod collision;
pub mod dimensions;
mod error;
pub mod force;
pub mod jitter;
mod radial;
pub mod routing;
pub mod sectors;
pub(crate) mod types;
pub use bounds::compute_bounds;
pub use error::MalformedTreeError;
pub use types::*;

use std::collections::BTreeMap;

use crate::config::LayoutConfig;
use crate::ir::{ContentArena, ContentNode, CrossLink};

/// What either engine hands back before bounds are taken.
pub(crate) struct Placement {
    pub nodes: BTreeMap<String, LayoutNode>,
    pub edges: Vec<EdgeLayout>,
    pub warnings: Vec<LayoutWarning>,
    pub convergence: Option<Convergence>,
}

/// Lays out the tree under `root` with the chosen engine.
///
/// The tree and cross-links are validated before any geometry is computed;
/// a malformed input yields an error and no partial layout. Warnings and the
/// force engine's convergence report travel in [`Layout::diagnostics`].
pub fn compute_layout(
    root: &ContentNode,
    cross_links: &[CrossLink],
    strategy: LayoutStrategy,
    config: &LayoutConfig,
) -> Result<Layout, MalformedTreeError> {
    let arena = ContentArena::build(root)?;
    arena.check_links(cross_links)?;
    tracing::debug!(
        nodes = arena.len(),
        links = cross_links.len(),
        ?strategy,
        "computing layout"
    );

    let placement = match strategy {
        LayoutStrategy::Radial => radial::layout(&arena, cross_links, config),
        LayoutStrategy::ForceDirected => force::layout(&arena, cross_links, config),
    };
    let bounds = compute_bounds(placement.nodes.values(), config.bounds_padding);

    Ok(Layout {
        strategy,
        nodes: placement.nodes,
        edges: placement.edges,
        bounds,
        diagnostics: LayoutDiagnostics {
            warnings: placement.warnings,
            convergence: placement.convergence,
        },
    })
}

pub(crate) fn content_layout_node(
    node: &ContentNode,
    x: f32,
    y: f32,
    size: Size,
    section: Option<usize>,
) -> LayoutNode {
    LayoutNode {
        id: node.id.clone(),
        source_id: node.id.clone(),
        label: node.text.clone(),
        x,
        y,
        width: size.width,
        height: size.height,
        level: node.level,
        section,
        origin: NodeOrigin::Content,
        metadata: node.metadata.clone(),
    }
}

pub(crate) fn cross_link_edges(links: &[CrossLink]) -> impl Iterator<Item = EdgeLayout> + '_ {
    links.iter().map(|link| EdgeLayout {
        from: link.source.clone(),
        to: link.target.clone(),
        kind: EdgeKind::CrossLink,
        waypoints: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ContentNode {
        let mut root = ContentNode::new("root", "Quarterly review", 0);
        root.push_child(
            ContentNode::new("growth", "Growth", 1)
                .with_child("g1", "New markets")
                .with_child("g2", "Retention"),
        );
        root.push_child(ContentNode::new("risk", "Risk", 1).with_child("r1", "Supply chain"));
        root
    }

    #[test]
    fn layout_places_every_node_once() {
        let root = sample();
        for strategy in [LayoutStrategy::Radial, LayoutStrategy::ForceDirected] {
            let layout = compute_layout(&root, &[], strategy, &LayoutConfig::default()).unwrap();
            assert_eq!(layout.nodes.len(), 6, "{strategy:?}");
            assert_eq!(layout.strategy, strategy);
            let root_node = layout.node("root").unwrap();
            assert_eq!((root_node.x, root_node.y), (0.0, 0.0));
        }
    }

    #[test]
    fn malformed_tree_yields_no_layout() {
        let mut root = sample();
        root.push_child(ContentNode::new("g1", "Duplicate", 1));
        let err = compute_layout(&root, &[], LayoutStrategy::Radial, &LayoutConfig::default()).unwrap_err();
        assert_eq!(err, MalformedTreeError::DuplicateId { id: "g1".into() });
    }

    #[test]
    fn unknown_cross_link_is_rejected() {
        let root = sample();
        let links = [CrossLink {
            source: "g1".into(),
            target: "missing".into(),
        }];
        let err = compute_layout(&root, &links, LayoutStrategy::ForceDirected, &LayoutConfig::default())
            .unwrap_err();
        assert_eq!(err, MalformedTreeError::UnknownLinkEndpoint { id: "missing".into() });
    }

    #[test]
    fn cross_links_become_edges() {
        let root = sample();
        let links = [CrossLink {
            source: "g2".into(),
            target: "r1".into(),
        }];
        let layout = compute_layout(&root, &links, LayoutStrategy::Radial, &LayoutConfig::default()).unwrap();
        let cross: Vec<_> = layout
            .edges
            .iter()
            .filter(|edge| edge.kind == EdgeKind::CrossLink)
            .collect();
        assert_eq!(cross.len(), 1);
        assert_eq!((cross[0].from.as_str(), cross[0].to.as_str()), ("g2", "r1"));
        assert_eq!(layout.edges.len(), 6);
    }

    #[test]
    fn force_layout_reports_convergence() {
        let layout = compute_layout(&sample(), &[], LayoutStrategy::ForceDirected, &LayoutConfig::default()).unwrap();
        assert!(layout.diagnostics.convergence.is_some());
        let radial = compute_layout(&sample(), &[], LayoutStrategy::Radial, &LayoutConfig::default()).unwrap();
        assert!(radial.diagnostics.convergence.is_none());
    }

    #[test]
    fn bounds_contain_all_nodes() {
        let layout = compute_layout(&sample(), &[], LayoutStrategy::Radial, &LayoutConfig::default()).unwrap();
        for node in layout.nodes.values() {
            let rect = node.rect();
            assert!(rect.min_x >= layout.bounds.min_x && rect.max_x <= layout.bounds.max_x);
            assert!(rect.min_y >= layout.bounds.min_y && rect.max_y <= layout.bounds.max_y);
        }
    }
}
