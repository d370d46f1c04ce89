use super::{Bounds, LayoutNode};

/// Smallest rectangle containing every node box, grown by `padding` on each
/// side. With no nodes the result is a zero rectangle grown by `padding`.
pub fn compute_bounds<'a, I>(nodes: I, padding: f32) -> Bounds
where
    I: IntoIterator<Item = &'a LayoutNode>,
{
    let hull = nodes
        .into_iter()
        .map(LayoutNode::rect)
        .reduce(|acc, rect| acc.union(&rect))
        .unwrap_or_default();
    hull.inflate(padding)
}
