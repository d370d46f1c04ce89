use std::f32::consts::PI;

use crate::config::{LayoutConfig, SectorWeighting};
use crate::ir::ContentArena;

use super::{NodeOrigin, Sector};

/// A top-level branch as the radial engine sees it. Usually one theme node;
/// an overcrowded theme becomes several branches sharing its `source`.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub id: String,
    pub label: String,
    /// Arena index of the theme node this branch was derived from.
    pub source: usize,
    /// Arena indices of the children carried by this branch, in input order.
    pub children: Vec<usize>,
    pub origin: NodeOrigin,
}

/// Splits every root child with more than `max_children` children into
/// evenly sized, order-preserving chunks. The arena is not modified.
pub fn balance_branches(arena: &ContentArena<'_>, max_children: usize) -> Vec<Branch> {
    let max_children = max_children.max(1);
    let mut branches = Vec::new();
    for &theme_idx in &arena.root().children {
        let theme = arena.get(theme_idx);
        let children = &theme.children;
        if children.len() <= max_children {
            branches.push(Branch {
                id: theme.node.id.clone(),
                label: theme.node.text.clone(),
                source: theme_idx,
                children: children.clone(),
                origin: NodeOrigin::Content,
            });
            continue;
        }

        let parts = children.len().div_ceil(max_children);
        let base = children.len() / parts;
        let extra = children.len() % parts;
        let mut cursor = 0;
        for part in 1..=parts {
            let take = base + usize::from(part <= extra);
            let chunk = children[cursor..cursor + take].to_vec();
            cursor += take;
            let id = if part == 1 {
                theme.node.id.clone()
            } else {
                unique_part_id(arena, &theme.node.id, part)
            };
            branches.push(Branch {
                id,
                label: format!("{} ({})", theme.node.text, part),
                source: theme_idx,
                children: chunk,
                origin: NodeOrigin::SplitBranch { part, parts },
            });
        }
        tracing::debug!(
            theme = %theme.node.id,
            children = children.len(),
            parts,
            "split overcrowded branch"
        );
    }
    branches
}

fn unique_part_id(arena: &ContentArena<'_>, base: &str, part: usize) -> String {
    let mut id = format!("{base}~{part}");
    while arena.lookup(&id).is_some() {
        id.push('~');
    }
    id
}

pub fn branch_weight(branch: &Branch, arena: &ContentArena<'_>, weighting: SectorWeighting) -> f32 {
    match weighting {
        SectorWeighting::Uniform => 1.0,
        SectorWeighting::SubtreeSize => {
            let below: usize = branch
                .children
                .iter()
                .map(|&child| 1 + arena.descendant_count(child))
                .sum();
            1.0 + below as f32
        }
    }
}

/// Sectors for the given branches, in branch order.
pub fn allocate(branches: &[Branch], arena: &ContentArena<'_>, config: &LayoutConfig) -> Vec<Sector> {
    let weights: Vec<f32> = branches
        .iter()
        .map(|branch| branch_weight(branch, arena, config.radial.weighting))
        .collect();
    allocate_weights(&weights, config)
}

/// Shares the circle minus one gap per sector in proportion to `weights`.
/// Sectors that would fall below the configured minimum span are clamped up
/// and the remainder is re-shared among the rest.
pub fn allocate_weights(weights: &[f32], config: &LayoutConfig) -> Vec<Sector> {
    let count = weights.len();
    if count == 0 {
        return Vec::new();
    }
    let radial = &config.radial;
    let available = config.available_sweep(count);
    let min_span = radial.min_sector_span.min(available / count as f32);

    let mut spans = vec![0.0_f32; count];
    let mut clamped = vec![false; count];
    loop {
        let free_weight: f32 = weights
            .iter()
            .zip(&clamped)
            .filter(|(_, fixed)| !**fixed)
            .map(|(w, _)| w.max(0.0))
            .sum();
        let taken: f32 = spans
            .iter()
            .zip(&clamped)
            .filter(|(_, fixed)| **fixed)
            .map(|(s, _)| *s)
            .sum();
        let free_sweep = (available - taken).max(0.0);
        let free_count = clamped.iter().filter(|fixed| !**fixed).count();
        if free_count == 0 {
            break;
        }

        let share = |w: f32| {
            if free_weight > 0.0 {
                free_sweep * w.max(0.0) / free_weight
            } else {
                free_sweep / free_count as f32
            }
        };
        let mut changed = false;
        for idx in 0..count {
            if !clamped[idx] && share(weights[idx]) < min_span {
                spans[idx] = min_span;
                clamped[idx] = true;
                changed = true;
            }
        }
        if !changed {
            for idx in 0..count {
                if !clamped[idx] {
                    spans[idx] = share(weights[idx]);
                }
            }
            break;
        }
    }

    let gap = radial.sector_gap;
    let mut cursor = radial.start_angle - (spans[0] + gap) / 2.0;
    let mut sectors = Vec::with_capacity(count);
    for span in spans {
        let start = cursor + gap / 2.0;
        let end = start + span;
        sectors.push(Sector {
            start,
            end,
            mid: start + span / 2.0,
            span,
        });
        cursor = end + gap / 2.0;
    }
    sectors
}

/// Maps an angle into `[0, 2π)`.
pub fn normalize_angle(angle: f32) -> f32 {
    let full = 2.0 * PI;
    let wrapped = angle.rem_euclid(full);
    if wrapped >= full { 0.0 } else { wrapped }
}
