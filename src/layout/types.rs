use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Which engine produced a layout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStrategy {
    /// Concentric rings with sector allocation and arc-length packing.
    #[default]
    Radial,
    /// Iterative spring/repulsion simulation with routed edges.
    ForceDirected,
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

/// Angular interval owned by one top-level branch, in radians.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sector {
    pub start: f32,
    pub end: f32,
    pub mid: f32,
    pub span: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NodeOrigin {
    Content,
    /// One chunk of an overcrowded branch; `part` is 1-based.
    SplitBranch { part: usize, parts: usize },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutNode {
    pub id: String,
    /// Content node this entry was derived from (differs from `id` only for
    /// split pseudo-branches).
    pub source_id: String,
    pub label: String,
    /// Center coordinates.
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub level: usize,
    /// Index of the level-1 ancestor, `None` for the root.
    pub section: Option<usize>,
    pub origin: NodeOrigin,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl LayoutNode {
    pub fn distance_from_origin(&self) -> f32 {
        self.x.hypot(self.y)
    }

    pub fn rect(&self) -> Rect {
        Rect::centered(self.x, self.y, self.width, self.height)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    Structural,
    CrossLink,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeLayout {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    /// Intermediate points between the endpoint centers; empty for straight lines.
    pub waypoints: Vec<(f32, f32)>,
}

/// Axis-aligned rectangle stored by its edges.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub min_x: f32,
    pub min_y: f32,
    pub max_x: f32,
    pub max_y: f32,
}

impl Rect {
    pub fn centered(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            min_x: x - width / 2.0,
            min_y: y - height / 2.0,
            max_x: x + width / 2.0,
            max_y: y + height / 2.0,
        }
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f32 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> (f32, f32) {
        (
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }

    pub fn inflate(&self, by: f32) -> Self {
        Self {
            min_x: self.min_x - by,
            min_y: self.min_y - by,
            max_x: self.max_x + by,
            max_y: self.max_y + by,
        }
    }

    pub fn union(&self, other: &Rect) -> Self {
        Self {
            min_x: self.min_x.min(other.min_x),
            min_y: self.min_y.min(other.min_y),
            max_x: self.max_x.max(other.max_x),
            max_y: self.max_y.max(other.max_y),
        }
    }

    /// Strict intersection; touching edges do not count.
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.min_x < other.max_x
            && other.min_x < self.max_x
            && self.min_y < other.max_y
            && other.min_y < self.max_y
    }

    pub fn contains(&self, point: (f32, f32)) -> bool {
        point.0 > self.min_x && point.0 < self.max_x && point.1 > self.min_y && point.1 < self.max_y
    }
}

pub type Bounds = Rect;

/// Force-engine outcome. Not reaching the threshold is reported, not raised.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Convergence {
    pub converged: bool,
    pub max_force: f32,
    pub iterations: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayoutWarning {
    /// A branch has no children; it is placed but gets no packed ring.
    EmptyBranch { id: String },
    /// Overlaps remained at `level` after the collision iteration cap.
    CollisionBudgetExhausted { level: usize, overlaps: usize },
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct LayoutDiagnostics {
    pub warnings: Vec<LayoutWarning>,
    pub convergence: Option<Convergence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub strategy: LayoutStrategy,
    pub nodes: BTreeMap<String, LayoutNode>,
    pub edges: Vec<EdgeLayout>,
    pub bounds: Bounds,
    pub diagnostics: LayoutDiagnostics,
}

impl Layout {
    pub fn node(&self, id: &str) -> Option<&LayoutNode> {
        self.nodes.get(id)
    }

    /// Nodes that correspond one-to-one with content nodes. The first part of
    /// a split branch keeps the branch id and is included.
    pub fn content_nodes(&self) -> impl Iterator<Item = &LayoutNode> {
        self.nodes.values().filter(|node| node.id == node.source_id)
    }
}
