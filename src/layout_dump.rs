use crate::layout::{Bounds, Convergence, EdgeKind, Layout, LayoutNode, LayoutStrategy, LayoutWarning, NodeOrigin};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Renderer-facing view of a finished layout.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayoutDump {
    pub strategy: LayoutStrategy,
    pub nodes: Vec<NodeDump>,
    pub edges: Vec<EdgeDump>,
    pub bounds: Bounds,
    pub warnings: Vec<LayoutWarning>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub convergence: Option<Convergence>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeDump {
    pub id: String,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub level: usize,
    pub shape: ShapeProps,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

/// What the renderer should draw for a node.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ShapeProps {
    Center {
        label: String,
    },
    Theme {
        label: String,
        section: usize,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        part: Option<SplitPart>,
    },
    Finding {
        label: String,
        section: usize,
    },
    Leaf {
        label: String,
        section: usize,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitPart {
    pub part: usize,
    pub parts: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EdgeDump {
    pub source_id: String,
    pub target_id: String,
    pub kind: EdgeKind,
    pub waypoints: Vec<[f32; 2]>,
}

impl ShapeProps {
    fn for_node(node: &LayoutNode, has_children: bool) -> Self {
        let label = node.label.clone();
        let section = node.section.unwrap_or_default();
        match node.level {
            0 => ShapeProps::Center { label },
            1 => ShapeProps::Theme {
                label,
                section,
                part: match node.origin {
                    NodeOrigin::SplitBranch { part, parts } => Some(SplitPart { part, parts }),
                    NodeOrigin::Content => None,
                },
            },
            _ if has_children => ShapeProps::Finding { label, section },
            _ => ShapeProps::Leaf { label, section },
        }
    }
}

impl LayoutDump {
    pub fn from_layout(layout: &Layout) -> Self {
        let parents: HashSet<&str> = layout
            .edges
            .iter()
            .filter(|edge| edge.kind == EdgeKind::Structural)
            .map(|edge| edge.from.as_str())
            .collect();

        let nodes = layout
            .nodes
            .values()
            .map(|node| NodeDump {
                id: node.id.clone(),
                x: node.x,
                y: node.y,
                width: node.width,
                height: node.height,
                level: node.level,
                shape: ShapeProps::for_node(node, parents.contains(node.id.as_str())),
                metadata: node.metadata.clone(),
            })
            .collect();

        let edges = layout
            .edges
            .iter()
            .map(|edge| EdgeDump {
                source_id: edge.from.clone(),
                target_id: edge.to.clone(),
                kind: edge.kind,
                waypoints: edge.waypoints.iter().map(|(x, y)| [*x, *y]).collect(),
            })
            .collect();

        LayoutDump {
            strategy: layout.strategy,
            nodes,
            edges,
            bounds: layout.bounds,
            warnings: layout.diagnostics.warnings.clone(),
            convergence: layout.diagnostics.convergence,
        }
    }
}

/// Writes the dump as pretty JSON to `path`, or to stdout when `path` is
/// `None` or `-`.
pub fn write_layout_dump(path: Option<&Path>, layout: &Layout) -> anyhow::Result<()> {
    let dump = LayoutDump::from_layout(layout);
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::create(path)?;
            let mut writer = BufWriter::new(file);
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writer.flush()?;
        }
        _ => {
            let stdout = io::stdout();
            let mut writer = stdout.lock();
            serde_json::to_writer_pretty(&mut writer, &dump)?;
            writeln!(writer)?;
        }
    }
    Ok(())
}
