use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::layout::MalformedTreeError;

/// One node of the content tree produced upstream (central topic, theme,
/// finding, leaf). Children are owned by their parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentNode {
    pub id: String,
    pub text: String,
    pub level: usize,
    #[serde(default)]
    pub children: Vec<ContentNode>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<serde_json::Value>,
}

impl ContentNode {
    pub fn new(id: impl Into<String>, text: impl Into<String>, level: usize) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            level,
            children: Vec::new(),
            metadata: None,
        }
    }

    /// Appends a child one level below `self`.
    pub fn with_child(mut self, id: impl Into<String>, text: impl Into<String>) -> Self {
        let level = self.level + 1;
        self.children.push(ContentNode::new(id, text, level));
        self
    }

    pub fn push_child(&mut self, child: ContentNode) -> &mut Self {
        self.children.push(child);
        self
    }
}

/// A non-tree relation between two content nodes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossLink {
    pub source: String,
    pub target: String,
}

/// Serialized input accepted by the CLI and the wasm wrapper.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContentDocument {
    pub root: ContentNode,
    #[serde(default)]
    pub cross_links: Vec<CrossLink>,
}

impl ContentDocument {
    /// Accepts either a full document or a bare root node.
    pub fn from_json(input: &str) -> serde_json::Result<Self> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Input {
            Document(ContentDocument),
            Root(ContentNode),
        }
        Ok(match serde_json::from_str::<Input>(input)? {
            Input::Document(doc) => doc,
            Input::Root(root) => ContentDocument {
                root,
                cross_links: Vec::new(),
            },
        })
    }
}

#[derive(Debug, Clone)]
pub struct ArenaNode<'a> {
    pub node: &'a ContentNode,
    pub parent: Option<usize>,
    pub children: Vec<usize>,
}

/// Flat, index-addressed view over a validated content tree. Index 0 is the
/// root; parents always precede their children.
#[derive(Debug, Clone)]
pub struct ContentArena<'a> {
    nodes: Vec<ArenaNode<'a>>,
    index: HashMap<&'a str, usize>,
}

impl<'a> ContentArena<'a> {
    pub fn build(root: &'a ContentNode) -> Result<Self, MalformedTreeError> {
        if root.level != 0 {
            return Err(MalformedTreeError::RootLevel {
                id: root.id.clone(),
                level: root.level,
            });
        }
        let mut nodes: Vec<ArenaNode<'a>> = Vec::new();
        let mut index: HashMap<&'a str, usize> = HashMap::new();
        let mut queue: std::collections::VecDeque<(&'a ContentNode, Option<usize>)> =
            std::collections::VecDeque::new();
        queue.push_back((root, None));

        while let Some((node, parent)) = queue.pop_front() {
            if node.id.is_empty() {
                return Err(MalformedTreeError::EmptyId);
            }
            if let Some(parent_idx) = parent {
                let parent_node = nodes[parent_idx].node;
                if node.level != parent_node.level + 1 {
                    return Err(MalformedTreeError::LevelMismatch {
                        id: node.id.clone(),
                        parent: parent_node.id.clone(),
                        expected: parent_node.level + 1,
                        found: node.level,
                    });
                }
            }
            let idx = nodes.len();
            if index.insert(node.id.as_str(), idx).is_some() {
                return Err(MalformedTreeError::DuplicateId {
                    id: node.id.clone(),
                });
            }
            nodes.push(ArenaNode {
                node,
                parent,
                children: Vec::with_capacity(node.children.len()),
            });
            if let Some(parent_idx) = parent {
                nodes[parent_idx].children.push(idx);
            }
            for child in &node.children {
                queue.push_back((child, Some(idx)));
            }
        }

        Ok(Self { nodes, index })
    }

    pub fn root(&self) -> &ArenaNode<'a> {
        &self.nodes[0]
    }

    pub fn get(&self, idx: usize) -> &ArenaNode<'a> {
        &self.nodes[idx]
    }

    pub fn lookup(&self, id: &str) -> Option<usize> {
        self.index.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (usize, &ArenaNode<'a>)> {
        self.nodes.iter().enumerate()
    }

    /// Number of nodes below `idx`, excluding `idx` itself.
    pub fn descendant_count(&self, idx: usize) -> usize {
        let mut count = 0;
        let mut stack: Vec<usize> = self.nodes[idx].children.clone();
        while let Some(next) = stack.pop() {
            count += 1;
            stack.extend(self.nodes[next].children.iter().copied());
        }
        count
    }

    pub fn check_links(&self, links: &[CrossLink]) -> Result<(), MalformedTreeError> {
        for link in links {
            for id in [&link.source, &link.target] {
                if self.lookup(id).is_none() {
                    return Err(MalformedTreeError::UnknownLinkEndpoint { id: id.clone() });
                }
            }
        }
        Ok(())
    }
}
