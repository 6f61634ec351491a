use crate::error::{DiagramError, Result};
use crate::types::{Diagram, DiagramNode};
use comment_attach::Rectangle;
use petgraph::graph::NodeIndex;
use serde::{Deserialize, Serialize};

/// JSON representation of a diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramSpec {
    /// Id of the implicit root node
    #[serde(default = "default_root_id")]
    pub id: String,

    /// Top-level nodes
    #[serde(default)]
    pub nodes: Vec<NodeSpec>,
}

/// JSON representation of a node and everything nested in it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,

    #[serde(default)]
    pub label: String,

    #[serde(default)]
    pub comment: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<Rectangle>,

    /// Id of the node this comment is explicitly attached to
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<NodeSpec>,
}

fn default_root_id() -> String {
    "root".to_string()
}

impl Diagram {
    /// Build a diagram from its JSON representation.
    ///
    /// Node ids must be unique, anchors must name existing nodes, and only comments may have
    /// anchors.
    pub fn from_spec(spec: &DiagramSpec) -> Result<Self> {
        let mut diagram = Diagram::new(spec.id.clone());
        let root = diagram.root();

        let mut pending: Vec<(NodeIndex, &NodeSpec)> =
            spec.nodes.iter().map(|node| (root, node)).collect();
        // reversed so that popping yields nodes in document order
        pending.reverse();

        while let Some((parent, node)) = pending.pop() {
            if node.id.is_empty() {
                return Err(DiagramError::Invalid("node ids must not be empty".to_string()));
            }
            if node.anchor.is_some() && !node.comment {
                return Err(DiagramError::Invalid(format!(
                    "node '{}' has an anchor but is not a comment",
                    node.id
                )));
            }

            let idx = diagram.add_node(parent, to_node(node))?;
            pending.extend(node.children.iter().rev().map(|child| (idx, child)));
        }

        for idx in diagram.graph.node_indices() {
            if let Some(anchor) = diagram.graph[idx].anchor.as_deref() {
                if diagram.find_node(anchor).is_none() {
                    return Err(DiagramError::NodeNotFound(anchor.to_string()));
                }
            }
        }

        log::debug!("Built diagram with {} nodes", diagram.node_count());
        Ok(diagram)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let spec: DiagramSpec = serde_json::from_str(json)?;
        Self::from_spec(&spec)
    }
}

fn to_node(spec: &NodeSpec) -> DiagramNode {
    DiagramNode {
        id: spec.id.clone(),
        label: spec.label.clone(),
        bounds: spec.bounds,
        comment: spec.comment,
        anchor: spec.anchor.clone(),
    }
}
