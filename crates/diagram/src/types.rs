use crate::error::{DiagramError, Result};
use comment_attach::Rectangle;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Type of relationship between diagram nodes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Relationship {
    /// A contains B (parent-child)
    Contains,

    /// Comment A is attached to B
    Annotates,
}

/// Node in a diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramNode {
    /// Unique node id
    pub id: String,

    /// Node name, or the text of a comment
    pub label: String,

    /// Position and size, if the node has been laid out
    pub bounds: Option<Rectangle>,

    /// Whether this node is a comment
    pub comment: bool,

    /// Id of the node a comment was explicitly attached to by its author
    pub anchor: Option<String>,
}

impl DiagramNode {
    pub fn new(id: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            label: label.into(),
            bounds: None,
            comment: false,
            anchor: None,
        }
    }

    pub fn comment(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            comment: true,
            ..Self::new(id, text)
        }
    }

    pub fn with_bounds(mut self, bounds: Rectangle) -> Self {
        self.bounds = Some(bounds);
        self
    }

    pub fn with_anchor(mut self, anchor: impl Into<String>) -> Self {
        self.anchor = Some(anchor.into());
        self
    }

    /// Name used when comments refer to this node: the label, or the id for unlabeled nodes
    pub fn name(&self) -> &str {
        if self.label.trim().is_empty() {
            &self.id
        } else {
            &self.label
        }
    }
}

/// Edge in a diagram
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagramEdge {
    pub relationship: Relationship,
}

/// Hierarchical diagram: nodes nested through `Contains` edges below a single root, plus
/// `Annotates` edges from comments to the nodes they refer to.
#[derive(Debug)]
pub struct Diagram {
    /// Directed graph (parent -> child, comment -> annotated node)
    pub graph: DiGraph<DiagramNode, DiagramEdge>,

    /// Node id -> NodeIndex mapping for fast lookup
    pub id_index: HashMap<String, NodeIndex>,

    root: NodeIndex,
}

impl Diagram {
    pub fn new(root_id: impl Into<String>) -> Self {
        let root_id = root_id.into();
        let mut graph = DiGraph::new();
        let root = graph.add_node(DiagramNode::new(root_id.clone(), ""));

        let mut id_index = HashMap::new();
        id_index.insert(root_id, root);

        Self {
            graph,
            id_index,
            root,
        }
    }

    pub fn root(&self) -> NodeIndex {
        self.root
    }

    /// Add node as the last child of `parent`
    pub fn add_node(&mut self, parent: NodeIndex, node: DiagramNode) -> Result<NodeIndex> {
        if self.id_index.contains_key(&node.id) {
            return Err(DiagramError::DuplicateId(node.id));
        }
        if self.graph.node_weight(parent).is_none() {
            return Err(DiagramError::NodeNotFound(format!("{parent:?}")));
        }

        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.graph.add_edge(
            parent,
            idx,
            DiagramEdge {
                relationship: Relationship::Contains,
            },
        );
        self.id_index.insert(id, idx);

        Ok(idx)
    }

    /// Children of a node, in the order they were added
    pub fn children(&self, node: NodeIndex) -> Vec<NodeIndex> {
        let mut children = self.targets_of(node, Relationship::Contains);
        children.sort();
        children
    }

    pub fn has_children(&self, node: NodeIndex) -> bool {
        self.graph
            .edges(node)
            .any(|e| e.weight().relationship == Relationship::Contains)
    }

    /// Find node by id
    pub fn find_node(&self, id: &str) -> Option<NodeIndex> {
        self.id_index.get(id).copied()
    }

    /// Get node data
    pub fn node(&self, idx: NodeIndex) -> Option<&DiagramNode> {
        self.graph.node_weight(idx)
    }

    /// Record that `comment` refers to `target`
    pub fn annotate(&mut self, comment: NodeIndex, target: NodeIndex) {
        self.graph.add_edge(
            comment,
            target,
            DiagramEdge {
                relationship: Relationship::Annotates,
            },
        );
    }

    /// All (comment, target) annotations, in the order they were made
    pub fn annotations(&self) -> Vec<(NodeIndex, NodeIndex)> {
        self.graph
            .edge_references()
            .filter(|e| e.weight().relationship == Relationship::Annotates)
            .map(|e| (e.source(), e.target()))
            .collect()
    }

    /// Nodes the given comment has been attached to
    pub fn annotated_by(&self, comment: NodeIndex) -> Vec<NodeIndex> {
        let mut targets = self.targets_of(comment, Relationship::Annotates);
        targets.sort();
        targets
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    fn targets_of(&self, node: NodeIndex, relationship: Relationship) -> Vec<NodeIndex> {
        self.graph
            .edges(node)
            .filter(|e| e.weight().relationship == relationship)
            .map(|e| e.target())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_children_keep_insertion_order() {
        let mut diagram = Diagram::new("root");
        let root = diagram.root();
        let a = diagram.add_node(root, DiagramNode::new("a", "A")).unwrap();
        let b = diagram.add_node(root, DiagramNode::new("b", "B")).unwrap();
        let c = diagram.add_node(root, DiagramNode::comment("c", "about A")).unwrap();

        assert_eq!(diagram.children(root), vec![a, b, c]);
        assert!(diagram.has_children(root));
        assert!(!diagram.has_children(a));
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut diagram = Diagram::new("root");
        let root = diagram.root();
        diagram.add_node(root, DiagramNode::new("a", "A")).unwrap();

        let err = diagram.add_node(root, DiagramNode::new("a", "again")).unwrap_err();
        assert!(matches!(err, DiagramError::DuplicateId(id) if id == "a"));

        let err = diagram.add_node(root, DiagramNode::new("root", "")).unwrap_err();
        assert!(matches!(err, DiagramError::DuplicateId(_)));
    }

    #[test]
    fn test_annotations_are_not_children() {
        let mut diagram = Diagram::new("root");
        let root = diagram.root();
        let a = diagram.add_node(root, DiagramNode::new("a", "A")).unwrap();
        let c = diagram.add_node(root, DiagramNode::comment("c", "about A")).unwrap();

        diagram.annotate(c, a);

        assert_eq!(diagram.annotations(), vec![(c, a)]);
        assert_eq!(diagram.annotated_by(c), vec![a]);
        assert!(diagram.children(c).is_empty());
        assert_eq!(diagram.find_node("c"), Some(c));
    }

    #[test]
    fn test_name_falls_back_to_id() {
        assert_eq!(DiagramNode::new("n1", "  ").name(), "n1");
        assert_eq!(DiagramNode::new("n1", "Parser").name(), "Parser");
    }
}
