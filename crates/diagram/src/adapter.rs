//! Adapters exposing a [`Diagram`] to the attachment core.
//!
//! Comments are the nodes flagged as comments. The candidate targets of a comment are its
//! non-comment siblings. Every container node forms a scope of its own.

use crate::types::Diagram;
use comment_attach::{BoundsProvider, DataProvider, ExplicitAttachmentProvider, Rectangle};
use petgraph::graph::NodeIndex;
use std::cell::RefCell;
use std::rc::Rc;

/// Diagram handle shared between the adapters
pub type SharedDiagram = Rc<RefCell<Diagram>>;

/// Data provider for the direct children of one container node.
pub struct DiagramScope {
    diagram: SharedDiagram,
    container: NodeIndex,
}

impl DiagramScope {
    pub fn new(diagram: SharedDiagram, container: NodeIndex) -> Self {
        Self { diagram, container }
    }

    /// Scope of the diagram's root node
    pub fn root(diagram: SharedDiagram) -> Self {
        let root = diagram.borrow().root();
        Self::new(diagram, root)
    }

    pub fn container(&self) -> NodeIndex {
        self.container
    }

    fn children_where(&self, comment: bool) -> Vec<NodeIndex> {
        let diagram = self.diagram.borrow();
        diagram
            .children(self.container)
            .into_iter()
            .filter(|&idx| diagram.node(idx).is_some_and(|node| node.comment == comment))
            .collect()
    }
}

impl DataProvider<NodeIndex, NodeIndex> for DiagramScope {
    fn provide_comments(&self) -> Vec<NodeIndex> {
        self.children_where(true)
    }

    fn provide_targets(&self) -> Vec<NodeIndex> {
        self.children_where(false)
    }

    fn provide_sub_hierarchies(&self) -> Vec<Rc<dyn DataProvider<NodeIndex, NodeIndex>>> {
        let diagram = self.diagram.borrow();
        self.children_where(false)
            .into_iter()
            .filter(|&idx| diagram.has_children(idx))
            .map(|idx| {
                Rc::new(DiagramScope::new(Rc::clone(&self.diagram), idx))
                    as Rc<dyn DataProvider<NodeIndex, NodeIndex>>
            })
            .collect()
    }

    fn attach(&self, comment: &NodeIndex, target: &NodeIndex) {
        self.diagram.borrow_mut().annotate(*comment, *target);
    }
}

/// Bounds provider reading node bounds straight from the diagram
pub struct DiagramBounds {
    diagram: SharedDiagram,
}

impl DiagramBounds {
    pub fn new(diagram: SharedDiagram) -> Self {
        Self { diagram }
    }

    fn bounds_of(&self, idx: NodeIndex) -> Option<Rectangle> {
        self.diagram.borrow().node(idx).and_then(|node| node.bounds)
    }
}

impl BoundsProvider<NodeIndex, NodeIndex> for DiagramBounds {
    fn bounds_for_comment(&self, comment: &NodeIndex) -> Option<Rectangle> {
        self.bounds_of(*comment)
    }

    fn bounds_for_target(&self, target: &NodeIndex) -> Option<Rectangle> {
        self.bounds_of(*target)
    }
}

/// Explicit attachments taken from the `anchor` of comment nodes
pub struct AnchorAttachments {
    diagram: SharedDiagram,
}

impl AnchorAttachments {
    pub fn new(diagram: SharedDiagram) -> Self {
        Self { diagram }
    }
}

impl ExplicitAttachmentProvider<NodeIndex, NodeIndex> for AnchorAttachments {
    fn find_explicit_attachment(&self, comment: &NodeIndex) -> Option<NodeIndex> {
        let diagram = self.diagram.borrow();
        let anchor = diagram.node(*comment)?.anchor.as_deref()?;
        let target = diagram.find_node(anchor);
        if target.is_none() {
            log::warn!("Comment anchor '{}' does not name a node", anchor);
        }
        target
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DiagramNode;
    use pretty_assertions::assert_eq;

    fn shared() -> (SharedDiagram, [NodeIndex; 5]) {
        let mut diagram = Diagram::new("root");
        let root = diagram.root();
        let a = diagram
            .add_node(
                root,
                DiagramNode::new("a", "A").with_bounds(Rectangle::new(0.0, 0.0, 5.0, 5.0)),
            )
            .unwrap();
        let c = diagram
            .add_node(root, DiagramNode::comment("c", "hi").with_anchor("a1"))
            .unwrap();
        let b = diagram.add_node(root, DiagramNode::new("b", "B")).unwrap();
        let a1 = diagram.add_node(a, DiagramNode::new("a1", "A1")).unwrap();
        (Rc::new(RefCell::new(diagram)), [root, a, c, b, a1])
    }

    #[test]
    fn test_scope_contents() {
        let (diagram, [_, a, c, b, a1]) = shared();
        let scope = DiagramScope::root(Rc::clone(&diagram));

        assert_eq!(scope.provide_comments(), vec![c]);
        assert_eq!(scope.provide_targets(), vec![a, b]);

        let subs = scope.provide_sub_hierarchies();
        assert_eq!(subs.len(), 1);
        assert_eq!(subs[0].provide_targets(), vec![a1]);
        assert!(subs[0].provide_sub_hierarchies().is_empty());
    }

    #[test]
    fn test_attach_adds_annotation() {
        let (diagram, [_, a, c, _, _]) = shared();
        let scope = DiagramScope::root(Rc::clone(&diagram));

        scope.attach(&c, &a);
        assert_eq!(diagram.borrow().annotations(), vec![(c, a)]);
    }

    #[test]
    fn test_bounds_and_anchors() {
        let (diagram, [root, a, c, b, a1]) = shared();
        let bounds = DiagramBounds::new(Rc::clone(&diagram));
        let anchors = AnchorAttachments::new(diagram);

        assert_eq!(
            bounds.bounds_for_target(&a),
            Some(Rectangle::new(0.0, 0.0, 5.0, 5.0))
        );
        assert_eq!(bounds.bounds_for_target(&b), None);
        assert_eq!(bounds.bounds_for_comment(&root), None);

        assert_eq!(anchors.find_explicit_attachment(&c), Some(a1));
        assert_eq!(anchors.find_explicit_attachment(&b), None);
    }
}
