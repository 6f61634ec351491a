//! # Comment Diagram
//!
//! A small hierarchical diagram model and the adapters that let `comment-attach` decide which
//! node each comment of a diagram refers to.
//!
//! Diagrams are petgraph graphs: `Contains` edges nest nodes below a root, `Annotates` edges
//! record which node a comment has been attached to.
//!
//! ```rust
//! use comment_attach::AttachConfig;
//! use comment_diagram::{Diagram, DiagramAttacher};
//!
//! let diagram = Diagram::from_json_str(r#"{
//!     "nodes": [
//!         { "id": "parser", "label": "Parser",
//!           "bounds": { "x": 0, "y": 0, "width": 40, "height": 20 } },
//!         { "id": "lexer", "label": "Lexer",
//!           "bounds": { "x": 200, "y": 0, "width": 40, "height": 20 } },
//!         { "id": "note", "label": "builds the tree", "comment": true,
//!           "bounds": { "x": 0, "y": 30, "width": 40, "height": 10 } }
//!     ]
//! }"#).unwrap();
//!
//! let mut attacher = DiagramAttacher::from_config(&AttachConfig::default(), diagram).unwrap();
//! let report = attacher.run().unwrap();
//!
//! assert_eq!(report.attachments[0].comment, "note");
//! assert_eq!(report.attachments[0].target, "parser");
//! ```

mod adapter;
mod attacher;
mod document;
mod error;
mod types;

pub use adapter::{AnchorAttachments, DiagramBounds, DiagramScope, SharedDiagram};
pub use attacher::{AttachmentKind, AttachmentRecord, DiagramAttacher, DiagramReport};
pub use document::{DiagramSpec, NodeSpec};
pub use error::{DiagramError, Result};
pub use types::{Diagram, DiagramEdge, DiagramNode, Relationship};
