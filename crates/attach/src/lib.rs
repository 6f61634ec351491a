//! # Comment Attach
//!
//! Decides which element of a hierarchical diagram a free-floating comment refers to.
//!
//! ## Philosophy
//!
//! Attachment is a best-effort guess assembled from small, independently configurable parts:
//! - Explicit attachments made by the author always win
//! - Eligibility filters keep obviously unrelated comments (large boxes, marked text) out
//! - Matchers rate every comment-target pair with a raw and a normalized score
//! - A decider aggregates the normalized scores and picks at most one target per comment
//!
//! Nothing is attached until every decision has been made.
//!
//! ## Architecture
//!
//! ```text
//! CommentAttacher::attach_comments(root)
//!     │
//!     ├──> preprocess: explicit provider, filters, matchers, bounds
//!     │
//!     ├──> Discovery (breadth-first over scopes)
//!     │    ├─> ExplicitAttachmentProvider → explicit decision
//!     │    ├─> Filter[] → eligible?
//!     │    ├─> Matcher[] → ScoreMatrix (normalized scores per candidate)
//!     │    └─> AttachmentDecider → heuristic decision
//!     │
//!     ├──> cleanup: explicit provider, filters, matchers, bounds
//!     │
//!     └──> Commit through root.attach()
//!          ├─> all explicit decisions
//!          └─> heuristic decisions, unless explicit ones take precedence
//! ```
//!
//! ## Example
//!
//! ```rust
//! use comment_attach::{
//!     BoundsProvider, CommentAttacher, DataProvider, DistanceMatcher, Rectangle, SharedBounds,
//! };
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! struct Boxes;
//!
//! impl BoundsProvider<&'static str, &'static str> for Boxes {
//!     fn bounds_for_comment(&self, _comment: &&'static str) -> Option<Rectangle> {
//!         Some(Rectangle::new(0.0, 10.0, 5.0, 5.0))
//!     }
//!
//!     fn bounds_for_target(&self, target: &&'static str) -> Option<Rectangle> {
//!         match *target {
//!             "near" => Some(Rectangle::new(0.0, 0.0, 5.0, 5.0)),
//!             _ => Some(Rectangle::new(100.0, 100.0, 5.0, 5.0)),
//!         }
//!     }
//! }
//!
//! #[derive(Default)]
//! struct Flat {
//!     attached: RefCell<Vec<(&'static str, &'static str)>>,
//! }
//!
//! impl DataProvider<&'static str, &'static str> for Flat {
//!     fn provide_comments(&self) -> Vec<&'static str> {
//!         vec!["comment"]
//!     }
//!
//!     fn provide_targets(&self) -> Vec<&'static str> {
//!         vec!["near", "far"]
//!     }
//!
//!     fn provide_sub_hierarchies(&self) -> Vec<Rc<dyn DataProvider<&'static str, &'static str>>> {
//!         Vec::new()
//!     }
//!
//!     fn attach(&self, comment: &&'static str, target: &&'static str) {
//!         self.attached.borrow_mut().push((*comment, *target));
//!     }
//! }
//!
//! let bounds: SharedBounds<_, _> = Rc::new(Boxes);
//! let mut attacher = CommentAttacher::new()
//!     .with_bounds_provider(Rc::clone(&bounds))
//!     .add_matcher(DistanceMatcher::new().with_bounds_provider(bounds));
//!
//! let data = Flat::default();
//! let report = attacher.attach_comments(&data).unwrap();
//!
//! assert_eq!(report.heuristic, vec![("comment", "near")]);
//! assert_eq!(*data.attached.borrow(), vec![("comment", "near")]);
//! ```

mod attacher;
mod bounds;
pub mod config;
mod data;
pub mod decider;
mod error;
mod explicit;
mod filter;
pub mod geometry;
pub mod matcher;

#[cfg(test)]
mod test_support;

pub use attacher::{AttachmentReport, CommentAttacher};
pub use bounds::{BoundsProvider, CachingBoundsProvider, SharedBounds};
pub use config::{AttachConfig, DeciderConfig, FilterConfig, MatcherConfig};
pub use data::{CachingDataProvider, DataProvider};
pub use decider::{AggregatedMatchDecider, Aggregator, AttachmentDecider, ScoreMatrix};
pub use error::{AttachError, Result};
pub use explicit::{ExplicitAttachmentFn, ExplicitAttachmentProvider, NoExplicitAttachments};
pub use filter::{Filter, SizeFilter, TextPrefixFilter, DEFAULT_MAX_AREA};
pub use geometry::{Outcode, Rectangle};
pub use matcher::{
    AlignmentMatcher, DistanceMatcher, Matcher, MatcherId, NodeReferenceMatcher, Normalization,
    NormalizationFunction, NormalizedMatcher,
};

/// Looks up a piece of text for a comment or target, such as a comment's text or a target's
/// name.
pub type TextAccessor<X> = Box<dyn Fn(&X) -> Option<String>>;
