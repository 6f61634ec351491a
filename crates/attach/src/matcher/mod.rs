//! Heuristics that rate how likely a comment refers to an attachment target.
//!
//! Every matcher produces a raw value whose meaning is up to the matcher (a distance, an offset,
//! a yes/no indicator) and a normalized value in `[0, 1]` that deciders can compare across
//! matchers. Matchers built on [`Normalization`] get the mapping from raw to normalized values
//! for free.

mod alignment;
mod distance;
mod node_reference;
mod normalization;

pub use alignment::{AlignmentMatcher, DEFAULT_MAX_ALIGNMENT_OFFSET};
pub use distance::{DistanceMatcher, DEFAULT_MAX_ATTACHMENT_DISTANCE};
pub use node_reference::NodeReferenceMatcher;
pub use normalization::{Normalization, NormalizationFunction, NormalizedMatcher};

use crate::data::DataProvider;
use crate::error::Result;

/// Handle identifying a matcher within one attacher. Assigned in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MatcherId(pub usize);

/// A heuristic rating comment-target pairs.
pub trait Matcher<C, T> {
    /// Matcher-specific raw value for the pair.
    fn raw(&self, comment: &C, target: &T) -> f64;

    /// The raw value mapped to `[0, 1]`, where higher means a better match.
    fn normalized(&self, comment: &C, target: &T) -> f64;

    /// Called once before a run, before any pair is rated.
    fn preprocess(
        &mut self,
        _data: &dyn DataProvider<C, T>,
        _include_hierarchy: bool,
    ) -> Result<()> {
        Ok(())
    }

    /// Called once after the last pair of a run was rated.
    fn cleanup(&mut self) {}
}
