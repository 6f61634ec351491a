use crate::error::{AttachError, Result};
use crate::matcher::MatcherId;
use serde::{Deserialize, Serialize};

/// Normalized matcher scores of every candidate target for one comment.
///
/// Candidates keep the order in which they were added, and so do the scores of each candidate.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoreMatrix<T> {
    candidates: Vec<Candidate<T>>,
}

/// One candidate target together with its normalized scores
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate<T> {
    pub target: T,
    pub scores: Vec<(MatcherId, f64)>,
}

impl<T> ScoreMatrix<T> {
    pub fn new() -> Self {
        Self {
            candidates: Vec::new(),
        }
    }

    pub fn push(&mut self, target: T, scores: Vec<(MatcherId, f64)>) {
        self.candidates.push(Candidate { target, scores });
    }

    pub fn candidates(&self) -> &[Candidate<T>] {
        &self.candidates
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

impl<T> Default for ScoreMatrix<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FromIterator<(T, Vec<(MatcherId, f64)>)> for ScoreMatrix<T> {
    fn from_iter<I: IntoIterator<Item = (T, Vec<(MatcherId, f64)>)>>(iter: I) -> Self {
        let mut matrix = Self::new();
        for (target, scores) in iter {
            matrix.push(target, scores);
        }
        matrix
    }
}

/// Picks the target a comment should be attached to, given the scores of all candidates.
pub trait AttachmentDecider<T> {
    /// The winning target, or `None` if no candidate is good enough.
    fn make_attachment_decision(&self, matrix: &ScoreMatrix<T>) -> Result<Option<T>>;
}

/// Function combining the normalized scores of one candidate into a single non-negative value
pub type AggregatorFn = Box<dyn Fn(&[f64]) -> f64>;

/// Built-in aggregation functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Aggregator {
    #[default]
    Max,
    Min,
    Mean,
    Sum,
}

impl Aggregator {
    pub fn aggregate(self, values: &[f64]) -> f64 {
        match self {
            Self::Max => max(values),
            Self::Min => min(values),
            Self::Mean => mean(values),
            Self::Sum => sum(values),
        }
    }
}

/// Largest value, 0 for no values
pub fn max(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::max).unwrap_or(0.0)
}

/// Smallest value, 0 for no values
pub fn min(values: &[f64]) -> f64 {
    values.iter().copied().reduce(f64::min).unwrap_or(0.0)
}

/// Arithmetic mean, 0 for no values
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    sum(values) / values.len() as f64
}

pub fn sum(values: &[f64]) -> f64 {
    values.iter().sum()
}

/// Aggregates the scores of each candidate and picks the candidate with the highest aggregate,
/// provided it beats a lower boundary.
///
/// Ties go to the candidate that was added to the score matrix first.
pub struct AggregatedMatchDecider {
    aggregator: AggregatorFn,
    lower_boundary: f64,
    include_lower_boundary: bool,
}

impl AggregatedMatchDecider {
    /// Decider taking the maximum score of each candidate, with an exclusive lower boundary of 0.
    pub fn new() -> Self {
        Self {
            aggregator: Box::new(max),
            lower_boundary: 0.0,
            include_lower_boundary: false,
        }
    }

    pub fn with_aggregator(mut self, aggregator: impl Fn(&[f64]) -> f64 + 'static) -> Self {
        self.aggregator = Box::new(aggregator);
        self
    }

    pub fn with_builtin_aggregator(self, aggregator: Aggregator) -> Self {
        self.with_aggregator(move |values| aggregator.aggregate(values))
    }

    /// Aggregates have to be greater than this for a candidate to win.
    pub fn with_lower_boundary(mut self, boundary: f64) -> Result<Self> {
        if boundary < 0.0 || boundary.is_nan() {
            return Err(AttachError::invalid(format!(
                "lower boundary must be >= 0, got {boundary}"
            )));
        }

        self.lower_boundary = boundary;
        Ok(self)
    }

    /// Let candidates whose aggregate equals the lower boundary win as well.
    pub fn include_lower_boundary(mut self) -> Self {
        self.include_lower_boundary = true;
        self
    }

    pub fn lower_boundary(&self) -> f64 {
        self.lower_boundary
    }

    fn beats_boundary(&self, aggregate: f64) -> bool {
        if self.include_lower_boundary {
            aggregate >= self.lower_boundary
        } else {
            aggregate > self.lower_boundary
        }
    }
}

impl Default for AggregatedMatchDecider {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Clone> AttachmentDecider<T> for AggregatedMatchDecider {
    fn make_attachment_decision(&self, matrix: &ScoreMatrix<T>) -> Result<Option<T>> {
        let mut best: Option<(&T, f64)> = None;
        let mut values = Vec::new();

        for candidate in matrix.candidates() {
            values.clear();
            values.extend(candidate.scores.iter().map(|(_, score)| *score));

            let aggregate = (self.aggregator)(&values);
            if !aggregate.is_finite() {
                return Err(AttachError::NonFiniteAggregate { value: aggregate });
            }
            if aggregate < 0.0 {
                return Err(AttachError::NegativeAggregate { value: aggregate });
            }

            if best.map_or(true, |(_, top)| aggregate > top) {
                best = Some((&candidate.target, aggregate));
            }
        }

        Ok(best
            .filter(|(_, aggregate)| self.beats_boundary(*aggregate))
            .map(|(target, _)| target.clone()))
    }
}
