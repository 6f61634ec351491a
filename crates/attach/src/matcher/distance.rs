use super::normalization::{Normalization, NormalizedMatcher};
use super::Matcher;
use crate::bounds::SharedBounds;
use crate::data::DataProvider;
use crate::error::{AttachError, Result};
use crate::geometry;

/// Distance at which comments stop counting as close to a target, unless configured otherwise
pub const DEFAULT_MAX_ATTACHMENT_DISTANCE: f64 = 50.0;

/// Rates pairs by the distance between comment and target.
///
/// Overlapping and touching pairs are 0 apart. Pairs whose distance can't be determined get the
/// worst raw value.
pub struct DistanceMatcher<C, T> {
    bounds: Option<SharedBounds<C, T>>,
    normalization: Normalization,
}

impl<C, T> DistanceMatcher<C, T> {
    pub fn new() -> Self {
        Self {
            bounds: None,
            normalization: Normalization::linear(DEFAULT_MAX_ATTACHMENT_DISTANCE, 0.0),
        }
    }

    pub fn with_bounds_provider(mut self, provider: SharedBounds<C, T>) -> Self {
        self.bounds = Some(provider);
        self
    }

    /// Pairs at least this far apart count as unrelated; touching pairs are perfect matches.
    pub fn with_maximum_attachment_distance(self, distance: f64) -> Result<Self> {
        if distance < 0.0 || distance.is_nan() {
            return Err(AttachError::invalid(format!(
                "maximum attachment distance must be >= 0, got {distance}"
            )));
        }

        Ok(self.with_worst_raw_value(distance).with_best_raw_value(0.0))
    }

    fn check_configuration(&self) -> Result<()> {
        if self.bounds.is_none() {
            return Err(AttachError::missing(
                "distance matcher requires a bounds provider",
            ));
        }
        Ok(())
    }
}

impl<C, T> Default for DistanceMatcher<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, T> NormalizedMatcher for DistanceMatcher<C, T> {
    fn normalization(&self) -> &Normalization {
        &self.normalization
    }

    fn normalization_mut(&mut self) -> &mut Normalization {
        &mut self.normalization
    }
}

impl<C, T> Matcher<C, T> for DistanceMatcher<C, T> {
    fn raw(&self, comment: &C, target: &T) -> f64 {
        let worst = self.normalization.worst_raw_value();
        let Some(bounds) = self.bounds.as_ref() else {
            return worst;
        };

        match (bounds.bounds_for_comment(comment), bounds.bounds_for_target(target)) {
            (Some(c), Some(t)) => geometry::distance(&c, &t).unwrap_or(worst),
            _ => worst,
        }
    }

    fn normalized(&self, comment: &C, target: &T) -> f64 {
        self.normalization.normalize(self.raw(comment, target))
    }

    fn preprocess(
        &mut self,
        _data: &dyn DataProvider<C, T>,
        _include_hierarchy: bool,
    ) -> Result<()> {
        self.check_configuration()
    }
}
