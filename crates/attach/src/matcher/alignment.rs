use super::normalization::{Normalization, NormalizedMatcher};
use super::Matcher;
use crate::bounds::SharedBounds;
use crate::data::DataProvider;
use crate::error::{AttachError, Result};
use crate::geometry;

/// Alignment offset at which comments stop counting as aligned, unless configured otherwise
pub const DEFAULT_MAX_ALIGNMENT_OFFSET: f64 = 10.0;

/// Rates pairs by how well comment and target are aligned.
///
/// The raw value is the smallest offset at which the two would be left/right aligned (when
/// stacked above each other) or top/bottom aligned (when placed side by side). Cater-cornered
/// pairs and pairs without bounds get the worst raw value.
pub struct AlignmentMatcher<C, T> {
    bounds: Option<SharedBounds<C, T>>,
    normalization: Normalization,
}

impl<C, T> AlignmentMatcher<C, T> {
    pub fn new() -> Self {
        Self {
            bounds: None,
            normalization: Normalization::linear(DEFAULT_MAX_ALIGNMENT_OFFSET, 0.0),
        }
    }

    pub fn with_bounds_provider(mut self, provider: SharedBounds<C, T>) -> Self {
        self.bounds = Some(provider);
        self
    }

    /// Offsets of at least this much count as not aligned at all; perfect alignment is 0.
    pub fn with_maximum_alignment_offset(self, offset: f64) -> Result<Self> {
        if offset < 0.0 || offset.is_nan() {
            return Err(AttachError::invalid(format!(
                "maximum alignment offset must be >= 0, got {offset}"
            )));
        }

        Ok(self.with_worst_raw_value(offset).with_best_raw_value(0.0))
    }

    fn check_configuration(&self) -> Result<()> {
        if self.bounds.is_none() {
            return Err(AttachError::missing(
                "alignment matcher requires a bounds provider",
            ));
        }
        Ok(())
    }
}

impl<C, T> Default for AlignmentMatcher<C, T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C, T> NormalizedMatcher for AlignmentMatcher<C, T> {
    fn normalization(&self) -> &Normalization {
        &self.normalization
    }

    fn normalization_mut(&mut self) -> &mut Normalization {
        &mut self.normalization
    }
}

impl<C, T> Matcher<C, T> for AlignmentMatcher<C, T> {
    fn raw(&self, comment: &C, target: &T) -> f64 {
        let worst = self.normalization.worst_raw_value();
        let Some(bounds) = self.bounds.as_ref() else {
            return worst;
        };

        match (bounds.bounds_for_comment(comment), bounds.bounds_for_target(target)) {
            (Some(c), Some(t)) => geometry::alignment_offset(&c, &t).unwrap_or(worst),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matcher::NormalizationFunction;
    use crate::test_support::{MapBounds, TestScope};
    use std::rc::Rc;

    fn matcher(bounds: MapBounds) -> AlignmentMatcher<u32, u32> {
        AlignmentMatcher::<u32, u32>::new()
            .with_bounds_provider(Rc::new(bounds))
            .with_maximum_alignment_offset(10.0)
            .unwrap()
    }

    #[test]
    fn test_stacked_pair_offset() {
        // comment 1 sits below target 2, left edges 4 apart
        let bounds = MapBounds::default()
            .with(1, 4.0, 20.0, 10.0, 5.0)
            .with(2, 0.0, 0.0, 20.0, 10.0);
        let m = matcher(bounds);

        assert_eq!(m.raw(&1, &2), 4.0);
        assert!((m.normalized(&1, &2) - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_cater_cornered_pair_gets_worst_value() {
        let bounds = MapBounds::default()
            .with(1, 50.0, 50.0, 10.0, 10.0)
            .with(2, 0.0, 0.0, 10.0, 10.0);
        let m = matcher(bounds);

        assert_eq!(m.raw(&1, &2), 10.0);
        assert_eq!(m.normalized(&1, &2), 0.0);
    }

    #[test]
    fn test_missing_bounds_get_worst_value() {
        let m = matcher(MapBounds::default().with(2, 0.0, 0.0, 1.0, 1.0));
        assert_eq!(m.raw(&1, &2), 10.0);
    }

    #[test]
    fn test_binary_normalization() {
        let bounds = MapBounds::default()
            .with(1, 4.0, 20.0, 10.0, 5.0)
            .with(2, 0.0, 0.0, 20.0, 10.0);
        let m = matcher(bounds).with_normalization_function(NormalizationFunction::Binary);

        assert_eq!(m.normalized(&1, &2), 1.0);
    }

    #[test]
    fn test_configuration_checks() {
        assert!(AlignmentMatcher::<u32, u32>::new()
            .with_maximum_alignment_offset(-2.0)
            .is_err());

        let mut unconfigured = AlignmentMatcher::<u32, u32>::new();
        let err = unconfigured
            .preprocess(&TestScope::default(), true)
            .unwrap_err();
        assert!(matches!(err, AttachError::MissingConfiguration(_)));
    }
}
