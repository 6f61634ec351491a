use serde::{Deserialize, Serialize};

/// How raw values between the worst and the best raw value are mapped to `[0, 1]`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NormalizationFunction {
    /// Interpolate linearly between the worst (0) and the best (1) raw value
    #[default]
    Linear,

    /// Anything better than the worst raw value is a perfect match
    Binary,
}

/// Maps raw matcher values to normalized values in `[0, 1]`.
///
/// The worst raw value maps to 0 and the best raw value maps to 1. The best raw value may well
/// be smaller than the worst one (distances, for example), in which case the mapping is
/// mirrored.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Normalization {
    worst: f64,
    best: f64,
    function: NormalizationFunction,
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            worst: 0.0,
            best: 1.0,
            function: NormalizationFunction::Linear,
        }
    }
}

impl Normalization {
    pub fn new(worst: f64, best: f64, function: NormalizationFunction) -> Self {
        Self {
            worst,
            best,
            function,
        }
    }

    pub fn linear(worst: f64, best: f64) -> Self {
        Self::new(worst, best, NormalizationFunction::Linear)
    }

    pub fn binary(worst: f64, best: f64) -> Self {
        Self::new(worst, best, NormalizationFunction::Binary)
    }

    pub fn worst_raw_value(&self) -> f64 {
        self.worst
    }

    pub fn best_raw_value(&self) -> f64 {
        self.best
    }

    pub fn function(&self) -> NormalizationFunction {
        self.function
    }

    /// Normalize the given raw value. The result is always within `[0, 1]`.
    #[must_use]
    pub fn normalize(&self, raw: f64) -> f64 {
        if raw.is_nan() {
            return 0.0;
        }

        match self.function {
            NormalizationFunction::Linear => self.linear_value(raw),
            NormalizationFunction::Binary => self.binary_value(raw),
        }
    }

    fn linear_value(&self, raw: f64) -> f64 {
        let (worst, best) = (self.worst, self.best);

        if worst < best {
            if raw <= worst {
                0.0
            } else if raw >= best {
                1.0
            } else {
                (raw - worst) / (best - worst)
            }
        } else if best < worst {
            if raw <= best {
                1.0
            } else if raw >= worst {
                0.0
            } else {
                1.0 - (raw - best) / (worst - best)
            }
        } else if raw == best {
            1.0
        } else {
            0.0
        }
    }

    fn binary_value(&self, raw: f64) -> f64 {
        let (worst, best) = (self.worst, self.best);

        let matched = if worst < best {
            raw > worst
        } else if best < worst {
            raw < worst
        } else {
            raw == best
        };

        if matched {
            1.0
        } else {
            0.0
        }
    }
}

/// Builder-style configuration shared by all matchers that normalize through a
/// [`Normalization`].
pub trait NormalizedMatcher: Sized {
    fn normalization(&self) -> &Normalization;

    fn normalization_mut(&mut self) -> &mut Normalization;

    fn with_worst_raw_value(mut self, worst: f64) -> Self {
        self.normalization_mut().worst = worst;
        self
    }

    fn with_best_raw_value(mut self, best: f64) -> Self {
        self.normalization_mut().best = best;
        self
    }

    fn with_normalization_function(mut self, function: NormalizationFunction) -> Self {
        self.normalization_mut().function = function;
        self
    }

    fn with_normalization(mut self, normalization: Normalization) -> Self {
        *self.normalization_mut() = normalization;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_linear_defaults() {
        let n = Normalization::default();
        assert_eq!(n.normalize(0.0), 0.0);
        assert_eq!(n.normalize(1.0), 1.0);
        assert_eq!(n.normalize(0.5), 0.5);
        assert_eq!(n.normalize(-3.0), 0.0);
        assert_eq!(n.normalize(7.0), 1.0);
    }

    #[test]
    fn test_linear_mirrored() {
        let n = Normalization::linear(50.0, 0.0);
        assert_eq!(n.normalize(0.0), 1.0);
        assert_eq!(n.normalize(-1.0), 1.0);
        assert_eq!(n.normalize(50.0), 0.0);
        assert_eq!(n.normalize(80.0), 0.0);
        assert!((n.normalize(5.0) - 0.9).abs() < 1e-12);
    }

    #[test]
    fn test_linear_degenerate_range() {
        let n = Normalization::linear(3.0, 3.0);
        assert_eq!(n.normalize(3.0), 1.0);
        assert_eq!(n.normalize(2.9), 0.0);
    }

    #[test]
    fn test_binary() {
        let n = Normalization::binary(0.0, 1.0);
        assert_eq!(n.normalize(0.0), 0.0);
        assert_eq!(n.normalize(0.999), 1.0);
        assert_eq!(n.normalize(-0.5), 0.0);

        let mirrored = Normalization::binary(10.0, 0.0);
        assert_eq!(mirrored.normalize(10.0), 0.0);
        assert_eq!(mirrored.normalize(9.5), 1.0);
        assert_eq!(mirrored.normalize(12.0), 0.0);

        let degenerate = Normalization::binary(1.0, 1.0);
        assert_eq!(degenerate.normalize(1.0), 1.0);
        assert_eq!(degenerate.normalize(0.0), 0.0);
    }

    #[test]
    fn test_nan_is_worst() {
        assert_eq!(Normalization::default().normalize(f64::NAN), 0.0);
        assert_eq!(Normalization::binary(5.0, 0.0).normalize(f64::NAN), 0.0);
    }
}
