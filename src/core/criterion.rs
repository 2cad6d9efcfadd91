//! Stopping criteria for sequential integrations.
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The precision an integration must reach before it may stop.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub enum ErrorTarget {
    /// The confidence interval half-width must not exceed this value.
    Absolute(f64),
    /// The confidence interval half-width divided by the magnitude of the mean must not exceed
    /// this value.
    Relative(f64),
}

impl ErrorTarget {
    /// Returns the desired error, independent of its kind.
    pub const fn value(&self) -> f64 {
        match *self {
            Self::Absolute(value) | Self::Relative(value) => value,
        }
    }

    /// The half-width that has to be reached given the current `mean`. For a relative target
    /// this is zero when the mean is zero, i.e. it can never be reached.
    pub fn target_half_width(&self, mean: f64) -> f64 {
        match *self {
            Self::Absolute(error) => error,
            Self::Relative(error) => error * mean.abs(),
        }
    }

    /// Returns whether `half_width` meets this target around `mean`. A relative target is never
    /// met while the mean is zero or non-finite.
    pub fn is_met(&self, half_width: f64, mean: f64) -> bool {
        match *self {
            Self::Absolute(error) => half_width <= error,
            Self::Relative(error) => {
                if mean == 0.0 || !mean.is_finite() {
                    return false;
                }
                half_width / mean.abs() <= error
            }
        }
    }
}

impl fmt::Display for ErrorTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absolute(error) => write!(f, "absolute {}", error),
            Self::Relative(error) => write!(f, "relative {}", error),
        }
    }
}

/// Configuration of the stopping rule: the precision target, the confidence level of the
/// interval it is measured with, the size of the pilot sample and the hard sample size ceiling.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct StoppingCriterion {
    target: ErrorTarget,
    confidence_level: f64,
    initial_sample_size: usize,
    max_sample_size: usize,
}

impl Default for StoppingCriterion {
    fn default() -> Self {
        Self {
            target: ErrorTarget::Absolute(0.001),
            confidence_level: 0.99,
            initial_sample_size: 100,
            max_sample_size: 100_000,
        }
    }
}

impl StoppingCriterion {
    /// Constructor. Fails if any of the values is out of its domain.
    pub fn new(
        target: ErrorTarget,
        confidence_level: f64,
        initial_sample_size: usize,
        max_sample_size: usize,
    ) -> Result<Self> {
        let criterion = Self {
            target,
            confidence_level,
            initial_sample_size,
            max_sample_size,
        };
        criterion.validate()?;
        Ok(criterion)
    }

    /// Checks that the desired error is positive, that the confidence level lies in $(0, 1)$, that
    /// the pilot sample has at least two observations and that the maximum sample size is not
    /// smaller than the pilot.
    pub fn validate(&self) -> Result<()> {
        let error = self.target.value();
        if !(error > 0.0 && error.is_finite()) {
            return Err(Error::InvalidDesiredError(error));
        }

        if !(self.confidence_level > 0.0 && self.confidence_level < 1.0) {
            return Err(Error::InvalidConfidenceLevel(self.confidence_level));
        }

        if self.initial_sample_size < 2 {
            return Err(Error::InitialSampleSizeTooSmall(self.initial_sample_size));
        }

        if self.max_sample_size < self.initial_sample_size {
            return Err(Error::MaxBelowInitial {
                initial: self.initial_sample_size,
                max: self.max_sample_size,
            });
        }

        Ok(())
    }

    /// Replace the precision target.
    pub fn with_target(mut self, target: ErrorTarget) -> Result<Self> {
        self.target = target;
        self.validate()?;
        Ok(self)
    }

    /// Replace the confidence level.
    pub fn with_confidence_level(mut self, confidence_level: f64) -> Result<Self> {
        self.confidence_level = confidence_level;
        self.validate()?;
        Ok(self)
    }

    /// Replace the pilot sample size.
    pub fn with_initial_sample_size(mut self, initial_sample_size: usize) -> Result<Self> {
        self.initial_sample_size = initial_sample_size;
        self.validate()?;
        Ok(self)
    }

    /// Replace the sample size ceiling.
    pub fn with_max_sample_size(mut self, max_sample_size: usize) -> Result<Self> {
        self.max_sample_size = max_sample_size;
        self.validate()?;
        Ok(self)
    }

    /// Returns the precision target.
    pub const fn target(&self) -> ErrorTarget {
        self.target
    }

    /// Returns the confidence level.
    pub const fn confidence_level(&self) -> f64 {
        self.confidence_level
    }

    /// Returns the pilot sample size.
    pub const fn initial_sample_size(&self) -> usize {
        self.initial_sample_size
    }

    /// Returns the maximum sample size.
    pub const fn max_sample_size(&self) -> usize {
        self.max_sample_size
    }

    pub(crate) fn extend_max_sample_size(&mut self, extra: usize) {
        self.max_sample_size = self.max_sample_size.saturating_add(extra);
    }
}
