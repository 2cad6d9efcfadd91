//! This module contains everything related to estimators.
use crate::error::{Error, Result};
use num_traits::{Float, FromPrimitive};
use serde::{Deserialize, Serialize};
use statrs::distribution::{ContinuousCDF, StudentsT};

/// Accumulates a stream of observations and estimates their mean, sample variance and the
/// half-width of a confidence interval around the mean.
///
/// The moments are updated with Welford's algorithm, so that large offsets do not cancel
/// catastrophically as they would with plain sums of squares.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct RunningStatistics<T> {
    count: usize,
    mean: T,
    m2: T,
    min: T,
    max: T,
}

impl<T: Float> Default for RunningStatistics<T> {
    fn default() -> Self {
        Self {
            count: 0,
            mean: T::zero(),
            m2: T::zero(),
            min: T::infinity(),
            max: T::neg_infinity(),
        }
    }
}

impl<T> RunningStatistics<T>
where
    T: Float + FromPrimitive,
{
    /// Constructor for an empty accumulator.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fold `value` into the running moments.
    ///
    /// Non-finite values are rejected and leave the accumulator untouched.
    pub fn collect(&mut self, value: T) -> Result<()> {
        if !value.is_finite() {
            return Err(Error::NonFiniteObservation {
                value: value.to_f64().unwrap_or(f64::NAN),
                count: self.count,
            });
        }

        self.count += 1;
        let n = T::from_usize(self.count).unwrap_or_else(T::infinity);
        let delta = value - self.mean;
        self.mean = self.mean + delta / n;
        self.m2 = self.m2 + delta * (value - self.mean);
        self.min = self.min.min(value);
        self.max = self.max.max(value);

        Ok(())
    }

    /// Returns the number of observations collected since the last reset.
    pub const fn count(&self) -> usize {
        self.count
    }

    /// Returns the average of the observations, or `None` if there are none.
    pub fn average(&self) -> Option<T> {
        if self.count == 0 {
            None
        } else {
            Some(self.mean)
        }
    }

    /// Returns the sample variance, which needs at least two observations.
    pub fn variance(&self) -> Option<T> {
        if self.count < 2 {
            return None;
        }

        let dof = T::from_usize(self.count - 1)?;
        Some(self.m2 / dof)
    }

    /// Returns the sample standard deviation, which needs at least two observations.
    pub fn std_dev(&self) -> Option<T> {
        self.variance().map(Float::sqrt)
    }

    /// Returns the estimated standard error of the mean.
    pub fn standard_error(&self) -> Option<T> {
        let n = T::from_usize(self.count)?;
        self.std_dev().map(|s| s / n.sqrt())
    }

    /// Returns the smallest observation.
    pub fn min(&self) -> Option<T> {
        if self.count == 0 {
            None
        } else {
            Some(self.min)
        }
    }

    /// Returns the largest observation.
    pub fn max(&self) -> Option<T> {
        if self.count == 0 {
            None
        } else {
            Some(self.max)
        }
    }

    /// Returns the half-width of the two-sided confidence interval around the mean,
    ///
    /// $$ h = t_{N-1, 1-\alpha/2} \frac{s}{\sqrt{N}}, $$
    ///
    /// where `level` is $1 - \alpha$. Returns `None` with fewer than two observations or when
    /// `level` does not lie in $(0, 1)$.
    pub fn half_width(&self, level: f64) -> Option<T> {
        if !(level > 0.0 && level < 1.0) {
            return None;
        }

        let std_error = self.standard_error()?;
        let quantile = t_quantile(self.count - 1, 1.0 - (1.0 - level) / 2.0)?;

        Some(T::from_f64(quantile)? * std_error)
    }

    /// Clear all accumulators.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// Quantile of the Student-t distribution with `dof` degrees of freedom.
fn t_quantile(dof: usize, p: f64) -> Option<f64> {
    let student = StudentsT::new(0.0, 1.0, dof as f64).ok()?;
    let quantile = student.inverse_cdf(p);

    if quantile.is_finite() {
        Some(quantile)
    } else {
        None
    }
}
