//! Samplers that draw the points an integrand is evaluated at.
//!
//! All samplers provided here use the inverse transform method: a uniform random number $u$ from
//! a [`RandomStream`] is mapped through the inverse cumulative distribution function $F^{-1}$.
//! Because $F^{-1}$ is monotone, feeding it $1 - u$ yields a negatively correlated antithetic
//! counterpart.
use crate::error::{Error, Result};
use crate::random::RandomStream;
use serde::{Deserialize, Serialize};
use statrs::distribution::{
    ChiSquared as ChiSquaredDist, ContinuousCDF, DiscreteCDF, Poisson as PoissonDist,
};
use std::collections::BTreeMap;
use std::convert::TryFrom;

/// The capabilities an integrator needs from a sampler.
pub trait Sampler: Send {
    /// Draw one value from the support of the sampler.
    fn sample(&mut self) -> f64;

    /// Returns a sampler whose draws are antithetic to the draws of this one, or `None` if the
    /// sampler does not support antithetic variates.
    fn new_antithetic_instance(&self) -> Option<Box<dyn Sampler>>;

    /// Rewind the underlying random number stream to its start.
    fn reset_start_stream(&mut self);

    /// Returns the parameters of the sampled distribution.
    fn parameters(&self) -> ParameterSet;
}

/// A set of named, real-valued parameters. Scalars are stored as arrays of length one.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct ParameterSet {
    values: BTreeMap<String, Vec<f64>>,
}

impl ParameterSet {
    /// Constructor for an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace the scalar parameter `name`.
    pub fn with(mut self, name: &str, value: f64) -> Self {
        self.values.insert(name.to_string(), vec![value]);
        self
    }

    /// Add or replace the array parameter `name`.
    pub fn with_array(mut self, name: &str, values: Vec<f64>) -> Self {
        self.values.insert(name.to_string(), values);
        self
    }

    /// Returns the names of all parameters in alphabetical order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    /// Returns the scalar parameter `name`.
    pub fn get(&self, name: &str) -> Result<f64> {
        match self.array(name)? {
            [value] => Ok(*value),
            values => Err(Error::invalid_parameter(
                name,
                format!("expected a scalar, found {} values", values.len()),
            )),
        }
    }

    /// Returns the array parameter `name`.
    pub fn array(&self, name: &str) -> Result<&[f64]> {
        self.values
            .get(name)
            .map(Vec::as_slice)
            .ok_or_else(|| Error::UnknownParameter(name.to_string()))
    }

    /// Returns the scalar parameter `name`, which must be finite.
    pub fn finite(&self, name: &str) -> Result<f64> {
        let value = self.get(name)?;

        if value.is_finite() {
            Ok(value)
        } else {
            Err(Error::invalid_parameter(name, format!("{} is not finite", value)))
        }
    }

    /// Returns the scalar parameter `name`, which must be finite and positive.
    pub fn positive(&self, name: &str) -> Result<f64> {
        let value = self.finite(name)?;

        if value > 0.0 {
            Ok(value)
        } else {
            Err(Error::invalid_parameter(name, format!("{} is not positive", value)))
        }
    }
}

/// A distribution that can be sampled by inverting its cumulative distribution function.
pub trait InverseCdf: Clone + Send + 'static {
    /// Returns $F^{-1}(u)$ for $u \in (0, 1)$.
    fn inverse_cdf(&self, u: f64) -> f64;

    /// Returns the parameters of the distribution.
    fn parameters(&self) -> ParameterSet;

    /// Turn this distribution into a sampler drawing from `stream`.
    fn sampler(self, stream: RandomStream) -> InverseTransformSampler<Self> {
        InverseTransformSampler::new(self, stream)
    }
}

/// Samples a distribution with the inverse transform method.
#[derive(Clone, Debug)]
pub struct InverseTransformSampler<D> {
    distribution: D,
    stream: RandomStream,
}

impl<D: InverseCdf> InverseTransformSampler<D> {
    /// Constructor.
    pub fn new(distribution: D, stream: RandomStream) -> Self {
        Self {
            distribution,
            stream,
        }
    }

    /// Returns the sampled distribution.
    pub fn distribution(&self) -> &D {
        &self.distribution
    }

    /// Returns the random number stream.
    pub fn stream(&self) -> &RandomStream {
        &self.stream
    }
}

impl<D: InverseCdf> Sampler for InverseTransformSampler<D> {
    fn sample(&mut self) -> f64 {
        let u = self.stream.next_u01();
        self.distribution.inverse_cdf(u)
    }

    fn new_antithetic_instance(&self) -> Option<Box<dyn Sampler>> {
        Some(Box::new(Self::new(
            self.distribution.clone(),
            self.stream.new_antithetic_instance(),
        )))
    }

    fn reset_start_stream(&mut self) {
        self.stream.reset_start_stream();
    }

    fn parameters(&self) -> ParameterSet {
        self.distribution.parameters()
    }
}

/// The continuous uniform distribution on $[a, b)$.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "UniformParameters")]
pub struct Uniform {
    min: f64,
    max: f64,
}

impl Uniform {
    /// Constructor. Requires finite bounds with `min < max`.
    pub fn new(min: f64, max: f64) -> Result<Self> {
        if !(min.is_finite() && max.is_finite()) {
            return Err(Error::invalid_parameter("min/max", "bounds must be finite"));
        }
        if min >= max {
            return Err(Error::invalid_parameter(
                "min/max",
                format!("lower bound {} must be below upper bound {}", min, max),
            ));
        }

        Ok(Self { min, max })
    }

    /// Construct from the parameters `min` and `max`.
    pub fn from_parameters(parameters: &ParameterSet) -> Result<Self> {
        Self::new(parameters.finite("min")?, parameters.finite("max")?)
    }
}

#[derive(Deserialize)]
struct UniformParameters {
    min: f64,
    max: f64,
}

impl TryFrom<UniformParameters> for Uniform {
    type Error = Error;

    fn try_from(parameters: UniformParameters) -> Result<Self> {
        Self::new(parameters.min, parameters.max)
    }
}

impl InverseCdf for Uniform {
    fn inverse_cdf(&self, u: f64) -> f64 {
        self.min + (self.max - self.min) * u
    }

    fn parameters(&self) -> ParameterSet {
        ParameterSet::new()
            .with("min", self.min)
            .with("max", self.max)
    }
}

/// The Weibull distribution.
#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "WeibullParameters")]
pub struct Weibull {
    shape: f64,
    scale: f64,
}

impl Weibull {
    /// Constructor. Both parameters must be positive.
    pub fn new(shape: f64, scale: f64) -> Result<Self> {
        Self::from_parameters(&ParameterSet::new().with("shape", shape).with("scale", scale))
    }

    /// Construct from the parameters `shape` and `scale`.
    pub fn from_parameters(parameters: &ParameterSet) -> Result<Self> {
        Ok(Self {
            shape: parameters.positive("shape")?,
            scale: parameters.positive("scale")?,
        })
    }
}

#[derive(Deserialize)]
struct WeibullParameters {
    shape: f64,
    scale: f64,
}

impl TryFrom<WeibullParameters> for Weibull {
    type Error = Error;

    fn try_from(parameters: WeibullParameters) -> Result<Self> {
        Self::new(parameters.shape, parameters.scale)
    }
}

impl InverseCdf for Weibull {
    fn inverse_cdf(&self, u: f64) -> f64 {
        self.scale * (-(-u).ln_1p()).powf(self.shape.recip())
    }

    fn parameters(&self) -> ParameterSet {
        ParameterSet::new()
            .with("shape", self.shape)
            .with("scale", self.scale)
    }
}

/// The chi-squared distribution.
#[derive(Clone, Copy, Debug)]
pub struct ChiSquared {
    inner: ChiSquaredDist,
}

impl ChiSquared {
    /// Constructor. The degrees of freedom must be positive.
    pub fn new(dof: f64) -> Result<Self> {
        Self::from_parameters(&ParameterSet::new().with("dof", dof))
    }

    /// Construct from the parameter `dof`.
    pub fn from_parameters(parameters: &ParameterSet) -> Result<Self> {
        let dof = parameters.positive("dof")?;
        let inner =
            ChiSquaredDist::new(dof).map_err(|e| Error::invalid_parameter("dof", e.to_string()))?;

        Ok(Self { inner })
    }
}

impl InverseCdf for ChiSquared {
    fn inverse_cdf(&self, u: f64) -> f64 {
        self.inner.inverse_cdf(u)
    }

    fn parameters(&self) -> ParameterSet {
        ParameterSet::new().with("dof", self.inner.freedom())
    }
}

/// The Poisson distribution.
#[derive(Clone, Copy, Debug)]
pub struct Poisson {
    inner: PoissonDist,
}

impl Poisson {
    /// Constructor. The mean must be positive.
    pub fn new(mean: f64) -> Result<Self> {
        Self::from_parameters(&ParameterSet::new().with("mean", mean))
    }

    /// Construct from the parameter `mean`.
    pub fn from_parameters(parameters: &ParameterSet) -> Result<Self> {
        let mean = parameters.positive("mean")?;
        let inner =
            PoissonDist::new(mean).map_err(|e| Error::invalid_parameter("mean", e.to_string()))?;

        Ok(Self { inner })
    }

    /// Returns the mean.
    pub fn mean(&self) -> f64 {
        self.inner.lambda()
    }
}

impl InverseCdf for Poisson {
    /// Returns the smallest $k$ with $F(k) \geq u$, searching from a few standard deviations
    /// below the mean.
    fn inverse_cdf(&self, u: f64) -> f64 {
        let mean = self.mean();
        let mut k = (mean - 6.0 * mean.sqrt()).floor().max(0.0) as u64;

        while k > 0 && self.inner.cdf(k - 1) >= u {
            k -= 1;
        }
        while self.inner.cdf(k) < u {
            k += 1;
        }

        k as f64
    }

    fn parameters(&self) -> ParameterSet {
        ParameterSet::new().with("mean", self.mean())
    }
}

/// Resamples a population of observed values with equal probabilities.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
#[serde(try_from = "EmpiricalParameters")]
pub struct Empirical {
    population: Vec<f64>,
}

impl Empirical {
    /// Constructor. The population must not be empty and contain only finite values.
    pub fn new(population: Vec<f64>) -> Result<Self> {
        if population.is_empty() {
            return Err(Error::invalid_parameter("population", "no values supplied"));
        }
        if population.iter().any(|x| !x.is_finite()) {
            return Err(Error::invalid_parameter(
                "population",
                "contains non-finite values",
            ));
        }

        Ok(Self { population })
    }

    /// Construct from the array parameter `population`.
    pub fn from_parameters(parameters: &ParameterSet) -> Result<Self> {
        Self::new(parameters.array("population")?.to_vec())
    }
}

#[derive(Deserialize)]
struct EmpiricalParameters {
    population: Vec<f64>,
}

impl TryFrom<EmpiricalParameters> for Empirical {
    type Error = Error;

    fn try_from(parameters: EmpiricalParameters) -> Result<Self> {
        Self::new(parameters.population)
    }
}

impl InverseCdf for Empirical {
    fn inverse_cdf(&self, u: f64) -> f64 {
        let n = self.population.len();
        let index = ((u * n as f64) as usize).min(n - 1);
        self.population[index]
    }

    fn parameters(&self) -> ParameterSet {
        ParameterSet::new().with_array("population", self.population.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::estimators::RunningStatistics;
    use crate::random::StreamProvider;
    use assert_approx_eq::assert_approx_eq;

    fn sample_mean(sampler: &mut dyn Sampler, n: usize) -> f64 {
        let mut stats = RunningStatistics::new();
        for _ in 0..n {
            stats.collect(sampler.sample()).unwrap();
        }
        stats.average().unwrap()
    }

    #[test]
    fn test_parameter_set() {
        let parameters = ParameterSet::new()
            .with("shape", 2.0)
            .with("scale", -1.0)
            .with_array("population", vec![1.0, 2.0]);

        assert_eq!(parameters.get("shape").unwrap(), 2.0);
        assert_eq!(parameters.array("population").unwrap(), &[1.0, 2.0]);
        assert_eq!(
            parameters.names().collect::<Vec<_>>(),
            vec!["population", "scale", "shape"]
        );
        assert!(matches!(
            parameters.get("rate"),
            Err(Error::UnknownParameter(_))
        ));
        assert!(matches!(
            parameters.positive("scale"),
            Err(Error::InvalidParameter { .. })
        ));
        assert!(matches!(
            parameters.get("population"),
            Err(Error::InvalidParameter { .. })
        ));
    }

    #[test]
    fn test_invalid_parameters_are_rejected() {
        assert!(Uniform::new(1.0, 1.0).is_err());
        assert!(Uniform::new(0.0, f64::INFINITY).is_err());
        assert!(Weibull::new(0.0, 1.0).is_err());
        assert!(Weibull::new(1.0, -2.0).is_err());
        assert!(ChiSquared::new(-1.0).is_err());
        assert!(Poisson::new(0.0).is_err());
        assert!(Empirical::new(vec![]).is_err());
        assert!(Empirical::new(vec![1.0, f64::NAN]).is_err());
    }

    #[test]
    fn test_deserialization_is_validated() {
        assert!(serde_json::from_str::<Empirical>(r#"{"population":[]}"#).is_err());
        assert!(serde_json::from_str::<Uniform>(r#"{"min":2.0,"max":1.0}"#).is_err());
        assert!(serde_json::from_str::<Weibull>(r#"{"shape":-1.0,"scale":1.0}"#).is_err());

        let empirical: Empirical = serde_json::from_str(r#"{"population":[4.0,5.0]}"#).unwrap();
        assert_eq!(empirical.inverse_cdf(0.75), 5.0);

        let uniform = Uniform::new(-1.0, 3.0).unwrap();
        let json = serde_json::to_string(&uniform).unwrap();
        assert_eq!(serde_json::from_str::<Uniform>(&json).unwrap(), uniform);
    }

    #[test]
    fn test_from_parameters_round_trip() {
        let weibull = Weibull::new(1.5, 3.0).unwrap();
        assert_eq!(Weibull::from_parameters(&weibull.parameters()).unwrap(), weibull);

        let uniform = Uniform::new(-1.0, 4.0).unwrap();
        assert_eq!(Uniform::from_parameters(&uniform.parameters()).unwrap(), uniform);

        let empirical = Empirical::new(vec![3.0, 1.0]).unwrap();
        assert_eq!(
            Empirical::from_parameters(&empirical.parameters()).unwrap(),
            empirical
        );
    }

    #[test]
    fn test_uniform_inverse_cdf() {
        let uniform = Uniform::new(2.0, 6.0).unwrap();

        assert_eq!(uniform.inverse_cdf(0.25), 3.0);
        assert_eq!(uniform.inverse_cdf(0.5), 4.0);
    }

    #[test]
    fn test_weibull_inverse_cdf() {
        // shape 1 is the exponential distribution with mean `scale`
        let weibull = Weibull::new(1.0, 2.0).unwrap();
        assert_approx_eq!(weibull.inverse_cdf(0.5), 2.0 * 2.0_f64.ln(), 1e-12);

        let mut sampler = weibull.sampler(StreamProvider::new(3).next_stream());
        assert_approx_eq!(sample_mean(&mut sampler, 50_000), 2.0, 0.05);
    }

    #[test]
    fn test_chi_squared_mean() {
        let mut sampler = ChiSquared::new(4.0)
            .unwrap()
            .sampler(StreamProvider::new(5).next_stream());

        assert_approx_eq!(sample_mean(&mut sampler, 20_000), 4.0, 0.1);
    }

    #[test]
    fn test_poisson_inverse_cdf() {
        let poisson = Poisson::new(3.0).unwrap();

        // F(0) = exp(-3) = 0.0498
        assert_eq!(poisson.inverse_cdf(0.01), 0.0);
        assert_eq!(poisson.inverse_cdf(0.06), 1.0);

        let large = Poisson::new(1000.0).unwrap();
        assert_approx_eq!(large.inverse_cdf(0.5), 1000.0, 1.0);

        let mut sampler = poisson.sampler(StreamProvider::new(11).next_stream());
        assert_approx_eq!(sample_mean(&mut sampler, 20_000), 3.0, 0.05);
    }

    #[test]
    fn test_empirical_resampling() {
        let empirical = Empirical::new(vec![1.0, 2.0, 3.0, 4.0]).unwrap();

        assert_eq!(empirical.inverse_cdf(0.1), 1.0);
        assert_eq!(empirical.inverse_cdf(0.3), 2.0);
        assert_eq!(empirical.inverse_cdf(0.99), 4.0);
    }

    #[test]
    fn test_antithetic_instance() {
        let mut sampler = Uniform::new(0.0, 10.0)
            .unwrap()
            .sampler(StreamProvider::default().next_stream());
        let mut antithetic = sampler.new_antithetic_instance().unwrap();

        for _ in 0..100 {
            assert_approx_eq!(sampler.sample() + antithetic.sample(), 10.0, 1e-12);
        }

        assert_eq!(antithetic.parameters(), sampler.parameters());
    }

    #[test]
    fn test_reset_start_stream() {
        let mut sampler = Weibull::new(2.0, 1.0)
            .unwrap()
            .sampler(StreamProvider::default().next_stream());
        let first: Vec<f64> = (0..10).map(|_| sampler.sample()).collect();

        sampler.reset_start_stream();
        let second: Vec<f64> = (0..10).map(|_| sampler.sample()).collect();

        assert_eq!(first, second);
    }
}
