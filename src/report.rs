//! Summaries of an integration for logging and display.
use crate::core::criterion::ErrorTarget;
use crate::core::EngineState;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// A snapshot of the state and the estimates of a sequential integration.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Report {
    /// The state of the engine when the snapshot was taken.
    pub state: EngineState,
    /// Whether the precision target was met.
    pub converged: bool,
    /// The number of observations. With antithetic sampling these are pairs.
    pub count: usize,
    /// The number of integrand evaluations.
    pub function_calls: usize,
    /// The estimate of the integral.
    pub mean: Option<f64>,
    /// The sample standard deviation of the observations.
    pub std_dev: Option<f64>,
    /// The standard error of the estimate.
    pub std_error: Option<f64>,
    /// The half-width of the confidence interval around the estimate.
    pub half_width: Option<f64>,
    /// The confidence level of the interval.
    pub confidence_level: f64,
    /// The precision target.
    pub target: ErrorTarget,
    /// The pilot sample size.
    pub initial_sample_size: usize,
    /// The sample size ceiling.
    pub max_sample_size: usize,
    /// The last projection of the sample size needed, if the pilot was not sufficient.
    pub projected_sample_size: Option<usize>,
    /// Whether observations average antithetic pairs.
    pub antithetic: bool,
    /// Whether fresh evaluations rewind the random number streams.
    pub reset_stream_on_evaluate: bool,
}

impl Report {
    /// Serialize this report to JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Writes `value` or `n/a` if it is missing.
struct Optional<T>(Option<T>);

impl<T: fmt::Display> fmt::Display for Optional<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(value) => fmt::Display::fmt(value, f),
            None => f.write_str("n/a"),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Monte Carlo integration")?;
        writeln!(f, "  state                  : {}", self.state)?;
        writeln!(f, "  converged              : {}", self.converged)?;
        writeln!(f, "  desired error          : {}", self.target)?;
        writeln!(f, "  confidence level       : {}", self.confidence_level)?;
        writeln!(f, "  initial sample size    : {}", self.initial_sample_size)?;
        writeln!(f, "  maximum sample size    : {}", self.max_sample_size)?;
        writeln!(
            f,
            "  projected sample size  : {}",
            Optional(self.projected_sample_size)
        )?;
        writeln!(f, "  antithetic sampling    : {}", self.antithetic)?;
        writeln!(f, "  reset stream           : {}", self.reset_stream_on_evaluate)?;
        writeln!(f, "  N                      : {}", self.count)?;
        writeln!(f, "  function calls         : {}", self.function_calls)?;
        writeln!(f, "  estimate               : {}", Optional(self.mean))?;
        writeln!(f, "  standard deviation     : {}", Optional(self.std_dev))?;
        writeln!(f, "  standard error         : {}", Optional(self.std_error))?;
        write!(f, "  half-width             : {}", Optional(self.half_width))
    }
}
