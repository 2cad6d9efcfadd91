//! The core module
pub mod criterion;
pub mod engine;
pub mod estimators;

use serde::{Deserialize, Serialize};
use std::fmt;

/// Integrand trait
pub trait Integrand: Send + Sync {
    /// Call the integrand with a point `x` drawn by a sampler.
    fn call(&self, x: f64) -> f64;
}

impl<F> Integrand for F
where
    F: Fn(f64) -> f64 + Send + Sync,
{
    fn call(&self, x: f64) -> f64 {
        self(x)
    }
}

/// A strategy producing the observations a [`SequentialEngine`](engine::SequentialEngine)
/// accumulates.
///
/// The engine owns the stopping rule; an implementer of this trait decides how a single
/// observation is generated, for example by averaging antithetic pairs.
pub trait ObservationSource {
    /// Produce one observation.
    fn observe(&mut self) -> f64;

    /// Rewind all random number streams to their start, keeping any pairing between them intact.
    fn reset_streams(&mut self);

    /// How many integrand evaluations a single observation costs.
    fn calls_per_observation(&self) -> usize {
        1
    }
}

/// The phases a sequential integration runs through.
#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub enum EngineState {
    /// No evaluation has been started yet.
    NotStarted,
    /// The pilot sample is being drawn.
    PilotRunning,
    /// The pilot sample is complete and the criterion is not yet met.
    PilotComplete,
    /// Observations beyond the pilot are being drawn.
    MainRunning,
    /// The precision target has been met.
    Converged,
    /// The sample size ceiling was reached without meeting the precision target.
    MaxSamplesExceeded,
}

impl EngineState {
    /// Returns whether no further observations will be drawn without an explicit resume.
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Converged | Self::MaxSamplesExceeded)
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::NotStarted => "not started",
            Self::PilotRunning => "pilot running",
            Self::PilotComplete => "pilot complete",
            Self::MainRunning => "main running",
            Self::Converged => "converged",
            Self::MaxSamplesExceeded => "maximum sample size exceeded",
        };
        f.write_str(name)
    }
}
