//! One-dimensional integrator
//!
//! To approximate $\int_a^b g(x) \\, \mathrm{d}x$ pick a sampler with density $w(x)$ on
//! $[a, b]$ and integrate $h(x) = g(x) / w(x)$, whose expected value under the sampler is the
//! integral. For a uniform sampler on $[a, b]$ this is $h(x) = (b - a) \\, g(x)$; any other
//! density turns the sampler into an importance sampling distribution.
use crate::callbacks::Callback;
use crate::core::criterion::StoppingCriterion;
use crate::core::engine::SequentialEngine;
use crate::core::{Integrand, ObservationSource};
use crate::error::{Error, Result};
use crate::report::Report;
use crate::samplers::Sampler;

use std::fmt;
use tracing::warn;

/// Produces observations by evaluating an integrand at points drawn from a sampler.
///
/// With antithetic sampling every observation is the average of the integrand at a point and at
/// its antithetic counterpart, so that each observation costs two integrand evaluations.
pub struct OneDimensional {
    function: Box<dyn Integrand>,
    sampler: Box<dyn Sampler>,
    antithetic: Option<Box<dyn Sampler>>,
}

impl OneDimensional {
    /// Constructor. If `antithetic` is set but `sampler` cannot produce antithetic variates,
    /// plain sampling is used.
    pub fn new(function: Box<dyn Integrand>, sampler: Box<dyn Sampler>, antithetic: bool) -> Self {
        let antithetic = if antithetic {
            let instance = sampler.new_antithetic_instance();
            if instance.is_none() {
                warn!("sampler does not support antithetic variates, using plain sampling");
            }
            instance
        } else {
            None
        };

        Self {
            function,
            sampler,
            antithetic,
        }
    }

    /// Returns whether observations average antithetic pairs.
    pub fn is_antithetic(&self) -> bool {
        self.antithetic.is_some()
    }

    /// Returns the primary sampler.
    pub fn sampler(&self) -> &dyn Sampler {
        self.sampler.as_ref()
    }
}

impl ObservationSource for OneDimensional {
    fn observe(&mut self) -> f64 {
        let y = self.function.call(self.sampler.sample());

        match &mut self.antithetic {
            Some(antithetic) => (y + self.function.call(antithetic.sample())) / 2.0,
            None => y,
        }
    }

    fn reset_streams(&mut self) {
        self.sampler.reset_start_stream();

        if let Some(antithetic) = &mut self.antithetic {
            antithetic.reset_start_stream();
        }
    }

    fn calls_per_observation(&self) -> usize {
        if self.is_antithetic() {
            2
        } else {
            1
        }
    }
}

impl fmt::Debug for OneDimensional {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OneDimensional")
            .field("sampler", &self.sampler.parameters())
            .field("antithetic", &self.is_antithetic())
            .finish()
    }
}

/// A sequential Monte Carlo integration of a one-dimensional function.
pub type Integration1D = SequentialEngine<OneDimensional>;

impl SequentialEngine<OneDimensional> {
    /// Returns a builder with antithetic sampling switched on, no stream resets, and the default
    /// [`StoppingCriterion`].
    pub fn builder() -> Integration1DBuilder {
        Integration1DBuilder::default()
    }
}

/// Assembles an [`Integration1D`].
pub struct Integration1DBuilder {
    function: Option<Box<dyn Integrand>>,
    sampler: Option<Box<dyn Sampler>>,
    criterion: StoppingCriterion,
    antithetic: bool,
    reset_stream_on_evaluate: bool,
}

impl Default for Integration1DBuilder {
    fn default() -> Self {
        Self {
            function: None,
            sampler: None,
            criterion: StoppingCriterion::default(),
            antithetic: true,
            reset_stream_on_evaluate: false,
        }
    }
}

impl Integration1DBuilder {
    /// Set the integrand $h(x)$.
    pub fn function(mut self, function: impl Integrand + 'static) -> Self {
        self.function = Some(Box::new(function));
        self
    }

    /// Set the sampler whose support is the integration domain.
    pub fn sampler(mut self, sampler: impl Sampler + 'static) -> Self {
        self.sampler = Some(Box::new(sampler));
        self
    }

    /// Set an already boxed sampler.
    pub fn boxed_sampler(mut self, sampler: Box<dyn Sampler>) -> Self {
        self.sampler = Some(sampler);
        self
    }

    /// Set the stopping criterion.
    pub fn criterion(mut self, criterion: StoppingCriterion) -> Self {
        self.criterion = criterion;
        self
    }

    /// Switch antithetic sampling on or off.
    pub fn antithetic(mut self, antithetic: bool) -> Self {
        self.antithetic = antithetic;
        self
    }

    /// Rewind the random number streams before every fresh evaluation.
    pub fn reset_stream_on_evaluate(mut self, reset: bool) -> Self {
        self.reset_stream_on_evaluate = reset;
        self
    }

    /// Build the integration. Fails if the function or the sampler is missing or if the stopping
    /// criterion is invalid.
    pub fn build(self) -> Result<Integration1D> {
        let function = self.function.ok_or(Error::MissingCollaborator("function"))?;
        let sampler = self.sampler.ok_or(Error::MissingCollaborator("sampler"))?;

        let mut integration = SequentialEngine::new(
            OneDimensional::new(function, sampler, self.antithetic),
            self.criterion,
        )?;
        integration.set_reset_stream_on_evaluate(self.reset_stream_on_evaluate);

        Ok(integration)
    }
}

/// Integrate `function` over the support of `sampler` with antithetic sampling until `criterion`
/// is met, reporting progress to `callback`.
pub fn integrate(
    function: impl Integrand + 'static,
    sampler: impl Sampler + 'static,
    criterion: StoppingCriterion,
    callback: &impl Callback,
) -> Result<Report> {
    Integration1D::builder()
        .function(function)
        .sampler(sampler)
        .criterion(criterion)
        .build()?
        .evaluate_with_callback(callback)
}
