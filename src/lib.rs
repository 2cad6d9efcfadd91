#![warn(clippy::all, clippy::cargo, clippy::nursery, clippy::pedantic)]
#![warn(missing_docs)]

//! The crate `seqmc` provides *sequential* [Monte Carlo integration] of one-dimensional
//! functions: instead of fixing the number of samples up front, the integration keeps sampling
//! until the confidence interval around the estimate is as narrow as requested, and not longer.
//!
//! # Features
//!
//! - **Adaptive stopping**. A pilot sample estimates the variance of the integrand, from which
//! the number of samples needed to reach an absolute or relative precision target is projected.
//! The precision is checked after every observation, so the integration stops as soon as the
//! target is met, and never exceeds a hard maximum sample size.
//! - **Antithetic variates**. Each observation can average the integrand at a point and at its
//! antithetic counterpart, which reduces the variance for monotone integrands.
//! - **Reproducibility**. Random numbers come from explicit, seeded [`random::RandomStream`]s that
//! can be rewound before each evaluation, so that repeated evaluations give identical results.
//! - **Resumption**. A finished integration can be continued with a larger sample size ceiling
//! without discarding the observations collected so far.
//! - **Non-finite number detection**. An integrand returning `inf` or `nan` aborts the evaluation
//! with an error instead of silently corrupting the estimate.
//!
//! # How do I get started?
//!
//! ```
//! use seqmc::prelude::*;
//!
//! // int_0^pi dx sin(x) = 2, sampled uniformly: h(x) = pi * sin(x)
//! let sampler = Uniform::new(0.0, std::f64::consts::PI)?
//!     .sampler(StreamProvider::default().next_stream());
//! let criterion = StoppingCriterion::new(ErrorTarget::Absolute(0.01), 0.99, 100, 100_000)?;
//!
//! let mut integration = Integration1D::builder()
//!     .function(|x: f64| std::f64::consts::PI * x.sin())
//!     .sampler(sampler)
//!     .criterion(criterion)
//!     .build()?;
//! let report = integration.evaluate()?;
//!
//! assert!(report.converged);
//! # Ok::<(), seqmc::Error>(())
//! ```
//!
//! # What is ...?
//!
//! Given a sampler with density $w(x)$ on the integration domain and a function $h(x) =
//! g(x)/w(x)$, we approximate
//!
//! $$ I = \int \mathrm{d}x \\, g(x) \approx \bar{h} = \frac{1}{N} \sum_{j=1}^N h(x_j). $$
//!
//! - an *observation* is a single $h(x_j)$, or with antithetic sampling the average of $h$ at a
//! point and at its antithetic counterpart;
//! - the *sample size* $N$ is the number of observations, i.e. pairs with antithetic sampling;
//! - the *half-width* is $t_{N-1, 1-\alpha/2} \\, s / \sqrt{N}$, the distance from $\bar{h}$ to
//! either end of the confidence interval at level $1 - \alpha$;
//! - the *pilot sample* is the first batch of observations, used to project $N$.
//!
//! [Monte Carlo integration]: https://en.wikipedia.org/wiki/Monte_Carlo_integration

pub mod callbacks;
pub mod core;
pub mod error;
pub mod integrators;
pub mod random;
pub mod report;
pub mod samplers;

pub use crate::error::{Error, Result};

/// The most commonly used types.
pub mod prelude {
    pub use crate::callbacks::{Callback, SimpleCallback, SinkCallback, TracingCallback};
    pub use crate::core::criterion::{ErrorTarget, StoppingCriterion};
    pub use crate::core::engine::SequentialEngine;
    pub use crate::core::estimators::RunningStatistics;
    pub use crate::core::{EngineState, Integrand, ObservationSource};
    pub use crate::error::Error;
    pub use crate::integrators::one_dimensional::{integrate, Integration1D, OneDimensional};
    pub use crate::random::{RandomStream, StreamProvider};
    pub use crate::report::Report;
    pub use crate::samplers::{
        ChiSquared, Empirical, InverseCdf, ParameterSet, Poisson, Sampler, Uniform, Weibull,
    };
}
