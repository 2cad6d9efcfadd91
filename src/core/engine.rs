//! The sequential stopping-rule machine.
//!
//! An evaluation runs in two phases. The *pilot* draws a fixed number of observations $n_0$ to
//! estimate the variance. If the confidence interval is not yet narrow enough, the engine projects
//! the total sample size needed, assuming the half-width $h$ shrinks like $1/\sqrt{N}$,
//!
//! $$ m = \left\lceil N \left( \frac{h}{h_\mathrm{target}} \right)^2 \right\rceil, $$
//!
//! and keeps drawing observations, checking the criterion after every single one of them. When a
//! projected batch runs out before the target is met, a new projection is made from the current
//! statistics. The projection is only an approximation; the maximum sample size is a hard limit.
use crate::callbacks::{Callback, SinkCallback};
use crate::core::criterion::StoppingCriterion;
use crate::core::estimators::RunningStatistics;
use crate::core::{EngineState, ObservationSource};
use crate::error::{Error, Result};
use crate::report::Report;
use tracing::{debug, info, trace, warn};

/// Drives an [`ObservationSource`] until a [`StoppingCriterion`] is met or its sample size
/// ceiling is reached.
#[derive(Debug)]
pub struct SequentialEngine<S> {
    source: S,
    criterion: StoppingCriterion,
    statistics: RunningStatistics<f64>,
    state: EngineState,
    reset_stream_on_evaluate: bool,
    projected_sample_size: Option<usize>,
}

impl<S: ObservationSource> SequentialEngine<S> {
    /// Constructor. Fails if `criterion` is invalid.
    pub fn new(source: S, criterion: StoppingCriterion) -> Result<Self> {
        criterion.validate()?;

        Ok(Self {
            source,
            criterion,
            statistics: RunningStatistics::new(),
            state: EngineState::NotStarted,
            reset_stream_on_evaluate: false,
            projected_sample_size: None,
        })
    }

    /// Replace the stopping criterion used by subsequent evaluations and resumptions.
    pub fn set_criterion(&mut self, criterion: StoppingCriterion) -> Result<()> {
        criterion.validate()?;
        self.criterion = criterion;
        Ok(())
    }

    /// If set, every fresh evaluation rewinds the random number streams to their start, so that
    /// repeated evaluations produce identical results. Off by default.
    pub fn set_reset_stream_on_evaluate(&mut self, reset: bool) {
        self.reset_stream_on_evaluate = reset;
    }

    /// Returns whether fresh evaluations rewind the random number streams.
    pub const fn reset_stream_on_evaluate(&self) -> bool {
        self.reset_stream_on_evaluate
    }

    /// Returns the stopping criterion.
    pub const fn criterion(&self) -> &StoppingCriterion {
        &self.criterion
    }

    /// Returns the current state.
    pub const fn state(&self) -> EngineState {
        self.state
    }

    /// Returns the statistics of the observations collected so far.
    pub const fn statistics(&self) -> &RunningStatistics<f64> {
        &self.statistics
    }

    /// Returns the source observations are drawn from.
    pub const fn source(&self) -> &S {
        &self.source
    }

    /// Returns the last projection of the total sample size, if one was made.
    pub const fn projected_sample_size(&self) -> Option<usize> {
        self.projected_sample_size
    }

    /// Returns how many times the integrand was evaluated since the last fresh start.
    pub fn function_calls(&self) -> usize {
        self.statistics.count() * self.source.calls_per_observation()
    }

    /// Returns the half-width of the confidence interval at the configured level.
    pub fn half_width(&self) -> Option<f64> {
        self.statistics
            .half_width(self.criterion.confidence_level())
    }

    /// Returns whether the collected observations meet the precision target.
    pub fn criterion_satisfied(&self) -> bool {
        match (self.half_width(), self.statistics.average()) {
            (Some(half_width), Some(mean)) => self.criterion.target().is_met(half_width, mean),
            _ => false,
        }
    }

    /// Start from scratch and draw only the pilot sample.
    ///
    /// Returns [`EngineState::PilotComplete`] unless the pilot alone already settles the
    /// evaluation. Use [`resume`](Self::resume) to continue from here.
    pub fn run_initial_sample(&mut self) -> Result<EngineState> {
        self.start_fresh();
        self.run_pilot()?;
        Ok(self.settle_pilot())
    }

    /// Start from scratch and sample until the stopping criterion is met or the maximum sample
    /// size is reached.
    pub fn evaluate(&mut self) -> Result<Report> {
        self.evaluate_with_callback(&SinkCallback {})
    }

    /// Same as [`evaluate`](Self::evaluate), but reports to `callback` after the pilot and after
    /// the main phase.
    pub fn evaluate_with_callback(&mut self, callback: &impl Callback) -> Result<Report> {
        info!(
            "starting evaluation: target {}, confidence {}, pilot {}, max {}",
            self.criterion.target(),
            self.criterion.confidence_level(),
            self.criterion.initial_sample_size(),
            self.criterion.max_sample_size()
        );

        self.start_fresh();
        self.run_pilot()?;
        let state = self.settle_pilot();
        callback.print(&self.report());

        if state == EngineState::PilotComplete {
            self.run_main()?;
            callback.print(&self.report());
        }

        Ok(self.report())
    }

    /// Continue sampling from the current statistics, without resetting them, after raising the
    /// maximum sample size by `extra`.
    ///
    /// Only allowed once a pilot sample is complete; the stream is never rewound.
    pub fn resume(&mut self, extra: usize) -> Result<Report> {
        self.resume_with_callback(extra, &SinkCallback {})
    }

    /// Same as [`resume`](Self::resume), but reports to `callback` when done.
    pub fn resume_with_callback(
        &mut self,
        extra: usize,
        callback: &impl Callback,
    ) -> Result<Report> {
        match self.state {
            EngineState::PilotComplete
            | EngineState::Converged
            | EngineState::MaxSamplesExceeded => {}
            state => {
                return Err(Error::InvalidState {
                    operation: "resume",
                    state,
                })
            }
        }

        self.criterion.extend_max_sample_size(extra);
        info!(
            "resuming at N={} with maximum sample size {}",
            self.statistics.count(),
            self.criterion.max_sample_size()
        );

        self.run_main()?;
        let report = self.report();
        callback.print(&report);

        Ok(report)
    }

    /// Returns a summary of the current state and estimates.
    pub fn report(&self) -> Report {
        Report {
            state: self.state,
            converged: self.state == EngineState::Converged,
            count: self.statistics.count(),
            function_calls: self.function_calls(),
            mean: self.statistics.average(),
            std_dev: self.statistics.std_dev(),
            std_error: self.statistics.standard_error(),
            half_width: self.half_width(),
            confidence_level: self.criterion.confidence_level(),
            target: self.criterion.target(),
            initial_sample_size: self.criterion.initial_sample_size(),
            max_sample_size: self.criterion.max_sample_size(),
            projected_sample_size: self.projected_sample_size,
            antithetic: self.source.calls_per_observation() > 1,
            reset_stream_on_evaluate: self.reset_stream_on_evaluate,
        }
    }

    fn start_fresh(&mut self) {
        self.statistics.reset();
        self.projected_sample_size = None;
        self.state = EngineState::NotStarted;

        if self.reset_stream_on_evaluate {
            trace!("rewinding random number streams");
            self.source.reset_streams();
        }
    }

    fn collect_one(&mut self) -> Result<()> {
        let value = self.source.observe();
        self.statistics.collect(value)
    }

    fn run_pilot(&mut self) -> Result<()> {
        self.state = EngineState::PilotRunning;

        for _ in 0..self.criterion.initial_sample_size() {
            self.collect_one()?;
        }

        debug!(
            "pilot finished: N={} E={:?} half-width={:?}",
            self.statistics.count(),
            self.statistics.average(),
            self.half_width()
        );

        Ok(())
    }

    fn settle_pilot(&mut self) -> EngineState {
        self.state = if self.criterion_satisfied() {
            EngineState::Converged
        } else if self.statistics.count() >= self.criterion.max_sample_size() {
            EngineState::MaxSamplesExceeded
        } else {
            EngineState::PilotComplete
        };

        if self.state.is_terminal() {
            self.log_outcome();
        }

        self.state
    }

    fn run_main(&mut self) -> Result<()> {
        let max = self.criterion.max_sample_size();
        self.state = EngineState::MainRunning;

        while !self.criterion_satisfied() && self.statistics.count() < max {
            let count = self.statistics.count();
            let projected = self.project_sample_size();
            self.projected_sample_size = Some(projected);

            // every batch draws at least one observation and never crosses the ceiling
            let batch_end = projected.max(count + 1).min(max);
            debug!(
                "projected sample size {}, sampling up to N={}",
                projected, batch_end
            );

            while self.statistics.count() < batch_end {
                self.collect_one()?;

                if self.criterion_satisfied() {
                    break;
                }
            }
        }

        self.state = if self.criterion_satisfied() {
            EngineState::Converged
        } else {
            EngineState::MaxSamplesExceeded
        };
        self.log_outcome();

        Ok(())
    }

    fn log_outcome(&self) {
        if self.state == EngineState::Converged {
            info!(
                "converged after N={} observations: E={:?} \u{b1} {:?}",
                self.statistics.count(),
                self.statistics.average(),
                self.half_width()
            );
        } else {
            warn!(
                "maximum sample size {} reached without convergence: half-width {:?}",
                self.criterion.max_sample_size(),
                self.half_width()
            );
        }
    }

    /// Extrapolate the total sample size needed, capped at the maximum sample size. Falls back
    /// to the maximum when the target half-width is zero, as for a relative target around a
    /// vanishing mean.
    fn project_sample_size(&self) -> usize {
        let max = self.criterion.max_sample_size();

        let (half_width, mean) = match (self.half_width(), self.statistics.average()) {
            (Some(half_width), Some(mean)) => (half_width, mean),
            _ => return max,
        };

        let target = self.criterion.target().target_half_width(mean);
        let ratio = half_width / target;
        let projected = self.statistics.count() as f64 * ratio * ratio;

        if target > 0.0 && projected.is_finite() && projected < max as f64 {
            projected.ceil() as usize
        } else {
            max
        }
    }
}
