//! Experiment runner
//!
//! Drives an [`Experiment`] through its four lifecycle phases:
//! 1. Setup
//! 2. Run
//! 3. Collect metrics
//! 4. Analyze the collected metrics
//!
//! A failing phase stops the run; the phases after it are never invoked.

use crate::lifecycle::{Lifecycle, LifecycleError, Phase, RunState};
use chrono::{DateTime, Utc};
use experiment::{
    Analysis, Experiment, ExperimentContext, ExperimentError, ExperimentMetadata,
    ExperimentResult, Metrics,
};
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, error, info, info_span};
use uuid::Uuid;

/// Errors that can occur while running an experiment
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Phase {phase} failed: {source}")]
    PhaseFailed {
        phase: Phase,
        #[source]
        source: ExperimentError,
    },
    #[error("Lifecycle error: {0}")]
    Lifecycle(#[from] LifecycleError),
    #[error("Configuration error: {0}")]
    Config(ExperimentError),
}

impl RunnerError {
    /// The phase that failed, if the error came from a lifecycle hook
    pub fn failed_phase(&self) -> Option<Phase> {
        match self {
            RunnerError::PhaseFailed { phase, .. } => Some(*phase),
            _ => None,
        }
    }
}

pub type RunnerResult<T> = Result<T, RunnerError>;

/// Configuration for the runner
#[derive(Debug, Clone, Default)]
pub struct RunnerConfig {
    /// Log every phase transition at info level
    pub verbose: bool,
}

/// Wall-clock time spent in one phase
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseTiming {
    pub phase: Phase,
    pub elapsed_ms: f64,
}

/// Result of a completed run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunOutcome {
    pub run_id: Uuid,
    pub experiment: String,
    pub seed: u64,
    pub started_at: DateTime<Utc>,
    pub metadata: ExperimentMetadata,
    pub metrics: Metrics,
    pub analysis: Analysis,
    pub timings: Vec<PhaseTiming>,
    pub final_state: RunState,
}

/// Runs experiments through the lifecycle
pub struct ExperimentRunner {
    config: RunnerConfig,
    lifecycle: Lifecycle,
    timings: Vec<PhaseTiming>,
}

impl Default for ExperimentRunner {
    fn default() -> Self {
        Self::new(RunnerConfig::default())
    }
}

impl ExperimentRunner {
    pub fn new(config: RunnerConfig) -> Self {
        Self {
            config,
            lifecycle: Lifecycle::new(),
            timings: Vec::new(),
        }
    }

    /// State of the most recent run
    pub fn state(&self) -> &RunState {
        self.lifecycle.state()
    }

    /// Timings recorded by the most recent run
    pub fn timings(&self) -> &[PhaseTiming] {
        &self.timings
    }

    /// Run all four phases against `experiment`.
    ///
    /// The runner can be reused; each call starts from a fresh lifecycle.
    pub fn run(
        &mut self,
        experiment: &mut dyn Experiment,
        ctx: &ExperimentContext,
    ) -> RunnerResult<RunOutcome> {
        self.lifecycle = Lifecycle::new();
        self.timings.clear();

        ctx.config().validate().map_err(RunnerError::Config)?;

        let run_id = Uuid::new_v4();
        let started_at = Utc::now();
        let metadata = experiment.metadata();

        let span = info_span!("experiment", name = %ctx.config().name, %run_id);
        let _guard = span.enter();
        info!(seed = ctx.seed(), "Starting experiment");

        self.execute(Phase::Setup, |e| e.setup(ctx), experiment)?;
        self.execute(Phase::Run, |e| e.run_experiment(ctx), experiment)?;
        let metrics = self.execute(Phase::Collect, |e| e.collect_metrics(ctx), experiment)?;
        debug!(count = metrics.len(), "Metrics collected");
        let analysis = self.execute(
            Phase::Analyze,
            |e| e.analyze_results(ctx, &metrics),
            experiment,
        )?;

        self.lifecycle.complete()?;
        info!(verdict = %analysis.verdict, "Experiment completed");

        Ok(RunOutcome {
            run_id,
            experiment: ctx.config().name.clone(),
            seed: ctx.seed(),
            started_at,
            metadata,
            metrics,
            analysis,
            timings: self.timings.clone(),
            final_state: self.lifecycle.state().clone(),
        })
    }

    /// Enter `phase`, invoke its hook and record how long it took
    fn execute<T>(
        &mut self,
        phase: Phase,
        hook: impl FnOnce(&mut dyn Experiment) -> ExperimentResult<T>,
        experiment: &mut dyn Experiment,
    ) -> RunnerResult<T> {
        self.lifecycle.begin(phase)?;

        let span = info_span!("phase", %phase);
        let _guard = span.enter();
        if self.config.verbose {
            info!("Entering phase {}", phase);
        }

        let start = Instant::now();
        let result = hook(experiment);
        let elapsed_ms = start.elapsed().as_secs_f64() * 1000.0;
        self.timings.push(PhaseTiming { phase, elapsed_ms });

        match result {
            Ok(value) => {
                debug!(elapsed_ms, "Phase {} finished", phase);
                Ok(value)
            }
            Err(source) => {
                error!("Phase {} failed: {}", phase, source);
                self.lifecycle.fail(source.to_string())?;
                Err(RunnerError::PhaseFailed { phase, source })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use experiment::{ExperimentConfig, TemplateExperiment, Verdict};

    struct FailingExperiment {
        fail_at: Phase,
        calls: Vec<Phase>,
    }

    impl FailingExperiment {
        fn new(fail_at: Phase) -> Self {
            Self {
                fail_at,
                calls: Vec::new(),
            }
        }

        fn step(&mut self, phase: Phase) -> ExperimentResult<()> {
            self.calls.push(phase);
            if phase == self.fail_at {
                return Err(ExperimentError::execution(format!("{} exploded", phase)));
            }
            Ok(())
        }
    }

    impl Experiment for FailingExperiment {
        fn metadata(&self) -> ExperimentMetadata {
            ExperimentMetadata::default()
        }

        fn setup(&mut self, _ctx: &ExperimentContext) -> ExperimentResult<()> {
            self.step(Phase::Setup)
        }

        fn run_experiment(&mut self, _ctx: &ExperimentContext) -> ExperimentResult<()> {
            self.step(Phase::Run)
        }

        fn collect_metrics(&mut self, _ctx: &ExperimentContext) -> ExperimentResult<Metrics> {
            self.step(Phase::Collect)?;
            Ok(Metrics::new().with("value", 1.0))
        }

        fn analyze_results(
            &mut self,
            _ctx: &ExperimentContext,
            _metrics: &Metrics,
        ) -> ExperimentResult<Analysis> {
            self.step(Phase::Analyze)?;
            Ok(Analysis::default())
        }
    }

    #[test]
    fn test_template_run_completes() {
        let mut runner = ExperimentRunner::default();
        let mut experiment = TemplateExperiment::new();
        let ctx = ExperimentContext::default();

        let outcome = runner.run(&mut experiment, &ctx).unwrap();

        assert_eq!(outcome.final_state, RunState::Completed);
        assert_eq!(outcome.experiment, "experiment-template");
        assert!(outcome.metrics.is_empty());
        assert_eq!(outcome.analysis.verdict, Verdict::Inconclusive);
        let phases: Vec<Phase> = outcome.timings.iter().map(|t| t.phase).collect();
        assert_eq!(phases, Phase::ALL.to_vec());
        assert_eq!(
            experiment.calls(),
            &["setup", "run_experiment", "collect_metrics", "analyze_results"]
        );
    }

    #[test]
    fn test_failure_skips_later_phases() {
        for fail_at in Phase::ALL {
            let mut runner = ExperimentRunner::default();
            let mut experiment = FailingExperiment::new(fail_at);
            let ctx = ExperimentContext::default();

            let err = runner.run(&mut experiment, &ctx).unwrap_err();

            assert_eq!(err.failed_phase(), Some(fail_at));
            assert_eq!(experiment.calls.last(), Some(&fail_at));
            assert!(experiment.calls.iter().all(|p| *p <= fail_at));
            assert!(matches!(
                runner.state(),
                RunState::Failed { phase, .. } if *phase == fail_at
            ));
        }
    }

    #[test]
    fn test_invalid_config_runs_nothing() {
        let mut runner = ExperimentRunner::default();
        let mut experiment = TemplateExperiment::new();
        let ctx = ExperimentContext::new(ExperimentConfig::default().with_name(""));

        let err = runner.run(&mut experiment, &ctx).unwrap_err();
        assert!(matches!(err, RunnerError::Config(_)));
        assert!(experiment.calls().is_empty());
        assert_eq!(runner.state(), &RunState::Pending);
    }

    #[test]
    fn test_rejected_config_clears_previous_run() {
        let mut runner = ExperimentRunner::default();
        runner
            .run(&mut TemplateExperiment::new(), &ExperimentContext::default())
            .unwrap();
        assert_eq!(runner.state(), &RunState::Completed);
        assert_eq!(runner.timings().len(), 4);

        let invalid = ExperimentContext::new(ExperimentConfig::default().with_name(""));
        let err = runner
            .run(&mut TemplateExperiment::new(), &invalid)
            .unwrap_err();

        assert!(matches!(err, RunnerError::Config(_)));
        assert_eq!(runner.state(), &RunState::Pending);
        assert!(runner.timings().is_empty());
    }

    #[test]
    fn test_runner_is_reusable() {
        let mut runner = ExperimentRunner::new(RunnerConfig { verbose: true });
        let ctx = ExperimentContext::default();

        let first = runner.run(&mut TemplateExperiment::new(), &ctx).unwrap();
        let second = runner.run(&mut TemplateExperiment::new(), &ctx).unwrap();

        assert_ne!(first.run_id, second.run_id);
        assert_eq!(runner.timings().len(), 4);
    }
}
