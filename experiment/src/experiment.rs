//! The experiment lifecycle contract.
//!
//! An experiment is driven through four phases in a fixed order:
//! setup, run, collect, analyze. Each hook returns an [`ExperimentResult`];
//! an error from any hook aborts the phases after it.

use crate::analysis::Analysis;
use crate::config::{ExperimentConfig, ExperimentMetadata};
use crate::error::ExperimentResult;
use crate::metrics::Metrics;
use rand::rngs::StdRng;
use rand::SeedableRng;

/// Initial conditions handed to every lifecycle hook.
#[derive(Debug, Clone, PartialEq)]
pub struct ExperimentContext {
    config: ExperimentConfig,
}

impl ExperimentContext {
    pub fn new(config: ExperimentConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &ExperimentConfig {
        &self.config
    }

    pub fn seed(&self) -> u64 {
        self.config.seed
    }

    pub fn parameter(&self, name: &str) -> Option<f64> {
        self.config.parameter(name)
    }

    /// A fresh RNG seeded from the configured seed. Every call starts the
    /// same sequence.
    pub fn rng(&self) -> StdRng {
        StdRng::seed_from_u64(self.config.seed)
    }
}

impl Default for ExperimentContext {
    fn default() -> Self {
        Self::new(ExperimentConfig::default())
    }
}

pub trait Experiment {
    fn metadata(&self) -> ExperimentMetadata;

    /// Prepare the environment. Must be idempotent.
    fn setup(&mut self, ctx: &ExperimentContext) -> ExperimentResult<()>;

    fn run_experiment(&mut self, ctx: &ExperimentContext) -> ExperimentResult<()>;

    fn collect_metrics(&mut self, ctx: &ExperimentContext) -> ExperimentResult<Metrics>;

    fn analyze_results(
        &mut self,
        ctx: &ExperimentContext,
        metrics: &Metrics,
    ) -> ExperimentResult<Analysis>;
}
