//! Experiment template
//!
//! A starting point for a new experiment. Every hook is a placeholder:
//! setup and run do nothing, collection yields no metrics and analysis is
//! inconclusive. Copy this type, fill in the hooks, and keep the header in
//! [`ExperimentMetadata`] current.

use crate::analysis::Analysis;
use crate::config::ExperimentMetadata;
use crate::error::ExperimentResult;
use crate::experiment::{Experiment, ExperimentContext};
use crate::metrics::Metrics;
use tracing::debug;

#[derive(Debug, Clone, Default)]
pub struct TemplateExperiment {
    metadata: ExperimentMetadata,
    prepared: bool,
    calls: Vec<&'static str>,
}

impl TemplateExperiment {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_metadata(metadata: ExperimentMetadata) -> Self {
        Self {
            metadata,
            ..Self::default()
        }
    }

    pub fn is_prepared(&self) -> bool {
        self.prepared
    }

    /// Hooks invoked so far, in call order.
    pub fn calls(&self) -> &[&'static str] {
        &self.calls
    }
}

impl Experiment for TemplateExperiment {
    fn metadata(&self) -> ExperimentMetadata {
        self.metadata.clone()
    }

    fn setup(&mut self, ctx: &ExperimentContext) -> ExperimentResult<()> {
        self.calls.push("setup");
        if self.prepared {
            debug!("Environment already prepared for {}", ctx.config().name);
            return Ok(());
        }
        self.prepared = true;
        Ok(())
    }

    fn run_experiment(&mut self, _ctx: &ExperimentContext) -> ExperimentResult<()> {
        self.calls.push("run_experiment");
        Ok(())
    }

    fn collect_metrics(&mut self, _ctx: &ExperimentContext) -> ExperimentResult<Metrics> {
        self.calls.push("collect_metrics");
        Ok(Metrics::new())
    }

    fn analyze_results(
        &mut self,
        _ctx: &ExperimentContext,
        _metrics: &Metrics,
    ) -> ExperimentResult<Analysis> {
        self.calls.push("analyze_results");
        Ok(Analysis::default())
    }
}
