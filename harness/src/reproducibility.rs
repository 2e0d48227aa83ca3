//! Reproducibility checks
//!
//! Runs the full lifecycle twice from identical initial conditions and
//! compares the collected metrics.

use crate::runner::{ExperimentRunner, RunOutcome, RunnerConfig, RunnerResult};
use experiment::{Experiment, ExperimentContext, MetricDifference};
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReproducibilityReport {
    pub first: RunOutcome,
    pub second: RunOutcome,
    pub differences: Vec<MetricDifference>,
    pub reproducible: bool,
}

/// Build two fresh experiments with `factory` and run each once with `ctx`.
///
/// A fresh experiment per run keeps state from the first run from leaking
/// into the second.
pub fn check_reproducibility<E, F>(
    mut factory: F,
    ctx: &ExperimentContext,
    config: RunnerConfig,
) -> RunnerResult<ReproducibilityReport>
where
    E: Experiment,
    F: FnMut() -> E,
{
    let mut runner = ExperimentRunner::new(config);

    let mut experiment = factory();
    let first = runner.run(&mut experiment, ctx)?;

    let mut experiment = factory();
    let second = runner.run(&mut experiment, ctx)?;

    let differences = first.metrics.diff(&second.metrics);
    let reproducible = differences.is_empty();

    if reproducible {
        info!(metrics = first.metrics.len(), "Runs reproduced identical metrics");
    } else {
        for difference in &differences {
            warn!("Metric differs between runs: {}", difference);
        }
    }

    Ok(ReproducibilityReport {
        first,
        second,
        differences,
        reproducible,
    })
}
