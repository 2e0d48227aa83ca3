pub mod cli;
pub mod lifecycle;
pub mod report;
pub mod reproducibility;
pub mod runner;

pub use cli::{load_config, Cli, CliError, CliResult, Commands};
pub use lifecycle::{Lifecycle, LifecycleError, LifecycleResult, Phase, RunState};
pub use report::{
    render_outcome, render_reproducibility, write_report, ReportError, ReportFormat, ReportResult,
};
pub use reproducibility::{check_reproducibility, ReproducibilityReport};
pub use runner::{
    ExperimentRunner, PhaseTiming, RunOutcome, RunnerConfig, RunnerError, RunnerResult,
};
