//! Command-line surface of the `harness` binary
//!
//! Argument parsing, config loading and the `run`/`reproduce`/`phases`
//! commands live here so they can be exercised without spawning a process.
//! `main.rs` only installs logging and decides where output goes.

use crate::lifecycle::Phase;
use crate::report::{render_outcome, render_reproducibility, ReportError, ReportFormat};
use crate::reproducibility::check_reproducibility;
use crate::runner::{ExperimentRunner, RunnerConfig, RunnerError};
use clap::{Parser, Subcommand};
use experiment::{
    Experiment, ExperimentConfig, ExperimentContext, ExperimentError, ExperimentResult,
    TemplateExperiment,
};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(name = "harness")]
#[command(about = "Run a research experiment through setup, run, collect and analyze")]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// The requested subcommand, or `run` with defaults when none was given
    pub fn command_or_default(self) -> Commands {
        self.command.unwrap_or_default()
    }

    pub fn runner_config(&self) -> RunnerConfig {
        RunnerConfig {
            verbose: self.verbose,
        }
    }
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Commands {
    /// Run the experiment once (default)
    Run {
        /// Experiment config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the configured seed
        #[arg(long)]
        seed: Option<u64>,
        /// Report format: text, json or csv
        #[arg(short, long, default_value = "text")]
        format: ReportFormat,
        /// Write the report to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run the experiment twice and compare metrics
    Reproduce {
        /// Experiment config file (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Override the configured seed
        #[arg(long)]
        seed: Option<u64>,
        /// Report format: text, json or csv
        #[arg(short, long, default_value = "text")]
        format: ReportFormat,
    },
    /// List the lifecycle phases in order
    Phases,
}

impl Default for Commands {
    fn default() -> Self {
        Commands::Run {
            config: None,
            seed: None,
            format: ReportFormat::default(),
            output: None,
        }
    }
}

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Config(#[from] ExperimentError),

    #[error("Experiment failed: {0}")]
    Runner(#[from] RunnerError),

    #[error("Report error: {0}")]
    Report(#[from] ReportError),

    #[error("{differences} metric(s) differ between runs")]
    NotReproducible {
        differences: usize,
        /// The rendered reproducibility report
        report: String,
    },
}

pub type CliResult<T> = Result<T, CliError>;

/// Load the experiment config from `path` (or defaults) and apply CLI overrides.
///
/// Flags win over file values.
pub fn load_config(path: Option<&Path>, seed: Option<u64>) -> ExperimentResult<ExperimentConfig> {
    let mut config = match path {
        Some(path) => ExperimentConfig::from_file(path)?,
        None => ExperimentConfig::default(),
    };

    if let Some(seed) = seed {
        config.seed = seed;
    }
    config.validate()?;

    info!(
        name = %config.name,
        seed = config.seed,
        method = %config.metadata.method,
        "Configuration loaded"
    );
    Ok(config)
}

/// The experiment the CLI drives: the template, labelled with the configured metadata
pub fn new_experiment(config: &ExperimentConfig) -> TemplateExperiment {
    TemplateExperiment::with_metadata(config.metadata.clone())
}

/// Run the lifecycle once and render the run report
pub fn run_once(
    config: ExperimentConfig,
    runner_config: RunnerConfig,
    format: ReportFormat,
) -> CliResult<String> {
    let mut experiment = new_experiment(&config);
    let ctx = ExperimentContext::new(config);
    let mut runner = ExperimentRunner::new(runner_config);

    let outcome = runner.run(&mut experiment, &ctx).map_err(|e| {
        error!("Experiment failed: {}", e);
        e
    })?;

    Ok(render_outcome(&outcome, format)?)
}

/// Run two experiments built by `factory` and render the comparison.
///
/// A mismatch is an error that still carries the rendered report.
pub fn reproduce<E, F>(
    factory: F,
    ctx: &ExperimentContext,
    runner_config: RunnerConfig,
    format: ReportFormat,
) -> CliResult<String>
where
    E: Experiment,
    F: FnMut() -> E,
{
    let report = check_reproducibility(factory, ctx, runner_config)?;
    let rendered = render_reproducibility(&report, format)?;

    if !report.reproducible {
        warn!(
            differences = report.differences.len(),
            "Metrics differ between runs"
        );
        return Err(CliError::NotReproducible {
            differences: report.differences.len(),
            report: rendered,
        });
    }

    Ok(rendered)
}

/// Numbered list of the lifecycle phases
pub fn phase_listing() -> String {
    let mut output = String::from("Lifecycle phases:\n");
    for (i, phase) in Phase::ALL.iter().enumerate() {
        output.push_str(&format!(
            "  {}. {:<8} {}\n",
            i + 1,
            phase.to_string(),
            phase.description()
        ));
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use experiment::{Analysis, ExperimentMetadata, Metrics};
    use std::io::Write;

    /// Reports how many experiments the factory had built before it
    struct DriftingExperiment {
        generation: f64,
    }

    impl Experiment for DriftingExperiment {
        fn metadata(&self) -> ExperimentMetadata {
            ExperimentMetadata::default()
        }

        fn setup(&mut self, _ctx: &ExperimentContext) -> ExperimentResult<()> {
            Ok(())
        }

        fn run_experiment(&mut self, _ctx: &ExperimentContext) -> ExperimentResult<()> {
            Ok(())
        }

        fn collect_metrics(&mut self, _ctx: &ExperimentContext) -> ExperimentResult<Metrics> {
            Ok(Metrics::new().with("generation", self.generation))
        }

        fn analyze_results(
            &mut self,
            _ctx: &ExperimentContext,
            _metrics: &Metrics,
        ) -> ExperimentResult<Analysis> {
            Ok(Analysis::default())
        }
    }

    #[test]
    fn test_no_subcommand_runs_with_defaults() {
        let cli = Cli::try_parse_from(["harness"]).unwrap();
        assert!(!cli.verbose);
        assert_eq!(cli.command_or_default(), Commands::default());

        let cli = Cli::try_parse_from(["harness", "--verbose"]).unwrap();
        assert!(cli.runner_config().verbose);
        assert!(matches!(
            cli.command_or_default(),
            Commands::Run {
                config: None,
                seed: None,
                format: ReportFormat::Text,
                output: None,
            }
        ));
    }

    #[test]
    fn test_parses_subcommands() {
        let cli =
            Cli::try_parse_from(["harness", "reproduce", "--seed", "9", "-f", "json"]).unwrap();
        assert_eq!(
            cli.command_or_default(),
            Commands::Reproduce {
                config: None,
                seed: Some(9),
                format: ReportFormat::Json,
            }
        );

        let cli = Cli::try_parse_from(["harness", "phases"]).unwrap();
        assert_eq!(cli.command_or_default(), Commands::Phases);

        assert!(Cli::try_parse_from(["harness", "run", "--format", "yaml"]).is_err());
    }

    #[test]
    fn test_seed_flag_overrides_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"seeded\"\nseed = 5").unwrap();

        let from_file = load_config(Some(file.path()), None).unwrap();
        assert_eq!(from_file.name, "seeded");
        assert_eq!(from_file.seed, 5);

        let overridden = load_config(Some(file.path()), Some(99)).unwrap();
        assert_eq!(overridden.name, "seeded");
        assert_eq!(overridden.seed, 99);

        assert_eq!(load_config(None, Some(7)).unwrap().seed, 7);
    }

    #[test]
    fn test_load_config_rejects_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "name = \"\"").unwrap();
        assert!(load_config(Some(file.path()), Some(1)).is_err());

        let missing = Path::new("/nonexistent/experiment.toml");
        assert!(matches!(
            load_config(Some(missing), None),
            Err(ExperimentError::Io(_))
        ));
    }

    #[test]
    fn test_run_once_renders_report() {
        let config = load_config(None, Some(3)).unwrap();
        let report = run_once(config, RunnerConfig::default(), ReportFormat::Csv).unwrap();
        assert!(report.starts_with("phase,elapsed_ms\nsetup,"));
        assert!(report.ends_with("metric,value\n"));
    }

    #[test]
    fn test_reproduce_template_succeeds() {
        let ctx = ExperimentContext::default();
        let report = reproduce(
            || new_experiment(ctx.config()),
            &ctx,
            RunnerConfig::default(),
            ReportFormat::Text,
        )
        .unwrap();
        assert!(report.contains("✓ Reproducible"));
    }

    #[test]
    fn test_reproduce_errors_when_metrics_differ() {
        let ctx = ExperimentContext::default();
        let mut built = 0.0;
        let factory = || {
            built += 1.0;
            DriftingExperiment { generation: built }
        };

        let err = reproduce(factory, &ctx, RunnerConfig::default(), ReportFormat::Text)
            .unwrap_err();

        match err {
            CliError::NotReproducible {
                differences,
                report,
            } => {
                assert_eq!(differences, 1);
                assert!(report.contains("✗ Not reproducible"));
                assert!(report.contains("generation: 1 vs 2"));
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_phase_listing_is_ordered() {
        let listing = phase_listing();
        let lines: Vec<&str> = listing.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[1].starts_with("  1. setup"));
        assert!(lines[4].starts_with("  4. analyze"));
    }
}
