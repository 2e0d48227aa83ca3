use clap::Parser;
use experiment::ExperimentContext;
use harness::cli::{
    load_config, new_experiment, phase_listing, reproduce, run_once, Cli, CliError, Commands,
};
use harness::write_report;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let default_filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_filter)),
        )
        .with_writer(std::io::stderr)
        .init();

    let runner_config = cli.runner_config();

    match cli.command_or_default() {
        Commands::Run {
            config,
            seed,
            format,
            output,
        } => {
            let config = load_config(config.as_deref(), seed)?;
            let report = run_once(config, runner_config, format)?;
            match output {
                Some(path) => write_report(path, &report)?,
                None => print!("{}", report),
            }
        }
        Commands::Reproduce {
            config,
            seed,
            format,
        } => {
            let config = load_config(config.as_deref(), seed)?;
            let ctx = ExperimentContext::new(config);
            match reproduce(
                || new_experiment(ctx.config()),
                &ctx,
                runner_config,
                format,
            ) {
                Ok(report) => print!("{}", report),
                Err(e) => {
                    if let CliError::NotReproducible { report, .. } = &e {
                        print!("{}", report);
                    }
                    return Err(e.into());
                }
            }
        }
        Commands::Phases => {
            print!("{}", phase_listing());
        }
    }

    Ok(())
}
