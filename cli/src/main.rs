use std::process::ExitCode;

use step2mesh_core::kernel::default_kernel;
use step2mesh_core::{DomainResult, Mesher, MesherConfig, MeshingOptions};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

mod cli;

fn main() -> ExitCode {
    let cli = cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: cli::Cli) -> DomainResult<()> {
    info!(version = step2mesh_core::version(), input = %cli.input.display(), "step2mesh");
    let mut options = MeshingOptions::default();
    if let Some(unit) = cli.unit {
        options = options.with_unit(unit);
    }
    if let Some(json) = &cli.options {
        options.merge(&MeshingOptions::from_json(json)?);
    }

    let config = MesherConfig {
        options,
        output_formats: cli.format,
        output_dir: cli.output_dir,
        export_areas: !cli.no_areas,
    };

    let summary = Mesher::new(config).run_from_input(default_kernel(), &cli.input)?;
    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
