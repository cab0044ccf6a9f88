use anyhow::Result;
use clap::Parser;
use tracing::debug;

fn main() -> Result<()> {
    let cli = kubegen::cli::Cli::parse();
    kubegen::logging::init_logging(cli.verbose, cli.quiet)?;

    let request = cli.into_request()?;
    debug!(
        cluster = %request.context.cluster,
        namespace = %request.context.namespace,
        name = %request.context.name,
        templates = request.templates.len(),
        "Starting generation"
    );

    let written = kubegen::generate::run(&request)?;
    debug!(count = written.len(), "Generation finished");

    Ok(())
}
