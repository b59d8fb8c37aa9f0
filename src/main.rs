use anyhow::Context;
use std::process::ExitCode;
use tracing::info;

use fluxbit::cli::{self, OptionCollector};
use fluxbit::commands;
use fluxbit::error::FluxError;
use fluxbit::logging;
use fluxbit::state::AppState;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("[error] {e:#}");
            e.downcast_ref::<FluxError>()
                .map(FluxError::exit_code)
                .unwrap_or(ExitCode::FAILURE)
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let (args, options) = cli::parse_from(std::env::args_os()).map_err(FluxError::from)?;

    if args.version {
        println!("Fluxbit v{}", env!("CARGO_PKG_VERSION"));
        return Ok(ExitCode::SUCCESS);
    }

    logging::init_logging(args.verbose, args.quiet);
    if !args.quiet {
        info!("Fluxbit v{}", env!("CARGO_PKG_VERSION"));
    }

    if let Some(dir) = &args.workdir {
        std::env::set_current_dir(dir)
            .map_err(FluxError::from)
            .with_context(|| format!("cannot change working directory to {}", dir.display()))?;
    }

    let collected = OptionCollector::collect(options).map_err(FluxError::from)?;
    let mut state = AppState::new()?;

    if let Some(request) = &collected.help {
        print!("{}", commands::render_help(request, &state)?);
        return Ok(ExitCode::SUCCESS);
    }

    if args.dry_run {
        commands::run_config_check(args.config.as_deref(), collected.tree, &mut state)?;
        return Ok(ExitCode::SUCCESS);
    }

    let topology = commands::prepare(args.config.as_deref(), collected.tree, &mut state)?;
    commands::run(topology, &state).await?;
    Ok(ExitCode::SUCCESS)
}
