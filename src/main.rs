// SPDX-License-Identifier: MIT
use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::anyhow;
use clap::Parser;
use tracing::debug;
use tracing_subscriber::EnvFilter;

use employee_db::{Cli, Config, Dispatcher};

fn main() -> ExitCode {
    // Usage errors exit with status 2 and -h with 0, both handled by clap
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> anyhow::Result<()> {
    let config = Config::from_env()?;
    config.validate().map_err(anyhow::Error::msg)?;
    init_tracing(&config)?;
    debug!("Configuration loaded and validated: {:?}", config);

    let request = cli.into_request()?;
    let dispatcher = Dispatcher::new(&config);
    dispatcher.run(&request, &mut std::io::stdout().lock())?;

    Ok(())
}

fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter = EnvFilter::try_new(&config.log_filter)
        .map_err(|e| anyhow!("invalid EMPDB_LOG filter {:?}: {}", config.log_filter, e))?;

    // Logs go to stderr so listings on stdout stay clean
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(std::io::stderr().is_terminal())
        .with_target(true);

    if config.log_json {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}
