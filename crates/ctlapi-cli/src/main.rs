//! ctlapi CLI main entry point

use clap::Parser;
use ctlapi_cli::{
    cli::{Cli, Commands},
    commands::CallCommand,
    error::CliResult,
    utils::{init_tracing, load_client_config, ColoredOutput},
};
use tracing::{debug, info};

#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(()) => 0,
        Err(e) => {
            eprintln!("{} {}", ColoredOutput::error("Error:"), e);
            1
        }
    };

    std::process::exit(exit_code);
}

async fn run() -> CliResult<()> {
    let cli = Cli::parse();

    init_tracing(cli.verbose)?;

    if cli.no_color {
        colored::control::set_override(false);
    }

    info!("ctlapi v{}", env!("CARGO_PKG_VERSION"));

    let config = load_client_config(cli.config.as_deref(), cli.host.clone(), cli.port)?;
    debug!(
        "Using {}{}",
        ColoredOutput::highlight(&config.base_url()),
        config.api_prefix()
    );

    match cli.command {
        Commands::Call(args) => CallCommand::run(config, args).await,
    }
}
