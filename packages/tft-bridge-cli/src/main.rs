//! TFT Bridge CLI
//!
//! Replaces the Hardhat scripts:
//! - scripts/deployProd.js -> tft-bridge deploy
//! - scripts/withdraw.js   -> tft-bridge withdraw
//!
//! and adds inspection helpers (balance, memo, deposit-info,
//! check-destination, watch-balance).

use clap::error::ErrorKind;
use clap::Parser;
use std::process::ExitCode;
use tracing::debug;

mod cli;
mod commands;

use cli::{Cli, Commands};

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitCode::SUCCESS,
                _ => ExitCode::FAILURE,
            };
        }
    };

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("Error: {:?}", report);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> eyre::Result<()> {
    color_eyre::install()?;

    if let Ok(path) = dotenvy::dotenv() {
        // logging is not up yet
        eprintln!("Loaded .env from {:?}", path);
    }
    init_logging(cli.verbose);

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async_main(cli.command))
}

async fn async_main(command: Commands) -> eyre::Result<()> {
    match command {
        Commands::Deploy(args) => commands::deploy::run(args).await,
        Commands::Withdraw(args) => commands::withdraw::run(args).await,
        Commands::Balance(args) => commands::balance::run(args).await,
        Commands::WatchBalance(args) => commands::balance::watch(args).await,
        Commands::Memo(args) => commands::memo::run(args),
        Commands::DepositInfo(args) => commands::memo::deposit_info(args),
        Commands::CheckDestination(args) => commands::destination::run(args).await,
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(false).with_writer(std::io::stderr))
        .with(filter)
        .init();

    debug!(version = env!("CARGO_PKG_VERSION"), "tft-bridge starting");
}
