//! Subcommand implementations

pub mod balance;
pub mod deploy;
pub mod destination;
pub mod memo;
pub mod withdraw;

use eyre::Result;
use std::env;
use tft_bridge::config::{BridgeConfig, DEFAULT_HORIZON_URL};
use tft_bridge::horizon::{Asset, HorizonClient};
use tracing::{info, warn};

use crate::cli::HorizonArgs;

/// Horizon client and asset from flags, falling back to the environment
pub fn horizon_settings(args: &HorizonArgs) -> Result<(HorizonClient, Asset)> {
    horizon_settings_from(args, |name| env::var(name).ok())
}

fn horizon_settings_from<F>(args: &HorizonArgs, lookup: F) -> Result<(HorizonClient, Asset)>
where
    F: Fn(&str) -> Option<String>,
{
    let asset = match &args.asset_issuer {
        Some(issuer) => Asset::new(BridgeConfig::asset_code_from_lookup(&lookup), issuer.clone()),
        None => BridgeConfig::from_lookup(&lookup)?.asset,
    };
    let url = args
        .horizon_url
        .clone()
        .or_else(|| lookup("STELLAR_HORIZON_URL"))
        .unwrap_or_else(|| DEFAULT_HORIZON_URL.to_string());

    Ok((HorizonClient::new(&url)?, asset))
}

/// Resolve on Ctrl+C or SIGTERM
pub async fn wait_for_shutdown_signal() {
    use tokio::signal;

    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        }
        _ = terminate => {
            info!("Received SIGTERM, shutting down");
        }
    }
}
