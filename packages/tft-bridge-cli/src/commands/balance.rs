//! `tft-bridge balance` and `tft-bridge watch-balance`

use eyre::Result;
use std::env;
use std::sync::Arc;
use std::time::Duration;
use tft_bridge::amount::{format_balance, TFT_DECIMALS};
use tft_bridge::balance::BalanceTracker;
use tft_bridge::config::BridgeConfig;
use tft_bridge::error::ConfigError;
use tft_bridge::evm::TokenClient;
use tft_bridge::wallet::WalletSession;
use tokio::sync::mpsc;
use tracing::warn;

use super::wait_for_shutdown_signal;
use crate::cli::{BalanceArgs, WatchBalanceArgs};

pub async fn run(args: BalanceArgs) -> Result<()> {
    let client =
        TokenClient::connect(&args.chain.provider_url, args.token, args.chain.network_id).await?;

    let (info, raw) = tokio::try_join!(client.token_info(), client.balance_of(args.account))?;
    if u32::from(info.decimals) != TFT_DECIMALS {
        warn!(decimals = info.decimals, "Token does not use TFT's 7 decimals");
    }

    println!("{} balance of {}: {}", info.symbol, args.account, format_balance(raw));
    Ok(())
}

fn poll_interval<F>(flag: Option<u64>, lookup: F) -> Result<Duration, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    match flag {
        Some(ms) => Ok(Duration::from_millis(ms.max(1))),
        None => BridgeConfig::poll_interval_from_lookup(&lookup),
    }
}

pub async fn watch(args: WatchBalanceArgs) -> Result<()> {
    let chain_id = args.balance.chain.network_id;
    let account = args.balance.account;
    let interval = poll_interval(args.interval_ms, |name| env::var(name).ok())?;

    let client = Arc::new(
        TokenClient::connect(&args.balance.chain.provider_url, args.balance.token, chain_id)
            .await?,
    );
    let session = Arc::new(WalletSession::new(vec![chain_id]));
    let tracker = Arc::new(BalanceTracker::new(client));
    let mut view = tracker.watch();

    let (shutdown_tx, shutdown_rx) = mpsc::channel::<()>(1);
    let mut task = {
        let tracker = tracker.clone();
        let session = session.clone();
        tokio::spawn(async move { tracker.run(&session, interval, shutdown_rx).await })
    };

    session.connect(account, chain_id)?;

    tokio::spawn(async move {
        wait_for_shutdown_signal().await;
        let _ = shutdown_tx.send(()).await;
    });

    loop {
        tokio::select! {
            result = &mut task => {
                result?;
                break;
            }
            changed = view.changed() => {
                if changed.is_err() {
                    break;
                }
                let line = view.borrow_and_update().display();
                println!("{}", line);
            }
        }
    }

    session.disconnect();
    Ok(())
}
