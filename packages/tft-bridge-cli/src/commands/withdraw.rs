//! `tft-bridge withdraw`

use alloy::primitives::utils::format_ether;
use eyre::{eyre, Result};
use tft_bridge::amount::{format_balance, parse_amount};
use tft_bridge::evm::client::withdraw_events;
use tft_bridge::evm::TokenClient;
use tft_bridge::withdraw::{check_destination_format, validate_amount, validate_destination};
use tracing::info;

use super::horizon_settings;
use crate::cli::WithdrawArgs;

pub async fn run(args: WithdrawArgs) -> Result<()> {
    // offline checks, before touching the chain
    let destination = check_destination_format(&args.stellar_address)?;
    let requested = parse_amount(&args.amount)?;

    let client = TokenClient::connect(&args.chain.provider_url, args.token, args.chain.network_id)
        .await?
        .with_signer(args.private_key.expose())?
        .with_network(args.network.clone());
    let signer = client
        .signer_address()
        .ok_or_else(|| eyre!("signer not configured"))?;

    let (native, balance) = tokio::try_join!(client.signer_native_balance(), client.balance_of(signer))?;
    println!("Network: chain {}", client.chain_id());
    println!("Signer: {}", signer);
    println!("Wallet balance: {}", format_ether(native));
    println!("TFT balance: {}", format_balance(balance));

    let amount = validate_amount(&requested, balance)?;

    if args.check_destination {
        let (horizon, asset) = horizon_settings(&args.horizon)?;
        validate_destination(destination, &horizon, &asset).await?;
        info!(destination, asset = %asset.code, "Destination verified");
    }

    let receipt = client.withdraw(amount.raw(), destination).await?;
    println!("Transaction: {}", receipt.transaction_hash);

    for event in withdraw_events(&receipt) {
        println!(
            "Withdraw: {} TFT from {} to {} on {}",
            format_balance(event.tokens),
            event.receiver,
            event.blockchain_address,
            event.network
        );
    }

    let remaining = client.balance_of(signer).await?;
    println!("TFT balance: {}", format_balance(remaining));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;
    use tft_bridge::error::{AddressError, AmountError};

    const KEY: &str = "0xac0974bec39a17e36ba4a6b4d238ff944bacb478cbed5efcae784d7bf4f2ff80";
    const TOKEN: &str = "0x5FbDB2315678afecb367f032d93F642f64180aa3";

    // port 1 is never listened on; these must fail before any RPC call
    fn withdraw_args(destination: &str, amount: &str) -> WithdrawArgs {
        let cli = Cli::try_parse_from([
            "tft-bridge",
            "withdraw",
            TOKEN,
            KEY,
            "http://127.0.0.1:1",
            "97",
            destination,
            amount,
        ])
        .unwrap();
        match cli.command {
            Commands::Withdraw(args) => args,
            _ => panic!("expected withdraw"),
        }
    }

    #[tokio::test]
    async fn test_blank_destination_rejected() {
        for destination in ["", "   "] {
            let err = run(withdraw_args(destination, "1")).await.unwrap_err();
            assert_eq!(
                err.downcast_ref::<AddressError>(),
                Some(&AddressError::EmptyAddress)
            );
        }
    }

    #[tokio::test]
    async fn test_malformed_amount_rejected() {
        let err = run(withdraw_args("GDEST", "lots")).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AmountError>(),
            Some(AmountError::Malformed(_))
        ));
    }
}
