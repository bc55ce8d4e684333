//! `tft-bridge deploy`

use alloy::primitives::utils::format_ether;
use eyre::{Result, WrapErr};
use tft_bridge::evm::{artifact_bytecode, deploy_contract};
use tracing::info;

use crate::cli::DeployArgs;

pub async fn run(args: DeployArgs) -> Result<()> {
    info!(
        provider_url = %args.chain.provider_url,
        network_id = args.chain.network_id,
        artifact = %args.artifact.display(),
        "Deploying TFT token"
    );

    let json = std::fs::read_to_string(&args.artifact)
        .wrap_err_with(|| format!("Failed to read artifact {}", args.artifact.display()))?;
    let bytecode = artifact_bytecode(&json)?;

    let deployed = deploy_contract(
        &args.chain.provider_url,
        args.chain.network_id,
        args.private_key.expose(),
        bytecode,
    )
    .await?;

    println!("Wallet balance: {}", format_ether(deployed.deployer_balance));
    println!("Token deployed to: {}", deployed.address);
    println!("Transaction: {}", deployed.tx_hash);
    Ok(())
}
