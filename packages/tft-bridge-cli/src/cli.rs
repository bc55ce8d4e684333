//! Command line definition

use alloy::primitives::Address;
use clap::{Args, Parser, Subcommand};
use std::convert::Infallible;
use std::path::PathBuf;
use tft_bridge::redact::Redacted;
use tft_bridge::withdraw::DEFAULT_WITHDRAW_NETWORK;

/// Hardhat output for `contracts/tokenV1.sol:TFT`
pub const DEFAULT_ARTIFACT: &str = "artifacts/contracts/tokenV1.sol/TFT.json";

#[derive(Debug, Parser)]
#[command(name = "tft-bridge", version)]
#[command(about = "Deploy and operate the TFT bridge token on EVM chains", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Deploy the TFT token contract
    Deploy(DeployArgs),

    /// Burn TFT on the EVM chain and pay out to a Stellar account
    Withdraw(WithdrawArgs),

    /// Show the TFT balance of an account
    Balance(BalanceArgs),

    /// Follow an account's TFT balance until interrupted
    WatchBalance(WatchBalanceArgs),

    /// Encode an EVM address as a deposit memo, or decode a memo
    Memo(MemoArgs),

    /// Show what to send on Stellar to deposit to an EVM address
    DepositInfo(DepositInfoArgs),

    /// Check that a Stellar account exists and trusts TFT
    CheckDestination(CheckDestinationArgs),
}

/// Connection to the EVM chain, shared by every contract command
#[derive(Debug, Args)]
pub struct ChainArgs {
    /// JSON-RPC endpoint
    #[arg(value_name = "PROVIDER_URL")]
    pub provider_url: String,

    /// Expected chain id (mainnet: 1, sepolia: 11155111, bsc: 56, bsc testnet: 97)
    #[arg(value_name = "NETWORK_ID")]
    pub network_id: u64,
}

/// Stellar account lookup settings; fall back to the environment
#[derive(Debug, Args)]
pub struct HorizonArgs {
    /// Horizon base URL [env: STELLAR_HORIZON_URL]
    #[arg(long)]
    pub horizon_url: Option<String>,

    /// Issuer of the TFT asset [env: TFT_ASSET_ISSUER]
    #[arg(long)]
    pub asset_issuer: Option<String>,
}

#[derive(Debug, Args)]
pub struct DeployArgs {
    #[arg(value_name = "PRIVATE_KEY", value_parser = parse_private_key)]
    pub private_key: Redacted<String>,

    #[command(flatten)]
    pub chain: ChainArgs,

    /// Compiled contract artifact
    #[arg(long, default_value = DEFAULT_ARTIFACT)]
    pub artifact: PathBuf,
}

#[derive(Debug, Args)]
pub struct WithdrawArgs {
    /// Deployed TFT token contract
    #[arg(value_name = "TOKEN_ADDRESS")]
    pub token: Address,

    #[arg(value_name = "PRIVATE_KEY", value_parser = parse_private_key)]
    pub private_key: Redacted<String>,

    #[command(flatten)]
    pub chain: ChainArgs,

    /// Stellar account receiving the payout
    #[arg(value_name = "STELLAR_ADDRESS")]
    pub stellar_address: String,

    /// Amount in TFT, up to 7 decimals
    #[arg(value_name = "AMOUNT")]
    pub amount: String,

    /// Network string recorded in the Withdraw event
    #[arg(long, default_value = DEFAULT_WITHDRAW_NETWORK)]
    pub network: String,

    /// Check the destination on Horizon before sending
    #[arg(long)]
    pub check_destination: bool,

    #[command(flatten)]
    pub horizon: HorizonArgs,
}

#[derive(Debug, Args)]
pub struct BalanceArgs {
    #[arg(value_name = "TOKEN_ADDRESS")]
    pub token: Address,

    #[command(flatten)]
    pub chain: ChainArgs,

    #[arg(value_name = "ACCOUNT")]
    pub account: Address,
}

#[derive(Debug, Args)]
pub struct WatchBalanceArgs {
    #[command(flatten)]
    pub balance: BalanceArgs,

    /// Poll interval in milliseconds [env: BALANCE_POLL_INTERVAL_MS, default 12000]
    #[arg(long)]
    pub interval_ms: Option<u64>,
}

#[derive(Debug, Args)]
pub struct MemoArgs {
    /// EVM address, or a memo with --decode
    #[arg(value_name = "VALUE")]
    pub value: String,

    /// Decode a memo back to the EVM address
    #[arg(long)]
    pub decode: bool,
}

#[derive(Debug, Args)]
pub struct DepositInfoArgs {
    /// Bridge account on Stellar
    #[arg(value_name = "BRIDGE_ADDRESS")]
    pub bridge_address: String,

    /// EVM address receiving the minted TFT
    #[arg(value_name = "EVM_ADDRESS")]
    pub evm_address: Address,

    /// Confirm that a deposit without the memo is lost
    #[arg(long)]
    pub accept_memo_warning: bool,
}

#[derive(Debug, Args)]
pub struct CheckDestinationArgs {
    #[arg(value_name = "STELLAR_ADDRESS")]
    pub stellar_address: String,

    #[command(flatten)]
    pub horizon: HorizonArgs,
}

/// Wrap the key before clap stores it. Validation happens when the signer is
/// built, since clap echoes rejected values in its errors.
fn parse_private_key(s: &str) -> Result<Redacted<String>, Infallible> {
    Ok(Redacted::new(s.to_string()))
}
