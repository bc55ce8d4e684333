//! EVM Chain Support Module
//!
//! Bindings and a client for the TFT token contract on EVM-compatible chains
//! (BSC, Ethereum, ...).
//!
//! ## Submodules
//!
//! - `contracts` - TFT token contract bindings using alloy sol! macro
//! - `client` - read/write token client (balances, withdrawals)
//! - `deploy` - contract deployment from compiled bytecode

pub mod client;
pub mod contracts;
pub mod deploy;

pub use client::TokenClient;
pub use contracts::TFT;
pub use deploy::{artifact_bytecode, deploy_contract, DeployedContract};
