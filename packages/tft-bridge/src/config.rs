//! Bridge configuration

use alloy::primitives::Address;
use std::env;
use std::time::Duration;

use crate::balance::DEFAULT_POLL_INTERVAL;
use crate::error::ConfigError;
use crate::horizon::{Asset, TFT_ASSET_CODE};
use crate::withdraw::DEFAULT_WITHDRAW_NETWORK;

/// Public Horizon instance used when none is configured
pub const DEFAULT_HORIZON_URL: &str = "https://horizon.stellar.org";

/// Bridge configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Horizon API base URL
    pub horizon_url: String,
    /// Asset destination accounts must trust
    pub asset: Asset,
    /// Stellar account receiving deposits
    pub bridge_address: Option<String>,
    /// Deployed token contract on the EVM chain
    pub contract_address: Option<Address>,
    pub evm_rpc_url: Option<String>,
    pub evm_chain_id: Option<u64>,
    /// Network string passed to the contract's `withdraw`
    pub withdraw_network: String,
    pub balance_poll_interval: Duration,
}

/// Read `name`, treating blank values as unset
fn read_var<F>(lookup: &F, name: &str) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(name)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl BridgeConfig {
    /// Load configuration from the environment, reading `.env` first if present
    pub fn load() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!("Loaded .env from {:?}", path);
        }
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| read_var(&lookup, name);

        let issuer = var("TFT_ASSET_ISSUER").ok_or(ConfigError::Missing("TFT_ASSET_ISSUER"))?;
        let code = Self::asset_code_from_lookup(&lookup);

        let contract_address = var("CONTRACT_ADDRESS")
            .map(|s| {
                s.parse::<Address>().map_err(|e| ConfigError::Invalid {
                    name: "CONTRACT_ADDRESS",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let evm_chain_id = var("EVM_CHAIN_ID")
            .map(|s| {
                s.parse::<u64>().map_err(|e| ConfigError::Invalid {
                    name: "EVM_CHAIN_ID",
                    reason: e.to_string(),
                })
            })
            .transpose()?;

        let balance_poll_interval = Self::poll_interval_from_lookup(&lookup)?;

        Ok(Self {
            horizon_url: var("STELLAR_HORIZON_URL")
                .unwrap_or_else(|| DEFAULT_HORIZON_URL.to_string()),
            asset: Asset::new(code, issuer),
            bridge_address: var("BRIDGE_TFT_ADDRESS"),
            contract_address,
            evm_rpc_url: var("EVM_RPC_URL"),
            evm_chain_id,
            withdraw_network: var("STELLAR_ENV")
                .unwrap_or_else(|| DEFAULT_WITHDRAW_NETWORK.to_string()),
            balance_poll_interval,
        })
    }

    /// `TFT_ASSET_CODE`, defaulting to `TFT`. Needs no other variable.
    pub fn asset_code_from_lookup<F>(lookup: &F) -> String
    where
        F: Fn(&str) -> Option<String>,
    {
        read_var(lookup, "TFT_ASSET_CODE").unwrap_or_else(|| TFT_ASSET_CODE.to_string())
    }

    /// `BALANCE_POLL_INTERVAL_MS`, defaulting to 12 s. Needs no other variable.
    pub fn poll_interval_from_lookup<F>(lookup: &F) -> Result<Duration, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(s) = read_var(lookup, "BALANCE_POLL_INTERVAL_MS") else {
            return Ok(DEFAULT_POLL_INTERVAL);
        };

        let ms = s.parse::<u64>().map_err(|e| ConfigError::Invalid {
            name: "BALANCE_POLL_INTERVAL_MS",
            reason: e.to_string(),
        })?;
        if ms == 0 {
            return Err(ConfigError::Invalid {
                name: "BALANCE_POLL_INTERVAL_MS",
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(Duration::from_millis(ms))
    }
}
