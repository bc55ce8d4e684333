//! Stellar account lookups
//!
//! Withdrawals may only target accounts that exist on Stellar and hold a trust
//! line to the bridged asset; otherwise the bridge cannot pay out. The lookup
//! is abstracted behind [`AccountLookup`] so the withdrawal form can be driven
//! by Horizon in production and by fixtures in tests.

use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;
use url::Url;

use crate::error::NetworkError;

/// Asset code used by the bridge
pub const TFT_ASSET_CODE: &str = "TFT";

/// A Stellar credit asset
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Asset {
    pub code: String,
    pub issuer: String,
}

impl Asset {
    pub fn new(code: impl Into<String>, issuer: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            issuer: issuer.into(),
        }
    }

    /// TFT issued by `issuer`
    pub fn tft(issuer: impl Into<String>) -> Self {
        Self::new(TFT_ASSET_CODE, issuer)
    }
}

/// One entry of an account's `balances` array
///
/// Native XLM balances carry neither code nor issuer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustLine {
    pub asset_type: String,
    #[serde(default)]
    pub asset_code: Option<String>,
    #[serde(default)]
    pub asset_issuer: Option<String>,
    #[serde(default)]
    pub balance: String,
}

impl TrustLine {
    /// True if this line is for exactly `asset` (code and issuer)
    pub fn is_for(&self, asset: &Asset) -> bool {
        self.asset_code.as_deref() == Some(asset.code.as_str())
            && self.asset_issuer.as_deref() == Some(asset.issuer.as_str())
    }
}

/// Subset of Horizon's account resource used by the bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_id: String,
    #[serde(default)]
    pub balances: Vec<TrustLine>,
}

impl AccountRecord {
    pub fn has_trust_line(&self, asset: &Asset) -> bool {
        self.balances.iter().any(|line| line.is_for(asset))
    }
}

/// Remote account lookup capability
#[async_trait]
pub trait AccountLookup: Send + Sync {
    /// Load an account by its public key
    async fn load_account(&self, account_id: &str) -> Result<AccountRecord, NetworkError>;
}

/// Horizon REST client
#[derive(Debug, Clone)]
pub struct HorizonClient {
    client: reqwest::Client,
    base_url: Url,
}

impl HorizonClient {
    /// Create a client for the Horizon server at `base_url`
    pub fn new(base_url: &str) -> Result<Self, NetworkError> {
        let base_url = Url::parse(base_url)
            .map_err(|e| NetworkError::Lookup(format!("invalid Horizon URL: {}", e)))?;

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()
            .map_err(|e| NetworkError::Lookup(e.to_string()))?;

        Ok(Self { client, base_url })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    fn account_url(&self, account_id: &str) -> Result<Url, NetworkError> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| NetworkError::Lookup("Horizon URL cannot be a base".to_string()))?
            .pop_if_empty()
            .push("accounts")
            .push(account_id);
        Ok(url)
    }
}

#[async_trait]
impl AccountLookup for HorizonClient {
    async fn load_account(&self, account_id: &str) -> Result<AccountRecord, NetworkError> {
        let url = self.account_url(account_id)?;
        debug!(%url, "Loading Stellar account");

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| NetworkError::Lookup(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => Err(NetworkError::AccountMissing(account_id.to_string())),
            status if !status.is_success() => Err(NetworkError::Lookup(format!(
                "Horizon returned {}",
                status
            ))),
            _ => response
                .json::<AccountRecord>()
                .await
                .map_err(|e| NetworkError::Lookup(format!("invalid account response: {}", e))),
        }
    }
}
