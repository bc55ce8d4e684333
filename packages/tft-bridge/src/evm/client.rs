//! TFT token client
//!
//! Read access goes through a plain HTTP provider. Writes build a wallet
//! provider per call from the configured private key, so a read-only client
//! never holds key material.

use alloy::{
    network::EthereumWallet,
    primitives::{Address, U256},
    providers::{Provider, ProviderBuilder, RootProvider},
    rpc::types::TransactionReceipt,
    signers::local::PrivateKeySigner,
    transports::http::{Client, Http},
};
use async_trait::async_trait;
use serde::Serialize;
use tracing::{debug, info};
use url::Url;

use crate::balance::BalanceSource;
use crate::error::NetworkError;
use crate::evm::contracts::TFT;
use crate::withdraw::{
    WithdrawDispatcher, WithdrawalReceipt, WithdrawalRequest, DEFAULT_WITHDRAW_NETWORK,
};

/// Decoded `Withdraw` event
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WithdrawEvent {
    pub receiver: Address,
    pub tokens: U256,
    pub blockchain_address: String,
    pub network: String,
}

/// Extract the `Withdraw` events emitted in a transaction
pub fn withdraw_events(receipt: &TransactionReceipt) -> Vec<WithdrawEvent> {
    receipt
        .inner
        .logs()
        .iter()
        .filter_map(|log| log.log_decode::<TFT::Withdraw>().ok())
        .map(|decoded| {
            let event = decoded.inner.data;
            WithdrawEvent {
                receiver: event.receiver,
                tokens: event.tokens,
                blockchain_address: event.blockchain_address,
                network: event.network,
            }
        })
        .collect()
}

/// Token metadata
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TokenInfo {
    pub address: Address,
    pub symbol: String,
    pub decimals: u8,
}

/// Client for one deployed TFT token contract
pub struct TokenClient {
    provider: RootProvider<Http<Client>>,
    rpc_url: Url,
    token: Address,
    chain_id: u64,
    network: String,
    signer: Option<(EthereumWallet, Address)>,
}

fn call_error(e: impl std::fmt::Display) -> NetworkError {
    NetworkError::ContractCall(e.to_string())
}

impl TokenClient {
    /// Connect to `rpc_url` and check that it serves `chain_id`
    pub async fn connect(rpc_url: &str, token: Address, chain_id: u64) -> Result<Self, NetworkError> {
        let rpc_url: Url = rpc_url
            .parse()
            .map_err(|e| call_error(format!("Invalid RPC URL: {}", e)))?;
        let provider = ProviderBuilder::new().on_http(rpc_url.clone());

        let actual = provider.get_chain_id().await.map_err(call_error)?;
        if actual != chain_id {
            return Err(NetworkError::WrongChain {
                expected: chain_id,
                actual,
            });
        }

        info!(rpc_url = %rpc_url, chain_id, token = %token, "Connected to token contract");

        Ok(Self {
            provider,
            rpc_url,
            token,
            chain_id,
            network: DEFAULT_WITHDRAW_NETWORK.to_string(),
            signer: None,
        })
    }

    /// Enable withdrawals signed by `private_key`
    pub fn with_signer(mut self, private_key: &str) -> Result<Self, NetworkError> {
        let signer: PrivateKeySigner = private_key
            .parse()
            .map_err(|e| call_error(format!("Invalid private key: {}", e)))?;
        let address = signer.address();
        self.signer = Some((EthereumWallet::from(signer), address));

        info!(address = %address, "Token client signer configured");
        Ok(self)
    }

    /// Network string passed to `withdraw` (defaults to `stellar`)
    pub fn with_network(mut self, network: impl Into<String>) -> Self {
        self.network = network.into();
        self
    }

    pub fn token(&self) -> Address {
        self.token
    }

    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub fn signer_address(&self) -> Option<Address> {
        self.signer.as_ref().map(|(_, address)| *address)
    }

    pub async fn balance_of(&self, account: Address) -> Result<U256, NetworkError> {
        let token = TFT::new(self.token, &self.provider);
        let result = token
            .balanceOf(account)
            .call()
            .await
            .map_err(|e| call_error(format!("Failed to get balance: {}", e)))?;
        Ok(result._0)
    }

    pub async fn token_info(&self) -> Result<TokenInfo, NetworkError> {
        let token = TFT::new(self.token, &self.provider);

        let (symbol, decimals) = tokio::try_join!(
            async {
                token
                    .symbol()
                    .call()
                    .await
                    .map(|r| r._0)
                    .map_err(|e| call_error(format!("Failed to get symbol: {}", e)))
            },
            async {
                token
                    .decimals()
                    .call()
                    .await
                    .map(|r| r._0)
                    .map_err(|e| call_error(format!("Failed to get decimals: {}", e)))
            }
        )?;

        Ok(TokenInfo {
            address: self.token,
            symbol,
            decimals,
        })
    }

    /// Native coin balance of the signer, for gas
    pub async fn signer_native_balance(&self) -> Result<U256, NetworkError> {
        let address = self
            .signer_address()
            .ok_or_else(|| call_error("no signer configured"))?;
        self.provider.get_balance(address).await.map_err(call_error)
    }

    /// Call `withdraw(amount, destination, network)` and wait for the receipt
    pub async fn withdraw(
        &self,
        raw_amount: U256,
        destination: &str,
    ) -> Result<TransactionReceipt, NetworkError> {
        let (wallet, from) = self
            .signer
            .as_ref()
            .ok_or_else(|| call_error("withdrawals need a signer"))?;

        let provider = ProviderBuilder::new()
            .with_recommended_fillers()
            .wallet(wallet.clone())
            .on_http(self.rpc_url.clone());
        let token = TFT::new(self.token, &provider);

        debug!(
            from = %from,
            amount = %raw_amount,
            destination = %destination,
            network = %self.network,
            "Sending withdraw transaction"
        );

        let pending = token
            .withdraw(raw_amount, destination.to_string(), self.network.clone())
            .send()
            .await
            .map_err(|e| call_error(format!("Failed to send withdraw: {}", e)))?;

        let receipt = pending
            .get_receipt()
            .await
            .map_err(|e| call_error(format!("Failed to get withdraw receipt: {}", e)))?;

        if !receipt.status() {
            return Err(NetworkError::Reverted(receipt.transaction_hash.to_string()));
        }

        info!(
            tx_hash = %receipt.transaction_hash,
            block = ?receipt.block_number,
            "Withdraw transaction confirmed"
        );
        Ok(receipt)
    }
}

#[async_trait]
impl BalanceSource for TokenClient {
    async fn balance_of(&self, account: Address) -> Result<U256, NetworkError> {
        TokenClient::balance_of(self, account).await
    }
}

#[async_trait]
impl WithdrawDispatcher for TokenClient {
    async fn dispatch(
        &self,
        request: &WithdrawalRequest,
    ) -> Result<WithdrawalReceipt, NetworkError> {
        let raw_amount = request
            .raw_amount()
            .map_err(|e| call_error(format!("Invalid withdraw amount: {}", e)))?;
        let receipt = self.withdraw(raw_amount, &request.destination).await?;
        Ok(WithdrawalReceipt {
            tx_hash: receipt.transaction_hash,
        })
    }
}
