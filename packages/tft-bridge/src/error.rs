//! Error taxonomy for the bridge client
//!
//! Every error here is recoverable at the caller: form errors are shown inline
//! next to the offending field and the form stays editable.

use thiserror::Error;

/// Failures converting between EVM addresses and deposit memos
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// Input is not `0x` followed by exactly 40 hex characters
    #[error("invalid EVM address format: {0}")]
    InvalidAddressFormat(String),

    /// Memo is not valid standard base64
    #[error("memo is not valid base64: {0}")]
    InvalidMemo(String),

    /// Memo decoded to something other than 20 bytes
    #[error("an EVM address should be 20 bytes, memo decoded to {0}")]
    InvalidMemoLength(usize),
}

/// Destination (Stellar account) validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    #[error("Address not valid")]
    EmptyAddress,

    #[error("Address not found")]
    AccountNotFound(String),

    #[error("Address does not have a valid trustline to {asset_code}")]
    MissingTrustLine { address: String, asset_code: String },
}

/// Withdrawal amount validation failures
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    #[error("Amount not valid: {0:?} is not a number")]
    Malformed(String),

    #[error("Amount not valid: must be greater than zero")]
    NonPositiveAmount,

    #[error("Amount not valid: at most {max_decimals} decimals are supported")]
    ExcessPrecision { max_decimals: u32 },

    #[error("Amount not valid: {requested} exceeds balance {available}")]
    InsufficientBalance { requested: String, available: String },
}

/// Remote calls that did not complete
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// Horizon answered 404 for the account
    #[error("account {0} does not exist on the ledger")]
    AccountMissing(String),

    /// Horizon could not be reached or returned an unexpected response
    #[error("account lookup failed: {0}")]
    Lookup(String),

    /// An RPC or contract call failed before a receipt was obtained
    #[error("contract call failed: {0}")]
    ContractCall(String),

    /// The transaction was mined but reverted
    #[error("transaction {0} reverted")]
    Reverted(String),

    /// The RPC endpoint serves a different chain than requested
    #[error("connected to chain {actual}, expected {expected}")]
    WrongChain { expected: u64, actual: u64 },
}

/// Errors surfaced by the withdrawal form
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WithdrawError {
    #[error(transparent)]
    Address(#[from] AddressError),

    #[error(transparent)]
    Amount(#[from] AmountError),

    #[error(transparent)]
    Network(#[from] NetworkError),

    /// Submit was attempted before both fields validated
    #[error("withdrawal form is not ready: {0}")]
    NotReady(&'static str),
}

/// Deposit dialog errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DepositError {
    #[error("the memo warning must be acknowledged before deposit details are shown")]
    AcknowledgementRequired,

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Configuration loading errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{0} required")]
    Missing(&'static str),

    #[error("invalid {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}
