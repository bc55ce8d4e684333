//! TFT-Bridge: Stellar <-> EVM bridge client for the ThreeFold token
//!
//! This crate holds everything a bridge front end or script needs:
//!
//! - **Address Codec** - EVM address <-> base64 Stellar memo
//! - **Withdraw** - destination and amount validation, withdrawal dispatch
//! - **Deposit** - memo acknowledgement and deposit instructions
//! - **Horizon** - Stellar account and trust line lookup
//! - **Wallet / Balance** - connection state with explicit subscriptions and
//!   a polling balance tracker
//! - **EVM Module** - TFT token bindings, withdraw calls, contract deployment
//!
//! ## Feature Flags
//!
//! - `evm` - Enable the alloy-backed token client and deployer (default)

// Core modules (always available)
pub mod address_codec;
pub mod amount;
pub mod balance;
pub mod config;
pub mod deposit;
pub mod error;
pub mod horizon;
pub mod redact;
pub mod wallet;
pub mod withdraw;

#[cfg(feature = "evm")]
pub mod evm;

pub use address_codec::{decode_memo, encode_memo, encode_memo_for, parse_evm_address, Memo};
pub use amount::{format_balance, parse_amount, TFT_DECIMALS};
pub use balance::{BalanceSource, BalanceTracker, BalanceView};
pub use config::BridgeConfig;
pub use deposit::{DepositDialog, DepositInstructions, MEMO_WARNING};
pub use error::{
    AddressError, AmountError, CodecError, ConfigError, DepositError, NetworkError, WithdrawError,
};
pub use horizon::{AccountLookup, AccountRecord, Asset, HorizonClient};
pub use redact::Redacted;
pub use wallet::{ConnectionState, WalletEvent, WalletSession, WalletSubscription};
pub use withdraw::{
    validate_amount, validate_destination, FieldState, WithdrawDispatcher, WithdrawForm,
    WithdrawalReceipt, WithdrawalRequest,
};
