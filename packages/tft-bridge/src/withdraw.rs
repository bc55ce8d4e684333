//! Withdrawal form validation
//!
//! A withdrawal burns TFT on the EVM side and asks the bridge to pay out on
//! Stellar. The contract accepts any destination string, so everything that
//! protects the user happens here:
//!
//! - the destination must be an existing Stellar account with a TFT trust line
//! - the amount must be positive and covered by the current balance
//!
//! ## Field lifecycle
//!
//! ```text
//! Empty --validate--> Validating --> Valid | Invalid
//!   ^                                        |
//!   +------------------ edit ----------------+
//! ```
//!
//! Each field is edited and validated independently; editing one field never
//! clears the other field's result.

use alloy::primitives::{TxHash, U256};
use async_trait::async_trait;
use bigdecimal::num_bigint::Sign;
use bigdecimal::BigDecimal;
use tracing::{debug, info, warn};

use crate::amount::{
    check_magnitude, format_amount, format_balance, from_base_units, parse_amount, to_base_units,
};
use crate::error::{AddressError, AmountError, NetworkError, WithdrawError};
use crate::horizon::{AccountLookup, Asset};

/// Network name the bridge expects for Stellar payouts
pub const DEFAULT_WITHDRAW_NETWORK: &str = "stellar";

/// Destination that passed the account and trust line checks
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAddress(String);

impl ValidAddress {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Amount that is positive and covered by the balance it was checked against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidAmount {
    amount: BigDecimal,
    raw: U256,
}

impl ValidAmount {
    pub fn amount(&self) -> &BigDecimal {
        &self.amount
    }

    /// Amount in the contract's smallest unit
    pub fn raw(&self) -> U256 {
        self.raw
    }
}

/// Validation state of a single form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldState<T, E> {
    Empty,
    Validating,
    Valid(T),
    Invalid(E),
}

impl<T, E: std::fmt::Display> FieldState<T, E> {
    pub fn is_valid(&self) -> bool {
        matches!(self, FieldState::Valid(_))
    }

    /// Inline error message for the field, if any
    pub fn error_message(&self) -> Option<String> {
        match self {
            FieldState::Invalid(e) => Some(e.to_string()),
            _ => None,
        }
    }
}

/// Check a withdrawal amount against the current raw balance
pub fn validate_amount(amount: &BigDecimal, balance: U256) -> Result<ValidAmount, AmountError> {
    if amount.sign() != Sign::Plus {
        return Err(AmountError::NonPositiveAmount);
    }
    // before comparing, which rescales both sides
    check_magnitude(amount)?;

    let available = from_base_units(balance);
    if amount > &available {
        return Err(AmountError::InsufficientBalance {
            requested: format_amount(amount),
            available: format_balance(balance),
        });
    }

    let raw = to_base_units(amount)?;
    Ok(ValidAmount {
        amount: amount.clone(),
        raw,
    })
}

/// Offline part of destination validation: trimmed and non-blank
pub fn check_destination_format(address: &str) -> Result<&str, AddressError> {
    let address = address.trim();
    if address.is_empty() {
        return Err(AddressError::EmptyAddress);
    }
    Ok(address)
}

/// Check that `address` exists on Stellar and trusts `asset`
///
/// Costs one round trip to the lookup service. Any lookup failure is reported
/// as [`AddressError::AccountNotFound`].
pub async fn validate_destination(
    address: &str,
    lookup: &dyn AccountLookup,
    asset: &Asset,
) -> Result<ValidAddress, AddressError> {
    let address = check_destination_format(address)?;

    let account = match lookup.load_account(address).await {
        Ok(account) => account,
        Err(e) => {
            warn!(address = %address, error = %e, "Destination lookup failed");
            return Err(AddressError::AccountNotFound(address.to_string()));
        }
    };

    if !account.has_trust_line(asset) {
        return Err(AddressError::MissingTrustLine {
            address: address.to_string(),
            asset_code: asset.code.clone(),
        });
    }

    debug!(address = %address, asset = %asset.code, "Destination validated");
    Ok(ValidAddress(address.to_string()))
}

/// A validated withdrawal, ready to hand to the contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalRequest {
    /// Stellar account receiving the payout
    pub destination: String,
    /// Amount in TFT
    pub amount: BigDecimal,
    /// Raw balance at submit time
    pub source_balance: U256,
}

impl WithdrawalRequest {
    /// Amount in the contract's smallest unit
    pub fn raw_amount(&self) -> Result<U256, AmountError> {
        to_base_units(&self.amount)
    }
}

/// Result of a dispatched withdrawal
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WithdrawalReceipt {
    pub tx_hash: TxHash,
}

/// Contract invocation collaborator
#[async_trait]
pub trait WithdrawDispatcher: Send + Sync {
    /// Send the withdrawal to the token contract. Called once per submit.
    async fn dispatch(&self, request: &WithdrawalRequest)
        -> Result<WithdrawalReceipt, NetworkError>;
}

/// A destination lookup started for a specific edit of the field
#[derive(Debug, Clone)]
pub struct DestinationCheck {
    generation: u64,
    address: String,
    asset: Asset,
}

impl DestinationCheck {
    pub fn address(&self) -> &str {
        &self.address
    }

    /// Perform the lookup. Does not touch the form.
    pub async fn run(self, lookup: &dyn AccountLookup) -> DestinationOutcome {
        let result = validate_destination(&self.address, lookup, &self.asset).await;
        DestinationOutcome {
            generation: self.generation,
            result,
        }
    }
}

/// Result of a [`DestinationCheck`], applied with [`WithdrawForm::apply_destination_check`]
#[derive(Debug, Clone)]
pub struct DestinationOutcome {
    generation: u64,
    result: Result<ValidAddress, AddressError>,
}

/// State of the withdraw dialog
#[derive(Debug, Clone)]
pub struct WithdrawForm {
    asset: Asset,
    balance: Option<U256>,

    destination_input: String,
    destination: FieldState<ValidAddress, AddressError>,
    /// Bumped on every destination edit; tags in-flight lookups
    destination_generation: u64,

    amount_input: String,
    amount: FieldState<ValidAmount, AmountError>,
    amount_edited: bool,
}

impl WithdrawForm {
    pub fn new(asset: Asset) -> Self {
        Self {
            asset,
            balance: None,
            destination_input: String::new(),
            destination: FieldState::Empty,
            destination_generation: 0,
            amount_input: String::new(),
            amount: FieldState::Empty,
            amount_edited: false,
        }
    }

    pub fn asset(&self) -> &Asset {
        &self.asset
    }

    pub fn balance(&self) -> Option<U256> {
        self.balance
    }

    pub fn destination_input(&self) -> &str {
        &self.destination_input
    }

    pub fn amount_input(&self) -> &str {
        &self.amount_input
    }

    pub fn destination_state(&self) -> &FieldState<ValidAddress, AddressError> {
        &self.destination
    }

    pub fn amount_state(&self) -> &FieldState<ValidAmount, AmountError> {
        &self.amount
    }

    /// Record a fresh balance. Until the user types an amount, the amount
    /// field follows the full balance.
    pub fn set_balance(&mut self, raw: U256) {
        self.balance = Some(raw);
        if !self.amount_edited {
            self.amount_input = format_balance(raw);
        }
        self.amount = FieldState::Empty;
    }

    pub fn edit_destination(&mut self, input: impl Into<String>) {
        self.destination_input = input.into();
        self.destination_generation += 1;
        self.destination = FieldState::Empty;
    }

    pub fn edit_amount(&mut self, input: impl Into<String>) {
        self.amount_input = input.into();
        self.amount_edited = true;
        self.amount = FieldState::Empty;
    }

    /// Validate the amount field against the last known balance
    pub fn validate_amount(&mut self) -> Result<(), AmountError> {
        self.amount = FieldState::Validating;
        let balance = self.balance.unwrap_or(U256::ZERO);

        let result = parse_amount(&self.amount_input).and_then(|a| validate_amount(&a, balance));
        match result {
            Ok(valid) => {
                self.amount = FieldState::Valid(valid);
                Ok(())
            }
            Err(e) => {
                self.amount = FieldState::Invalid(e.clone());
                Err(e)
            }
        }
    }

    /// Start validating the destination as currently typed
    ///
    /// Blank input fails immediately without a lookup.
    pub fn begin_destination_check(&mut self) -> Result<DestinationCheck, AddressError> {
        let address = match check_destination_format(&self.destination_input) {
            Ok(address) => address.to_string(),
            Err(e) => {
                self.destination = FieldState::Invalid(e.clone());
                return Err(e);
            }
        };

        self.destination = FieldState::Validating;
        Ok(DestinationCheck {
            generation: self.destination_generation,
            address,
            asset: self.asset.clone(),
        })
    }

    /// Apply a finished lookup. Returns `false` and leaves the field untouched
    /// if the destination was edited after the check started.
    pub fn apply_destination_check(&mut self, outcome: DestinationOutcome) -> bool {
        if outcome.generation != self.destination_generation {
            warn!(
                check_generation = outcome.generation,
                current_generation = self.destination_generation,
                "Discarding stale destination lookup"
            );
            return false;
        }

        self.destination = match outcome.result {
            Ok(valid) => FieldState::Valid(valid),
            Err(e) => FieldState::Invalid(e),
        };
        true
    }

    /// Validate the destination in one step
    pub async fn validate_destination(
        &mut self,
        lookup: &dyn AccountLookup,
    ) -> Result<(), AddressError> {
        let check = self.begin_destination_check()?;
        let outcome = check.run(lookup).await;
        let result = outcome.result.clone();
        self.apply_destination_check(outcome);
        result.map(|_| ())
    }

    /// Build the request from two valid fields
    pub fn request(&self) -> Result<WithdrawalRequest, WithdrawError> {
        let destination = match &self.destination {
            FieldState::Valid(address) => address.as_str().to_string(),
            _ => return Err(WithdrawError::NotReady("destination has not been validated")),
        };
        let amount = match &self.amount {
            FieldState::Valid(amount) => amount.amount().clone(),
            _ => return Err(WithdrawError::NotReady("amount has not been validated")),
        };

        Ok(WithdrawalRequest {
            destination,
            amount,
            source_balance: self.balance.unwrap_or(U256::ZERO),
        })
    }

    /// Hand a validated withdrawal to the dispatcher. No retry on failure.
    pub async fn submit(
        &self,
        dispatcher: &dyn WithdrawDispatcher,
    ) -> Result<(WithdrawalRequest, WithdrawalReceipt), WithdrawError> {
        let request = self.request()?;
        let receipt = dispatcher.dispatch(&request).await?;

        info!(
            destination = %request.destination,
            amount = %format_amount(&request.amount),
            tx_hash = %receipt.tx_hash,
            "Withdrawal dispatched"
        );

        Ok((request, receipt))
    }

    /// Full submit flow of the dialog: destination first, then amount, then dispatch
    pub async fn validate_and_submit(
        &mut self,
        lookup: &dyn AccountLookup,
        dispatcher: &dyn WithdrawDispatcher,
    ) -> Result<(WithdrawalRequest, WithdrawalReceipt), WithdrawError> {
        self.validate_destination(lookup).await?;
        self.validate_amount()?;
        self.submit(dispatcher).await
    }

    /// Clear both fields, keeping asset and balance
    pub fn reset(&mut self) {
        let balance = self.balance;
        // checks started before the reset must stay stale
        let generation = self.destination_generation + 1;
        *self = Self::new(self.asset.clone());
        self.destination_generation = generation;
        if let Some(raw) = balance {
            self.set_balance(raw);
        }
    }
}
