//! Deposit instructions (Stellar -> EVM)
//!
//! Deposits are plain Stellar payments to the bridge account. The only link
//! between the payment and the EVM recipient is the memo, so the details stay
//! hidden until the user has acknowledged that a missing memo loses funds.

use alloy::primitives::Address;
use serde::Serialize;

use crate::address_codec::{encode_memo_for, Memo};
use crate::error::DepositError;

/// Warning shown before the deposit details
pub const MEMO_WARNING: &str = "Please always include the generated memo text for every swap \
     transaction. Failure to do so will result in unrecoverable loss of funds!";

/// What the user has to enter in their Stellar wallet
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepositInstructions {
    /// Bridge account on Stellar receiving the deposit
    pub destination: String,
    /// Memo carrying the EVM recipient
    pub memo: Memo,
    /// Payment URI for wallet QR scanners
    pub qr_payload: String,
}

/// Build the QR payment URI understood by the ThreeFold Connect wallet
pub fn qr_payload(bridge_address: &str, memo: &Memo) -> String {
    let encoded: String = url::form_urlencoded::byte_serialize(memo.as_str().as_bytes()).collect();
    format!("TFT:{}?message={}&sender=me", bridge_address, encoded)
}

/// Deposit dialog for one connected EVM account
#[derive(Debug, Clone)]
pub struct DepositDialog {
    bridge_address: String,
    account: Address,
    acknowledged: bool,
}

impl DepositDialog {
    pub fn new(bridge_address: impl Into<String>, account: Address) -> Self {
        Self {
            bridge_address: bridge_address.into(),
            account,
            acknowledged: false,
        }
    }

    pub fn account(&self) -> Address {
        self.account
    }

    pub fn is_acknowledged(&self) -> bool {
        self.acknowledged
    }

    /// Record that the user accepted [`MEMO_WARNING`]
    pub fn acknowledge(&mut self) {
        self.acknowledged = true;
    }

    /// Withdraw the acknowledgement, hiding the details again
    pub fn revoke(&mut self) {
        self.acknowledged = false;
    }

    pub fn instructions(&self) -> Result<DepositInstructions, DepositError> {
        if !self.acknowledged {
            return Err(DepositError::AcknowledgementRequired);
        }

        let memo = encode_memo_for(&self.account);
        Ok(DepositInstructions {
            qr_payload: qr_payload(&self.bridge_address, &memo),
            destination: self.bridge_address.clone(),
            memo,
        })
    }
}
