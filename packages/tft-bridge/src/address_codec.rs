//! Deposit Memo Encoding
//!
//! Deposits on Stellar carry the destination EVM address in the transaction
//! memo. The relayer reads the memo, base64-decodes it and mints to the
//! resulting 20-byte address.
//!
//! ## Memo Format
//!
//! ```text
//! 0x<40 hex chars>  --hex decode-->  [u8; 20]  --base64 (standard, padded)-->  28 chars
//! ```
//!
//! Stellar does not validate the memo. A wrong or missing memo cannot be
//! recovered, so callers must never build a memo from anything but a parsed
//! address.

use alloy::primitives::Address;
use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CodecError;

/// Length of a raw EVM address
pub const EVM_ADDRESS_LEN: usize = 20;

/// Base64 memo carrying a raw EVM address
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Memo(String);

impl Memo {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Memo {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Parse a hex EVM address (`0x` prefix optional) into its 20 raw bytes
pub fn parse_evm_address(addr: &str) -> Result<[u8; EVM_ADDRESS_LEN], CodecError> {
    let hex_str = addr.strip_prefix("0x").unwrap_or(addr);

    if hex_str.len() != EVM_ADDRESS_LEN * 2 {
        return Err(CodecError::InvalidAddressFormat(format!(
            "expected 40 hex chars, got {}",
            hex_str.len()
        )));
    }

    let bytes = hex::decode(hex_str)
        .map_err(|e| CodecError::InvalidAddressFormat(e.to_string()))?;

    let mut result = [0u8; EVM_ADDRESS_LEN];
    result.copy_from_slice(&bytes);
    Ok(result)
}

/// Format 20 bytes as a lowercase `0x`-prefixed hex string
pub fn format_evm_address(bytes: &[u8; EVM_ADDRESS_LEN]) -> String {
    format!("0x{}", hex::encode(bytes))
}

/// Encode a hex EVM address into a deposit memo
pub fn encode_memo(address: &str) -> Result<Memo, CodecError> {
    let raw = parse_evm_address(address)?;
    Ok(Memo(STANDARD.encode(raw)))
}

/// Encode an already parsed address into a deposit memo
pub fn encode_memo_for(address: &Address) -> Memo {
    Memo(STANDARD.encode(address.as_slice()))
}

/// Decode a deposit memo back into the EVM address it carries
pub fn decode_memo(memo: &str) -> Result<Address, CodecError> {
    let data = STANDARD
        .decode(memo)
        .map_err(|e| CodecError::InvalidMemo(e.to_string()))?;

    if data.len() != EVM_ADDRESS_LEN {
        return Err(CodecError::InvalidMemoLength(data.len()));
    }

    Ok(Address::from_slice(&data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_fixed_bytes() {
        // 19 zero bytes followed by 0xaa
        let memo = encode_memo("0x00000000000000000000000000000000000000aa").unwrap();
        assert_eq!(memo.as_str(), "AAAAAAAAAAAAAAAAAAAAAAAAAKo=");
    }

    #[test]
    fn test_encode_mixed_case_address() {
        let memo = encode_memo("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap();
        assert_eq!(memo.as_str(), "85/W5RqtiPb0zmq4gnJ5z/+5ImY=");
        assert_eq!(memo.as_str().len(), 28);
    }

    #[test]
    fn test_encode_without_prefix() {
        let with = encode_memo("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap();
        let without = encode_memo("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap();
        assert_eq!(with, without);
    }

    #[test]
    fn test_encode_rejects_wrong_length() {
        // 38 hex chars
        let err = encode_memo("0x000000000000000000000000000000000000aa").unwrap_err();
        assert!(matches!(err, CodecError::InvalidAddressFormat(_)));

        // 42 hex chars
        assert!(encode_memo("0x0000000000000000000000000000000000000000aa").is_err());
        assert!(encode_memo("0x").is_err());
        assert!(encode_memo("").is_err());
    }

    #[test]
    fn test_encode_rejects_non_hex() {
        let err = encode_memo("0xzz9Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap_err();
        assert!(matches!(err, CodecError::InvalidAddressFormat(_)));
    }

    #[test]
    fn test_round_trip() {
        for addr in [
            "0x0000000000000000000000000000000000000000",
            "0xdead000000000000000000000000000000000000",
            "0xffffffffffffffffffffffffffffffffffffffff",
            "0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266",
        ] {
            let memo = encode_memo(addr).unwrap();
            let decoded = decode_memo(memo.as_str()).unwrap();
            assert_eq!(decoded, addr.parse::<Address>().unwrap());
            assert_eq!(format_evm_address(&parse_evm_address(addr).unwrap()), addr);
        }
    }

    #[test]
    fn test_typed_and_string_encoding_agree() {
        let addr: Address = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266".parse().unwrap();
        assert_eq!(
            encode_memo_for(&addr),
            encode_memo("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap()
        );
    }

    #[test]
    fn test_decode_rejects_bad_memos() {
        assert!(matches!(
            decode_memo("not base64!"),
            Err(CodecError::InvalidMemo(_))
        ));
        // 3 bytes
        assert_eq!(decode_memo("AAAA"), Err(CodecError::InvalidMemoLength(3)));
        // 21 bytes
        assert_eq!(
            decode_memo("AAAAAAAAAAAAAAAAAAAAAAAAAACq"),
            Err(CodecError::InvalidMemoLength(21))
        );
    }
}
