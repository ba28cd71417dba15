use crate::ContractsError;
use alloy::primitives::{Address, Bytes, U256};
use alloy::signers::local::PrivateKeySigner;
use std::str::FromStr;

pub fn parse_address(value: &str) -> Result<Address, ContractsError> {
    let result = Address::from_str(value.trim())?;
    return Ok(result);
}

/// Accepts decimal or `0x`-prefixed hex.
pub fn parse_u256(value: &str) -> Result<U256, ContractsError> {
    let result = U256::from_str(value.trim())?;
    return Ok(result);
}

/// Accepts `0x`-prefixed or bare hex; an empty string or `[]` is an empty byte sequence.
pub fn parse_bytes(value: &str) -> Result<Bytes, ContractsError> {
    let trimmed = value.trim();
    if trimmed.is_empty() || trimmed == "[]" || trimmed == "0x" {
        return Ok(Bytes::new());
    }
    let result = Bytes::from_str(trimmed)?;
    return Ok(result);
}

pub fn load_signer(private_key: &str) -> Result<PrivateKeySigner, ContractsError> {
    // The key itself never goes into the error message.
    PrivateKeySigner::from_str(private_key.trim())
        .map_err(|_| ContractsError::SignerError("private key is not a valid secp256k1 key".to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_numbers_in_both_radixes() {
        assert_eq!(parse_u256("34204").unwrap(), U256::from(34204));
        assert_eq!(parse_u256("0x10").unwrap(), U256::from(16));
        assert!(parse_u256("lenscarbon").is_err());
    }

    #[test]
    fn empty_byte_literals() {
        assert!(parse_bytes("").unwrap().is_empty());
        assert!(parse_bytes("[]").unwrap().is_empty());
        assert!(parse_bytes("0x").unwrap().is_empty());
        assert_eq!(parse_bytes("0x0102").unwrap().to_vec(), vec![1, 2]);
        assert!(parse_bytes("0xzz").is_err());
    }

    #[test]
    fn signer_errors_do_not_echo_the_key() {
        let err = load_signer("not-a-key-0123").unwrap_err();
        assert!(!err.to_string().contains("not-a-key-0123"));
    }
}
