// Address and fixed-width name primitives
//
// Addresses identify accounts and contracts on the remote ledger. The zero
// address is reserved: the module registry reports it for empty slots.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Errors produced when parsing an address from text
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseAddressError {
    /// Input was not valid hexadecimal
    #[error("invalid hex in address: {0}")]
    InvalidHex(String),

    /// Input decoded to the wrong number of bytes
    #[error("address must be 20 bytes, got {0}")]
    InvalidLength(usize),
}

/// 20-byte account or contract identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// The reserved zero address, reported by the registry for empty slots
    pub const ZERO: Address = Address([0u8; 20]);

    /// Whether this is the empty-slot sentinel
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }

    /// Raw bytes of the address
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

impl FromStr for Address {
    type Err = ParseAddressError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let stripped = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(stripped)
            .map_err(|_| ParseAddressError::InvalidHex(s.to_string()))?;
        if bytes.len() != 20 {
            return Err(ParseAddressError::InvalidLength(bytes.len()));
        }
        let mut out = [0u8; 20];
        out.copy_from_slice(&bytes);
        Ok(Address(out))
    }
}

/// 32-byte value holding a short UTF-8 name, right-padded with zero bytes.
/// This is the fixed-width encoding the remote registry uses for module
/// names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bytes32(pub [u8; 32]);

impl Bytes32 {
    /// The all-zero value
    pub const ZERO: Bytes32 = Bytes32([0u8; 32]);

    /// Encode a short name, truncating at 32 bytes
    pub fn from_utf8_padded(name: &str) -> Self {
        let mut out = [0u8; 32];
        let bytes = name.as_bytes();
        let len = bytes.len().min(32);
        out[..len].copy_from_slice(&bytes[..len]);
        Bytes32(out)
    }

    /// Decode the stored name, trimming the zero padding. Invalid UTF-8 is
    /// replaced rather than rejected; the name is display-only.
    pub fn decode_utf8(&self) -> String {
        let end = self
            .0
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(self.0.len());
        String::from_utf8_lossy(&self.0[..end]).into_owned()
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0x{}", hex::encode(self.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_displays_as_prefixed_hex() {
        let addr = Address([0xab; 20]);
        assert_eq!(
            addr.to_string(),
            "0xabababababababababababababababababababab"
        );
    }

    #[test]
    fn address_parses_with_and_without_prefix() {
        let expected = Address([0x11; 20]);
        let hex = "1111111111111111111111111111111111111111";
        assert_eq!(hex.parse::<Address>().unwrap(), expected);
        assert_eq!(format!("0x{hex}").parse::<Address>().unwrap(), expected);
    }

    #[test]
    fn address_rejects_bad_input() {
        assert!(matches!(
            "0x1234".parse::<Address>(),
            Err(ParseAddressError::InvalidLength(2))
        ));
        assert!(matches!(
            "zz11111111111111111111111111111111111111".parse::<Address>(),
            Err(ParseAddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn zero_address_is_sentinel() {
        assert!(Address::ZERO.is_zero());
        assert!(!Address([1u8; 20]).is_zero());
    }

    #[test]
    fn bytes32_name_round_trips_and_trims_padding() {
        let name = Bytes32::from_utf8_padded("GeneralTransferManager");
        assert_eq!(name.decode_utf8(), "GeneralTransferManager");
        assert_eq!(Bytes32::ZERO.decode_utf8(), "");
    }
}
