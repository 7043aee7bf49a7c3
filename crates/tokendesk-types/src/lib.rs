// Shared primitive types for the tokendesk console
//
// This crate defines the value types used across the console: addresses,
// fixed-width on-chain names, token amounts, timestamps, and the closed set
// of module types.

pub mod address;
pub mod amount;

pub use address::{Address, Bytes32, ParseAddressError};
pub use amount::{AmountError, TokenAmount};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Classification of an attached extension module. Closed set; the wire
/// discriminants 1..=4 are fixed by the remote registry contract.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ModuleType {
    /// Permission manager module
    Permission,
    /// Transfer manager module
    Transfer,
    /// Offering module (historically "STO")
    Offering,
    /// Checkpoint module
    Checkpoint,
}

impl ModuleType {
    /// Canonical ordering, used both for display and for flattening the
    /// registry into a single selectable listing.
    pub const ALL: [ModuleType; 4] = [
        ModuleType::Permission,
        ModuleType::Transfer,
        ModuleType::Offering,
        ModuleType::Checkpoint,
    ];

    /// Wire discriminant used by the remote registry
    pub fn as_u8(&self) -> u8 {
        match self {
            ModuleType::Permission => 1,
            ModuleType::Transfer => 2,
            ModuleType::Offering => 3,
            ModuleType::Checkpoint => 4,
        }
    }

    /// Map a wire discriminant back to a module type
    pub fn from_u8(value: u8) -> Option<Self> {
        match value {
            1 => Some(ModuleType::Permission),
            2 => Some(ModuleType::Transfer),
            3 => Some(ModuleType::Offering),
            4 => Some(ModuleType::Checkpoint),
            _ => None,
        }
    }

    /// Whether modules of this type carry a pause flag
    pub fn is_pausable(&self) -> bool {
        matches!(self, ModuleType::Transfer | ModuleType::Offering)
    }

    /// Operator-facing heading for this module type
    pub fn label(&self) -> &'static str {
        match self {
            ModuleType::Permission => "Permission Manager",
            ModuleType::Transfer => "Transfer Manager",
            ModuleType::Offering => "STO",
            ModuleType::Checkpoint => "Checkpoint",
        }
    }
}

impl fmt::Display for ModuleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModuleType::Permission => write!(f, "permission"),
            ModuleType::Transfer => write!(f, "transfer"),
            ModuleType::Offering => write!(f, "offering"),
            ModuleType::Checkpoint => write!(f, "checkpoint"),
        }
    }
}

/// Ledger timestamp, seconds since the epoch as reported by the remote clock
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    /// Get the timestamp as a u64 value
    pub fn as_u64(&self) -> u64 {
        self.0
    }

    /// Timestamp `secs` seconds later, saturating at the numeric bound
    pub fn plus_secs(&self, secs: u64) -> Timestamp {
        Timestamp(self.0.saturating_add(secs))
    }
}

impl fmt::Display for Timestamp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Block height on the remote ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct BlockHeight(pub u64);

impl fmt::Display for BlockHeight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a submitted ledger transaction
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionId(pub String);

impl TransactionId {
    /// Create a transaction ID from a string
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn module_type_wire_discriminants_round_trip() {
        for ty in ModuleType::ALL {
            assert_eq!(ModuleType::from_u8(ty.as_u8()), Some(ty));
        }
        assert_eq!(ModuleType::from_u8(0), None);
        assert_eq!(ModuleType::from_u8(5), None);
    }

    #[test]
    fn canonical_order_is_permission_transfer_offering_checkpoint() {
        assert_eq!(
            ModuleType::ALL,
            [
                ModuleType::Permission,
                ModuleType::Transfer,
                ModuleType::Offering,
                ModuleType::Checkpoint,
            ]
        );
    }

    #[test]
    fn only_transfer_and_offering_are_pausable() {
        assert!(!ModuleType::Permission.is_pausable());
        assert!(ModuleType::Transfer.is_pausable());
        assert!(ModuleType::Offering.is_pausable());
        assert!(!ModuleType::Checkpoint.is_pausable());
    }

    #[test]
    fn timestamp_addition_saturates() {
        assert_eq!(Timestamp(10).plus_secs(5), Timestamp(15));
        assert_eq!(Timestamp(u64::MAX).plus_secs(1), Timestamp(u64::MAX));
    }
}
