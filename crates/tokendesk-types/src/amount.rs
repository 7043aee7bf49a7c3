// Token amounts in base units
//
// The ledger represents token quantities as integers scaled by the token's
// decimals factor. Operators enter decimal strings; conversion happens once
// at the submission boundary.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors produced when converting a decimal string to base units
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AmountError {
    /// Input was not a plain decimal number
    #[error("not a decimal amount: {0}")]
    Invalid(String),

    /// Fractional part longer than the token's decimals factor
    #[error("amount has more than {0} fractional digits")]
    TooPrecise(u8),

    /// Scaled value does not fit the base-unit integer
    #[error("amount overflows the base-unit range")]
    Overflow,
}

/// Token quantity in base units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
pub struct TokenAmount(pub u128);

impl TokenAmount {
    /// The zero amount
    pub const ZERO: TokenAmount = TokenAmount(0);

    /// Wrap a raw base-unit value
    pub fn from_base_units(units: u128) -> Self {
        TokenAmount(units)
    }

    /// Raw base-unit value
    pub fn as_base_units(&self) -> u128 {
        self.0
    }

    /// Convert an operator-entered decimal string into base units using the
    /// token's decimals factor. Accepts `123`, `123.45` and `.5`; anything
    /// else (signs included) is rejected by the digit parse.
    pub fn from_decimal_str(input: &str, decimals: u8) -> Result<Self, AmountError> {
        let input = input.trim();
        if input.is_empty() {
            return Err(AmountError::Invalid(input.to_string()));
        }
        let (int_part, frac_part) = match input.split_once('.') {
            Some((i, f)) => (i, f),
            None => (input, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(AmountError::Invalid(input.to_string()));
        }
        if frac_part.len() > decimals as usize {
            return Err(AmountError::TooPrecise(decimals));
        }
        let parse_digits = |digits: &str| -> Result<u128, AmountError> {
            if digits.is_empty() {
                return Ok(0);
            }
            if !digits.bytes().all(|b| b.is_ascii_digit()) {
                return Err(AmountError::Invalid(input.to_string()));
            }
            digits.parse::<u128>().map_err(|_| AmountError::Overflow)
        };
        let int_units = parse_digits(int_part)?
            .checked_mul(pow10(decimals as u32)?)
            .ok_or(AmountError::Overflow)?;
        let frac_scale = pow10(decimals as u32 - frac_part.len() as u32)?;
        let frac_units = parse_digits(frac_part)?
            .checked_mul(frac_scale)
            .ok_or(AmountError::Overflow)?;
        int_units
            .checked_add(frac_units)
            .map(TokenAmount)
            .ok_or(AmountError::Overflow)
    }

    /// Render the amount as a decimal string in display units
    pub fn to_decimal_string(&self, decimals: u8) -> String {
        if decimals == 0 {
            return self.0.to_string();
        }
        let scale = 10u128.pow(decimals as u32);
        let int_part = self.0 / scale;
        let frac_part = self.0 % scale;
        if frac_part == 0 {
            return int_part.to_string();
        }
        let frac = format!("{:0width$}", frac_part, width = decimals as usize);
        format!("{}.{}", int_part, frac.trim_end_matches('0'))
    }
}

fn pow10(exp: u32) -> Result<u128, AmountError> {
    10u128.checked_pow(exp).ok_or(AmountError::Overflow)
}

impl fmt::Display for TokenAmount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}
