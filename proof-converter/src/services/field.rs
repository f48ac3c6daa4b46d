//! BN254 field elements carried as decimal strings
//!
//! Every coordinate in both wire formats is a decimal string. A [`FieldElement`]
//! keeps the exact text it was parsed from, so relabeled coordinates are emitted
//! byte-for-byte, alongside the parsed value used for arithmetic.

use num_bigint::BigUint;
use num_traits::Zero;
use once_cell::sync::Lazy;
use serde::{Serialize, Serializer};
use std::fmt;
use thiserror::Error;

/// Modulus used for coordinate negation
pub const BN254_MODULUS_DECIMAL: &str =
    "21888242871839275222246405745257275088548364400416034343698204186575808495617";

pub static BN254_MODULUS: Lazy<BigUint> = Lazy::new(|| {
    BigUint::parse_bytes(BN254_MODULUS_DECIMAL.as_bytes(), 10)
        .expect("BN254 modulus constant is valid decimal")
});

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FieldError {
    #[error("empty string")]
    Empty,
    #[error("invalid character {found:?} at offset {offset}, expected a decimal digit")]
    InvalidDigit { found: char, offset: usize },
    #[error("value is not below the BN254 modulus")]
    OutOfRange,
}

/// A non-negative integer parsed from a decimal string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldElement {
    decimal: String,
    value: BigUint,
}

impl FieldElement {
    /// Parse a decimal string.
    ///
    /// Only ASCII digits are accepted: no sign, no `0x` prefix, no separators.
    /// When `enforce_range` is set the value must also be below [`BN254_MODULUS`].
    pub fn parse(raw: &str, enforce_range: bool) -> Result<Self, FieldError> {
        if raw.is_empty() {
            return Err(FieldError::Empty);
        }
        if let Some((offset, found)) = raw.char_indices().find(|(_, c)| !c.is_ascii_digit()) {
            return Err(FieldError::InvalidDigit { found, offset });
        }

        let value = BigUint::parse_bytes(raw.as_bytes(), 10).ok_or(FieldError::Empty)?;
        if enforce_range && value >= *BN254_MODULUS {
            return Err(FieldError::OutOfRange);
        }

        Ok(Self {
            decimal: raw.to_string(),
            value,
        })
    }

    pub fn zero() -> Self {
        Self::from(BigUint::zero())
    }

    /// `(p - self) mod p`
    ///
    /// The value is reduced first, so unreduced inputs (accepted when range
    /// enforcement is off) still yield a canonical result.
    pub fn negate(&self) -> Self {
        let modulus = &*BN254_MODULUS;
        let reduced = &self.value % modulus;
        Self::from((modulus - reduced) % modulus)
    }

    pub fn value(&self) -> &BigUint {
        &self.value
    }

    pub fn as_str(&self) -> &str {
        &self.decimal
    }

    /// First `len` digits, for log lines
    pub fn preview(&self, len: usize) -> &str {
        let end = self.decimal.len().min(len);
        &self.decimal[..end]
    }
}

impl From<BigUint> for FieldElement {
    fn from(value: BigUint) -> Self {
        Self {
            decimal: value.to_str_radix(10),
            value,
        }
    }
}

impl fmt::Display for FieldElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.decimal)
    }
}

impl Serialize for FieldElement {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.decimal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_negate_small_value() {
        let five = FieldElement::parse("5", true).unwrap();
        assert_eq!(
            five.negate().as_str(),
            "21888242871839275222246405745257275088548364400416034343698204186575808495612"
        );
    }

    #[test]
    fn test_negate_zero_stays_zero() {
        let zero = FieldElement::parse("0", true).unwrap();
        assert_eq!(zero.negate().as_str(), "0");
    }

    #[test]
    fn test_negate_is_involution() {
        let y = FieldElement::parse(
            "9383485363053290200918347156157836566562967994039712273449902621266178545958",
            true,
        )
        .unwrap();
        assert_eq!(y.negate().negate(), y);
    }

    #[test]
    fn test_negate_unreduced_value() {
        // p + 5 is only accepted without range enforcement, and negates like 5
        let raw = "21888242871839275222246405745257275088548364400416034343698204186575808495622";
        assert_eq!(FieldElement::parse(raw, true), Err(FieldError::OutOfRange));

        let unreduced = FieldElement::parse(raw, false).unwrap();
        assert_eq!(
            unreduced.negate().as_str(),
            "21888242871839275222246405745257275088548364400416034343698204186575808495612"
        );
    }

    #[test]
    fn test_modulus_is_out_of_range() {
        assert_eq!(
            FieldElement::parse(BN254_MODULUS_DECIMAL, true),
            Err(FieldError::OutOfRange)
        );
        let below = "21888242871839275222246405745257275088548364400416034343698204186575808495616";
        assert!(FieldElement::parse(below, true).is_ok());
    }

    #[test]
    fn test_rejects_malformed_strings() {
        assert_eq!(FieldElement::parse("", true), Err(FieldError::Empty));
        assert_eq!(
            FieldElement::parse("-1", true),
            Err(FieldError::InvalidDigit { found: '-', offset: 0 })
        );
        assert_eq!(
            FieldElement::parse("0x10", true),
            Err(FieldError::InvalidDigit { found: 'x', offset: 1 })
        );
        assert_eq!(
            FieldElement::parse("1_000", true),
            Err(FieldError::InvalidDigit { found: '_', offset: 1 })
        );
        assert_eq!(
            FieldElement::parse("12a", true),
            Err(FieldError::InvalidDigit { found: 'a', offset: 2 })
        );
        assert!(FieldElement::parse("+7", true).is_err());
        assert!(FieldElement::parse(" 7", true).is_err());
    }

    #[test]
    fn test_keeps_original_text() {
        let padded = FieldElement::parse("007", true).unwrap();
        assert_eq!(padded.as_str(), "007");
        assert_eq!(padded.value(), &BigUint::from(7u32));
        assert_eq!(serde_json::to_string(&padded).unwrap(), "\"007\"");
    }

    #[test]
    fn test_preview_truncates() {
        let value = FieldElement::parse("123456789", true).unwrap();
        assert_eq!(value.preview(4), "1234");
        assert_eq!(value.preview(20), "123456789");
    }
}
