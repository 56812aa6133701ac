use std::fmt::{Display, Formatter};

use num_bigint::BigUint;
use serde::de::Error as DeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::ValidationError;

/// Token amount as an arbitrary-precision integer of base units plus the
/// number of decimal places those units carry (9 for SOL lamports).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Amount {
    pub value: BigUint,
    pub decimals: u8,
}

impl Amount {
    pub fn new(value: BigUint, decimals: u8) -> Self {
        Self { value, decimals }
    }

    pub fn zero(decimals: u8) -> Self {
        Self::new(BigUint::default(), decimals)
    }

    pub fn from_u64(value: u64, decimals: u8) -> Self {
        Self::new(BigUint::from(value), decimals)
    }

    /// Parse a human decimal string such as `"1.25"` into base units.
    pub fn parse_decimal(input: &str, decimals: u8) -> Result<Self, ValidationError> {
        let invalid = || ValidationError::InvalidAmount {
            value: input.to_owned(),
            decimals,
        };

        let trimmed = input.trim();
        let (whole, fraction) = match trimmed.split_once('.') {
            Some((whole, fraction)) => (whole, fraction),
            None => (trimmed, ""),
        };

        if whole.is_empty() && fraction.is_empty() {
            return Err(invalid());
        }
        if fraction.len() > usize::from(decimals) {
            return Err(invalid());
        }
        let all_digits = whole
            .chars()
            .chain(fraction.chars())
            .all(|ch| ch.is_ascii_digit());
        if !all_digits {
            return Err(invalid());
        }

        let mut digits = String::with_capacity(whole.len() + usize::from(decimals));
        digits.push_str(whole);
        digits.push_str(fraction);
        digits.extend(std::iter::repeat('0').take(usize::from(decimals) - fraction.len()));

        let value = BigUint::parse_bytes(digits.as_bytes(), 10).ok_or_else(invalid)?;
        Ok(Self::new(value, decimals))
    }

    pub fn is_zero(&self) -> bool {
        self.value == BigUint::default()
    }
}

impl Display for Amount {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let digits = self.value.to_str_radix(10);
        let decimals = usize::from(self.decimals);
        if decimals == 0 {
            return f.write_str(&digits);
        }

        let padded = if digits.len() <= decimals {
            format!("{}{digits}", "0".repeat(decimals + 1 - digits.len()))
        } else {
            digits
        };
        let (whole, fraction) = padded.split_at(padded.len() - decimals);
        write!(f, "{whole}.{fraction}")
    }
}

#[derive(Serialize, Deserialize)]
struct AmountRepr {
    value: String,
    decimals: u8,
}

impl Serialize for Amount {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        AmountRepr {
            value: self.value.to_str_radix(10),
            decimals: self.decimals,
        }
        .serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = AmountRepr::deserialize(deserializer)?;
        let value = BigUint::parse_bytes(repr.value.as_bytes(), 10).ok_or_else(|| {
            D::Error::custom(format!("amount value '{}' is not a decimal integer", repr.value))
        })?;
        Ok(Self::new(value, repr.decimals))
    }
}
