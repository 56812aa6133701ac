use std::borrow::Cow;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const MAX_NETWORK_LEN: usize = 32;

/// Logical target a provider serves, e.g. one blockchain.
///
/// Names are normalized to lowercase and restricted to ASCII letters, digits,
/// `-` and `_`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Network(Cow<'static, str>);

impl Network {
    pub const SOLANA: Self = Self(Cow::Borrowed("solana"));

    /// Parse and normalize a network name.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        let trimmed = input.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyNetwork);
        }

        let normalized = trimmed.to_ascii_lowercase();
        let len = normalized.chars().count();
        if len > MAX_NETWORK_LEN {
            return Err(ValidationError::NetworkTooLong {
                len,
                max: MAX_NETWORK_LEN,
            });
        }

        for (index, ch) in normalized.chars().enumerate() {
            let valid = ch.is_ascii_alphanumeric() || ch == '-' || ch == '_';
            if !valid {
                return Err(ValidationError::NetworkInvalidChar { ch, index });
            }
        }

        Ok(Self(Cow::Owned(normalized)))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Network {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = ValidationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::parse(value)
    }
}

impl TryFrom<String> for Network {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<Network> for String {
    fn from(value: Network) -> Self {
        value.0.into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_normalizes_network() {
        let parsed = Network::parse(" Solana ").expect("network should parse");
        assert_eq!(parsed, Network::SOLANA);
        assert_eq!(parsed.as_str(), "solana");
    }

    #[test]
    fn rejects_invalid_chars() {
        let err = Network::parse("sol ana").expect_err("must fail");
        assert!(matches!(
            err,
            ValidationError::NetworkInvalidChar { ch: ' ', index: 3 }
        ));
    }

    #[test]
    fn rejects_empty_and_long_names() {
        assert_eq!(Network::parse("  "), Err(ValidationError::EmptyNetwork));
        let err = Network::parse(&"a".repeat(40)).expect_err("must fail");
        assert!(matches!(err, ValidationError::NetworkTooLong { len: 40, .. }));
    }
}
