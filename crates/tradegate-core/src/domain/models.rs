use std::fmt::{Debug, Formatter};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Amount, Network, UtcDateTime, ValidationError};

/// Custodial or watched wallet on one network.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Wallet {
    pub id: String,
    pub network: Network,
    pub address: String,
    pub public_key: String,
    /// Never serialized and redacted from `Debug` output.
    #[serde(skip)]
    pub private_key: Option<String>,
    pub created_at: UtcDateTime,
    pub last_updated_at: UtcDateTime,
}

impl Wallet {
    /// Creates a wallet record with a fresh id and both timestamps set to now.
    pub fn new(
        network: Network,
        address: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let address = address.into();
        require_non_empty("address", &address)?;
        let now = UtcDateTime::now();

        Ok(Self {
            id: Uuid::new_v4().to_string(),
            network,
            address,
            public_key: public_key.into(),
            private_key: None,
            created_at: now,
            last_updated_at: now,
        })
    }

    pub fn with_private_key(mut self, private_key: impl Into<String>) -> Self {
        self.private_key = Some(private_key.into());
        self
    }
}

impl Debug for Wallet {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Wallet")
            .field("id", &self.id)
            .field("network", &self.network)
            .field("address", &self.address)
            .field("public_key", &self.public_key)
            .field(
                "private_key",
                &self.private_key.as_ref().map(|_| "<redacted>"),
            )
            .field("created_at", &self.created_at)
            .field("last_updated_at", &self.last_updated_at)
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Buy,
    Sell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Confirmed,
    Failed,
}

/// On-chain trade as reported by a provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub network: Network,
    #[serde(rename = "type")]
    pub kind: TransactionType,
    pub status: TransactionStatus,
    pub from_address: String,
    pub to_address: String,
    pub amount: Amount,
    pub token_address: String,
    pub signature: String,
    pub block_hash: Option<String>,
    pub block_number: Option<u64>,
    pub timestamp: UtcDateTime,
    pub gas_fee: Amount,
    pub error_message: Option<String>,
    pub created_at: UtcDateTime,
    pub last_updated_at: UtcDateTime,
}

impl Transaction {
    pub const fn is_final(&self) -> bool {
        matches!(
            self.status,
            TransactionStatus::Confirmed | TransactionStatus::Failed
        )
    }
}

/// Request to buy `amount` of `token_address` paying at most `max_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BuyRequest {
    pub wallet_address: String,
    pub token_address: String,
    pub amount: Amount,
    pub max_price: Amount,
}

impl BuyRequest {
    pub fn new(
        wallet_address: impl Into<String>,
        token_address: impl Into<String>,
        amount: Amount,
        max_price: Amount,
    ) -> Result<Self, ValidationError> {
        let request = Self {
            wallet_address: wallet_address.into(),
            token_address: token_address.into(),
            amount,
            max_price,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_trade(&self.wallet_address, &self.token_address, &self.amount)
    }
}

/// Request to sell `amount` of `token_address` accepting no less than `min_price`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellRequest {
    pub wallet_address: String,
    pub token_address: String,
    pub amount: Amount,
    pub min_price: Amount,
}

impl SellRequest {
    pub fn new(
        wallet_address: impl Into<String>,
        token_address: impl Into<String>,
        amount: Amount,
        min_price: Amount,
    ) -> Result<Self, ValidationError> {
        let request = Self {
            wallet_address: wallet_address.into(),
            token_address: token_address.into(),
            amount,
            min_price,
        };
        request.validate()?;
        Ok(request)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_trade(&self.wallet_address, &self.token_address, &self.amount)
    }
}

fn validate_trade(
    wallet_address: &str,
    token_address: &str,
    amount: &Amount,
) -> Result<(), ValidationError> {
    require_non_empty("wallet_address", wallet_address)?;
    require_non_empty("token_address", token_address)?;
    if amount.is_zero() {
        return Err(ValidationError::ZeroValue { field: "amount" });
    }
    Ok(())
}

pub(crate) fn require_non_empty(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::EmptyField { field });
    }
    Ok(())
}
