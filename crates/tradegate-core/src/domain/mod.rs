//! # Domain Models
//!
//! Wallet and trading records exchanged between the gateway and providers.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Amount`] | Arbitrary-precision base units plus decimal places |
//! | [`Wallet`] | Wallet on one network (private key never serialized) |
//! | [`Transaction`] | Buy/sell transaction with status and fees |
//! | [`BuyRequest`] / [`SellRequest`] | Trade requests with slippage bounds |
//! | [`UtcDateTime`] | UTC timestamp |
//!
//! Amounts never go through floating point; see [`Amount::parse_decimal`].

mod amount;
mod models;
mod timestamp;

pub use amount::Amount;
pub(crate) use models::require_non_empty;
pub use models::{BuyRequest, SellRequest, Transaction, TransactionStatus, TransactionType, Wallet};
pub use timestamp::UtcDateTime;
