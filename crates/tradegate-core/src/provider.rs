//! Provider capability trait and provider-level errors.
//!
//! A [`Provider`] is one concrete integration (an RPC endpoint, an indexer,
//! a swap aggregator) able to perform wallet and trading operations against
//! a single [`Network`]. The registry only ever sees providers through this
//! trait and never performs network I/O itself.
//!
//! # Operations
//!
//! | Method | Output |
//! |--------|--------|
//! | [`create_wallet`](Provider::create_wallet) | [`Wallet`] |
//! | [`get_wallet`](Provider::get_wallet) | [`Wallet`] |
//! | [`get_balance`](Provider::get_balance) | [`Amount`] |
//! | [`buy`](Provider::buy) / [`sell`](Provider::sell) | [`Transaction`] |
//! | [`get_transaction`](Provider::get_transaction) | [`Transaction`] |
//! | [`get_transactions`](Provider::get_transactions) | `Vec<Transaction>` |
//!
//! Every operation receives the caller's [`CancellationToken`] unchanged.
//! Implementations should abort in-flight upstream work once it fires and
//! return [`ProviderError::cancelled`].

use std::fmt::{Display, Formatter};
use std::future::Future;
use std::pin::Pin;

use tokio_util::sync::CancellationToken;

use crate::{Amount, BuyRequest, Network, SellRequest, Transaction, Wallet};

/// Boxed future returned by provider operations.
pub type ProviderFuture<'a, T> =
    Pin<Box<dyn Future<Output = Result<T, ProviderError>> + Send + 'a>>;

/// Provider-level error classification.
///
/// The registry treats every kind the same way; the kind is for callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderErrorKind {
    InvalidAddress,
    NotFound,
    Upstream,
    RateLimited,
    Cancelled,
    Internal,
}

/// Structured error returned by a provider operation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderError {
    kind: ProviderErrorKind,
    message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn invalid_address(address: &str) -> Self {
        Self::new(
            ProviderErrorKind::InvalidAddress,
            format!("address '{address}' is not valid for this network"),
        )
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::NotFound, message)
    }

    pub fn upstream(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Upstream, message)
    }

    pub fn rate_limited(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::RateLimited, message)
    }

    pub fn cancelled() -> Self {
        Self::new(ProviderErrorKind::Cancelled, "operation cancelled by caller")
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Internal, message)
    }

    pub const fn kind(&self) -> ProviderErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub const fn code(&self) -> &'static str {
        match self.kind {
            ProviderErrorKind::InvalidAddress => "provider.invalid_address",
            ProviderErrorKind::NotFound => "provider.not_found",
            ProviderErrorKind::Upstream => "provider.upstream",
            ProviderErrorKind::RateLimited => "provider.rate_limited",
            ProviderErrorKind::Cancelled => "provider.cancelled",
            ProviderErrorKind::Internal => "provider.internal",
        }
    }
}

impl Display for ProviderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.code())
    }
}

impl std::error::Error for ProviderError {}

/// Capability contract for one network integration.
///
/// Implementations must be `Send + Sync`: a single instance is shared by every
/// concurrent caller for the lifetime of the process.
pub trait Provider: Send + Sync {
    /// Network this provider serves; fixed for the lifetime of the instance.
    fn network(&self) -> Network;

    fn is_valid_address(&self, address: &str) -> bool;

    fn create_wallet<'a>(&'a self, cancel: CancellationToken) -> ProviderFuture<'a, Wallet>;

    fn get_wallet<'a>(
        &'a self,
        cancel: CancellationToken,
        address: String,
    ) -> ProviderFuture<'a, Wallet>;

    fn get_balance<'a>(
        &'a self,
        cancel: CancellationToken,
        address: String,
    ) -> ProviderFuture<'a, Amount>;

    /// Submits a buy. Called at most once per gateway call; a failure here
    /// moves on to the next provider, so implementations must not leave a
    /// half-submitted transaction behind when they return an error.
    fn buy<'a>(
        &'a self,
        cancel: CancellationToken,
        req: BuyRequest,
    ) -> ProviderFuture<'a, Transaction>;

    /// Submits a sell. Same single-dispatch contract as [`buy`](Provider::buy).
    fn sell<'a>(
        &'a self,
        cancel: CancellationToken,
        req: SellRequest,
    ) -> ProviderFuture<'a, Transaction>;

    fn get_transaction<'a>(
        &'a self,
        cancel: CancellationToken,
        tx_id: String,
    ) -> ProviderFuture<'a, Transaction>;

    fn get_transactions<'a>(
        &'a self,
        cancel: CancellationToken,
        address: String,
        limit: usize,
    ) -> ProviderFuture<'a, Vec<Transaction>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_carries_message_and_code() {
        let error = ProviderError::invalid_address("xyz");
        assert_eq!(error.kind(), ProviderErrorKind::InvalidAddress);
        assert_eq!(
            error.to_string(),
            "address 'xyz' is not valid for this network (provider.invalid_address)"
        );
    }
}
