//! # Tradegate Core
//!
//! Multi-provider failover gateway for wallet and trading operations.
//!
//! ## Overview
//!
//! Several interchangeable providers may serve the same logical [`Network`]
//! (for example redundant RPC endpoints for one chain). The gateway routes
//! every operation to one of them:
//!
//! - providers are tried **strictly in ascending priority**, one at a time,
//!   equal priorities in registration order
//! - each provider has a **fixed request window**; once spent it sits out
//!   for the window duration
//! - **consecutive failures** mark a provider unhealthy; an optional
//!   cool-down puts it back on probation
//! - a failing provider is never retried within one call; the next one is
//!   tried instead
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`domain`] | Amounts, wallets, transactions, trade requests |
//! | [`error`] | Validation and gateway error types |
//! | [`health`] | Per-entry health and rate-window tracking |
//! | [`network`] | Network identifiers |
//! | [`provider`] | Provider capability trait and provider errors |
//! | [`provider_config`] | Per-registration configuration |
//! | [`registry`] | Provider registry and fallback executor |
//! | [`service`] | Gateway facade |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use tokio_util::sync::CancellationToken;
//! use tradegate_core::{GatewayService, Network, ProviderConfig};
//!
//! let gateway = GatewayService::new();
//! gateway.register_provider_with_config(Arc::new(primary_rpc), ProviderConfig::default().with_priority(1))?;
//! gateway.register_provider(Arc::new(backup_rpc))?;
//!
//! let cancel = CancellationToken::new();
//! let balance = gateway.get_balance(&cancel, &Network::SOLANA, "7xKX...").await?;
//! println!("balance: {balance}");
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────┐
//! │  Caller         │
//! └────────┬────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Gateway Service │
//! └────────┬────────┘
//!          │ execute_with_fallback
//!          ▼
//! ┌─────────────────┐     ┌──────────────────┐
//! │ Provider        │────▶│ Health Tracker   │
//! │ Registry        │     │ (one per entry)  │
//! └────────┬────────┘     └──────────────────┘
//!          │
//!          ▼
//! ┌─────────────────┐
//! │ Provider        │
//! │ (trait object)  │
//! └─────────────────┘
//! ```
//!
//! ## Error Handling
//!
//! Every call ends in one [`GatewayError`] at most:
//!
//! ```rust
//! use tradegate_core::GatewayError;
//!
//! fn handle_error(error: GatewayError) {
//!     match error {
//!         GatewayError::NoAvailableProviders { .. } => {
//!             // Rate limited or unhealthy everywhere: try again later
//!         }
//!         GatewayError::AllProvidersFailed { .. } => {
//!             // The upstream operation itself is failing
//!         }
//!         _ => {}
//!     }
//! }
//! ```

pub mod domain;
pub mod error;
pub mod health;
pub mod network;
pub mod provider;
pub mod provider_config;
pub mod registry;
pub mod service;

pub use domain::{
    Amount, BuyRequest, SellRequest, Transaction, TransactionStatus, TransactionType, UtcDateTime,
    Wallet,
};
pub use error::{GatewayError, ProviderFailure, ValidationError};
pub use health::{HealthSnapshot, HealthStatus, HealthTracker, Reservation};
pub use network::Network;
pub use provider::{Provider, ProviderError, ProviderErrorKind, ProviderFuture};
pub use provider_config::ProviderConfig;
pub use registry::{EntryId, ProviderRegistry, ProviderSnapshot};
pub use service::GatewayService;
