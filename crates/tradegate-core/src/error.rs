use thiserror::Error;

use crate::provider::ProviderError;
use crate::registry::EntryId;
use crate::Network;

/// Validation and contract errors exposed by `tradegate-core`.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("network name cannot be empty")]
    EmptyNetwork,
    #[error("network name length {len} exceeds max {max}")]
    NetworkTooLong { len: usize, max: usize },
    #[error("network name contains invalid character '{ch}' at index {index}")]
    NetworkInvalidChar { ch: char, index: usize },

    #[error("field '{field}' cannot be empty")]
    EmptyField { field: &'static str },
    #[error("field '{field}' must be greater than zero")]
    ZeroValue { field: &'static str },

    #[error("invalid decimal amount '{value}' for {decimals} decimal places")]
    InvalidAmount { value: String, decimals: u8 },

    #[error("timestamp must be RFC3339 UTC (suffix Z): '{value}'")]
    TimestampNotUtc { value: String },
}

/// One failed dispatch recorded while walking a network's provider entries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderFailure {
    pub entry: EntryId,
    pub priority: i32,
    pub error: ProviderError,
}

/// Terminal error returned by registry and gateway calls.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GatewayError {
    #[error("no providers registered for network {network}")]
    NoProvidersRegistered { network: Network },

    #[error("no available providers for network {network}")]
    NoAvailableProviders { network: Network },

    #[error("all providers failed for network {network} after {} attempt(s): {last}", .attempts.len())]
    AllProvidersFailed {
        network: Network,
        #[source]
        last: ProviderError,
        /// Every failed attempt in try order; the final element carries `last`.
        attempts: Vec<ProviderFailure>,
    },

    #[error("operation on network {network} was cancelled after {} attempt(s)", .attempts.len())]
    Cancelled {
        network: Network,
        attempts: Vec<ProviderFailure>,
    },

    #[error("invalid request: {0}")]
    InvalidRequest(#[source] ValidationError),

    #[error("invalid provider configuration: {0}")]
    InvalidConfig(#[source] ValidationError),
}

impl GatewayError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::NoProvidersRegistered { .. } => "gateway.no_providers_registered",
            Self::NoAvailableProviders { .. } => "gateway.no_available_providers",
            Self::AllProvidersFailed { .. } => "gateway.all_providers_failed",
            Self::Cancelled { .. } => "gateway.cancelled",
            Self::InvalidRequest(_) => "gateway.invalid_request",
            Self::InvalidConfig(_) => "gateway.invalid_config",
        }
    }

    /// `true` when the same call may succeed later without any change on the
    /// caller's side, i.e. every provider is merely rate limited or unhealthy.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::NoAvailableProviders { .. })
    }

    /// Failed attempts made before the call terminated, in try order.
    pub fn attempts(&self) -> &[ProviderFailure] {
        match self {
            Self::AllProvidersFailed { attempts, .. } | Self::Cancelled { attempts, .. } => {
                attempts
            }
            _ => &[],
        }
    }
}
