use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::domain::require_non_empty;
use crate::provider::Provider;
use crate::registry::{EntryId, ProviderRegistry, ProviderSnapshot};
use crate::{
    Amount, BuyRequest, GatewayError, Network, ProviderConfig, SellRequest, Transaction,
    ValidationError, Wallet,
};

/// High-level wallet and trading operations over a [`ProviderRegistry`].
///
/// Every operation is a single call through
/// [`ProviderRegistry::execute_with_fallback`]; retry and fallback policy
/// lives there and nowhere else. Inputs are validated before any provider is
/// contacted so malformed requests never count against provider health.
///
/// Validation runs before the provider lookup, so a malformed request for a
/// network with no providers fails with [`GatewayError::InvalidRequest`]
/// rather than [`GatewayError::NoProvidersRegistered`].
#[derive(Clone, Default)]
pub struct GatewayService {
    registry: Arc<ProviderRegistry>,
}

impl GatewayService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_registry(registry: Arc<ProviderRegistry>) -> Self {
        Self { registry }
    }

    pub fn registry(&self) -> &Arc<ProviderRegistry> {
        &self.registry
    }

    /// Registers with [`ProviderConfig::default`].
    pub fn register_provider(&self, provider: Arc<dyn Provider>) -> Result<EntryId, GatewayError> {
        self.register_provider_with_config(provider, ProviderConfig::default())
    }

    pub fn register_provider_with_config(
        &self,
        provider: Arc<dyn Provider>,
        config: ProviderConfig,
    ) -> Result<EntryId, GatewayError> {
        self.registry
            .register(provider, config)
            .map_err(GatewayError::InvalidConfig)
    }

    pub fn provider_snapshots(&self, network: &Network) -> Vec<ProviderSnapshot> {
        self.registry.snapshots(network)
    }

    /// Asks the first available provider whether `address` is well formed.
    /// Nothing is dispatched and no health state is recorded.
    pub fn is_valid_address(&self, network: &Network, address: &str) -> Result<bool, GatewayError> {
        let provider = self.registry.get_healthy_provider(network)?;
        Ok(provider.is_valid_address(address))
    }

    pub async fn create_wallet(
        &self,
        cancel: &CancellationToken,
        network: &Network,
    ) -> Result<Wallet, GatewayError> {
        let token = cancel.clone();
        self.registry
            .execute_with_fallback(cancel, network, move |provider| {
                provider.create_wallet(token.clone())
            })
            .await
    }

    pub async fn get_wallet(
        &self,
        cancel: &CancellationToken,
        network: &Network,
        address: &str,
    ) -> Result<Wallet, GatewayError> {
        require_non_empty("address", address).map_err(GatewayError::InvalidRequest)?;

        let token = cancel.clone();
        let address = address.to_owned();
        self.registry
            .execute_with_fallback(cancel, network, move |provider| {
                provider.get_wallet(token.clone(), address.clone())
            })
            .await
    }

    pub async fn get_balance(
        &self,
        cancel: &CancellationToken,
        network: &Network,
        address: &str,
    ) -> Result<Amount, GatewayError> {
        require_non_empty("address", address).map_err(GatewayError::InvalidRequest)?;

        let token = cancel.clone();
        let address = address.to_owned();
        self.registry
            .execute_with_fallback(cancel, network, move |provider| {
                provider.get_balance(token.clone(), address.clone())
            })
            .await
    }

    pub async fn buy(
        &self,
        cancel: &CancellationToken,
        network: &Network,
        req: BuyRequest,
    ) -> Result<Transaction, GatewayError> {
        req.validate().map_err(GatewayError::InvalidRequest)?;

        let token = cancel.clone();
        self.registry
            .execute_with_fallback(cancel, network, move |provider| {
                provider.buy(token.clone(), req.clone())
            })
            .await
    }

    pub async fn sell(
        &self,
        cancel: &CancellationToken,
        network: &Network,
        req: SellRequest,
    ) -> Result<Transaction, GatewayError> {
        req.validate().map_err(GatewayError::InvalidRequest)?;

        let token = cancel.clone();
        self.registry
            .execute_with_fallback(cancel, network, move |provider| {
                provider.sell(token.clone(), req.clone())
            })
            .await
    }

    pub async fn get_transaction(
        &self,
        cancel: &CancellationToken,
        network: &Network,
        tx_id: &str,
    ) -> Result<Transaction, GatewayError> {
        require_non_empty("tx_id", tx_id).map_err(GatewayError::InvalidRequest)?;

        let token = cancel.clone();
        let tx_id = tx_id.to_owned();
        self.registry
            .execute_with_fallback(cancel, network, move |provider| {
                provider.get_transaction(token.clone(), tx_id.clone())
            })
            .await
    }

    pub async fn get_transactions(
        &self,
        cancel: &CancellationToken,
        network: &Network,
        address: &str,
        limit: usize,
    ) -> Result<Vec<Transaction>, GatewayError> {
        require_non_empty("address", address).map_err(GatewayError::InvalidRequest)?;
        if limit == 0 {
            return Err(GatewayError::InvalidRequest(ValidationError::ZeroValue {
                field: "limit",
            }));
        }

        let token = cancel.clone();
        let address = address.to_owned();
        self.registry
            .execute_with_fallback(cancel, network, move |provider| {
                provider.get_transactions(token.clone(), address.clone(), limit)
            })
            .await
    }
}
