use std::collections::HashMap;
use std::fmt::{Display, Formatter};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};
use std::time::Instant;

use serde::Serialize;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, trace, warn};

use crate::health::{HealthSnapshot, HealthStatus, HealthTracker};
use crate::provider::{Provider, ProviderFuture};
use crate::{GatewayError, Network, ProviderConfig, ProviderFailure, ValidationError};

/// Registration-order identifier of a provider entry, unique per registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EntryId(u64);

impl EntryId {
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl Display for EntryId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "entry-{}", self.0)
    }
}

/// A registered provider bound to its configuration and health state.
pub(crate) struct ProviderEntry {
    id: EntryId,
    provider: Arc<dyn Provider>,
    config: ProviderConfig,
    health: HealthTracker,
}

/// Entry view used for introspection; taking one never mutates health state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderSnapshot {
    pub entry: EntryId,
    pub network: Network,
    pub priority: i32,
    pub health: HealthSnapshot,
}

impl ProviderSnapshot {
    pub fn available(&self) -> bool {
        self.health.status == HealthStatus::Healthy && !self.health.rate_limited
    }

    pub fn status_label(&self) -> &'static str {
        if self.health.rate_limited {
            return "rate_limited";
        }
        self.health.status.as_str()
    }
}

/// Per-network provider entries with priority-ordered fallback.
///
/// The network map sits behind one read/write lock that is only written at
/// registration. Every dispatch path clones the entry list under the read lock
/// and then works against each entry's own health mutex.
#[derive(Default)]
pub struct ProviderRegistry {
    providers: RwLock<HashMap<Network, Vec<Arc<ProviderEntry>>>>,
    next_id: AtomicU64,
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry for `provider.network()` with fresh healthy state.
    ///
    /// Registering the same provider instance again is allowed and creates an
    /// independent entry with its own health and rate window.
    pub fn register(
        &self,
        provider: Arc<dyn Provider>,
        config: ProviderConfig,
    ) -> Result<EntryId, ValidationError> {
        config.validate()?;

        let network = provider.network();
        let id = EntryId::new(self.next_id.fetch_add(1, Ordering::Relaxed));
        let entry = Arc::new(ProviderEntry {
            id,
            health: HealthTracker::new(network.clone(), id, config),
            provider,
            config,
        });

        let mut providers = self.write();
        let entries = providers.entry(network.clone()).or_default();
        entries.push(entry);
        // Stable: equal priorities keep registration order.
        entries.sort_by_key(|entry| entry.config.priority);

        info!(
            network = %network,
            entry = %id,
            priority = config.priority,
            requests_per_window = config.requests_per_window,
            max_consecutive_errors = config.max_consecutive_errors,
            entries = entries.len(),
            "provider registered"
        );
        Ok(id)
    }

    /// Entries for `network` in try order.
    fn entries(&self, network: &Network) -> Vec<Arc<ProviderEntry>> {
        self.read().get(network).cloned().unwrap_or_default()
    }

    pub fn provider_count(&self, network: &Network) -> usize {
        self.read().get(network).map_or(0, Vec::len)
    }

    pub fn networks(&self) -> Vec<Network> {
        let mut networks = self.read().keys().cloned().collect::<Vec<_>>();
        networks.sort();
        networks
    }

    pub fn snapshots(&self, network: &Network) -> Vec<ProviderSnapshot> {
        self.entries(network)
            .iter()
            .map(|entry| ProviderSnapshot {
                entry: entry.id,
                network: network.clone(),
                priority: entry.config.priority,
                health: entry.health.snapshot(),
            })
            .collect()
    }

    /// First available provider for `network`, without dispatching anything.
    pub fn get_healthy_provider(
        &self,
        network: &Network,
    ) -> Result<Arc<dyn Provider>, GatewayError> {
        let entries = self.entries(network);
        if entries.is_empty() {
            return Err(GatewayError::NoProvidersRegistered {
                network: network.clone(),
            });
        }

        entries
            .iter()
            .find(|entry| entry.health.is_available())
            .map(|entry| Arc::clone(&entry.provider))
            .ok_or_else(|| GatewayError::NoAvailableProviders {
                network: network.clone(),
            })
    }

    /// Runs `operation` against the available entries of `network` strictly in
    /// priority order, one at a time, until one succeeds.
    ///
    /// Each dispatch holds a slot of the entry's rate window until it settles,
    /// and a failing entry is never retried within the call. Cancellation is
    /// checked before each entry; the token itself is the caller's to pass
    /// into the operation.
    pub async fn execute_with_fallback<T, F>(
        &self,
        cancel: &CancellationToken,
        network: &Network,
        mut operation: F,
    ) -> Result<T, GatewayError>
    where
        F: for<'a> FnMut(&'a dyn Provider) -> ProviderFuture<'a, T>,
    {
        let started = Instant::now();
        let entries = self.entries(network);
        if entries.is_empty() {
            return Err(GatewayError::NoProvidersRegistered {
                network: network.clone(),
            });
        }

        let mut attempts: Vec<ProviderFailure> = Vec::new();
        for entry in &entries {
            if cancel.is_cancelled() {
                debug!(
                    network = %network,
                    attempts = attempts.len(),
                    "fallback cancelled by caller"
                );
                return Err(GatewayError::Cancelled {
                    network: network.clone(),
                    attempts,
                });
            }

            let Some(reservation) = entry.health.try_reserve() else {
                trace!(network = %network, entry = %entry.id, "skipping unavailable provider");
                continue;
            };

            match operation(entry.provider.as_ref()).await {
                Ok(value) => {
                    reservation.record_success();
                    if !attempts.is_empty() {
                        info!(
                            network = %network,
                            entry = %entry.id,
                            failed_attempts = attempts.len(),
                            "fallback succeeded"
                        );
                    }
                    debug!(
                        network = %network,
                        entry = %entry.id,
                        latency_ms = elapsed_ms(started),
                        "provider call succeeded"
                    );
                    return Ok(value);
                }
                Err(error) => {
                    reservation.record_error();
                    warn!(
                        network = %network,
                        entry = %entry.id,
                        priority = entry.config.priority,
                        error = %error,
                        "provider call failed"
                    );
                    attempts.push(ProviderFailure {
                        entry: entry.id,
                        priority: entry.config.priority,
                        error,
                    });
                }
            }
        }

        match attempts.last() {
            Some(last) => {
                let last = last.error.clone();
                warn!(
                    network = %network,
                    attempts = attempts.len(),
                    latency_ms = elapsed_ms(started),
                    "all providers failed"
                );
                Err(GatewayError::AllProvidersFailed {
                    network: network.clone(),
                    last,
                    attempts,
                })
            }
            None => {
                debug!(network = %network, entries = entries.len(), "no available providers");
                Err(GatewayError::NoAvailableProviders {
                    network: network.clone(),
                })
            }
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<Network, Vec<Arc<ProviderEntry>>>> {
        self.providers.read().unwrap_or_else(|poisoned| {
            warn!("provider registry lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<Network, Vec<Arc<ProviderEntry>>>> {
        self.providers.write().unwrap_or_else(|poisoned| {
            warn!("provider registry lock was poisoned, recovering");
            poisoned.into_inner()
        })
    }
}

fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis().min(u128::from(u64::MAX)) as u64
}
