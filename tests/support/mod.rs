//! Scripted provider, call log and tracing setup.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;
use tradegate_core::{
    Amount, BuyRequest, Network, Provider, ProviderConfig, ProviderError, ProviderFuture,
    SellRequest, Transaction, TransactionStatus, TransactionType, UtcDateTime, Wallet,
};

/// `(provider name, method)` in dispatch order, shared by every provider of a test.
pub type CallLog = Arc<Mutex<Vec<(&'static str, &'static str)>>>;

pub fn call_log() -> CallLog {
    Arc::new(Mutex::new(Vec::new()))
}

pub fn names(log: &CallLog) -> Vec<&'static str> {
    log.lock()
        .expect("call log lock")
        .iter()
        .map(|(name, _)| *name)
        .collect()
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_test_writer()
        .try_init();
}

/// Config with generous limits so only the field under test matters.
pub fn config(priority: i32) -> ProviderConfig {
    ProviderConfig::default()
        .with_priority(priority)
        .with_rate_limit(100, Duration::from_secs(60))
        .with_health_check_period(Duration::from_secs(60))
        .with_max_consecutive_errors(3)
        .with_recovery_cooldown(None)
}

/// Deterministic provider that answers every operation with canned data or a
/// simulated upstream failure.
pub struct ScriptedProvider {
    name: &'static str,
    network: Network,
    failing: AtomicBool,
    delay: Option<Duration>,
    calls: AtomicUsize,
    log: CallLog,
}

impl ScriptedProvider {
    fn build(
        name: &'static str,
        failing: bool,
        delay: Option<Duration>,
        log: &CallLog,
    ) -> Arc<Self> {
        Arc::new(Self {
            name,
            network: Network::SOLANA,
            failing: AtomicBool::new(failing),
            delay,
            calls: AtomicUsize::new(0),
            log: Arc::clone(log),
        })
    }

    pub fn healthy(name: &'static str, log: &CallLog) -> Arc<Self> {
        Self::build(name, false, None, log)
    }

    pub fn failing(name: &'static str, log: &CallLog) -> Arc<Self> {
        Self::build(name, true, None, log)
    }

    /// Healthy provider that takes `delay` to answer and honors cancellation meanwhile.
    pub fn slow(name: &'static str, delay: Duration, log: &CallLog) -> Arc<Self> {
        Self::build(name, false, Some(delay), log)
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn calls_to(&self, method: &str) -> usize {
        self.log
            .lock()
            .expect("call log lock")
            .iter()
            .filter(|(name, called)| *name == self.name && *called == method)
            .count()
    }

    fn respond<'a, T, V>(
        &'a self,
        method: &'static str,
        cancel: CancellationToken,
        value: V,
    ) -> ProviderFuture<'a, T>
    where
        T: Send + 'a,
        V: FnOnce() -> T + Send + 'a,
    {
        Box::pin(async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.log
                .lock()
                .expect("call log lock")
                .push((self.name, method));

            if let Some(delay) = self.delay {
                tokio::select! {
                    _ = cancel.cancelled() => return Err(ProviderError::cancelled()),
                    _ = tokio::time::sleep(delay) => {}
                }
            }

            if self.failing.load(Ordering::SeqCst) {
                return Err(ProviderError::upstream(format!(
                    "{} simulated error",
                    self.name
                )));
            }
            Ok(value())
        })
    }

    fn transaction(&self, id: String, kind: TransactionType, amount: Amount) -> Transaction {
        let now = UtcDateTime::now();
        Transaction {
            id,
            network: self.network.clone(),
            kind,
            status: TransactionStatus::Pending,
            from_address: String::from("wallet-1"),
            to_address: String::from("pool-1"),
            amount,
            token_address: String::from("token-1"),
            signature: format!("{}-signature", self.name),
            block_hash: None,
            block_number: None,
            timestamp: now,
            gas_fee: Amount::from_u64(5_000, 9),
            error_message: None,
            created_at: now,
            last_updated_at: now,
        }
    }
}

impl Provider for ScriptedProvider {
    fn network(&self) -> Network {
        self.network.clone()
    }

    fn is_valid_address(&self, address: &str) -> bool {
        address.starts_with("wallet-")
    }

    fn create_wallet<'a>(&'a self, cancel: CancellationToken) -> ProviderFuture<'a, Wallet> {
        self.respond("create_wallet", cancel, move || {
            Wallet::new(
                self.network.clone(),
                format!("wallet-{}", self.name),
                format!("{}-public-key", self.name),
            )
            .expect("address is non-empty")
        })
    }

    fn get_wallet<'a>(
        &'a self,
        cancel: CancellationToken,
        address: String,
    ) -> ProviderFuture<'a, Wallet> {
        self.respond("get_wallet", cancel, move || {
            Wallet::new(self.network.clone(), address, format!("{}-public-key", self.name))
                .expect("address is non-empty")
        })
    }

    fn get_balance<'a>(
        &'a self,
        cancel: CancellationToken,
        _address: String,
    ) -> ProviderFuture<'a, Amount> {
        self.respond("get_balance", cancel, || Amount::from_u64(1_500_000_000, 9))
    }

    fn buy<'a>(
        &'a self,
        cancel: CancellationToken,
        req: BuyRequest,
    ) -> ProviderFuture<'a, Transaction> {
        self.respond("buy", cancel, move || {
            self.transaction(format!("{}-buy", self.name), TransactionType::Buy, req.amount)
        })
    }

    fn sell<'a>(
        &'a self,
        cancel: CancellationToken,
        req: SellRequest,
    ) -> ProviderFuture<'a, Transaction> {
        self.respond("sell", cancel, move || {
            self.transaction(format!("{}-sell", self.name), TransactionType::Sell, req.amount)
        })
    }

    fn get_transaction<'a>(
        &'a self,
        cancel: CancellationToken,
        tx_id: String,
    ) -> ProviderFuture<'a, Transaction> {
        self.respond("get_transaction", cancel, move || {
            self.transaction(tx_id, TransactionType::Buy, Amount::from_u64(1, 9))
        })
    }

    fn get_transactions<'a>(
        &'a self,
        cancel: CancellationToken,
        _address: String,
        limit: usize,
    ) -> ProviderFuture<'a, Vec<Transaction>> {
        self.respond("get_transactions", cancel, move || {
            (0..limit.min(3))
                .map(|index| {
                    self.transaction(
                        format!("{}-tx-{index}", self.name),
                        TransactionType::Sell,
                        Amount::from_u64(10, 9),
                    )
                })
                .collect()
        })
    }
}
