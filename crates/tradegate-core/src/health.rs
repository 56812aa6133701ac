//! Per-entry health and rate-window bookkeeping.
//!
//! Each registered provider entry owns one [`HealthTracker`]. All of its
//! mutable state sits behind a single mutex so concurrent calls against
//! unrelated providers never contend with each other.
//!
//! Dispatch goes through [`HealthTracker::try_reserve`]: the availability
//! check and the slot it hands out happen under one lock, and the
//! [`Reservation`] settles the outcome under the same lock. In-flight calls
//! count against the window budget until they settle, so concurrent callers
//! can never push more dispatches through a window than it allows.
//!
//! Time is read through [`tokio::time::Instant`], which follows the system
//! clock outside a runtime and the paused test clock inside one.

use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

use crate::registry::EntryId;
use crate::{Network, ProviderConfig};

/// Health classification of a provider entry. Only `Healthy` is selectable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    Healthy,
    /// Not assigned by the registry; reserved for externally reported degradation.
    Degraded,
    Unhealthy,
}

impl HealthStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Healthy => "healthy",
            Self::Degraded => "degraded",
            Self::Unhealthy => "unhealthy",
        }
    }
}

/// Point-in-time view of a tracker, taken without mutating it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HealthSnapshot {
    pub status: HealthStatus,
    pub consecutive_errors: u32,
    pub requests_in_window: u32,
    /// Dispatches holding a reservation that has not settled yet.
    pub in_flight: u32,
    pub rate_limited: bool,
}

#[derive(Debug)]
struct HealthState {
    status: HealthStatus,
    consecutive_errors: u32,
    rate_limit_expiry: Option<Instant>,
    requests_in_window: u32,
    in_flight: u32,
    window_started_at: Option<Instant>,
    unhealthy_since: Option<Instant>,
}

impl HealthState {
    fn fresh() -> Self {
        Self {
            status: HealthStatus::Healthy,
            consecutive_errors: 0,
            rate_limit_expiry: None,
            requests_in_window: 0,
            in_flight: 0,
            window_started_at: None,
            unhealthy_since: None,
        }
    }

    fn roll_window(&mut self) {
        self.requests_in_window = 0;
        self.window_started_at = None;
        self.rate_limit_expiry = None;
    }
}

/// Thread-safe health and rate-limit state for one provider entry.
#[derive(Debug)]
pub struct HealthTracker {
    network: Network,
    entry: EntryId,
    config: ProviderConfig,
    state: Mutex<HealthState>,
}

impl HealthTracker {
    pub fn new(network: Network, entry: EntryId, config: ProviderConfig) -> Self {
        Self {
            network,
            entry,
            config,
            state: Mutex::new(HealthState::fresh()),
        }
    }

    /// Whether the entry may be dispatched to right now.
    ///
    /// Not a pure read: this is where a full rate window closes, where an
    /// expired window reopens with a zeroed counter, and where an unhealthy
    /// entry whose cool-down has elapsed is put back on probation. No slot is
    /// taken; use [`try_reserve`](Self::try_reserve) before dispatching.
    pub fn is_available(&self) -> bool {
        self.is_available_at(Instant::now())
    }

    /// Takes one slot of the current window if the entry is available.
    ///
    /// The slot stays taken until the returned [`Reservation`] is settled or
    /// dropped.
    pub fn try_reserve(&self) -> Option<Reservation<'_>> {
        self.try_reserve_at(Instant::now())
    }

    /// Counts one successful request that was dispatched without a reservation.
    pub fn record_success(&self) {
        let mut state = self.lock();
        self.apply_success(&mut state, Instant::now());
    }

    pub fn record_error(&self) {
        let mut state = self.lock();
        self.apply_error(&mut state, Instant::now());
    }

    pub fn status(&self) -> HealthStatus {
        self.lock().status
    }

    pub fn consecutive_errors(&self) -> u32 {
        self.lock().consecutive_errors
    }

    pub fn snapshot(&self) -> HealthSnapshot {
        self.snapshot_at(Instant::now())
    }

    pub(crate) fn is_available_at(&self, now: Instant) -> bool {
        let mut state = self.lock();
        self.admits(&mut state, now)
    }

    pub(crate) fn try_reserve_at(&self, now: Instant) -> Option<Reservation<'_>> {
        let mut state = self.lock();
        if !self.admits(&mut state, now) {
            return None;
        }
        state.in_flight = state.in_flight.saturating_add(1);
        Some(Reservation {
            tracker: self,
            settled: false,
        })
    }

    #[cfg(test)]
    pub(crate) fn record_success_at(&self, now: Instant) {
        let mut state = self.lock();
        self.apply_success(&mut state, now);
    }

    #[cfg(test)]
    pub(crate) fn record_error_at(&self, now: Instant) {
        let mut state = self.lock();
        self.apply_error(&mut state, now);
    }

    fn admits(&self, state: &mut HealthState, now: Instant) -> bool {
        if let Some(expiry) = state.rate_limit_expiry {
            if now < expiry {
                return false;
            }
            state.roll_window();
            debug!(network = %self.network, entry = %self.entry, "rate window reopened");
        }

        if let Some(started) = state.window_started_at {
            if now.saturating_duration_since(started) >= self.config.window_duration {
                state.roll_window();
            }
        }

        if state.requests_in_window >= self.config.requests_per_window {
            state.rate_limit_expiry = Some(now + self.config.window_duration);
            debug!(
                network = %self.network,
                entry = %self.entry,
                requests = state.requests_in_window,
                window_ms = duration_ms(self.config.window_duration),
                "rate window closed"
            );
            return false;
        }

        // Outstanding calls may still fail and hand their slot back.
        if state.requests_in_window.saturating_add(state.in_flight)
            >= self.config.requests_per_window
        {
            trace!(
                network = %self.network,
                entry = %self.entry,
                in_flight = state.in_flight,
                "rate window fully reserved"
            );
            return false;
        }

        if state.status == HealthStatus::Unhealthy {
            self.try_recover(state, now);
        }

        state.status == HealthStatus::Healthy
    }

    fn apply_success(&self, state: &mut HealthState, now: Instant) {
        state.consecutive_errors = 0;
        state.requests_in_window = state.requests_in_window.saturating_add(1);
        state.window_started_at.get_or_insert(now);

        if state.status != HealthStatus::Healthy {
            state.status = HealthStatus::Healthy;
            state.unhealthy_since = None;
            info!(
                network = %self.network,
                entry = %self.entry,
                "provider healthy again after success"
            );
        }
    }

    fn apply_error(&self, state: &mut HealthState, now: Instant) {
        state.consecutive_errors = state.consecutive_errors.saturating_add(1);

        if state.consecutive_errors >= self.config.max_consecutive_errors
            && state.status != HealthStatus::Unhealthy
        {
            state.status = HealthStatus::Unhealthy;
            state.unhealthy_since = Some(now);
            warn!(
                network = %self.network,
                entry = %self.entry,
                consecutive_errors = state.consecutive_errors,
                "provider marked unhealthy"
            );
        }
    }

    fn settle(&self, outcome: Option<bool>) {
        let mut state = self.lock();
        state.in_flight = state.in_flight.saturating_sub(1);
        let now = Instant::now();
        match outcome {
            Some(true) => self.apply_success(&mut state, now),
            Some(false) => self.apply_error(&mut state, now),
            None => {}
        }
    }

    pub(crate) fn snapshot_at(&self, now: Instant) -> HealthSnapshot {
        let state = self.lock();
        let window_elapsed = state
            .window_started_at
            .map(|started| now.saturating_duration_since(started) >= self.config.window_duration)
            .unwrap_or(false);
        let rate_limited = match state.rate_limit_expiry {
            Some(expiry) => now < expiry,
            None => state.requests_in_window >= self.config.requests_per_window && !window_elapsed,
        };

        HealthSnapshot {
            status: state.status,
            consecutive_errors: state.consecutive_errors,
            requests_in_window: state.requests_in_window,
            in_flight: state.in_flight,
            rate_limited,
        }
    }

    fn try_recover(&self, state: &mut HealthState, now: Instant) {
        let (Some(cooldown), Some(since)) = (self.config.recovery_cooldown, state.unhealthy_since)
        else {
            return;
        };
        if now.saturating_duration_since(since) < cooldown {
            return;
        }

        // Probation: one more failure trips the threshold again.
        state.status = HealthStatus::Healthy;
        state.unhealthy_since = None;
        state.consecutive_errors = self.config.max_consecutive_errors.saturating_sub(1);
        info!(
            network = %self.network,
            entry = %self.entry,
            cooldown_ms = duration_ms(cooldown),
            "provider back on probation after cool-down"
        );
    }

    fn lock(&self) -> MutexGuard<'_, HealthState> {
        self.state.lock().unwrap_or_else(|poisoned| {
            warn!(
                network = %self.network,
                entry = %self.entry,
                "health state mutex was poisoned, recovering"
            );
            poisoned.into_inner()
        })
    }
}

/// One reserved dispatch slot of a [`HealthTracker`].
///
/// Settle it with [`record_success`](Self::record_success) or
/// [`record_error`](Self::record_error). Dropping it unsettled, for example
/// when the caller abandons the call, frees the slot without counting
/// anything.
#[must_use = "an unsettled reservation holds a slot of the rate window until dropped"]
pub struct Reservation<'a> {
    tracker: &'a HealthTracker,
    settled: bool,
}

impl Reservation<'_> {
    /// Turns the slot into a counted request and resets the error streak.
    pub fn record_success(mut self) {
        self.settled = true;
        self.tracker.settle(Some(true));
    }

    /// Frees the slot and counts a consecutive error.
    pub fn record_error(mut self) {
        self.settled = true;
        self.tracker.settle(Some(false));
    }
}

impl Drop for Reservation<'_> {
    fn drop(&mut self) {
        if !self.settled {
            self.tracker.settle(None);
        }
    }
}

fn duration_ms(duration: Duration) -> u64 {
    duration.as_millis().min(u128::from(u64::MAX)) as u64
}
