use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::ValidationError;

pub const DEFAULT_PRIORITY: i32 = 10;
pub const DEFAULT_REQUESTS_PER_WINDOW: u32 = 100;
pub const DEFAULT_WINDOW_DURATION: Duration = Duration::from_secs(60);
pub const DEFAULT_HEALTH_CHECK_PERIOD: Duration = Duration::from_secs(60);
pub const DEFAULT_MAX_CONSECUTIVE_ERRORS: u32 = 3;
pub const DEFAULT_RECOVERY_COOLDOWN: Duration = Duration::from_secs(60);

/// Static configuration bound to a provider at registration.
///
/// Durations serialize as whole milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Lower is tried first; equal priorities keep registration order.
    pub priority: i32,
    /// Successful dispatches allowed before the rate window closes.
    pub requests_per_window: u32,
    #[serde(with = "duration_ms")]
    pub window_duration: Duration,
    /// Informational. Health is inferred from call outcomes, never polled.
    #[serde(with = "duration_ms")]
    pub health_check_period: Duration,
    /// Consecutive failures that mark the provider unhealthy.
    pub max_consecutive_errors: u32,
    /// Time an unhealthy provider sits out before it is retried on probation.
    /// `None` keeps it unhealthy for the rest of the process.
    #[serde(with = "optional_duration_ms", default)]
    pub recovery_cooldown: Option<Duration>,
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            priority: DEFAULT_PRIORITY,
            requests_per_window: DEFAULT_REQUESTS_PER_WINDOW,
            window_duration: DEFAULT_WINDOW_DURATION,
            health_check_period: DEFAULT_HEALTH_CHECK_PERIOD,
            max_consecutive_errors: DEFAULT_MAX_CONSECUTIVE_ERRORS,
            recovery_cooldown: Some(DEFAULT_RECOVERY_COOLDOWN),
        }
    }
}

impl ProviderConfig {
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_rate_limit(mut self, requests_per_window: u32, window_duration: Duration) -> Self {
        self.requests_per_window = requests_per_window;
        self.window_duration = window_duration;
        self
    }

    pub fn with_health_check_period(mut self, period: Duration) -> Self {
        self.health_check_period = period;
        self
    }

    pub fn with_max_consecutive_errors(mut self, max_consecutive_errors: u32) -> Self {
        self.max_consecutive_errors = max_consecutive_errors;
        self
    }

    pub fn with_recovery_cooldown(mut self, cooldown: Option<Duration>) -> Self {
        self.recovery_cooldown = cooldown;
        self
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.requests_per_window == 0 {
            return Err(ValidationError::ZeroValue {
                field: "requests_per_window",
            });
        }
        if self.window_duration.is_zero() {
            return Err(ValidationError::ZeroValue {
                field: "window_duration",
            });
        }
        if self.max_consecutive_errors == 0 {
            return Err(ValidationError::ZeroValue {
                field: "max_consecutive_errors",
            });
        }
        Ok(())
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(value.as_millis().min(u128::from(u64::MAX)) as u64)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}

mod optional_duration_ms {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match value {
            Some(duration) => super::duration_ms::serialize(duration, serializer),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_millis))
    }
}
