//! Layered application configuration (§10.3): defaults → `config.toml` → env.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{ConfigError, ConfigResult};

/// Rate-limit defaults applied when an API key's own limits don't override them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Requests allowed per window, per key.
    pub per_minute: u32,
    /// Window size in seconds (§4.3 default 60).
    pub window_seconds: u64,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            per_minute: 60,
            window_seconds: 60,
        }
    }
}

/// Budget defaults applied when an API key's own limits don't override them.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    /// Max `budget_tokens` accepted on a single request.
    pub max_per_request: i64,
    /// Max cumulative accepted tokens per key per rolling UTC day.
    pub daily: i64,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            max_per_request: 200_000,
            daily: 2_000_000,
        }
    }
}

/// Event-bus tuning (§4.6).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EventBusConfig {
    /// Number of past events replayed to a fresh subscriber.
    pub replay_depth: usize,
    /// Bounded channel capacity per subscriber before it is dropped.
    pub subscriber_capacity: usize,
}

impl Default for EventBusConfig {
    fn default() -> Self {
        Self {
            replay_depth: 50,
            subscriber_capacity: 256,
        }
    }
}

/// Top-level gateway configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverseerConfig {
    /// Address the HTTP/WS surface binds to, e.g. `"0.0.0.0:8080"`.
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    /// Rate-limit defaults.
    #[serde(default)]
    pub rate_limits: RateLimitConfig,
    /// Budget defaults.
    #[serde(default)]
    pub budgets: BudgetConfig,
    /// Event-bus tuning.
    #[serde(default)]
    pub event_bus: EventBusConfig,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for OverseerConfig {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            rate_limits: RateLimitConfig::default(),
            budgets: BudgetConfig::default(),
            event_bus: EventBusConfig::default(),
        }
    }
}

impl OverseerConfig {
    /// Load the layered configuration: compiled-in defaults, optionally
    /// overlaid by a `config.toml` on disk, then overlaid by `OVERSEER_*`
    /// environment variables, then validated.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Io`]/[`ConfigError::Parse`] if `path` is
    /// present but unreadable or malformed, or [`ConfigError::Validation`]
    /// if the merged result is out of range.
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = Self::default();

        if let Some(path) = path {
            if path.exists() {
                let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                    path: path.display().to_string(),
                    source,
                })?;
                config = toml::from_str(&raw).map_err(|source| ConfigError::Parse {
                    path: path.display().to_string(),
                    source,
                })?;
            }
        }

        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("OVERSEER_BIND_ADDR") {
            self.bind_addr = v;
        }
        if let Some(v) = env_parse::<u32>("OVERSEER_RATE_LIMIT_PER_MINUTE") {
            self.rate_limits.per_minute = v;
        }
        if let Some(v) = env_parse::<i64>("OVERSEER_BUDGET_DAILY") {
            self.budgets.daily = v;
        }
        if let Some(v) = env_parse::<i64>("OVERSEER_BUDGET_MAX_PER_REQUEST") {
            self.budgets.max_per_request = v;
        }
    }

    /// Validate cross-field and range invariants.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Validation`] naming the first offending field.
    pub fn validate(&self) -> ConfigResult<()> {
        if self.rate_limits.per_minute == 0 {
            return Err(ConfigError::Validation {
                field: "rate_limits.per_minute".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.rate_limits.window_seconds == 0 {
            return Err(ConfigError::Validation {
                field: "rate_limits.window_seconds".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.budgets.max_per_request <= 0 {
            return Err(ConfigError::Validation {
                field: "budgets.max_per_request".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        if self.budgets.daily < self.budgets.max_per_request {
            return Err(ConfigError::Validation {
                field: "budgets.daily".to_string(),
                message: "must be at least max_per_request".to_string(),
            });
        }
        if self.event_bus.replay_depth == 0 {
            return Err(ConfigError::Validation {
                field: "event_bus.replay_depth".to_string(),
                message: "must be greater than zero".to_string(),
            });
        }
        Ok(())
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}
