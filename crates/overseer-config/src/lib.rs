//! Settings resolver and layered ambient configuration.
//!
//! This crate has two halves:
//!
//! - [`profile`] and [`resolver`]: the system → profile → session-override
//!   merge that produces the [`profile::EffectiveSettings`] an Eye sees in
//!   `context.settings` (§4.5).
//! - [`app_config`]: the gateway's own startup configuration — bind address,
//!   rate-limit and budget defaults, event-bus tuning — loaded from compiled
//!   defaults, overlaid by an optional `config.toml`, overlaid by
//!   `OVERSEER_*` environment variables (§10.3).

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod app_config;
pub mod error;
pub mod prelude;
pub mod profile;
pub mod resolver;

pub use app_config::{BudgetConfig, EventBusConfig, OverseerConfig, RateLimitConfig};
pub use error::{ConfigError, ConfigResult};
pub use profile::{builtin_profile, builtin_profiles, EffectiveSettings, MangekyoStrictness, Profile};
pub use resolver::{apply_overrides, resolve, resolve_profile, ProfileStore};
