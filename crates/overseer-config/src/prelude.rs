//! Convenience re-exports for downstream crates.

pub use crate::app_config::{BudgetConfig, EventBusConfig, OverseerConfig, RateLimitConfig};
pub use crate::error::{ConfigError, ConfigResult};
pub use crate::profile::{
    builtin_profile, builtin_profiles, EffectiveSettings, MangekyoStrictness, Profile,
};
pub use crate::resolver::{apply_overrides, resolve, resolve_profile, ProfileStore};
