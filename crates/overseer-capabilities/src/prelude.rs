//! Convenience re-exports for downstream crates.

pub use crate::error::{CapabilityError, CapabilityResult};
pub use crate::key::{ApiKey, Limits};
pub use crate::store::CapabilityStore;
