//! Convenience re-exports for downstream crates.

pub use crate::dispatch;
pub use crate::harness::{self, ReasoningRequirement};
