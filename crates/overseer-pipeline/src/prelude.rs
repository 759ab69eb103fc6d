//! Convenience re-exports for downstream crates.

pub use crate::error::{PipelineError, PipelineResult};
pub use crate::state::{initial_allowlist, next_allowlist};
pub use crate::{check_and_advance, current_allowlist};
