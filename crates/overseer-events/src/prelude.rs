//! Convenience re-exports for downstream crates.

pub use crate::bus::{EventBus, DEFAULT_REPLAY_DEPTH, DEFAULT_SUBSCRIBER_CAPACITY};
pub use crate::event::PipelineEvent;
