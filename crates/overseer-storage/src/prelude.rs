//! Convenience re-exports for downstream crates.

pub use crate::error::{StorageError, StorageResult};
pub use crate::event_log::{EventLog, PipelineEventRecord, PipelineEventType};
pub use crate::profile_store::InMemoryProfileStore;
pub use crate::session::{Session, SessionStore};
