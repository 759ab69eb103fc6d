//! In-process storage for sessions, the pipeline-event journal, and
//! persisted profiles.
//!
//! Per §5's shared-resource fallback ("an in-process map protected by a
//! mutex with explicit expiry timestamps where no managed datastore is
//! specified"), every store here is a `dashmap`/`parking_lot` structure
//! rather than a connection to an external database.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
pub mod event_log;
pub mod prelude;
pub mod profile_store;
pub mod session;

pub use error::{StorageError, StorageResult};
pub use event_log::{EventLog, PipelineEventRecord, PipelineEventType};
pub use profile_store::InMemoryProfileStore;
pub use session::{Session, SessionStore};
