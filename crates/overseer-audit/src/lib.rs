//! Append-only audit journal (§4.7).
//!
//! Every authenticated request produces one [`AuditRecord`]; every admin
//! action produces one with `action` set explicitly. Records never carry
//! raw API key material, only a hash.

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod entry;
pub mod log;
pub mod prelude;

pub use entry::AuditRecord;
pub use log::AuditLog;
