//! API key model and in-process capability store (§3 "API key", §4.3).

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
pub mod key;
pub mod prelude;
pub mod store;

pub use error::{CapabilityError, CapabilityResult};
pub use key::{ApiKey, Limits};
pub use store::CapabilityStore;
