//! The Overseer gateway library: HTTP+WS surface over the pipeline state
//! machine, policy layer, Eye validators, event bus, and audit journal.
//!
//! Split out from the binary so integration tests can build an
//! [`axum::Router`] directly, the way [`router::build`] is used from
//! `main.rs` (§10.4).

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod auth;
pub mod error;
pub mod router;
pub mod routes;
pub mod state;
