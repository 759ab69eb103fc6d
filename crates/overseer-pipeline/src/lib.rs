//! The per-session pipeline state machine (§4.2): enforces the `next_tools`
//! allowlist and advances it after every accepted call. The allowlist check
//! and the advance are one atomic unit, implemented as a single closure run
//! under [`overseer_storage::SessionStore::with_session_mut`]'s per-session
//! lock (§5 "Ordering guarantees").

#![deny(unsafe_code)]
#![warn(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]

pub mod error;
pub mod prelude;
pub mod state;

use overseer_core::tool::Tool;
use overseer_core::types::SessionId;
use overseer_storage::SessionStore;

pub use error::{PipelineError, PipelineResult};

/// Check `tool` against the session's current allowlist and, if accepted,
/// advance the allowlist to the tool's successor set.
///
/// The check and the advance happen inside the same
/// [`SessionStore::with_session_mut`] critical section, so two concurrent
/// calls against the same session race on this check: exactly one observes
/// the allowlist containing its tool and wins the advance, the other
/// observes the (possibly already-advanced) allowlist and loses.
///
/// # Errors
///
/// Returns [`PipelineError::UnknownSession`] if `session_id` doesn't exist,
/// or [`PipelineError::OutOfOrder`] carrying the allowlist the session held
/// at the moment of the check if `tool` wasn't in it.
pub fn check_and_advance(store: &SessionStore, session_id: &SessionId, tool: Tool) -> PipelineResult<()> {
    let outcome = store.with_session_mut(session_id, |session| {
        if !session.next_tools.iter().any(|allowed| allowed == tool.as_str()) {
            return Err(PipelineError::OutOfOrder {
                expected_next: session.next_tools.clone(),
            });
        }
        session.next_tools = state::next_allowlist(tool);
        Ok(())
    });

    match outcome {
        Ok(result) => result,
        Err(_storage_err) => Err(PipelineError::UnknownSession(session_id.to_string())),
    }
}

/// Read a session's current allowlist without advancing it. Used by the
/// gateway to report `expected_next` on a 409 without first attempting (and
/// thereby not attempting) the call.
///
/// # Errors
///
/// Returns [`PipelineError::UnknownSession`] if `session_id` doesn't exist.
pub fn current_allowlist(store: &SessionStore, session_id: &SessionId) -> PipelineResult<Vec<String>> {
    store
        .get(session_id)
        .map(|session| session.next_tools)
        .ok_or_else(|| PipelineError::UnknownSession(session_id.to_string()))
}
