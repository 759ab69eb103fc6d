//! The `App` handle (§9 "Global state"): every shared store created once at
//! startup and threaded through every handler via axum's `State` extractor.

use std::sync::Arc;

use overseer_approval::PolicyLayer;
use overseer_audit::AuditLog;
use overseer_capabilities::CapabilityStore;
use overseer_config::OverseerConfig;
use overseer_events::EventBus;
use overseer_storage::{EventLog, InMemoryProfileStore, SessionStore};

/// Every shared store the gateway's handlers need, constructed once in
/// `main` and cloned cheaply (every field is an `Arc`) per request.
#[derive(Clone)]
pub struct AppState {
    /// Session records and the pipeline allowlist each one carries.
    pub sessions: Arc<SessionStore>,
    /// Append-only per-session pipeline-event journal.
    pub event_log: Arc<EventLog>,
    /// Live per-session event fan-out.
    pub event_bus: Arc<EventBus>,
    /// Issued API keys.
    pub capabilities: Arc<CapabilityStore>,
    /// Append-only request/admin-action journal.
    pub audit: Arc<AuditLog>,
    /// Persisted named settings profiles.
    pub profiles: Arc<InMemoryProfileStore>,
    /// The ordered policy checks (§4.3), sharing the stores above.
    pub policy: Arc<PolicyLayer>,
    /// Layered startup configuration.
    pub config: OverseerConfig,
}

impl AppState {
    /// Build a fresh `App` handle over empty stores, the way `main` does at
    /// startup (and tests do per-case).
    #[must_use]
    pub fn new(config: OverseerConfig) -> Self {
        let capabilities = Arc::new(CapabilityStore::new());
        let audit = Arc::new(AuditLog::new());
        let policy = Arc::new(PolicyLayer::new(capabilities.clone(), audit.clone(), config.clone()));
        Self {
            sessions: Arc::new(SessionStore::new()),
            event_log: Arc::new(EventLog::new()),
            event_bus: Arc::new(EventBus::new(config.event_bus.replay_depth, config.event_bus.subscriber_capacity)),
            capabilities,
            audit,
            profiles: Arc::new(InMemoryProfileStore::new()),
            policy,
            config,
        }
    }
}
