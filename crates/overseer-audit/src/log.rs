//! Append-only in-process audit journal.

use overseer_core::types::SessionId;
use parking_lot::Mutex;

use crate::entry::AuditRecord;

/// An append-only journal of [`AuditRecord`]s. Records are never mutated or
/// removed once appended (§4.7).
#[derive(Debug, Default)]
pub struct AuditLog {
    records: Mutex<Vec<AuditRecord>>,
}

impl AuditLog {
    /// Create an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a record. This is the only mutation this type exposes.
    pub fn append(&self, record: AuditRecord) {
        self.records.lock().push(record);
    }

    /// Every record appended so far, oldest first.
    #[must_use]
    pub fn all(&self) -> Vec<AuditRecord> {
        self.records.lock().clone()
    }

    /// Records belonging to one session, oldest first.
    #[must_use]
    pub fn for_session(&self, session_id: &SessionId) -> Vec<AuditRecord> {
        self.records
            .lock()
            .iter()
            .filter(|r| r.session.as_ref() == Some(session_id))
            .cloned()
            .collect()
    }

    /// Number of records appended so far.
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.lock().len()
    }

    /// `true` if no record has been appended yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use overseer_core::types::Role;

    #[test]
    fn append_accumulates_in_order() {
        let log = AuditLog::new();
        log.append(AuditRecord::for_request(200));
        log.append(AuditRecord::for_request(401));
        let all = log.all();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].status, 200);
        assert_eq!(all[1].status, 401);
    }

    #[test]
    fn for_session_filters() {
        let log = AuditLog::new();
        let sid = SessionId::new();
        log.append(
            AuditRecord::for_request(200)
                .with_actor("hash1", Role::Consumer)
                .with_session(sid.clone(), None),
        );
        log.append(AuditRecord::for_request(200).with_session(SessionId::new(), None));
        assert_eq!(log.for_session(&sid).len(), 1);
    }
}
